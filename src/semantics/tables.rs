// Symbol table entries

use super::types::{AccessModifier, DefinitionKind, MemberType, TypeInfo};
use serde::Serialize;

/// A declared class, struct or interface and the members it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefinitionTableEntry {
    pub name: String,
    pub kind: DefinitionKind,
    pub access: AccessModifier,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub members: Vec<MemberTableEntry>,
}

impl DefinitionTableEntry {
    pub fn new(name: impl Into<String>, kind: DefinitionKind) -> Self {
        DefinitionTableEntry {
            name: name.into(),
            kind,
            access: AccessModifier::Public,
            parent: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Members declared directly in this definition under `name`.
    pub fn members_named<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a MemberTableEntry> + 'b
    where
        'a: 'b,
    {
        self.members.iter().filter(move |m| m.name == name)
    }
}

/// A field, method or constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberTableEntry {
    pub name: String,
    pub member_type: MemberType,
    pub access: AccessModifier,
    pub is_static: bool,
}

impl MemberTableEntry {
    /// Members are private and non-static unless declared otherwise.
    pub fn new(name: impl Into<String>, member_type: MemberType) -> Self {
        MemberTableEntry {
            name: name.into(),
            member_type,
            access: AccessModifier::Private,
            is_static: false,
        }
    }

    pub fn with_access(mut self, access: AccessModifier) -> Self {
        self.access = access;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}

/// A local variable or parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeTableEntry {
    pub name: String,
    pub type_info: TypeInfo,
    pub scope: u32,
}

/// One open lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFrame {
    pub id: u32,
    pub is_loop: bool,
}
