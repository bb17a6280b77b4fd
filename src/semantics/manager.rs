//! Symbol table manager
//!
//! Owns the definition table (each definition carrying its member table), the
//! flat scope table and the stack of open scopes. The parser consults it at
//! every declaration and reference; nothing here reads tokens.
//!
//! # Type Compatibility Rules
//!
//! - `=`: identical types; `float` from `int`; a user-defined type from one of
//!   its descendants (parent chain or implemented interfaces, transitively); an
//!   array from the unresolved empty literal. Pointer-ness and array depth must
//!   otherwise match exactly.
//! - `+`: `char + char` is `char`; any mix of `char`/`string` is `string`;
//!   numeric operands give `int` if both are `int`, else `float`.
//! - `-`, `*`, `/`, `%`: numeric only.
//! - Compound assignment: same type, or `float` target with `int` value.
//! - `==`, `!=`: identical types or both numeric, giving `bool`.
//! - `<`, `>`, `<=`, `>=`: numeric, giving `bool`.
//! - `&&`, `||`: `bool` operands, giving `bool`.
//! - `!` needs `bool`; `*` needs a pointer and clears it; `&` needs a
//!   non-pointer and sets it.
//!
//! Arrays and pointers are rejected by every operator except `=`, `*` and `&`.

use super::errors::SemanticError;
use super::operators::{BinaryOperator, UnaryOperator};
use super::tables::{DefinitionTableEntry, MemberTableEntry, ScopeFrame, ScopeTableEntry};
use super::types::{AccessModifier, MemberType, TypeInfo};
use log::{debug, trace};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct SymbolTableManager {
    definitions: Vec<DefinitionTableEntry>,
    definition_index: FxHashMap<String, usize>,
    scope_table: Vec<ScopeTableEntry>,
    scope_index: FxHashMap<String, Vec<usize>>,
    scope_stack: Vec<ScopeFrame>,
    last_scope_id: u32,
    current_definition: Option<String>,
    main_found: bool,
    return_type: Option<TypeInfo>,
}

impl SymbolTableManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Scopes =====

    /// Open a scope and return its id. Ids are never reused.
    pub fn create_scope(&mut self, is_loop: bool) -> u32 {
        self.last_scope_id += 1;
        let id = self.last_scope_id;
        self.scope_stack.push(ScopeFrame { id, is_loop });
        trace!("open scope {} (loop: {})", id, is_loop);
        id
    }

    pub fn destroy_scope(&mut self) -> Option<ScopeFrame> {
        let frame = self.scope_stack.pop();
        if let Some(frame) = frame {
            trace!("close scope {}", frame.id);
        }
        frame
    }

    pub fn current_scope(&self) -> Option<u32> {
        self.scope_stack.last().map(|frame| frame.id)
    }

    pub fn scope_depth(&self) -> usize {
        self.scope_stack.len()
    }

    /// True iff any open scope is a loop body.
    pub fn check_inside_loop(&self) -> bool {
        self.scope_stack.iter().any(|frame| frame.is_loop)
    }

    /// Declare a local in the innermost scope. Fails only on a clash within
    /// that same scope; shadowing outer scopes is allowed.
    pub fn insert_scope_entry(&mut self, name: &str, type_info: TypeInfo) -> bool {
        let scope = self.current_scope().unwrap_or(0);
        let clash = self
            .scope_index
            .get(name)
            .is_some_and(|indices| indices.iter().any(|&i| self.scope_table[i].scope == scope));
        if clash {
            return false;
        }

        debug!("scope {}: {} : {}", scope, name, type_info);
        self.scope_index
            .entry(name.to_string())
            .or_default()
            .push(self.scope_table.len());
        self.scope_table.push(ScopeTableEntry {
            name: name.to_string(),
            type_info,
            scope,
        });
        true
    }

    /// Innermost visible declaration of `name`.
    pub fn lookup_scope(&self, name: &str) -> Option<&TypeInfo> {
        let indices = self.scope_index.get(name)?;
        self.scope_stack.iter().rev().find_map(|frame| {
            indices
                .iter()
                .map(|&i| &self.scope_table[i])
                .find(|entry| entry.scope == frame.id)
                .map(|entry| &entry.type_info)
        })
    }

    // ===== Definitions =====

    pub fn insert_definition(&mut self, entry: DefinitionTableEntry) -> bool {
        if self.definition_index.contains_key(&entry.name) {
            return false;
        }
        debug!(
            "definition {} {} (parent: {:?}, interfaces: {:?})",
            entry.kind, entry.name, entry.parent, entry.interfaces
        );
        self.definition_index
            .insert(entry.name.clone(), self.definitions.len());
        self.definitions.push(entry);
        true
    }

    pub fn lookup_definition(&self, name: &str) -> Option<&DefinitionTableEntry> {
        self.definition_index
            .get(name)
            .map(|&index| &self.definitions[index])
    }

    /// The named definition followed by its parent chain.
    pub fn ancestors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a DefinitionTableEntry> + 'a {
        std::iter::successors(self.lookup_definition(name), move |def| {
            def.parent
                .as_deref()
                .and_then(|parent| self.lookup_definition(parent))
        })
    }

    /// Whether `name` is `ancestor` or derives from it through parents or
    /// implemented interfaces, at any depth.
    pub fn is_descendant(&self, name: &str, ancestor: &str) -> bool {
        self.ancestors(name).any(|def| {
            def.name == ancestor
                || def
                    .interfaces
                    .iter()
                    .any(|interface| self.ancestors(interface).any(|i| i.name == ancestor))
        })
    }

    pub fn current_definition(&self) -> Option<&str> {
        self.current_definition.as_deref()
    }

    pub fn current_definition_entry(&self) -> Option<&DefinitionTableEntry> {
        self.current_definition
            .as_deref()
            .and_then(|name| self.lookup_definition(name))
    }

    pub fn set_current_definition(&mut self, name: Option<String>) {
        self.current_definition = name;
    }

    // ===== Members =====

    /// Add a member to `owner`. Same-named members are only allowed when all of
    /// them are functions with distinct parameter lists.
    pub fn insert_member(&mut self, owner: &str, entry: MemberTableEntry) -> bool {
        let Some(&index) = self.definition_index.get(owner) else {
            return false;
        };
        let definition = &mut self.definitions[index];

        let clash = definition.members_named(&entry.name).any(|existing| {
            match (&existing.member_type, &entry.member_type) {
                (
                    MemberType::Function { params: a, .. },
                    MemberType::Function { params: b, .. },
                ) => a == b,
                _ => true,
            }
        });
        if clash {
            return false;
        }

        debug!("member {}::{} : {}", owner, entry.name, entry.member_type);
        definition.members.push(entry);
        true
    }

    /// First member named `name` in `owner` or its parent chain, together with
    /// the definition that declares it.
    pub fn lookup_member(
        &self,
        name: &str,
        owner: &str,
    ) -> Option<(&DefinitionTableEntry, &MemberTableEntry)> {
        self.ancestors(owner)
            .find_map(|def| def.members_named(name).next().map(|member| (def, member)))
    }

    /// Function member with exactly these parameter types, searched like
    /// [`lookup_member`](Self::lookup_member).
    pub fn lookup_member_function(
        &self,
        name: &str,
        params: &[TypeInfo],
        owner: &str,
    ) -> Option<(&DefinitionTableEntry, &MemberTableEntry)> {
        self.ancestors(owner).find_map(|def| {
            def.members_named(name)
                .find(|member| member.member_type.params() == Some(params))
                .map(|member| (def, member))
        })
    }

    /// Access check for `member` declared in `owner`, relative to the
    /// definition currently being parsed.
    pub fn check_member_access(
        &self,
        owner: &str,
        member: &MemberTableEntry,
    ) -> Result<(), SemanticError> {
        let current = self.current_definition();
        match member.access {
            AccessModifier::Public => Ok(()),
            AccessModifier::Private if current == Some(owner) => Ok(()),
            AccessModifier::Private => Err(SemanticError::PrivateMemberAccess {
                name: member.name.clone(),
            }),
            AccessModifier::Protected => {
                let parent = self
                    .current_definition_entry()
                    .and_then(|def| def.parent.as_deref());
                if current == Some(owner) || parent == Some(owner) {
                    Ok(())
                } else {
                    Err(SemanticError::ProtectedMemberAccess {
                        name: member.name.clone(),
                    })
                }
            }
        }
    }

    pub fn check_constructor_exists(&self, name: &str) -> bool {
        self.ancestors(name).any(|def| {
            def.members_named("constructor")
                .any(|member| member.member_type.is_function())
        })
    }

    /// Every function required by the definition's interfaces (including
    /// inherited interface functions) must be reachable on the definition by
    /// name and parameter list. Returns the first interface that is not.
    pub fn check_implements_interface(&self, name: &str) -> Result<(), String> {
        let Some(definition) = self.lookup_definition(name) else {
            return Ok(());
        };

        for interface in &definition.interfaces {
            let satisfied = self
                .ancestors(interface)
                .flat_map(|def| def.members.iter())
                .filter_map(|member| member.member_type.params().map(|p| (&member.name, p)))
                .all(|(function, params)| {
                    self.lookup_member_function(function, params, name)
                        .is_some()
                });
            if !satisfied {
                return Err(interface.clone());
            }
        }
        Ok(())
    }

    // ===== Parse state =====

    pub fn main_found(&self) -> bool {
        self.main_found
    }

    pub fn mark_main_found(&mut self) {
        self.main_found = true;
    }

    /// Declared return type of the function whose body is being parsed.
    pub fn return_type(&self) -> Option<&TypeInfo> {
        self.return_type.as_ref()
    }

    pub fn set_return_type(&mut self, return_type: Option<TypeInfo>) {
        self.return_type = return_type;
    }

    // ===== Finalised tables =====

    pub fn definitions(&self) -> &[DefinitionTableEntry] {
        &self.definitions
    }

    pub fn scope_table(&self) -> &[ScopeTableEntry] {
        &self.scope_table
    }

    // ===== Type compatibility =====

    /// Result type of `left op right`, or `None` if the operands are not
    /// admissible for `op`.
    pub fn check_binary(
        &self,
        left: &TypeInfo,
        right: &TypeInfo,
        op: BinaryOperator,
    ) -> Option<TypeInfo> {
        if op == BinaryOperator::Assign {
            return self
                .check_assignment(left, right)
                .then(|| left.clone());
        }

        let is_value = |t: &TypeInfo| t.is_scalar() && !t.is_void() && !t.is_unresolved();
        if !is_value(left) || !is_value(right) {
            return None;
        }

        match op {
            BinaryOperator::Add => {
                let textual = |t: &TypeInfo| t.name == "char" || t.name == "string";
                if left.name == "char" && right.name == "char" {
                    Some(TypeInfo::char())
                } else if textual(left) && textual(right) {
                    Some(TypeInfo::string())
                } else {
                    numeric_result(left, right)
                }
            }
            BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod => numeric_result(left, right),
            BinaryOperator::AddAssign
            | BinaryOperator::SubAssign
            | BinaryOperator::MulAssign
            | BinaryOperator::DivAssign
            | BinaryOperator::ModAssign => {
                let widening = left.name == "float" && right.name == "int";
                (left.name == right.name || widening).then(|| left.clone())
            }
            BinaryOperator::Eq | BinaryOperator::Ne => {
                let comparable = left.name == right.name || (left.is_numeric() && right.is_numeric());
                comparable.then(TypeInfo::bool)
            }
            BinaryOperator::Lt | BinaryOperator::Gt | BinaryOperator::Le | BinaryOperator::Ge => {
                (left.is_numeric() && right.is_numeric()).then(TypeInfo::bool)
            }
            BinaryOperator::And | BinaryOperator::Or => {
                (left.name == "bool" && right.name == "bool").then(TypeInfo::bool)
            }
            BinaryOperator::Assign => None,
        }
    }

    /// Whether a value of type `value` may be stored in `target`.
    pub fn check_assignment(&self, target: &TypeInfo, value: &TypeInfo) -> bool {
        if target == value {
            return !target.is_void();
        }

        if value.is_unresolved() {
            return target.is_array()
                && !target.is_pointer
                && !value.is_pointer
                && value.dimensions <= target.dimensions;
        }

        if target.shape_differs(value) {
            return false;
        }

        // Widening applies to plain values only
        if target.name == "float" && value.name == "int" {
            return target.is_scalar();
        }

        target.is_user_defined()
            && value.is_user_defined()
            && self.is_descendant(&value.name, &target.name)
    }

    /// Result type of `op operand`.
    pub fn check_unary(&self, operand: &TypeInfo, op: UnaryOperator) -> Option<TypeInfo> {
        if operand.is_array() || operand.is_void() || operand.is_unresolved() {
            return None;
        }
        match op {
            UnaryOperator::Not => operand.is_named("bool").then(TypeInfo::bool),
            UnaryOperator::Deref => operand
                .is_pointer
                .then(|| operand.clone().without_pointer()),
            UnaryOperator::AddressOf => (!operand.is_pointer).then(|| operand.clone().with_pointer()),
        }
    }
}

fn numeric_result(left: &TypeInfo, right: &TypeInfo) -> Option<TypeInfo> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    if left.name == "int" && right.name == "int" {
        Some(TypeInfo::int())
    } else {
        Some(TypeInfo::float())
    }
}
