//! Type model threaded through parsing
//!
//! [`TypeInfo`] is the currency every expression production returns. Equality is
//! structural and is what overload matching and array-literal homogeneity use;
//! assignment goes through the looser compatibility rules in
//! [`SymbolTableManager::check_binary`](super::manager::SymbolTableManager::check_binary).

use serde::Serialize;
use std::fmt;

/// Primitive type names other than `void`.
pub const PRIMITIVE_TYPES: [&str; 5] = ["int", "float", "char", "string", "bool"];

/// A value type: base name, array depth and pointer flag.
///
/// Pointer and array are mutually exclusive in declared types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeInfo {
    pub name: String,
    pub dimensions: usize,
    pub is_pointer: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        TypeInfo {
            name: name.into(),
            dimensions: 0,
            is_pointer: false,
        }
    }

    pub fn int() -> Self {
        TypeInfo::new("int")
    }

    pub fn float() -> Self {
        TypeInfo::new("float")
    }

    pub fn char() -> Self {
        TypeInfo::new("char")
    }

    pub fn string() -> Self {
        TypeInfo::new("string")
    }

    pub fn bool() -> Self {
        TypeInfo::new("bool")
    }

    pub fn void() -> Self {
        TypeInfo::new("void")
    }

    /// Type of an empty array literal, whose element type is not known yet.
    pub fn unresolved_array() -> Self {
        TypeInfo::new("").with_dimensions(1)
    }

    pub fn with_pointer(mut self) -> Self {
        self.is_pointer = true;
        self
    }

    pub fn without_pointer(mut self) -> Self {
        self.is_pointer = false;
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    pub fn is_void(&self) -> bool {
        self.name == "void"
    }

    /// True for the five value primitives (not `void`).
    pub fn is_primitive(&self) -> bool {
        PRIMITIVE_TYPES.contains(&self.name.as_str())
    }

    pub fn is_user_defined(&self) -> bool {
        !self.is_primitive() && !self.is_void() && !self.is_unresolved()
    }

    pub fn is_unresolved(&self) -> bool {
        self.name.is_empty()
    }

    /// Plain `int` or `float`.
    pub fn is_numeric(&self) -> bool {
        self.is_scalar() && (self.name == "int" || self.name == "float")
    }

    /// Neither a pointer nor an array.
    pub fn is_scalar(&self) -> bool {
        !self.is_pointer && !self.is_array()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.is_scalar() && self.name == name
    }

    /// Pointer-ness or array depth differ.
    pub fn shape_differs(&self, other: &TypeInfo) -> bool {
        self.is_pointer != other.is_pointer || self.dimensions != other.dimensions
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_pointer {
            write!(f, "*")?;
        }
        for _ in 0..self.dimensions {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Type of a definition member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberType {
    Variable(TypeInfo),
    Function {
        params: Vec<TypeInfo>,
        return_type: TypeInfo,
    },
}

impl MemberType {
    pub fn is_function(&self) -> bool {
        matches!(self, MemberType::Function { .. })
    }

    pub fn params(&self) -> Option<&[TypeInfo]> {
        match self {
            MemberType::Function { params, .. } => Some(params),
            MemberType::Variable(_) => None,
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberType::Variable(ty) => write!(f, "var {}", ty),
            MemberType::Function {
                params,
                return_type,
            } => {
                write!(f, "fn({}) -> {}", join_types(params), return_type)
            }
        }
    }
}

/// Comma-separated type list, used in diagnostics and reports.
pub fn join_types(types: &[TypeInfo]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
}

impl AccessModifier {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(AccessModifier::Public),
            "private" => Some(AccessModifier::Private),
            "protected" => Some(AccessModifier::Protected),
            _ => None,
        }
    }
}

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessModifier::Public => "public",
            AccessModifier::Private => "private",
            AccessModifier::Protected => "protected",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Class,
    Struct,
    Interface,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DefinitionKind::Class => "class",
            DefinitionKind::Struct => "struct",
            DefinitionKind::Interface => "interface",
        };
        f.write_str(s)
    }
}
