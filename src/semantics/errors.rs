//! Semantic error types
//!
//! One variant per way a program can be well-formed syntactically but rejected
//! by the symbol tables or the type rules. The parser attaches a line number
//! when it wraps one of these into a [`Diagnostic`](crate::diagnostics::Diagnostic).

use super::types::DefinitionKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    // Declarations
    #[error("Definition '{name}' is already declared")]
    DefinitionRedeclared { name: String },

    #[error("'{name}' is already declared in '{owner}'")]
    MemberRedeclared { name: String, owner: String },

    #[error("Variable '{name}' is already declared in this scope")]
    VariableRedeclared { name: String },

    #[error("Main method redeclaration")]
    MainRedeclared,

    #[error("Main method can only be declared inside a class")]
    MainOutsideClass,

    #[error("No main method found")]
    MissingMain,

    // Inheritance and interfaces
    #[error("Parent '{name}' is undeclared")]
    UndeclaredParent { name: String },

    #[error("cannot inherit from private definition '{name}'")]
    PrivateParent { name: String },

    #[error("{child} cannot inherit from {parent}")]
    InheritanceKindMismatch {
        child: DefinitionKind,
        parent: DefinitionKind,
    },

    #[error("Interface '{name}' is undeclared")]
    UndeclaredInterface { name: String },

    #[error("'{name}' is not an interface")]
    NotAnInterface { name: String },

    #[error("interface '{name}' already implemented")]
    DuplicateInterface { name: String },

    #[error("'{definition}' does not implement interface '{interface}' completely")]
    InterfaceNotImplemented { definition: String, interface: String },

    #[error("No parent class exists")]
    NoParentClass,

    // Name resolution
    #[error("Undeclared variable '{name}'")]
    UndeclaredVariable { name: String },

    #[error("Undeclared variable '{name}' in '{owner}'")]
    UndeclaredMember { name: String, owner: String },

    #[error("Undeclared definition '{name}'")]
    UndeclaredDefinition { name: String },

    #[error("Undeclared method '{name}({args})' in '{owner}'")]
    UndeclaredMethod {
        name: String,
        args: String,
        owner: String,
    },

    #[error("'{name}' has no constructor accepting ({args})")]
    UndeclaredConstructor { name: String, args: String },

    #[error("cannot create object of interface '{name}'")]
    InterfaceInstantiation { name: String },

    #[error("definition '{name}' is private")]
    PrivateDefinition { name: String },

    // Member access
    #[error("'{name}' is a function not a variable")]
    FunctionUsedAsVariable { name: String },

    #[error("cannot access private member '{name}'")]
    PrivateMemberAccess { name: String },

    #[error(
        "protected member '{name}' can only be accessed inside its own definition and direct children"
    )]
    ProtectedMemberAccess { name: String },

    #[error("'{name}' is a static member and must be accessed through its definition")]
    StaticThroughInstance { name: String },

    #[error("'{name}' is not a static member")]
    InstanceThroughStatic { name: String },

    #[error("static members can only be accessed using the '.' operator")]
    ArrowOnStatic,

    #[error("'.' cannot be used with pointer type {ty}")]
    DotOnPointer { ty: String },

    #[error("'{op}' cannot be used with array type {ty}")]
    AccessOnArray { op: &'static str, ty: String },

    #[error("'->' can only be used with pointer type, found {ty}")]
    ArrowOnNonPointer { ty: String },

    #[error("cannot use '{op}' with primitive type {ty}")]
    AccessOnPrimitive { op: &'static str, ty: String },

    #[error("method has a void return type")]
    VoidAccess,

    #[error("cannot assign to the result of a function call")]
    AssignToCall,

    // Arrays
    #[error("'{name}' is not an array")]
    NotAnArray { name: String },

    #[error("function does not return an array")]
    CallResultNotArray,

    #[error("Array can only be indexed by an integer, found {ty}")]
    NonIntegerIndex { ty: String },

    #[error("cannot subscript '{name}' further")]
    TooManySubscripts { name: String },

    #[error("Arrays can be at most {max}d")]
    ArrayTooDeep { max: usize },

    #[error("array cannot have pointer elements")]
    PointerArrayElement,

    #[error("All array elements must have the same type: expected {expected}, found {found}")]
    MixedArrayElements { expected: String, found: String },

    // Types
    #[error("unable to assign {value} to variable of type {target}")]
    IncompatibleAssignment { target: String, value: String },

    #[error("Unsupported operator({op}) for operands of type {left} and {right}")]
    UnsupportedBinary {
        op: String,
        left: String,
        right: String,
    },

    #[error("Unsupported operator({op}) for operand {operand}")]
    UnsupportedUnary { op: String, operand: String },

    #[error("condition should be a bool expression, found {found}")]
    NonBoolCondition { found: String },

    // Control flow
    #[error("{keyword} can only be used inside a loop")]
    OutsideLoop { keyword: String },

    #[error("the function must not return a value")]
    UnexpectedReturnValue,

    #[error("function can not return {found} and can only return {expected}")]
    IncompatibleReturn { found: String, expected: String },

    #[error("the function must return {expected}")]
    MissingReturnValue { expected: String },
}
