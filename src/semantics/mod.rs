//! Symbol tables and type rules
//!
//! - [`types`]: [`types::TypeInfo`] and [`types::MemberType`], the type
//!   currency threaded through parsing
//! - [`tables`]: definition, member and scope table entries
//! - [`manager`]: [`manager::SymbolTableManager`], owner of all tables and the
//!   operator compatibility rules
//! - [`operators`]: operators as the type checker sees them
//! - [`errors`]: [`errors::SemanticError`]

pub mod errors;
pub mod manager;
pub mod operators;
pub mod tables;
pub mod types;
