//! Source text to parse tree, in one pass
//!
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: The [`Parser`](parse::Parser) and its entry point
//! - [`tree`]: Concrete syntax tree nodes
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser. Semantic checks are not a later
//! pass: productions consult the symbol tables while they parse, and the first
//! syntax or semantic error ends the parse.

mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod references;
mod statements;
pub mod token;
pub mod tree;
