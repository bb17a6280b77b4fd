//! # Introduction
//!
//! `clasp` is the front end of a small class-based language: it tokenizes a
//! source file, parses it by recursive descent, and checks it semantically in
//! the same pass, producing a concrete parse tree and the symbol tables.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser (+ SymbolTableManager) → ParseTree
//! ```
//!
//! 1. [`parser`]: lexer, parser productions and the parse tree.
//! 2. [`semantics`]: type model, symbol tables and the compatibility rules.
//! 3. [`diagnostics`]: the single error a failed parse reports.
//! 4. [`report`]: text listings of tokens and tables.
//!
//! ## Language
//!
//! Programs are a list of classes, structs and interfaces. Exactly one class
//! declares `mainEntry`. Types: `int`, `float`, `char`, `string`, `bool`,
//! user-defined types, pointers (`T*`) and arrays of up to three dimensions.
//! Statements: `declare`, assignment, calls, `if/else`, `while`, `for`,
//! `break`, `continue`, `return`. Objects are created with `makeObj`.

pub mod diagnostics;
pub mod parser;
pub mod report;
pub mod semantics;

use diagnostics::Diagnostic;
use parser::parse::{Parser, ParserConfig};
use parser::token::Token;
use parser::tree::ParseTree;
use semantics::manager::SymbolTableManager;

/// Everything a successful parse produces.
#[derive(Debug)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub tree: ParseTree,
    pub symbols: SymbolTableManager,
}

/// Tokenize, parse and check `source` with the default configuration.
pub fn analyze(source: &str) -> Result<Analysis, Diagnostic> {
    analyze_with_config(source, ParserConfig::default())
}

pub fn analyze_with_config(source: &str, config: ParserConfig) -> Result<Analysis, Diagnostic> {
    let mut parser = Parser::with_config(source, config);
    let tree = parser.parse_program()?;
    let (tokens, symbols) = parser.into_parts();
    Ok(Analysis {
        tokens,
        tree,
        symbols,
    })
}
