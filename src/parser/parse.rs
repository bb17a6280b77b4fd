//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including configuration, token helpers, and the program entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: class, struct and interface definitions, members, types
//! - `statements`: statements, bodies and local declarations
//! - `references`: `this`/`super`/identifier rooted reference chains
//! - `expressions`: values, precedence levels, object creation, array literals
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! Semantic checks run inline: every production that declares or references a
//! name consults the [`SymbolTableManager`] as soon as it has consumed the
//! tokens it needs. The first syntax or semantic error ends the parse.

use crate::diagnostics::Diagnostic;
use crate::parser::lexer::Lexer;
use crate::parser::token::{Token, TokenKind};
use crate::parser::tree::ParseTree;
use crate::semantics::errors::SemanticError;
use crate::semantics::manager::SymbolTableManager;
use log::debug;

/// Deepest array type, subscript chain or array literal nesting.
pub const MAX_ARRAY_DIMENSIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub max_array_dimensions: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_array_dimensions: MAX_ARRAY_DIMENSIONS,
        }
    }
}

/// Recursive descent parser with inline semantic analysis
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) symbols: SymbolTableManager,
    pub(crate) config: ParserConfig,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, ParserConfig::default())
    }

    pub fn with_config(source: &str, config: ParserConfig) -> Self {
        Self::from_tokens(Lexer::new(source).tokenize(), config)
    }

    /// Parser over an existing token stream. An end marker is appended if the
    /// stream lacks one.
    pub fn from_tokens(mut tokens: Vec<Token>, config: ParserConfig) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndMarker) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::EndMarker, "", line));
        }
        Parser {
            tokens,
            position: 0,
            symbols: SymbolTableManager::new(),
            config,
        }
    }

    pub fn symbols(&self) -> &SymbolTableManager {
        &self.symbols
    }

    pub fn into_parts(self) -> (Vec<Token>, SymbolTableManager) {
        (self.tokens, self.symbols)
    }

    /// Parse the entire program.
    ///
    /// ```text
    /// program ::= definition* EOF
    /// ```
    ///
    /// Succeeds only if some class declared `mainEntry`.
    pub fn parse_program(&mut self) -> Result<ParseTree, Diagnostic> {
        if !self.check_any(&[
            TokenKind::AccessModifier,
            TokenKind::Class,
            TokenKind::Struct,
            TokenKind::Interface,
            TokenKind::EndMarker,
        ]) {
            return Err(self.syntax_error("a class, struct or interface declaration"));
        }

        let mut definitions = Vec::new();
        while !self.is_at_end() {
            definitions.push(self.parse_definition()?);
        }
        definitions.push(ParseTree::Empty);

        if !self.symbols.main_found() {
            return Err(Diagnostic::Program {
                error: SemanticError::MissingMain,
            });
        }

        debug!(
            "parsed {} definitions, {} scope entries",
            self.symbols.definitions().len(),
            self.symbols.scope_table().len()
        );

        Ok(ParseTree::node(
            "program",
            vec![ParseTree::node("class_int_struct_def_list", definitions)],
        ))
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek_kind())
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::EndMarker)
    }

    /// Consume the current token. The end marker is never consumed.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    /// Consume the current token as a tree leaf.
    pub(crate) fn take_leaf(&mut self) -> ParseTree {
        ParseTree::leaf(&self.advance())
    }

    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        expected: &str,
    ) -> Result<ParseTree, Diagnostic> {
        if self.check(kind) {
            Ok(self.take_leaf())
        } else {
            Err(self.syntax_error(expected))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<(ParseTree, String), Diagnostic> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Ok((ParseTree::leaf(&token), token.value))
        } else {
            Err(self.syntax_error("an identifier"))
        }
    }

    pub(crate) fn syntax_error(&self, expected: &str) -> Diagnostic {
        let token = self.peek();
        let found = match token.kind {
            TokenKind::Invalid => format!("invalid lexeme '{}'", token.value),
            _ => token.to_string(),
        };
        Diagnostic::Syntax {
            line: token.line,
            found,
            expected: expected.to_string(),
        }
    }

    /// Semantic error reported at the most recently consumed token.
    pub(crate) fn semantic_error(&self, error: SemanticError) -> Diagnostic {
        Diagnostic::Semantic {
            line: self.previous_line(),
            error,
        }
    }

    pub(crate) fn previous_line(&self) -> usize {
        match self.position {
            0 => self.peek().line,
            n => self.tokens[n - 1].line,
        }
    }

    /// Name of the definition whose body is being parsed.
    pub(crate) fn current_definition(&self) -> String {
        self.symbols
            .current_definition()
            .unwrap_or_default()
            .to_string()
    }
}
