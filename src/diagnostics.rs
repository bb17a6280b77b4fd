//! Diagnostics produced by a failed parse
//!
//! A parse stops at its first problem, so a failed parse yields exactly one
//! [`Diagnostic`]. The core never prints it; rendering is up to the caller.

use crate::semantics::errors::SemanticError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntax,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The current token is not one the production accepts. Invalid lexemes
    /// end up here too.
    #[error("Syntax error at line {line}: error parsing {found}, expected {expected}")]
    Syntax {
        line: usize,
        found: String,
        expected: String,
    },

    #[error("Semantic error at line {line}: {error}")]
    Semantic { line: usize, error: SemanticError },

    /// Whole-program errors that have no single source line.
    #[error("Semantic error: {error}")]
    Program { error: SemanticError },
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::Syntax { .. } => DiagnosticKind::Syntax,
            Diagnostic::Semantic { .. } | Diagnostic::Program { .. } => DiagnosticKind::Semantic,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Diagnostic::Syntax { line, .. } | Diagnostic::Semantic { line, .. } => Some(*line),
            Diagnostic::Program { .. } => None,
        }
    }

    /// Message without the kind/line prefix.
    pub fn message(&self) -> String {
        match self {
            Diagnostic::Syntax {
                found, expected, ..
            } => format!("error parsing {found}, expected {expected}"),
            Diagnostic::Semantic { error, .. } | Diagnostic::Program { error } => error.to_string(),
        }
    }

    /// The semantic error, if this is one.
    pub fn semantic_error(&self) -> Option<&SemanticError> {
        match self {
            Diagnostic::Semantic { error, .. } | Diagnostic::Program { error } => Some(error),
            Diagnostic::Syntax { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display() {
        let diagnostic = Diagnostic::Syntax {
            line: 4,
            found: "'}'".to_string(),
            expected: "';'".to_string(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "Syntax error at line 4: error parsing '}', expected ';'"
        );
        assert_eq!(diagnostic.kind(), DiagnosticKind::Syntax);
        assert_eq!(diagnostic.line(), Some(4));
        assert!(diagnostic.semantic_error().is_none());
    }

    #[test]
    fn test_semantic_display() {
        let diagnostic = Diagnostic::Semantic {
            line: 7,
            error: SemanticError::UndeclaredVariable {
                name: "count".to_string(),
            },
        };
        assert_eq!(
            diagnostic.to_string(),
            "Semantic error at line 7: Undeclared variable 'count'"
        );
        assert_eq!(diagnostic.message(), "Undeclared variable 'count'");
    }

    #[test]
    fn test_program_has_no_line() {
        let diagnostic = Diagnostic::Program {
            error: SemanticError::MissingMain,
        };
        assert_eq!(diagnostic.line(), None);
        assert_eq!(diagnostic.kind(), DiagnosticKind::Semantic);
        assert_eq!(diagnostic.to_string(), "Semantic error: No main method found");
    }
}
