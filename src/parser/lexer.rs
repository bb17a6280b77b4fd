//! Lexer (tokenizer)
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//!
//! The scanner accumulates characters into a pending lexeme and decides before
//! each character whether the pending lexeme is complete. Completed lexemes are
//! classified by [`Token::classify`]. Comments are dropped, whitespace separates
//! lexemes, and the stream always ends with exactly one
//! [`TokenKind::EndMarker`].
//!
//! Tokenizing never fails: unrecognised lexemes become
//! [`TokenKind::Invalid`] tokens and are rejected by the parser.

use super::token::{is_identifier, is_operator_char, operator_kind, Token, TokenKind, ESCAPE_CHARS};
use log::trace;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    pending: String,
    pending_line: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            pending: String::new(),
            pending_line: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            if self.pending == "//" {
                self.pending.clear();
                self.skip_line_comment();
                continue;
            }
            if self.pending == "/*" {
                self.pending.clear();
                self.skip_block_comment();
                continue;
            }

            if self.should_break(c) {
                self.flush();
            }

            if self.in_literal(c) || !is_whitespace(c) {
                if self.pending.is_empty() {
                    self.pending_line = self.line;
                }
                self.pending.push(c);
            }

            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if !self.pending.starts_with("//") && !self.pending.starts_with("/*") {
            self.flush();
        }
        self.tokens
            .push(Token::new(TokenKind::EndMarker, "", self.line));

        trace!("tokenized {} tokens over {} lines", self.tokens.len(), self.line);
        self.tokens
    }

    /// Whether the pending lexeme is complete before consuming `c`.
    fn should_break(&self, c: char) -> bool {
        let pending = self.pending.as_str();
        if pending.is_empty() {
            return false;
        }

        if self.in_literal(c) {
            return false;
        }

        // Decimal points continue numbers; after an identifier they are member access
        if c == '.' && !pending.contains('.') {
            if is_identifier(pending) {
                return true;
            }
            let digits = pending.trim_start_matches(['+', '-']);
            let next_is_digit = self.peek_ahead(1).is_some_and(|n| n.is_ascii_digit());
            if (!digits.is_empty() && digits.chars().all(|d| d.is_ascii_digit())) || next_is_digit {
                return false;
            }
        }

        if pending == "." && c.is_ascii_digit() {
            return false;
        }

        if is_whitespace(c) {
            return true;
        }

        if (c == '"' || c == '\'') && !pending.contains(['"', '\'']) {
            return true;
        }

        let mut joined = String::with_capacity(pending.len() + 1);
        joined.push_str(pending);
        joined.push(c);

        if joined == "//" || joined == "/*" {
            return false;
        }

        if is_operator_char(c) {
            // Prefer the longer operator
            return operator_kind(&joined).is_none();
        }

        if (pending == "+" || pending == "-") && c.is_ascii_digit() && self.sign_attaches() {
            return false;
        }

        if operator_kind(pending).is_some() {
            return true;
        }

        // A closed literal followed by anything
        pending.starts_with(['"', '\''])
    }

    /// A leading sign belongs to the number unless the previous token produced
    /// a value, in which case it is a binary operator.
    fn sign_attaches(&self) -> bool {
        self.tokens
            .last()
            .map_or(true, |previous| !previous.kind.produces_value())
    }

    fn in_literal(&self, c: char) -> bool {
        self.in_string_literal(c) || self.in_char_literal(c)
    }

    fn in_string_literal(&self, c: char) -> bool {
        let pending = self.pending.as_str();
        if !pending.starts_with('"') || c == '\n' {
            return false;
        }
        if pending.len() == 1 || !pending.ends_with('"') {
            return true;
        }
        // Closed unless the final quote is escaped by an odd run of backslashes
        let backslashes = pending[..pending.len() - 1]
            .chars()
            .rev()
            .take_while(|&ch| ch == '\\')
            .count();
        backslashes % 2 == 1
    }

    fn in_char_literal(&self, c: char) -> bool {
        if !self.pending.starts_with('\'') || c == '\n' {
            return false;
        }
        let body: Vec<char> = self.pending.chars().skip(1).collect();
        match body.as_slice() {
            [] | ['\\'] => true,
            ['\\', escaped] => ESCAPE_CHARS.contains(escaped),
            [ch] => *ch != '\'',
            _ => false,
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let lexeme = std::mem::take(&mut self.pending);
        self.tokens.push(Token::classify(&lexeme, self.pending_line));
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skips through the closing `*/`; an unterminated comment runs to the end.
    fn skip_block_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '*' && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Convenience wrapper for [`Lexer::tokenize`].
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
