//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Loop control: `break;`, `continue;`
//! - Returns: `return;`, `return expr;`
//! - Conditionals: `if (cond) body else body`
//! - Loops: `while (cond) body`, `for (init; cond; step) body`
//! - Declarations: `declare int x = 1, y;`
//! - Assignments and calls: `this->count += 1;`, `*p = 2;`, `shape.draw();`
//!
//! # Grammar
//!
//! ```text
//! multiple_statements ::= statement*
//! statement   ::= BREAK_CONTINUE ';'
//!               | 'return' value? ';'
//!               | 'if' '(' expression ')' body ('else' body)?
//!               | 'while' '(' expression ')' body
//!               | 'for' '(' (declaration | assignment_statement) ';' expression ';'
//!                       assignment_statement ')' body
//!               | declaration ';'
//!               | assignment_statement ';'
//! body        ::= '{' multiple_statements '}' | statement
//! declaration ::= 'declare' type declarator (',' declarator)*
//! declarator  ::= IDENT ('=' value)?
//! assignment_statement ::= '*'? reference (ASSIGN value)?
//! ```
//!
//! Every branch and loop body gets its own scope. A `for` loop's scope opens
//! before its initializer, so a variable declared there is visible to the
//! condition, the step and the body but not after the loop.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::Diagnostic;
use crate::parser::parse::Parser;
use crate::parser::references::Reference;
use crate::parser::token::TokenKind;
use crate::parser::tree::ParseTree;
use crate::semantics::errors::SemanticError;
use crate::semantics::operators::{BinaryOperator, UnaryOperator};
use crate::semantics::tables::MemberTableEntry;
use crate::semantics::types::{AccessModifier, MemberType, TypeInfo};

/// Tokens that can start a statement.
const STATEMENT_START: [TokenKind; 10] = [
    TokenKind::BreakContinue,
    TokenKind::Return,
    TokenKind::If,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Declare,
    TokenKind::This,
    TokenKind::Super,
    TokenKind::Identifier,
    TokenKind::Multiply,
];

/// Tokens that can start an assignment or call statement.
const ASSIGNMENT_START: [TokenKind; 4] = [
    TokenKind::This,
    TokenKind::Super,
    TokenKind::Identifier,
    TokenKind::Multiply,
];

/// Where a `declare` puts its names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclarationTarget {
    /// The innermost scope.
    Local,
    /// The member table of the definition being parsed.
    Member {
        access: AccessModifier,
        is_static: bool,
    },
}

impl Parser {
    pub(crate) fn parse_multiple_statements(&mut self) -> Result<ParseTree, Diagnostic> {
        let mut statements = Vec::new();
        while self.check_any(&STATEMENT_START) {
            statements.push(self.parse_statement()?);
        }
        statements.push(ParseTree::Empty);
        Ok(ParseTree::node("multiple_statements", statements))
    }

    fn parse_statement(&mut self) -> Result<ParseTree, Diagnostic> {
        let statement = match self.peek_kind() {
            TokenKind::BreakContinue => {
                let token = self.advance();
                if !self.symbols.check_inside_loop() {
                    return Err(self.semantic_error(SemanticError::OutsideLoop {
                        keyword: token.value,
                    }));
                }
                let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
                ParseTree::node("break_continue", vec![ParseTree::leaf(&token), semicolon])
            }
            TokenKind::Return => self.parse_return()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Declare => {
                let declaration = self.parse_variable_declaration(DeclarationTarget::Local)?;
                let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
                ParseTree::node("declaration_statement", vec![declaration, semicolon])
            }
            TokenKind::This | TokenKind::Super | TokenKind::Identifier | TokenKind::Multiply => {
                let assignment = self.parse_assignment_statement()?;
                let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
                ParseTree::node("expression_statement", vec![assignment, semicolon])
            }
            _ => return Err(self.syntax_error("a statement")),
        };

        Ok(ParseTree::node("statement", vec![statement]))
    }

    fn parse_return(&mut self) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();
        let expected = self
            .symbols
            .return_type()
            .cloned()
            .unwrap_or_else(TypeInfo::void);

        let value = if self.check(TokenKind::Semicolon) {
            if !expected.is_void() {
                return Err(self.semantic_error(SemanticError::MissingReturnValue {
                    expected: expected.to_string(),
                }));
            }
            ParseTree::Empty
        } else {
            let (value, found) = self.parse_value()?;
            if expected.is_void() {
                return Err(self.semantic_error(SemanticError::UnexpectedReturnValue));
            }
            if !self.symbols.check_assignment(&expected, &found) {
                return Err(self.semantic_error(SemanticError::IncompatibleReturn {
                    found: found.to_string(),
                    expected: expected.to_string(),
                }));
            }
            value
        };

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        Ok(ParseTree::node("return_statement", vec![keyword, value, semicolon]))
    }

    /// `( expression )` whose type must be bool
    fn parse_condition(&mut self) -> Result<(ParseTree, ParseTree, ParseTree), Diagnostic> {
        let open = self.expect(TokenKind::ParenOpen, "'('")?;
        let condition = self.parse_bool_expression()?;
        let close = self.expect(TokenKind::ParenClose, "')'")?;
        Ok((open, condition, close))
    }

    fn parse_bool_expression(&mut self) -> Result<ParseTree, Diagnostic> {
        let (expression, ty) = self.parse_expression()?;
        if !ty.is_named("bool") {
            return Err(self.semantic_error(SemanticError::NonBoolCondition {
                found: ty.to_string(),
            }));
        }
        Ok(expression)
    }

    fn parse_if(&mut self) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();
        let (open, condition, close) = self.parse_condition()?;
        let body = self.parse_scoped_body(false)?;

        let else_branch = if self.check(TokenKind::Else) {
            let keyword = self.take_leaf();
            let body = self.parse_scoped_body(false)?;
            ParseTree::node("else_statement", vec![keyword, body])
        } else {
            ParseTree::Empty
        };

        Ok(ParseTree::node(
            "if_statement",
            vec![keyword, open, condition, close, body, else_branch],
        ))
    }

    fn parse_while(&mut self) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();
        let (open, condition, close) = self.parse_condition()?;
        let body = self.parse_scoped_body(true)?;
        Ok(ParseTree::node(
            "while_loop",
            vec![keyword, open, condition, close, body],
        ))
    }

    fn parse_for(&mut self) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();
        let open = self.expect(TokenKind::ParenOpen, "'('")?;
        self.symbols.create_scope(true);

        let init = match self.peek_kind() {
            TokenKind::Declare => self.parse_variable_declaration(DeclarationTarget::Local)?,
            kind if ASSIGNMENT_START.contains(&kind) => self.parse_assignment_statement()?,
            _ => return Err(self.syntax_error("a declaration or an assignment")),
        };
        let first_semicolon = self.expect(TokenKind::Semicolon, "';'")?;

        let condition = self.parse_bool_expression()?;
        let second_semicolon = self.expect(TokenKind::Semicolon, "';'")?;

        if !self.check_any(&ASSIGNMENT_START) {
            return Err(self.syntax_error("an assignment"));
        }
        let step = self.parse_assignment_statement()?;
        let close = self.expect(TokenKind::ParenClose, "')'")?;

        let body = self.parse_body()?;
        self.symbols.destroy_scope();

        Ok(ParseTree::node(
            "for_loop",
            vec![
                keyword,
                open,
                init,
                first_semicolon,
                condition,
                second_semicolon,
                step,
                close,
                body,
            ],
        ))
    }

    /// A body inside its own scope.
    fn parse_scoped_body(&mut self, is_loop: bool) -> Result<ParseTree, Diagnostic> {
        self.symbols.create_scope(is_loop);
        let body = self.parse_body()?;
        self.symbols.destroy_scope();
        Ok(body)
    }

    fn parse_body(&mut self) -> Result<ParseTree, Diagnostic> {
        if self.check(TokenKind::BraceOpen) {
            let open = self.take_leaf();
            let statements = self.parse_multiple_statements()?;
            let close = self.expect(TokenKind::BraceClose, "a statement or '}'")?;
            Ok(ParseTree::node("body", vec![open, statements, close]))
        } else {
            let statement = self.parse_statement()?;
            Ok(ParseTree::node("body", vec![statement]))
        }
    }

    /// `declare type a = v, b` for locals and fields alike
    pub(crate) fn parse_variable_declaration(
        &mut self,
        target: DeclarationTarget,
    ) -> Result<ParseTree, Diagnostic> {
        let keyword = self.expect(TokenKind::Declare, "'declare'")?;
        let (type_node, ty) = self.parse_type()?;

        let mut children = vec![keyword, type_node];
        loop {
            children.push(self.parse_declarator(&ty, target)?);
            if !self.check(TokenKind::Comma) {
                break;
            }
            children.push(self.take_leaf());
        }

        Ok(ParseTree::node("variable_declaration", children))
    }

    fn parse_declarator(
        &mut self,
        ty: &TypeInfo,
        target: DeclarationTarget,
    ) -> Result<ParseTree, Diagnostic> {
        let (name_leaf, name) = self.expect_identifier()?;

        match target {
            DeclarationTarget::Local => {
                if !self.symbols.insert_scope_entry(&name, ty.clone()) {
                    return Err(self.semantic_error(SemanticError::VariableRedeclared { name }));
                }
            }
            DeclarationTarget::Member { access, is_static } => {
                let owner = self.current_definition();
                let member = MemberTableEntry::new(name.clone(), MemberType::Variable(ty.clone()))
                    .with_access(access)
                    .with_static(is_static);
                if !self.symbols.insert_member(&owner, member) {
                    return Err(self.semantic_error(SemanticError::MemberRedeclared { name, owner }));
                }
            }
        }

        let initializer = if self.check(TokenKind::Assignment) {
            let equals = self.take_leaf();
            let (value, value_type) = self.parse_value()?;
            if !self.symbols.check_assignment(ty, &value_type) {
                return Err(self.semantic_error(SemanticError::IncompatibleAssignment {
                    target: ty.to_string(),
                    value: value_type.to_string(),
                }));
            }
            ParseTree::node("initialization", vec![equals, value])
        } else {
            ParseTree::Empty
        };

        Ok(ParseTree::node("declarator", vec![name_leaf, initializer]))
    }

    /// An assignment to a reference, or a bare call.
    ///
    /// A leading `*` assigns through the pointer the reference holds.
    pub(crate) fn parse_assignment_statement(&mut self) -> Result<ParseTree, Diagnostic> {
        let deref = if self.check(TokenKind::Multiply) {
            self.take_leaf()
        } else {
            ParseTree::Empty
        };
        let (reference_node, reference) = self.parse_reference()?;

        let assignment = match reference {
            Reference::Call(ty) => {
                if !deref.is_empty() {
                    self.dereference(&ty)?;
                }
                if self.check_any(&[TokenKind::Assignment, TokenKind::CompoundAssignment]) {
                    return Err(self.semantic_error(SemanticError::AssignToCall));
                }
                ParseTree::Empty
            }
            Reference::Variable(ty) => {
                let target = if deref.is_empty() {
                    ty
                } else {
                    self.dereference(&ty)?
                };
                self.parse_assignment(&target)?
            }
        };

        Ok(ParseTree::node(
            "assignment_statement",
            vec![deref, reference_node, assignment],
        ))
    }

    fn dereference(&self, ty: &TypeInfo) -> Result<TypeInfo, Diagnostic> {
        self.symbols
            .check_unary(ty, UnaryOperator::Deref)
            .ok_or_else(|| {
                self.semantic_error(SemanticError::UnsupportedUnary {
                    op: UnaryOperator::Deref.to_string(),
                    operand: ty.to_string(),
                })
            })
    }

    /// `= value` or a compound assignment, type-checked against `target`
    fn parse_assignment(&mut self, target: &TypeInfo) -> Result<ParseTree, Diagnostic> {
        if !self.check_any(&[TokenKind::Assignment, TokenKind::CompoundAssignment]) {
            return Err(self.syntax_error("an assignment operator"));
        }
        let token = self.advance();
        let op = BinaryOperator::from_lexeme(&token.value)
            .filter(|op| *op == BinaryOperator::Assign || op.is_compound_assignment())
            .ok_or_else(|| self.syntax_error("an assignment operator"))?;

        let (value, value_type) = self.parse_value()?;
        if self.symbols.check_binary(target, &value_type, op).is_none() {
            let error = match op {
                BinaryOperator::Assign => SemanticError::IncompatibleAssignment {
                    target: target.to_string(),
                    value: value_type.to_string(),
                },
                _ => SemanticError::UnsupportedBinary {
                    op: op.to_string(),
                    left: target.to_string(),
                    right: value_type.to_string(),
                },
            };
            return Err(self.semantic_error(error));
        }

        Ok(ParseTree::node(
            "assignment",
            vec![ParseTree::leaf(&token), value],
        ))
    }
}
