//! Expression parsing implementation
//!
//! This module handles parsing of values and expressions with proper
//! operator precedence, plus the value forms that only appear on the right of
//! an assignment: `&` references, `makeObj` and array literals.
//!
//! # Operator Precedence (lowest to highest)
//!
//! 1. Logical OR: `||`
//! 2. Logical AND: `&&`
//! 3. Relational: `<`, `>`, `<=`, `>=`, `==`, `!=`
//! 4. Additive: `+`, `-`
//! 5. Multiplicative: `*`, `/`, `%`
//! 6. Factors: `!x`, `*p`, `(expr)`, literals, references
//!
//! # Grammar
//!
//! ```text
//! value       ::= '&' reference | 'makeObj' IDENT args | array_literal | expression
//! expression  ::= or_expr
//! or_expr     ::= and_expr ('||' and_expr)*
//! and_expr    ::= rel_expr ('&&' rel_expr)*
//! rel_expr    ::= add_expr (RELATIONAL add_expr)*
//! add_expr    ::= mul_expr (PLUS_MINUS mul_expr)*
//! mul_expr    ::= factor (('*' | DIVIDE_MODULUS) factor)*
//! factor      ::= reference | LITERAL | '(' expression ')' | '!' factor | '*' reference
//! array_literal ::= '[' (element (',' element)*)? ']'
//! element     ::= array_literal | 'makeObj' IDENT args | expression
//! ```
//!
//! Each binary level is a left fold: the type of `a op b` is computed as soon
//! as `b` is parsed, and becomes the left operand of the next operator.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::Diagnostic;
use crate::parser::parse::Parser;
use crate::parser::token::TokenKind;
use crate::parser::tree::ParseTree;
use crate::semantics::errors::SemanticError;
use crate::semantics::operators::{BinaryOperator, UnaryOperator};
use crate::semantics::types::{join_types, AccessModifier, DefinitionKind, TypeInfo};

type Production = fn(&mut Parser) -> Result<(ParseTree, TypeInfo), Diagnostic>;

impl Parser {
    /// Right-hand side of an assignment, an initializer, an argument or a
    /// return value
    pub(crate) fn parse_value(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let (child, ty) = match self.peek_kind() {
            TokenKind::Reference => {
                let ampersand = self.take_leaf();
                let (reference, target) = self.parse_reference()?;
                let target = target.into_type();
                let ty = self.unary_type(&target, UnaryOperator::AddressOf)?;
                (
                    ParseTree::node("pointer_initialization", vec![ampersand, reference]),
                    ty,
                )
            }
            TokenKind::ObjectCreator => self.parse_object_creation()?,
            TokenKind::BracketOpen => self.parse_array_literal(1)?,
            _ => self.parse_expression()?,
        };
        Ok((ParseTree::node("value", vec![child]), ty))
    }

    pub(crate) fn parse_expression(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let (or_expression, ty) = self.parse_or_expression()?;
        Ok((ParseTree::node("expression", vec![or_expression]), ty))
    }

    fn parse_or_expression(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        self.parse_binary_level(
            "or_expression",
            &[TokenKind::LogicalOr],
            Parser::parse_and_expression,
        )
    }

    fn parse_and_expression(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        self.parse_binary_level(
            "and_expression",
            &[TokenKind::LogicalAnd],
            Parser::parse_relational_expression,
        )
    }

    fn parse_relational_expression(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        self.parse_binary_level(
            "relational_expression",
            &[TokenKind::Relational],
            Parser::parse_plus_minus,
        )
    }

    fn parse_plus_minus(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        self.parse_binary_level(
            "plus_minus",
            &[TokenKind::PlusMinus],
            Parser::parse_mul_div_mod,
        )
    }

    fn parse_mul_div_mod(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        self.parse_binary_level(
            "mul_div_mod",
            &[TokenKind::Multiply, TokenKind::DivideModulus],
            Parser::parse_factor,
        )
    }

    /// `operand (op operand)*`, type-checked left to right.
    ///
    /// The tree keeps the grammar's right-recursive tail shape:
    /// `label(operand, tail(op, operand, tail(...)))`, ending in an empty node.
    fn parse_binary_level(
        &mut self,
        label: &'static str,
        operators: &[TokenKind],
        operand: Production,
    ) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let (first, mut ty) = operand(self)?;

        let mut tail = Vec::new();
        while self.check_any(operators) {
            let token = self.advance();
            let (right, right_type) = operand(self)?;

            let result = BinaryOperator::from_lexeme(&token.value)
                .and_then(|op| self.symbols.check_binary(&ty, &right_type, op));
            ty = match result {
                Some(result) => result,
                None => {
                    return Err(self.semantic_error(SemanticError::UnsupportedBinary {
                        op: token.value,
                        left: ty.to_string(),
                        right: right_type.to_string(),
                    }))
                }
            };
            tail.push((ParseTree::leaf(&token), right));
        }

        let tail = tail
            .into_iter()
            .rev()
            .fold(ParseTree::Empty, |rest, (operator, right)| {
                ParseTree::node("expression_tail", vec![operator, right, rest])
            });
        Ok((ParseTree::node(label, vec![first, tail]), ty))
    }

    fn parse_factor(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let (children, ty) = match self.peek_kind() {
            TokenKind::This | TokenKind::Super | TokenKind::Identifier => {
                let (reference, target) = self.parse_reference()?;
                (vec![reference], target.into_type())
            }
            TokenKind::IntegerLiteral => (vec![self.take_leaf()], TypeInfo::int()),
            TokenKind::FloatLiteral => (vec![self.take_leaf()], TypeInfo::float()),
            TokenKind::StringLiteral => (vec![self.take_leaf()], TypeInfo::string()),
            TokenKind::CharLiteral => (vec![self.take_leaf()], TypeInfo::char()),
            TokenKind::BoolLiteral => (vec![self.take_leaf()], TypeInfo::bool()),
            TokenKind::ParenOpen => {
                let open = self.take_leaf();
                let (expression, ty) = self.parse_expression()?;
                let close = self.expect(TokenKind::ParenClose, "')'")?;
                (vec![open, expression, close], ty)
            }
            TokenKind::Not => {
                let not = self.take_leaf();
                let (operand, operand_type) = self.parse_factor()?;
                let ty = self.unary_type(&operand_type, UnaryOperator::Not)?;
                (vec![not, operand], ty)
            }
            TokenKind::Multiply => {
                let star = self.take_leaf();
                let (reference, target) = self.parse_reference()?;
                let ty = self.unary_type(&target.into_type(), UnaryOperator::Deref)?;
                (
                    vec![ParseTree::node("pointer_dereference", vec![star, reference])],
                    ty,
                )
            }
            _ => return Err(self.syntax_error("an expression")),
        };
        Ok((ParseTree::node("factor", children), ty))
    }

    fn unary_type(&self, operand: &TypeInfo, op: UnaryOperator) -> Result<TypeInfo, Diagnostic> {
        self.symbols.check_unary(operand, op).ok_or_else(|| {
            self.semantic_error(SemanticError::UnsupportedUnary {
                op: op.to_string(),
                operand: operand.to_string(),
            })
        })
    }

    /// `makeObj Name(args)`
    fn parse_object_creation(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let keyword = self.take_leaf();
        let (name_leaf, name) = self.expect_identifier()?;

        let error = match self.symbols.lookup_definition(&name) {
            None => Some(SemanticError::UndeclaredDefinition { name: name.clone() }),
            Some(def) if def.kind == DefinitionKind::Interface => {
                Some(SemanticError::InterfaceInstantiation { name: name.clone() })
            }
            Some(def)
                if def.access == AccessModifier::Private
                    && self.symbols.current_definition() != Some(name.as_str()) =>
            {
                Some(SemanticError::PrivateDefinition { name: name.clone() })
            }
            Some(_) => None,
        };
        if let Some(error) = error {
            return Err(self.semantic_error(error));
        }

        let (args, arg_types) = self.parse_func_args()?;
        if self
            .symbols
            .lookup_member_function("constructor", &arg_types, &name)
            .is_none()
        {
            return Err(self.semantic_error(SemanticError::UndeclaredConstructor {
                name,
                args: join_types(&arg_types),
            }));
        }

        Ok((
            ParseTree::node("object_creation", vec![keyword, name_leaf, args]),
            TypeInfo::new(name),
        ))
    }

    /// `[e1, e2, ...]` at nesting `depth` (the outermost literal is depth 1).
    ///
    /// Elements must share one type; the literal has one more dimension than
    /// its elements. `[]` is an array of not-yet-known element type.
    fn parse_array_literal(&mut self, depth: usize) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let max = self.config.max_array_dimensions;
        if depth > max {
            return Err(self.semantic_error(SemanticError::ArrayTooDeep { max }));
        }
        let open = self.expect(TokenKind::BracketOpen, "'['")?;

        if self.check(TokenKind::BracketClose) {
            let close = self.take_leaf();
            return Ok((
                ParseTree::node("array_literal", vec![open, ParseTree::Empty, close]),
                TypeInfo::unresolved_array(),
            ));
        }

        let (first, element_type) = self.parse_array_element(depth)?;
        let mut elements = vec![first];
        while self.check(TokenKind::Comma) {
            elements.push(self.take_leaf());
            let (element, ty) = self.parse_array_element(depth)?;
            if ty != element_type {
                return Err(self.semantic_error(SemanticError::MixedArrayElements {
                    expected: element_type.to_string(),
                    found: ty.to_string(),
                }));
            }
            elements.push(element);
        }
        elements.push(ParseTree::Empty);
        let close = self.expect(TokenKind::BracketClose, "',' or ']'")?;

        let dimensions = element_type.dimensions + 1;
        if dimensions > max {
            return Err(self.semantic_error(SemanticError::ArrayTooDeep { max }));
        }
        Ok((
            ParseTree::node(
                "array_literal",
                vec![open, ParseTree::node("array_elements", elements), close],
            ),
            element_type.with_dimensions(dimensions),
        ))
    }

    fn parse_array_element(&mut self, depth: usize) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let (element, ty) = match self.peek_kind() {
            TokenKind::BracketOpen => self.parse_array_literal(depth + 1)?,
            TokenKind::ObjectCreator => self.parse_object_creation()?,
            _ => self.parse_expression()?,
        };
        if ty.is_pointer {
            return Err(self.semantic_error(SemanticError::PointerArrayElement));
        }
        Ok((element, ty))
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::Diagnostic;
    use crate::parser::parse::{Parser, ParserConfig};
    use crate::semantics::errors::SemanticError;
    use crate::semantics::types::TypeInfo;

    /// Wraps `statements` in a class with a main entry.
    fn parse_main(statements: &str) -> Result<Parser, Diagnostic> {
        let source = format!("class Main {{ mainEntry() {{ {} }} }}", statements);
        let mut parser = Parser::new(&source);
        parser.parse_program()?;
        Ok(parser)
    }

    fn semantic_error(statements: &str) -> SemanticError {
        match parse_main(statements) {
            Err(Diagnostic::Semantic { error, .. }) => error,
            Err(other) => panic!("expected a semantic error, got {}", other),
            Ok(_) => panic!("expected a semantic error"),
        }
    }

    fn local_type(parser: &Parser, name: &str) -> TypeInfo {
        parser
            .symbols()
            .scope_table()
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.type_info.clone())
            .expect("variable declared")
    }

    #[test]
    fn test_precedence_types() {
        let parser = parse_main(
            "declare bool b = 1 + 2 * 3 < 10 && !false || 2.5 >= 1; \
             declare float f = 1 + 2.5 * 2; \
             declare string s = 'a' + \"bc\";",
        )
        .unwrap();
        assert_eq!(local_type(&parser, "b"), TypeInfo::bool());
        assert_eq!(local_type(&parser, "f"), TypeInfo::float());
        assert_eq!(local_type(&parser, "s"), TypeInfo::string());
    }

    #[test]
    fn test_unsupported_binary() {
        assert!(matches!(
            semantic_error("declare int x = 1 + true;"),
            SemanticError::UnsupportedBinary { .. }
        ));
        assert!(matches!(
            semantic_error("declare bool b = 1 && true;"),
            SemanticError::UnsupportedBinary { .. }
        ));
    }

    #[test]
    fn test_float_to_int_rejected() {
        assert!(matches!(
            semantic_error("declare int x = 1.5;"),
            SemanticError::IncompatibleAssignment { .. }
        ));
        assert!(parse_main("declare float f = 3;").is_ok());
    }

    #[test]
    fn test_pointers() {
        let parser = parse_main("declare int x = 1; declare int* p = &x; declare int y = *p;").unwrap();
        assert_eq!(local_type(&parser, "p"), TypeInfo::int().with_pointer());
        assert!(matches!(
            semantic_error("declare int x = 1; declare int y = *x;"),
            SemanticError::UnsupportedUnary { .. }
        ));
    }

    #[test]
    fn test_array_literals() {
        let parser = parse_main(
            "declare int[2][2] grid = [[1, 2], [3, 4]]; declare int[] empty = []; \
             declare int[][] rows = [[], []];",
        )
        .unwrap();
        assert_eq!(local_type(&parser, "grid"), TypeInfo::int().with_dimensions(2));

        assert!(matches!(
            semantic_error("declare int[] a = [1, 2.5];"),
            SemanticError::MixedArrayElements { .. }
        ));
        assert!(matches!(
            semantic_error("declare int[] a = [[1]];"),
            SemanticError::IncompatibleAssignment { .. }
        ));
        assert!(matches!(
            semantic_error("declare int[][][] a = [[[[1]]]];"),
            SemanticError::ArrayTooDeep { max: 3 }
        ));
    }

    #[test]
    fn test_array_depth_is_configurable() {
        let source = "class Main { mainEntry() { declare int[][][][] a = [[[[1]]]]; } }";
        let config = ParserConfig {
            max_array_dimensions: 4,
        };
        assert!(Parser::with_config(source, config).parse_program().is_ok());
        assert!(Parser::new(source).parse_program().is_err());
    }

    #[test]
    fn test_object_creation() {
        let source = "interface Shape { } \
                      class Box { constructor(int size) { } } \
                      class Main { mainEntry() { declare Box b = makeObj Box(2); } }";
        assert!(Parser::new(source).parse_program().is_ok());

        let source = "interface Shape { } \
                      class Main { mainEntry() { declare Shape s = makeObj Shape(); } }";
        let err = Parser::new(source).parse_program().unwrap_err();
        assert!(matches!(
            err.semantic_error(),
            Some(SemanticError::InterfaceInstantiation { .. })
        ));

        let source = "class Box { constructor(int size) { } } \
                      class Main { mainEntry() { declare Box b = makeObj Box(); } }";
        let err = Parser::new(source).parse_program().unwrap_err();
        assert!(matches!(
            err.semantic_error(),
            Some(SemanticError::UndeclaredConstructor { .. })
        ));
    }
}
