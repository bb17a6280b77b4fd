//! Declaration parsing implementation
//!
//! This module handles parsing of top-level definitions and their members:
//!
//! - Class, struct and interface headers: `class Circle inherits Shape implements Drawable`
//! - Fields: `declare int radius = 1;`
//! - Methods: `public static float function area(float r) { ... }`
//! - Constructors: `constructor(int r) { ... }`
//! - The program entry point: `mainEntry() { ... }`
//! - Interface method declarations: `int function size();`
//! - Parameter lists and type references
//!
//! # Grammar
//!
//! ```text
//! definition     ::= access? (class_def | struct_def | interface_def)
//! class_def      ::= 'class' IDENT inherit? implement? class_body
//! struct_def     ::= 'struct' IDENT inherit? implement? class_body
//! interface_def  ::= 'interface' IDENT inherit? interface_body
//! inherit        ::= 'inherits' IDENT
//! implement      ::= 'implements' IDENT (',' IDENT)*
//! class_body     ::= '{' member* '}'
//! member         ::= access? 'static'? (field | method | constructor | main)
//! field          ::= variable_declaration ';'
//! method         ::= return_type 'function' IDENT '(' params ')' '{' statement* '}'
//! constructor    ::= 'constructor' '(' params ')' '{' statement* '}'
//! main           ::= 'mainEntry' '(' ')' '{' statement* '}'
//! interface_body ::= '{' (return_type 'function' IDENT '(' params ')' ';')* '}'
//! params         ::= (type IDENT (',' type IDENT)*)?
//! type           ::= (DATA_TYPE | IDENT) ('*' | ('[' expression? ']')+)?
//! return_type    ::= type | 'void'
//! ```
//!
//! A definition is entered into the definition table as soon as its header is
//! accepted, so its own body can refer to it. Function parameters live in the
//! scope opened at the parameter list's `(`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::Diagnostic;
use crate::parser::parse::Parser;
use crate::parser::statements::DeclarationTarget;
use crate::parser::token::TokenKind;
use crate::parser::tree::ParseTree;
use crate::semantics::errors::SemanticError;
use crate::semantics::tables::{DefinitionTableEntry, MemberTableEntry};
use crate::semantics::types::{AccessModifier, DefinitionKind, MemberType, TypeInfo};
use log::debug;

/// Tokens that can start a class or struct member.
const MEMBER_START: [TokenKind; 8] = [
    TokenKind::AccessModifier,
    TokenKind::Static,
    TokenKind::Declare,
    TokenKind::DataType,
    TokenKind::Identifier,
    TokenKind::VoidType,
    TokenKind::Constructor,
    TokenKind::MainEntry,
];

/// Tokens that can start an interface member.
const INTERFACE_MEMBER_START: [TokenKind; 3] =
    [TokenKind::DataType, TokenKind::Identifier, TokenKind::VoidType];

impl Parser {
    /// Parse one top-level class, struct or interface definition
    pub(crate) fn parse_definition(&mut self) -> Result<ParseTree, Diagnostic> {
        let (access_node, access) = self.parse_access_optional()?;
        let access = access.unwrap_or(AccessModifier::Public);

        let body = match self.peek_kind() {
            TokenKind::Class => self.parse_class_struct_def(DefinitionKind::Class, access)?,
            TokenKind::Struct => self.parse_class_struct_def(DefinitionKind::Struct, access)?,
            TokenKind::Interface => self.parse_interface_def(access)?,
            _ => return Err(self.syntax_error("'class', 'struct' or 'interface'")),
        };

        Ok(ParseTree::node("class_int_struct_def", vec![access_node, body]))
    }

    pub(crate) fn parse_access_optional(
        &mut self,
    ) -> Result<(ParseTree, Option<AccessModifier>), Diagnostic> {
        if !self.check(TokenKind::AccessModifier) {
            return Ok((ParseTree::Empty, None));
        }
        let token = self.advance();
        let access = AccessModifier::from_keyword(&token.value);
        Ok((
            ParseTree::node("access_mod_optional", vec![ParseTree::leaf(&token)]),
            access,
        ))
    }

    fn parse_static_optional(&mut self) -> (ParseTree, bool) {
        if self.check(TokenKind::Static) {
            let leaf = self.take_leaf();
            (ParseTree::node("static_optional", vec![leaf]), true)
        } else {
            (ParseTree::Empty, false)
        }
    }

    fn parse_class_struct_def(
        &mut self,
        kind: DefinitionKind,
        access: AccessModifier,
    ) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();
        let (name_leaf, name) = self.expect_identifier()?;

        let mut entry = DefinitionTableEntry::new(name.clone(), kind);
        entry.access = access;

        let inherit = self.parse_inherit_optional(&mut entry)?;
        let implement = self.parse_implement_optional(&mut entry)?;

        if !self.symbols.insert_definition(entry) {
            return Err(self.semantic_error(SemanticError::DefinitionRedeclared { name }));
        }
        self.symbols.set_current_definition(Some(name.clone()));

        let body = self.parse_class_struct_body()?;

        if let Err(interface) = self.symbols.check_implements_interface(&name) {
            return Err(self.semantic_error(SemanticError::InterfaceNotImplemented {
                definition: name,
                interface,
            }));
        }

        if !self.symbols.check_constructor_exists(&name) {
            debug!("{}: adding default constructor", name);
            let constructor = MemberTableEntry::new(
                "constructor",
                MemberType::Function {
                    params: Vec::new(),
                    return_type: TypeInfo::void(),
                },
            )
            .with_access(AccessModifier::Public);
            let inserted = self.symbols.insert_member(&name, constructor);
            debug_assert!(inserted, "{} already has a constructor", name);
        }
        self.symbols.set_current_definition(None);

        let label = match kind {
            DefinitionKind::Struct => "struct_def",
            _ => "class_def",
        };
        let header = ParseTree::node("inherit_implement", vec![inherit, implement]);
        Ok(ParseTree::node(label, vec![keyword, name_leaf, header, body]))
    }

    fn parse_interface_def(&mut self, access: AccessModifier) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();
        let (name_leaf, name) = self.expect_identifier()?;

        let mut entry = DefinitionTableEntry::new(name.clone(), DefinitionKind::Interface);
        entry.access = access;
        let inherit = self.parse_inherit_optional(&mut entry)?;

        if !self.symbols.insert_definition(entry) {
            return Err(self.semantic_error(SemanticError::DefinitionRedeclared { name }));
        }
        self.symbols.set_current_definition(Some(name));

        let body = self.parse_interface_body()?;
        self.symbols.set_current_definition(None);

        Ok(ParseTree::node(
            "interface_def",
            vec![keyword, name_leaf, inherit, body],
        ))
    }

    /// `inherits Parent`: the parent must exist, be public and be the same kind
    fn parse_inherit_optional(
        &mut self,
        entry: &mut DefinitionTableEntry,
    ) -> Result<ParseTree, Diagnostic> {
        if !self.check(TokenKind::Inherits) {
            return Ok(ParseTree::Empty);
        }
        let keyword = self.take_leaf();
        let (parent_leaf, parent) = self.expect_identifier()?;

        let error = match self.symbols.lookup_definition(&parent) {
            None => Some(SemanticError::UndeclaredParent {
                name: parent.clone(),
            }),
            Some(def) if def.access == AccessModifier::Private => {
                Some(SemanticError::PrivateParent {
                    name: parent.clone(),
                })
            }
            Some(def) if def.kind != entry.kind => Some(SemanticError::InheritanceKindMismatch {
                child: entry.kind,
                parent: def.kind,
            }),
            Some(_) => None,
        };
        if let Some(error) = error {
            return Err(self.semantic_error(error));
        }

        entry.parent = Some(parent);
        Ok(ParseTree::node("inherit", vec![keyword, parent_leaf]))
    }

    /// `implements I1, I2`: each must be a declared interface, listed once
    fn parse_implement_optional(
        &mut self,
        entry: &mut DefinitionTableEntry,
    ) -> Result<ParseTree, Diagnostic> {
        if !self.check(TokenKind::Implements) {
            return Ok(ParseTree::Empty);
        }
        let mut children = vec![self.take_leaf()];

        loop {
            let (leaf, interface) = self.expect_identifier()?;
            let error = match self.symbols.lookup_definition(&interface) {
                None => Some(SemanticError::UndeclaredInterface {
                    name: interface.clone(),
                }),
                Some(def) if def.kind != DefinitionKind::Interface => {
                    Some(SemanticError::NotAnInterface {
                        name: interface.clone(),
                    })
                }
                Some(_) if entry.interfaces.contains(&interface) => {
                    Some(SemanticError::DuplicateInterface {
                        name: interface.clone(),
                    })
                }
                Some(_) => None,
            };
            if let Some(error) = error {
                return Err(self.semantic_error(error));
            }

            entry.interfaces.push(interface);
            children.push(leaf);

            if !self.check(TokenKind::Comma) {
                break;
            }
            children.push(self.take_leaf());
        }

        Ok(ParseTree::node("implement", children))
    }

    fn parse_class_struct_body(&mut self) -> Result<ParseTree, Diagnostic> {
        let open = self.expect(TokenKind::BraceOpen, "'{'")?;

        let mut members = Vec::new();
        while self.check_any(&MEMBER_START) {
            members.push(self.parse_class_struct_member()?);
        }
        members.push(ParseTree::Empty);

        let close = self.expect(TokenKind::BraceClose, "a member declaration or '}'")?;
        Ok(ParseTree::node(
            "class_struct_body",
            vec![open, ParseTree::node("class_struct_members", members), close],
        ))
    }

    fn parse_class_struct_member(&mut self) -> Result<ParseTree, Diagnostic> {
        let (access_node, declared_access) = self.parse_access_optional()?;
        let (static_node, is_static) = self.parse_static_optional();
        let access = declared_access.unwrap_or(AccessModifier::Private);

        let body = match self.peek_kind() {
            TokenKind::Declare => {
                let declaration =
                    self.parse_variable_declaration(DeclarationTarget::Member { access, is_static })?;
                let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
                ParseTree::node("field_declaration", vec![declaration, semicolon])
            }
            TokenKind::Identifier if !self.at_function_def() => {
                return Err(
                    self.syntax_error("a field, method, constructor or mainEntry declaration")
                )
            }
            TokenKind::DataType | TokenKind::Identifier | TokenKind::VoidType => {
                self.parse_function_def(access, is_static)?
            }
            // Constructors are always public instance members
            TokenKind::Constructor if !access_node.is_empty() || is_static => {
                return Err(self.syntax_error("a field or method declaration"))
            }
            TokenKind::Constructor => self.parse_constructor_def()?,
            TokenKind::MainEntry => self.parse_main_method(access, is_static)?,
            _ => {
                return Err(
                    self.syntax_error("a field, method, constructor or mainEntry declaration")
                )
            }
        };

        Ok(ParseTree::node(
            "class_struct_member",
            vec![access_node, static_node, body],
        ))
    }

    /// Whether the tokens ahead read `type *? ([n?])* function`.
    fn at_function_def(&self) -> bool {
        self.tokens[self.position + 1..]
            .iter()
            .map(|token| token.kind)
            .find(|kind| {
                !matches!(
                    kind,
                    TokenKind::Multiply
                        | TokenKind::BracketOpen
                        | TokenKind::BracketClose
                        | TokenKind::IntegerLiteral
                )
            })
            == Some(TokenKind::Function)
    }

    /// Insert a member into the current definition's table.
    fn declare_member(&mut self, member: MemberTableEntry) -> Result<(), Diagnostic> {
        let owner = self.current_definition();
        let name = member.name.clone();
        if self.symbols.insert_member(&owner, member) {
            Ok(())
        } else {
            Err(self.semantic_error(SemanticError::MemberRedeclared { name, owner }))
        }
    }

    fn parse_function_def(
        &mut self,
        access: AccessModifier,
        is_static: bool,
    ) -> Result<ParseTree, Diagnostic> {
        let (return_node, return_type) = self.parse_return_type()?;
        let keyword = self.expect(TokenKind::Function, "'function'")?;
        let (name_leaf, name) = self.expect_identifier()?;

        let open = self.expect(TokenKind::ParenOpen, "'('")?;
        self.symbols.create_scope(false);
        let (params_node, params) = self.parse_parameter_list()?;
        let close = self.expect(TokenKind::ParenClose, "')'")?;

        let member = MemberTableEntry::new(
            name,
            MemberType::Function {
                params,
                return_type: return_type.clone(),
            },
        )
        .with_access(access)
        .with_static(is_static);
        self.declare_member(member)?;

        let body = self.parse_function_body(return_type)?;
        Ok(ParseTree::node(
            "function_def",
            vec![return_node, keyword, name_leaf, open, params_node, close, body],
        ))
    }

    /// Constructors are always public and return nothing.
    fn parse_constructor_def(&mut self) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();

        let open = self.expect(TokenKind::ParenOpen, "'('")?;
        self.symbols.create_scope(false);
        let (params_node, params) = self.parse_parameter_list()?;
        let close = self.expect(TokenKind::ParenClose, "')'")?;

        let member = MemberTableEntry::new(
            "constructor",
            MemberType::Function {
                params,
                return_type: TypeInfo::void(),
            },
        )
        .with_access(AccessModifier::Public);
        self.declare_member(member)?;

        let body = self.parse_function_body(TypeInfo::void())?;
        Ok(ParseTree::node(
            "constructor_def",
            vec![keyword, open, params_node, close, body],
        ))
    }

    fn parse_main_method(
        &mut self,
        access: AccessModifier,
        is_static: bool,
    ) -> Result<ParseTree, Diagnostic> {
        let keyword = self.take_leaf();

        let in_class = self
            .symbols
            .current_definition_entry()
            .is_some_and(|def| def.kind == DefinitionKind::Class);
        if !in_class {
            return Err(self.semantic_error(SemanticError::MainOutsideClass));
        }
        if self.symbols.main_found() {
            return Err(self.semantic_error(SemanticError::MainRedeclared));
        }
        self.symbols.mark_main_found();

        let open = self.expect(TokenKind::ParenOpen, "'('")?;
        self.symbols.create_scope(false);
        let close = self.expect(TokenKind::ParenClose, "')'")?;

        let member = MemberTableEntry::new(
            "mainEntry",
            MemberType::Function {
                params: Vec::new(),
                return_type: TypeInfo::void(),
            },
        )
        .with_access(access)
        .with_static(is_static);
        self.declare_member(member)?;

        let body = self.parse_function_body(TypeInfo::void())?;
        Ok(ParseTree::node("main_method", vec![keyword, open, close, body]))
    }

    /// `{ statement* }` for a function whose parameter scope is already open.
    /// Closes that scope.
    fn parse_function_body(&mut self, return_type: TypeInfo) -> Result<ParseTree, Diagnostic> {
        self.symbols.set_return_type(Some(return_type));

        let open = self.expect(TokenKind::BraceOpen, "'{'")?;
        let statements = self.parse_multiple_statements()?;
        let close = self.expect(TokenKind::BraceClose, "a statement or '}'")?;

        self.symbols.destroy_scope();
        self.symbols.set_return_type(None);
        Ok(ParseTree::node("function_body", vec![open, statements, close]))
    }

    fn parse_interface_body(&mut self) -> Result<ParseTree, Diagnostic> {
        let open = self.expect(TokenKind::BraceOpen, "'{'")?;

        let mut members = Vec::new();
        while self.check_any(&INTERFACE_MEMBER_START) {
            members.push(self.parse_interface_member()?);
        }
        members.push(ParseTree::Empty);

        let close = self.expect(TokenKind::BraceClose, "a function declaration or '}'")?;
        Ok(ParseTree::node(
            "interface_body",
            vec![open, ParseTree::node("interface_members", members), close],
        ))
    }

    /// `int function size(int a);` inside an interface
    fn parse_interface_member(&mut self) -> Result<ParseTree, Diagnostic> {
        let (return_node, return_type) = self.parse_return_type()?;
        let keyword = self.expect(TokenKind::Function, "'function'")?;
        let (name_leaf, name) = self.expect_identifier()?;

        let open = self.expect(TokenKind::ParenOpen, "'('")?;
        self.symbols.create_scope(false);
        let (params_node, params) = self.parse_parameter_list()?;
        let close = self.expect(TokenKind::ParenClose, "')'")?;
        self.symbols.destroy_scope();

        let member = MemberTableEntry::new(
            name,
            MemberType::Function {
                params,
                return_type,
            },
        )
        .with_access(AccessModifier::Public);
        self.declare_member(member)?;

        let semicolon = self.expect(TokenKind::Semicolon, "';'")?;
        Ok(ParseTree::node(
            "function_declaration",
            vec![return_node, keyword, name_leaf, open, params_node, close, semicolon],
        ))
    }

    /// Parameters are declared in the innermost scope as they are parsed.
    fn parse_parameter_list(&mut self) -> Result<(ParseTree, Vec<TypeInfo>), Diagnostic> {
        if !self.check_any(&[TokenKind::DataType, TokenKind::Identifier]) {
            return Ok((ParseTree::Empty, Vec::new()));
        }

        let mut children = Vec::new();
        let mut types = Vec::new();
        loop {
            let (type_node, param_type) = self.parse_type()?;
            let (name_leaf, name) = self.expect_identifier()?;
            if !self.symbols.insert_scope_entry(&name, param_type.clone()) {
                return Err(self.semantic_error(SemanticError::VariableRedeclared { name }));
            }
            types.push(param_type);
            children.push(ParseTree::node("parameter", vec![type_node, name_leaf]));

            if !self.check(TokenKind::Comma) {
                break;
            }
            children.push(self.take_leaf());
        }
        children.push(ParseTree::Empty);

        Ok((ParseTree::node("parameter_list", children), types))
    }

    pub(crate) fn parse_return_type(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        if self.check(TokenKind::VoidType) {
            let leaf = self.take_leaf();
            return Ok((ParseTree::node("return_type", vec![leaf]), TypeInfo::void()));
        }
        let (type_node, ty) = self.parse_type()?;
        Ok((ParseTree::node("return_type", vec![type_node]), ty))
    }

    /// A primitive or declared type, optionally a pointer or an array
    pub(crate) fn parse_type(&mut self) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let base = match self.peek_kind() {
            TokenKind::DataType => self.advance(),
            TokenKind::Identifier => {
                let token = self.advance();
                if self.symbols.lookup_definition(&token.value).is_none() {
                    return Err(self.semantic_error(SemanticError::UndeclaredDefinition {
                        name: token.value,
                    }));
                }
                token
            }
            _ => return Err(self.syntax_error("a type")),
        };
        let ty = TypeInfo::new(base.value.clone());

        let (suffix, ty) = match self.peek_kind() {
            TokenKind::Multiply => {
                let star = self.take_leaf();
                (ParseTree::node("pointer_type", vec![star]), ty.with_pointer())
            }
            TokenKind::BracketOpen => self.parse_array_type(ty)?,
            _ => (ParseTree::Empty, ty),
        };

        Ok((
            ParseTree::node("type", vec![ParseTree::leaf(&base), suffix]),
            ty,
        ))
    }

    /// `[size?]` repeated, at most the configured number of times
    fn parse_array_type(&mut self, ty: TypeInfo) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let max = self.config.max_array_dimensions;
        let mut dimensions = Vec::new();

        while self.check(TokenKind::BracketOpen) {
            if dimensions.len() == max {
                return Err(self.semantic_error(SemanticError::ArrayTooDeep { max }));
            }
            let open = self.take_leaf();
            let size = if self.check(TokenKind::BracketClose) {
                ParseTree::Empty
            } else {
                let (expression, size_type) = self.parse_expression()?;
                if !size_type.is_named("int") {
                    return Err(self.semantic_error(SemanticError::NonIntegerIndex {
                        ty: size_type.to_string(),
                    }));
                }
                expression
            };
            let close = self.expect(TokenKind::BracketClose, "']'")?;
            dimensions.push(ParseTree::node("array_dimension", vec![open, size, close]));
        }

        let ty = ty.with_dimensions(dimensions.len());
        Ok((ParseTree::node("array_type", dimensions), ty))
    }
}
