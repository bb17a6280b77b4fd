//! Reference chain parsing implementation
//!
//! A reference names a variable, a field, a method call or an array element,
//! and may chain through further member accesses:
//!
//! - `count`, `this->count`, `super->count`
//! - `shape.area()`, `node->next->value`
//! - `Counter.total` (static member through the definition name)
//! - `grid[i][j]`, `makeRow()[0]`
//!
//! # Grammar
//!
//! ```text
//! reference ::= qualifier? IDENT chain
//! qualifier ::= ('this' | 'super') '->'
//! chain     ::= ('.' | '->') IDENT chain
//!             | index after_index
//!             | args after_call
//!             | ε
//! after_index ::= ('.' | '->') IDENT chain | ε
//! after_call  ::= ('.' | '->') IDENT chain | index after_index | ε
//! index     ::= '[' expression ']' index?
//! args      ::= '(' (value (',' value)*)? ')'
//! ```
//!
//! Each name is resolved as soon as it is read, against whatever the
//! [`Qualifier`] in hand says: the scope stack, the current definition, its
//! parent, a definition accessed statically, or the type of the value to the
//! left of the operator.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::Diagnostic;
use crate::parser::parse::Parser;
use crate::parser::token::TokenKind;
use crate::parser::tree::ParseTree;
use crate::semantics::errors::SemanticError;
use crate::semantics::types::{join_types, MemberType, TypeInfo};

/// What the next name in a chain is looked up against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// `this->name`
    InstanceSelf,
    /// `super->name`
    SuperSelf,
    /// `Definition.name`: static members only.
    StaticTarget(String),
    /// `value.name` or `value->name`, where the value has this type.
    Instance(String),
    /// A bare name.
    None,
}

/// How a member is being reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Instance,
    Static,
    /// Bare field name inside a method of its definition.
    Implicit,
}

impl Qualifier {
    fn reach(&self) -> Reach {
        match self {
            Qualifier::StaticTarget(_) => Reach::Static,
            Qualifier::None => Reach::Implicit,
            _ => Reach::Instance,
        }
    }
}

/// Where a reference chain ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reference {
    /// An assignable location.
    Variable(TypeInfo),
    /// The result of a call.
    Call(TypeInfo),
}

impl Reference {
    pub(crate) fn into_type(self) -> TypeInfo {
        match self {
            Reference::Variable(ty) | Reference::Call(ty) => ty,
        }
    }
}

/// The root of a chain before `.`: a value, or a definition used statically.
enum Root {
    Value(TypeInfo),
    Definition(String),
}

impl Parser {
    pub(crate) fn parse_reference(&mut self) -> Result<(ParseTree, Reference), Diagnostic> {
        let (qualifier_node, qualifier) = self.parse_qualifier()?;
        let (name_leaf, name) = self.expect_identifier()?;
        let (chain, reference) = self.parse_chain(name, qualifier)?;
        Ok((
            ParseTree::node("reference", vec![qualifier_node, name_leaf, chain]),
            reference,
        ))
    }

    fn parse_qualifier(&mut self) -> Result<(ParseTree, Qualifier), Diagnostic> {
        let qualifier = match self.peek_kind() {
            TokenKind::This => Qualifier::InstanceSelf,
            TokenKind::Super => Qualifier::SuperSelf,
            TokenKind::Identifier => return Ok((ParseTree::Empty, Qualifier::None)),
            _ => return Err(self.syntax_error("'this', 'super' or an identifier")),
        };
        let keyword = self.take_leaf();
        if qualifier == Qualifier::SuperSelf && self.parent_definition().is_none() {
            return Err(self.semantic_error(SemanticError::NoParentClass));
        }
        let arrow = self.expect(TokenKind::Arrow, "'->'")?;
        Ok((ParseTree::node("this_super", vec![keyword, arrow]), qualifier))
    }

    fn parent_definition(&self) -> Option<String> {
        self.symbols
            .current_definition_entry()
            .and_then(|def| def.parent.clone())
    }

    /// The chain after `name` has been read.
    fn parse_chain(
        &mut self,
        name: String,
        qualifier: Qualifier,
    ) -> Result<(ParseTree, Reference), Diagnostic> {
        match self.peek_kind() {
            TokenKind::Dot | TokenKind::Arrow => {
                let (operator, next_qualifier) = match self.resolve_root(&name, &qualifier)? {
                    Root::Definition(definition) => {
                        let is_arrow = self.check(TokenKind::Arrow);
                        let operator = self.take_leaf();
                        if is_arrow {
                            return Err(self.semantic_error(SemanticError::ArrowOnStatic));
                        }
                        (operator, Qualifier::StaticTarget(definition))
                    }
                    Root::Value(ty) => {
                        let operator = self.parse_member_operator(&ty)?;
                        (operator, Qualifier::Instance(ty.name))
                    }
                };
                let (member_leaf, member) = self.expect_identifier()?;
                let (rest, reference) = self.parse_chain(member, next_qualifier)?;
                Ok((
                    ParseTree::node("chaining", vec![operator, member_leaf, rest]),
                    reference,
                ))
            }
            TokenKind::BracketOpen => {
                let ty = self.resolve_variable(&name, &qualifier)?;
                if !ty.is_array() {
                    return Err(self.semantic_error(SemanticError::NotAnArray { name }));
                }
                let (index, element) = self.parse_subscripts(&name, ty)?;
                let (rest, reference) = self.parse_after_index(element)?;
                Ok((
                    ParseTree::node("array_access", vec![index, rest]),
                    reference,
                ))
            }
            TokenKind::ParenOpen => {
                let (args, arg_types) = self.parse_func_args()?;
                let return_type = self.resolve_call(&name, &qualifier, &arg_types)?;
                let (rest, reference) = self.parse_after_call(return_type)?;
                Ok((ParseTree::node("function_call", vec![args, rest]), reference))
            }
            _ => {
                let ty = self.resolve_variable(&name, &qualifier)?;
                Ok((ParseTree::Empty, Reference::Variable(ty)))
            }
        }
    }

    fn parse_after_index(&mut self, element: TypeInfo) -> Result<(ParseTree, Reference), Diagnostic> {
        if !self.check_any(&[TokenKind::Dot, TokenKind::Arrow]) {
            return Ok((ParseTree::Empty, Reference::Variable(element)));
        }
        let operator = self.parse_member_operator(&element)?;
        let (member_leaf, member) = self.expect_identifier()?;
        let (rest, reference) = self.parse_chain(member, Qualifier::Instance(element.name))?;
        Ok((
            ParseTree::node("chaining", vec![operator, member_leaf, rest]),
            reference,
        ))
    }

    fn parse_after_call(
        &mut self,
        return_type: TypeInfo,
    ) -> Result<(ParseTree, Reference), Diagnostic> {
        match self.peek_kind() {
            TokenKind::Dot | TokenKind::Arrow => self.parse_after_index(return_type),
            TokenKind::BracketOpen => {
                if !return_type.is_array() {
                    return Err(self.semantic_error(SemanticError::CallResultNotArray));
                }
                let (index, element) = self.parse_subscripts("function result", return_type)?;
                let (rest, reference) = self.parse_after_index(element)?;
                Ok((
                    ParseTree::node("array_access", vec![index, rest]),
                    reference,
                ))
            }
            _ => Ok((ParseTree::Empty, Reference::Call(return_type))),
        }
    }

    /// `.` or `->` applied to a value of type `ty`
    fn parse_member_operator(&mut self, ty: &TypeInfo) -> Result<ParseTree, Diagnostic> {
        let operator = self.advance();
        let op = if operator.kind == TokenKind::Dot { "." } else { "->" };

        let error = if ty.is_void() {
            Some(SemanticError::VoidAccess)
        } else if ty.is_array() {
            Some(SemanticError::AccessOnArray {
                op,
                ty: ty.to_string(),
            })
        } else if operator.kind == TokenKind::Dot && ty.is_pointer {
            Some(SemanticError::DotOnPointer { ty: ty.to_string() })
        } else if operator.kind == TokenKind::Arrow && !ty.is_pointer {
            Some(SemanticError::ArrowOnNonPointer { ty: ty.to_string() })
        } else if ty.is_primitive() || ty.is_unresolved() {
            Some(SemanticError::AccessOnPrimitive {
                op,
                ty: ty.to_string(),
            })
        } else {
            None
        };
        if let Some(error) = error {
            return Err(self.semantic_error(error));
        }

        Ok(ParseTree::leaf(&operator))
    }

    /// `[i][j]...` applied to an array of type `ty`. Returns the element type
    /// left after the subscripts.
    fn parse_subscripts(
        &mut self,
        name: &str,
        ty: TypeInfo,
    ) -> Result<(ParseTree, TypeInfo), Diagnostic> {
        let (index, depth) = self.parse_array_index(name, ty.dimensions)?;
        let element = TypeInfo::new(ty.name).with_dimensions(ty.dimensions - depth);
        Ok((index, element))
    }

    /// One subscript, then more while `remaining` dimensions allow.
    fn parse_array_index(
        &mut self,
        name: &str,
        remaining: usize,
    ) -> Result<(ParseTree, usize), Diagnostic> {
        let open = self.expect(TokenKind::BracketOpen, "'['")?;
        let (expression, index_type) = self.parse_expression()?;
        if !index_type.is_named("int") {
            return Err(self.semantic_error(SemanticError::NonIntegerIndex {
                ty: index_type.to_string(),
            }));
        }
        let close = self.expect(TokenKind::BracketClose, "']'")?;

        if !self.check(TokenKind::BracketOpen) {
            return Ok((
                ParseTree::node("array_index", vec![open, expression, close, ParseTree::Empty]),
                1,
            ));
        }
        if remaining <= 1 {
            return Err(self.semantic_error(SemanticError::TooManySubscripts {
                name: name.to_string(),
            }));
        }
        let (inner, depth) = self.parse_array_index(name, remaining - 1)?;
        Ok((
            ParseTree::node("array_index", vec![open, expression, close, inner]),
            depth + 1,
        ))
    }

    /// `( value, ... )` with the argument types
    pub(crate) fn parse_func_args(&mut self) -> Result<(ParseTree, Vec<TypeInfo>), Diagnostic> {
        let open = self.expect(TokenKind::ParenOpen, "'('")?;

        let mut types = Vec::new();
        let arguments = if self.check(TokenKind::ParenClose) {
            ParseTree::Empty
        } else {
            let mut children = Vec::new();
            loop {
                let (value, ty) = self.parse_value()?;
                children.push(value);
                types.push(ty);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                children.push(self.take_leaf());
            }
            children.push(ParseTree::Empty);
            ParseTree::node("arguments", children)
        };

        let close = self.expect(TokenKind::ParenClose, "',' or ')'")?;
        Ok((ParseTree::node("func_args", vec![open, arguments, close]), types))
    }

    // ===== Name resolution =====

    /// Like [`resolve_variable`](Self::resolve_variable), but a bare name that
    /// is neither a variable nor a field may name a definition.
    fn resolve_root(&self, name: &str, qualifier: &Qualifier) -> Result<Root, Diagnostic> {
        if *qualifier == Qualifier::None
            && self.symbols.lookup_scope(name).is_none()
            && self.own_field(name).is_none()
            && self.symbols.lookup_definition(name).is_some()
        {
            return Ok(Root::Definition(name.to_string()));
        }
        self.resolve_variable(name, qualifier).map(Root::Value)
    }

    /// A field of the current definition or its ancestors.
    fn own_field(&self, name: &str) -> Option<&TypeInfo> {
        let current = self.symbols.current_definition()?;
        match self.symbols.lookup_member(name, current) {
            Some((_, member)) => match &member.member_type {
                MemberType::Variable(ty) => Some(ty),
                MemberType::Function { .. } => None,
            },
            None => None,
        }
    }

    /// Definition whose members `qualifier` looks into.
    fn qualifier_owner(&self, qualifier: &Qualifier) -> Result<String, Diagnostic> {
        match qualifier {
            Qualifier::SuperSelf => self
                .parent_definition()
                .ok_or_else(|| self.semantic_error(SemanticError::NoParentClass)),
            Qualifier::StaticTarget(owner) | Qualifier::Instance(owner) => Ok(owner.clone()),
            Qualifier::InstanceSelf | Qualifier::None => Ok(self.current_definition()),
        }
    }

    fn resolve_variable(&self, name: &str, qualifier: &Qualifier) -> Result<TypeInfo, Diagnostic> {
        if *qualifier == Qualifier::None {
            if let Some(ty) = self.symbols.lookup_scope(name) {
                return Ok(ty.clone());
            }
            if self.own_field(name).is_none() {
                return Err(self.semantic_error(SemanticError::UndeclaredVariable {
                    name: name.to_string(),
                }));
            }
        }

        let owner = self.qualifier_owner(qualifier)?;
        let Some((declared_in, member)) = self.symbols.lookup_member(name, &owner) else {
            return Err(self.semantic_error(SemanticError::UndeclaredMember {
                name: name.to_string(),
                owner,
            }));
        };
        let MemberType::Variable(ty) = &member.member_type else {
            return Err(self.semantic_error(SemanticError::FunctionUsedAsVariable {
                name: name.to_string(),
            }));
        };

        self.symbols
            .check_member_access(&declared_in.name, member)
            .map_err(|error| self.semantic_error(error))?;

        let error = match qualifier.reach() {
            Reach::Instance if member.is_static => Some(SemanticError::StaticThroughInstance {
                name: name.to_string(),
            }),
            Reach::Static if !member.is_static => Some(SemanticError::InstanceThroughStatic {
                name: name.to_string(),
            }),
            _ => None,
        };
        match error {
            Some(error) => Err(self.semantic_error(error)),
            None => Ok(ty.clone()),
        }
    }

    /// Return type of calling `name` with `args` through `qualifier`.
    ///
    /// Static methods may be called through an instance; instance methods may
    /// not be called through a definition name.
    fn resolve_call(
        &self,
        name: &str,
        qualifier: &Qualifier,
        args: &[TypeInfo],
    ) -> Result<TypeInfo, Diagnostic> {
        let owner = self.qualifier_owner(qualifier)?;
        let Some((declared_in, member)) = self.symbols.lookup_member_function(name, args, &owner)
        else {
            return Err(self.semantic_error(SemanticError::UndeclaredMethod {
                name: name.to_string(),
                args: join_types(args),
                owner,
            }));
        };

        self.symbols
            .check_member_access(&declared_in.name, member)
            .map_err(|error| self.semantic_error(error))?;

        if qualifier.reach() == Reach::Static && !member.is_static {
            return Err(self.semantic_error(SemanticError::InstanceThroughStatic {
                name: name.to_string(),
            }));
        }

        match &member.member_type {
            MemberType::Function { return_type, .. } => Ok(return_type.clone()),
            MemberType::Variable(ty) => Ok(ty.clone()),
        }
    }
}
