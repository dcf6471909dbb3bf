//! Statements, declarations, classes and binding patterns.

use std::rc::Rc;

use super::{Parser, keyword_text, token_starts_property_name};
use crate::ast::*;
use crate::error::AnnotateError;
use crate::lexer::{Span, TokenKind};

impl<'a> Parser<'a> {
    // ============ DECORATORS ============

    /// Parse a single decorator: `@expr`, `@a.b` or `@factory(args)`.
    fn parse_decorator(&mut self) -> Result<Decorator, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::At)?;
        let expression = Rc::new(self.parse_left_hand_side_expression()?);
        let span = self.span_from(start);
        Ok(Decorator { expression, span })
    }

    /// Parse zero or more decorators: @dec1 @dec2 ...
    pub(super) fn parse_decorators(&mut self) -> Result<Vec<Decorator>, AnnotateError> {
        let mut decorators = vec![];
        while self.check(&TokenKind::At) {
            decorators.push(self.parse_decorator()?);
        }
        Ok(decorators)
    }

    // ============ STATEMENTS ============

    pub(super) fn parse_statement(&mut self) -> Result<Statement, AnnotateError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<Statement, AnnotateError> {
        if self.check(&TokenKind::At) {
            let decorators = self.parse_decorators()?;
            return match &self.current.kind {
                TokenKind::Export => {
                    let mut export_decl = self.parse_export()?;
                    attach_decorators(&mut export_decl.declaration, decorators);
                    Ok(Statement::Export(export_decl))
                }
                TokenKind::Class | TokenKind::Abstract => {
                    let mut class_decl = self.parse_class_declaration(false)?;
                    class_decl.decorators = decorators;
                    Ok(Statement::ClassDeclaration(class_decl))
                }
                _ => Err(self.error("Decorators can only be applied to class declarations")),
            };
        }

        // Labeled statement: identifier followed by colon
        if self.check_identifier() && self.peek_is(&TokenKind::Colon) {
            return self.parse_labeled_statement();
        }

        match self.current.kind.clone() {
            TokenKind::Let | TokenKind::Var => Ok(Statement::VariableDeclaration(
                self.parse_variable_declaration(false)?,
            )),
            TokenKind::Const => {
                if self.peek_is(&TokenKind::Enum) {
                    Ok(Statement::EnumDeclaration(self.parse_enum()?))
                } else {
                    Ok(Statement::VariableDeclaration(
                        self.parse_variable_declaration(false)?,
                    ))
                }
            }
            TokenKind::Function => Ok(Statement::FunctionDeclaration(
                self.parse_function_declaration(false)?,
            )),
            TokenKind::Async
                if self.peek_is(&TokenKind::Function) && self.peek_on_same_line() =>
            {
                Ok(Statement::FunctionDeclaration(
                    self.parse_function_declaration(false)?,
                ))
            }
            TokenKind::Class => Ok(Statement::ClassDeclaration(
                self.parse_class_declaration(false)?,
            )),
            TokenKind::Abstract if self.peek_is(&TokenKind::Class) => Ok(
                Statement::ClassDeclaration(self.parse_class_declaration(false)?),
            ),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block_statement()?)),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty)
            }
            TokenKind::Debugger => {
                self.advance();
                self.expect_semicolon()?;
                Ok(Statement::Debugger)
            }
            TokenKind::Type if self.next_is_declaration_name() => {
                Ok(Statement::TypeAlias(self.parse_type_alias()?))
            }
            TokenKind::Interface if self.next_is_declaration_name() => {
                Ok(Statement::InterfaceDeclaration(self.parse_interface()?))
            }
            TokenKind::Enum => Ok(Statement::EnumDeclaration(self.parse_enum()?)),
            TokenKind::Namespace | TokenKind::Module if self.next_is_namespace_name() => Ok(
                Statement::NamespaceDeclaration(self.parse_namespace(false)?),
            ),
            TokenKind::Declare if self.peek_on_same_line() && self.next_is_declare_target() => {
                self.parse_declare_statement()
            }
            TokenKind::Import
                if !self.peek_is(&TokenKind::LParen) && !self.peek_is(&TokenKind::Dot) =>
            {
                Ok(Statement::Import(self.parse_import()?))
            }
            TokenKind::Export => Ok(Statement::Export(self.parse_export()?)),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_semicolon()?;
                let span = expr.span();
                Ok(Statement::Expression(ExpressionStatement {
                    expression: Rc::new(expr),
                    span,
                }))
            }
        }
    }

    fn next_is_declaration_name(&mut self) -> bool {
        let next = self.peek_token();
        matches!(next.kind, TokenKind::Identifier(_)) || super::is_contextual_keyword(&next.kind)
    }

    fn next_is_namespace_name(&mut self) -> bool {
        let next = self.peek_token();
        matches!(next.kind, TokenKind::Identifier(_) | TokenKind::String(_))
            && self.peek_on_same_line()
    }

    fn next_is_declare_target(&mut self) -> bool {
        let next = self.peek_token();
        match &next.kind {
            TokenKind::Let
            | TokenKind::Const
            | TokenKind::Var
            | TokenKind::Function
            | TokenKind::Class
            | TokenKind::Abstract
            | TokenKind::Enum
            | TokenKind::Namespace
            | TokenKind::Module
            | TokenKind::Type
            | TokenKind::Interface
            | TokenKind::Async => true,
            TokenKind::Identifier(name) => name.as_ref() == "global",
            _ => false,
        }
    }

    /// `declare <declaration>`: ambient declarations carry no bodies.
    fn parse_declare_statement(&mut self) -> Result<Statement, AnnotateError> {
        self.require_token(&TokenKind::Declare)?;
        match &self.current.kind {
            TokenKind::Let | TokenKind::Const | TokenKind::Var => {
                if self.check(&TokenKind::Const) && self.peek_is(&TokenKind::Enum) {
                    return Ok(Statement::EnumDeclaration(self.parse_enum()?));
                }
                Ok(Statement::VariableDeclaration(
                    self.parse_variable_declaration(true)?,
                ))
            }
            TokenKind::Function | TokenKind::Async => Ok(Statement::FunctionDeclaration(
                self.parse_function_declaration(true)?,
            )),
            TokenKind::Class | TokenKind::Abstract => Ok(Statement::ClassDeclaration(
                self.parse_class_declaration(true)?,
            )),
            TokenKind::Enum => Ok(Statement::EnumDeclaration(self.parse_enum()?)),
            TokenKind::Type => Ok(Statement::TypeAlias(self.parse_type_alias()?)),
            TokenKind::Interface => Ok(Statement::InterfaceDeclaration(self.parse_interface()?)),
            TokenKind::Namespace | TokenKind::Module => Ok(Statement::NamespaceDeclaration(
                self.parse_namespace(true)?,
            )),
            _ if self.check_keyword("global") => {
                let start = self.current.span;
                let id = self.parse_identifier()?;
                let body = self.parse_namespace_body()?;
                let span = self.span_from(start);
                Ok(Statement::NamespaceDeclaration(NamespaceDeclaration {
                    id,
                    body,
                    declare: true,
                    span,
                }))
            }
            _ => Err(self.unexpected_token("declaration after 'declare'")),
        }
    }

    fn parse_variable_declaration(
        &mut self,
        declare: bool,
    ) -> Result<VariableDeclaration, AnnotateError> {
        let start = self.current.span;
        let kind = self.parse_variable_kind()?;

        let mut declarations = vec![self.parse_variable_declarator()?];
        while self.match_token(&TokenKind::Comma) {
            declarations.push(self.parse_variable_declarator()?);
        }

        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(VariableDeclaration {
            kind,
            declarations: declarations.into(),
            declare,
            span,
        })
    }

    fn parse_variable_kind(&mut self) -> Result<VariableKind, AnnotateError> {
        let kind = match &self.current.kind {
            TokenKind::Let => VariableKind::Let,
            TokenKind::Const => VariableKind::Const,
            TokenKind::Var => VariableKind::Var,
            _ => return Err(self.unexpected_token("variable declaration")),
        };
        self.advance();
        Ok(kind)
    }

    fn parse_variable_declarator(&mut self) -> Result<VariableDeclarator, AnnotateError> {
        let start = self.current.span;
        let id = self.parse_binding_pattern()?;

        // Definite assignment assertion: `let x!: T`
        self.match_token(&TokenKind::Bang);

        let type_annotation = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        let init = if self.match_token(&TokenKind::Eq) {
            Some(Rc::new(self.parse_assignment_expression()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(VariableDeclarator {
            id,
            type_annotation,
            init,
            span,
        })
    }

    pub(super) fn parse_binding_pattern(&mut self) -> Result<Pattern, AnnotateError> {
        match &self.current.kind {
            TokenKind::LBrace => self.parse_object_pattern(),
            TokenKind::LBracket => self.parse_array_pattern(),
            TokenKind::Yield | TokenKind::Await | TokenKind::Let => {
                let name = self.intern(keyword_text(&self.current.kind).unwrap_or_default());
                let span = self.current.span;
                self.advance();
                Ok(Pattern::Identifier(Identifier { name, span }))
            }
            _ => Ok(Pattern::Identifier(self.parse_identifier()?)),
        }
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut properties = vec![];

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                let rest_start = self.current.span;
                self.advance();
                let argument = Box::new(self.parse_binding_pattern()?);
                let span = self.span_from(rest_start);
                properties.push(ObjectPatternProperty::Rest(RestElement {
                    argument,
                    type_annotation: None,
                    span,
                }));
                break; // Rest must be last
            }

            let prop_start = self.current.span;
            let key = self.parse_property_name()?;

            let (value, shorthand) = if self.match_token(&TokenKind::Colon) {
                (self.parse_binding_pattern()?, false)
            } else {
                match &key {
                    ObjectPropertyKey::Identifier(id) => (Pattern::Identifier(id.clone()), true),
                    _ => return Err(self.error("Shorthand property must be an identifier")),
                }
            };

            let value = self.parse_pattern_default(value, prop_start)?;

            let span = self.span_from(prop_start);
            properties.push(ObjectPatternProperty::KeyValue {
                key,
                value,
                shorthand,
                span,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(Pattern::Object(ObjectPattern {
            properties,
            type_annotation: None,
            span,
        }))
    }

    fn parse_array_pattern(&mut self) -> Result<Pattern, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let mut elements = vec![];

        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            if self.match_token(&TokenKind::Comma) {
                // Hole
                elements.push(None);
                continue;
            }

            if self.check(&TokenKind::DotDotDot) {
                let rest_start = self.current.span;
                self.advance();
                let argument = Box::new(self.parse_binding_pattern()?);
                let span = self.span_from(rest_start);
                elements.push(Some(Pattern::Rest(RestElement {
                    argument,
                    type_annotation: None,
                    span,
                })));
                break; // Rest must be last
            }

            let elem_start = self.current.span;
            let elem = self.parse_binding_pattern()?;
            elements.push(Some(self.parse_pattern_default(elem, elem_start)?));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RBracket)?;

        let span = self.span_from(start);
        Ok(Pattern::Array(ArrayPattern {
            elements,
            type_annotation: None,
            span,
        }))
    }

    /// Wrap `pattern` in an [`AssignmentPattern`] when a `= default` follows.
    fn parse_pattern_default(
        &mut self,
        pattern: Pattern,
        start: Span,
    ) -> Result<Pattern, AnnotateError> {
        if !self.match_token(&TokenKind::Eq) {
            return Ok(pattern);
        }
        let right = Rc::new(self.parse_assignment_expression()?);
        let span = self.span_from(start);
        Ok(Pattern::Assignment(AssignmentPattern {
            left: Box::new(pattern),
            right,
            span,
        }))
    }

    // ============ FUNCTIONS ============

    /// `[async] function [*] [name] <T>(params): R { body }`. The body is
    /// optional: overload signatures and ambient functions end with `;`.
    fn parse_function_declaration(
        &mut self,
        declare: bool,
    ) -> Result<FunctionDeclaration, AnnotateError> {
        let start = self.current.span;
        let async_ = self.match_token(&TokenKind::Async);
        self.require_token(&TokenKind::Function)?;
        let generator = self.match_token(&TokenKind::Star);

        let id = if self.check_identifier() {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let type_parameters = self.parse_optional_type_parameters()?;
        let (params, params_span) = self.parse_function_params()?;
        let return_type = self.parse_optional_return_type()?;

        let body = if self.check(&TokenKind::LBrace) && !declare {
            Some(Rc::new(self.parse_function_body()?))
        } else {
            self.expect_semicolon()?;
            None
        };

        let span = self.span_from(start);
        Ok(FunctionDeclaration {
            id,
            params: params.into(),
            params_span,
            return_type,
            type_parameters,
            body,
            generator,
            async_,
            declare,
            span,
        })
    }

    /// A function body resets the `for`-header `in` restriction.
    pub(super) fn parse_function_body(&mut self) -> Result<BlockStatement, AnnotateError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let body = self.parse_block_statement();
        self.no_in = saved;
        body
    }

    /// Parse `( params )`, returning the parameters and the span of the parenthesized list.
    pub(super) fn parse_function_params(
        &mut self,
    ) -> Result<(Vec<FunctionParam>, Span), AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LParen)?;

        let mut params = vec![];
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_function_param()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RParen)?;
        Ok((params, self.span_from(start)))
    }

    pub(super) fn parse_function_param(&mut self) -> Result<FunctionParam, AnnotateError> {
        let param_start = self.current.span;

        let decorators = self.parse_decorators()?;

        // Parameter properties: `constructor(private readonly x: T)`
        let accessibility = if self.next_starts_binding() {
            self.parse_accessibility()
        } else {
            None
        };
        if self.check(&TokenKind::Override) && self.next_starts_binding() {
            self.advance();
        }
        let readonly = self.check(&TokenKind::Readonly) && self.next_starts_binding();
        if readonly {
            self.advance();
        }

        let pattern = if self.check(&TokenKind::DotDotDot) {
            self.advance();
            let arg = self.parse_binding_pattern()?;
            let span = self.span_from(param_start);
            Pattern::Rest(RestElement {
                argument: Box::new(arg),
                type_annotation: None,
                span,
            })
        } else if self.check(&TokenKind::This) {
            // `this` parameter
            let span = self.current.span;
            let name = self.intern("this");
            self.advance();
            Pattern::Identifier(Identifier { name, span })
        } else {
            self.parse_binding_pattern()?
        };

        let optional = self.match_token(&TokenKind::Question);

        let type_annotation = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        let pattern = self.parse_pattern_default(pattern, param_start)?;

        let span = self.span_from(param_start);
        Ok(FunctionParam {
            pattern,
            type_annotation,
            optional,
            decorators,
            accessibility,
            readonly,
            span,
        })
    }

    /// Whether the token after a modifier keyword begins a binding.
    fn next_starts_binding(&mut self) -> bool {
        let next = self.peek_token();
        matches!(
            next.kind,
            TokenKind::Identifier(_)
                | TokenKind::LBrace
                | TokenKind::LBracket
                | TokenKind::DotDotDot
                | TokenKind::This
        ) || super::is_contextual_keyword(&next.kind)
    }

    // ============ CLASSES ============

    pub(super) fn parse_class_declaration(
        &mut self,
        declare: bool,
    ) -> Result<ClassDeclaration, AnnotateError> {
        let start = self.current.span;
        let abstract_ = self.match_token(&TokenKind::Abstract);
        self.require_token(&TokenKind::Class)?;

        let id = if self.check_identifier() && !self.check(&TokenKind::Implements) {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let type_parameters = self.parse_optional_type_parameters()?;

        let (super_class, super_type_arguments) = if self.match_token(&TokenKind::Extends) {
            let base = Rc::new(self.parse_left_hand_side_expression()?);
            let type_args = self.parse_optional_type_arguments()?;
            (Some(base), type_args)
        } else {
            (None, None)
        };

        let implements = if self.match_token(&TokenKind::Implements) {
            let mut impls = vec![self.parse_type_reference()?];
            while self.match_token(&TokenKind::Comma) {
                impls.push(self.parse_type_reference()?);
            }
            impls
        } else {
            vec![]
        };

        let body = self.parse_class_body()?;

        let span = self.span_from(start);
        Ok(ClassDeclaration {
            id,
            type_parameters,
            super_class,
            super_type_arguments,
            implements,
            body,
            decorators: vec![],
            abstract_,
            declare,
            span,
        })
    }

    pub(super) fn parse_class_body(&mut self) -> Result<ClassBody, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let saved = std::mem::replace(&mut self.no_in, false);
        let mut members = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            // Skip empty statements
            if self.match_token(&TokenKind::Semicolon) {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.no_in = saved;

        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(ClassBody {
            members: members.into(),
            span,
        })
    }

    fn parse_class_member(&mut self) -> Result<ClassMember, AnnotateError> {
        let start = self.current.span;
        let decorators = self.parse_decorators()?;

        let mut static_ = false;
        let mut accessibility = None;
        let mut readonly = false;
        let mut accessor = false;
        let mut is_async = false;
        loop {
            let modifier = match &self.current.kind {
                TokenKind::Static
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Readonly
                | TokenKind::Abstract
                | TokenKind::Override
                | TokenKind::Declare
                | TokenKind::Accessor
                | TokenKind::Async => self.current.kind.clone(),
                _ => break,
            };
            if !self.modifier_applies() {
                break;
            }
            self.advance();
            match modifier {
                TokenKind::Static => static_ = true,
                TokenKind::Public => accessibility = Some(Accessibility::Public),
                TokenKind::Private => accessibility = Some(Accessibility::Private),
                TokenKind::Protected => accessibility = Some(Accessibility::Protected),
                TokenKind::Readonly => readonly = true,
                TokenKind::Accessor => accessor = true,
                TokenKind::Async => is_async = true,
                _ => {}
            }
        }

        // Static initialization block: static { ... }
        if static_ && self.check(&TokenKind::LBrace) {
            let block = self.parse_function_body()?;
            return Ok(ClassMember::StaticBlock(block));
        }

        if self.check(&TokenKind::LBracket) && self.is_index_signature() {
            let mut index = self.parse_index_signature(start, readonly)?;
            index.static_ = static_;
            self.expect_member_separator()?;
            return Ok(ClassMember::Index(index));
        }

        let generator = self.match_token(&TokenKind::Star);

        // Getter/setter: `get name()` but not a method named `get`
        let kind = if !generator && self.check_keyword("get") && self.next_is_accessor_name() {
            self.advance();
            MethodKind::Get
        } else if !generator && self.check_keyword("set") && self.next_is_accessor_name() {
            self.advance();
            MethodKind::Set
        } else {
            MethodKind::Method
        };

        if !static_ && kind == MethodKind::Method && self.is_constructor_name() {
            self.advance();
            let (params, _) = self.parse_function_params()?;
            let body = if self.check(&TokenKind::LBrace) {
                Some(Rc::new(self.parse_function_body()?))
            } else {
                self.expect_semicolon()?;
                None
            };
            let span = self.span_from(start);
            return Ok(ClassMember::Constructor(ClassConstructor {
                params: params.into(),
                body,
                accessibility,
                span,
            }));
        }

        let computed = self.check(&TokenKind::LBracket);
        let key = self.parse_property_name()?;
        let optional = self.match_token(&TokenKind::Question);
        // Definite assignment assertion: `name!: T`
        self.match_token(&TokenKind::Bang);

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let method_start = self.current.span;
            let type_parameters = self.parse_optional_type_parameters()?;
            let (params, params_span) = self.parse_function_params()?;
            let return_type = self.parse_optional_return_type()?;

            if !self.check(&TokenKind::LBrace) {
                self.expect_semicolon()?;
                let span = self.span_from(start);
                return Ok(ClassMember::MethodSignature(ClassMethodSignature {
                    key,
                    kind,
                    params: params.into(),
                    return_type,
                    type_parameters,
                    static_,
                    optional,
                    span,
                }));
            }

            let body = Rc::new(self.parse_function_body()?);
            let value = FunctionExpression {
                id: None,
                params: params.into(),
                params_span,
                return_type,
                type_parameters,
                body,
                generator,
                async_: is_async,
                span: self.span_from(method_start),
            };

            let span = self.span_from(start);
            return Ok(ClassMember::Method(ClassMethod {
                key,
                value,
                kind,
                computed,
                static_,
                optional,
                accessibility,
                decorators,
                span,
            }));
        }

        let type_annotation = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        let value = if self.match_token(&TokenKind::Eq) {
            Some(Rc::new(self.parse_assignment_expression()?))
        } else {
            None
        };

        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(ClassMember::Property(ClassProperty {
            key,
            value,
            type_annotation,
            computed,
            static_,
            readonly,
            optional,
            accessor,
            accessibility,
            decorators,
            span,
        }))
    }

    /// A modifier keyword is only a modifier when a member name follows it.
    fn modifier_applies(&mut self) -> bool {
        let next = self.peek_token();
        let follows = token_starts_property_name(&next.kind)
            || matches!(next.kind, TokenKind::Star | TokenKind::LBrace);
        if self.check(&TokenKind::Async) {
            return follows && self.peek_on_same_line();
        }
        follows
    }

    fn next_is_accessor_name(&mut self) -> bool {
        token_starts_property_name(&self.peek_token().kind)
    }

    fn is_constructor_name(&self) -> bool {
        match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::String(name) => {
                name.as_ref() == "constructor"
            }
            _ => false,
        }
    }

    pub(super) fn parse_accessibility(&mut self) -> Option<Accessibility> {
        let accessibility = match &self.current.kind {
            TokenKind::Public => Accessibility::Public,
            TokenKind::Private => Accessibility::Private,
            TokenKind::Protected => Accessibility::Protected,
            _ => return None,
        };
        self.advance();
        Some(accessibility)
    }

    // ============ BLOCKS AND CONTROL FLOW ============

    pub(super) fn parse_block_statement(&mut self) -> Result<BlockStatement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut body = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(BlockStatement {
            body: body.into(),
            span,
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::If)?;
        self.require_token(&TokenKind::LParen)?;
        let test = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;

        let consequent = Rc::new(self.parse_statement()?);

        let alternate = if self.match_token(&TokenKind::Else) {
            Some(Rc::new(self.parse_statement()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span,
        }))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::For)?;

        let is_await = self.match_token(&TokenKind::Await);

        self.require_token(&TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.current.kind,
            TokenKind::Let | TokenKind::Const | TokenKind::Var
        ) {
            let decl_start = self.current.span;
            let kind = self.parse_variable_kind()?;
            let id = self.parse_binding_pattern()?;
            let type_annotation = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type_annotation()?)
            } else {
                None
            };

            if self.check(&TokenKind::In) || self.check(&TokenKind::Of) {
                let left = ForInOfLeft::Variable(VariableDeclaration {
                    kind,
                    declarations: Rc::from([VariableDeclarator {
                        id,
                        type_annotation,
                        init: None,
                        span: self.span_from(decl_start),
                    }]),
                    declare: false,
                    span: self.span_from(decl_start),
                });
                return self.parse_for_in_of_rest(left, start, is_await);
            }

            let saved = std::mem::replace(&mut self.no_in, true);
            let init = if self.match_token(&TokenKind::Eq) {
                self.parse_assignment_expression().map(|e| Some(Rc::new(e)))
            } else {
                Ok(None)
            };
            self.no_in = saved;

            let mut declarations = vec![VariableDeclarator {
                id,
                type_annotation,
                init: init?,
                span: self.span_from(decl_start),
            }];

            while self.match_token(&TokenKind::Comma) {
                declarations.push(self.parse_variable_declarator()?);
            }

            Some(ForInit::Variable(VariableDeclaration {
                kind,
                declarations: declarations.into(),
                declare: false,
                span: self.span_from(decl_start),
            }))
        } else {
            let saved = std::mem::replace(&mut self.no_in, true);
            let expr = self.parse_expression();
            self.no_in = saved;
            let expr = expr?;

            if self.check(&TokenKind::In) || self.check(&TokenKind::Of) {
                let left = ForInOfLeft::Pattern(self.expression_to_pattern(&expr)?);
                return self.parse_for_in_of_rest(left, start, is_await);
            }

            Some(ForInit::Expression(Rc::new(expr)))
        };

        if is_await {
            return Err(self.error("for await is only valid with for-of loops"));
        }

        self.require_token(&TokenKind::Semicolon)?;

        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Rc::new(self.parse_expression()?))
        };

        self.require_token(&TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Rc::new(self.parse_expression()?))
        };

        self.require_token(&TokenKind::RParen)?;
        let body = Rc::new(self.parse_statement()?);

        let span = self.span_from(start);
        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            span,
        }))
    }

    /// The part of a for-in / for-of loop after its left-hand side.
    fn parse_for_in_of_rest(
        &mut self,
        left: ForInOfLeft,
        start: Span,
        is_await: bool,
    ) -> Result<Statement, AnnotateError> {
        let is_of = self.check(&TokenKind::Of);
        self.advance();

        let right = Rc::new(if is_of {
            self.parse_assignment_expression()?
        } else {
            self.parse_expression()?
        });
        self.require_token(&TokenKind::RParen)?;
        let body = Rc::new(self.parse_statement()?);

        let span = self.span_from(start);
        if is_of {
            Ok(Statement::ForOf(ForOfStatement {
                left,
                right,
                body,
                await_: is_await,
                span,
            }))
        } else if is_await {
            Err(self.error("for await is only valid with for-of loops"))
        } else {
            Ok(Statement::ForIn(ForInStatement {
                left,
                right,
                body,
                span,
            }))
        }
    }

    fn parse_while_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;
        let body = Rc::new(self.parse_statement()?);

        let span = self.span_from(start);
        Ok(Statement::While(WhileStatement { test, body, span }))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Do)?;
        let body = Rc::new(self.parse_statement()?);
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;
        // A semicolon after do-while is always optional
        self.match_token(&TokenKind::Semicolon);

        let span = self.span_from(start);
        Ok(Statement::DoWhile(DoWhileStatement { body, test, span }))
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Switch)?;
        self.require_token(&TokenKind::LParen)?;
        let discriminant = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        let mut cases = vec![];

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let case_start = self.current.span;
            let test = if self.match_token(&TokenKind::Case) {
                Some(Rc::new(self.parse_expression()?))
            } else {
                self.require_token(&TokenKind::Default)?;
                None
            };

            self.require_token(&TokenKind::Colon)?;

            let mut consequent = vec![];
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.is_at_end()
            {
                consequent.push(self.parse_statement()?);
            }

            let span = self.span_from(case_start);
            cases.push(SwitchCase {
                test,
                consequent: consequent.into(),
                span,
            });
        }

        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases: cases.into(),
            span,
        }))
    }

    fn parse_try_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Try)?;
        let block = self.parse_block_statement()?;

        let handler = if self.match_token(&TokenKind::Catch) {
            let catch_start = self.previous.span;
            let param = if self.match_token(&TokenKind::LParen) {
                let p = self.parse_binding_pattern()?;
                // `catch (e: unknown)`: the annotation has no effect on inference
                if self.match_token(&TokenKind::Colon) {
                    self.parse_type_annotation()?;
                }
                self.require_token(&TokenKind::RParen)?;
                Some(p)
            } else {
                None
            };
            let body = self.parse_block_statement()?;
            let span = self.span_from(catch_start);
            Some(CatchClause { param, body, span })
        } else {
            None
        };

        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("Try statement must have catch or finally"));
        }

        let span = self.span_from(start);
        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
            span,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Return)?;

        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.lexer.had_newline_before()
        {
            None
        } else {
            Some(Rc::new(self.parse_expression()?))
        };

        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Return(ReturnStatement { argument, span }))
    }

    fn parse_jump_label(&mut self) -> Result<Option<Identifier>, AnnotateError> {
        if !self.check(&TokenKind::Semicolon)
            && !self.lexer.had_newline_before()
            && self.check_identifier()
        {
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_break_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Break)?;
        let label = self.parse_jump_label()?;
        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Break(BreakStatement { label, span }))
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Continue)?;
        let label = self.parse_jump_label()?;
        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Continue(ContinueStatement { label, span }))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Throw)?;

        if self.lexer.had_newline_before() {
            return Err(self.error("Illegal newline after throw"));
        }

        let argument = Rc::new(self.parse_expression()?);
        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Throw(ThrowStatement { argument, span }))
    }

    fn parse_labeled_statement(&mut self) -> Result<Statement, AnnotateError> {
        let start = self.current.span;
        let label = self.parse_identifier()?;
        self.require_token(&TokenKind::Colon)?;
        let body = Rc::new(self.parse_statement()?);

        let span = self.span_from(start);
        Ok(Statement::Labeled(LabeledStatement { label, body, span }))
    }

    // ============ TYPESCRIPT DECLARATIONS ============

    fn parse_type_alias(&mut self) -> Result<TypeAliasDeclaration, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Type)?;
        let id = self.parse_identifier()?;
        let type_parameters = self.parse_optional_type_parameters()?;
        self.require_token(&TokenKind::Eq)?;
        let type_annotation = self.parse_type_annotation()?;
        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(TypeAliasDeclaration {
            id,
            type_parameters,
            type_annotation,
            span,
        })
    }

    fn parse_interface(&mut self) -> Result<InterfaceDeclaration, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Interface)?;
        let id = self.parse_identifier()?;
        let type_parameters = self.parse_optional_type_parameters()?;

        let extends = if self.match_token(&TokenKind::Extends) {
            let mut refs = vec![self.parse_type_reference()?];
            while self.match_token(&TokenKind::Comma) {
                refs.push(self.parse_type_reference()?);
            }
            refs
        } else {
            vec![]
        };

        self.require_token(&TokenKind::LBrace)?;
        let body = self.parse_type_members()?;
        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(InterfaceDeclaration {
            id,
            type_parameters,
            extends,
            body,
            span,
        })
    }

    fn parse_enum(&mut self) -> Result<EnumDeclaration, AnnotateError> {
        let start = self.current.span;
        let const_ = self.match_token(&TokenKind::Const);
        self.require_token(&TokenKind::Enum)?;
        let id = self.parse_identifier()?;
        self.require_token(&TokenKind::LBrace)?;

        let mut members = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let member_start = self.current.span;
            let member_id = match self.parse_property_name()? {
                ObjectPropertyKey::Identifier(id) => id,
                ObjectPropertyKey::String(s) => Identifier {
                    name: s.value,
                    span: s.span,
                },
                _ => return Err(self.error("Enum member names must be identifiers or strings")),
            };
            let initializer = if self.match_token(&TokenKind::Eq) {
                Some(Rc::new(self.parse_assignment_expression()?))
            } else {
                None
            };
            let span = self.span_from(member_start);
            members.push(EnumMember {
                id: member_id,
                initializer,
                span,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(EnumDeclaration {
            id,
            members,
            const_,
            span,
        })
    }

    /// `namespace A.B { ... }` or `module "name" { ... }`.
    fn parse_namespace(&mut self, declare: bool) -> Result<NamespaceDeclaration, AnnotateError> {
        let start = self.current.span;
        // Skip 'namespace' or 'module' keyword
        self.advance();

        let id = if let TokenKind::String(name) = &self.current.kind {
            let id = Identifier {
                name: name.clone(),
                span: self.current.span,
            };
            self.advance();
            id
        } else {
            let first = self.parse_identifier()?;
            if self.check(&TokenKind::Dot) {
                let mut dotted = first.name.to_string();
                while self.match_token(&TokenKind::Dot) {
                    dotted.push('.');
                    dotted.push_str(&self.parse_identifier()?.name);
                }
                Identifier {
                    name: self.intern(&dotted),
                    span: self.span_from(first.span),
                }
            } else {
                first
            }
        };

        // `declare module "x";` has no body
        let body = if self.check(&TokenKind::LBrace) {
            self.parse_namespace_body()?
        } else {
            self.expect_semicolon()?;
            Rc::from([])
        };

        let span = self.span_from(start);
        Ok(NamespaceDeclaration {
            id,
            body,
            declare,
            span,
        })
    }

    fn parse_namespace_body(&mut self) -> Result<Rc<[Statement]>, AnnotateError> {
        self.require_token(&TokenKind::LBrace)?;
        let mut body = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        self.require_token(&TokenKind::RBrace)?;
        Ok(body.into())
    }

    // ============ MODULES ============

    fn parse_import(&mut self) -> Result<ImportDeclaration, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Import)?;

        // `import type X from` but not `import type from "x"`
        let type_only = self.check(&TokenKind::Type)
            && !self.peek_is(&TokenKind::From)
            && !self.peek_is(&TokenKind::Eq);
        if type_only {
            self.advance();
        }

        let mut specifiers = vec![];

        // import "module"
        if let TokenKind::String(s) = &self.current.kind {
            let source = StringLiteral {
                value: s.clone(),
                span: self.current.span,
            };
            self.advance();
            self.skip_import_attributes()?;
            self.expect_semicolon()?;
            let span = self.span_from(start);
            return Ok(ImportDeclaration {
                specifiers,
                source,
                type_only,
                span,
            });
        }

        // Default import
        if self.check_identifier() && !self.check(&TokenKind::From) || self.is_default_from() {
            let local = self.parse_identifier()?;

            // `import x = require("y")` and `import x = A.B`
            if self.match_token(&TokenKind::Eq) {
                let source = self.parse_import_equals_target()?;
                self.expect_semicolon()?;
                let span = self.span_from(start);
                return Ok(ImportDeclaration {
                    specifiers: vec![ImportSpecifier::Default {
                        span: local.span,
                        local,
                    }],
                    source,
                    type_only,
                    span,
                });
            }

            specifiers.push(ImportSpecifier::Default {
                span: local.span,
                local,
            });

            if !self.match_token(&TokenKind::Comma) {
                return self.finish_import(start, specifiers, type_only);
            }
        }

        // Namespace or named imports
        if self.match_token(&TokenKind::Star) {
            self.require_token(&TokenKind::As)?;
            let local = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Namespace {
                span: local.span,
                local,
            });
        } else if self.match_token(&TokenKind::LBrace) {
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                let spec_start = self.current.span;
                // Inline type modifier: `import { type A }`
                if self.check(&TokenKind::Type) && self.next_is_declaration_name() {
                    self.advance();
                }
                let imported = if let TokenKind::String(name) = &self.current.kind {
                    let id = Identifier {
                        name: name.clone(),
                        span: self.current.span,
                    };
                    self.advance();
                    id
                } else {
                    self.parse_identifier_name()?
                };
                let local = if self.match_token(&TokenKind::As) {
                    self.parse_identifier()?
                } else {
                    imported.clone()
                };
                let span = self.span_from(spec_start);
                specifiers.push(ImportSpecifier::Named {
                    local,
                    imported,
                    span,
                });

                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.require_token(&TokenKind::RBrace)?;
        }

        self.finish_import(start, specifiers, type_only)
    }

    /// `import from from "x"` imports a default binding named `from`.
    fn is_default_from(&mut self) -> bool {
        self.check(&TokenKind::From) && self.peek_is(&TokenKind::From)
    }

    fn finish_import(
        &mut self,
        start: Span,
        specifiers: Vec<ImportSpecifier>,
        type_only: bool,
    ) -> Result<ImportDeclaration, AnnotateError> {
        self.require_token(&TokenKind::From)?;
        let source = self.parse_string_literal()?;
        self.skip_import_attributes()?;
        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(ImportDeclaration {
            specifiers,
            source,
            type_only,
            span,
        })
    }

    /// `with { type: "json" }` after a module specifier.
    fn skip_import_attributes(&mut self) -> Result<(), AnnotateError> {
        if (self.check(&TokenKind::With) || self.check_keyword("assert"))
            && self.peek_is(&TokenKind::LBrace)
        {
            self.advance();
            self.parse_object_literal()?;
        }
        Ok(())
    }

    /// Right-hand side of `import x = ...`, as the specifier text.
    fn parse_import_equals_target(&mut self) -> Result<StringLiteral, AnnotateError> {
        if self.check_keyword("require") && self.peek_is(&TokenKind::LParen) {
            self.advance();
            self.require_token(&TokenKind::LParen)?;
            let source = self.parse_string_literal()?;
            self.require_token(&TokenKind::RParen)?;
            return Ok(source);
        }
        let start = self.current.span;
        let mut dotted = self.parse_identifier()?.name.to_string();
        while self.match_token(&TokenKind::Dot) {
            dotted.push('.');
            dotted.push_str(&self.parse_identifier_name()?.name);
        }
        Ok(StringLiteral {
            value: self.intern(&dotted),
            span: self.span_from(start),
        })
    }

    fn parse_export(&mut self) -> Result<ExportDeclaration, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Export)?;

        // `export type { ... }` / `export type * from` are type-only re-exports;
        // `export type X = ...` falls through to declaration parsing.
        let type_only = self.check(&TokenKind::Type)
            && (self.peek_is(&TokenKind::LBrace) || self.peek_is(&TokenKind::Star));
        if type_only {
            self.advance();
        }

        let decorators = self.parse_decorators()?;

        // export = value;
        if self.match_token(&TokenKind::Eq) {
            let expr = self.parse_assignment_expression()?;
            self.expect_semicolon()?;
            let span = expr.span();
            return Ok(self.export_of(
                start,
                Some(Statement::Expression(ExpressionStatement {
                    expression: Rc::new(expr),
                    span,
                })),
                true,
            ));
        }

        // export as namespace Lib;
        if self.check(&TokenKind::As) && self.peek_is(&TokenKind::Namespace) {
            self.advance();
            self.advance();
            let namespace_export = Some(self.parse_identifier()?);
            self.expect_semicolon()?;
            let span = self.span_from(start);
            return Ok(ExportDeclaration {
                declaration: None,
                specifiers: vec![],
                source: None,
                namespace_export,
                default: false,
                type_only: true,
                span,
            });
        }

        if self.match_token(&TokenKind::Default) {
            let more_decorators = self.parse_decorators()?;
            let decorators = [decorators, more_decorators].concat();
            let declaration = match self.current.kind.clone() {
                TokenKind::Class | TokenKind::Abstract => {
                    let mut class_decl = self.parse_class_declaration(false)?;
                    class_decl.decorators = decorators;
                    Statement::ClassDeclaration(class_decl)
                }
                TokenKind::Function => {
                    Statement::FunctionDeclaration(self.parse_function_declaration(false)?)
                }
                TokenKind::Async
                    if self.peek_is(&TokenKind::Function) && self.peek_on_same_line() =>
                {
                    Statement::FunctionDeclaration(self.parse_function_declaration(false)?)
                }
                TokenKind::Interface if self.next_is_declaration_name() => {
                    Statement::InterfaceDeclaration(self.parse_interface()?)
                }
                _ => {
                    let expr = self.parse_assignment_expression()?;
                    self.expect_semicolon()?;
                    let span = expr.span();
                    Statement::Expression(ExpressionStatement {
                        expression: Rc::new(expr),
                        span,
                    })
                }
            };
            let mut export = self.export_of(start, Some(declaration), true);
            export.type_only = type_only;
            return Ok(export);
        }

        // export { ... } [from "x"]
        if self.match_token(&TokenKind::LBrace) {
            let mut specifiers = vec![];

            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                let spec_start = self.current.span;
                if self.check(&TokenKind::Type) && self.next_is_declaration_name() {
                    self.advance();
                }
                let local = self.parse_identifier_name()?;
                let exported = if self.match_token(&TokenKind::As) {
                    self.parse_identifier_name()?
                } else {
                    local.clone()
                };
                let span = self.span_from(spec_start);
                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    span,
                });

                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }

            self.require_token(&TokenKind::RBrace)?;

            let source = if self.match_token(&TokenKind::From) {
                let source = self.parse_string_literal()?;
                self.skip_import_attributes()?;
                Some(source)
            } else {
                None
            };

            self.expect_semicolon()?;

            let span = self.span_from(start);
            return Ok(ExportDeclaration {
                declaration: None,
                specifiers,
                source,
                namespace_export: None,
                default: false,
                type_only,
                span,
            });
        }

        // export * from OR export * as ns from
        if self.match_token(&TokenKind::Star) {
            let namespace_export = if self.match_token(&TokenKind::As) {
                Some(self.parse_identifier_name()?)
            } else {
                None
            };

            self.require_token(&TokenKind::From)?;
            let source = Some(self.parse_string_literal()?);
            self.skip_import_attributes()?;
            self.expect_semicolon()?;

            let span = self.span_from(start);
            return Ok(ExportDeclaration {
                declaration: None,
                specifiers: vec![],
                source,
                namespace_export,
                default: false,
                type_only,
                span,
            });
        }

        // export import A = B.C;
        if self.check(&TokenKind::Import) {
            let import = self.parse_import()?;
            return Ok(self.export_of(start, Some(Statement::Import(import)), false));
        }

        // export <declaration>
        let mut declaration = self.parse_statement()?;
        match &mut declaration {
            Statement::ClassDeclaration(class_decl) => class_decl.decorators = decorators,
            Statement::VariableDeclaration(_)
            | Statement::FunctionDeclaration(_)
            | Statement::TypeAlias(_)
            | Statement::InterfaceDeclaration(_)
            | Statement::EnumDeclaration(_)
            | Statement::NamespaceDeclaration(_) => {}
            _ => return Err(self.error("Expected a declaration after 'export'")),
        }
        Ok(self.export_of(start, Some(declaration), false))
    }

    fn export_of(
        &self,
        start: Span,
        declaration: Option<Statement>,
        default: bool,
    ) -> ExportDeclaration {
        ExportDeclaration {
            declaration: declaration.map(Rc::new),
            specifiers: vec![],
            source: None,
            namespace_export: None,
            default,
            type_only: false,
            span: self.span_from(start),
        }
    }
}

/// Move decorators parsed before `export` onto the exported class.
fn attach_decorators(declaration: &mut Option<Rc<Statement>>, decorators: Vec<Decorator>) {
    if let Some(decl) = declaration
        && let Some(Statement::ClassDeclaration(class_decl)) = Rc::get_mut(decl)
    {
        class_decl.decorators = decorators;
    }
}
