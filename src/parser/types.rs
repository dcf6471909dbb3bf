//! Type annotation grammar.

use super::Parser;
use crate::ast::*;
use crate::error::AnnotateError;
use crate::lexer::{Span, TokenKind};

impl<'a> Parser<'a> {
    pub(super) fn parse_type_annotation(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        self.nested(Self::parse_type_annotation_inner)
    }

    fn parse_type_annotation_inner(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        let check_type = self.parse_non_conditional_type()?;

        if !self.check(&TokenKind::Extends) || self.lexer.had_newline_before() {
            return Ok(check_type);
        }
        self.advance();
        let extends_type = self.parse_non_conditional_type()?;
        self.require_token(&TokenKind::Question)?;
        let true_type = self.parse_type_annotation()?;
        self.require_token(&TokenKind::Colon)?;
        let false_type = self.parse_type_annotation()?;

        let span = self.span_from(start);
        Ok(TypeAnnotation::Conditional(ConditionalType {
            check_type: Box::new(check_type),
            extends_type: Box::new(extends_type),
            true_type: Box::new(true_type),
            false_type: Box::new(false_type),
            span,
        }))
    }

    fn parse_non_conditional_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        match self.current.kind.clone() {
            TokenKind::Lt => self.parse_function_type(false),
            TokenKind::New => self.parse_function_type(true),
            TokenKind::Abstract if self.peek_is(&TokenKind::New) => {
                self.advance();
                self.parse_function_type(true)
            }
            TokenKind::LParen => {
                if let Some(function_type) = self.try_parse(|p| {
                    let start = p.current.span;
                    let (params, _) = p.parse_function_params()?;
                    if !p.check(&TokenKind::Arrow) {
                        return Ok(None);
                    }
                    p.finish_function_type(start, params, None, false).map(Some)
                }) {
                    return Ok(function_type);
                }
                self.parse_union_type()
            }
            _ => self.parse_union_type(),
        }
    }

    /// `<T>(x: T) => R` or, with `constructor`, `new (x: T) => R`.
    fn parse_function_type(&mut self, constructor: bool) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        if constructor {
            self.require_token(&TokenKind::New)?;
        }
        let type_parameters = self.parse_optional_type_parameters()?;
        let (params, _) = self.parse_function_params()?;
        self.finish_function_type(start, params, type_parameters, constructor)
    }

    fn finish_function_type(
        &mut self,
        start: Span,
        params: Vec<FunctionParam>,
        type_parameters: Option<TypeParameters>,
        constructor: bool,
    ) -> Result<TypeAnnotation, AnnotateError> {
        self.require_token(&TokenKind::Arrow)?;
        let return_type = self.parse_return_type()?;
        let span = self.span_from(start);
        Ok(TypeAnnotation::Function(FunctionType {
            params,
            return_type: Box::new(return_type),
            type_parameters,
            constructor,
            span,
        }))
    }

    fn parse_union_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        // Leading `|` is allowed: type A = | "a" | "b"
        let leading = self.match_token(&TokenKind::Pipe);

        let mut types = vec![self.parse_intersection_type()?];
        while self.match_token(&TokenKind::Pipe) {
            types.push(self.parse_intersection_type()?);
        }

        if types.len() == 1 && !leading {
            return Ok(types.remove(0));
        }
        let span = self.span_from(start);
        Ok(TypeAnnotation::Union(UnionType { types, span }))
    }

    fn parse_intersection_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        let leading = self.match_token(&TokenKind::Amp);

        let mut types = vec![self.parse_type_operator()?];
        while self.match_token(&TokenKind::Amp) {
            types.push(self.parse_type_operator()?);
        }

        if types.len() == 1 && !leading {
            return Ok(types.remove(0));
        }
        let span = self.span_from(start);
        Ok(TypeAnnotation::Intersection(IntersectionType { types, span }))
    }

    /// `keyof T`, `readonly T[]`, `unique symbol`, `infer U`, or a postfix type.
    fn parse_type_operator(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        let operator = match &self.current.kind {
            TokenKind::Keyof => Some(TypeOperator::Keyof),
            TokenKind::Readonly => Some(TypeOperator::Readonly),
            TokenKind::Unique => Some(TypeOperator::Unique),
            TokenKind::Infer => return self.parse_infer_type(),
            _ => None,
        };

        if let Some(operator) = operator {
            self.advance();
            let type_annotation = Box::new(self.parse_type_operator()?);
            let span = self.span_from(start);
            return Ok(TypeAnnotation::Operator(TypeOperatorType {
                operator,
                type_annotation,
                span,
            }));
        }

        self.parse_postfix_type()
    }

    fn parse_infer_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Infer)?;
        let name = self.parse_identifier()?;

        // `infer U extends X` unless the `extends` starts a conditional type
        let constraint = if self.check(&TokenKind::Extends) {
            self.try_parse(|p| {
                p.advance();
                let constraint = p.parse_non_conditional_type()?;
                Ok((!p.check(&TokenKind::Question)).then_some(constraint))
            })
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(TypeAnnotation::Infer(InferType {
            type_parameter: TypeParameter {
                span: name.span,
                name,
                constraint: constraint.map(Box::new),
                default: None,
                const_: false,
            },
            span,
        }))
    }

    /// Array `T[]` and indexed access `T[K]` suffixes.
    fn parse_postfix_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        let mut ty = self.parse_primary_type()?;

        while self.check(&TokenKind::LBracket) && !self.lexer.had_newline_before() {
            self.advance();
            if self.match_token(&TokenKind::RBracket) {
                let span = self.span_from(start);
                ty = TypeAnnotation::Array(ArrayType {
                    element_type: Box::new(ty),
                    span,
                });
            } else {
                let index_type = self.parse_type_annotation()?;
                self.require_token(&TokenKind::RBracket)?;
                let span = self.span_from(start);
                ty = TypeAnnotation::Indexed(IndexedAccessType {
                    object_type: Box::new(ty),
                    index_type: Box::new(index_type),
                    span,
                });
            }
        }

        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;

        let keyword = match &self.current.kind {
            TokenKind::Any => Some(TypeKeywordKind::Any),
            TokenKind::Unknown => Some(TypeKeywordKind::Unknown),
            TokenKind::Never => Some(TypeKeywordKind::Never),
            TokenKind::Void => Some(TypeKeywordKind::Void),
            TokenKind::Null => Some(TypeKeywordKind::Null),
            TokenKind::Identifier(name) => keyword_type(name.as_ref()),
            _ => None,
        };
        // `string.x` would be a qualified name, not the keyword
        let qualified =
            matches!(self.current.kind, TokenKind::Identifier(_)) && self.peek_is(&TokenKind::Dot);
        if let Some(keyword) = keyword.filter(|_| !qualified) {
            self.advance();
            return Ok(TypeAnnotation::Keyword(TypeKeyword {
                keyword,
                span: start,
            }));
        }

        let literal = match &self.current.kind {
            TokenKind::String(s) => Some(LiteralValue::String(s.clone())),
            TokenKind::Number(n) => Some(LiteralValue::Number(*n)),
            TokenKind::BigInt(digits) => Some(LiteralValue::BigInt(digits.clone())),
            TokenKind::True => Some(LiteralValue::Boolean(true)),
            TokenKind::False => Some(LiteralValue::Boolean(false)),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(TypeAnnotation::Literal(TypeLiteral { value, span: start }));
        }

        match &self.current.kind {
            // Negative number literal type: -1
            TokenKind::Minus => {
                self.advance();
                let value = match &self.current.kind {
                    TokenKind::Number(n) => LiteralValue::Number(-*n),
                    TokenKind::BigInt(digits) => LiteralValue::BigInt(format!("-{}", digits)),
                    _ => return Err(self.unexpected_token("number after '-' in type")),
                };
                self.advance();
                let span = self.span_from(start);
                Ok(TypeAnnotation::Literal(TypeLiteral { value, span }))
            }
            TokenKind::This => {
                self.advance();
                Ok(TypeAnnotation::This(start))
            }
            TokenKind::Typeof => {
                self.advance();
                let expression = self.parse_dotted_name()?;
                // Instantiation arguments on `typeof f<T>` do not change the query target
                self.parse_optional_type_arguments()?;
                let span = self.span_from(start);
                Ok(TypeAnnotation::Typeof(TypeofType { expression, span }))
            }
            TokenKind::LBrace => {
                if self.is_mapped_type_start() {
                    self.parse_mapped_type()
                } else {
                    self.advance();
                    let members = self.parse_type_members()?;
                    self.require_token(&TokenKind::RBrace)?;
                    let span = self.span_from(start);
                    Ok(TypeAnnotation::Object(ObjectType { members, span }))
                }
            }
            TokenKind::LBracket => self.parse_tuple_type(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type_annotation()?;
                self.require_token(&TokenKind::RParen)?;
                let span = self.span_from(start);
                Ok(TypeAnnotation::Parenthesized(ParenthesizedType {
                    type_annotation: Box::new(inner),
                    span,
                }))
            }
            TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                self.parse_template_literal_type()
            }
            _ if self.check_identifier() => {
                Ok(TypeAnnotation::Reference(self.parse_type_reference()?))
            }
            _ => Err(self.unexpected_token("type")),
        }
    }

    /// `a`, `a.b.c`, stored with its dots.
    fn parse_dotted_name(&mut self) -> Result<Identifier, AnnotateError> {
        let first = if self.check(&TokenKind::This) {
            let span = self.current.span;
            self.advance();
            Identifier {
                name: self.intern("this"),
                span,
            }
        } else {
            self.parse_identifier()?
        };
        if !self.check(&TokenKind::Dot) {
            return Ok(first);
        }

        let mut dotted = first.name.to_string();
        while self.match_token(&TokenKind::Dot) {
            dotted.push('.');
            dotted.push_str(&self.parse_identifier_name()?.name);
        }
        Ok(Identifier {
            name: self.intern(&dotted),
            span: self.span_from(first.span),
        })
    }

    pub(super) fn parse_type_reference(&mut self) -> Result<TypeReference, AnnotateError> {
        let start = self.current.span;
        let name = self.parse_dotted_name()?;
        let type_arguments = if self.check(&TokenKind::Lt) {
            self.parse_optional_type_arguments()?
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(TypeReference {
            name,
            type_arguments,
            span,
        })
    }

    fn parse_tuple_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let mut element_types = vec![];
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            let elem_start = self.current.span;
            let rest = self.match_token(&TokenKind::DotDotDot);

            // Labeled element: `name: T` or `name?: T`
            let label = if self.is_tuple_label() {
                let label = self.parse_identifier_name()?;
                Some(label)
            } else {
                None
            };

            let (type_annotation, optional) = if label.is_some() {
                let optional = self.match_token(&TokenKind::Question);
                self.require_token(&TokenKind::Colon)?;
                (self.parse_type_annotation()?, optional)
            } else {
                let ty = self.parse_type_annotation()?;
                (ty, self.match_token(&TokenKind::Question))
            };

            let span = self.span_from(elem_start);
            element_types.push(TupleElement {
                label,
                type_annotation,
                optional,
                rest,
                span,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.require_token(&TokenKind::RBracket)?;
        let span = self.span_from(start);
        Ok(TypeAnnotation::Tuple(TupleType {
            element_types,
            span,
        }))
    }

    fn is_tuple_label(&mut self) -> bool {
        if !self.check_identifier() && super::keyword_text(&self.current.kind).is_none() {
            return false;
        }
        let snapshot = self.snapshot();
        self.advance();
        let labeled = self.check(&TokenKind::Colon)
            || self.match_token(&TokenKind::Question) && self.check(&TokenKind::Colon);
        self.rewind(snapshot);
        labeled
    }

    fn parse_template_literal_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        let head = match &self.current.kind {
            TokenKind::TemplateNoSub(s) => {
                let quasis = vec![s.clone()];
                self.advance();
                return Ok(TypeAnnotation::TemplateLiteral(TemplateLiteralType {
                    quasis,
                    types: vec![],
                    span: start,
                }));
            }
            TokenKind::TemplateHead(s) => s.clone(),
            _ => return Err(self.unexpected_token("template literal type")),
        };
        self.advance();

        let mut quasis = vec![head];
        let mut types = vec![];
        loop {
            types.push(self.parse_type_annotation()?);
            if !self.check(&TokenKind::RBrace) {
                return Err(self.unexpected_token("'}' in template literal type"));
            }
            let part = self.lexer.rescan_template_continuation(self.current.span);
            let (text, tail) = match &part.kind {
                TokenKind::TemplateTail(s) => (s.clone(), true),
                TokenKind::TemplateMiddle(s) => (s.clone(), false),
                _ => return Err(self.unexpected_token("template continuation")),
            };
            quasis.push(text);
            self.previous = part;
            self.current = self.lexer.next_token();
            if tail {
                break;
            }
        }

        let span = self.span_from(start);
        Ok(TypeAnnotation::TemplateLiteral(TemplateLiteralType {
            quasis,
            types,
            span,
        }))
    }

    /// Lookahead for `{ [K in ...` with an optional readonly modifier.
    fn is_mapped_type_start(&mut self) -> bool {
        let snapshot = self.snapshot();
        self.advance();
        if self.match_token(&TokenKind::Plus) || self.match_token(&TokenKind::Minus) {
            self.match_token(&TokenKind::Readonly);
        } else {
            self.match_token(&TokenKind::Readonly);
        }
        let mapped = self.match_token(&TokenKind::LBracket)
            && self.parse_identifier().is_ok()
            && self.check(&TokenKind::In);
        self.rewind(snapshot);
        mapped
    }

    fn parse_mapped_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let readonly = self.parse_mapped_modifier(&TokenKind::Readonly)?;

        self.require_token(&TokenKind::LBracket)?;
        let param_start = self.current.span;
        let name = self.parse_identifier()?;
        self.require_token(&TokenKind::In)?;
        let constraint = self.parse_type_annotation()?;
        let type_parameter = TypeParameter {
            name,
            constraint: Some(Box::new(constraint)),
            default: None,
            const_: false,
            span: self.span_from(param_start),
        };
        let name_type = if self.match_token(&TokenKind::As) {
            Some(Box::new(self.parse_type_annotation()?))
        } else {
            None
        };
        self.require_token(&TokenKind::RBracket)?;

        let optional = self.parse_mapped_modifier(&TokenKind::Question)?;

        let type_annotation = if self.match_token(&TokenKind::Colon) {
            Some(Box::new(self.parse_type_annotation()?))
        } else {
            None
        };

        if !self.match_token(&TokenKind::Semicolon) {
            self.match_token(&TokenKind::Comma);
        }
        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(TypeAnnotation::Mapped(MappedType {
            type_parameter,
            name_type,
            type_annotation,
            readonly,
            optional,
            span,
        }))
    }

    /// `+token`, `-token` or a bare `token` in a mapped type.
    fn parse_mapped_modifier(
        &mut self,
        token: &TokenKind,
    ) -> Result<Option<MappedTypeModifier>, AnnotateError> {
        let modifier = if self.match_token(&TokenKind::Plus) {
            self.require_token(token)?;
            MappedTypeModifier::Add
        } else if self.match_token(&TokenKind::Minus) {
            self.require_token(token)?;
            MappedTypeModifier::Remove
        } else if self.match_token(token) {
            MappedTypeModifier::Present
        } else {
            return Ok(None);
        };
        Ok(Some(modifier))
    }

    // ============ MEMBERS ============

    /// Members of an interface body or object type, up to (not including) `}`.
    pub(super) fn parse_type_members(&mut self) -> Result<Vec<TypeMember>, AnnotateError> {
        let mut members = vec![];

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            members.push(self.parse_type_member()?);
            self.expect_member_separator()?;
        }

        Ok(members)
    }

    fn parse_type_member(&mut self) -> Result<TypeMember, AnnotateError> {
        let start = self.current.span;

        // Call signature: (x: T): R
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            return Ok(TypeMember::Call(self.parse_call_signature(start)?));
        }

        // Construct signature: new (x: T): R
        if self.check(&TokenKind::New)
            && (self.peek_is(&TokenKind::LParen) || self.peek_is(&TokenKind::Lt))
        {
            self.advance();
            return Ok(TypeMember::Construct(self.parse_call_signature(start)?));
        }

        let readonly = self.check(&TokenKind::Readonly)
            && super::token_starts_property_name(&self.peek_token().kind);
        if readonly {
            self.advance();
        }

        if self.check(&TokenKind::LBracket) && self.is_index_signature() {
            return Ok(TypeMember::Index(self.parse_index_signature(start, readonly)?));
        }

        // Accessors in type literals describe a property
        let accessor = if (self.check_keyword("get") || self.check_keyword("set"))
            && super::token_starts_property_name(&self.peek_token().kind)
        {
            let is_get = self.check_keyword("get");
            self.advance();
            Some(is_get)
        } else {
            None
        };

        let key = self.parse_property_name()?;
        let optional = self.match_token(&TokenKind::Question);

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let type_parameters = self.parse_optional_type_parameters()?;
            let (params, _) = self.parse_function_params()?;
            let return_type = self.parse_optional_return_type()?;

            if let Some(is_get) = accessor {
                let type_annotation = if is_get {
                    return_type
                } else {
                    params.into_iter().next().and_then(|p| p.type_annotation)
                };
                let span = self.span_from(start);
                return Ok(TypeMember::Property(PropertySignature {
                    key,
                    type_annotation,
                    optional,
                    readonly: is_get,
                    span,
                }));
            }

            let span = self.span_from(start);
            return Ok(TypeMember::Method(MethodSignature {
                key,
                params,
                return_type,
                type_parameters,
                optional,
                span,
            }));
        }

        let type_annotation = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(TypeMember::Property(PropertySignature {
            key,
            type_annotation,
            optional,
            readonly,
            span,
        }))
    }

    fn parse_call_signature(&mut self, start: Span) -> Result<CallSignature, AnnotateError> {
        let type_parameters = self.parse_optional_type_parameters()?;
        let (params, _) = self.parse_function_params()?;
        let return_type = self.parse_optional_return_type()?;
        let span = self.span_from(start);
        Ok(CallSignature {
            params,
            return_type,
            type_parameters,
            span,
        })
    }

    /// Member separator: `;`, `,`, or a line break before the next member.
    pub(super) fn expect_member_separator(&mut self) -> Result<(), AnnotateError> {
        if self.match_token(&TokenKind::Semicolon) || self.match_token(&TokenKind::Comma) {
            return Ok(());
        }
        self.expect_semicolon()
    }

    /// `[name: ...` starts an index signature rather than a computed key.
    pub(super) fn is_index_signature(&mut self) -> bool {
        let snapshot = self.snapshot();
        self.advance();
        let is_index = self.parse_identifier_name().is_ok() && self.check(&TokenKind::Colon);
        self.rewind(snapshot);
        is_index
    }

    pub(super) fn parse_index_signature(
        &mut self,
        start: Span,
        readonly: bool,
    ) -> Result<IndexSignature, AnnotateError> {
        self.require_token(&TokenKind::LBracket)?;
        let key = self.parse_identifier_name()?;
        self.require_token(&TokenKind::Colon)?;
        let key_type = self.parse_type_annotation()?;
        self.require_token(&TokenKind::RBracket)?;
        self.require_token(&TokenKind::Colon)?;
        let value_type = self.parse_type_annotation()?;

        let span = self.span_from(start);
        Ok(IndexSignature {
            key,
            key_type,
            value_type,
            readonly,
            static_: false,
            span,
        })
    }

    // ============ GENERICS AND RETURN TYPES ============

    pub(super) fn parse_optional_type_parameters(
        &mut self,
    ) -> Result<Option<TypeParameters>, AnnotateError> {
        if !self.check(&TokenKind::Lt) {
            return Ok(None);
        }
        let start = self.current.span;
        self.advance();

        let mut params = vec![];
        while !self.check_gt_in_type_context() && !self.is_at_end() {
            let param_start = self.current.span;
            let const_ = self.match_token(&TokenKind::Const);
            // Variance annotations: `in T`, `out T`, `in out T`
            if self.check(&TokenKind::In) && !self.peek_is(&TokenKind::Comma) {
                self.advance();
            }
            if self.check_keyword("out") && self.check_next_is_identifier() {
                self.advance();
            }

            let name = self.parse_identifier()?;
            let constraint = if self.match_token(&TokenKind::Extends) {
                Some(Box::new(self.parse_type_annotation()?))
            } else {
                None
            };
            let default = if self.match_token(&TokenKind::Eq) {
                Some(Box::new(self.parse_type_annotation()?))
            } else {
                None
            };

            let span = self.span_from(param_start);
            params.push(TypeParameter {
                name,
                constraint,
                default,
                const_,
                span,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        if params.is_empty() {
            return Err(self.error("Type parameter list cannot be empty"));
        }
        self.consume_gt_in_type_context()?;

        let span = self.span_from(start);
        Ok(Some(TypeParameters { params, span }))
    }

    fn check_next_is_identifier(&mut self) -> bool {
        let next = self.peek_token();
        matches!(next.kind, TokenKind::Identifier(_)) || super::is_contextual_keyword(&next.kind)
    }

    pub(super) fn parse_optional_type_arguments(
        &mut self,
    ) -> Result<Option<TypeArguments>, AnnotateError> {
        if !self.check(&TokenKind::Lt) {
            return Ok(None);
        }
        let start = self.current.span;
        self.advance();

        let mut params = vec![];
        while !self.check_gt_in_type_context() && !self.is_at_end() {
            params.push(self.parse_type_annotation()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        if params.is_empty() {
            return Err(self.error("Type argument list cannot be empty"));
        }
        self.consume_gt_in_type_context()?;

        let span = self.span_from(start);
        Ok(Some(TypeArguments { params, span }))
    }

    pub(super) fn parse_optional_return_type(
        &mut self,
    ) -> Result<Option<TypeAnnotation>, AnnotateError> {
        if self.match_token(&TokenKind::Colon) {
            Ok(Some(self.parse_return_type()?))
        } else {
            Ok(None)
        }
    }

    /// A return type, which may be a type predicate.
    fn parse_return_type(&mut self) -> Result<TypeAnnotation, AnnotateError> {
        let start = self.current.span;

        // asserts x [is T]
        if self.check(&TokenKind::Asserts) && self.peek_on_same_line() {
            let next = self.peek_token();
            if matches!(next.kind, TokenKind::Identifier(_) | TokenKind::This)
                || super::is_contextual_keyword(&next.kind)
            {
                self.advance();
                let parameter = self.parse_predicate_parameter()?;
                let type_annotation = if self.match_token(&TokenKind::Is) {
                    Some(Box::new(self.parse_type_annotation()?))
                } else {
                    None
                };
                let span = self.span_from(start);
                return Ok(TypeAnnotation::Predicate(TypePredicate {
                    asserts: true,
                    parameter,
                    type_annotation,
                    span,
                }));
            }
        }

        // x is T / this is T
        if (self.check_identifier() || self.check(&TokenKind::This))
            && self.peek_is(&TokenKind::Is)
            && self.peek_on_same_line()
        {
            let parameter = self.parse_predicate_parameter()?;
            self.require_token(&TokenKind::Is)?;
            let type_annotation = Some(Box::new(self.parse_type_annotation()?));
            let span = self.span_from(start);
            return Ok(TypeAnnotation::Predicate(TypePredicate {
                asserts: false,
                parameter,
                type_annotation,
                span,
            }));
        }

        self.parse_type_annotation()
    }

    fn parse_predicate_parameter(&mut self) -> Result<Identifier, AnnotateError> {
        if self.check(&TokenKind::This) {
            let span = self.current.span;
            self.advance();
            return Ok(Identifier {
                name: self.intern("this"),
                span,
            });
        }
        self.parse_identifier()
    }
}

/// Primitive type keywords that the lexer leaves as identifiers.
fn keyword_type(name: &str) -> Option<TypeKeywordKind> {
    let keyword = match name {
        "string" => TypeKeywordKind::String,
        "number" => TypeKeywordKind::Number,
        "boolean" => TypeKeywordKind::Boolean,
        "symbol" => TypeKeywordKind::Symbol,
        "bigint" => TypeKeywordKind::BigInt,
        "object" => TypeKeywordKind::Object,
        "undefined" => TypeKeywordKind::Undefined,
        _ => return None,
    };
    Some(keyword)
}
