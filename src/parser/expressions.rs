//! Expression grammar: Pratt binary operators, calls and members, literals,
//! arrow functions and the cover grammar for destructuring assignment.

use std::rc::Rc;

use super::{Parser, token_starts_property_name};
use crate::ast::*;
use crate::error::AnnotateError;
use crate::lexer::{Span, TokenKind};

/// Precedence of `as` and `satisfies`, shared with the relational operators.
const AS_PRECEDENCE: u8 = 10;

/// Parameter list and return type of an arrow function, before its body.
struct ArrowHead {
    params: Vec<FunctionParam>,
    params_span: Span,
    return_type: Option<TypeAnnotation>,
    type_parameters: Option<TypeParameters>,
}

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self) -> Result<Expression, AnnotateError> {
        self.parse_sequence_expression()
    }

    /// Parse an expression with `in` allowed again, as inside brackets.
    fn parse_expression_allow_in(&mut self) -> Result<Expression, AnnotateError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let expr = self.parse_expression();
        self.no_in = saved;
        expr
    }

    fn parse_assignment_allow_in(&mut self) -> Result<Expression, AnnotateError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let expr = self.parse_assignment_expression();
        self.no_in = saved;
        expr
    }

    fn parse_sequence_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        let mut expr = self.parse_assignment_expression()?;

        if self.check(&TokenKind::Comma) {
            let mut expressions = vec![expr];
            while self.match_token(&TokenKind::Comma) {
                expressions.push(self.parse_assignment_expression()?);
            }
            let span = self.span_from(start);
            expr = Expression::Sequence(SequenceExpression { expressions, span });
        }

        Ok(expr)
    }

    pub(super) fn parse_assignment_expression(&mut self) -> Result<Expression, AnnotateError> {
        self.nested(Self::parse_assignment_expression_inner)
    }

    fn parse_assignment_expression_inner(&mut self) -> Result<Expression, AnnotateError> {
        if self.check(&TokenKind::Yield) {
            return self.parse_yield_expression();
        }

        let start = self.current.span;
        let expr = self.parse_conditional_expression()?;

        if let Some(op) = self.current_assignment_op() {
            self.advance();
            let right = Rc::new(self.parse_assignment_expression()?);
            let left = self.expression_to_assignment_target(&expr)?;
            let span = self.span_from(start);
            return Ok(Expression::Assignment(AssignmentExpression {
                operator: op,
                left,
                right,
                span,
            }));
        }

        Ok(expr)
    }

    fn parse_yield_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Yield)?;

        let delegate = self.match_token(&TokenKind::Star);

        // `yield` alone is valid when the next token cannot start an expression
        let argument = if !self.check(&TokenKind::Semicolon)
            && !self.check(&TokenKind::RBrace)
            && !self.check(&TokenKind::RParen)
            && !self.check(&TokenKind::RBracket)
            && !self.check(&TokenKind::Comma)
            && !self.check(&TokenKind::Colon)
            && !self.is_at_end()
            && !self.lexer.had_newline_before()
        {
            Some(Rc::new(self.parse_assignment_expression()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Expression::Yield(YieldExpression {
            argument,
            delegate,
            span,
        }))
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        let test = self.parse_binary_expression(0)?;

        if self.match_token(&TokenKind::Question) {
            let consequent = Rc::new(self.parse_assignment_allow_in()?);
            self.require_token(&TokenKind::Colon)?;
            let alternate = Rc::new(self.parse_assignment_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Conditional(ConditionalExpression {
                test: Rc::new(test),
                consequent,
                alternate,
                span,
            }));
        }

        Ok(test)
    }

    /// Pratt parser for binary expressions, `as` and `satisfies`.
    fn parse_binary_expression(&mut self, min_prec: u8) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        let mut left = self.parse_unary_expression()?;

        loop {
            if (self.check(&TokenKind::As) || self.check(&TokenKind::Satisfies))
                && !self.lexer.had_newline_before()
                && AS_PRECEDENCE >= min_prec
            {
                left = self.parse_as_or_satisfies(left, start)?;
                continue;
            }

            let Some((op, prec)) = self.current_binary_op() else {
                break;
            };
            if prec < min_prec || self.no_in && self.check(&TokenKind::In) {
                break;
            }
            self.advance();

            // `**` is right-associative
            let next_prec = if op == BinaryOperator::Binary(BinaryOp::Exp) {
                prec
            } else {
                prec + 1
            };
            let right = Rc::new(self.parse_binary_expression(next_prec)?);
            let left_rc = Rc::new(left);

            let span = self.span_from(start);
            left = match op {
                BinaryOperator::Logical(operator) => Expression::Logical(LogicalExpression {
                    operator,
                    left: left_rc,
                    right,
                    span,
                }),
                BinaryOperator::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: left_rc,
                    right,
                    span,
                }),
            };
        }

        Ok(left)
    }

    fn parse_as_or_satisfies(
        &mut self,
        expression: Expression,
        start: Span,
    ) -> Result<Expression, AnnotateError> {
        let is_as = self.check(&TokenKind::As);
        self.advance();

        // `as const` is kept as a reference to the pseudo-type `const`
        let type_annotation = if is_as && self.check(&TokenKind::Const) {
            let span = self.current.span;
            let name = self.intern("const");
            self.advance();
            TypeAnnotation::Reference(TypeReference {
                name: Identifier { name, span },
                type_arguments: None,
                span,
            })
        } else {
            self.parse_type_annotation()?
        };

        let assertion = TypeAssertionExpression {
            expression: Rc::new(expression),
            type_annotation,
            span: self.span_from(start),
        };
        Ok(if is_as {
            Expression::TypeAssertion(assertion)
        } else {
            Expression::Satisfies(assertion)
        })
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;

        if let Some(op) = self.current_unary_op() {
            self.advance();
            let argument = Rc::new(self.nested(Self::parse_unary_expression)?);
            let span = self.span_from(start);
            return Ok(Expression::Unary(UnaryExpression {
                operator: op,
                argument,
                prefix: true,
                span,
            }));
        }

        if let Some(op) = self.current_update_op() {
            self.advance();
            let argument = Rc::new(self.nested(Self::parse_unary_expression)?);
            let span = self.span_from(start);
            return Ok(Expression::Update(UpdateExpression {
                operator: op,
                argument,
                prefix: true,
                span,
            }));
        }

        if self.check(&TokenKind::Await) {
            self.advance();
            let argument = Rc::new(self.nested(Self::parse_unary_expression)?);
            let span = self.span_from(start);
            return Ok(Expression::Await(AwaitExpression { argument, span }));
        }

        // `<T>(x: T) => x` or the angle-bracket assertion `<T>expr`
        if self.check(&TokenKind::Lt) {
            if let Some(head) = self.try_parse(|p| p.try_parse_arrow_head(true)) {
                return self.parse_arrow_body(head, start, false);
            }
            self.advance();
            let type_annotation = self.parse_type_annotation()?;
            self.consume_gt_in_type_context()?;
            let expression = Rc::new(self.nested(Self::parse_unary_expression)?);
            let span = self.span_from(start);
            return Ok(Expression::TypeAssertion(TypeAssertionExpression {
                expression,
                type_annotation,
                span,
            }));
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        let mut expr = self.parse_left_hand_side_expression()?;

        if !self.lexer.had_newline_before()
            && let Some(op) = self.current_update_op()
        {
            self.advance();
            let span = self.span_from(start);
            expr = Expression::Update(UpdateExpression {
                operator: op,
                argument: Rc::new(expr),
                prefix: false,
                span,
            });
        }

        Ok(expr)
    }

    pub(super) fn parse_left_hand_side_expression(
        &mut self,
    ) -> Result<Expression, AnnotateError> {
        let start = self.current.span;

        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            if self.check(&TokenKind::LParen) {
                let arguments = self.parse_call_arguments()?;
                let span = self.span_from(start);
                expr = Expression::Call(CallExpression {
                    callee: Rc::new(expr),
                    arguments,
                    type_arguments: None,
                    optional: false,
                    span,
                });
            } else if self.check(&TokenKind::Lt) {
                // `f<T>(x)`: only a call when `(` or a template follows the `>`
                let Some(type_arguments) = self.try_parse(|p| {
                    let args = p.parse_optional_type_arguments()?;
                    let followed_by_call = p.check(&TokenKind::LParen)
                        || matches!(
                            p.current.kind,
                            TokenKind::TemplateHead(_) | TokenKind::TemplateNoSub(_)
                        );
                    Ok(args.filter(|_| followed_by_call))
                }) else {
                    break;
                };
                if self.check(&TokenKind::LParen) {
                    let arguments = self.parse_call_arguments()?;
                    let span = self.span_from(start);
                    expr = Expression::Call(CallExpression {
                        callee: Rc::new(expr),
                        arguments,
                        type_arguments: Some(type_arguments),
                        optional: false,
                        span,
                    });
                } else {
                    expr = self.parse_tagged_template(expr, start)?;
                }
            } else if self.match_token(&TokenKind::Dot) {
                let property = self.parse_member_name()?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Rc::new(expr),
                    property,
                    computed: false,
                    optional: false,
                    span,
                });
            } else if self.match_token(&TokenKind::LBracket) {
                let property = self.parse_expression_allow_in()?;
                self.require_token(&TokenKind::RBracket)?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Rc::new(expr),
                    property: MemberProperty::Expression(Rc::new(property)),
                    computed: true,
                    optional: false,
                    span,
                });
            } else if matches!(
                self.current.kind,
                TokenKind::TemplateHead(_) | TokenKind::TemplateNoSub(_)
            ) {
                expr = self.parse_tagged_template(expr, start)?;
            } else if self.match_token(&TokenKind::QuestionDot) {
                expr = self.parse_optional_chain_link(expr, start)?;
            } else if self.check(&TokenKind::Bang) && !self.lexer.had_newline_before() {
                // Non-null assertion. `!=` and `!==` are lexed as their own tokens.
                self.advance();
                let span = self.span_from(start);
                expr = Expression::NonNull(NonNullExpression {
                    expression: Rc::new(expr),
                    span,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// The link after `?.`: a call, an index, or a property name.
    fn parse_optional_chain_link(
        &mut self,
        object: Expression,
        start: Span,
    ) -> Result<Expression, AnnotateError> {
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let type_arguments = self.parse_optional_type_arguments()?;
            let arguments = self.parse_call_arguments()?;
            let span = self.span_from(start);
            return Ok(Expression::Call(CallExpression {
                callee: Rc::new(object),
                arguments,
                type_arguments,
                optional: true,
                span,
            }));
        }

        let (property, computed) = if self.match_token(&TokenKind::LBracket) {
            let property = self.parse_expression_allow_in()?;
            self.require_token(&TokenKind::RBracket)?;
            (MemberProperty::Expression(Rc::new(property)), true)
        } else {
            (self.parse_member_name()?, false)
        };

        let span = self.span_from(start);
        Ok(Expression::Member(MemberExpression {
            object: Rc::new(object),
            property,
            computed,
            optional: true,
            span,
        }))
    }

    /// Property name after `.`: any identifier name or `#private`.
    fn parse_member_name(&mut self) -> Result<MemberProperty, AnnotateError> {
        if self.match_token(&TokenKind::Hash) {
            Ok(MemberProperty::PrivateIdentifier(
                self.parse_private_identifier()?,
            ))
        } else {
            Ok(MemberProperty::Identifier(self.parse_identifier_name()?))
        }
    }

    fn parse_new_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::New)?;

        // new.target
        if self.match_token(&TokenKind::Dot) {
            let name = self.intern("new");
            let property = self.parse_identifier_name()?;
            let span = self.span_from(start);
            return Ok(Expression::Member(MemberExpression {
                object: Rc::new(Expression::Identifier(Identifier { name, span: start })),
                property: MemberProperty::Identifier(property),
                computed: false,
                optional: false,
                span,
            }));
        }

        let callee = Rc::new(self.parse_new_callee()?);

        let type_arguments = if self.check(&TokenKind::Lt) {
            self.try_parse(|p| p.parse_optional_type_arguments())
        } else {
            None
        };

        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_call_arguments()?
        } else {
            vec![]
        };

        let span = self.span_from(start);
        Ok(Expression::New(NewExpression {
            callee,
            arguments,
            type_arguments,
            span,
        }))
    }

    /// Callee of `new`: a member chain without calls.
    fn parse_new_callee(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            if self.match_token(&TokenKind::Dot) {
                let property = self.parse_member_name()?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Rc::new(expr),
                    property,
                    computed: false,
                    optional: false,
                    span,
                });
            } else if self.match_token(&TokenKind::LBracket) {
                let property = self.parse_expression_allow_in()?;
                self.require_token(&TokenKind::RBracket)?;
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Rc::new(expr),
                    property: MemberProperty::Expression(Rc::new(property)),
                    computed: true,
                    optional: false,
                    span,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;

        let literal = match &self.current.kind {
            TokenKind::Number(n) => Some(LiteralValue::Number(*n)),
            TokenKind::String(s) => Some(LiteralValue::String(s.clone())),
            TokenKind::BigInt(digits) => Some(LiteralValue::BigInt(digits.clone())),
            TokenKind::True => Some(LiteralValue::Boolean(true)),
            TokenKind::False => Some(LiteralValue::Boolean(false)),
            TokenKind::Null => Some(LiteralValue::Null),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(Expression::Literal(Literal {
                value,
                span: self.span_from(start),
            }));
        }

        match &self.current.kind {
            TokenKind::Async => self.parse_async_expression(),
            _ if self.check_identifier() => {
                let id = self.parse_identifier()?;

                // x => ...
                if self.check(&TokenKind::Arrow) && !self.lexer.had_newline_before() {
                    let head = ArrowHead {
                        params_span: id.span,
                        params: vec![simple_param(id)],
                        return_type: None,
                        type_parameters: None,
                    };
                    return self.parse_arrow_body(head, start, false);
                }

                Ok(Expression::Identifier(id))
            }
            TokenKind::Yield | TokenKind::Let => {
                // Reserved only in some contexts; outside them these are plain names
                let name = self.intern(super::keyword_text(&self.current.kind).unwrap_or_default());
                self.advance();
                Ok(Expression::Identifier(Identifier { name, span: start }))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expression::This(self.span_from(start)))
            }
            TokenKind::Super => {
                self.advance();
                Ok(Expression::Super(self.span_from(start)))
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LParen => self.parse_parenthesized_or_arrow(),

            // Dynamic import() and import.meta parse as the identifier `import`
            TokenKind::Import => {
                let name = self.intern("import");
                self.advance();
                Ok(Expression::Identifier(Identifier { name, span: start }))
            }

            TokenKind::Function => self.parse_function_expression(start, false),

            // Decorated class expression: @decorator class {}
            TokenKind::At => {
                let decorators = self.parse_decorators()?;
                if !self.check(&TokenKind::Class) {
                    return Err(self.error(
                        "Decorators can only be applied to class expressions in expression position",
                    ));
                }
                let mut class_expr = self.parse_class_expression()?;
                if let Expression::Class(class) = &mut class_expr {
                    class.decorators = decorators;
                }
                Ok(class_expr)
            }

            TokenKind::Class => self.parse_class_expression(),

            TokenKind::TemplateNoSub(_) | TokenKind::TemplateHead(_) => {
                Ok(Expression::Template(self.parse_template_literal()?))
            }

            // A `/` where an expression is expected starts a regexp
            TokenKind::Slash | TokenKind::SlashEq => {
                let token = self.lexer.rescan_as_regexp(self.current.span);
                let TokenKind::RegExp(pattern, flags) = token.kind.clone() else {
                    return Err(self.unexpected_token("regexp literal"));
                };
                self.previous = token;
                self.current = self.lexer.next_token();
                Ok(Expression::Literal(Literal {
                    value: LiteralValue::RegExp { pattern, flags },
                    span: self.span_from(start),
                }))
            }

            _ => Err(self.unexpected_token("expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let saved = std::mem::replace(&mut self.no_in, false);
        let mut elements = vec![];

        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            if self.match_token(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }

            if self.check(&TokenKind::DotDotDot) {
                elements.push(Some(ArrayElement::Spread(self.parse_spread_element()?)));
            } else {
                let expr = self.parse_assignment_expression()?;
                elements.push(Some(ArrayElement::Expression(expr)));
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.no_in = saved;

        self.require_token(&TokenKind::RBracket)?;

        let span = self.span_from(start);
        Ok(Expression::Array(ArrayExpression { elements, span }))
    }

    fn parse_spread_element(&mut self) -> Result<SpreadElement, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::DotDotDot)?;
        let argument = Rc::new(self.parse_assignment_expression()?);
        let span = self.span_from(start);
        Ok(SpreadElement { argument, span })
    }

    pub(super) fn parse_object_literal(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let saved = std::mem::replace(&mut self.no_in, false);
        let mut properties = vec![];

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                properties.push(ObjectProperty::Spread(self.parse_spread_element()?));
            } else {
                properties.push(ObjectProperty::Property(self.parse_property()?));
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.no_in = saved;

        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(Expression::Object(ObjectExpression { properties, span }))
    }

    fn parse_property(&mut self) -> Result<Property, AnnotateError> {
        let start = self.current.span;

        let is_async = self.check(&TokenKind::Async) && self.next_starts_method_name();
        if is_async {
            self.advance();
        }

        let generator = self.match_token(&TokenKind::Star);

        let kind = if !is_async && !generator && self.is_accessor_keyword("get") {
            self.advance();
            PropertyKind::Get
        } else if !is_async && !generator && self.is_accessor_keyword("set") {
            self.advance();
            PropertyKind::Set
        } else {
            PropertyKind::Init
        };

        let computed = self.check(&TokenKind::LBracket);
        let key = self.parse_property_name()?;

        // Method shorthand
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let method_start = self.current.span;
            let type_parameters = self.parse_optional_type_parameters()?;
            let (params, params_span) = self.parse_function_params()?;
            let return_type = self.parse_optional_return_type()?;
            let body = Rc::new(self.parse_function_body()?);

            let value = Expression::Function(FunctionExpression {
                id: None,
                params: params.into(),
                params_span,
                return_type,
                type_parameters,
                body,
                generator,
                async_: is_async,
                span: self.span_from(method_start),
            });

            let span = self.span_from(start);
            return Ok(Property {
                key,
                value,
                kind,
                computed,
                shorthand: false,
                method: kind == PropertyKind::Init,
                span,
            });
        }

        let (value, shorthand) = if self.match_token(&TokenKind::Colon) {
            (self.parse_assignment_expression()?, false)
        } else {
            let ObjectPropertyKey::Identifier(id) = &key else {
                return Err(self.error("Shorthand property must be an identifier"));
            };
            // `{ a = 1 }` is only valid as a destructuring target
            if self.match_token(&TokenKind::Eq) {
                let right = Rc::new(self.parse_assignment_expression()?);
                let span = self.span_from(start);
                (
                    Expression::Assignment(AssignmentExpression {
                        operator: AssignmentOp::Assign,
                        left: AssignmentTarget::Identifier(id.clone()),
                        right,
                        span,
                    }),
                    true,
                )
            } else {
                (Expression::Identifier(id.clone()), true)
            }
        };

        let span = self.span_from(start);
        Ok(Property {
            key,
            value,
            kind: PropertyKind::Init,
            computed,
            shorthand,
            method: false,
            span,
        })
    }

    /// `async` followed on the same line by a method name.
    fn next_starts_method_name(&mut self) -> bool {
        let next = self.peek_token();
        (token_starts_property_name(&next.kind) || next.kind == TokenKind::Star)
            && self.peek_on_same_line()
    }

    /// `get`/`set` used as an accessor prefix rather than as a property name.
    fn is_accessor_keyword(&mut self, keyword: &str) -> bool {
        self.check_keyword(keyword) && token_starts_property_name(&self.peek_token().kind)
    }

    fn parse_parenthesized_or_arrow(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;

        if let Some(head) = self.try_parse(|p| p.try_parse_arrow_head(false)) {
            return self.parse_arrow_body(head, start, false);
        }

        self.require_token(&TokenKind::LParen)?;
        let inner = self.parse_expression_allow_in()?;
        self.require_token(&TokenKind::RParen)?;

        let span = self.span_from(start);
        Ok(Expression::Parenthesized(Rc::new(inner), span))
    }

    /// Parse `[<T>](params)[: R]` and succeed only if `=>` follows.
    fn try_parse_arrow_head(
        &mut self,
        with_type_parameters: bool,
    ) -> Result<Option<ArrowHead>, AnnotateError> {
        let type_parameters = if with_type_parameters {
            self.parse_optional_type_parameters()?
        } else {
            None
        };
        let saved = std::mem::replace(&mut self.no_in, false);
        let params = self.parse_function_params();
        self.no_in = saved;
        let (params, params_span) = params?;
        let return_type = self.parse_optional_return_type()?;

        if !self.check(&TokenKind::Arrow) || self.lexer.had_newline_before() {
            return Ok(None);
        }

        Ok(Some(ArrowHead {
            params,
            params_span,
            return_type,
            type_parameters,
        }))
    }

    fn parse_arrow_body(
        &mut self,
        head: ArrowHead,
        start: Span,
        async_: bool,
    ) -> Result<Expression, AnnotateError> {
        self.require_token(&TokenKind::Arrow)?;

        let body = if self.check(&TokenKind::LBrace) {
            ArrowFunctionBody::Block(Rc::new(self.parse_function_body()?))
        } else {
            ArrowFunctionBody::Expression(Rc::new(self.parse_assignment_expression()?))
        };

        let span = self.span_from(start);
        Ok(Expression::ArrowFunction(ArrowFunctionExpression {
            params: head.params.into(),
            params_span: head.params_span,
            return_type: head.return_type,
            type_parameters: head.type_parameters,
            body: Rc::new(body),
            async_,
            span,
        }))
    }

    /// `async function`, `async (x) =>`, `async x =>`, or a plain use of the name `async`.
    fn parse_async_expression(&mut self) -> Result<Expression, AnnotateError> {
        let start = self.current.span;
        let same_line = self.peek_on_same_line();
        let next = self.peek_token();

        if same_line && next.kind == TokenKind::Function {
            self.advance();
            return self.parse_function_expression(start, true);
        }

        if same_line && matches!(next.kind, TokenKind::LParen | TokenKind::Lt) {
            let head = self.try_parse(|p| {
                p.advance();
                p.try_parse_arrow_head(true)
            });
            if let Some(head) = head {
                return self.parse_arrow_body(head, start, true);
            }
        }

        let id = self.parse_identifier()?;

        if same_line && self.check_identifier() && self.peek_is(&TokenKind::Arrow) {
            let param = self.parse_identifier()?;
            let head = ArrowHead {
                params_span: param.span,
                params: vec![simple_param(param)],
                return_type: None,
                type_parameters: None,
            };
            return self.parse_arrow_body(head, start, true);
        }

        // `async => ...`: a parameter named async
        if self.check(&TokenKind::Arrow) && !self.lexer.had_newline_before() {
            let head = ArrowHead {
                params_span: id.span,
                params: vec![simple_param(id)],
                return_type: None,
                type_parameters: None,
            };
            return self.parse_arrow_body(head, start, false);
        }

        Ok(Expression::Identifier(id))
    }

    fn parse_function_expression(
        &mut self,
        start: Span,
        async_: bool,
    ) -> Result<Expression, AnnotateError> {
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
        let body = Rc::new(self.parse_function_body()?);

        let span = self.span_from(start);
        Ok(Expression::Function(FunctionExpression {
            id,
            params: params.into(),
            params_span,
            return_type,
            type_parameters,
            body,
            generator,
            async_,
            span,
        }))
    }

    fn parse_class_expression(&mut self) -> Result<Expression, AnnotateError> {
        let decl = self.parse_class_declaration(false)?;
        Ok(Expression::Class(ClassExpression {
            id: decl.id,
            type_parameters: decl.type_parameters,
            super_class: decl.super_class,
            super_type_arguments: decl.super_type_arguments,
            implements: decl.implements,
            body: decl.body,
            decorators: decl.decorators,
            span: decl.span,
        }))
    }

    fn parse_tagged_template(
        &mut self,
        tag: Expression,
        start: Span,
    ) -> Result<Expression, AnnotateError> {
        let quasi = self.parse_template_literal()?;
        let span = self.span_from(start);
        Ok(Expression::TaggedTemplate(TaggedTemplateExpression {
            tag: Rc::new(tag),
            quasi,
            span,
        }))
    }

    /// Parse a template starting at the current `TemplateNoSub` or `TemplateHead` token.
    fn parse_template_literal(&mut self) -> Result<TemplateLiteral, AnnotateError> {
        let start = self.current.span;
        let head = match &self.current.kind {
            TokenKind::TemplateNoSub(s) => {
                let value = s.clone();
                self.advance();
                return Ok(TemplateLiteral {
                    quasis: vec![TemplateElement {
                        value,
                        tail: true,
                        span: start,
                    }],
                    expressions: vec![],
                    span: start,
                });
            }
            TokenKind::TemplateHead(s) => s.clone(),
            _ => return Err(self.unexpected_token("template literal")),
        };
        self.advance();

        let mut quasis = vec![TemplateElement {
            value: head,
            tail: false,
            span: start,
        }];
        let mut expressions = vec![];

        loop {
            expressions.push(self.parse_expression_allow_in()?);
            if !self.check(&TokenKind::RBrace) {
                return Err(self.unexpected_token("'}' in template literal"));
            }

            // Rescan from the `}` as template text
            let part = self.lexer.rescan_template_continuation(self.current.span);
            let (value, tail) = match &part.kind {
                TokenKind::TemplateTail(s) => (s.clone(), true),
                TokenKind::TemplateMiddle(s) => (s.clone(), false),
                _ => return Err(self.unexpected_token("template continuation")),
            };
            quasis.push(TemplateElement {
                value,
                tail,
                span: part.span,
            });
            self.previous = part;
            self.current = self.lexer.next_token();
            if tail {
                break;
            }
        }

        let span = self.span_from(start);
        Ok(TemplateLiteral {
            quasis,
            expressions,
            span,
        })
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Argument>, AnnotateError> {
        self.require_token(&TokenKind::LParen)?;

        let saved = std::mem::replace(&mut self.no_in, false);
        let mut arguments = vec![];

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            if self.check(&TokenKind::DotDotDot) {
                arguments.push(Argument::Spread(self.parse_spread_element()?));
            } else {
                arguments.push(Argument::Expression(self.parse_assignment_expression()?));
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.no_in = saved;

        self.require_token(&TokenKind::RParen)?;
        Ok(arguments)
    }

    // ============ OPERATOR TABLES ============

    fn current_binary_op(&self) -> Option<(BinaryOperator, u8)> {
        use BinaryOperator::{Binary, Logical};
        let op = match &self.current.kind {
            TokenKind::PipePipe => (Logical(LogicalOp::Or), 4),
            TokenKind::QuestionQuestion => (Logical(LogicalOp::NullishCoalescing), 4),
            TokenKind::AmpAmp => (Logical(LogicalOp::And), 5),
            TokenKind::Pipe => (Binary(BinaryOp::BitOr), 6),
            TokenKind::Caret => (Binary(BinaryOp::BitXor), 7),
            TokenKind::Amp => (Binary(BinaryOp::BitAnd), 8),
            TokenKind::EqEq => (Binary(BinaryOp::Eq), 9),
            TokenKind::BangEq => (Binary(BinaryOp::NotEq), 9),
            TokenKind::EqEqEq => (Binary(BinaryOp::StrictEq), 9),
            TokenKind::BangEqEq => (Binary(BinaryOp::StrictNotEq), 9),
            TokenKind::Lt => (Binary(BinaryOp::Lt), 10),
            TokenKind::LtEq => (Binary(BinaryOp::LtEq), 10),
            TokenKind::Gt => (Binary(BinaryOp::Gt), 10),
            TokenKind::GtEq => (Binary(BinaryOp::GtEq), 10),
            TokenKind::In => (Binary(BinaryOp::In), 10),
            TokenKind::Instanceof => (Binary(BinaryOp::Instanceof), 10),
            TokenKind::LtLt => (Binary(BinaryOp::LShift), 11),
            TokenKind::GtGt => (Binary(BinaryOp::RShift), 11),
            TokenKind::GtGtGt => (Binary(BinaryOp::URShift), 11),
            TokenKind::Plus => (Binary(BinaryOp::Add), 12),
            TokenKind::Minus => (Binary(BinaryOp::Sub), 12),
            TokenKind::Star => (Binary(BinaryOp::Mul), 13),
            TokenKind::Slash => (Binary(BinaryOp::Div), 13),
            TokenKind::Percent => (Binary(BinaryOp::Mod), 13),
            TokenKind::StarStar => (Binary(BinaryOp::Exp), 14),
            _ => return None,
        };
        Some(op)
    }

    fn current_unary_op(&self) -> Option<UnaryOp> {
        match &self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        }
    }

    fn current_update_op(&self) -> Option<UpdateOp> {
        match &self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        }
    }

    fn current_assignment_op(&self) -> Option<AssignmentOp> {
        match &self.current.kind {
            TokenKind::Eq => Some(AssignmentOp::Assign),
            TokenKind::PlusEq => Some(AssignmentOp::AddAssign),
            TokenKind::MinusEq => Some(AssignmentOp::SubAssign),
            TokenKind::StarEq => Some(AssignmentOp::MulAssign),
            TokenKind::SlashEq => Some(AssignmentOp::DivAssign),
            TokenKind::PercentEq => Some(AssignmentOp::ModAssign),
            TokenKind::StarStarEq => Some(AssignmentOp::ExpAssign),
            TokenKind::AmpEq => Some(AssignmentOp::BitAndAssign),
            TokenKind::PipeEq => Some(AssignmentOp::BitOrAssign),
            TokenKind::CaretEq => Some(AssignmentOp::BitXorAssign),
            TokenKind::LtLtEq => Some(AssignmentOp::LShiftAssign),
            TokenKind::GtGtEq => Some(AssignmentOp::RShiftAssign),
            TokenKind::GtGtGtEq => Some(AssignmentOp::URShiftAssign),
            TokenKind::AmpAmpEq => Some(AssignmentOp::AndAssign),
            TokenKind::PipePipeEq => Some(AssignmentOp::OrAssign),
            TokenKind::QuestionQuestionEq => Some(AssignmentOp::NullishAssign),
            _ => None,
        }
    }

    // ============ COVER GRAMMAR ============

    /// Reinterpret an object or array literal as a destructuring pattern.
    pub(super) fn expression_to_pattern(
        &self,
        expr: &Expression,
    ) -> Result<Pattern, AnnotateError> {
        match expr {
            Expression::Identifier(id) => Ok(Pattern::Identifier(id.clone())),
            Expression::Parenthesized(inner, _) => self.expression_to_pattern(inner),
            Expression::Object(obj) => {
                let properties = obj
                    .properties
                    .iter()
                    .map(|prop| match prop {
                        ObjectProperty::Property(p) => {
                            let value = self.expression_to_pattern(&p.value)?;
                            Ok(ObjectPatternProperty::KeyValue {
                                key: p.key.clone(),
                                value,
                                shorthand: p.shorthand,
                                span: p.span,
                            })
                        }
                        ObjectProperty::Spread(s) => {
                            let arg = self.expression_to_pattern(&s.argument)?;
                            Ok(ObjectPatternProperty::Rest(RestElement {
                                argument: Box::new(arg),
                                type_annotation: None,
                                span: s.span,
                            }))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Pattern::Object(ObjectPattern {
                    properties,
                    type_annotation: None,
                    span: obj.span,
                }))
            }
            Expression::Array(arr) => {
                let elements = arr
                    .elements
                    .iter()
                    .map(|elem| {
                        elem.as_ref()
                            .map(|e| match e {
                                ArrayElement::Expression(expr) => self.expression_to_pattern(expr),
                                ArrayElement::Spread(s) => {
                                    let arg = self.expression_to_pattern(&s.argument)?;
                                    Ok(Pattern::Rest(RestElement {
                                        argument: Box::new(arg),
                                        type_annotation: None,
                                        span: s.span,
                                    }))
                                }
                            })
                            .transpose()
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Pattern::Array(ArrayPattern {
                    elements,
                    type_annotation: None,
                    span: arr.span,
                }))
            }
            Expression::Assignment(assign) if assign.operator == AssignmentOp::Assign => {
                let left = match &assign.left {
                    AssignmentTarget::Identifier(id) => Pattern::Identifier(id.clone()),
                    AssignmentTarget::Pattern(p) => p.clone(),
                    AssignmentTarget::Member(m) => return Err(invalid_target(m.span)),
                };

                Ok(Pattern::Assignment(AssignmentPattern {
                    left: Box::new(left),
                    right: Rc::clone(&assign.right),
                    span: assign.span,
                }))
            }
            _ => Err(invalid_target(expr.span())),
        }
    }

    fn expression_to_assignment_target(
        &self,
        expr: &Expression,
    ) -> Result<AssignmentTarget, AnnotateError> {
        match expr {
            Expression::Identifier(id) => Ok(AssignmentTarget::Identifier(id.clone())),
            Expression::Member(m) => Ok(AssignmentTarget::Member(m.clone())),
            Expression::Object(_) | Expression::Array(_) => {
                Ok(AssignmentTarget::Pattern(self.expression_to_pattern(expr)?))
            }
            // `(x as any) = v`, `x! = v`, `(x) = v`
            Expression::Parenthesized(inner, _) => self.expression_to_assignment_target(inner),
            Expression::TypeAssertion(t) | Expression::Satisfies(t) => {
                self.expression_to_assignment_target(&t.expression)
            }
            Expression::NonNull(n) => self.expression_to_assignment_target(&n.expression),
            _ => Err(AnnotateError::syntax_error(
                "Invalid assignment target",
                expr.span().line,
                expr.span().column,
            )),
        }
    }
}

/// Binary and logical operators share one precedence table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOperator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn simple_param(id: Identifier) -> FunctionParam {
    let span = id.span;
    FunctionParam {
        pattern: Pattern::Identifier(id),
        type_annotation: None,
        optional: false,
        decorators: vec![],
        accessibility: None,
        readonly: false,
        span,
    }
}

fn invalid_target(span: Span) -> AnnotateError {
    AnnotateError::syntax_error("Invalid destructuring target", span.line, span.column)
}
