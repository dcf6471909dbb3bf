//! Expression types and the value side of symbols.

use std::rc::Rc;

use tracing::trace;

use super::binder::{Decl, FunctionRef, PathStep, RootExpr, ScopeKind, SymbolId, ThisBinding};
use super::call::param_type_at;
use super::types::{Intrinsic, ObjectShape, PropertyInfo, Signature, TupleElement, TypeData};
use super::{NodeKey, ProgramContext, ScopeId, Slot, TypeId};
use crate::ast::*;

/// Iterable interfaces whose first type argument is what `for..of` yields.
const ITERATED_BY_FIRST_ARGUMENT: [&str; 7] = [
    "Iterable",
    "IterableIterator",
    "Iterator",
    "Generator",
    "ReadonlyArray",
    "Set",
    "ReadonlySet",
];

impl<'a> ProgramContext<'a> {
    /// Type of `expr` evaluated in `scope`. `contextual` is the type the
    /// surrounding code expects, used for untyped callback parameters and
    /// to keep literal types where they are wanted.
    pub(crate) fn check_expression(
        &mut self,
        expr: &'a Expression,
        scope: ScopeId,
        contextual: Option<TypeId>,
    ) -> TypeId {
        if !self.enter() {
            return TypeId::ANY;
        }
        let ty = self.check_expression_inner(expr, scope, contextual);
        self.leave();
        ty
    }

    fn check_expression_inner(
        &mut self,
        expr: &'a Expression,
        scope: ScopeId,
        contextual: Option<TypeId>,
    ) -> TypeId {
        match expr {
            Expression::Literal(literal) => {
                let ty = self.literal_type(&literal.value);
                self.types.fresh_literal(ty)
            }
            Expression::Array(array) => self.array_literal_type(array, scope, contextual),
            Expression::Object(object) => self.object_literal_type(object, scope, contextual),
            Expression::Function(function) => {
                self.function_expression_type(FunctionRef::Expression(function), scope, contextual)
            }
            Expression::ArrowFunction(arrow) => {
                self.function_expression_type(FunctionRef::Arrow(arrow), scope, contextual)
            }
            Expression::Class(class) => {
                let key = NodeKey::new(self.file_of(scope), class.span.start);
                match self.binder.class_symbol(key) {
                    Some(symbol) => self.types.typeof_symbol(symbol),
                    None => TypeId::ANY,
                }
            }
            Expression::Template(template) => {
                for e in &template.expressions {
                    self.check_expression(e, scope, None);
                }
                TypeId::STRING
            }
            Expression::TaggedTemplate(tagged) => {
                let tag = self.check_expression(&tagged.tag, scope, None);
                for e in &tagged.quasi.expressions {
                    self.check_expression(e, scope, None);
                }
                self.signatures_of_type(tag, false)
                    .first()
                    .map(|s| s.return_type)
                    .unwrap_or(TypeId::ANY)
            }
            Expression::Identifier(id) => self.identifier_type(id, scope),
            Expression::This(_) => self.this_type(scope),
            Expression::Super(_) => self.super_type(scope),
            Expression::Unary(unary) => self.unary_type(unary, scope),
            Expression::Binary(binary) => self.binary_type(binary, scope),
            Expression::Logical(logical) => self.logical_type(logical, scope, contextual),
            Expression::Conditional(conditional) => {
                self.check_expression(&conditional.test, scope, None);
                let consequent = self.check_expression(&conditional.consequent, scope, contextual);
                let alternate = self.check_expression(&conditional.alternate, scope, contextual);
                self.subtype_reduced_union(vec![consequent, alternate])
            }
            Expression::Assignment(assign) => self.assignment_type(assign, scope),
            Expression::Update(update) => {
                let operand = self.check_expression(&update.argument, scope, None);
                if self.is_bigint_like(operand) {
                    TypeId::BIGINT
                } else {
                    TypeId::NUMBER
                }
            }
            Expression::Sequence(sequence) => {
                let mut last = TypeId::UNDEFINED;
                for (index, e) in sequence.expressions.iter().enumerate() {
                    let is_last = index + 1 == sequence.expressions.len();
                    last = self.check_expression(e, scope, if is_last { contextual } else { None });
                }
                last
            }
            Expression::Member(member) => self.member_type(member, scope),
            Expression::Call(call) => self.call_type(call, scope),
            Expression::New(new) => {
                let callee = self.check_expression(&new.callee, scope, None);
                self.resolve_call(callee, &new.arguments, new.type_arguments.as_ref(), scope, true)
            }
            Expression::TypeAssertion(assertion) => {
                if is_const_assertion(&assertion.type_annotation) {
                    return self.const_type(&assertion.expression, scope);
                }
                let asserted = self.resolve_annotation(&assertion.type_annotation, scope);
                self.check_expression(&assertion.expression, scope, Some(asserted));
                asserted
            }
            Expression::Satisfies(assertion) => {
                let expected = self.resolve_annotation(&assertion.type_annotation, scope);
                self.check_expression(&assertion.expression, scope, Some(expected))
            }
            Expression::NonNull(non_null) => {
                let ty = self.check_expression(&non_null.expression, scope, contextual);
                self.non_nullable(ty)
            }
            Expression::Spread(spread) => self.check_expression(&spread.argument, scope, None),
            Expression::Yield(yield_expr) => {
                if let Some(argument) = &yield_expr.argument {
                    self.check_expression(argument, scope, None);
                }
                TypeId::ANY
            }
            Expression::Await(await_expr) => {
                let operand = self.check_expression(&await_expr.argument, scope, None);
                self.awaited_type(operand)
            }
            Expression::Parenthesized(inner, _) => self.check_expression(inner, scope, contextual),
        }
    }

    fn function_expression_type(
        &mut self,
        function: FunctionRef<'a>,
        scope: ScopeId,
        contextual: Option<TypeId>,
    ) -> TypeId {
        let key = NodeKey::new(self.file_of(scope), function.span().start);
        if let Some(contextual) = contextual
            && !self.contextual.contains_key(&key)
            && function.params().iter().any(|p| p.declared_type().is_none())
        {
            let signatures = self.signatures_of_type(contextual, false);
            if let Some(signature) = signatures.first() {
                self.contextual.insert(key, Rc::clone(signature));
            }
        }
        self.function_type(key).unwrap_or(TypeId::ANY)
    }

    fn identifier_type(&mut self, id: &Identifier, scope: ScopeId) -> TypeId {
        match self.binder.resolve_value(scope, &id.name) {
            Some(symbol) => self.symbol_value_type(symbol),
            None => match &*id.name {
                "undefined" => TypeId::UNDEFINED,
                "arguments" => self.global_reference("IArguments", vec![]),
                "NaN" | "Infinity" => TypeId::NUMBER,
                _ => {
                    trace!(name = %id.name, "unresolved identifier");
                    TypeId::ANY
                }
            },
        }
    }

    /// Type of `this` at a position in `scope`.
    pub(crate) fn this_type(&mut self, scope: ScopeId) -> TypeId {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(s) = self.binder.scope(id) else { break };
            let parent = s.parent;
            match s.kind {
                ScopeKind::Function(key) => {
                    match self.binder.function(key).map(|info| info.this) {
                        Some(ThisBinding::Class { class, static_ }) => {
                            return if static_ {
                                self.types.typeof_symbol(class)
                            } else {
                                self.declared_instance_type(class)
                            };
                        }
                        Some(ThisBinding::Lexical) => {}
                        Some(ThisBinding::Dynamic) | None => return TypeId::ANY,
                    }
                }
                ScopeKind::Class(class) => return self.declared_instance_type(class),
                _ => {}
            }
            current = parent;
        }
        TypeId::ANY
    }

    /// `super` inside a class body: the base class instance.
    fn super_type(&mut self, scope: ScopeId) -> TypeId {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(s) = self.binder.scope(id) else { break };
            if let ScopeKind::Class(symbol) = s.kind {
                let Some(class) = self.binder.class(symbol).map(|info| info.class) else {
                    break;
                };
                return self.base_instance_type(symbol, class).unwrap_or(TypeId::ANY);
            }
            current = s.parent;
        }
        TypeId::ANY
    }

    fn unary_type(&mut self, unary: &'a UnaryExpression, scope: ScopeId) -> TypeId {
        let operand = self.check_expression(&unary.argument, scope, None);
        match unary.operator {
            UnaryOp::Not | UnaryOp::Delete => TypeId::BOOLEAN,
            UnaryOp::Void => TypeId::UNDEFINED,
            UnaryOp::Typeof => {
                let names = [
                    "string",
                    "number",
                    "bigint",
                    "boolean",
                    "symbol",
                    "undefined",
                    "object",
                    "function",
                ];
                let members = names
                    .iter()
                    .map(|name| self.types.string_literal(Rc::from(*name)))
                    .collect();
                self.union(members)
            }
            UnaryOp::Minus => {
                let negated = match self.types.get(operand).clone() {
                    TypeData::NumberLiteral(n) => self.types.number_literal(-n.value()),
                    TypeData::BigIntLiteral(digits) => match digits.strip_prefix('-') {
                        Some(positive) => self.types.bigint_literal(Rc::from(positive)),
                        None => self.types.bigint_literal(Rc::from(format!("-{digits}").as_str())),
                    },
                    _ if self.is_bigint_like(operand) => return TypeId::BIGINT,
                    _ => return TypeId::NUMBER,
                };
                if self.types.is_fresh(operand) {
                    self.types.fresh_literal(negated)
                } else {
                    negated
                }
            }
            UnaryOp::Plus => match self.types.get(operand) {
                TypeData::NumberLiteral(_) => operand,
                _ => TypeId::NUMBER,
            },
            UnaryOp::BitNot => {
                if self.is_bigint_like(operand) {
                    TypeId::BIGINT
                } else {
                    TypeId::NUMBER
                }
            }
        }
    }

    fn binary_type(&mut self, binary: &'a BinaryExpression, scope: ScopeId) -> TypeId {
        let left = self.check_expression(&binary.left, scope, None);
        let right = self.check_expression(&binary.right, scope, None);
        match binary.operator {
            BinaryOp::Add => self.addition_type(left, right),
            BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Exp
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::LShift
            | BinaryOp::RShift => {
                if self.is_bigint_like(left) && self.is_bigint_like(right) {
                    TypeId::BIGINT
                } else {
                    TypeId::NUMBER
                }
            }
            BinaryOp::URShift => TypeId::NUMBER,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::StrictEq
            | BinaryOp::StrictNotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::Instanceof => TypeId::BOOLEAN,
        }
    }

    fn addition_type(&mut self, left: TypeId, right: TypeId) -> TypeId {
        if self.is_string_like(left) || self.is_string_like(right) {
            return TypeId::STRING;
        }
        if left == TypeId::ANY || right == TypeId::ANY {
            return TypeId::ANY;
        }
        let (left, right) = if self.strict() {
            (left, right)
        } else {
            (self.non_nullable(left), self.non_nullable(right))
        };
        if self.is_number_like(left) && self.is_number_like(right) {
            return TypeId::NUMBER;
        }
        if self.is_bigint_like(left) && self.is_bigint_like(right) {
            return TypeId::BIGINT;
        }
        TypeId::ANY
    }

    fn is_number_like(&self, ty: TypeId) -> bool {
        self.types.constituents(ty).iter().all(|&m| {
            m == TypeId::NUMBER
                || matches!(
                    self.types.get(m),
                    TypeData::NumberLiteral(_) | TypeData::Enum(_) | TypeData::EnumMember(..)
                )
        })
    }

    fn is_bigint_like(&self, ty: TypeId) -> bool {
        self.types
            .constituents(ty)
            .iter()
            .all(|&m| m == TypeId::BIGINT || matches!(self.types.get(m), TypeData::BigIntLiteral(_)))
    }

    fn logical_type(
        &mut self,
        logical: &'a LogicalExpression,
        scope: ScopeId,
        contextual: Option<TypeId>,
    ) -> TypeId {
        let left = self.check_expression(&logical.left, scope, contextual);
        let right = self.check_expression(&logical.right, scope, contextual);
        match logical.operator {
            LogicalOp::And if self.strict() => {
                let falsy = self.definitely_falsy(left);
                self.union(vec![falsy, right])
            }
            LogicalOp::And => right,
            LogicalOp::Or => {
                let truthy = self.remove_definitely_falsy(left);
                let truthy = self.non_nullable(truthy);
                self.subtype_reduced_union(vec![truthy, right])
            }
            LogicalOp::NullishCoalescing => {
                let present = self.non_nullable(left);
                self.subtype_reduced_union(vec![present, right])
            }
        }
    }

    /// The members of `ty` that can be falsy, as the falsy values they hold.
    fn definitely_falsy(&mut self, ty: TypeId) -> TypeId {
        let members = self
            .types
            .constituents(ty)
            .into_iter()
            .filter_map(|m| match self.types.get(m).clone() {
                TypeData::StringLiteral(s) if s.is_empty() => Some(m),
                TypeData::NumberLiteral(n) if n.value() == 0.0 || n.value().is_nan() => Some(m),
                TypeData::BigIntLiteral(d) if &*d == "0" => Some(m),
                TypeData::Intrinsic(Intrinsic::False) => Some(m),
                _ if m == TypeId::STRING => Some(self.types.string_literal(Rc::from(""))),
                _ if m == TypeId::NUMBER => Some(self.types.number_literal(0.0)),
                _ if m == TypeId::BIGINT => Some(self.types.bigint_literal(Rc::from("0"))),
                _ if m == TypeId::BOOLEAN => Some(TypeId::FALSE),
                _ if m.is_nullable() || m == TypeId::VOID => Some(m),
                _ if m == TypeId::ANY || m == TypeId::UNKNOWN => Some(m),
                _ => None,
            })
            .collect();
        self.union(members)
    }

    fn remove_definitely_falsy(&mut self, ty: TypeId) -> TypeId {
        let members = self
            .types
            .constituents(ty)
            .into_iter()
            .filter(|&m| match self.types.get(m) {
                TypeData::StringLiteral(s) => !s.is_empty(),
                TypeData::NumberLiteral(n) => n.value() != 0.0 && !n.value().is_nan(),
                TypeData::BigIntLiteral(d) => &**d != "0",
                TypeData::Intrinsic(Intrinsic::False) => false,
                _ => !m.is_nullable() && m != TypeId::VOID,
            })
            .collect();
        self.union(members)
    }

    pub(crate) fn non_nullable(&mut self, ty: TypeId) -> TypeId {
        if !self.types.is_union(ty) {
            return ty;
        }
        let members = self
            .types
            .constituents(ty)
            .into_iter()
            .filter(|m| !m.is_nullable())
            .collect();
        self.union(members)
    }

    fn assignment_type(&mut self, assign: &'a AssignmentExpression, scope: ScopeId) -> TypeId {
        let target = match &assign.left {
            AssignmentTarget::Identifier(id) => Some(self.identifier_type(id, scope)),
            AssignmentTarget::Member(member) => Some(self.member_type(member, scope)),
            AssignmentTarget::Pattern(_) => None,
        };
        let right = self.check_expression(&assign.right, scope, target);
        let left = target.unwrap_or(TypeId::ANY);
        match assign.operator {
            AssignmentOp::Assign => right,
            AssignmentOp::AddAssign => self.addition_type(left, right),
            AssignmentOp::AndAssign => self.union(vec![left, right]),
            AssignmentOp::OrAssign | AssignmentOp::NullishAssign => {
                let present = self.non_nullable(left);
                self.union(vec![present, right])
            }
            _ => {
                if self.is_bigint_like(left) && self.is_bigint_like(right) {
                    TypeId::BIGINT
                } else {
                    TypeId::NUMBER
                }
            }
        }
    }

    fn member_type(&mut self, member: &'a MemberExpression, scope: ScopeId) -> TypeId {
        let object = self.check_expression(&member.object, scope, None);
        let object = if member.optional {
            self.non_nullable(object)
        } else {
            object
        };
        let ty = match &member.property {
            MemberProperty::Identifier(id) => self.property_type(object, &id.name),
            MemberProperty::PrivateIdentifier(id) => self.property_type(object, &id.name),
            MemberProperty::Expression(key) => {
                let key_type = self.check_expression(key, scope, None);
                self.element_access_type(object, key_type)
            }
        };
        let ty = ty.unwrap_or(TypeId::ANY);
        if member.optional && self.strict() {
            self.union(vec![ty, TypeId::UNDEFINED])
        } else {
            ty
        }
    }

    fn element_access_type(&mut self, object: TypeId, key: TypeId) -> Option<TypeId> {
        if object == TypeId::ANY {
            return Some(TypeId::ANY);
        }
        match self.types.get(key).clone() {
            TypeData::StringLiteral(name) => self.property_type(object, &name),
            TypeData::NumberLiteral(n) => {
                let name = super::format_number(n.value());
                if let TypeData::Tuple(elements, _) = self.types.get(object)
                    && let Some(element) = elements.iter().nth(n.value() as usize).filter(|e| !e.rest)
                {
                    return Some(element.ty);
                }
                self.property_type(object, &name)
                    .or_else(|| self.element_type(object))
            }
            TypeData::EnumMember(..) | TypeData::Enum(_) => self.element_type(object),
            _ if key == TypeId::NUMBER => self.element_type(object),
            _ => {
                let shape = self.apparent_shape(object)?;
                shape.string_index.as_ref().map(|index| index.ty)
            }
        }
    }

    fn call_type(&mut self, call: &'a CallExpression, scope: ScopeId) -> TypeId {
        if let Expression::Super(_) = call.callee.as_ref() {
            let base = self.super_constructor(scope);
            self.resolve_call(base, &call.arguments, None, scope, true);
            return TypeId::VOID;
        }
        let callee = self.check_expression(&call.callee, scope, None);
        let callee = if call.optional {
            self.non_nullable(callee)
        } else {
            callee
        };
        let result = self.resolve_call(
            callee,
            &call.arguments,
            call.type_arguments.as_ref(),
            scope,
            false,
        );
        let optional_chain = call.optional
            || matches!(call.callee.as_ref(), Expression::Member(m) if m.optional);
        if optional_chain && self.strict() {
            self.union(vec![result, TypeId::UNDEFINED])
        } else {
            result
        }
    }

    /// The constructor `super(...)` calls.
    fn super_constructor(&mut self, scope: ScopeId) -> TypeId {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(s) = self.binder.scope(id) else { break };
            if let ScopeKind::Class(symbol) = s.kind {
                let outer = s.parent;
                let Some(super_class) = self
                    .binder
                    .class(symbol)
                    .and_then(|info| info.class.super_class())
                else {
                    break;
                };
                let Some(outer) = outer else { break };
                return self.check_expression(super_class, outer, None);
            }
            current = s.parent;
        }
        TypeId::ANY
    }

    fn array_literal_type(
        &mut self,
        array: &'a ArrayExpression,
        scope: ScopeId,
        contextual: Option<TypeId>,
    ) -> TypeId {
        let tuple_context = contextual.and_then(|c| match self.types.get(c) {
            TypeData::Tuple(elements, _) => Some(Rc::clone(elements)),
            _ => None,
        });
        let element_context = match (contextual, &tuple_context) {
            (Some(c), None) => self.element_type(c),
            _ => None,
        };

        let mut elements = vec![];
        let mut has_spread = false;
        for (index, element) in array.elements.iter().enumerate() {
            match element {
                Some(ArrayElement::Expression(e)) => {
                    let expected = match &tuple_context {
                        Some(tuple) => tuple.get(index).map(|t| t.ty),
                        None => element_context,
                    };
                    elements.push(self.check_expression(e, scope, expected));
                }
                Some(ArrayElement::Spread(spread)) => {
                    has_spread = true;
                    let spread_type = self.check_expression(&spread.argument, scope, None);
                    elements.push(self.iterated_type(spread_type));
                }
                None => elements.push(TypeId::UNDEFINED),
            }
        }

        if let Some(tuple) = tuple_context
            && !has_spread
        {
            let elements = elements
                .into_iter()
                .zip(tuple.iter())
                .map(|(ty, expected)| TupleElement {
                    ty,
                    optional: false,
                    rest: false,
                    label: expected.label.clone(),
                })
                .collect();
            return self.types.tuple(elements, false);
        }

        if elements.is_empty() {
            let element = if self.strict() {
                TypeId::NEVER
            } else {
                TypeId::ANY
            };
            return self.types.array(element);
        }
        let keeps_literals = element_context.is_some_and(|c| {
            self.types
                .constituents(c)
                .iter()
                .any(|&m| self.types.is_literal(m))
        });
        let element = self.subtype_reduced_union(elements);
        let element = if keeps_literals {
            element
        } else {
            self.widen_for_declaration(element)
        };
        self.types.array(element)
    }

    fn object_literal_type(
        &mut self,
        object: &'a ObjectExpression,
        scope: ScopeId,
        contextual: Option<TypeId>,
    ) -> TypeId {
        let mut shape = ObjectShape::default();
        for property in &object.properties {
            match property {
                ObjectProperty::Property(prop) => {
                    let Some(name) = self.property_key_name(&prop.key, scope) else {
                        self.check_expression(&prop.value, scope, None);
                        continue;
                    };
                    let expected = contextual.and_then(|c| self.property_type(c, &name));
                    let value = self.check_expression(&prop.value, scope, expected);
                    let ty = match prop.kind {
                        PropertyKind::Init if prop.method => value,
                        PropertyKind::Init => {
                            let keeps_literal = expected.is_some_and(|e| {
                                self.types
                                    .constituents(e)
                                    .iter()
                                    .any(|&m| self.types.is_literal(m))
                            });
                            if keeps_literal {
                                value
                            } else {
                                self.widen_for_declaration(value)
                            }
                        }
                        PropertyKind::Get => self
                            .signatures_of_type(value, false)
                            .first()
                            .map(|s| s.return_type)
                            .unwrap_or(TypeId::ANY),
                        PropertyKind::Set => {
                            if shape.properties.contains_key(&name) {
                                continue;
                            }
                            self.signatures_of_type(value, false)
                                .first()
                                .and_then(|s| s.params.first().map(|p| p.ty))
                                .unwrap_or(TypeId::ANY)
                        }
                    };
                    shape.insert_property(PropertyInfo {
                        name,
                        ty,
                        optional: false,
                        readonly: false,
                        method: prop.method,
                    });
                }
                ObjectProperty::Spread(spread) => {
                    let spread_type = self.check_expression(&spread.argument, scope, None);
                    if spread_type == TypeId::ANY {
                        return TypeId::ANY;
                    }
                    if let Some(spread_shape) = self.apparent_shape(spread_type)
                        && !self.is_primitive(spread_type)
                    {
                        for prop in spread_shape.properties.values() {
                            if prop.method && self.is_class_instance(spread_type) {
                                continue;
                            }
                            shape.insert_property(PropertyInfo {
                                method: false,
                                ..prop.clone()
                            });
                        }
                    }
                }
            }
        }
        self.types.object(shape)
    }

    fn property_key_name(&mut self, key: &'a ObjectPropertyKey, scope: ScopeId) -> Option<crate::string_dict::Atom> {
        if let Some(name) = key.static_name() {
            return Some(name);
        }
        let ObjectPropertyKey::Computed(expr) = key else {
            return None;
        };
        let ty = self.check_expression(expr, scope, None);
        match self.types.get(ty) {
            TypeData::StringLiteral(name) => Some(Rc::clone(name)),
            TypeData::NumberLiteral(n) => Some(Rc::from(super::format_number(n.value()).as_str())),
            _ => None,
        }
    }

    fn is_primitive(&self, ty: TypeId) -> bool {
        matches!(
            self.types.get(ty),
            TypeData::Intrinsic(_)
                | TypeData::StringLiteral(_)
                | TypeData::NumberLiteral(_)
                | TypeData::BigIntLiteral(_)
        ) && ty != TypeId::OBJECT
    }

    fn is_class_instance(&self, ty: TypeId) -> bool {
        match self.types.get(ty) {
            TypeData::Reference(symbol, _) => self.binder.class(*symbol).is_some(),
            _ => false,
        }
    }

    /// `expr as const`: literals stay literal, arrays become readonly tuples
    /// and object properties become readonly.
    fn const_type(&mut self, expr: &'a Expression, scope: ScopeId) -> TypeId {
        match expr {
            Expression::Parenthesized(inner, _) => self.const_type(inner, scope),
            Expression::Array(array) => {
                let mut elements = vec![];
                for element in &array.elements {
                    let ty = match element {
                        Some(ArrayElement::Expression(e)) => self.const_type(e, scope),
                        Some(ArrayElement::Spread(spread)) => {
                            let spread_type = self.check_expression(&spread.argument, scope, None);
                            let element = self.iterated_type(spread_type);
                            elements.push(TupleElement {
                                ty: self.types.array(element),
                                optional: false,
                                rest: true,
                                label: None,
                            });
                            continue;
                        }
                        None => TypeId::UNDEFINED,
                    };
                    elements.push(TupleElement {
                        ty,
                        optional: false,
                        rest: false,
                        label: None,
                    });
                }
                self.types.tuple(elements, true)
            }
            Expression::Object(object) => {
                let mut shape = ObjectShape::default();
                for property in &object.properties {
                    match property {
                        ObjectProperty::Property(prop) => {
                            let Some(name) = self.property_key_name(&prop.key, scope) else {
                                continue;
                            };
                            let ty = if prop.method || prop.kind != PropertyKind::Init {
                                self.check_expression(&prop.value, scope, None)
                            } else {
                                self.const_type(&prop.value, scope)
                            };
                            shape.insert_property(PropertyInfo {
                                name,
                                ty,
                                optional: false,
                                readonly: !prop.method,
                                method: prop.method,
                            });
                        }
                        ObjectProperty::Spread(spread) => {
                            let spread_type = self.check_expression(&spread.argument, scope, None);
                            if let Some(spread_shape) = self.apparent_shape(spread_type) {
                                for prop in spread_shape.properties.values() {
                                    shape.insert_property(PropertyInfo {
                                        readonly: true,
                                        ..prop.clone()
                                    });
                                }
                            }
                        }
                    }
                }
                self.types.object(shape)
            }
            Expression::Template(template) if template.expressions.is_empty() => {
                let text: String = template.quasis.iter().map(|q| &*q.value).collect();
                self.types.string_literal(Rc::from(text.as_str()))
            }
            _ => {
                let ty = self.check_expression(expr, scope, None);
                self.types.regular_of(ty)
            }
        }
    }

    /// What iterating a value of type `ty` produces.
    pub(crate) fn iterated_type(&mut self, ty: TypeId) -> TypeId {
        if let TypeData::Reference(symbol, args) = self.types.get(ty).clone()
            && let Some(&first) = args.first()
        {
            let by_first = ITERATED_BY_FIRST_ARGUMENT
                .iter()
                .any(|name| self.binder.global_type(name) == Some(symbol));
            if by_first {
                return first;
            }
            if self.binder.global_type("Map") == Some(symbol)
                && let Some(&second) = args.get(1)
            {
                let elements = vec![
                    TupleElement {
                        ty: first,
                        optional: false,
                        rest: false,
                        label: None,
                    },
                    TupleElement {
                        ty: second,
                        optional: false,
                        rest: false,
                        label: None,
                    },
                ];
                return self.types.tuple(elements, false);
            }
        }
        self.element_type(ty).unwrap_or(TypeId::ANY)
    }

    // ----- symbols -----

    /// Type of the value a symbol names.
    pub(crate) fn symbol_value_type(&mut self, symbol: SymbolId) -> TypeId {
        match self.symbol_types.get(&symbol) {
            Some(Slot::Done(ty)) => return *ty,
            Some(Slot::Pending) => {
                trace!(name = %self.binder.symbol_name(symbol), "circular value reference");
                return TypeId::ANY;
            }
            None => {}
        }
        self.symbol_types.insert(symbol, Slot::Pending);
        let (ty, cacheable) = self.compute_symbol_value_type(symbol);
        if cacheable {
            self.symbol_types.insert(symbol, Slot::Done(ty));
        } else {
            self.symbol_types.remove(&symbol);
        }
        ty
    }

    fn compute_symbol_value_type(&mut self, symbol: SymbolId) -> (TypeId, bool) {
        let decls = self.decls_of(symbol);
        let functions: Vec<(FunctionRef<'a>, NodeKey)> = decls
            .iter()
            .filter_map(|d| match d {
                Decl::Function { function, key } => Some((*function, *key)),
                _ => None,
            })
            .collect();
        if !functions.is_empty() {
            return self.overloaded_function_type(&functions);
        }

        for decl in decls {
            let ty = match decl {
                Decl::Variable {
                    declarator,
                    kind,
                    path,
                    scope,
                } => self.variable_type(declarator, kind, &path, scope),
                Decl::Parameter {
                    function,
                    index,
                    path,
                    scope,
                } => self.parameter_type(function, index, &path, scope),
                Decl::CatchParameter => {
                    if self.strict() {
                        TypeId::UNKNOWN
                    } else {
                        TypeId::ANY
                    }
                }
                Decl::ForBinding {
                    right,
                    of,
                    path,
                    scope,
                } => {
                    let iterated = if of {
                        let collection = self.check_expression(right, scope, None);
                        self.iterated_type(collection)
                    } else {
                        TypeId::STRING
                    };
                    self.follow_path(iterated, &path, scope)
                }
                Decl::Class { .. } | Decl::Enum { .. } | Decl::Namespace { .. } => {
                    self.types.typeof_symbol(symbol)
                }
                Decl::Import => TypeId::ANY,
                Decl::Function { .. }
                | Decl::Interface { .. }
                | Decl::TypeAlias { .. }
                | Decl::TypeParameter { .. } => continue,
            };
            return (ty, true);
        }
        (TypeId::ANY, true)
    }

    /// A function value: overload signatures when present, otherwise the
    /// implementation's signature.
    fn overloaded_function_type(&mut self, functions: &[(FunctionRef<'a>, NodeKey)]) -> (TypeId, bool) {
        let overloads: Vec<NodeKey> = functions
            .iter()
            .filter(|(f, _)| !f.has_body())
            .map(|(_, key)| *key)
            .collect();
        let keys: Vec<NodeKey> = if overloads.is_empty() {
            functions.iter().map(|(_, key)| *key).collect()
        } else {
            overloads
        };
        let mut signatures = vec![];
        let mut complete = true;
        for key in keys {
            match self.signature_of(key) {
                Ok(signature) => signatures.push(signature),
                Err(error) => {
                    trace!(%error, "signature unavailable");
                    complete = false;
                    signatures.push(Rc::new(Signature::new(vec![], TypeId::ANY)));
                }
            }
        }
        let ty = self.types.object(ObjectShape {
            call_signatures: signatures,
            ..ObjectShape::default()
        });
        (ty, complete)
    }

    fn variable_type(
        &mut self,
        declarator: &'a VariableDeclarator,
        kind: VariableKind,
        path: &[PathStep<'a>],
        scope: ScopeId,
    ) -> TypeId {
        if let Some(ann) = &declarator.type_annotation {
            let declared = self.resolve_annotation(ann, scope);
            if let Some(init) = &declarator.init {
                let root = RootExpr {
                    expr: init,
                    scope,
                    contextual: Some(ann),
                };
                self.ensure_root_typed(root);
            }
            return self.follow_path(declared, path, scope);
        }
        let Some(init) = &declarator.init else {
            return TypeId::ANY;
        };
        let initial = self.check_expression(init, scope, None);
        let ty = self.follow_path(initial, path, scope);
        match kind {
            VariableKind::Const if path.is_empty() => {
                if !self.strict() && ty.is_nullable() {
                    TypeId::ANY
                } else {
                    ty
                }
            }
            _ => self.widen_for_declaration(ty),
        }
    }

    pub(crate) fn parameter_type(
        &mut self,
        function: NodeKey,
        index: usize,
        path: &[PathStep<'a>],
        scope: ScopeId,
    ) -> TypeId {
        let Some(info) = self.binder.function(function) else {
            return TypeId::ANY;
        };
        let function_ref = info.function;
        let root = info.root;
        let params = function_ref.params();
        let Some(param) = params.get(index) else {
            return TypeId::ANY;
        };

        if let Some(ann) = param.declared_type() {
            let declared = self.resolve_annotation(ann, scope);
            let declared = if param.optional && self.strict() && !param.is_rest() {
                self.union(vec![declared, TypeId::UNDEFINED])
            } else {
                declared
            };
            return self.follow_path(declared, path, scope);
        }

        if let Some(root) = root {
            self.ensure_root_typed(root);
        }
        let skipped_this = params
            .first()
            .is_some_and(super::declared::is_this_param);
        let position = if skipped_this { index.saturating_sub(1) } else { index };
        let contextual = self.contextual.get(&function).cloned();
        let base = match contextual {
            Some(signature) if param.is_rest() => {
                let rest: Vec<TypeId> = (position..signature.params.len().max(position + 1))
                    .filter_map(|i| param_type_at(self, &signature, i))
                    .collect();
                let element = self.union(rest);
                self.types.array(element)
            }
            Some(signature) => param_type_at(self, &signature, position).unwrap_or(TypeId::ANY),
            None if param.is_rest() => self.types.array(TypeId::ANY),
            None => TypeId::ANY,
        };
        self.follow_path(base, path, scope)
    }

    /// Walk a destructuring path from the type of the whole value.
    pub(crate) fn follow_path(&mut self, root: TypeId, path: &[PathStep<'a>], scope: ScopeId) -> TypeId {
        let mut ty = root;
        for step in path {
            ty = match step {
                PathStep::Property(name) => self.property_type(ty, name).unwrap_or(TypeId::ANY),
                PathStep::Index(index) => match self.types.get(ty).clone() {
                    TypeData::Tuple(elements, _) => elements
                        .get(*index)
                        .map(|e| e.ty)
                        .unwrap_or(TypeId::UNDEFINED),
                    _ => self.iterated_type(ty),
                },
                PathStep::ArrayRest(start) => match self.types.get(ty).clone() {
                    TypeData::Tuple(elements, readonly) => {
                        let rest = elements.iter().skip(*start).cloned().collect();
                        self.types.tuple(rest, readonly)
                    }
                    _ => {
                        let element = self.iterated_type(ty);
                        self.types.array(element)
                    }
                },
                PathStep::ObjectRest(taken) => match self.apparent_shape(ty) {
                    Some(shape) if ty != TypeId::ANY => {
                        let mut rest = ObjectShape::default();
                        for prop in shape.properties.values() {
                            if !taken.contains(&prop.name) && !prop.method {
                                rest.insert_property(prop.clone());
                            }
                        }
                        rest.string_index = shape.string_index.clone();
                        self.types.object(rest)
                    }
                    _ => TypeId::ANY,
                },
                PathStep::Default(fallback) => {
                    let fallback = self.check_expression(*fallback, scope, None);
                    let fallback = self.widen_literal(fallback);
                    if ty == TypeId::ANY {
                        fallback
                    } else {
                        let present = self.without_undefined(ty);
                        self.union(vec![present, fallback])
                    }
                }
                PathStep::Unknown => TypeId::ANY,
            };
        }
        ty
    }

    fn without_undefined(&mut self, ty: TypeId) -> TypeId {
        let members: Vec<TypeId> = self
            .types
            .constituents(ty)
            .into_iter()
            .filter(|&m| m != TypeId::UNDEFINED)
            .collect();
        self.union(members)
    }

    /// Type the outermost expression holding a function-like, so that
    /// contextual signatures for untyped callbacks inside it are known.
    pub(crate) fn ensure_root_typed(&mut self, root: RootExpr<'a>) {
        let key = NodeKey::new(self.file_of(root.scope), root.expr.span().start);
        if !self.typed_roots.insert(key) {
            return;
        }
        let contextual = root
            .contextual
            .map(|ann| self.resolve_annotation(ann, root.scope));
        self.check_expression(root.expr, root.scope, contextual);
    }
}

fn is_const_assertion(ann: &TypeAnnotation) -> bool {
    matches!(ann, TypeAnnotation::Reference(r) if &*r.name.name == "const" && r.type_arguments.is_none())
}
