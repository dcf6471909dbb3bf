//! Declared types: annotations, aliases, interfaces, classes and enums.

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::trace;

use super::binder::{ClassRef, Decl, ScopeId, ScopeKind, SymbolId};
use super::types::{
    AliasTag, IndexInfo, ObjectShape, ParamInfo, PropertyInfo, Signature, TupleElement, TypeData,
    TypeParamInfo,
};
use super::{NodeKey, ProgramContext, Slot, TypeEnv, TypeId};
use crate::ast::*;
use crate::string_dict::Atom;

/// Method overloads collected while walking members, flattened into
/// function-typed properties at the end.
type MethodGroups = IndexMap<Atom, (Vec<Rc<Signature>>, bool), FxBuildHasher>;

impl<'a> ProgramContext<'a> {
    // ----- annotations -----

    pub(crate) fn resolve_annotation(&mut self, ann: &'a TypeAnnotation, scope: ScopeId) -> TypeId {
        self.resolve_type_in(ann, scope, &TypeEnv::default())
    }

    pub(crate) fn resolve_type_in(
        &mut self,
        ann: &'a TypeAnnotation,
        scope: ScopeId,
        env: &TypeEnv,
    ) -> TypeId {
        if !self.enter() {
            return TypeId::ANY;
        }
        let ty = self.resolve_type_inner(ann, scope, env);
        self.leave();
        ty
    }

    fn resolve_type_inner(
        &mut self,
        ann: &'a TypeAnnotation,
        scope: ScopeId,
        env: &TypeEnv,
    ) -> TypeId {
        match ann {
            TypeAnnotation::Keyword(keyword) => keyword_type(keyword.keyword),
            TypeAnnotation::Literal(literal) => self.literal_type(&literal.value),
            TypeAnnotation::Reference(reference) => self.resolve_type_reference(reference, scope, env),
            TypeAnnotation::Object(object) => {
                let shape = self.shape_from_members(&object.members, scope, env);
                self.types.object(shape)
            }
            TypeAnnotation::Array(array) => {
                let element = self.resolve_type_in(&array.element_type, scope, env);
                self.types.array(element)
            }
            TypeAnnotation::Tuple(tuple) => {
                let elements = tuple
                    .element_types
                    .iter()
                    .map(|element| TupleElement {
                        ty: self.resolve_type_in(&element.type_annotation, scope, env),
                        optional: element.optional,
                        rest: element.rest,
                        label: element.label.as_ref().map(|l| Rc::clone(&l.name)),
                    })
                    .collect();
                self.types.tuple(elements, false)
            }
            TypeAnnotation::Union(union) => {
                let members = union
                    .types
                    .iter()
                    .map(|t| self.resolve_type_in(t, scope, env))
                    .collect();
                self.union(members)
            }
            TypeAnnotation::Intersection(intersection) => {
                let members: Vec<TypeId> = intersection
                    .types
                    .iter()
                    .map(|t| self.resolve_type_in(t, scope, env))
                    .collect();
                self.intersection(members)
            }
            TypeAnnotation::Function(function) => {
                let signature = self.signature_from_parts(
                    function.type_parameters.as_ref(),
                    &function.params,
                    Some(&*function.return_type),
                    scope,
                    env,
                );
                let shape = if function.constructor {
                    ObjectShape {
                        construct_signatures: vec![Rc::new(signature)],
                        ..ObjectShape::default()
                    }
                } else {
                    ObjectShape::function(signature)
                };
                self.types.object(shape)
            }
            TypeAnnotation::Conditional(conditional) => {
                self.resolve_conditional(conditional, scope, env)
            }
            TypeAnnotation::Infer(infer) => env
                .get(&infer.type_parameter.name.name)
                .copied()
                .unwrap_or(TypeId::UNKNOWN),
            TypeAnnotation::Mapped(mapped) => self.resolve_mapped(mapped, scope, env),
            TypeAnnotation::Indexed(indexed) => {
                let object = self.resolve_type_in(&indexed.object_type, scope, env);
                let index = self.resolve_type_in(&indexed.index_type, scope, env);
                self.indexed_access(object, index)
            }
            TypeAnnotation::Typeof(query) => self.type_of_entity_name(&query.expression.name, scope),
            TypeAnnotation::Operator(operator) => {
                let inner = self.resolve_type_in(&operator.type_annotation, scope, env);
                match operator.operator {
                    TypeOperator::Keyof => self.keyof(inner),
                    TypeOperator::Readonly => self.readonly_of(inner),
                    TypeOperator::Unique => TypeId::SYMBOL,
                }
            }
            TypeAnnotation::TemplateLiteral(template) => match template.quasis.as_slice() {
                [only] if template.types.is_empty() => self.types.string_literal(Rc::clone(only)),
                _ => TypeId::STRING,
            },
            TypeAnnotation::Predicate(predicate) => {
                if predicate.asserts {
                    TypeId::VOID
                } else {
                    TypeId::BOOLEAN
                }
            }
            TypeAnnotation::Parenthesized(inner) => {
                self.resolve_type_in(&inner.type_annotation, scope, env)
            }
            TypeAnnotation::This(_) => match env.get("this") {
                Some(&this) => this,
                None => self.class_this_type(scope),
            },
        }
    }

    pub(crate) fn literal_type(&mut self, value: &LiteralValue) -> TypeId {
        match value {
            LiteralValue::Null => TypeId::NULL,
            LiteralValue::Undefined => TypeId::UNDEFINED,
            LiteralValue::Boolean(b) => super::TypeInterner::boolean_literal(*b),
            LiteralValue::Number(n) => self.types.number_literal(*n),
            LiteralValue::String(s) => self.types.string_literal(Rc::clone(s)),
            LiteralValue::BigInt(digits) => self.types.bigint_literal(Rc::from(digits.as_str())),
            LiteralValue::RegExp { .. } => self.global_reference("RegExp", vec![]),
        }
    }

    /// Instance type of the class whose body encloses `scope`.
    fn class_this_type(&mut self, scope: ScopeId) -> TypeId {
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(s) = self.binder.scope(id) else { break };
            if let ScopeKind::Class(symbol) = s.kind {
                return self.declared_instance_type(symbol);
            }
            current = s.parent;
        }
        TypeId::ANY
    }

    // ----- references -----

    fn resolve_type_reference(
        &mut self,
        reference: &'a TypeReference,
        scope: ScopeId,
        env: &TypeEnv,
    ) -> TypeId {
        let name = &reference.name.name;
        let args: Vec<TypeId> = reference
            .type_arguments
            .iter()
            .flat_map(|args| args.params.iter())
            .map(|arg| self.resolve_type_in(arg, scope, env))
            .collect();

        if !name.contains('.')
            && let Some(&bound) = env.get(name)
        {
            return bound;
        }

        if let Some((head, member)) = name.split_once('.')
            && !member.contains('.')
            && let Some(symbol) = self.binder.resolve_type(scope, head)
            && self.enum_decl(symbol).is_some()
        {
            return self.types.enum_member(symbol, Rc::from(member));
        }

        match self.resolve_type_name(name, scope) {
            Some(symbol) => self.type_from_symbol(symbol, args),
            None => {
                trace!(name = %name, "unresolved type name");
                TypeId::ANY
            }
        }
    }

    /// Resolve a possibly dotted type name through namespaces.
    fn resolve_type_name(&self, name: &str, scope: ScopeId) -> Option<SymbolId> {
        let mut parts = name.split('.');
        let head = parts.next()?;
        let mut symbol = self.binder.resolve_type(scope, head)?;
        for part in parts {
            symbol = self.binder.namespace_member(symbol, part, true)?;
        }
        Some(symbol)
    }

    fn type_from_symbol(&mut self, symbol: SymbolId, args: Vec<TypeId>) -> TypeId {
        let decls = self.decls_of(symbol);
        if decls
            .iter()
            .any(|d| matches!(d, Decl::Class { .. } | Decl::Interface { .. }))
        {
            return self.reference_type(symbol, args);
        }
        for decl in &decls {
            match decl {
                Decl::TypeAlias { .. } => return self.alias_instance(symbol, args),
                Decl::Enum { .. } => return self.types.enum_type(symbol),
                Decl::TypeParameter { .. } => return self.type_param_type(symbol),
                _ => {}
            }
        }
        TypeId::ANY
    }

    pub(crate) fn decls_of(&self, symbol: SymbolId) -> Vec<Decl<'a>> {
        self.binder
            .symbol(symbol)
            .map(|s| s.decls.clone())
            .unwrap_or_default()
    }

    fn enum_decl(&self, symbol: SymbolId) -> Option<&'a EnumDeclaration> {
        self.binder.symbol(symbol)?.decls.iter().find_map(|d| match d {
            Decl::Enum { decl, .. } => Some(*decl),
            _ => None,
        })
    }

    /// Instance type of a class or interface, filling omitted type arguments
    /// from defaults. `Array<T>` is normalized to `T[]`.
    pub(crate) fn reference_type(&mut self, symbol: SymbolId, mut args: Vec<TypeId>) -> TypeId {
        let params = self.declared_type_params(symbol);
        if args.len() < params.len() {
            let mut mapping = FxHashMap::default();
            for (param, arg) in params.iter().zip(&args) {
                mapping.insert(*param, *arg);
            }
            for param in params.iter().skip(args.len()) {
                let fallback = self.type_param_default(*param).unwrap_or(TypeId::ANY);
                let filled = self.instantiate(fallback, &mapping);
                mapping.insert(*param, filled);
                args.push(filled);
            }
        }
        args.truncate(params.len());

        if Some(symbol) == self.binder.global_type("Array")
            && let [element] = args.as_slice()
        {
            return self.types.array(*element);
        }
        self.types.reference(symbol, args)
    }

    /// The instance type a class or interface declares for itself, with its
    /// own type parameters as arguments.
    pub(crate) fn declared_instance_type(&mut self, symbol: SymbolId) -> TypeId {
        let params = self.declared_type_params(symbol);
        self.types.reference(symbol, params)
    }

    /// Canonical type parameters of a class or interface: those of its first
    /// declaration that lists any.
    pub(crate) fn declared_type_params(&mut self, symbol: SymbolId) -> Vec<TypeId> {
        let decls = self.decls_of(symbol);
        let found = decls.iter().find_map(|decl| match decl {
            Decl::Interface { decl, scope } => decl
                .type_parameters
                .as_ref()
                .filter(|p| !p.params.is_empty())
                .map(|p| (p, *scope)),
            Decl::Class { class, .. } => {
                let scope = self.binder.class(symbol).map(|info| info.scope)?;
                class
                    .type_parameters()
                    .filter(|p| !p.params.is_empty())
                    .map(|p| (p, scope))
            }
            _ => None,
        });
        let Some((params, scope)) = found else {
            return vec![];
        };
        params
            .params
            .iter()
            .map(|p| match self.binder.resolve_type(scope, &p.name.name) {
                Some(sym) => self.type_param_type(sym),
                None => TypeId::UNKNOWN,
            })
            .collect()
    }

    pub(crate) fn type_param_type(&mut self, symbol: SymbolId) -> TypeId {
        if let Some(&ty) = self.type_param_types.get(&symbol) {
            return ty;
        }
        let decl = self.decls_of(symbol).into_iter().find_map(|d| match d {
            Decl::TypeParameter { param, scope } => Some((param, scope)),
            _ => None,
        });
        let Some((param, scope)) = decl else {
            return TypeId::UNKNOWN;
        };
        let ty = self.types.type_parameter(TypeParamInfo {
            name: Rc::clone(&param.name.name),
            constraint: None,
            default: None,
        });
        self.type_param_types.insert(symbol, ty);
        let constraint = param
            .constraint
            .as_deref()
            .map(|c| self.resolve_annotation(c, scope));
        let default = param
            .default
            .as_deref()
            .map(|d| self.resolve_annotation(d, scope));
        self.types.set_type_param_bounds(ty, constraint, default);
        ty
    }

    /// Fresh type parameters for a signature or construct the binder does
    /// not scope (function types, method signatures, `infer`), added to `env`.
    fn fresh_type_params(
        &mut self,
        params: Option<&'a TypeParameters>,
        scope: ScopeId,
        env: &mut TypeEnv,
    ) -> Vec<TypeId> {
        let Some(params) = params else {
            return vec![];
        };
        let ids: Vec<TypeId> = params
            .params
            .iter()
            .map(|p| {
                let ty = self.types.type_parameter(TypeParamInfo {
                    name: Rc::clone(&p.name.name),
                    constraint: None,
                    default: None,
                });
                env.insert(Rc::clone(&p.name.name), ty);
                ty
            })
            .collect();
        for (param, &ty) in params.params.iter().zip(&ids) {
            let constraint = param
                .constraint
                .as_deref()
                .map(|c| self.resolve_type_in(c, scope, env));
            let default = param
                .default
                .as_deref()
                .map(|d| self.resolve_type_in(d, scope, env));
            self.types.set_type_param_bounds(ty, constraint, default);
        }
        ids
    }

    pub(crate) fn type_param_constraint(&self, ty: TypeId) -> Option<TypeId> {
        match self.types.get(ty) {
            TypeData::TypeParameter(id) => self.types.type_param_info(*id)?.constraint,
            _ => None,
        }
    }

    pub(crate) fn type_param_default(&self, ty: TypeId) -> Option<TypeId> {
        match self.types.get(ty) {
            TypeData::TypeParameter(id) => self.types.type_param_info(*id)?.default,
            _ => None,
        }
    }

    // ----- aliases -----

    pub(crate) fn alias_instance(&mut self, symbol: SymbolId, args: Vec<TypeId>) -> TypeId {
        let Some((decl, scope)) = self.decls_of(symbol).into_iter().find_map(|d| match d {
            Decl::TypeAlias { decl, scope } => Some((decl, scope)),
            _ => None,
        }) else {
            return TypeId::ANY;
        };

        let params: &'a [TypeParameter] = decl
            .type_parameters
            .as_ref()
            .map(|p| p.params.as_slice())
            .unwrap_or_default();

        if params.is_empty() {
            match self.alias_types.get(&symbol) {
                Some(Slot::Done(ty)) => return *ty,
                Some(Slot::Pending) => {
                    trace!(alias = %decl.id.name, "circular type alias");
                    return TypeId::ANY;
                }
                None => {}
            }
            self.alias_types.insert(symbol, Slot::Pending);
            let body = self.resolve_annotation(&decl.type_annotation, scope);
            let ty = self.tag_alias(body, &decl.type_annotation, symbol, vec![]);
            self.alias_types.insert(symbol, Slot::Done(ty));
            return ty;
        }

        if Some(symbol) == self.binder.global_type("Awaited")
            && let [arg] = args.as_slice()
        {
            return self.awaited_type(*arg);
        }

        let mut env = TypeEnv::default();
        let mut filled = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let arg = match args.get(index) {
                Some(&arg) => arg,
                None => match &param.default {
                    Some(default) => self.resolve_type_in(default, scope, &env),
                    None => TypeId::UNKNOWN,
                },
            };
            env.insert(Rc::clone(&param.name.name), arg);
            filled.push(arg);
        }

        let saved = std::mem::replace(&mut self.generic_hit, false);
        let body = self.resolve_type_in(&decl.type_annotation, scope, &env);
        let deferred = self.generic_hit;
        self.generic_hit = saved;
        if deferred {
            return self.types.deferred_alias(symbol, filled);
        }
        self.tag_alias(body, &decl.type_annotation, symbol, filled)
    }

    /// Anonymous object and union bodies print as the alias that produced them.
    fn tag_alias(
        &mut self,
        ty: TypeId,
        body: &TypeAnnotation,
        symbol: SymbolId,
        args: Vec<TypeId>,
    ) -> TypeId {
        let keeps_name = matches!(
            body,
            TypeAnnotation::Object(_)
                | TypeAnnotation::Union(_)
                | TypeAnnotation::Function(_)
                | TypeAnnotation::Mapped(_)
        );
        if !keeps_name {
            return ty;
        }
        let tag = AliasTag {
            symbol,
            args: args.into(),
        };
        self.types.with_alias(ty, tag)
    }

    fn resolve_conditional(
        &mut self,
        conditional: &'a ConditionalType,
        scope: ScopeId,
        env: &TypeEnv,
    ) -> TypeId {
        let check = self.resolve_type_in(&conditional.check_type, scope, env);
        if matches!(self.types.get(check), TypeData::TypeParameter(_) | TypeData::Alias(..)) {
            self.generic_hit = true;
            return TypeId::ANY;
        }

        let naked = match conditional.check_type.as_ref() {
            TypeAnnotation::Reference(r) if r.type_arguments.is_none() && !r.name.name.contains('.') => {
                Some(Rc::clone(&r.name.name))
            }
            _ => None,
        };
        match naked {
            Some(name) if self.types.is_union(check) || check == TypeId::NEVER => {
                let members = self.types.constituents(check);
                let results = members
                    .into_iter()
                    .map(|member| {
                        let mut distributed = env.clone();
                        distributed.insert(Rc::clone(&name), member);
                        self.conditional_branch(conditional, member, scope, &distributed)
                    })
                    .collect();
                self.union(results)
            }
            _ => self.conditional_branch(conditional, check, scope, env),
        }
    }

    fn conditional_branch(
        &mut self,
        conditional: &'a ConditionalType,
        check: TypeId,
        scope: ScopeId,
        env: &TypeEnv,
    ) -> TypeId {
        let mut infer_names = vec![];
        collect_infer_names(&conditional.extends_type, &mut infer_names);

        let mut extends_env = env.clone();
        let mut infer_params = vec![];
        for name in &infer_names {
            let ty = self.types.type_parameter(TypeParamInfo {
                name: Rc::clone(name),
                constraint: None,
                default: None,
            });
            extends_env.insert(Rc::clone(name), ty);
            infer_params.push(ty);
        }
        let extends = self.resolve_type_in(&conditional.extends_type, scope, &extends_env);

        if check == TypeId::ANY {
            let true_type = self.resolve_type_in(&conditional.true_type, scope, &extends_env);
            let false_type = self.resolve_type_in(&conditional.false_type, scope, env);
            return self.union(vec![true_type, false_type]);
        }

        let mut true_env = env.clone();
        let mut target = extends;
        if !infer_params.is_empty() {
            let inferred = self.infer_from_types(check, extends, &infer_params);
            for (name, &ty) in infer_names.iter().zip(&inferred) {
                true_env.insert(Rc::clone(name), ty);
            }
            let mapping: FxHashMap<TypeId, TypeId> =
                infer_params.iter().copied().zip(inferred).collect();
            target = self.instantiate(extends, &mapping);
        }

        if self.is_assignable(check, target) {
            self.resolve_type_in(&conditional.true_type, scope, &true_env)
        } else {
            self.resolve_type_in(&conditional.false_type, scope, env)
        }
    }

    fn resolve_mapped(&mut self, mapped: &'a MappedType, scope: ScopeId, env: &TypeEnv) -> TypeId {
        let key_name = Rc::clone(&mapped.type_parameter.name.name);
        let Some(constraint_ann) = mapped.type_parameter.constraint.as_deref() else {
            return TypeId::ANY;
        };
        let keys = self.resolve_type_in(constraint_ann, scope, env);

        // `{ [P in keyof T]: ... }` copies the modifiers of T's properties.
        let source = match constraint_ann {
            TypeAnnotation::Operator(op) if op.operator == TypeOperator::Keyof => {
                Some(self.resolve_type_in(&op.type_annotation, scope, env))
            }
            _ => None,
        };
        if let Some(source) = source
            && matches!(self.types.get(source), TypeData::TypeParameter(_) | TypeData::Alias(..))
        {
            self.generic_hit = true;
            return TypeId::ANY;
        }
        if matches!(self.types.get(keys), TypeData::TypeParameter(_) | TypeData::Alias(..)) {
            self.generic_hit = true;
            return TypeId::ANY;
        }
        let source_shape = source.and_then(|s| self.apparent_shape(s));

        let mut shape = ObjectShape::default();
        for key in self.types.constituents(keys) {
            let mut member_env = env.clone();
            member_env.insert(Rc::clone(&key_name), key);
            let value = match mapped.type_annotation.as_deref() {
                Some(ann) => self.resolve_type_in(ann, scope, &member_env),
                None => TypeId::ANY,
            };

            let name = match self.types.get(key).clone() {
                TypeData::StringLiteral(name) => name,
                TypeData::NumberLiteral(n) => Rc::from(super::format_number(n.value()).as_str()),
                TypeData::Intrinsic(_) if key == TypeId::STRING => {
                    shape.string_index = Some(IndexInfo {
                        key_name: Rc::from("x"),
                        ty: value,
                        readonly: mapped.readonly.is_some_and(|m| m != MappedTypeModifier::Remove),
                    });
                    continue;
                }
                TypeData::Intrinsic(_) if key == TypeId::NUMBER => {
                    shape.number_index = Some(IndexInfo {
                        key_name: Rc::from("x"),
                        ty: value,
                        readonly: mapped.readonly.is_some_and(|m| m != MappedTypeModifier::Remove),
                    });
                    continue;
                }
                _ => continue,
            };

            let name = match mapped.name_type.as_deref() {
                Some(name_type) => {
                    let remapped = self.resolve_type_in(name_type, scope, &member_env);
                    match self.types.get(remapped) {
                        TypeData::StringLiteral(n) => Rc::clone(n),
                        _ => continue,
                    }
                }
                None => name,
            };

            let original = source_shape.as_ref().and_then(|s| s.property(&name).cloned());
            let optional = match mapped.optional {
                Some(MappedTypeModifier::Add | MappedTypeModifier::Present) => true,
                Some(MappedTypeModifier::Remove) => false,
                None => original.as_ref().is_some_and(|p| p.optional),
            };
            let readonly = match mapped.readonly {
                Some(MappedTypeModifier::Add | MappedTypeModifier::Present) => true,
                Some(MappedTypeModifier::Remove) => false,
                None => original.as_ref().is_some_and(|p| p.readonly),
            };
            shape.insert_property(PropertyInfo {
                name,
                ty: value,
                optional,
                readonly,
                method: false,
            });
        }
        self.types.object(shape)
    }

    /// `keyof T`: the union of T's property names as string literals.
    pub(crate) fn keyof(&mut self, ty: TypeId) -> TypeId {
        match self.types.get(ty) {
            TypeData::TypeParameter(_) | TypeData::Alias(..) => {
                self.generic_hit = true;
                return TypeId::STRING;
            }
            TypeData::Intrinsic(_) if ty == TypeId::ANY => {
                return self.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);
            }
            _ => {}
        }
        let Some(shape) = self.apparent_shape(ty) else {
            return TypeId::NEVER;
        };
        let mut keys: Vec<TypeId> = shape
            .properties
            .keys()
            .map(|name| self.types.string_literal(Rc::clone(name)))
            .collect();
        if shape.string_index.is_some() {
            keys.extend([TypeId::STRING, TypeId::NUMBER]);
        } else if shape.number_index.is_some() {
            keys.push(TypeId::NUMBER);
        }
        self.union(keys)
    }

    /// `T[K]` for concrete `T` and `K`.
    pub(crate) fn indexed_access(&mut self, object: TypeId, index: TypeId) -> TypeId {
        if matches!(self.types.get(object), TypeData::TypeParameter(_) | TypeData::Alias(..))
            || matches!(self.types.get(index), TypeData::TypeParameter(_) | TypeData::Alias(..))
        {
            self.generic_hit = true;
            return TypeId::ANY;
        }
        let mut results = vec![];
        for key in self.types.constituents(index) {
            let ty = match self.types.get(key).clone() {
                TypeData::StringLiteral(name) => self.property_type(object, &name),
                TypeData::NumberLiteral(n) => self
                    .tuple_element(object, n.value())
                    .or_else(|| self.element_type(object)),
                _ if key == TypeId::NUMBER => self.element_type(object),
                _ if key == TypeId::STRING => self
                    .apparent_shape(object)
                    .and_then(|s| s.string_index.as_ref().map(|i| i.ty)),
                _ => None,
            };
            results.push(ty.unwrap_or(TypeId::ANY));
        }
        self.union(results)
    }

    fn readonly_of(&mut self, ty: TypeId) -> TypeId {
        match self.types.get(ty).clone() {
            TypeData::Array(element) => self.global_reference("ReadonlyArray", vec![element]),
            TypeData::Tuple(elements, _) => self.types.tuple(elements.to_vec(), true),
            _ => ty,
        }
    }

    /// `typeof a.b.c` in type position.
    fn type_of_entity_name(&mut self, name: &str, scope: ScopeId) -> TypeId {
        let mut parts = name.split('.');
        let Some(head) = parts.next() else {
            return TypeId::ANY;
        };
        let mut ty = match self.binder.resolve_value(scope, head) {
            Some(symbol) => self.symbol_value_type(symbol),
            None => return TypeId::ANY,
        };
        for part in parts {
            ty = self.property_type(ty, part).unwrap_or(TypeId::ANY);
        }
        ty
    }

    // ----- members -----

    /// Object shape of a type literal's members.
    pub(crate) fn shape_from_members(
        &mut self,
        members: &'a [TypeMember],
        scope: ScopeId,
        env: &TypeEnv,
    ) -> ObjectShape {
        let mut shape = ObjectShape::default();
        let mut methods = MethodGroups::default();
        for member in members {
            match member {
                TypeMember::Property(prop) => {
                    let Some(name) = prop.key.static_name() else { continue };
                    if shape.properties.contains_key(&name) {
                        continue;
                    }
                    let ty = match &prop.type_annotation {
                        Some(ann) => self.resolve_type_in(ann, scope, env),
                        None => TypeId::ANY,
                    };
                    shape.insert_property(PropertyInfo {
                        name,
                        ty,
                        optional: prop.optional,
                        readonly: prop.readonly,
                        method: false,
                    });
                }
                TypeMember::Method(method) => {
                    let Some(name) = method.key.static_name() else { continue };
                    let signature = self.signature_from_parts(
                        method.type_parameters.as_ref(),
                        &method.params,
                        method.return_type.as_ref(),
                        scope,
                        env,
                    );
                    let entry = methods.entry(name).or_insert_with(|| (vec![], method.optional));
                    entry.0.push(Rc::new(signature));
                }
                TypeMember::Index(index) => {
                    let key = self.resolve_type_in(&index.key_type, scope, env);
                    let info = IndexInfo {
                        key_name: Rc::clone(&index.key.name),
                        ty: self.resolve_type_in(&index.value_type, scope, env),
                        readonly: index.readonly,
                    };
                    if key == TypeId::NUMBER {
                        shape.number_index = Some(info);
                    } else {
                        shape.string_index = Some(info);
                    }
                }
                TypeMember::Call(call) => {
                    let signature = self.signature_from_parts(
                        call.type_parameters.as_ref(),
                        &call.params,
                        call.return_type.as_ref(),
                        scope,
                        env,
                    );
                    shape.call_signatures.push(Rc::new(signature));
                }
                TypeMember::Construct(construct) => {
                    let signature = self.signature_from_parts(
                        construct.type_parameters.as_ref(),
                        &construct.params,
                        construct.return_type.as_ref(),
                        scope,
                        env,
                    );
                    shape.construct_signatures.push(Rc::new(signature));
                }
            }
        }
        self.add_method_groups(&mut shape, methods);
        shape
    }

    fn add_method_groups(&mut self, shape: &mut ObjectShape, methods: MethodGroups) {
        for (name, (signatures, optional)) in methods {
            if shape.properties.contains_key(&name) {
                continue;
            }
            let ty = self.types.object(ObjectShape {
                call_signatures: signatures,
                ..ObjectShape::default()
            });
            shape.insert_property(PropertyInfo {
                name,
                ty,
                optional,
                readonly: false,
                method: true,
            });
        }
    }

    /// A signature spelled out in a type: function types, method and call
    /// signatures. Missing parameter and return types are `any`.
    pub(crate) fn signature_from_parts(
        &mut self,
        type_params: Option<&'a TypeParameters>,
        params: &'a [FunctionParam],
        return_type: Option<&'a TypeAnnotation>,
        scope: ScopeId,
        env: &TypeEnv,
    ) -> Signature {
        let mut env = env.clone();
        let type_params = self.fresh_type_params(type_params, scope, &mut env);
        let params = params
            .iter()
            .filter(|p| !is_this_param(p))
            .map(|param| ParamInfo {
                name: param_display_name(&param.pattern),
                ty: match param.declared_type() {
                    Some(ann) => self.resolve_type_in(ann, scope, &env),
                    None if param.is_rest() => self.types.array(TypeId::ANY),
                    None => TypeId::ANY,
                },
                optional: param.optional || param.has_initializer(),
                rest: param.is_rest(),
            })
            .collect();
        let (return_type, predicate) = match return_type {
            Some(TypeAnnotation::Predicate(predicate)) if !predicate.asserts => {
                let narrowed = predicate
                    .type_annotation
                    .as_deref()
                    .map(|t| self.resolve_type_in(t, scope, &env))
                    .unwrap_or(TypeId::ANY);
                (
                    TypeId::BOOLEAN,
                    Some((Rc::clone(&predicate.parameter.name), narrowed)),
                )
            }
            Some(ann) => (self.resolve_type_in(ann, scope, &env), None),
            None => (TypeId::ANY, None),
        };
        Signature {
            type_params,
            params,
            return_type,
            predicate,
        }
    }

    /// Members of a class or interface in terms of its own type parameters.
    pub(crate) fn member_table(&mut self, symbol: SymbolId) -> Rc<ObjectShape> {
        match self.member_tables.get(&symbol) {
            Some(Slot::Done(shape)) => return Rc::clone(shape),
            Some(Slot::Pending) => {
                trace!(symbol = ?symbol, "circular member table");
                return Rc::default();
            }
            None => {}
        }
        trace!(name = %self.binder.symbol_name(symbol), "building member table");
        self.member_tables.insert(symbol, Slot::Pending);

        let mut shape = ObjectShape::default();
        let decls = self.decls_of(symbol);
        if let Some(class) = decls.iter().find_map(|d| match d {
            Decl::Class { class, .. } => Some(*class),
            _ => None,
        }) {
            self.add_class_members(symbol, class, &mut shape);
        }
        let canonical = self.declared_type_params(symbol);
        let this_type = self.types.reference(symbol, canonical.clone());
        for decl in &decls {
            if let Decl::Interface { decl, scope } = decl {
                let mut env = TypeEnv::default();
                env.insert(Rc::from("this"), this_type);
                if let Some(params) = &decl.type_parameters {
                    for (param, &ty) in params.params.iter().zip(&canonical) {
                        env.insert(Rc::clone(&param.name.name), ty);
                    }
                }
                let own = self.shape_from_members(&decl.body, *scope, &env);
                merge_shape(&mut shape, &own);
                for base in &decl.extends {
                    let base_type = self.resolve_type_reference(base, *scope, &env);
                    if let Some(base_shape) = self.apparent_shape(base_type) {
                        merge_shape(&mut shape, &base_shape);
                    }
                }
            }
        }

        let shape = Rc::new(shape);
        self.member_tables.insert(symbol, Slot::Done(Rc::clone(&shape)));
        shape
    }

    fn add_class_members(&mut self, symbol: SymbolId, class: ClassRef<'a>, shape: &mut ObjectShape) {
        let Some(scope) = self.binder.class(symbol).map(|info| info.scope) else {
            return;
        };
        let file = self.file_of(scope);
        let mut methods = MethodGroups::default();
        let mut overloaded = vec![];

        for member in class.members() {
            match member {
                ClassMember::Method(method) if !method.static_ => {
                    let Some(name) = method.key.static_name() else { continue };
                    let key = NodeKey::new(file, method.value.span.start);
                    match method.kind {
                        MethodKind::Method => {
                            if overloaded.contains(&name) {
                                continue;
                            }
                            let signature = self.signature_of(key).unwrap_or_else(|_| {
                                Rc::new(Signature::new(vec![], TypeId::ANY))
                            });
                            let entry = methods.entry(name).or_insert_with(|| (vec![], method.optional));
                            entry.0.push(signature);
                        }
                        MethodKind::Get => {
                            let ty = self.return_type_of(key);
                            shape.insert_property(PropertyInfo {
                                name,
                                ty,
                                optional: false,
                                readonly: false,
                                method: false,
                            });
                        }
                        MethodKind::Set => {
                            if shape.properties.contains_key(&name) {
                                continue;
                            }
                            let ty = self
                                .signature_of(key)
                                .ok()
                                .and_then(|s| s.params.first().map(|p| p.ty))
                                .unwrap_or(TypeId::ANY);
                            shape.insert_property(PropertyInfo {
                                name,
                                ty,
                                optional: false,
                                readonly: false,
                                method: false,
                            });
                        }
                    }
                }
                ClassMember::MethodSignature(signature) if !signature.static_ => {
                    let Some(name) = signature.key.static_name() else { continue };
                    let sig = self.signature_from_parts(
                        signature.type_parameters.as_ref(),
                        &signature.params,
                        signature.return_type.as_ref(),
                        scope,
                        &TypeEnv::default(),
                    );
                    if !overloaded.contains(&name) {
                        overloaded.push(Rc::clone(&name));
                        methods.shift_remove(&name);
                    }
                    let entry = methods.entry(name).or_insert_with(|| (vec![], signature.optional));
                    entry.0.push(Rc::new(sig));
                }
                ClassMember::Property(prop) if !prop.static_ => {
                    let Some(name) = prop.key.static_name() else { continue };
                    let ty = self.class_property_type(prop, scope);
                    shape.insert_property(PropertyInfo {
                        name,
                        ty,
                        optional: prop.optional,
                        readonly: prop.readonly,
                        method: false,
                    });
                }
                ClassMember::Constructor(ctor) => {
                    let key = NodeKey::new(file, ctor.span.start);
                    for (index, param) in ctor.params.iter().enumerate() {
                        if param.accessibility.is_none() && !param.readonly {
                            continue;
                        }
                        let Some(id) = param.pattern.simple_name() else { continue };
                        let ty = self
                            .signature_of(key)
                            .ok()
                            .and_then(|s| s.params.get(index).map(|p| p.ty))
                            .unwrap_or(TypeId::ANY);
                        shape.insert_property(PropertyInfo {
                            name: Rc::clone(&id.name),
                            ty,
                            optional: param.optional,
                            readonly: param.readonly,
                            method: false,
                        });
                    }
                }
                ClassMember::Index(index) if !index.static_ => {
                    let key = self.resolve_annotation(&index.key_type, scope);
                    let info = IndexInfo {
                        key_name: Rc::clone(&index.key.name),
                        ty: self.resolve_annotation(&index.value_type, scope),
                        readonly: index.readonly,
                    };
                    if key == TypeId::NUMBER {
                        shape.number_index = Some(info);
                    } else {
                        shape.string_index = Some(info);
                    }
                }
                _ => {}
            }
        }
        self.add_method_groups(shape, methods);

        if let Some(base) = self.base_instance_type(symbol, class)
            && let Some(base_shape) = self.apparent_shape(base)
        {
            merge_shape(shape, &base_shape);
        }
    }

    fn class_property_type(&mut self, prop: &'a ClassProperty, scope: ScopeId) -> TypeId {
        if let Some(ann) = &prop.type_annotation {
            return self.resolve_annotation(ann, scope);
        }
        match &prop.value {
            Some(value) => {
                let ty = self.check_expression(value, scope, None);
                self.widen_for_declaration(ty)
            }
            None => TypeId::ANY,
        }
    }

    /// Instance type of the class named in `extends`.
    pub(crate) fn base_instance_type(&mut self, symbol: SymbolId, class: ClassRef<'a>) -> Option<TypeId> {
        let super_class = class.super_class()?;
        let outer = self
            .binder
            .class(symbol)
            .and_then(|info| self.binder.scope(info.scope))
            .and_then(|s| s.parent)?;
        let constructor = self.check_expression(super_class, outer, None);
        let base_symbol = match self.types.get(constructor) {
            TypeData::TypeofSymbol(base) => *base,
            _ => {
                let signatures = self.signatures_of_type(constructor, true);
                return signatures.first().map(|s| s.return_type);
            }
        };
        let scope = self.binder.class(symbol).map(|info| info.scope)?;
        let args: Vec<TypeId> = class
            .super_type_arguments()
            .iter()
            .flat_map(|args| args.params.iter())
            .map(|arg| self.resolve_annotation(arg, scope))
            .collect();
        Some(self.reference_type(base_symbol, args))
    }

    /// Static side of a class, enum or namespace.
    pub(crate) fn static_table(&mut self, symbol: SymbolId) -> Rc<ObjectShape> {
        if let Some(shape) = self.static_tables.get(&symbol) {
            return Rc::clone(shape);
        }
        // Placeholder against self-reference through static initializers.
        self.static_tables.insert(symbol, Rc::default());

        let mut shape = ObjectShape::default();
        for decl in self.decls_of(symbol) {
            match decl {
                Decl::Class { class, .. } => self.add_static_members(symbol, class, &mut shape),
                Decl::Enum { decl, .. } => {
                    for member in &decl.members {
                        let ty = self.types.enum_member(symbol, Rc::clone(&member.id.name));
                        let ty = self.types.fresh_literal(ty);
                        shape.insert_property(PropertyInfo {
                            name: Rc::clone(&member.id.name),
                            ty,
                            optional: false,
                            readonly: true,
                            method: false,
                        });
                    }
                }
                Decl::Namespace { .. } => {
                    for (name, member) in self.binder.namespace_values(symbol) {
                        if shape.properties.contains_key(&name) {
                            continue;
                        }
                        let ty = self.symbol_value_type(member);
                        shape.insert_property(PropertyInfo {
                            name,
                            ty,
                            optional: false,
                            readonly: false,
                            method: false,
                        });
                    }
                }
                _ => {}
            }
        }

        let shape = Rc::new(shape);
        self.static_tables.insert(symbol, Rc::clone(&shape));
        shape
    }

    fn add_static_members(&mut self, symbol: SymbolId, class: ClassRef<'a>, shape: &mut ObjectShape) {
        let Some(scope) = self.binder.class(symbol).map(|info| info.scope) else {
            return;
        };
        let file = self.file_of(scope);
        let type_params = self.declared_type_params(symbol);
        let instance = self.types.reference(symbol, type_params.clone());
        let mut methods = MethodGroups::default();
        let mut constructors = vec![];
        let mut implementation = None;

        for member in class.members() {
            match member {
                ClassMember::Method(method) if method.static_ => {
                    let Some(name) = method.key.static_name() else { continue };
                    let key = NodeKey::new(file, method.value.span.start);
                    let ty = match method.kind {
                        MethodKind::Method => {
                            let signature = self.signature_of(key).unwrap_or_else(|_| {
                                Rc::new(Signature::new(vec![], TypeId::ANY))
                            });
                            let entry = methods.entry(name).or_insert_with(|| (vec![], false));
                            entry.0.push(signature);
                            continue;
                        }
                        MethodKind::Get => self.return_type_of(key),
                        MethodKind::Set => TypeId::ANY,
                    };
                    shape.insert_property(PropertyInfo {
                        name,
                        ty,
                        optional: false,
                        readonly: false,
                        method: false,
                    });
                }
                ClassMember::MethodSignature(signature) if signature.static_ => {
                    let Some(name) = signature.key.static_name() else { continue };
                    let sig = self.signature_from_parts(
                        signature.type_parameters.as_ref(),
                        &signature.params,
                        signature.return_type.as_ref(),
                        scope,
                        &TypeEnv::default(),
                    );
                    let entry = methods.entry(name).or_insert_with(|| (vec![], false));
                    entry.0.push(Rc::new(sig));
                }
                ClassMember::Property(prop) if prop.static_ => {
                    let Some(name) = prop.key.static_name() else { continue };
                    let ty = self.class_property_type(prop, scope);
                    shape.insert_property(PropertyInfo {
                        name,
                        ty,
                        optional: prop.optional,
                        readonly: prop.readonly,
                        method: false,
                    });
                }
                ClassMember::Constructor(ctor) => {
                    let key = NodeKey::new(file, ctor.span.start);
                    let signature = match self.signature_of(key) {
                        Ok(signature) => signature,
                        Err(_) => continue,
                    };
                    let signature = Rc::new(Signature {
                        type_params: type_params.clone(),
                        params: signature.params.clone(),
                        return_type: instance,
                        predicate: None,
                    });
                    if ctor.body.is_some() {
                        implementation = Some(signature);
                    } else {
                        constructors.push(signature);
                    }
                }
                _ => {}
            }
        }
        self.add_method_groups(shape, methods);

        if constructors.is_empty() {
            constructors.extend(implementation);
        }
        if constructors.is_empty() {
            constructors = self.inherited_constructors(symbol, class, &type_params, instance);
        }
        shape.construct_signatures = constructors;
        shape.insert_property(PropertyInfo {
            name: Rc::from("prototype"),
            ty: instance,
            optional: false,
            readonly: true,
            method: false,
        });

        if let Some(super_class) = class.super_class()
            && let Some(outer) = self.binder.scope(scope).and_then(|s| s.parent)
        {
            let base = self.check_expression(super_class, outer, None);
            if let TypeData::TypeofSymbol(base_symbol) = *self.types.get(base) {
                let base_statics = self.static_table(base_symbol);
                for (name, prop) in &base_statics.properties {
                    if !shape.properties.contains_key(name) && &**name != "prototype" {
                        shape.insert_property(prop.clone());
                    }
                }
            }
        }
    }

    /// Derived classes without a constructor take the base's parameters.
    fn inherited_constructors(
        &mut self,
        symbol: SymbolId,
        class: ClassRef<'a>,
        type_params: &[TypeId],
        instance: TypeId,
    ) -> Vec<Rc<Signature>> {
        let base = class.super_class().and_then(|super_class| {
            let outer = self
                .binder
                .class(symbol)
                .and_then(|info| self.binder.scope(info.scope))
                .and_then(|s| s.parent)?;
            Some(self.check_expression(super_class, outer, None))
        });
        let base_signatures = match base {
            Some(base) => self.signatures_of_type(base, true),
            None => vec![],
        };
        if base_signatures.is_empty() {
            return vec![Rc::new(Signature {
                type_params: type_params.to_vec(),
                params: vec![],
                return_type: instance,
                predicate: None,
            })];
        }
        base_signatures
            .iter()
            .map(|base| {
                Rc::new(Signature {
                    type_params: type_params.to_vec(),
                    params: base.params.clone(),
                    return_type: instance,
                    predicate: None,
                })
            })
            .collect()
    }

    /// The members visible on a value of type `ty`, if it has any.
    pub(crate) fn apparent_shape(&mut self, ty: TypeId) -> Option<Rc<ObjectShape>> {
        if let Some(shape) = self.apparent_shapes.get(&ty) {
            return Some(Rc::clone(shape));
        }
        if !self.enter() {
            return None;
        }
        let shape = self.compute_apparent_shape(ty);
        self.leave();
        let shape = shape?;
        self.apparent_shapes.insert(ty, Rc::clone(&shape));
        Some(shape)
    }

    fn compute_apparent_shape(&mut self, ty: TypeId) -> Option<Rc<ObjectShape>> {
        match self.types.get(ty).clone() {
            TypeData::Object(id) => Some(self.types.shape(id)),
            TypeData::Reference(symbol, args) => {
                let table = self.member_table(symbol);
                let params = self.declared_type_params(symbol);
                if params.is_empty() {
                    return Some(table);
                }
                let mapping: FxHashMap<TypeId, TypeId> =
                    params.into_iter().zip(args.iter().copied()).collect();
                Some(Rc::new(self.instantiate_shape(&table, &mapping)))
            }
            TypeData::Array(element) => {
                let symbol = self.binder.global_type("Array")?;
                let reference = self.types.reference(symbol, vec![element]);
                self.apparent_shape(reference)
            }
            TypeData::Tuple(elements, _) => {
                let members = elements.iter().map(|e| e.ty).collect();
                let element = self.union(members);
                let array = self.types.array(element);
                let mut shape = self.apparent_shape(array).map(|s| (*s).clone()).unwrap_or_default();
                for (index, element) in elements.iter().enumerate() {
                    shape.insert_property(PropertyInfo {
                        name: Rc::from(index.to_string().as_str()),
                        ty: element.ty,
                        optional: element.optional,
                        readonly: false,
                        method: false,
                    });
                }
                if !elements.iter().any(|e| e.rest || e.optional) {
                    let length = self.types.number_literal(elements.len() as f64);
                    shape.insert_property(PropertyInfo {
                        name: Rc::from("length"),
                        ty: length,
                        optional: false,
                        readonly: true,
                        method: false,
                    });
                }
                Some(Rc::new(shape))
            }
            TypeData::StringLiteral(_) => self.wrapper_shape("String"),
            TypeData::NumberLiteral(_) | TypeData::Enum(_) | TypeData::EnumMember(..) => {
                self.wrapper_shape("Number")
            }
            TypeData::BigIntLiteral(_) => self.wrapper_shape("BigInt"),
            TypeData::Intrinsic(_) => match self.types.regular_of(ty) {
                TypeId::STRING => self.wrapper_shape("String"),
                TypeId::NUMBER => self.wrapper_shape("Number"),
                TypeId::BOOLEAN | TypeId::TRUE | TypeId::FALSE => self.wrapper_shape("Boolean"),
                TypeId::BIGINT => self.wrapper_shape("BigInt"),
                TypeId::SYMBOL => self.wrapper_shape("Symbol"),
                TypeId::OBJECT => self.wrapper_shape("Object"),
                _ => None,
            },
            TypeData::TypeofSymbol(symbol) => Some(self.static_table(symbol)),
            TypeData::TypeParameter(_) => {
                let constraint = self.type_param_constraint(ty)?;
                self.apparent_shape(constraint)
            }
            TypeData::Intersection(members) => {
                let mut shape = ObjectShape::default();
                for member in members.iter() {
                    if let Some(member_shape) = self.apparent_shape(*member) {
                        merge_shape(&mut shape, &member_shape);
                    }
                }
                Some(Rc::new(shape))
            }
            TypeData::Union(..) | TypeData::Alias(..) => None,
        }
    }

    fn wrapper_shape(&mut self, name: &str) -> Option<Rc<ObjectShape>> {
        let symbol = self.binder.global_type(name)?;
        let reference = self.types.reference(symbol, vec![]);
        self.apparent_shape(reference)
    }

    /// Type of property `name` on a value of type `ty`.
    pub(crate) fn property_type(&mut self, ty: TypeId, name: &str) -> Option<TypeId> {
        match self.types.get(ty) {
            TypeData::Intrinsic(_) if ty == TypeId::ANY => return Some(TypeId::ANY),
            TypeData::Union(..) => {
                let members = self.types.constituents(ty);
                let found: Vec<TypeId> = members
                    .into_iter()
                    .filter(|m| !m.is_nullable())
                    .filter_map(|m| self.property_type(m, name))
                    .collect();
                return if found.is_empty() {
                    None
                } else {
                    Some(self.union(found))
                };
            }
            _ => {}
        }

        let shape = self.apparent_shape(ty)?;
        if let Some(prop) = shape.property(name) {
            return Some(prop.ty);
        }
        if name.parse::<f64>().is_ok()
            && let Some(index) = &shape.number_index
        {
            return Some(index.ty);
        }
        if let Some(index) = &shape.string_index {
            return Some(index.ty);
        }

        // Every object also has the members of `Function` (when callable)
        // and `Object`.
        let is_object_like = !matches!(
            self.types.get(ty),
            TypeData::Intrinsic(_) | TypeData::StringLiteral(_) | TypeData::NumberLiteral(_)
        );
        if (!shape.call_signatures.is_empty() || !shape.construct_signatures.is_empty())
            && let Some(function) = self.wrapper_shape("Function")
            && let Some(prop) = function.property(name)
        {
            return Some(prop.ty);
        }
        if is_object_like
            && let Some(object) = self.wrapper_shape("Object")
            && let Some(prop) = object.property(name)
        {
            return Some(prop.ty);
        }
        None
    }

    /// Element type of an array, tuple or other indexable type.
    pub(crate) fn element_type(&mut self, ty: TypeId) -> Option<TypeId> {
        match self.types.get(ty).clone() {
            TypeData::Array(element) => Some(element),
            TypeData::Tuple(elements, _) => {
                let members = elements
                    .iter()
                    .map(|e| match self.types.get(e.ty) {
                        TypeData::Array(inner) if e.rest => *inner,
                        _ => e.ty,
                    })
                    .collect();
                Some(self.union(members))
            }
            TypeData::Intrinsic(_) if ty == TypeId::ANY => Some(TypeId::ANY),
            TypeData::Intrinsic(_) | TypeData::StringLiteral(_) if self.is_string_like(ty) => {
                Some(TypeId::STRING)
            }
            TypeData::Union(..) => {
                let members = self.types.constituents(ty);
                let elements: Vec<TypeId> = members
                    .into_iter()
                    .filter_map(|m| self.element_type(m))
                    .collect();
                if elements.is_empty() {
                    None
                } else {
                    Some(self.union(elements))
                }
            }
            _ => {
                let shape = self.apparent_shape(ty)?;
                shape
                    .number_index
                    .as_ref()
                    .or(shape.string_index.as_ref())
                    .map(|index| index.ty)
            }
        }
    }

    fn tuple_element(&mut self, ty: TypeId, index: f64) -> Option<TypeId> {
        match self.types.get(ty) {
            TypeData::Tuple(elements, _) if index >= 0.0 && index.fract() == 0.0 => {
                let element = elements.get(index as usize)?;
                (!element.rest).then_some(element.ty)
            }
            _ => None,
        }
    }

    pub(crate) fn is_string_like(&self, ty: TypeId) -> bool {
        ty == TypeId::STRING || matches!(self.types.get(ty), TypeData::StringLiteral(_))
    }

    /// `await`: unwrap promise-like types, recursively.
    pub(crate) fn awaited_type(&mut self, ty: TypeId) -> TypeId {
        if !self.enter() {
            return TypeId::ANY;
        }
        let result = match self.types.get(ty).clone() {
            TypeData::TypeParameter(_) => match self.binder.global_type("Awaited") {
                Some(awaited) => self.types.deferred_alias(awaited, vec![ty]),
                None => ty,
            },
            TypeData::Union(..) => {
                let members = self.types.constituents(ty);
                let awaited = members.into_iter().map(|m| self.awaited_type(m)).collect();
                self.union(awaited)
            }
            TypeData::Reference(symbol, args) if self.is_promise_like(symbol) => {
                match args.first() {
                    Some(&inner) => self.awaited_type(inner),
                    None => TypeId::ANY,
                }
            }
            _ => ty,
        };
        self.leave();
        result
    }

    fn is_promise_like(&self, symbol: SymbolId) -> bool {
        ["Promise", "PromiseLike"]
            .iter()
            .any(|name| self.binder.global_type(name) == Some(symbol))
    }

    /// Instantiated base types named in an interface's `extends` clauses or
    /// a class's `extends`.
    pub(crate) fn base_types(&mut self, ty: TypeId) -> Vec<TypeId> {
        let TypeData::Reference(symbol, args) = self.types.get(ty).clone() else {
            return vec![];
        };
        let params = self.declared_type_params(symbol);
        let mapping: FxHashMap<TypeId, TypeId> =
            params.iter().copied().zip(args.iter().copied()).collect();
        let mut bases = vec![];
        for decl in self.decls_of(symbol) {
            match decl {
                Decl::Interface { decl, scope } => {
                    let mut env = TypeEnv::default();
                    if let Some(own) = &decl.type_parameters {
                        for (param, &canonical) in own.params.iter().zip(&params) {
                            env.insert(Rc::clone(&param.name.name), canonical);
                        }
                    }
                    for base in &decl.extends {
                        let base = self.resolve_type_reference(base, scope, &env);
                        bases.push(self.instantiate(base, &mapping));
                    }
                }
                Decl::Class { class, .. } => {
                    if let Some(base) = self.base_instance_type(symbol, class) {
                        bases.push(self.instantiate(base, &mapping));
                    }
                }
                _ => {}
            }
        }
        bases
    }
}

fn keyword_type(keyword: TypeKeywordKind) -> TypeId {
    match keyword {
        TypeKeywordKind::Any => TypeId::ANY,
        TypeKeywordKind::Unknown => TypeId::UNKNOWN,
        TypeKeywordKind::Never => TypeId::NEVER,
        TypeKeywordKind::Void => TypeId::VOID,
        TypeKeywordKind::Null => TypeId::NULL,
        TypeKeywordKind::Undefined => TypeId::UNDEFINED,
        TypeKeywordKind::Boolean => TypeId::BOOLEAN,
        TypeKeywordKind::Number => TypeId::NUMBER,
        TypeKeywordKind::String => TypeId::STRING,
        TypeKeywordKind::Symbol => TypeId::SYMBOL,
        TypeKeywordKind::BigInt => TypeId::BIGINT,
        TypeKeywordKind::Object => TypeId::OBJECT,
    }
}

/// Add the members of `from` that `into` does not already declare.
fn merge_shape(into: &mut ObjectShape, from: &ObjectShape) {
    for (name, prop) in &from.properties {
        if !into.properties.contains_key(name) {
            into.insert_property(prop.clone());
        }
    }
    if into.call_signatures.is_empty() {
        into.call_signatures = from.call_signatures.clone();
    }
    if into.construct_signatures.is_empty() {
        into.construct_signatures = from.construct_signatures.clone();
    }
    if into.string_index.is_none() {
        into.string_index = from.string_index.clone();
    }
    if into.number_index.is_none() {
        into.number_index = from.number_index.clone();
    }
}

fn collect_infer_names(ann: &TypeAnnotation, names: &mut Vec<Atom>) {
    match ann {
        TypeAnnotation::Infer(infer) => names.push(Rc::clone(&infer.type_parameter.name.name)),
        TypeAnnotation::Reference(r) => {
            for arg in r.type_arguments.iter().flat_map(|a| a.params.iter()) {
                collect_infer_names(arg, names);
            }
        }
        TypeAnnotation::Array(a) => collect_infer_names(&a.element_type, names),
        TypeAnnotation::Tuple(t) => {
            for element in &t.element_types {
                collect_infer_names(&element.type_annotation, names);
            }
        }
        TypeAnnotation::Union(u) => u.types.iter().for_each(|t| collect_infer_names(t, names)),
        TypeAnnotation::Intersection(i) => {
            i.types.iter().for_each(|t| collect_infer_names(t, names))
        }
        TypeAnnotation::Function(f) => {
            for param in &f.params {
                if let Some(ty) = param.declared_type() {
                    collect_infer_names(ty, names);
                }
            }
            collect_infer_names(&f.return_type, names);
        }
        TypeAnnotation::Object(o) => {
            for member in &o.members {
                match member {
                    TypeMember::Property(p) => {
                        if let Some(ty) = &p.type_annotation {
                            collect_infer_names(ty, names);
                        }
                    }
                    TypeMember::Method(m) => {
                        if let Some(ty) = &m.return_type {
                            collect_infer_names(ty, names);
                        }
                    }
                    _ => {}
                }
            }
        }
        TypeAnnotation::Parenthesized(p) => collect_infer_names(&p.type_annotation, names),
        _ => {}
    }
}

pub(crate) fn is_this_param(param: &FunctionParam) -> bool {
    matches!(&param.pattern, Pattern::Identifier(id) if &*id.name == "this")
}

/// Parameter name as it appears in a printed signature.
pub(crate) fn param_display_name(pattern: &Pattern) -> Atom {
    match pattern {
        Pattern::Identifier(id) => Rc::clone(&id.name),
        Pattern::Assignment(assign) => param_display_name(&assign.left),
        Pattern::Rest(rest) => param_display_name(&rest.argument),
        Pattern::Object(object) => {
            let names: Vec<String> = object
                .properties
                .iter()
                .map(|p| match p {
                    ObjectPatternProperty::KeyValue {
                        key,
                        value,
                        shorthand,
                        ..
                    } => {
                        let key = key.static_name().map(|k| k.to_string()).unwrap_or_default();
                        if *shorthand {
                            key
                        } else {
                            format!("{key}: {}", param_display_name(value))
                        }
                    }
                    ObjectPatternProperty::Rest(rest) => {
                        format!("...{}", param_display_name(&rest.argument))
                    }
                })
                .collect();
            if names.is_empty() {
                Rc::from("{}")
            } else {
                Rc::from(format!("{{ {} }}", names.join(", ")).as_str())
            }
        }
        Pattern::Array(array) => {
            let names: Vec<String> = array
                .elements
                .iter()
                .map(|e| match e {
                    Some(Pattern::Rest(rest)) => format!("...{}", param_display_name(&rest.argument)),
                    Some(p) => param_display_name(p).to_string(),
                    None => String::new(),
                })
                .collect();
            Rc::from(format!("[{}]", names.join(", ")).as_str())
        }
    }
}
