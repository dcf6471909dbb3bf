//! Call resolution and generic inference.
//!
//! Overloads are tried in declaration order. Arguments that need a
//! contextual type to be typed at all (untyped callbacks, literals holding
//! them) are skipped while choosing a candidate; once one is chosen, they are
//! typed against its parameters instantiated with what has been inferred so
//! far, and contribute their own inferences before the final instantiation.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::types::{Intrinsic, ObjectShape, ParamInfo, PropertyInfo, Signature, TupleElement, TypeData};
use super::{ProgramContext, ScopeId, TypeId};
use crate::ast::{Argument, ArrayElement, ArrowFunctionBody, Expression, ObjectProperty, TypeArguments};

pub(crate) type TypeMapping = FxHashMap<TypeId, TypeId>;

/// Interfaces whose single type argument is the element type of an array.
const ITERABLE_LIKE: [&str; 6] = [
    "Iterable",
    "ArrayLike",
    "ReadonlyArray",
    "IterableIterator",
    "ConcatArray",
    "Array",
];

/// What has been learned about one type parameter.
#[derive(Debug, Clone)]
struct Inference {
    param: TypeId,
    candidates: Vec<TypeId>,
    contra_candidates: Vec<TypeId>,
    /// Every candidate came from a parameter typed as the bare type parameter.
    top_level: bool,
}

/// Inference state for one generic signature.
pub(crate) struct Inferences {
    entries: Vec<Inference>,
    /// Parameter type the current argument is inferred against.
    root: TypeId,
    visited: Vec<(TypeId, TypeId)>,
}

impl Inferences {
    pub(crate) fn new(params: &[TypeId]) -> Self {
        Self {
            entries: params
                .iter()
                .map(|&param| Inference {
                    param,
                    candidates: vec![],
                    contra_candidates: vec![],
                    top_level: true,
                })
                .collect(),
            root: TypeId::UNKNOWN,
            visited: vec![],
        }
    }

    fn is_param(&self, ty: TypeId) -> bool {
        self.entries.iter().any(|e| e.param == ty)
    }

    fn entry_mut(&mut self, ty: TypeId) -> Option<&mut Inference> {
        self.entries.iter_mut().find(|e| e.param == ty)
    }

    fn entry(&self, ty: TypeId) -> Option<&Inference> {
        self.entries.iter().find(|e| e.param == ty)
    }
}

impl<'a> ProgramContext<'a> {
    // ----- instantiation -----

    pub(crate) fn instantiate(&mut self, ty: TypeId, mapping: &TypeMapping) -> TypeId {
        if mapping.is_empty() {
            return ty;
        }
        if !self.enter() {
            return ty;
        }
        let result = self.instantiate_inner(ty, mapping);
        self.leave();
        result
    }

    fn instantiate_inner(&mut self, ty: TypeId, mapping: &TypeMapping) -> TypeId {
        match self.types.get(ty).clone() {
            TypeData::TypeParameter(_) => mapping.get(&ty).copied().unwrap_or(ty),
            TypeData::Union(members, tag) => {
                let instantiated: Vec<TypeId> =
                    members.iter().map(|&m| self.instantiate(m, mapping)).collect();
                if instantiated.as_slice() == &*members {
                    return ty;
                }
                let union = self.union(instantiated);
                match tag {
                    Some(tag) => {
                        let args = tag.args.iter().map(|&a| self.instantiate(a, mapping)).collect();
                        self.types.with_alias(
                            union,
                            super::types::AliasTag {
                                symbol: tag.symbol,
                                args,
                            },
                        )
                    }
                    None => union,
                }
            }
            TypeData::Intersection(members) => {
                let instantiated = members.iter().map(|&m| self.instantiate(m, mapping)).collect();
                self.intersection(instantiated)
            }
            TypeData::Array(element) => {
                let element = self.instantiate(element, mapping);
                self.types.array(element)
            }
            TypeData::Tuple(elements, readonly) => {
                let elements = elements
                    .iter()
                    .map(|e| TupleElement {
                        ty: self.instantiate(e.ty, mapping),
                        ..e.clone()
                    })
                    .collect();
                self.types.tuple(elements, readonly)
            }
            TypeData::Reference(symbol, args) => {
                let args = args.iter().map(|&a| self.instantiate(a, mapping)).collect();
                self.types.reference(symbol, args)
            }
            TypeData::Alias(symbol, args) => {
                let args = args.iter().map(|&a| self.instantiate(a, mapping)).collect();
                self.alias_instance(symbol, args)
            }
            TypeData::Object(id) => {
                let shape = self.types.shape(id);
                let Some(instantiated) = self.instantiate_shape_if_changed(&shape, mapping) else {
                    return ty;
                };
                let tag = self.types.alias_of(ty).cloned();
                let object = self.types.object(instantiated);
                match tag {
                    Some(tag) => {
                        let args = tag.args.iter().map(|&a| self.instantiate(a, mapping)).collect();
                        self.types.with_alias(
                            object,
                            super::types::AliasTag {
                                symbol: tag.symbol,
                                args,
                            },
                        )
                    }
                    None => object,
                }
            }
            _ => ty,
        }
    }

    pub(crate) fn instantiate_shape(&mut self, shape: &ObjectShape, mapping: &TypeMapping) -> ObjectShape {
        self.instantiate_shape_if_changed(shape, mapping)
            .unwrap_or_else(|| shape.clone())
    }

    fn instantiate_shape_if_changed(
        &mut self,
        shape: &ObjectShape,
        mapping: &TypeMapping,
    ) -> Option<ObjectShape> {
        let mut changed = false;
        let mut result = ObjectShape::default();
        for prop in shape.properties.values() {
            let ty = self.instantiate(prop.ty, mapping);
            changed |= ty != prop.ty;
            result.insert_property(PropertyInfo { ty, ..prop.clone() });
        }
        for (from, into) in [
            (&shape.call_signatures, &mut result.call_signatures),
            (&shape.construct_signatures, &mut result.construct_signatures),
        ] {
            for signature in from {
                let instantiated = self.instantiate_signature(signature, mapping, true);
                if signature_changed(signature, &instantiated) {
                    changed = true;
                    into.push(Rc::new(instantiated));
                } else {
                    into.push(Rc::clone(signature));
                }
            }
        }
        for (from, into) in [
            (&shape.string_index, &mut result.string_index),
            (&shape.number_index, &mut result.number_index),
        ] {
            if let Some(index) = from {
                let ty = self.instantiate(index.ty, mapping);
                changed |= ty != index.ty;
                *into = Some(super::types::IndexInfo { ty, ..index.clone() });
            }
        }
        changed.then_some(result)
    }

    /// Substitute `mapping` into a signature. With `keep_type_params` the
    /// signature stays generic in its own parameters.
    pub(crate) fn instantiate_signature(
        &mut self,
        signature: &Signature,
        mapping: &TypeMapping,
        keep_type_params: bool,
    ) -> Signature {
        let params = signature
            .params
            .iter()
            .map(|p| ParamInfo {
                ty: self.instantiate(p.ty, mapping),
                ..p.clone()
            })
            .collect();
        let return_type = self.instantiate(signature.return_type, mapping);
        let predicate = signature
            .predicate
            .as_ref()
            .map(|(name, ty)| (Rc::clone(name), self.instantiate(*ty, mapping)));
        Signature {
            type_params: if keep_type_params {
                signature.type_params.clone()
            } else {
                vec![]
            },
            params,
            return_type,
            predicate,
        }
    }

    // ----- inference -----

    /// Infer `params` by matching `source` against `target`, as `infer`
    /// declarations in a conditional type do.
    pub(crate) fn infer_from_types(
        &mut self,
        source: TypeId,
        target: TypeId,
        params: &[TypeId],
    ) -> Vec<TypeId> {
        let mut inferences = Inferences::new(params);
        inferences.root = target;
        self.unify(source, target, &mut inferences, false);
        inferences
            .entries
            .into_iter()
            .map(|entry| {
                if entry.candidates.is_empty() {
                    entry.contra_candidates.first().copied().unwrap_or(TypeId::UNKNOWN)
                } else {
                    self.common_supertype(entry.candidates)
                }
            })
            .collect()
    }

    pub(crate) fn unify(
        &mut self,
        source: TypeId,
        target: TypeId,
        inferences: &mut Inferences,
        contra: bool,
    ) {
        if source == target || source == TypeId::NEVER && !contra {
            return;
        }
        if inferences.visited.contains(&(source, target)) {
            return;
        }
        if !self.enter() {
            return;
        }
        inferences.visited.push((source, target));
        self.unify_inner(source, target, inferences, contra);
        inferences.visited.pop();
        self.leave();
    }

    fn unify_inner(&mut self, source: TypeId, target: TypeId, inferences: &mut Inferences, contra: bool) {
        let at_top_level = is_type_param_at_top_level(&self.types, inferences.root, target);
        if let Some(entry) = inferences.entry_mut(target) {
            entry.top_level &= at_top_level;
            let list = if contra {
                &mut entry.contra_candidates
            } else {
                &mut entry.candidates
            };
            if !list.contains(&source) {
                list.push(source);
            }
            return;
        }

        let source_data = self.types.get(source).clone();
        let target_data = self.types.get(target).clone();

        if let TypeData::Union(targets, _) = &target_data {
            let (naked, others): (Vec<TypeId>, Vec<TypeId>) = targets
                .iter()
                .partition(|&&t| inferences.is_param(t));
            for &other in &others {
                self.unify(source, other, inferences, contra);
            }
            if let [param] = naked.as_slice() {
                // `T | undefined`: T takes whatever the other members don't.
                let sources = self.types.constituents(source);
                let mut rest = vec![];
                for s in sources {
                    let matched = others.iter().any(|&o| {
                        self.types.regular_of(s) == self.types.regular_of(o) || self.is_literal_of(s, o)
                    });
                    if !matched {
                        rest.push(s);
                    }
                }
                if !rest.is_empty() {
                    let remaining = self.union(rest);
                    self.unify(remaining, *param, inferences, contra);
                }
            } else {
                for param in naked {
                    self.unify(source, param, inferences, contra);
                }
            }
            return;
        }

        if let TypeData::Union(sources, _) = &source_data {
            for &s in sources.iter() {
                self.unify(s, target, inferences, contra);
            }
            return;
        }

        match (&source_data, &target_data) {
            (TypeData::Array(s), TypeData::Array(t)) => self.unify(*s, *t, inferences, contra),
            (TypeData::Tuple(elements, _), TypeData::Array(t)) => {
                for element in elements.iter() {
                    self.unify(element.ty, *t, inferences, contra);
                }
            }
            (TypeData::Tuple(sources, _), TypeData::Tuple(targets, _)) => {
                for (s, t) in sources.iter().zip(targets.iter()) {
                    self.unify(s.ty, t.ty, inferences, contra);
                }
            }
            (TypeData::Array(_) | TypeData::Tuple(..), TypeData::Reference(symbol, args))
                if self.is_iterable_like(*symbol) =>
            {
                if let (Some(&target_element), 1) = (args.first(), args.len())
                    && let Some(element) = self.element_type(source)
                {
                    self.unify(element, target_element, inferences, contra);
                }
            }
            (TypeData::Reference(s, source_args), TypeData::Reference(t, target_args)) if s == t => {
                for (&a, &b) in source_args.iter().zip(target_args.iter()) {
                    self.unify(a, b, inferences, contra);
                }
            }
            (TypeData::Alias(s, source_args), TypeData::Alias(t, target_args)) if s == t => {
                for (&a, &b) in source_args.iter().zip(target_args.iter()) {
                    self.unify(a, b, inferences, contra);
                }
            }
            (TypeData::Reference(..), TypeData::Reference(..)) => {
                let bases = self.base_types(source);
                if bases.is_empty() {
                    self.unify_structure(source, target, inferences, contra);
                }
                for base in bases {
                    self.unify(base, target, inferences, contra);
                }
            }
            (_, TypeData::Intersection(targets)) => {
                for &t in targets.iter() {
                    self.unify(source, t, inferences, contra);
                }
            }
            (_, TypeData::Object(_) | TypeData::Reference(..)) => {
                self.unify_structure(source, target, inferences, contra);
            }
            _ => {}
        }
    }

    fn is_literal_of(&self, literal: TypeId, base: TypeId) -> bool {
        match self.types.get(literal) {
            TypeData::StringLiteral(_) => base == TypeId::STRING,
            TypeData::NumberLiteral(_) => base == TypeId::NUMBER,
            TypeData::BigIntLiteral(_) => base == TypeId::BIGINT,
            TypeData::Intrinsic(Intrinsic::True | Intrinsic::False) => base == TypeId::BOOLEAN,
            _ => false,
        }
    }

    fn is_iterable_like(&self, symbol: super::SymbolId) -> bool {
        ITERABLE_LIKE
            .iter()
            .any(|name| self.binder.global_type(name) == Some(symbol))
    }

    /// Infer from matching members and signatures.
    fn unify_structure(&mut self, source: TypeId, target: TypeId, inferences: &mut Inferences, contra: bool) {
        let Some(target_shape) = self.apparent_shape(target) else {
            return;
        };
        if matches!(self.types.get(source), TypeData::Intrinsic(_)) {
            return;
        }
        for (name, prop) in &target_shape.properties {
            if let Some(ty) = self.property_type(source, name) {
                self.unify(ty, prop.ty, inferences, contra);
            }
        }
        let Some(source_shape) = self.apparent_shape(source) else {
            return;
        };
        for (sources, targets) in [
            (&source_shape.call_signatures, &target_shape.call_signatures),
            (&source_shape.construct_signatures, &target_shape.construct_signatures),
        ] {
            if let (Some(s), Some(t)) = (sources.last(), targets.last()) {
                self.unify_signatures(s, t, inferences, contra);
            }
        }
        if let (Some(s), Some(t)) = (&source_shape.string_index, &target_shape.string_index) {
            self.unify(s.ty, t.ty, inferences, contra);
        }
        if let (Some(s), Some(t)) = (&source_shape.number_index, &target_shape.number_index) {
            self.unify(s.ty, t.ty, inferences, contra);
        }
    }

    fn unify_signatures(
        &mut self,
        source: &Signature,
        target: &Signature,
        inferences: &mut Inferences,
        contra: bool,
    ) {
        for (index, param) in source.params.iter().enumerate() {
            let Some(target_param) = param_type_at(self, target, index) else {
                break;
            };
            let source_param = if param.rest {
                self.element_type(param.ty).unwrap_or(TypeId::ANY)
            } else {
                param.ty
            };
            self.unify(source_param, target_param, inferences, !contra);
        }
        self.unify(source.return_type, target.return_type, inferences, contra);
    }

    /// Pick a type for every inferred parameter of `signature`.
    fn inferred_mapping(
        &mut self,
        signature: &Signature,
        inferences: &Inferences,
        partial: bool,
    ) -> TypeMapping {
        let mut mapping = TypeMapping::default();
        for &param in &signature.type_params {
            let entry = inferences.entry(param).cloned();
            let candidates = entry.as_ref().map(|e| e.candidates.clone()).unwrap_or_default();
            let contra_first = entry.as_ref().and_then(|e| e.contra_candidates.first().copied());
            let inferred = if !candidates.is_empty() {
                let widen = entry.as_ref().is_some_and(|e| e.top_level)
                    && !self.has_primitive_constraint(param)
                    && !is_type_param_at_top_level(&self.types, signature.return_type, param);
                let candidates: Vec<TypeId> = if widen {
                    candidates.iter().map(|&c| self.widen_literal(c)).collect()
                } else if self.has_primitive_constraint(param) {
                    candidates.iter().map(|&c| self.types.regular_of(c)).collect()
                } else {
                    candidates
                };
                let common = self.common_supertype(candidates);
                if self.strict() { common } else { widen_nullable(common) }
            } else if let Some(first) = contra_first {
                first
            } else if partial {
                TypeId::UNKNOWN
            } else {
                match self.type_param_default(param) {
                    Some(default) => self.instantiate(default, &mapping),
                    None => match self.type_param_constraint(param) {
                        Some(constraint) => self.instantiate(constraint, &mapping),
                        None => TypeId::UNKNOWN,
                    },
                }
            };
            mapping.insert(param, inferred);
        }
        mapping
    }

    fn has_primitive_constraint(&self, param: TypeId) -> bool {
        self.type_param_constraint(param).is_some_and(|c| {
            self.types.constituents(c).iter().any(|&m| {
                matches!(m, TypeId::STRING | TypeId::NUMBER | TypeId::BIGINT | TypeId::BOOLEAN)
                    || self.types.is_literal(m)
            })
        })
    }

    /// Literals sharing a primitive combine into their union; otherwise the
    /// leftmost candidate every other candidate is assignable to wins.
    pub(crate) fn common_supertype(&mut self, candidates: Vec<TypeId>) -> TypeId {
        match candidates.as_slice() {
            [] => return TypeId::UNKNOWN,
            [single] => return *single,
            _ => {}
        }
        let non_nullable: Vec<TypeId> = candidates.iter().copied().filter(|t| !t.is_nullable()).collect();
        let Some(&first) = non_nullable.first() else {
            return self.union(candidates);
        };
        let first_base = self.types.base_of_literal(first);
        let same_base = non_nullable
            .iter()
            .all(|&c| self.types.is_unit(c) && self.types.base_of_literal(c) == first_base);
        if same_base {
            let mut members = non_nullable;
            if self.strict() {
                members.extend(candidates.iter().copied().filter(|t| t.is_nullable()));
            }
            return self.union(members);
        }
        let supertype = non_nullable
            .iter()
            .copied()
            .find(|&s| non_nullable.iter().all(|&t| self.is_assignable(t, s)))
            .unwrap_or(first);
        if self.strict() && candidates.iter().any(|t| t.is_nullable()) {
            let mut members = vec![supertype];
            members.extend(candidates.iter().copied().filter(|t| t.is_nullable()));
            return self.union(members);
        }
        supertype
    }

    // ----- signatures -----

    /// Call or construct signatures of a value of type `ty`.
    pub(crate) fn signatures_of_type(&mut self, ty: TypeId, construct: bool) -> Vec<Rc<Signature>> {
        let pick = |shape: &ObjectShape| {
            if construct {
                shape.construct_signatures.clone()
            } else {
                shape.call_signatures.clone()
            }
        };
        match self.types.get(ty).clone() {
            TypeData::Object(id) => pick(&self.types.shape(id)),
            TypeData::Union(members, _) => members
                .iter()
                .map(|&m| self.signatures_of_type(m, construct))
                .find(|signatures| !signatures.is_empty())
                .unwrap_or_default(),
            TypeData::Intersection(members) => members
                .iter()
                .flat_map(|&m| self.signatures_of_type(m, construct))
                .collect(),
            TypeData::TypeParameter(_) => match self.type_param_constraint(ty) {
                Some(constraint) => self.signatures_of_type(constraint, construct),
                None => vec![],
            },
            TypeData::Alias(..) => vec![],
            _ if ty == TypeId::ANY => vec![],
            _ => self
                .apparent_shape(ty)
                .map(|shape| pick(&shape))
                .unwrap_or_default(),
        }
    }

    /// Resolve a call or `new` and return the type it produces.
    pub(crate) fn resolve_call(
        &mut self,
        callee: TypeId,
        arguments: &'a [Argument],
        type_arguments: Option<&'a TypeArguments>,
        scope: ScopeId,
        construct: bool,
    ) -> TypeId {
        let signatures = self.signatures_of_type(callee, construct);
        if signatures.is_empty() {
            if callee != TypeId::ANY {
                trace!(construct, "callee has no signatures");
            }
            // Still type the arguments so callbacks inside get checked.
            for argument in arguments {
                if let Argument::Expression(expr) = argument {
                    self.check_expression(expr, scope, None);
                }
            }
            return TypeId::ANY;
        }

        let has_spread = arguments.iter().any(|a| matches!(a, Argument::Spread(_)));
        let explicit: Vec<TypeId> = type_arguments
            .iter()
            .flat_map(|args| args.params.iter())
            .map(|arg| self.resolve_annotation(arg, scope))
            .collect();

        // Arguments that can be typed without a contextual type.
        let plain: Vec<Option<TypeId>> = arguments
            .iter()
            .map(|argument| match argument {
                Argument::Expression(expr) if is_context_sensitive(expr) => None,
                Argument::Expression(expr) => Some(self.check_expression(expr, scope, None)),
                Argument::Spread(spread) => {
                    let spread_type = self.check_expression(&spread.argument, scope, None);
                    Some(spread_type)
                }
            })
            .collect();

        // Explicit type arguments rule out overloads with a different
        // number of type parameters before value arity is considered.
        let signatures = if explicit.is_empty() {
            signatures
        } else {
            let by_type_arity: Vec<Rc<Signature>> = signatures
                .iter()
                .filter(|s| self.accepts_type_arguments(s, explicit.len()))
                .cloned()
                .collect();
            if by_type_arity.is_empty() { signatures } else { by_type_arity }
        };
        let by_arity: Vec<Rc<Signature>> = signatures
            .iter()
            .filter(|s| has_spread || s.accepts_arity(arguments.len()))
            .cloned()
            .collect();
        let pool = if by_arity.is_empty() { signatures } else { by_arity };

        let mut chosen = None;
        for candidate in &pool {
            let (instantiated, inferences) =
                self.instantiate_candidate(candidate, arguments, &plain, &explicit);
            if self.arguments_fit(&instantiated, arguments, &plain) {
                chosen = Some((Rc::clone(candidate), inferences));
                break;
            }
        }
        let (signature, mut inferences) = match chosen {
            Some(found) => found,
            None => {
                let Some(first) = pool.first().map(Rc::clone) else {
                    return TypeId::ANY;
                };
                let (_, inferences) = self.instantiate_candidate(&first, arguments, &plain, &explicit);
                (first, inferences)
            }
        };

        let generic = !signature.type_params.is_empty() && explicit.is_empty();
        for (index, (argument, plain_type)) in arguments.iter().zip(&plain).enumerate() {
            let Argument::Expression(expr) = argument else { continue };
            if plain_type.is_some() {
                continue;
            }
            let Some(param_type) = param_type_at(self, &signature, index) else {
                self.check_expression(expr, scope, None);
                continue;
            };
            let contextual = if generic {
                let partial = self.inferred_mapping(&signature, &inferences, true);
                self.instantiate(param_type, &partial)
            } else {
                let mapping = self.explicit_mapping(&signature, &explicit);
                self.instantiate(param_type, &mapping)
            };
            let arg_type = self.check_expression(expr, scope, Some(contextual));
            if generic {
                inferences.root = param_type;
                inferences.visited.clear();
                self.unify(arg_type, param_type, &mut inferences, false);
            }
        }

        let mapping = if generic {
            self.inferred_mapping(&signature, &inferences, false)
        } else {
            self.explicit_mapping(&signature, &explicit)
        };
        self.instantiate(signature.return_type, &mapping)
    }

    /// Every type parameter without a default needs an argument, and there
    /// may not be more arguments than parameters.
    fn accepts_type_arguments(&self, signature: &Signature, count: usize) -> bool {
        let required = signature
            .type_params
            .iter()
            .take_while(|&&param| self.type_param_default(param).is_none())
            .count();
        required <= count && count <= signature.type_params.len()
    }

    fn explicit_mapping(&mut self, signature: &Signature, explicit: &[TypeId]) -> TypeMapping {
        let mut mapping = TypeMapping::default();
        for (index, &param) in signature.type_params.iter().enumerate() {
            let ty = match explicit.get(index) {
                Some(&ty) => ty,
                None => match self.type_param_default(param) {
                    Some(default) => self.instantiate(default, &mapping),
                    None => TypeId::UNKNOWN,
                },
            };
            mapping.insert(param, ty);
        }
        mapping
    }

    /// Instantiate a candidate from explicit type arguments, or from what the
    /// plainly typed arguments say about its type parameters.
    fn instantiate_candidate(
        &mut self,
        candidate: &Signature,
        arguments: &[Argument],
        plain: &[Option<TypeId>],
        explicit: &[TypeId],
    ) -> (Signature, Inferences) {
        let mut inferences = Inferences::new(&candidate.type_params);
        if candidate.type_params.is_empty() {
            return (candidate.clone(), inferences);
        }
        if !explicit.is_empty() {
            let mapping = self.explicit_mapping(candidate, explicit);
            return (self.instantiate_signature(candidate, &mapping, false), inferences);
        }
        for (index, (argument, plain_type)) in arguments.iter().zip(plain).enumerate() {
            let Some(arg_type) = *plain_type else { continue };
            let spread = matches!(argument, Argument::Spread(_));
            let Some(param_type) = param_type_at(self, candidate, index) else { continue };
            let source = if spread {
                self.element_type(arg_type).unwrap_or(TypeId::ANY)
            } else {
                arg_type
            };
            inferences.root = param_type;
            inferences.visited.clear();
            self.unify(source, param_type, &mut inferences, false);
        }
        let mapping = self.inferred_mapping(candidate, &inferences, false);
        (self.instantiate_signature(candidate, &mapping, false), inferences)
    }

    fn arguments_fit(&mut self, signature: &Signature, arguments: &[Argument], plain: &[Option<TypeId>]) -> bool {
        for (index, (argument, plain_type)) in arguments.iter().zip(plain).enumerate() {
            if matches!(argument, Argument::Spread(_)) {
                continue;
            }
            let Some(arg_type) = *plain_type else { continue };
            let Some(param_type) = param_type_at(self, signature, index) else {
                return false;
            };
            if !self.is_assignable(arg_type, param_type) {
                return false;
            }
        }
        true
    }
}

fn widen_nullable(ty: TypeId) -> TypeId {
    if ty.is_nullable() { TypeId::ANY } else { ty }
}

fn signature_changed(before: &Signature, after: &Signature) -> bool {
    before.return_type != after.return_type
        || before
            .params
            .iter()
            .zip(&after.params)
            .any(|(a, b)| a.ty != b.ty)
        || before.predicate.as_ref().map(|p| p.1) != after.predicate.as_ref().map(|p| p.1)
}

/// Type expected for the argument at `index`, looking into a rest parameter.
pub(crate) fn param_type_at(ctx: &mut ProgramContext<'_>, signature: &Signature, index: usize) -> Option<TypeId> {
    match signature.params.get(index) {
        Some(param) if !param.rest => Some(param.ty),
        _ => {
            let rest = signature.params.last().filter(|p| p.rest)?;
            let offset = index.checked_sub(signature.params.len() - 1)?;
            match ctx.types.get(rest.ty).clone() {
                TypeData::Tuple(elements, _) => elements.get(offset).map(|e| e.ty),
                _ => Some(ctx.element_type(rest.ty).unwrap_or(TypeId::ANY)),
            }
        }
    }
}

/// `T` occurs in `ty` as the type itself or a direct union or intersection
/// member.
fn is_type_param_at_top_level(types: &super::TypeInterner, ty: TypeId, param: TypeId) -> bool {
    if ty == param {
        return true;
    }
    match types.get(ty) {
        TypeData::Union(members, _) | TypeData::Intersection(members) => {
            members.iter().any(|&m| is_type_param_at_top_level(types, m, param))
        }
        _ => false,
    }
}

/// Whether typing `expr` depends on the type it is expected to have.
pub(crate) fn is_context_sensitive(expr: &Expression) -> bool {
    match expr {
        Expression::Function(function) => function.params.iter().any(|p| p.declared_type().is_none()),
        Expression::ArrowFunction(arrow) => {
            arrow.params.iter().any(|p| p.declared_type().is_none())
                || match arrow.body.as_ref() {
                    ArrowFunctionBody::Expression(body) => {
                        arrow.params.is_empty() && is_context_sensitive(body)
                    }
                    ArrowFunctionBody::Block(_) => false,
                }
        }
        Expression::Object(object) => object.properties.iter().any(|p| match p {
            ObjectProperty::Property(prop) => is_context_sensitive(&prop.value),
            ObjectProperty::Spread(_) => false,
        }),
        Expression::Array(array) => array.elements.iter().flatten().any(|e| match e {
            ArrayElement::Expression(e) => is_context_sensitive(e),
            ArrayElement::Spread(_) => false,
        }),
        Expression::Parenthesized(inner, _) => is_context_sensitive(inner),
        Expression::Conditional(conditional) => {
            is_context_sensitive(&conditional.consequent) || is_context_sensitive(&conditional.alternate)
        }
        _ => false,
    }
}
