//! Unions, widening and assignability.

use super::types::{Intrinsic, TypeData};
use super::{ProgramContext, TypeId};

impl<'a> ProgramContext<'a> {
    /// Union with literal reduction: `any` and `unknown` absorb everything,
    /// `never` disappears, and a literal next to its primitive is dropped.
    /// Without strict null checks `null` and `undefined` vanish unless they
    /// are all that is left.
    pub(crate) fn union(&mut self, members: Vec<TypeId>) -> TypeId {
        let mut distinct = members.clone();
        distinct.dedup();
        if let [single] = distinct.as_slice() {
            return *single;
        }

        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match self.types.get(member) {
                TypeData::Union(inner, _) => flat.extend(inner.iter().copied()),
                _ => flat.push(member),
            }
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|&t| t != TypeId::NEVER);
        if !self.strict() && flat.iter().any(|t| !t.is_nullable()) {
            flat.retain(|t| !t.is_nullable());
        }

        let has = |flat: &[TypeId], t: TypeId| flat.contains(&t);
        let keep: Vec<bool> = flat
            .iter()
            .map(|&t| match self.types.get(t) {
                TypeData::StringLiteral(_) => !has(&flat, TypeId::STRING),
                TypeData::NumberLiteral(_) => !has(&flat, TypeId::NUMBER),
                TypeData::BigIntLiteral(_) => !has(&flat, TypeId::BIGINT),
                TypeData::Intrinsic(Intrinsic::True | Intrinsic::False) => {
                    !has(&flat, TypeId::BOOLEAN)
                }
                TypeData::EnumMember(symbol, _) => !flat
                    .iter()
                    .any(|&o| matches!(self.types.get(o), TypeData::Enum(s) if s == symbol)),
                TypeData::Intrinsic(Intrinsic::Undefined) => !has(&flat, TypeId::VOID),
                _ => true,
            })
            .collect();
        let reduced = flat
            .into_iter()
            .zip(keep)
            .filter_map(|(t, keep)| keep.then_some(t))
            .collect();
        self.types.union_of(reduced)
    }

    /// Union that also drops members that are subtypes of other members,
    /// used where several expressions contribute to one inferred type.
    pub(crate) fn subtype_reduced_union(&mut self, members: Vec<TypeId>) -> TypeId {
        let union = self.union(members);
        let members = self.types.constituents(union);
        if members.len() < 2 {
            return union;
        }
        let mut kept = vec![];
        for (index, &member) in members.iter().enumerate() {
            if !self.is_structured(member) {
                kept.push(member);
                continue;
            }
            let absorbed = members.iter().enumerate().any(|(other_index, &other)| {
                other_index != index
                    && self.is_structured(other)
                    && self.is_assignable(member, other)
                    && (!self.is_assignable(other, member) || other_index < index)
            });
            if !absorbed {
                kept.push(member);
            }
        }
        if kept.len() == members.len() {
            return union;
        }
        self.types.union_of(kept)
    }

    fn is_structured(&self, ty: TypeId) -> bool {
        matches!(
            self.types.get(ty),
            TypeData::Object(_)
                | TypeData::Reference(..)
                | TypeData::Array(_)
                | TypeData::Tuple(..)
                | TypeData::TypeofSymbol(_)
        )
    }

    pub(crate) fn intersection(&mut self, members: Vec<TypeId>) -> TypeId {
        let mut flat = vec![];
        for member in members {
            match self.types.get(member) {
                TypeData::Intersection(inner) => flat.extend(inner.iter().copied()),
                _ => flat.push(member),
            }
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        flat.retain(|&t| t != TypeId::UNKNOWN);
        let mut seen = vec![];
        flat.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(*t);
                true
            }
        });
        self.types.intersection_of(flat)
    }

    /// Widen fresh literal types to their primitives, member by member.
    /// Literals that came from a declared type or `as const` stay.
    pub(crate) fn widen_literal(&mut self, ty: TypeId) -> TypeId {
        if self.types.alias_of(ty).is_some() {
            return ty;
        }
        match self.types.get(ty) {
            TypeData::Union(..) => {
                let members = self.types.constituents(ty);
                let widened = members
                    .into_iter()
                    .map(|m| self.types.widen_fresh(m))
                    .collect();
                self.union(widened)
            }
            _ => self.types.widen_fresh(ty),
        }
    }

    /// The type a mutable binding or property gets from its initializer.
    /// Without strict null checks `null` and `undefined` widen to `any`.
    pub(crate) fn widen_for_declaration(&mut self, ty: TypeId) -> TypeId {
        let widened = self.widen_literal(ty);
        if !self.strict() && widened.is_nullable() {
            return TypeId::ANY;
        }
        widened
    }

    pub(crate) fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        let source = self.types.regular_of(source);
        let target = self.types.regular_of(target);
        if source == target
            || target == TypeId::ANY
            || target == TypeId::UNKNOWN
            || source == TypeId::ANY
            || source == TypeId::NEVER
        {
            return true;
        }
        if source.is_nullable() && !self.strict() {
            return true;
        }
        if source == TypeId::UNDEFINED && target == TypeId::VOID {
            return true;
        }
        if let Some(&known) = self.assignable.get(&(source, target)) {
            return known;
        }
        if self.relating.contains(&(source, target)) {
            return true;
        }
        if !self.enter() {
            return true;
        }
        self.relating.push((source, target));
        let result = self.structured_assignable(source, target);
        self.relating.pop();
        self.leave();
        self.assignable.insert((source, target), result);
        result
    }

    fn structured_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        let source_data = self.types.get(source).clone();
        let target_data = self.types.get(target).clone();

        // Deferred alias applications and type parameters are compared
        // leniently; nothing concrete is known about them.
        if matches!(source_data, TypeData::Alias(..) | TypeData::TypeParameter(_))
            || matches!(target_data, TypeData::Alias(..) | TypeData::TypeParameter(_))
        {
            if let TypeData::TypeParameter(_) = source_data
                && let Some(constraint) = self.type_param_constraint(source)
                && !matches!(target_data, TypeData::TypeParameter(_))
            {
                return self.is_assignable(constraint, target);
            }
            return true;
        }

        if let TypeData::Union(members, _) = &source_data {
            return members.iter().all(|&m| self.is_assignable(m, target));
        }
        if source == TypeId::BOOLEAN && self.types.is_union(target) {
            return self.is_assignable(TypeId::FALSE, target)
                && self.is_assignable(TypeId::TRUE, target);
        }
        if let TypeData::Union(members, _) = &target_data {
            return members.iter().any(|&m| self.is_assignable(source, m));
        }
        if let TypeData::Intersection(members) = &target_data {
            return members.iter().all(|&m| self.is_assignable(source, m));
        }
        if let TypeData::Intersection(members) = &source_data {
            if members.iter().any(|&m| self.is_assignable(m, target)) {
                return true;
            }
            return self.is_structurally_assignable(source, target);
        }

        match (&source_data, &target_data) {
            (TypeData::StringLiteral(_), _) if target == TypeId::STRING => return true,
            (TypeData::NumberLiteral(_), _) if target == TypeId::NUMBER => return true,
            (TypeData::BigIntLiteral(_), _) if target == TypeId::BIGINT => return true,
            (TypeData::Intrinsic(Intrinsic::True | Intrinsic::False), _)
                if target == TypeId::BOOLEAN =>
            {
                return true;
            }
            (TypeData::EnumMember(symbol, _), TypeData::Enum(target_symbol)) => {
                return symbol == target_symbol;
            }
            (TypeData::EnumMember(..) | TypeData::Enum(_), _) if target == TypeId::NUMBER => {
                return true;
            }
            (TypeData::NumberLiteral(_), TypeData::Enum(_)) => return true,
            (_, TypeData::Enum(_)) if source == TypeId::NUMBER => return true,
            _ => {}
        }

        if target == TypeId::OBJECT {
            return self.is_structured(source) || matches!(source_data, TypeData::Intersection(_));
        }
        if matches!(target_data, TypeData::Intrinsic(_))
            || matches!(
                target_data,
                TypeData::StringLiteral(_)
                    | TypeData::NumberLiteral(_)
                    | TypeData::BigIntLiteral(_)
                    | TypeData::EnumMember(..)
                    | TypeData::Enum(_)
            )
        {
            return false;
        }

        match (&source_data, &target_data) {
            (TypeData::Array(s), TypeData::Array(t)) => return self.is_assignable(*s, *t),
            (TypeData::Tuple(elements, _), TypeData::Array(t)) => {
                let t = *t;
                return elements.iter().all(|e| {
                    let element = match self.types.get(e.ty) {
                        TypeData::Array(inner) if e.rest => *inner,
                        _ => e.ty,
                    };
                    self.is_assignable(element, t)
                });
            }
            (TypeData::Tuple(sources, _), TypeData::Tuple(targets, _)) => {
                let required = targets.iter().filter(|e| !e.optional && !e.rest).count();
                if sources.len() < required
                    || (sources.len() > targets.len() && !targets.iter().any(|e| e.rest))
                {
                    return false;
                }
                return sources
                    .iter()
                    .zip(targets.iter())
                    .all(|(s, t)| self.is_assignable(s.ty, t.ty));
            }
            (TypeData::Array(_), TypeData::Tuple(..)) => return false,
            (TypeData::Reference(s, source_args), TypeData::Reference(t, target_args))
                if s == t =>
            {
                return source_args
                    .iter()
                    .zip(target_args.iter())
                    .all(|(&a, &b)| self.is_assignable(a, b));
            }
            (TypeData::Reference(..), TypeData::Reference(..)) => {
                let bases = self.base_types(source);
                if bases.into_iter().any(|base| self.is_assignable(base, target)) {
                    return true;
                }
            }
            _ => {}
        }

        self.is_structurally_assignable(source, target)
    }

    /// Every member the target requires exists on the source with an
    /// assignable type, and call and construct signatures line up.
    fn is_structurally_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        let Some(target_shape) = self.apparent_shape(target) else {
            return false;
        };
        let Some(source_shape) = self.apparent_shape(source) else {
            return false;
        };

        for (name, prop) in &target_shape.properties {
            match self.property_type(source, name) {
                Some(ty) => {
                    if !self.is_assignable(ty, prop.ty) {
                        return false;
                    }
                }
                None if prop.optional => {}
                None => return false,
            }
        }

        for (sources, targets) in [
            (&source_shape.call_signatures, &target_shape.call_signatures),
            (&source_shape.construct_signatures, &target_shape.construct_signatures),
        ] {
            if targets.is_empty() {
                continue;
            }
            let compatible = targets.iter().all(|t| {
                sources.iter().any(|s| {
                    s.min_arguments() <= t.params.len() || t.has_rest()
                })
            });
            if !compatible {
                return false;
            }
            if let (Some(s), Some(t)) = (sources.first(), targets.first())
                && t.return_type != TypeId::VOID
                && !self.is_assignable(s.return_type, t.return_type)
            {
                return false;
            }
        }

        if let Some(index) = &target_shape.string_index {
            let index_ty = index.ty;
            let values: Vec<TypeId> = source_shape.properties.values().map(|p| p.ty).collect();
            if !values.into_iter().all(|v| self.is_assignable(v, index_ty)) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::ast::Program;
    use crate::checker::{CheckOptions, ProgramContext, TypeId};
    use crate::parser::Parser;
    use crate::string_dict::StringDict;

    #[allow(clippy::unwrap_used)]
    fn empty_program() -> Program {
        let mut dict = StringDict::new();
        Parser::new("", &mut dict).parse_program().unwrap()
    }

    #[test]
    fn literal_reduction() {
        let program = empty_program();
        let mut ctx = ProgramContext::new(&program, None, CheckOptions::default());
        let one = ctx.types.number_literal(1.0);
        let a = ctx.types.string_literal(Rc::from("a"));
        assert_eq!(ctx.union(vec![one, TypeId::NUMBER]), TypeId::NUMBER);
        assert_eq!(ctx.union(vec![TypeId::TRUE, TypeId::FALSE]), TypeId::BOOLEAN);
        assert_eq!(ctx.union(vec![a, TypeId::ANY]), TypeId::ANY);
        assert_eq!(ctx.union(vec![a, TypeId::NEVER]), a);
        let both = ctx.union(vec![one, a]);
        assert_eq!(ctx.types.constituents(both), vec![one, a]);
    }

    #[test]
    fn only_fresh_literals_widen() {
        let program = empty_program();
        let mut ctx = ProgramContext::new(&program, None, CheckOptions::default());
        let declared = ctx.types.string_literal(Rc::from("a"));
        let written = ctx.types.fresh_literal(declared);
        assert_eq!(ctx.widen_literal(written), TypeId::STRING);
        assert_eq!(ctx.widen_literal(declared), declared);
        assert!(ctx.is_assignable(written, declared));

        let one = ctx.types.number_literal(1.0);
        let one = ctx.types.fresh_literal(one);
        let mixed = ctx.union(vec![one, declared]);
        let widened = ctx.widen_literal(mixed);
        assert_eq!(ctx.types.constituents(widened), vec![TypeId::NUMBER, declared]);
    }

    #[test]
    fn nullables_drop_without_strict_null_checks() {
        let program = empty_program();
        let mut loose = ProgramContext::new(&program, None, CheckOptions::default());
        assert_eq!(loose.union(vec![TypeId::STRING, TypeId::NULL]), TypeId::STRING);
        assert_eq!(loose.union(vec![TypeId::NULL]), TypeId::NULL);

        let mut strict = ProgramContext::new(
            &program,
            None,
            CheckOptions {
                strict_null_checks: true,
            },
        );
        let union = strict.union(vec![TypeId::STRING, TypeId::UNDEFINED]);
        assert_eq!(
            strict.types.constituents(union),
            vec![TypeId::UNDEFINED, TypeId::STRING]
        );
    }

    #[test]
    fn primitive_assignability() {
        let program = empty_program();
        let mut ctx = ProgramContext::new(&program, None, CheckOptions::default());
        let lit = ctx.types.string_literal(Rc::from("x"));
        assert!(ctx.is_assignable(lit, TypeId::STRING));
        assert!(!ctx.is_assignable(TypeId::STRING, lit));
        assert!(ctx.is_assignable(TypeId::NULL, TypeId::NUMBER));
        assert!(!ctx.is_assignable(TypeId::NUMBER, TypeId::STRING));
        let union = ctx.union(vec![TypeId::STRING, TypeId::NUMBER]);
        assert!(ctx.is_assignable(TypeId::NUMBER, union));
        assert!(!ctx.is_assignable(union, TypeId::NUMBER));
        let array = ctx.types.array(lit);
        let strings = ctx.types.array(TypeId::STRING);
        assert!(ctx.is_assignable(array, strings));
    }
}
