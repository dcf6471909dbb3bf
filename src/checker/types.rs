//! Interned type representation.
//!
//! Every type the checker manipulates is a [`TypeId`] into a [`TypeInterner`].
//! Structural types (literals, unions, arrays, tuples, references) are
//! deduplicated so that two requests for the same structure return the same
//! id. Anonymous object shapes are allocated fresh every time; they are
//! addressed through an [`ObjectId`] and never compared structurally.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use super::binder::SymbolId;
use crate::string_dict::Atom;

/// Handle to an interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub const ANY: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const UNDEFINED: TypeId = TypeId(2);
    pub const NULL: TypeId = TypeId(3);
    pub const STRING: TypeId = TypeId(4);
    pub const NUMBER: TypeId = TypeId(5);
    pub const BIGINT: TypeId = TypeId(6);
    pub const FALSE: TypeId = TypeId(7);
    pub const TRUE: TypeId = TypeId(8);
    pub const BOOLEAN: TypeId = TypeId(9);
    pub const SYMBOL: TypeId = TypeId(10);
    pub const VOID: TypeId = TypeId(11);
    pub const NEVER: TypeId = TypeId(12);
    pub const OBJECT: TypeId = TypeId(13);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_nullable(self) -> bool {
        self == TypeId::NULL || self == TypeId::UNDEFINED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Any,
    Unknown,
    Undefined,
    Null,
    String,
    Number,
    BigInt,
    False,
    True,
    Boolean,
    Symbol,
    Void,
    Never,
    Object,
}

impl Intrinsic {
    const ALL: [Intrinsic; 14] = [
        Intrinsic::Any,
        Intrinsic::Unknown,
        Intrinsic::Undefined,
        Intrinsic::Null,
        Intrinsic::String,
        Intrinsic::Number,
        Intrinsic::BigInt,
        Intrinsic::False,
        Intrinsic::True,
        Intrinsic::Boolean,
        Intrinsic::Symbol,
        Intrinsic::Void,
        Intrinsic::Never,
        Intrinsic::Object,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intrinsic::Any => "any",
            Intrinsic::Unknown => "unknown",
            Intrinsic::Undefined => "undefined",
            Intrinsic::Null => "null",
            Intrinsic::String => "string",
            Intrinsic::Number => "number",
            Intrinsic::BigInt => "bigint",
            Intrinsic::False => "false",
            Intrinsic::True => "true",
            Intrinsic::Boolean => "boolean",
            Intrinsic::Symbol => "symbol",
            Intrinsic::Void => "void",
            Intrinsic::Never => "never",
            Intrinsic::Object => "object",
        }
    }
}

/// A JavaScript number usable as a hash key.
///
/// `-0` is folded into `0` and every NaN compares equal.
#[derive(Debug, Clone, Copy)]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Self {
        if value == 0.0 {
            Number(0.0)
        } else if value.is_nan() {
            Number(f64::NAN)
        } else {
            Number(value)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParamId(u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
    pub label: Option<Atom>,
}

/// The alias a type was written through, kept for printing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AliasTag {
    pub symbol: SymbolId,
    pub args: Rc<[TypeId]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(Intrinsic),
    StringLiteral(Atom),
    NumberLiteral(Number),
    /// Decimal digits, with a leading `-` for negative values.
    BigIntLiteral(Atom),
    /// Members sorted by id, flattened and deduplicated. A union reached
    /// through an alias is a distinct type that prints as the alias.
    Union(Rc<[TypeId]>, Option<AliasTag>),
    Intersection(Rc<[TypeId]>),
    Array(TypeId),
    /// Elements and the `readonly` modifier.
    Tuple(Rc<[TupleElement]>, bool),
    Object(ObjectId),
    /// Instance type of a class or interface, with its type arguments.
    Reference(SymbolId, Rc<[TypeId]>),
    /// The value side of a class, enum or namespace (`typeof C`).
    TypeofSymbol(SymbolId),
    Enum(SymbolId),
    EnumMember(SymbolId, Atom),
    TypeParameter(TypeParamId),
    /// A generic alias applied to arguments that still mention type
    /// parameters; expanded once instantiation makes them concrete.
    Alias(SymbolId, Rc<[TypeId]>),
}

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: Atom,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone)]
pub struct Signature {
    /// `TypeParameter` ids declared by the signature itself.
    pub type_params: Vec<TypeId>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    /// Set for `x is T` predicates so printing keeps the predicate form.
    pub predicate: Option<(Atom, TypeId)>,
}

impl Signature {
    pub fn new(params: Vec<ParamInfo>, return_type: TypeId) -> Self {
        Self {
            type_params: vec![],
            params,
            return_type,
            predicate: None,
        }
    }

    pub fn min_arguments(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| !p.optional && !p.rest)
            .count()
    }

    pub fn has_rest(&self) -> bool {
        self.params.last().is_some_and(|p| p.rest)
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_arguments() && (self.has_rest() || count <= self.params.len())
    }
}

#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub name: Atom,
    pub ty: TypeId,
    pub optional: bool,
    pub readonly: bool,
    /// Declared with method syntax; printed as `name(...): R`.
    pub method: bool,
}

#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub key_name: Atom,
    pub ty: TypeId,
    pub readonly: bool,
}

pub type PropertyMap = IndexMap<Atom, PropertyInfo, FxBuildHasher>;

#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    pub properties: PropertyMap,
    pub call_signatures: Vec<Rc<Signature>>,
    pub construct_signatures: Vec<Rc<Signature>>,
    pub string_index: Option<IndexInfo>,
    pub number_index: Option<IndexInfo>,
}

impl ObjectShape {
    pub fn function(signature: Signature) -> Self {
        Self {
            call_signatures: vec![Rc::new(signature)],
            ..Self::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    pub fn insert_property(&mut self, info: PropertyInfo) {
        self.properties.insert(Rc::clone(&info.name), info);
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.call_signatures.is_empty()
            && self.construct_signatures.is_empty()
            && self.string_index.is_none()
            && self.number_index.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

/// Storage for every type created while checking one program.
pub struct TypeInterner {
    types: Vec<TypeData>,
    lookup: FxHashMap<TypeData, TypeId>,
    objects: Vec<Rc<ObjectShape>>,
    type_params: Vec<TypeParamInfo>,
    /// Aliases recorded for anonymous object types.
    object_aliases: FxHashMap<TypeId, AliasTag>,
    /// Regular literal to its fresh twin, and back.
    fresh: FxHashMap<TypeId, TypeId>,
    regular: FxHashMap<TypeId, TypeId>,
    fallback: TypeData,
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut interner = Self {
            types: Vec::with_capacity(256),
            lookup: FxHashMap::default(),
            objects: vec![],
            type_params: vec![],
            object_aliases: FxHashMap::default(),
            fresh: FxHashMap::default(),
            regular: FxHashMap::default(),
            fallback: TypeData::Intrinsic(Intrinsic::Any),
        };
        for intrinsic in Intrinsic::ALL {
            interner.intern(TypeData::Intrinsic(intrinsic));
        }
        interner
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&id) = self.lookup.get(&data) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(data.clone());
        self.lookup.insert(data, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        // Ids are only minted by `intern`, so the fallback is never observed.
        self.types.get(id.index()).unwrap_or(&self.fallback)
    }

    pub fn string_literal(&mut self, value: Atom) -> TypeId {
        self.intern(TypeData::StringLiteral(value))
    }

    pub fn number_literal(&mut self, value: f64) -> TypeId {
        self.intern(TypeData::NumberLiteral(Number::new(value)))
    }

    pub fn bigint_literal(&mut self, digits: Atom) -> TypeId {
        self.intern(TypeData::BigIntLiteral(digits))
    }

    pub fn boolean_literal(value: bool) -> TypeId {
        if value { TypeId::TRUE } else { TypeId::FALSE }
    }

    /// The fresh form of a literal: the type of a literal written directly
    /// in an expression, which widening turns into its primitive.
    ///
    /// A fresh literal has its own id but the same [`TypeData`] as the
    /// regular one. Non-literals are returned unchanged.
    pub fn fresh_literal(&mut self, id: TypeId) -> TypeId {
        let id = self.regular_of(id);
        if !self.is_literal(id) {
            return id;
        }
        if let Some(&fresh) = self.fresh.get(&id) {
            return fresh;
        }
        let fresh = TypeId(self.types.len() as u32);
        let data = self.get(id).clone();
        self.types.push(data);
        self.fresh.insert(id, fresh);
        self.regular.insert(fresh, id);
        fresh
    }

    pub fn regular_of(&self, id: TypeId) -> TypeId {
        self.regular.get(&id).copied().unwrap_or(id)
    }

    pub fn is_fresh(&self, id: TypeId) -> bool {
        self.regular.contains_key(&id)
    }

    /// Regular forms all the way through a union.
    pub fn regular_deep(&mut self, id: TypeId) -> TypeId {
        match self.get(id).clone() {
            TypeData::Union(members, None) => {
                if !members.iter().any(|&m| self.is_fresh(m)) {
                    return id;
                }
                let members: Vec<TypeId> = members.iter().map(|&m| self.regular_of(m)).collect();
                self.union_of(members)
            }
            _ => self.regular_of(id),
        }
    }

    /// The primitive of a fresh literal; regular literals and other types
    /// are kept.
    pub fn widen_fresh(&mut self, id: TypeId) -> TypeId {
        if self.is_fresh(id) {
            self.base_of_literal(id)
        } else {
            id
        }
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&mut self, elements: Vec<TupleElement>, readonly: bool) -> TypeId {
        self.intern(TypeData::Tuple(elements.into(), readonly))
    }

    pub fn deferred_alias(&mut self, symbol: SymbolId, args: Vec<TypeId>) -> TypeId {
        self.intern(TypeData::Alias(symbol, args.into()))
    }

    pub fn reference(&mut self, symbol: SymbolId, args: Vec<TypeId>) -> TypeId {
        self.intern(TypeData::Reference(symbol, args.into()))
    }

    pub fn typeof_symbol(&mut self, symbol: SymbolId) -> TypeId {
        self.intern(TypeData::TypeofSymbol(symbol))
    }

    pub fn enum_type(&mut self, symbol: SymbolId) -> TypeId {
        self.intern(TypeData::Enum(symbol))
    }

    pub fn enum_member(&mut self, symbol: SymbolId, name: Atom) -> TypeId {
        self.intern(TypeData::EnumMember(symbol, name))
    }

    pub fn object(&mut self, shape: ObjectShape) -> TypeId {
        let object_id = ObjectId(self.objects.len() as u32);
        self.objects.push(Rc::new(shape));
        self.intern(TypeData::Object(object_id))
    }

    pub fn function(&mut self, signature: Signature) -> TypeId {
        self.object(ObjectShape::function(signature))
    }

    pub fn shape(&self, id: ObjectId) -> Rc<ObjectShape> {
        self.objects
            .get(id.0 as usize)
            .map(Rc::clone)
            .unwrap_or_default()
    }

    /// The shape behind `id` when it is an anonymous object type.
    pub fn object_shape(&self, id: TypeId) -> Option<Rc<ObjectShape>> {
        match self.get(id) {
            TypeData::Object(object_id) => Some(self.shape(*object_id)),
            _ => None,
        }
    }

    pub fn type_parameter(&mut self, info: TypeParamInfo) -> TypeId {
        let param_id = TypeParamId(self.type_params.len() as u32);
        self.type_params.push(info);
        self.intern(TypeData::TypeParameter(param_id))
    }

    pub fn type_param_info(&self, id: TypeParamId) -> Option<&TypeParamInfo> {
        self.type_params.get(id.0 as usize)
    }

    pub fn set_type_param_bounds(
        &mut self,
        ty: TypeId,
        constraint: Option<TypeId>,
        default: Option<TypeId>,
    ) {
        if let TypeData::TypeParameter(param_id) = *self.get(ty)
            && let Some(info) = self.type_params.get_mut(param_id.0 as usize)
        {
            info.constraint = constraint;
            info.default = default;
        }
    }

    /// Build a union from already normalized members.
    ///
    /// Callers are expected to have flattened nested unions and applied
    /// whatever reduction they need; this only sorts, deduplicates, drops
    /// fresh literals whose regular form is present and collapses
    /// `false | true` into `boolean`.
    pub fn union_of(&mut self, mut members: Vec<TypeId>) -> TypeId {
        members.sort();
        members.dedup();
        if members.contains(&TypeId::BOOLEAN) {
            members.retain(|&t| t != TypeId::BOOLEAN);
            members.extend([TypeId::FALSE, TypeId::TRUE]);
        }
        let present = members.clone();
        members.retain(|&t| {
            let regular = self.regular_of(t);
            regular == t || !present.contains(&regular)
        });
        let has_false = members.iter().any(|&t| self.regular_of(t) == TypeId::FALSE);
        let has_true = members.iter().any(|&t| self.regular_of(t) == TypeId::TRUE);
        if has_false && has_true {
            members.retain(|&t| !matches!(self.regular_of(t), TypeId::FALSE | TypeId::TRUE));
            members.extend([TypeId::FALSE, TypeId::TRUE]);
        }
        members.sort();
        members.dedup();
        match members.as_slice() {
            [] => TypeId::NEVER,
            [single] => *single,
            [TypeId::FALSE, TypeId::TRUE] => TypeId::BOOLEAN,
            _ => self.intern(TypeData::Union(members.into(), None)),
        }
    }

    /// Tag a type with the alias it was written through.
    ///
    /// Unions get a distinct id carrying the tag; object types are fresh
    /// anyway and record the tag on the side. Anything else is returned
    /// untouched, since primitives and references print the same either way.
    pub fn with_alias(&mut self, id: TypeId, tag: AliasTag) -> TypeId {
        match self.get(id).clone() {
            TypeData::Union(members, None) => self.intern(TypeData::Union(members, Some(tag))),
            TypeData::Object(_) => {
                self.object_aliases.entry(id).or_insert(tag);
                id
            }
            _ => id,
        }
    }

    pub fn alias_of(&self, id: TypeId) -> Option<&AliasTag> {
        match self.get(id) {
            TypeData::Union(_, tag) => tag.as_ref(),
            TypeData::Object(_) => self.object_aliases.get(&id),
            _ => None,
        }
    }

    pub fn intersection_of(&mut self, mut members: Vec<TypeId>) -> TypeId {
        members.dedup();
        match members.as_slice() {
            [] => TypeId::UNKNOWN,
            [single] => *single,
            _ => self.intern(TypeData::Intersection(members.into())),
        }
    }

    /// The constituents of a union, or the type itself. `boolean` expands to
    /// `false | true`.
    pub fn constituents(&self, id: TypeId) -> Vec<TypeId> {
        match self.get(id) {
            TypeData::Union(members, _) => members.to_vec(),
            TypeData::Intrinsic(Intrinsic::Boolean) => vec![TypeId::FALSE, TypeId::TRUE],
            _ => vec![id],
        }
    }

    pub fn is_union(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Union(..))
    }

    pub fn is_literal(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            TypeData::StringLiteral(_)
                | TypeData::NumberLiteral(_)
                | TypeData::BigIntLiteral(_)
                | TypeData::EnumMember(..)
                | TypeData::Intrinsic(Intrinsic::True | Intrinsic::False)
        )
    }

    /// Literal, boolean literal, enum member, `null` or `undefined`.
    pub fn is_unit(&self, id: TypeId) -> bool {
        self.is_literal(id) || id.is_nullable()
    }

    /// The primitive a literal belongs to; other types map to themselves.
    pub fn base_of_literal(&mut self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeData::StringLiteral(_) => TypeId::STRING,
            TypeData::NumberLiteral(_) => TypeId::NUMBER,
            TypeData::BigIntLiteral(_) => TypeId::BIGINT,
            TypeData::EnumMember(symbol, _) => {
                let symbol = *symbol;
                self.enum_type(symbol)
            }
            TypeData::Intrinsic(Intrinsic::True | Intrinsic::False) => TypeId::BOOLEAN,
            TypeData::Union(members, _) => {
                let members = members.to_vec();
                let widened = members
                    .into_iter()
                    .map(|m| self.base_of_literal(m))
                    .collect();
                self.union_of(widened)
            }
            _ => id,
        }
    }

}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsics_have_fixed_ids() {
        let interner = TypeInterner::new();
        assert_eq!(
            interner.get(TypeId::NUMBER),
            &TypeData::Intrinsic(Intrinsic::Number)
        );
        assert_eq!(
            interner.get(TypeId::OBJECT),
            &TypeData::Intrinsic(Intrinsic::Object)
        );
        assert_eq!(interner.len(), 14);
    }

    #[test]
    fn literals_are_deduplicated() {
        let mut interner = TypeInterner::new();
        let a = interner.number_literal(1.0);
        let b = interner.number_literal(1.0);
        let zero = interner.number_literal(0.0);
        let negative_zero = interner.number_literal(-0.0);
        assert_eq!(a, b);
        assert_eq!(zero, negative_zero);
    }

    #[test]
    fn unions_sort_by_creation_order() {
        let mut interner = TypeInterner::new();
        let one = interner.number_literal(1.0);
        let s = interner.string_literal(Rc::from("string"));
        let forward = interner.union_of(vec![one, s]);
        let backward = interner.union_of(vec![s, one]);
        assert_eq!(forward, backward);
        assert_eq!(interner.constituents(forward), vec![one, s]);
    }

    #[test]
    fn true_and_false_collapse_to_boolean() {
        let mut interner = TypeInterner::new();
        assert_eq!(
            interner.union_of(vec![TypeId::TRUE, TypeId::FALSE]),
            TypeId::BOOLEAN
        );
        let with_string = interner.union_of(vec![TypeId::BOOLEAN, TypeId::STRING]);
        assert_eq!(
            interner.constituents(with_string),
            vec![TypeId::STRING, TypeId::FALSE, TypeId::TRUE]
        );
    }

    #[test]
    fn fresh_literals_share_data_but_not_ids() {
        let mut interner = TypeInterner::new();
        let regular = interner.string_literal(Rc::from("a"));
        let fresh = interner.fresh_literal(regular);
        assert_ne!(fresh, regular);
        assert_eq!(interner.get(fresh), interner.get(regular));
        assert_eq!(interner.fresh_literal(fresh), fresh);
        assert_eq!(interner.regular_of(fresh), regular);
        assert_eq!(interner.fresh_literal(TypeId::STRING), TypeId::STRING);

        assert_eq!(interner.widen_fresh(fresh), TypeId::STRING);
        assert_eq!(interner.widen_fresh(regular), regular);
        assert_eq!(interner.union_of(vec![fresh, regular]), regular);

        let fresh_true = interner.fresh_literal(TypeId::TRUE);
        assert_eq!(interner.widen_fresh(fresh_true), TypeId::BOOLEAN);
        assert_eq!(
            interner.union_of(vec![fresh_true, TypeId::FALSE]),
            TypeId::BOOLEAN
        );
    }

    #[test]
    fn object_shapes_are_never_shared() {
        let mut interner = TypeInterner::new();
        let a = interner.object(ObjectShape::default());
        let b = interner.object(ObjectShape::default());
        assert_ne!(a, b);
    }

    #[test]
    fn literal_widening() {
        let mut interner = TypeInterner::new();
        let lit = interner.string_literal(Rc::from("a"));
        assert_eq!(interner.base_of_literal(lit), TypeId::STRING);
        assert_eq!(interner.base_of_literal(TypeId::TRUE), TypeId::BOOLEAN);
        assert!(interner.is_unit(TypeId::NULL));
        assert!(!interner.is_unit(TypeId::STRING));
    }
}
