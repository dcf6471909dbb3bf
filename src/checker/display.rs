//! Rendering types as TypeScript source text.
//!
//! The output is never truncated: the annotation text is parsed back into a
//! type node, so every member of a large union or object must be present.

use super::binder::Binder;
use super::types::{AliasTag, ObjectShape, ParamInfo, Signature, TupleElement, TypeData, TypeInterner};
use super::{format_number, TypeId};
use crate::lexer::is_identifier_text;

pub struct TypePrinter<'p, 'a> {
    types: &'p TypeInterner,
    binder: &'p Binder<'a>,
}

impl<'p, 'a> TypePrinter<'p, 'a> {
    pub fn new(types: &'p TypeInterner, binder: &'p Binder<'a>) -> Self {
        Self { types, binder }
    }

    pub fn print(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId) {
        if let Some(tag) = self.types.alias_of(ty) {
            self.write_alias(out, tag);
            return;
        }
        match self.types.get(ty) {
            TypeData::Intrinsic(intrinsic) => out.push_str(intrinsic.as_str()),
            TypeData::StringLiteral(value) => write_string_literal(out, value),
            TypeData::NumberLiteral(n) => out.push_str(&format_number(n.value())),
            TypeData::BigIntLiteral(digits) => {
                out.push_str(digits);
                out.push('n');
            }
            TypeData::Union(members, _) => self.write_union(out, members),
            TypeData::Intersection(members) => {
                for (index, &member) in members.iter().enumerate() {
                    if index > 0 {
                        out.push_str(" & ");
                    }
                    self.write_operand(out, member, true);
                }
            }
            TypeData::Array(element) => {
                self.write_operand(out, *element, true);
                out.push_str("[]");
            }
            TypeData::Tuple(elements, readonly) => {
                if *readonly {
                    out.push_str("readonly ");
                }
                self.write_tuple(out, elements);
            }
            TypeData::Object(_) => match self.types.object_shape(ty) {
                Some(shape) => self.write_object(out, &shape),
                None => out.push_str("{}"),
            },
            TypeData::Reference(symbol, args) | TypeData::Alias(symbol, args) => {
                out.push_str(&self.binder.symbol_name(*symbol));
                self.write_type_arguments(out, args);
            }
            TypeData::TypeofSymbol(symbol) => {
                out.push_str("typeof ");
                out.push_str(&self.binder.symbol_name(*symbol));
            }
            TypeData::Enum(symbol) => out.push_str(&self.binder.symbol_name(*symbol)),
            TypeData::EnumMember(symbol, member) => {
                out.push_str(&self.binder.symbol_name(*symbol));
                out.push('.');
                out.push_str(member);
            }
            TypeData::TypeParameter(id) => match self.types.type_param_info(*id) {
                Some(info) => out.push_str(&info.name),
                None => out.push_str("unknown"),
            },
        }
    }

    fn write_alias(&self, out: &mut String, tag: &AliasTag) {
        out.push_str(&self.binder.symbol_name(tag.symbol));
        self.write_type_arguments(out, &tag.args);
    }

    fn write_type_arguments(&self, out: &mut String, args: &[TypeId]) {
        if args.is_empty() {
            return;
        }
        out.push('<');
        for (index, &arg) in args.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_type(out, arg);
        }
        out.push('>');
    }

    /// Members in id order, `false | true` as `boolean`, and `null` and
    /// `undefined` moved to the end.
    fn write_union(&self, out: &mut String, members: &[TypeId]) {
        let has_boolean = members.contains(&TypeId::FALSE) && members.contains(&TypeId::TRUE);
        let mut ordered: Vec<TypeId> = members
            .iter()
            .copied()
            .filter(|m| !m.is_nullable())
            .filter(|&m| !(has_boolean && m == TypeId::TRUE))
            .map(|m| {
                if has_boolean && m == TypeId::FALSE {
                    TypeId::BOOLEAN
                } else {
                    m
                }
            })
            .collect();
        ordered.extend(members.iter().copied().filter(|m| *m == TypeId::NULL));
        ordered.extend(members.iter().copied().filter(|m| *m == TypeId::UNDEFINED));

        for (index, &member) in ordered.iter().enumerate() {
            if index > 0 {
                out.push_str(" | ");
            }
            self.write_operand(out, member, false);
        }
    }

    /// Write a constituent of a union, intersection or array, wrapping the
    /// forms that would otherwise bind loosely.
    fn write_operand(&self, out: &mut String, ty: TypeId, tight: bool) {
        let needs_parens = match self.types.get(ty) {
            _ if self.types.alias_of(ty).is_some() => false,
            TypeData::Union(..) | TypeData::Intersection(_) => tight,
            TypeData::Object(_) => self
                .types
                .object_shape(ty)
                .is_some_and(|shape| is_function_like(&shape)),
            _ => false,
        };
        if needs_parens {
            out.push('(');
            self.write_type(out, ty);
            out.push(')');
        } else {
            self.write_type(out, ty);
        }
    }

    fn write_tuple(&self, out: &mut String, elements: &[TupleElement]) {
        out.push('[');
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            if element.rest {
                out.push_str("...");
            }
            match &element.label {
                Some(label) => {
                    out.push_str(label);
                    if element.optional {
                        out.push('?');
                    }
                    out.push_str(": ");
                    self.write_type(out, element.ty);
                }
                None => {
                    self.write_type(out, element.ty);
                    if element.optional {
                        out.push('?');
                    }
                }
            }
        }
        out.push(']');
    }

    fn write_object(&self, out: &mut String, shape: &ObjectShape) {
        if is_function_like(shape) {
            if let Some(signature) = shape.call_signatures.first() {
                self.write_signature(out, signature, " => ");
            } else if let Some(signature) = shape.construct_signatures.first() {
                out.push_str("new ");
                self.write_signature(out, signature, " => ");
            }
            return;
        }
        if shape.is_empty() {
            out.push_str("{}");
            return;
        }

        out.push_str("{ ");
        for signature in &shape.call_signatures {
            self.write_signature(out, signature, ": ");
            out.push_str("; ");
        }
        for signature in &shape.construct_signatures {
            out.push_str("new ");
            self.write_signature(out, signature, ": ");
            out.push_str("; ");
        }
        for (key, index) in [("string", &shape.string_index), ("number", &shape.number_index)] {
            let Some(index) = index else { continue };
            if index.readonly {
                out.push_str("readonly ");
            }
            out.push('[');
            out.push_str(&index.key_name);
            out.push_str(": ");
            out.push_str(key);
            out.push_str("]: ");
            self.write_type(out, index.ty);
            out.push_str("; ");
        }
        for prop in shape.properties.values() {
            let method_signatures = if prop.method {
                self.types
                    .object_shape(prop.ty)
                    .filter(|s| !s.call_signatures.is_empty() && s.properties.is_empty())
            } else {
                None
            };
            match method_signatures {
                Some(method) => {
                    for signature in &method.call_signatures {
                        write_property_name(out, &prop.name);
                        if prop.optional {
                            out.push('?');
                        }
                        self.write_signature(out, signature, ": ");
                        out.push_str("; ");
                    }
                }
                None => {
                    if prop.readonly {
                        out.push_str("readonly ");
                    }
                    write_property_name(out, &prop.name);
                    if prop.optional {
                        out.push('?');
                    }
                    out.push_str(": ");
                    self.write_type(out, prop.ty);
                    out.push_str("; ");
                }
            }
        }
        out.push('}');
    }

    /// `<T>(a: A, b?: B) => R`, with `arrow` choosing between the function
    /// type and member forms.
    fn write_signature(&self, out: &mut String, signature: &Signature, arrow: &str) {
        if !signature.type_params.is_empty() {
            out.push('<');
            for (index, &param) in signature.type_params.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                self.write_type_param_declaration(out, param);
            }
            out.push('>');
        }
        out.push('(');
        for (index, param) in signature.params.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_param(out, param);
        }
        out.push(')');
        out.push_str(arrow);
        match &signature.predicate {
            Some((name, narrowed)) => {
                out.push_str(name);
                out.push_str(" is ");
                self.write_type(out, *narrowed);
            }
            None => self.write_type(out, signature.return_type),
        }
    }

    fn write_type_param_declaration(&self, out: &mut String, param: TypeId) {
        let TypeData::TypeParameter(id) = self.types.get(param) else {
            self.write_type(out, param);
            return;
        };
        let Some(info) = self.types.type_param_info(*id) else {
            return;
        };
        out.push_str(&info.name);
        if let Some(constraint) = info.constraint {
            out.push_str(" extends ");
            self.write_type(out, constraint);
        }
        if let Some(default) = info.default {
            out.push_str(" = ");
            self.write_type(out, default);
        }
    }

    fn write_param(&self, out: &mut String, param: &ParamInfo) {
        if param.rest {
            out.push_str("...");
        }
        out.push_str(&param.name);
        if param.optional && !param.rest {
            out.push('?');
        }
        out.push_str(": ");
        self.write_type(out, param.ty);
    }
}

/// A shape that prints as a bare function or constructor type.
fn is_function_like(shape: &ObjectShape) -> bool {
    let only_signatures = shape.properties.is_empty()
        && shape.string_index.is_none()
        && shape.number_index.is_none();
    only_signatures
        && matches!(
            (shape.call_signatures.len(), shape.construct_signatures.len()),
            (1, 0) | (0, 1)
        )
}

fn write_property_name(out: &mut String, name: &str) {
    let numeric = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
    if is_identifier_text(name) || numeric {
        out.push_str(name);
    } else {
        write_string_literal(out, name);
    }
}

fn write_string_literal(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0}' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::checker::types::{PropertyInfo, TupleElement};

    fn render(types: &TypeInterner, ty: TypeId) -> String {
        let binder = Binder::new();
        TypePrinter::new(types, &binder).print(ty)
    }

    #[test]
    fn unions_put_nullables_last_and_collapse_booleans() {
        let mut types = TypeInterner::new();
        let union = types.union_of(vec![
            TypeId::UNDEFINED,
            TypeId::NULL,
            TypeId::STRING,
            TypeId::FALSE,
            TypeId::TRUE,
        ]);
        assert_eq!(render(&types, union), "string | boolean | null | undefined");
    }

    #[test]
    fn literals() {
        let mut types = TypeInterner::new();
        let one = types.number_literal(1.0);
        let text = types.string_literal(Rc::from("say \"hi\"\n"));
        let union = types.union_of(vec![one, text]);
        assert_eq!(render(&types, union), "1 | \"say \\\"hi\\\"\\n\"");

        let negative = types.number_literal(-2.5);
        assert_eq!(render(&types, negative), "-2.5");
        let big = types.bigint_literal(Rc::from("10"));
        assert_eq!(render(&types, big), "10n");
    }

    #[test]
    fn arrays_parenthesize_unions_and_functions() {
        let mut types = TypeInterner::new();
        let union = types.union_of(vec![TypeId::STRING, TypeId::NUMBER]);
        let array = types.array(union);
        assert_eq!(render(&types, array), "(string | number)[]");

        let function = types.function(Signature::new(vec![], TypeId::VOID));
        let functions = types.array(function);
        assert_eq!(render(&types, functions), "(() => void)[]");
    }

    #[test]
    fn objects_and_functions() {
        let mut types = TypeInterner::new();
        let mut shape = ObjectShape::default();
        shape.insert_property(PropertyInfo {
            name: Rc::from("a"),
            ty: TypeId::NUMBER,
            optional: false,
            readonly: false,
            method: false,
        });
        shape.insert_property(PropertyInfo {
            name: Rc::from("data-id"),
            ty: TypeId::STRING,
            optional: true,
            readonly: true,
            method: false,
        });
        let object = types.object(shape);
        assert_eq!(
            render(&types, object),
            "{ a: number; readonly \"data-id\"?: string; }"
        );

        let signature = Signature::new(
            vec![
                ParamInfo {
                    name: Rc::from("x"),
                    ty: TypeId::NUMBER,
                    optional: true,
                    rest: false,
                },
                ParamInfo {
                    name: Rc::from("rest"),
                    ty: types.array(TypeId::STRING),
                    optional: false,
                    rest: true,
                },
            ],
            object,
        );
        let function = types.function(signature);
        assert_eq!(
            render(&types, function),
            "(x?: number, ...rest: string[]) => { a: number; readonly \"data-id\"?: string; }"
        );

        let empty = types.object(ObjectShape::default());
        assert_eq!(render(&types, empty), "{}");
    }

    #[test]
    fn tuples() {
        let mut types = TypeInterner::new();
        let element = |ty, label: Option<&str>| TupleElement {
            ty,
            optional: false,
            rest: false,
            label: label.map(Rc::from),
        };
        let tuple = types.tuple(
            vec![element(TypeId::STRING, None), element(TypeId::NUMBER, None)],
            false,
        );
        assert_eq!(render(&types, tuple), "[string, number]");
        let labeled = types.tuple(vec![element(TypeId::BOOLEAN, Some("flag"))], true);
        assert_eq!(render(&types, labeled), "readonly [flag: boolean]");
    }
}
