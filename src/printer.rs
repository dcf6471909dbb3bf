//! Printing type-expression trees back to TypeScript text.
//!
//! Only type annotations are ever printed: everything else in the output is
//! copied from the original source by the serializer.

use crate::ast::*;
use crate::checker::format_number;
use crate::lexer::is_identifier_text;

/// Render a type node as source text.
pub fn print_type_node(node: &TypeAnnotation) -> String {
    let mut printer = TypePrinter::default();
    printer.type_annotation(node);
    printer.out
}

#[derive(Default)]
struct TypePrinter {
    out: String,
}

impl TypePrinter {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn type_annotation(&mut self, node: &TypeAnnotation) {
        match node {
            TypeAnnotation::Keyword(keyword) => self.push(keyword.keyword.as_str()),
            TypeAnnotation::Reference(reference) => {
                self.push(&reference.name.name);
                if let Some(args) = &reference.type_arguments {
                    self.type_arguments(args);
                }
            }
            TypeAnnotation::Literal(literal) => self.literal(&literal.value),
            TypeAnnotation::Object(object) => self.object_type(object),
            TypeAnnotation::Array(array) => {
                self.operand(&array.element_type, true);
                self.push("[]");
            }
            TypeAnnotation::Tuple(tuple) => self.tuple(tuple),
            TypeAnnotation::Union(union) => self.joined(&union.types, " | ", false),
            TypeAnnotation::Intersection(intersection) => {
                self.joined(&intersection.types, " & ", true)
            }
            TypeAnnotation::Function(function) => {
                if function.constructor {
                    self.push("new ");
                }
                if let Some(type_params) = &function.type_parameters {
                    self.type_parameters(type_params);
                }
                self.params(&function.params);
                self.push(" => ");
                self.type_annotation(&function.return_type);
            }
            TypeAnnotation::Conditional(conditional) => {
                self.operand(&conditional.check_type, true);
                self.push(" extends ");
                self.operand(&conditional.extends_type, true);
                self.push(" ? ");
                self.type_annotation(&conditional.true_type);
                self.push(" : ");
                self.type_annotation(&conditional.false_type);
            }
            TypeAnnotation::Infer(infer) => {
                self.push("infer ");
                self.type_parameter(&infer.type_parameter);
            }
            TypeAnnotation::Mapped(mapped) => self.mapped(mapped),
            TypeAnnotation::Indexed(indexed) => {
                self.operand(&indexed.object_type, true);
                self.push("[");
                self.type_annotation(&indexed.index_type);
                self.push("]");
            }
            TypeAnnotation::Typeof(typeof_type) => {
                self.push("typeof ");
                self.push(&typeof_type.expression.name);
            }
            TypeAnnotation::Operator(operator) => {
                self.push(operator.operator.as_str());
                self.push(" ");
                self.operand(&operator.type_annotation, true);
            }
            TypeAnnotation::TemplateLiteral(template) => {
                self.push("`");
                for (index, quasi) in template.quasis.iter().enumerate() {
                    self.push(&escape_template(quasi));
                    if let Some(ty) = template.types.get(index) {
                        self.push("${");
                        self.type_annotation(ty);
                        self.push("}");
                    }
                }
                self.push("`");
            }
            TypeAnnotation::Predicate(predicate) => {
                if predicate.asserts {
                    self.push("asserts ");
                }
                self.push(&predicate.parameter.name);
                if let Some(ty) = &predicate.type_annotation {
                    self.push(" is ");
                    self.type_annotation(ty);
                }
            }
            TypeAnnotation::Parenthesized(inner) => {
                self.push("(");
                self.type_annotation(&inner.type_annotation);
                self.push(")");
            }
            TypeAnnotation::This(_) => self.push("this"),
        }
    }

    /// A member of a union, intersection, array or indexed access. Loosely
    /// binding forms are wrapped unless the tree already has parentheses.
    fn operand(&mut self, node: &TypeAnnotation, tight: bool) {
        let wrap = match node {
            TypeAnnotation::Function(_) | TypeAnnotation::Conditional(_) => true,
            TypeAnnotation::Union(_) | TypeAnnotation::Intersection(_) => tight,
            TypeAnnotation::Operator(_) | TypeAnnotation::Infer(_) => tight,
            _ => false,
        };
        if wrap {
            self.push("(");
            self.type_annotation(node);
            self.push(")");
        } else {
            self.type_annotation(node);
        }
    }

    fn joined(&mut self, types: &[TypeAnnotation], separator: &str, tight: bool) {
        for (index, ty) in types.iter().enumerate() {
            if index > 0 {
                self.push(separator);
            }
            self.operand(ty, tight);
        }
    }

    fn literal(&mut self, value: &LiteralValue) {
        match value {
            LiteralValue::Null => self.push("null"),
            LiteralValue::Undefined => self.push("undefined"),
            LiteralValue::Boolean(b) => self.push(if *b { "true" } else { "false" }),
            LiteralValue::Number(n) => self.push(&format_number(*n)),
            LiteralValue::String(s) => self.push(&quote(s)),
            LiteralValue::BigInt(digits) => {
                self.push(digits);
                self.push("n");
            }
            LiteralValue::RegExp { pattern, flags } => {
                self.push("/");
                self.push(pattern);
                self.push("/");
                self.push(flags);
            }
        }
    }

    fn type_arguments(&mut self, args: &TypeArguments) {
        self.push("<");
        for (index, arg) in args.params.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.type_annotation(arg);
        }
        self.push(">");
    }

    fn type_parameters(&mut self, params: &TypeParameters) {
        self.push("<");
        for (index, param) in params.params.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.type_parameter(param);
        }
        self.push(">");
    }

    fn type_parameter(&mut self, param: &TypeParameter) {
        if param.const_ {
            self.push("const ");
        }
        self.push(&param.name.name);
        if let Some(constraint) = &param.constraint {
            self.push(" extends ");
            self.type_annotation(constraint);
        }
        if let Some(default) = &param.default {
            self.push(" = ");
            self.type_annotation(default);
        }
    }

    fn params(&mut self, params: &[FunctionParam]) {
        self.push("(");
        for (index, param) in params.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.pattern(&param.pattern);
            if param.optional {
                self.push("?");
            }
            if let Some(ty) = &param.type_annotation {
                self.push(": ");
                self.type_annotation(ty);
            }
        }
        self.push(")");
    }

    fn pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Identifier(id) => self.push(&id.name),
            Pattern::Rest(rest) => {
                self.push("...");
                self.pattern(&rest.argument);
                if let Some(ty) = &rest.type_annotation {
                    self.push(": ");
                    self.type_annotation(ty);
                }
            }
            Pattern::Object(object) => {
                self.push("{ ");
                for (index, property) in object.properties.iter().enumerate() {
                    if index > 0 {
                        self.push(", ");
                    }
                    match property {
                        ObjectPatternProperty::KeyValue {
                            key,
                            value,
                            shorthand,
                            ..
                        } => {
                            if *shorthand {
                                self.pattern(value);
                            } else {
                                self.property_key(key);
                                self.push(": ");
                                self.pattern(value);
                            }
                        }
                        ObjectPatternProperty::Rest(rest) => {
                            self.push("...");
                            self.pattern(&rest.argument);
                        }
                    }
                }
                self.push(" }");
            }
            Pattern::Array(array) => {
                self.push("[");
                for (index, element) in array.elements.iter().enumerate() {
                    if index > 0 {
                        self.push(", ");
                    }
                    if let Some(element) = element {
                        self.pattern(element);
                    }
                }
                self.push("]");
            }
            // Defaults are not allowed in type positions; keep the binding.
            Pattern::Assignment(assign) => self.pattern(&assign.left),
        }
    }

    fn property_key(&mut self, key: &ObjectPropertyKey) {
        match key {
            ObjectPropertyKey::Identifier(id) | ObjectPropertyKey::PrivateIdentifier(id) => {
                self.push(&id.name)
            }
            ObjectPropertyKey::String(s) => {
                if is_identifier_text(&s.value) {
                    self.push(&s.value);
                } else {
                    self.push(&quote(&s.value));
                }
            }
            ObjectPropertyKey::Number(literal) => self.literal(&literal.value),
            // Type text produced by the checker never has computed keys.
            ObjectPropertyKey::Computed(_) => self.push("[\"\"]"),
        }
    }

    fn object_type(&mut self, object: &ObjectType) {
        if object.members.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{ ");
        for member in &object.members {
            match member {
                TypeMember::Property(prop) => {
                    if prop.readonly {
                        self.push("readonly ");
                    }
                    self.property_key(&prop.key);
                    if prop.optional {
                        self.push("?");
                    }
                    self.push(": ");
                    match &prop.type_annotation {
                        Some(ty) => self.type_annotation(ty),
                        None => self.push("any"),
                    }
                }
                TypeMember::Method(method) => {
                    self.property_key(&method.key);
                    if method.optional {
                        self.push("?");
                    }
                    if let Some(type_params) = &method.type_parameters {
                        self.type_parameters(type_params);
                    }
                    self.params(&method.params);
                    self.return_annotation(method.return_type.as_ref());
                }
                TypeMember::Index(index) => {
                    if index.readonly {
                        self.push("readonly ");
                    }
                    self.push("[");
                    self.push(&index.key.name);
                    self.push(": ");
                    self.type_annotation(&index.key_type);
                    self.push("]: ");
                    self.type_annotation(&index.value_type);
                }
                TypeMember::Call(call) => self.call_signature(call),
                TypeMember::Construct(construct) => {
                    self.push("new ");
                    self.call_signature(construct);
                }
            }
            self.push("; ");
        }
        self.push("}");
    }

    fn call_signature(&mut self, call: &CallSignature) {
        if let Some(type_params) = &call.type_parameters {
            self.type_parameters(type_params);
        }
        self.params(&call.params);
        self.return_annotation(call.return_type.as_ref());
    }

    fn return_annotation(&mut self, ty: Option<&TypeAnnotation>) {
        if let Some(ty) = ty {
            self.push(": ");
            self.type_annotation(ty);
        }
    }

    fn tuple(&mut self, tuple: &TupleType) {
        self.push("[");
        for (index, element) in tuple.element_types.iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            if element.rest {
                self.push("...");
            }
            match &element.label {
                Some(label) => {
                    self.push(&label.name);
                    if element.optional {
                        self.push("?");
                    }
                    self.push(": ");
                    self.type_annotation(&element.type_annotation);
                }
                None => {
                    self.operand(&element.type_annotation, element.optional);
                    if element.optional {
                        self.push("?");
                    }
                }
            }
        }
        self.push("]");
    }

    fn mapped(&mut self, mapped: &MappedType) {
        self.push("{ ");
        match mapped.readonly {
            Some(MappedTypeModifier::Add) => self.push("+readonly "),
            Some(MappedTypeModifier::Remove) => self.push("-readonly "),
            Some(MappedTypeModifier::Present) => self.push("readonly "),
            None => {}
        }
        self.push("[");
        self.push(&mapped.type_parameter.name.name);
        self.push(" in ");
        if let Some(constraint) = &mapped.type_parameter.constraint {
            self.type_annotation(constraint);
        }
        if let Some(name_type) = &mapped.name_type {
            self.push(" as ");
            self.type_annotation(name_type);
        }
        self.push("]");
        match mapped.optional {
            Some(MappedTypeModifier::Add) => self.push("+?"),
            Some(MappedTypeModifier::Remove) => self.push("-?"),
            Some(MappedTypeModifier::Present) => self.push("?"),
            None => {}
        }
        if let Some(ty) = &mapped.type_annotation {
            self.push(": ");
            self.type_annotation(ty);
        }
        self.push("; }");
    }
}

/// Double-quoted string literal text.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
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
    out
}

fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::string_dict::StringDict;

    /// Parse `type _ = <text>;` and print the alias body back.
    #[allow(clippy::unwrap_used)]
    fn reprint(text: &str) -> String {
        let mut dict = StringDict::new();
        let source = format!("type _ = {text};");
        let program = Parser::new(&source, &mut dict).parse_program().unwrap();
        let alias = program
            .body
            .iter()
            .find_map(|s| match s {
                Statement::TypeAlias(alias) => Some(alias),
                _ => None,
            })
            .unwrap();
        print_type_node(&alias.type_annotation)
    }

    #[test]
    fn prints_common_forms() {
        let cases = [
            "number",
            "1 | \"string\"",
            "Promise<Response>",
            "(string | number)[]",
            "{ a: number; readonly b?: string; }",
            "{}",
            "[string, number?]",
            "(a: number, ...rest: string[]) => void",
            "Map<string, { id: number; }>",
            "keyof T",
            "T[K]",
            "-1",
            "10n",
            "typeof console",
            "{ m(x: number): string; [key: string]: unknown; }",
        ];
        for case in cases {
            assert_eq!(reprint(case), case);
        }
    }

    #[test]
    fn wraps_functions_in_unions() {
        assert_eq!(reprint("(() => void) | undefined"), "(() => void) | undefined");
    }

    #[test]
    fn quotes_strings() {
        assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }
}
