//! Rendering a rewritten program back to text.
//!
//! The output is the original source with `: T` spliced in after the
//! parameter list of every function-like the pass annotated. The rewriter
//! records a [`Splice`] for each one, so nothing here walks the tree again.

use crate::config::{AnnotateOptions, NewLine};
use crate::lexer::Span;

/// A return type added by the pass, keyed by the parameter list it follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub params: Span,
    pub arrow: bool,
    /// Printed type, without the leading `: `.
    pub return_type: String,
}

/// Text to insert at a byte offset of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Insertion {
    offset: usize,
    text: String,
}

impl Splice {
    fn insertions(&self, source: &str, out: &mut Vec<Insertion>) {
        let parenthesized = source.as_bytes().get(self.params.start) == Some(&b'(');
        if self.arrow && !parenthesized {
            // `x => ...` becomes `(x): T => ...`
            out.push(Insertion {
                offset: self.params.start,
                text: "(".to_string(),
            });
            out.push(Insertion {
                offset: self.params.end,
                text: format!("): {}", self.return_type),
            });
        } else {
            out.push(Insertion {
                offset: self.params.end,
                text: format!(": {}", self.return_type),
            });
        }
    }
}

/// Render `source` with `splices` applied.
pub fn serialize(source: &str, splices: &[Splice], options: &AnnotateOptions) -> String {
    let mut insertions = Vec::with_capacity(splices.len());
    for splice in splices {
        splice.insertions(source, &mut insertions);
    }
    insertions.sort_by_key(|insertion| insertion.offset);

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;
    for insertion in &insertions {
        if let Some(chunk) = source.get(cursor..insertion.offset) {
            out.push_str(chunk);
            cursor = insertion.offset;
        }
        out.push_str(&insertion.text);
    }
    out.push_str(source.get(cursor..).unwrap_or_default());
    normalize_line_endings(&out, options.new_line)
}

/// Convert CRLF and lone CR to LF, then to the requested line ending.
pub fn normalize_line_endings(text: &str, new_line: NewLine) -> String {
    let lf = text.replace("\r\n", "\n").replace('\r', "\n");
    match new_line {
        NewLine::Lf => lf,
        NewLine::Crlf => lf.replace('\n', new_line.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Statement};
    use crate::parser::Parser;
    use crate::string_dict::StringDict;

    /// Splice `ty` onto the first top-level arrow bound by a `const`.
    fn with_arrow_return(source: &str, ty: &str) -> String {
        let mut dict = StringDict::new();
        let program = Parser::new(source, &mut dict).parse_program().ok();
        let params = program.as_ref().and_then(|program| {
            program.body.iter().find_map(|stmt| match stmt {
                Statement::VariableDeclaration(decl) => decl
                    .declarations
                    .first()
                    .and_then(|d| d.init.as_deref())
                    .and_then(|init| match init {
                        Expression::ArrowFunction(arrow) => Some(arrow.params_span),
                        _ => None,
                    }),
                _ => None,
            })
        });
        let splices: Vec<Splice> = params
            .into_iter()
            .map(|params| Splice {
                params,
                arrow: true,
                return_type: ty.to_string(),
            })
            .collect();
        serialize(source, &splices, &AnnotateOptions::default())
    }

    #[test]
    fn inserts_after_the_parameter_list() {
        assert_eq!(
            with_arrow_return("const f = (a: number) => a; // keep\n", "number"),
            "const f = (a: number): number => a; // keep\n"
        );
    }

    #[test]
    fn parenthesizes_a_bare_parameter() {
        assert_eq!(
            with_arrow_return("const f = x => 1;", "number"),
            "const f = (x): number => 1;"
        );
        assert_eq!(
            with_arrow_return("const f = async x => 1;", "Promise<number>"),
            "const f = async (x): Promise<number> => 1;"
        );
    }

    #[test]
    fn applies_splices_in_offset_order() {
        let source = "function a() {}\nfunction b(x) {}\n";
        let splices = [
            Splice {
                params: Span::new(26, 29, 2, 11),
                arrow: false,
                return_type: "void".to_string(),
            },
            Splice {
                params: Span::new(10, 12, 1, 11),
                arrow: false,
                return_type: "number".to_string(),
            },
        ];
        assert_eq!(
            serialize(source, &splices, &AnnotateOptions::default()),
            "function a(): number {}\nfunction b(x): void {}\n"
        );
    }

    #[test]
    fn no_splices_round_trips() {
        let source = "/* a */ function f(x) { return x; } // b\n";
        assert_eq!(serialize(source, &[], &AnnotateOptions::default()), source);
    }

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n", NewLine::Lf), "a\nb\nc\n");
        assert_eq!(normalize_line_endings("a\nb\r\n", NewLine::Crlf), "a\r\nb\r\n");
    }
}
