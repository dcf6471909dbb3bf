//! Return-type annotation for TypeScript sources
//!
//! Every function declaration, method, arrow function and function
//! expression without a return type gets the type the checker infers for it.
//! Everything else in the file, comments included, is kept byte for byte.
//!
//! # Example
//!
//! ```
//! let out = tsannotate::rewrite("function sum(a: number, b: number) { return a + b; }").unwrap();
//! assert_eq!(out, "function sum(a: number, b: number): number { return a + b; }");
//! ```

pub mod ast;
pub mod builder;
pub mod checker;
pub mod config;
pub mod error;
pub mod inferencer;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod rewriter;
pub mod serializer;
pub mod string_dict;
#[cfg(feature = "cli")]
pub mod tracing_config;

pub use config::{AnnotateOptions, NewLine};
pub use error::AnnotateError;
pub use rewriter::{Annotation, FunctionKind};

use tracing::{debug, error};

use checker::{ProgramContext, parse_lib};
use parser::Parser;
use rewriter::Rewriter;
use string_dict::StringDict;

/// Result of annotating one source text.
#[derive(Debug, Clone)]
pub struct Annotated {
    pub text: String,
    /// The inserted annotations in visiting order.
    pub annotations: Vec<Annotation>,
}

/// Annotate `source` with default options.
pub fn rewrite(source: &str) -> Result<String, AnnotateError> {
    rewrite_with_options(source, &AnnotateOptions::default())
}

pub fn rewrite_with_options(source: &str, options: &AnnotateOptions) -> Result<String, AnnotateError> {
    annotate(source, options).map(|annotated| annotated.text)
}

/// Annotate `source`, returning the text and what was inserted.
///
/// Only a source that fails to parse is an error; functions whose type
/// cannot be inferred are left as they are.
pub fn annotate(source: &str, options: &AnnotateOptions) -> Result<Annotated, AnnotateError> {
    let mut string_dict = StringDict::new();
    let program = Parser::new(source, &mut string_dict).parse_program()?;
    let lib = if options.include_lib {
        Some(parse_lib(&mut string_dict)?)
    } else {
        None
    };

    let mut ctx = ProgramContext::new(&program, lib.as_ref(), options.check_options());
    let rewritten = Rewriter::new(&mut ctx).rewrite(&program);
    debug!(count = rewritten.annotations.len(), "annotations inserted");

    let text = serializer::serialize(source, &rewritten.splices, options);
    Ok(Annotated {
        text,
        annotations: rewritten.annotations,
    })
}

/// Hook for a formatting pipeline: never fails.
///
/// On a whole-pass failure the error is logged and `source` is returned
/// unchanged.
pub fn preprocess(source: &str, options: &AnnotateOptions) -> String {
    match rewrite_with_options(source, options) {
        Ok(text) => text,
        Err(err) => {
            error!(%err, "return type annotation failed; leaving source unchanged");
            source.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_with_default_options() {
        let out = rewrite("const f = () => \"x\";\n").ok();
        assert_eq!(out.as_deref(), Some("const f = (): string => \"x\";\n"));
    }

    #[test]
    fn syntax_errors_surface_from_rewrite() {
        let result = rewrite("function (");
        assert!(matches!(result, Err(AnnotateError::SyntaxError { .. })));
    }

    #[test]
    fn preprocess_returns_the_input_on_failure() {
        let source = "let = ;";
        assert_eq!(preprocess(source, &AnnotateOptions::default()), source);
    }

    #[test]
    fn annotate_reports_insertions() {
        let annotated = annotate("function f() {}\n", &AnnotateOptions::default()).ok();
        let report = annotated.map(|a| a.annotations);
        assert_eq!(
            report,
            Some(vec![Annotation {
                name: Some("f".to_string()),
                kind: FunctionKind::Declaration,
                line: 1,
                column: 1,
                return_type: "void".to_string(),
            }])
        );
    }
}
