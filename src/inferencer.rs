//! Return-type inference for a single function-like node.

use std::rc::Rc;

use tracing::debug;

use crate::checker::{CheckError, ProgramContext, Signature};
use crate::rewriter::FunctionLike;

/// Infer the return type of `node` and render it as TypeScript text.
///
/// Declarations and methods are resolved from their own signature; arrows
/// and function expressions are typed as expressions in their surrounding
/// context and the first call signature is read. `None` leaves the node
/// without an annotation.
pub fn infer_return_type(ctx: &mut ProgramContext<'_>, node: FunctionLike<'_>) -> Option<String> {
    let start = node.start();
    let signature = match node {
        FunctionLike::Declaration(_) | FunctionLike::Method { .. } => {
            ctx.signature_of_declaration(start)
        }
        FunctionLike::Arrow(_) | FunctionLike::Expression(_) => expression_signature(ctx, start),
    };
    match signature {
        Ok(signature) => Some(render_return(ctx, &signature)),
        Err(err) => {
            debug!(start, %err, "return type not inferred");
            None
        }
    }
}

fn expression_signature(
    ctx: &mut ProgramContext<'_>,
    start: usize,
) -> Result<Rc<Signature>, CheckError> {
    let ty = ctx.type_of_function_expression(start)?;
    ctx.call_signatures(ty)
        .into_iter()
        .next()
        .ok_or(CheckError::NoCallSignature)
}

fn render_return(ctx: &ProgramContext<'_>, signature: &Signature) -> String {
    match &signature.predicate {
        Some((parameter, ty)) => format!("{parameter} is {}", ctx.type_to_string(*ty)),
        None => ctx.type_to_string(signature.return_type),
    }
}
