//! Signatures of bound function-likes and return-type inference.

use std::rc::Rc;

use tracing::trace;

use super::binder::{FunctionRef, PathStep};
use super::declared::{is_this_param, param_display_name};
use super::types::{ObjectShape, ParamInfo, Signature};
use super::{CheckError, NodeKey, ProgramContext, ScopeId, Slot, TypeId};
use crate::ast::*;

/// What the body of a function produces, before async and generator
/// wrapping.
struct BodyTypes {
    values: Vec<TypeId>,
    /// A `return;` without a value was seen.
    bare_return: bool,
    /// Control can fall off the end of the body.
    end_reachable: bool,
}

impl<'a> ProgramContext<'a> {
    /// Call signature of the function-like at `key`. Parameter types come
    /// from annotations, defaults or the contextual signature; the return
    /// type from the annotation or the body.
    pub(crate) fn signature_of(&mut self, key: NodeKey) -> Result<Rc<Signature>, CheckError> {
        match self.signatures.get(&key) {
            Some(Slot::Done(signature)) => return Ok(Rc::clone(signature)),
            Some(Slot::Pending) => {
                trace!(pos = key.pos, "circular signature");
                return Err(CheckError::Circularity(format!("signature at {}", key.pos)));
            }
            None => {}
        }
        let Some(info) = self.binder.function(key) else {
            return Err(CheckError::UnresolvedNode(key.pos));
        };
        let function = info.function;
        let scope = info.scope;

        self.signatures.insert(key, Slot::Pending);
        let signature = Rc::new(self.build_signature(key, function, scope));
        self.signatures.insert(key, Slot::Done(Rc::clone(&signature)));
        Ok(signature)
    }

    fn build_signature(&mut self, key: NodeKey, function: FunctionRef<'a>, scope: ScopeId) -> Signature {
        let type_params = function
            .type_parameters()
            .map(|params| {
                params
                    .params
                    .iter()
                    .filter_map(|p| self.binder.resolve_type(scope, &p.name.name))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
            .map(|symbol| self.type_param_type(symbol))
            .collect();

        let mut params = vec![];
        for (index, param) in function.params().iter().enumerate() {
            if is_this_param(param) {
                continue;
            }
            let ty = match (param.declared_type(), &param.pattern) {
                (Some(ann), _) => self.resolve_annotation(ann, scope),
                (None, Pattern::Assignment(assign)) => {
                    self.parameter_type(key, index, &[PathStep::Default(&assign.right)], scope)
                }
                (None, _) => self.parameter_type(key, index, &[], scope),
            };
            params.push(ParamInfo {
                name: param_display_name(&param.pattern),
                ty,
                optional: param.optional || param.has_initializer(),
                rest: param.is_rest(),
            });
        }

        let (return_type, predicate) = match function.return_type() {
            Some(TypeAnnotation::Predicate(predicate)) if !predicate.asserts => {
                let narrowed = predicate
                    .type_annotation
                    .as_deref()
                    .map(|t| self.resolve_annotation(t, scope))
                    .unwrap_or(TypeId::ANY);
                (
                    TypeId::BOOLEAN,
                    Some((Rc::clone(&predicate.parameter.name), narrowed)),
                )
            }
            Some(TypeAnnotation::Predicate(_)) => (TypeId::VOID, None),
            Some(ann) => (self.resolve_annotation(ann, scope), None),
            None => (self.return_type_of(key), None),
        };

        Signature {
            type_params,
            params,
            return_type,
            predicate,
        }
    }

    /// Return type of the function-like at `key`: the annotation when there
    /// is one, otherwise inferred from the body.
    pub(crate) fn return_type_of(&mut self, key: NodeKey) -> TypeId {
        match self.return_types.get(&key) {
            Some(Slot::Done(ty)) => return *ty,
            Some(Slot::Pending) => {
                trace!(pos = key.pos, "return type depends on itself");
                return TypeId::ANY;
            }
            None => {}
        }
        let Some(info) = self.binder.function(key) else {
            return TypeId::ANY;
        };
        let function = info.function;
        let scope = info.scope;
        if let Some(ann) = function.return_type() {
            return self.resolve_annotation(ann, scope);
        }

        self.return_types.insert(key, Slot::Pending);
        let ty = self.infer_return_type(key, function);
        self.return_types.insert(key, Slot::Done(ty));
        trace!(pos = key.pos, ty = %self.type_to_string(ty), "inferred return type");
        ty
    }

    /// The function-like at `key` as a value: an object type with its
    /// single call signature.
    pub(crate) fn function_type(&mut self, key: NodeKey) -> Result<TypeId, CheckError> {
        if let Some(&ty) = self.function_types.get(&key) {
            return Ok(ty);
        }
        let signature = self.signature_of(key)?;
        let ty = self.types.object(ObjectShape {
            call_signatures: vec![signature],
            ..ObjectShape::default()
        });
        self.function_types.insert(key, ty);
        Ok(ty)
    }

    fn infer_return_type(&mut self, key: NodeKey, function: FunctionRef<'a>) -> TypeId {
        let body = self.body_types(key, function);
        let is_async = function.is_async();

        if function.is_generator() {
            return self.generator_return_type(key, is_async, body);
        }

        let values = if is_async {
            body.values.iter().map(|&ty| self.awaited_type(ty)).collect()
        } else {
            body.values.clone()
        };
        let ty = self.combine_returns(key, values, &body, function);
        if is_async {
            self.promise_of(ty)
        } else {
            ty
        }
    }

    /// Union of the returned values with the rules for literals, nullables
    /// and a reachable end applied.
    fn combine_returns(
        &mut self,
        key: NodeKey,
        values: Vec<TypeId>,
        body: &BodyTypes,
        function: FunctionRef<'a>,
    ) -> TypeId {
        if values.is_empty() {
            let unreachable_end = !body.end_reachable && !body.bare_return;
            let is_expression = matches!(function, FunctionRef::Arrow(_) | FunctionRef::Expression(_));
            let is_method = self.binder.function(key).is_some_and(|info| info.method);
            return if unreachable_end && is_expression && !is_method {
                TypeId::NEVER
            } else {
                TypeId::VOID
            };
        }

        let mut values = values;
        if self.strict() && (body.bare_return || body.end_reachable) {
            values.push(TypeId::UNDEFINED);
        }
        let ty = self.subtype_reduced_union(values);
        if self.types.is_literal(ty) {
            self.widen_literal(ty)
        } else if !self.strict() && ty.is_nullable() {
            TypeId::ANY
        } else {
            self.types.regular_deep(ty)
        }
    }

    fn generator_return_type(&mut self, key: NodeKey, is_async: bool, body: BodyTypes) -> TypeId {
        let yields: Vec<_> = self
            .binder
            .function(key)
            .map(|info| info.yields.clone())
            .unwrap_or_default();
        let mut yielded = vec![];
        for (yield_expr, scope) in yields {
            let ty = match &yield_expr.argument {
                Some(argument) => {
                    let ty = self.check_expression(argument, scope, None);
                    if yield_expr.delegate {
                        self.iterated_type(ty)
                    } else {
                        ty
                    }
                }
                None => TypeId::UNDEFINED,
            };
            let ty = if is_async { self.awaited_type(ty) } else { ty };
            yielded.push(ty);
        }

        let yield_type = if yielded.is_empty() {
            TypeId::NEVER
        } else {
            let ty = self.subtype_reduced_union(yielded);
            if self.types.is_literal(ty) {
                self.widen_literal(ty)
            } else {
                self.types.regular_deep(ty)
            }
        };

        let returned = if body.values.is_empty() {
            TypeId::VOID
        } else {
            let values = if is_async {
                body.values.iter().map(|&ty| self.awaited_type(ty)).collect()
            } else {
                body.values.clone()
            };
            let ty = self.subtype_reduced_union(values);
            if self.types.is_literal(ty) {
                self.widen_literal(ty)
            } else {
                self.types.regular_deep(ty)
            }
        };

        let name = if is_async { "AsyncGenerator" } else { "Generator" };
        self.global_reference(name, vec![yield_type, returned, TypeId::UNKNOWN])
    }

    fn body_types(&mut self, key: NodeKey, function: FunctionRef<'a>) -> BodyTypes {
        if let Some(expr) = function.expression_body() {
            let scope = self
                .binder
                .function(key)
                .map(|info| info.scope)
                .unwrap_or_else(|| self.binder.global_scope());
            let ty = self.check_expression(expr, scope, None);
            return BodyTypes {
                values: vec![ty],
                bare_return: false,
                end_reachable: false,
            };
        }

        let returns: Vec<_> = self
            .binder
            .function(key)
            .map(|info| info.returns.clone())
            .unwrap_or_default();
        let mut values = vec![];
        let mut bare_return = false;
        for (ret, scope) in returns {
            match &ret.argument {
                Some(argument) => values.push(self.check_expression(argument, scope, None)),
                None => bare_return = true,
            }
        }
        let end_reachable = function
            .body()
            .is_none_or(|body| block_completes(&body.body));
        BodyTypes {
            values,
            bare_return,
            end_reachable,
        }
    }
}

/// Whether control can reach the point after `statements`.
pub(crate) fn block_completes(statements: &[Statement]) -> bool {
    statements.iter().all(statement_completes)
}

fn statement_completes(statement: &Statement) -> bool {
    match statement {
        Statement::Return(_) | Statement::Throw(_) => false,
        Statement::Block(block) => block_completes(&block.body),
        Statement::If(if_stmt) => match &if_stmt.alternate {
            Some(alternate) => {
                statement_completes(&if_stmt.consequent) || statement_completes(alternate)
            }
            None => true,
        },
        Statement::While(while_stmt) => {
            !is_true_literal(&while_stmt.test) || breaks_out(&while_stmt.body)
        }
        Statement::DoWhile(do_while) => {
            if is_true_literal(&do_while.test) {
                breaks_out(&do_while.body)
            } else {
                statement_completes(&do_while.body) || breaks_out(&do_while.body)
            }
        }
        Statement::For(for_stmt) => {
            let infinite = for_stmt.test.as_deref().is_none_or(is_true_literal);
            !infinite || breaks_out(&for_stmt.body)
        }
        Statement::Switch(switch) => {
            let has_default = switch.cases.iter().any(|case| case.test.is_none());
            let falls_off_last = switch
                .cases
                .last()
                .is_none_or(|case| block_completes(&case.consequent));
            let breaks = switch
                .cases
                .iter()
                .any(|case| case.consequent.iter().any(breaks_out));
            !has_default || falls_off_last || breaks
        }
        Statement::Try(try_stmt) => {
            let finally_completes = try_stmt
                .finalizer
                .as_ref()
                .is_none_or(|f| block_completes(&f.body));
            let body_completes = block_completes(&try_stmt.block.body)
                || try_stmt
                    .handler
                    .as_ref()
                    .is_some_and(|h| block_completes(&h.body.body));
            finally_completes && body_completes
        }
        Statement::Labeled(labeled) => {
            statement_completes(&labeled.body) || breaks_out(&labeled.body)
        }
        _ => true,
    }
}

/// Whether an unlabeled or labeled `break` inside `statement` can leave the
/// enclosing loop or switch. Nested loops and switches capture unlabeled
/// breaks; labeled ones are assumed to escape.
fn breaks_out(statement: &Statement) -> bool {
    match statement {
        Statement::Break(_) => true,
        Statement::Block(block) => block.body.iter().any(breaks_out),
        Statement::If(if_stmt) => {
            breaks_out(&if_stmt.consequent)
                || if_stmt.alternate.as_deref().is_some_and(breaks_out)
        }
        Statement::Try(try_stmt) => {
            try_stmt.block.body.iter().any(breaks_out)
                || try_stmt
                    .handler
                    .as_ref()
                    .is_some_and(|h| h.body.body.iter().any(breaks_out))
                || try_stmt
                    .finalizer
                    .as_ref()
                    .is_some_and(|f| f.body.iter().any(breaks_out))
        }
        Statement::Labeled(labeled) => breaks_out(&labeled.body),
        Statement::While(w) => labeled_break(&w.body),
        Statement::DoWhile(d) => labeled_break(&d.body),
        Statement::For(f) => labeled_break(&f.body),
        Statement::ForIn(f) => labeled_break(&f.body),
        Statement::ForOf(f) => labeled_break(&f.body),
        Statement::Switch(switch) => switch
            .cases
            .iter()
            .any(|case| case.consequent.iter().any(labeled_break)),
        _ => false,
    }
}

fn labeled_break(statement: &Statement) -> bool {
    match statement {
        Statement::Break(brk) => brk.label.is_some(),
        Statement::Block(block) => block.body.iter().any(labeled_break),
        Statement::If(if_stmt) => {
            labeled_break(&if_stmt.consequent)
                || if_stmt.alternate.as_deref().is_some_and(labeled_break)
        }
        Statement::Labeled(labeled) => labeled_break(&labeled.body),
        Statement::While(w) => labeled_break(&w.body),
        Statement::DoWhile(d) => labeled_break(&d.body),
        Statement::For(f) => labeled_break(&f.body),
        Statement::ForIn(f) => labeled_break(&f.body),
        Statement::ForOf(f) => labeled_break(&f.body),
        Statement::Try(try_stmt) => try_stmt.block.body.iter().any(labeled_break),
        _ => false,
    }
}

fn is_true_literal(expr: &Expression) -> bool {
    match expr {
        Expression::Literal(Literal {
            value: LiteralValue::Boolean(true),
            ..
        }) => true,
        Expression::Parenthesized(inner, _) => is_true_literal(inner),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::string_dict::StringDict;

    #[allow(clippy::unwrap_used)]
    fn first_function_body(source: &str) -> Rc<[Statement]> {
        let mut dict = StringDict::new();
        let program = Parser::new(source, &mut dict).parse_program().unwrap();
        let function = program
            .body
            .iter()
            .find_map(|s| match s {
                Statement::FunctionDeclaration(f) => Some(f),
                _ => None,
            })
            .unwrap();
        Rc::clone(&function.body.as_ref().unwrap().body)
    }

    #[test]
    fn end_reachability() {
        let cases = [
            ("function f() { return 1; }", false),
            ("function f() { if (x) return 1; }", true),
            ("function f() { if (x) return 1; else throw e; }", false),
            ("function f() { while (true) {} }", false),
            ("function f() { while (true) { break; } }", true),
            ("function f() { for (;;) { for (;;) { break; } } }", false),
            ("function f() { try { return 1; } catch (e) {} }", true),
            ("function f() { try { return 1; } finally { g(); } }", false),
            ("function f() { switch (x) { case 1: return 1; default: return 2; } }", false),
            ("function f() { switch (x) { case 1: return 1; } }", true),
        ];
        for (source, expected) in cases {
            assert_eq!(block_completes(&first_function_body(source)), expected, "{source}");
        }
    }
}
