//! The annotation pass.
//!
//! [`Rewriter`] walks a program depth first, pre-order, and returns a new
//! program in which every qualifying function-like carries its inferred
//! return type. Subtrees the pass never changes stay shared with the input.

use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use crate::ast::*;
use crate::builder::build_type_node;
use crate::checker::ProgramContext;
use crate::inferencer::infer_return_type;
use crate::lexer::Span;
use crate::printer::print_type_node;
use crate::serializer::Splice;
use crate::string_dict::Atom;

/// The four node shapes that can receive a return-type annotation.
#[derive(Debug, Clone, Copy)]
pub enum FunctionLike<'n> {
    Declaration(&'n FunctionDeclaration),
    Arrow(&'n ArrowFunctionExpression),
    /// A class method or an object literal method shorthand.
    Method {
        key: &'n ObjectPropertyKey,
        function: &'n FunctionExpression,
    },
    Expression(&'n FunctionExpression),
}

impl<'n> FunctionLike<'n> {
    /// Offset the checker keys this function by.
    pub fn start(&self) -> usize {
        self.span().start
    }

    pub fn span(&self) -> Span {
        match self {
            FunctionLike::Declaration(f) => f.span,
            FunctionLike::Arrow(f) => f.span,
            FunctionLike::Method { function, .. } | FunctionLike::Expression(function) => {
                function.span
            }
        }
    }

    pub fn params_span(&self) -> Span {
        match self {
            FunctionLike::Declaration(f) => f.params_span,
            FunctionLike::Arrow(f) => f.params_span,
            FunctionLike::Method { function, .. } | FunctionLike::Expression(function) => {
                function.params_span
            }
        }
    }

    pub fn return_type(&self) -> Option<&'n TypeAnnotation> {
        match self {
            FunctionLike::Declaration(f) => f.return_type.as_ref(),
            FunctionLike::Arrow(f) => f.return_type.as_ref(),
            FunctionLike::Method { function, .. } | FunctionLike::Expression(function) => {
                function.return_type.as_ref()
            }
        }
    }

    /// Whether the node should receive an annotation.
    ///
    /// Anonymous declarations (`export default function () {}`) and overload
    /// signatures are skipped.
    pub fn qualifies(&self) -> bool {
        if self.return_type().is_some() {
            return false;
        }
        match self {
            FunctionLike::Declaration(f) => f.id.is_some() && f.body.is_some(),
            _ => true,
        }
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            FunctionLike::Declaration(_) => FunctionKind::Declaration,
            FunctionLike::Arrow(_) => FunctionKind::Arrow,
            FunctionLike::Method { .. } => FunctionKind::Method,
            FunctionLike::Expression(_) => FunctionKind::Expression,
        }
    }

    fn name(&self) -> Option<Atom> {
        match self {
            FunctionLike::Declaration(f) => f.id.as_ref().map(|id| Rc::clone(&id.name)),
            FunctionLike::Method { key, .. } => match key {
                ObjectPropertyKey::PrivateIdentifier(id) => Some(Rc::from(format!("#{}", id.name))),
                key => key.static_name(),
            },
            FunctionLike::Expression(f) => f.id.as_ref().map(|id| Rc::clone(&id.name)),
            FunctionLike::Arrow(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionKind {
    Declaration,
    Arrow,
    Method,
    Expression,
}

/// One inserted annotation, as listed by `--report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Declared name, or the binding an anonymous function is assigned to.
    pub name: Option<String>,
    pub kind: FunctionKind,
    pub line: u32,
    pub column: u32,
    pub return_type: String,
}

/// Output of one pass.
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub program: Program,
    pub annotations: Vec<Annotation>,
    /// Where each added return type goes in the source text.
    pub splices: Vec<Splice>,
}

pub struct Rewriter<'c, 'a> {
    ctx: &'c mut ProgramContext<'a>,
    annotations: Vec<Annotation>,
    splices: Vec<Splice>,
}

impl<'c, 'a> Rewriter<'c, 'a> {
    pub fn new(ctx: &'c mut ProgramContext<'a>) -> Self {
        Self {
            ctx,
            annotations: vec![],
            splices: vec![],
        }
    }

    /// Rewrite `program`. The context must have been built from a program
    /// with the same node positions.
    pub fn rewrite(mut self, program: &Program) -> Rewritten {
        let mut body = Rc::clone(&program.body);
        self.statements(&mut body);
        Rewritten {
            program: Program {
                body,
                source_type: program.source_type,
            },
            annotations: self.annotations,
            splices: self.splices,
        }
    }

    /// Infer and build the annotation for a qualifying node.
    fn annotate(&mut self, node: FunctionLike<'_>, hint: Option<Atom>) -> Option<TypeAnnotation> {
        if !node.qualifies() {
            return None;
        }
        let text = infer_return_type(self.ctx, node)?;
        let name = node.name().or(hint);
        let span = node.span();
        debug!(
            name = name.as_deref().unwrap_or("<anonymous>"),
            line = span.line,
            return_type = %text,
            "annotating"
        );
        let return_type = build_type_node(&text);
        self.splices.push(Splice {
            params: node.params_span(),
            arrow: matches!(node, FunctionLike::Arrow(_)),
            return_type: print_type_node(&return_type),
        });
        self.annotations.push(Annotation {
            name: name.map(|n| n.to_string()),
            kind: node.kind(),
            line: span.line,
            column: span.column,
            return_type: text,
        });
        Some(return_type)
    }

    // ----- statements -----

    fn statements(&mut self, body: &mut Rc<[Statement]>) {
        for stmt in Rc::make_mut(body).iter_mut() {
            self.statement(stmt);
        }
    }

    fn nested(&mut self, stmt: &mut Rc<Statement>) {
        self.statement(Rc::make_mut(stmt));
    }

    fn block(&mut self, block: &mut Rc<BlockStatement>) {
        self.statements(&mut Rc::make_mut(block).body);
    }

    fn statement(&mut self, stmt: &mut Statement) {
        match stmt {
            Statement::VariableDeclaration(decl) => self.variable_declaration(decl),
            Statement::FunctionDeclaration(func) => self.function_declaration(func),
            Statement::ClassDeclaration(class) => {
                self.decorators(&mut class.decorators);
                if let Some(super_class) = &mut class.super_class {
                    self.expression(super_class);
                }
                self.class_body(&mut class.body);
            }
            Statement::EnumDeclaration(decl) => {
                for member in decl.members.iter_mut() {
                    if let Some(init) = &mut member.initializer {
                        self.expression(init);
                    }
                }
            }
            Statement::NamespaceDeclaration(ns) => self.statements(&mut ns.body),
            Statement::Block(block) => self.statements(&mut block.body),
            Statement::If(stmt) => {
                self.expression(&mut stmt.test);
                self.nested(&mut stmt.consequent);
                if let Some(alternate) = &mut stmt.alternate {
                    self.nested(alternate);
                }
            }
            Statement::Switch(stmt) => {
                self.expression(&mut stmt.discriminant);
                for case in Rc::make_mut(&mut stmt.cases).iter_mut() {
                    if let Some(test) = &mut case.test {
                        self.expression(test);
                    }
                    self.statements(&mut case.consequent);
                }
            }
            Statement::For(stmt) => {
                match &mut stmt.init {
                    Some(ForInit::Variable(decl)) => self.variable_declaration(decl),
                    Some(ForInit::Expression(expr)) => self.expression(expr),
                    None => {}
                }
                if let Some(test) = &mut stmt.test {
                    self.expression(test);
                }
                if let Some(update) = &mut stmt.update {
                    self.expression(update);
                }
                self.nested(&mut stmt.body);
            }
            Statement::ForIn(stmt) => {
                self.for_left(&mut stmt.left);
                self.expression(&mut stmt.right);
                self.nested(&mut stmt.body);
            }
            Statement::ForOf(stmt) => {
                self.for_left(&mut stmt.left);
                self.expression(&mut stmt.right);
                self.nested(&mut stmt.body);
            }
            Statement::While(stmt) => {
                self.expression(&mut stmt.test);
                self.nested(&mut stmt.body);
            }
            Statement::DoWhile(stmt) => {
                self.nested(&mut stmt.body);
                self.expression(&mut stmt.test);
            }
            Statement::Try(stmt) => {
                self.statements(&mut stmt.block.body);
                if let Some(handler) = &mut stmt.handler {
                    if let Some(param) = &mut handler.param {
                        self.pattern(param);
                    }
                    self.statements(&mut handler.body.body);
                }
                if let Some(finalizer) = &mut stmt.finalizer {
                    self.statements(&mut finalizer.body);
                }
            }
            Statement::Return(stmt) => {
                if let Some(argument) = &mut stmt.argument {
                    self.expression(argument);
                }
            }
            Statement::Throw(stmt) => self.expression(&mut stmt.argument),
            Statement::Export(export) => {
                if let Some(declaration) = &mut export.declaration {
                    self.nested(declaration);
                }
            }
            Statement::Expression(stmt) => self.expression(&mut stmt.expression),
            Statement::Labeled(stmt) => self.nested(&mut stmt.body),
            Statement::TypeAlias(_)
            | Statement::InterfaceDeclaration(_)
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Import(_)
            | Statement::Empty
            | Statement::Debugger => {}
        }
    }

    fn variable_declaration(&mut self, decl: &mut VariableDeclaration) {
        for declarator in Rc::make_mut(&mut decl.declarations).iter_mut() {
            self.pattern(&mut declarator.id);
            if let Some(init) = &mut declarator.init {
                let hint = declarator.id.simple_name().map(|id| Rc::clone(&id.name));
                self.expression_hinted(init, hint);
            }
        }
    }

    fn for_left(&mut self, left: &mut ForInOfLeft) {
        match left {
            ForInOfLeft::Variable(decl) => self.variable_declaration(decl),
            ForInOfLeft::Pattern(pattern) => self.pattern(pattern),
        }
    }

    fn function_declaration(&mut self, func: &mut FunctionDeclaration) {
        if let Some(return_type) = self.annotate(FunctionLike::Declaration(func), None) {
            *func = declaration_with_return_type(func, return_type);
        }
        self.params(&mut func.params);
        if let Some(body) = &mut func.body {
            self.block(body);
        }
    }

    fn class_body(&mut self, body: &mut ClassBody) {
        for member in Rc::make_mut(&mut body.members).iter_mut() {
            match member {
                ClassMember::Method(method) => {
                    if method.kind == MethodKind::Method
                        && let Some(return_type) = self.annotate(
                            FunctionLike::Method {
                                key: &method.key,
                                function: &method.value,
                            },
                            None,
                        )
                    {
                        method.value = expression_with_return_type(&method.value, return_type);
                    }
                    self.decorators(&mut method.decorators);
                    self.property_key(&mut method.key);
                    self.function_children(&mut method.value);
                }
                ClassMember::Property(prop) => {
                    self.decorators(&mut prop.decorators);
                    self.property_key(&mut prop.key);
                    if let Some(value) = &mut prop.value {
                        let hint = prop.key.static_name();
                        self.expression_hinted(value, hint);
                    }
                }
                ClassMember::Constructor(ctor) => {
                    self.params(&mut ctor.params);
                    if let Some(body) = &mut ctor.body {
                        self.block(body);
                    }
                }
                ClassMember::StaticBlock(block) => self.statements(&mut block.body),
                ClassMember::MethodSignature(_) | ClassMember::Index(_) => {}
            }
        }
    }

    // ----- expressions -----

    fn expression(&mut self, expr: &mut Rc<Expression>) {
        self.expression_node(Rc::make_mut(expr), None);
    }

    fn expression_hinted(&mut self, expr: &mut Rc<Expression>, hint: Option<Atom>) {
        self.expression_node(Rc::make_mut(expr), hint);
    }

    /// `hint` names the binding the expression is assigned to, for reporting.
    fn expression_node(&mut self, expr: &mut Expression, hint: Option<Atom>) {
        match expr {
            Expression::Function(func) => {
                if let Some(return_type) = self.annotate(FunctionLike::Expression(func), hint) {
                    *func = expression_with_return_type(func, return_type);
                }
                self.function_children(func);
            }
            Expression::ArrowFunction(arrow) => {
                if let Some(return_type) = self.annotate(FunctionLike::Arrow(arrow), hint) {
                    *arrow = arrow_with_return_type(arrow, return_type);
                }
                self.params(&mut arrow.params);
                match Rc::make_mut(&mut arrow.body) {
                    ArrowFunctionBody::Expression(body) => self.expression(body),
                    ArrowFunctionBody::Block(body) => self.block(body),
                }
            }
            Expression::Class(class) => {
                self.decorators(&mut class.decorators);
                if let Some(super_class) = &mut class.super_class {
                    self.expression(super_class);
                }
                self.class_body(&mut class.body);
            }
            Expression::Array(array) => {
                for element in array.elements.iter_mut().flatten() {
                    match element {
                        ArrayElement::Expression(expr) => self.expression_node(expr, None),
                        ArrayElement::Spread(spread) => self.expression(&mut spread.argument),
                    }
                }
            }
            Expression::Object(object) => self.object(object),
            Expression::Template(template) => self.template(template),
            Expression::TaggedTemplate(tagged) => {
                self.expression(&mut tagged.tag);
                self.template(&mut tagged.quasi);
            }
            Expression::Unary(unary) => self.expression(&mut unary.argument),
            Expression::Binary(binary) => {
                self.expression(&mut binary.left);
                self.expression(&mut binary.right);
            }
            Expression::Logical(logical) => {
                self.expression(&mut logical.left);
                self.expression(&mut logical.right);
            }
            Expression::Conditional(cond) => {
                self.expression(&mut cond.test);
                self.expression(&mut cond.consequent);
                self.expression(&mut cond.alternate);
            }
            Expression::Assignment(assign) => {
                let hint = match &mut assign.left {
                    AssignmentTarget::Identifier(id) => Some(Rc::clone(&id.name)),
                    AssignmentTarget::Member(member) => {
                        self.member(member);
                        match &member.property {
                            MemberProperty::Identifier(id) => Some(Rc::clone(&id.name)),
                            _ => None,
                        }
                    }
                    AssignmentTarget::Pattern(pattern) => {
                        self.pattern(pattern);
                        None
                    }
                };
                self.expression_hinted(&mut assign.right, hint);
            }
            Expression::Update(update) => self.expression(&mut update.argument),
            Expression::Sequence(seq) => {
                for expr in seq.expressions.iter_mut() {
                    self.expression_node(expr, None);
                }
            }
            Expression::Member(member) => self.member(member),
            Expression::Call(call) => {
                self.expression(&mut call.callee);
                self.arguments(&mut call.arguments);
            }
            Expression::New(new) => {
                self.expression(&mut new.callee);
                self.arguments(&mut new.arguments);
            }
            Expression::TypeAssertion(assertion) | Expression::Satisfies(assertion) => {
                self.expression_hinted(&mut assertion.expression, hint);
            }
            Expression::NonNull(non_null) => self.expression(&mut non_null.expression),
            Expression::Spread(spread) => self.expression(&mut spread.argument),
            Expression::Yield(yield_expr) => {
                if let Some(argument) = &mut yield_expr.argument {
                    self.expression(argument);
                }
            }
            Expression::Await(await_expr) => self.expression(&mut await_expr.argument),
            Expression::Parenthesized(inner, _) => self.expression_hinted(inner, hint),
            Expression::Literal(_)
            | Expression::Identifier(_)
            | Expression::This(_)
            | Expression::Super(_) => {}
        }
    }

    fn object(&mut self, object: &mut ObjectExpression) {
        for property in object.properties.iter_mut() {
            match property {
                ObjectProperty::Spread(spread) => self.expression(&mut spread.argument),
                ObjectProperty::Property(prop) => {
                    self.property_key(&mut prop.key);
                    match (&mut prop.value, prop.method, prop.kind) {
                        (Expression::Function(function), true, PropertyKind::Init) => {
                            if let Some(return_type) = self.annotate(
                                FunctionLike::Method {
                                    key: &prop.key,
                                    function,
                                },
                                None,
                            ) {
                                *function = expression_with_return_type(function, return_type);
                            }
                            self.function_children(function);
                        }
                        // Accessors never qualify.
                        (Expression::Function(function), _, PropertyKind::Get | PropertyKind::Set) => {
                            self.function_children(function);
                        }
                        (value, _, _) => {
                            let hint = prop.key.static_name();
                            self.expression_node(value, hint);
                        }
                    }
                }
            }
        }
    }

    fn function_children(&mut self, func: &mut FunctionExpression) {
        self.params(&mut func.params);
        self.block(&mut func.body);
    }

    fn member(&mut self, member: &mut MemberExpression) {
        self.expression(&mut member.object);
        if let MemberProperty::Expression(property) = &mut member.property {
            self.expression(property);
        }
    }

    fn arguments(&mut self, arguments: &mut [Argument]) {
        for argument in arguments.iter_mut() {
            match argument {
                Argument::Expression(expr) => self.expression_node(expr, None),
                Argument::Spread(spread) => self.expression(&mut spread.argument),
            }
        }
    }

    fn template(&mut self, template: &mut TemplateLiteral) {
        for expr in template.expressions.iter_mut() {
            self.expression_node(expr, None);
        }
    }

    fn decorators(&mut self, decorators: &mut [Decorator]) {
        for decorator in decorators.iter_mut() {
            self.expression(&mut decorator.expression);
        }
    }

    fn property_key(&mut self, key: &mut ObjectPropertyKey) {
        if let ObjectPropertyKey::Computed(expr) = key {
            self.expression(expr);
        }
    }

    // ----- patterns -----

    fn params(&mut self, params: &mut Rc<[FunctionParam]>) {
        for param in Rc::make_mut(params).iter_mut() {
            self.decorators(&mut param.decorators);
            self.pattern(&mut param.pattern);
        }
    }

    fn pattern(&mut self, pattern: &mut Pattern) {
        match pattern {
            Pattern::Identifier(_) => {}
            Pattern::Object(object) => {
                for property in object.properties.iter_mut() {
                    match property {
                        ObjectPatternProperty::KeyValue { key, value, .. } => {
                            self.property_key(key);
                            self.pattern(value);
                        }
                        ObjectPatternProperty::Rest(rest) => self.pattern(&mut rest.argument),
                    }
                }
            }
            Pattern::Array(array) => {
                for element in array.elements.iter_mut().flatten() {
                    self.pattern(element);
                }
            }
            Pattern::Rest(rest) => self.pattern(&mut rest.argument),
            Pattern::Assignment(assign) => {
                self.pattern(&mut assign.left);
                let hint = assign.left.simple_name().map(|id| Rc::clone(&id.name));
                self.expression_hinted(&mut assign.right, hint);
            }
        }
    }
}

// Copies of each function-like with only the return type replaced.

fn declaration_with_return_type(
    func: &FunctionDeclaration,
    return_type: TypeAnnotation,
) -> FunctionDeclaration {
    FunctionDeclaration {
        id: func.id.clone(),
        params: Rc::clone(&func.params),
        params_span: func.params_span,
        return_type: Some(return_type),
        type_parameters: func.type_parameters.clone(),
        body: func.body.clone(),
        generator: func.generator,
        async_: func.async_,
        declare: func.declare,
        span: func.span,
    }
}

fn arrow_with_return_type(
    arrow: &ArrowFunctionExpression,
    return_type: TypeAnnotation,
) -> ArrowFunctionExpression {
    ArrowFunctionExpression {
        params: Rc::clone(&arrow.params),
        params_span: arrow.params_span,
        return_type: Some(return_type),
        type_parameters: arrow.type_parameters.clone(),
        body: Rc::clone(&arrow.body),
        async_: arrow.async_,
        span: arrow.span,
    }
}

fn expression_with_return_type(
    func: &FunctionExpression,
    return_type: TypeAnnotation,
) -> FunctionExpression {
    FunctionExpression {
        id: func.id.clone(),
        params: Rc::clone(&func.params),
        params_span: func.params_span,
        return_type: Some(return_type),
        type_parameters: func.type_parameters.clone(),
        body: Rc::clone(&func.body),
        generator: func.generator,
        async_: func.async_,
        span: func.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CheckOptions, parse_lib};
    use crate::parser::Parser;
    use crate::string_dict::StringDict;

    #[allow(clippy::unwrap_used)]
    fn rewrite(source: &str) -> Rewritten {
        let mut dict = StringDict::new();
        let program = Parser::new(source, &mut dict).parse_program().unwrap();
        let lib = parse_lib(&mut dict).unwrap();
        let mut ctx = ProgramContext::new(&program, Some(&lib), CheckOptions::default());
        Rewriter::new(&mut ctx).rewrite(&program)
    }

    fn annotations(source: &str) -> Vec<Annotation> {
        rewrite(source).annotations
    }

    fn summary(source: &str) -> Vec<(Option<String>, FunctionKind, String)> {
        annotations(source)
            .into_iter()
            .map(|a| (a.name, a.kind, a.return_type))
            .collect()
    }

    fn named(name: &str, kind: FunctionKind, ty: &str) -> (Option<String>, FunctionKind, String) {
        (Some(name.to_string()), kind, ty.to_string())
    }

    #[test]
    fn visits_the_four_shapes_in_source_order() {
        let found = summary(
            "function f() { return 1; }\n\
             const g = (x: number) => x;\n\
             class C { m() { return \"s\"; } }\n\
             const h = function () { return true; };\n",
        );
        assert_eq!(
            found,
            vec![
                named("f", FunctionKind::Declaration, "number"),
                named("g", FunctionKind::Arrow, "number"),
                named("m", FunctionKind::Method, "string"),
                named("h", FunctionKind::Expression, "boolean"),
            ]
        );
    }

    #[test]
    fn skips_accessors_constructors_and_annotated_nodes() {
        let found = summary(
            "class C {\n\
               constructor() {}\n\
               get x() { return 1; }\n\
               set x(v: number) {}\n\
               m(): string { return \"\"; }\n\
             }\n\
             const o = { get y() { return 2; }, n() { return 3; } };\n",
        );
        assert_eq!(found, vec![named("n", FunctionKind::Method, "number")]);
    }

    #[test]
    fn descends_into_unqualified_nodes() {
        let found = summary(
            "export default function () { const inner = () => 1; }\n\
             function annotated(): void { [1].map(function (x) { return x; }); }\n",
        );
        assert_eq!(
            found,
            vec![
                named("inner", FunctionKind::Arrow, "number"),
                (None, FunctionKind::Expression, "number".to_string()),
            ]
        );
    }

    #[test]
    fn leaves_overload_signatures_alone() {
        let found = summary(
            "function pick(x: string): string;\n\
             function pick(x: number): number;\n\
             function pick(x: any) { return x; }\n",
        );
        assert_eq!(found, vec![named("pick", FunctionKind::Declaration, "any")]);
    }

    #[test]
    fn records_positions() {
        let found = annotations("\n  function f() {}\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().map(|a| (a.line, a.column)), Some((2, 3)));
    }

    #[test]
    fn records_a_splice_per_annotation() {
        let source = "const f = x => 1;\nfunction g(a: string) { return a; }\n";
        let rewritten = rewrite(source);
        let splices: Vec<(&str, bool, &str)> = rewritten
            .splices
            .iter()
            .map(|s| {
                let params = source.get(s.params.start..s.params.end).unwrap_or_default();
                (params, s.arrow, s.return_type.as_str())
            })
            .collect();
        assert_eq!(splices, vec![("x", true, "number"), ("(a: string)", false, "string")]);
        assert_eq!(rewritten.annotations.len(), rewritten.splices.len());
    }

    #[test]
    fn rewritten_program_carries_detached_return_types() {
        let rewritten = rewrite("function f() { return 1; }\n");
        let return_type = match rewritten.program.body.first() {
            Some(Statement::FunctionDeclaration(func)) => func.return_type.as_ref(),
            _ => None,
        };
        assert!(return_type.is_some_and(|ty| ty.span().is_detached()));
    }
}
