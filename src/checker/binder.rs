//! Scope and symbol construction.
//!
//! The binder walks a whole program once, before any type is computed. It
//! builds an arena of lexical scopes with separate value and type namespaces,
//! hoists declarations into them and records, for every function-like node,
//! where its `return` and `yield` sites are and which top-level expression
//! encloses it. The checker uses these records to type things on demand
//! without ever walking the tree again.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{FileId, NodeKey};
use crate::ast::*;
use crate::string_dict::Atom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// A function-like node of any shape.
#[derive(Debug, Clone, Copy)]
pub enum FunctionRef<'a> {
    Declaration(&'a FunctionDeclaration),
    /// Function expressions, class methods and object literal methods.
    Expression(&'a FunctionExpression),
    Arrow(&'a ArrowFunctionExpression),
    Constructor(&'a ClassConstructor),
}

impl<'a> FunctionRef<'a> {
    pub fn span(&self) -> crate::lexer::Span {
        match self {
            FunctionRef::Declaration(f) => f.span,
            FunctionRef::Expression(f) => f.span,
            FunctionRef::Arrow(f) => f.span,
            FunctionRef::Constructor(c) => c.span,
        }
    }

    pub fn params(&self) -> &'a [FunctionParam] {
        match self {
            FunctionRef::Declaration(f) => &f.params,
            FunctionRef::Expression(f) => &f.params,
            FunctionRef::Arrow(f) => &f.params,
            FunctionRef::Constructor(c) => &c.params,
        }
    }

    pub fn return_type(&self) -> Option<&'a TypeAnnotation> {
        match self {
            FunctionRef::Declaration(f) => f.return_type.as_ref(),
            FunctionRef::Expression(f) => f.return_type.as_ref(),
            FunctionRef::Arrow(f) => f.return_type.as_ref(),
            FunctionRef::Constructor(_) => None,
        }
    }

    pub fn type_parameters(&self) -> Option<&'a TypeParameters> {
        match self {
            FunctionRef::Declaration(f) => f.type_parameters.as_ref(),
            FunctionRef::Expression(f) => f.type_parameters.as_ref(),
            FunctionRef::Arrow(f) => f.type_parameters.as_ref(),
            FunctionRef::Constructor(_) => None,
        }
    }

    pub fn is_async(&self) -> bool {
        match self {
            FunctionRef::Declaration(f) => f.async_,
            FunctionRef::Expression(f) => f.async_,
            FunctionRef::Arrow(f) => f.async_,
            FunctionRef::Constructor(_) => false,
        }
    }

    pub fn is_generator(&self) -> bool {
        match self {
            FunctionRef::Declaration(f) => f.generator,
            FunctionRef::Expression(f) => f.generator,
            FunctionRef::Arrow(_) | FunctionRef::Constructor(_) => false,
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self, FunctionRef::Arrow(_))
    }

    /// The block body, if there is one.
    pub fn body(&self) -> Option<&'a BlockStatement> {
        match self {
            FunctionRef::Declaration(f) => f.body.as_deref(),
            FunctionRef::Expression(f) => Some(&f.body),
            FunctionRef::Arrow(f) => match f.body.as_ref() {
                ArrowFunctionBody::Block(block) => Some(block),
                ArrowFunctionBody::Expression(_) => None,
            },
            FunctionRef::Constructor(c) => c.body.as_deref(),
        }
    }

    /// The body of `x => expr`.
    pub fn expression_body(&self) -> Option<&'a Expression> {
        match self {
            FunctionRef::Arrow(f) => match f.body.as_ref() {
                ArrowFunctionBody::Expression(expr) => Some(expr),
                ArrowFunctionBody::Block(_) => None,
            },
            _ => None,
        }
    }

    pub fn has_body(&self) -> bool {
        self.body().is_some() || self.expression_body().is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ClassRef<'a> {
    Declaration(&'a ClassDeclaration),
    Expression(&'a ClassExpression),
}

impl<'a> ClassRef<'a> {
    pub fn span(&self) -> crate::lexer::Span {
        match self {
            ClassRef::Declaration(c) => c.span,
            ClassRef::Expression(c) => c.span,
        }
    }

    pub fn id(&self) -> Option<&'a Identifier> {
        match self {
            ClassRef::Declaration(c) => c.id.as_ref(),
            ClassRef::Expression(c) => c.id.as_ref(),
        }
    }

    pub fn type_parameters(&self) -> Option<&'a TypeParameters> {
        match self {
            ClassRef::Declaration(c) => c.type_parameters.as_ref(),
            ClassRef::Expression(c) => c.type_parameters.as_ref(),
        }
    }

    pub fn super_class(&self) -> Option<&'a Expression> {
        match self {
            ClassRef::Declaration(c) => c.super_class.as_deref(),
            ClassRef::Expression(c) => c.super_class.as_deref(),
        }
    }

    pub fn super_type_arguments(&self) -> Option<&'a TypeArguments> {
        match self {
            ClassRef::Declaration(c) => c.super_type_arguments.as_ref(),
            ClassRef::Expression(c) => c.super_type_arguments.as_ref(),
        }
    }

    pub fn members(&self) -> &'a [ClassMember] {
        match self {
            ClassRef::Declaration(c) => &c.body.members,
            ClassRef::Expression(c) => &c.body.members,
        }
    }
}

/// One step from a destructuring root to the bound name.
#[derive(Debug, Clone)]
pub enum PathStep<'a> {
    Property(Atom),
    Index(usize),
    /// `[a, ...rest]`: elements from the index on.
    ArrayRest(usize),
    /// `{ a, ...rest }`: the remaining properties.
    ObjectRest(Vec<Atom>),
    /// `x = fallback`: the value or the fallback.
    Default(&'a Expression),
    /// Computed keys and other steps the checker cannot follow.
    Unknown,
}

pub type BindingPath<'a> = Rc<[PathStep<'a>]>;

#[derive(Debug, Clone)]
pub enum Decl<'a> {
    Variable {
        declarator: &'a VariableDeclarator,
        kind: VariableKind,
        path: BindingPath<'a>,
        scope: ScopeId,
    },
    Parameter {
        function: NodeKey,
        index: usize,
        path: BindingPath<'a>,
        scope: ScopeId,
    },
    CatchParameter,
    /// `for (const x of xs)` and `for (const k in o)`.
    ForBinding {
        right: &'a Expression,
        of: bool,
        path: BindingPath<'a>,
        scope: ScopeId,
    },
    Function {
        function: FunctionRef<'a>,
        key: NodeKey,
    },
    Class {
        class: ClassRef<'a>,
        scope: ScopeId,
    },
    Interface {
        decl: &'a InterfaceDeclaration,
        scope: ScopeId,
    },
    TypeAlias {
        decl: &'a TypeAliasDeclaration,
        scope: ScopeId,
    },
    Enum {
        decl: &'a EnumDeclaration,
        scope: ScopeId,
    },
    /// `scope` holds the namespace members.
    Namespace {
        scope: ScopeId,
    },
    Import,
    TypeParameter {
        param: &'a TypeParameter,
        scope: ScopeId,
    },
}

#[derive(Debug)]
pub struct Symbol<'a> {
    pub name: Atom,
    pub decls: Vec<Decl<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    File,
    Function(NodeKey),
    Class(SymbolId),
    Block,
    Namespace,
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub file: FileId,
    values: FxHashMap<Atom, SymbolId>,
    types: FxHashMap<Atom, SymbolId>,
}

/// The outermost expression a node was found in, with what is needed to
/// type it in isolation.
#[derive(Debug, Clone, Copy)]
pub struct RootExpr<'a> {
    pub expr: &'a Expression,
    pub scope: ScopeId,
    pub contextual: Option<&'a TypeAnnotation>,
}

#[derive(Debug, Clone, Copy)]
pub enum ThisBinding {
    /// `this` inside a method or property initializer of the class.
    Class { class: SymbolId, static_: bool },
    /// Arrows see the `this` of their enclosing function.
    Lexical,
    Dynamic,
}

#[derive(Debug)]
pub struct FunctionInfo<'a> {
    pub function: FunctionRef<'a>,
    /// Scope holding parameters and body declarations.
    pub scope: ScopeId,
    pub root: Option<RootExpr<'a>>,
    pub returns: Vec<(&'a ReturnStatement, ScopeId)>,
    pub yields: Vec<(&'a YieldExpression, ScopeId)>,
    pub this: ThisBinding,
    /// Class methods, accessors and object literal methods.
    pub method: bool,
}

#[derive(Debug)]
pub struct ClassInfo<'a> {
    pub class: ClassRef<'a>,
    pub scope: ScopeId,
}

#[derive(Clone, Copy)]
enum Namespaces {
    Value,
    Type,
    Both,
}

pub struct Binder<'a> {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol<'a>>,
    functions: FxHashMap<NodeKey, FunctionInfo<'a>>,
    classes: FxHashMap<SymbolId, ClassInfo<'a>>,
    class_symbols: FxHashMap<NodeKey, SymbolId>,
    block_scopes: FxHashMap<NodeKey, ScopeId>,
    global: ScopeId,

    // Walk state
    file: FileId,
    scope: ScopeId,
    var_scope: ScopeId,
    function: Option<NodeKey>,
    root: Option<RootExpr<'a>>,
}

impl<'a> Binder<'a> {
    pub fn new() -> Self {
        let global = Scope {
            parent: None,
            kind: ScopeKind::Global,
            file: FileId::LIB,
            values: FxHashMap::default(),
            types: FxHashMap::default(),
        };
        Self {
            scopes: vec![global],
            symbols: vec![],
            functions: FxHashMap::default(),
            classes: FxHashMap::default(),
            class_symbols: FxHashMap::default(),
            block_scopes: FxHashMap::default(),
            global: ScopeId(0),
            file: FileId::LIB,
            scope: ScopeId(0),
            var_scope: ScopeId(0),
            function: None,
            root: None,
        }
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    /// Bind the declaration library straight into the global scope.
    pub fn bind_lib(&mut self, program: &'a Program) {
        self.file = FileId::LIB;
        self.scope = self.global;
        self.var_scope = self.global;
        self.bind_statements(&program.body);
    }

    /// Bind a source file into its own scope under the global one.
    pub fn bind_source(&mut self, program: &'a Program, file: FileId) -> ScopeId {
        self.file = file;
        let scope = self.push_scope(ScopeKind::File, Some(self.global));
        self.scope = scope;
        self.var_scope = scope;
        self.function = None;
        self.bind_statements(&program.body);
        scope
    }

    // ----- queries -----

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol<'a>> {
        self.symbols.get(id.0 as usize)
    }

    pub fn symbol_name(&self, id: SymbolId) -> Atom {
        self.symbol(id)
            .map(|s| Rc::clone(&s.name))
            .unwrap_or_else(|| Rc::from("?"))
    }

    pub fn function(&self, key: NodeKey) -> Option<&FunctionInfo<'a>> {
        self.functions.get(&key)
    }

    pub fn class(&self, symbol: SymbolId) -> Option<&ClassInfo<'a>> {
        self.classes.get(&symbol)
    }

    /// The scope opened by the block, loop, `switch` or `catch` at `key`.
    pub fn block_scope(&self, key: NodeKey) -> Option<ScopeId> {
        self.block_scopes.get(&key).copied()
    }

    pub fn class_symbol(&self, key: NodeKey) -> Option<SymbolId> {
        self.class_symbols.get(&key).copied()
    }

    pub fn resolve_value(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.resolve(scope, name, |s| &s.values)
    }

    pub fn resolve_type(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.resolve(scope, name, |s| &s.types)
    }

    pub fn global_type(&self, name: &str) -> Option<SymbolId> {
        self.resolve_type(self.global, name)
    }

    pub fn global_value(&self, name: &str) -> Option<SymbolId> {
        self.resolve_value(self.global, name)
    }

    /// Member lookup inside a namespace's own scopes.
    pub fn namespace_member(&self, symbol: SymbolId, name: &str, types: bool) -> Option<SymbolId> {
        let decls = &self.symbol(symbol)?.decls;
        decls.iter().find_map(|decl| match decl {
            Decl::Namespace { scope } => {
                let scope = self.scope(*scope)?;
                let map = if types { &scope.types } else { &scope.values };
                map.get(name).copied()
            }
            _ => None,
        })
    }

    pub fn namespace_values(&self, symbol: SymbolId) -> Vec<(Atom, SymbolId)> {
        let mut members = vec![];
        if let Some(sym) = self.symbol(symbol) {
            for decl in &sym.decls {
                if let Decl::Namespace { scope } = decl
                    && let Some(scope) = self.scope(*scope)
                {
                    members.extend(scope.values.iter().map(|(k, v)| (Rc::clone(k), *v)));
                }
            }
        }
        members.sort_by_key(|(_, id)| *id);
        members
    }

    fn resolve(
        &self,
        mut scope: ScopeId,
        name: &str,
        map: impl Fn(&Scope) -> &FxHashMap<Atom, SymbolId>,
    ) -> Option<SymbolId> {
        loop {
            let current = self.scope(scope)?;
            if let Some(&symbol) = map(current).get(name) {
                return Some(symbol);
            }
            scope = current.parent?;
        }
    }

    // ----- construction -----

    fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            kind,
            file: self.file,
            values: FxHashMap::default(),
            types: FxHashMap::default(),
        });
        id
    }

    fn new_symbol(&mut self, name: Atom, decl: Decl<'a>) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name,
            decls: vec![decl],
        });
        id
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        name: &Atom,
        decl: Decl<'a>,
        namespaces: Namespaces,
    ) -> SymbolId {
        let existing = self.scopes.get(scope.0 as usize).and_then(|s| match namespaces {
            Namespaces::Value => s.values.get(name).copied(),
            Namespaces::Type => s.types.get(name).copied(),
            Namespaces::Both => s
                .values
                .get(name)
                .or_else(|| s.types.get(name))
                .copied(),
        });

        let symbol = match existing {
            Some(symbol) => {
                if let Some(sym) = self.symbols.get_mut(symbol.0 as usize) {
                    sym.decls.push(decl);
                }
                symbol
            }
            None => self.new_symbol(Rc::clone(name), decl),
        };

        if let Some(s) = self.scopes.get_mut(scope.0 as usize) {
            if matches!(namespaces, Namespaces::Value | Namespaces::Both) {
                s.values.insert(Rc::clone(name), symbol);
            }
            if matches!(namespaces, Namespaces::Type | Namespaces::Both) {
                s.types.insert(Rc::clone(name), symbol);
            }
        }
        symbol
    }

    fn key(&self, pos: usize) -> NodeKey {
        NodeKey::new(self.file, pos)
    }

    fn with_root<F: FnOnce(&mut Self)>(
        &mut self,
        expr: &'a Expression,
        contextual: Option<&'a TypeAnnotation>,
        f: F,
    ) {
        let saved = self.root.replace(RootExpr {
            expr,
            scope: self.scope,
            contextual,
        });
        f(self);
        self.root = saved;
    }

    fn root_expression(&mut self, expr: &'a Expression, contextual: Option<&'a TypeAnnotation>) {
        self.with_root(expr, contextual, |b| b.walk_expression(expr));
    }

    fn bind_type_parameters(&mut self, scope: ScopeId, params: Option<&'a TypeParameters>) {
        for param in params.map(|p| p.params.as_slice()).unwrap_or_default() {
            self.declare(
                scope,
                &param.name.name,
                Decl::TypeParameter { param, scope },
                Namespaces::Type,
            );
        }
    }

    // ----- statements -----

    fn bind_statements(&mut self, statements: &'a [Statement]) {
        for statement in statements {
            self.bind_statement(statement);
        }
    }

    fn bind_statement(&mut self, statement: &'a Statement) {
        match statement {
            Statement::VariableDeclaration(decl) => self.bind_variable_declaration(decl),
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    let function = FunctionRef::Declaration(func);
                    let key = self.key(func.span.start);
                    self.declare(self.scope, &id.name, Decl::Function { function, key }, Namespaces::Value);
                }
                self.bind_function(FunctionRef::Declaration(func), ThisBinding::Dynamic, false);
            }
            Statement::ClassDeclaration(class) => {
                self.bind_class(ClassRef::Declaration(class));
            }
            Statement::TypeAlias(alias) => {
                let scope = self.push_scope(ScopeKind::Block, Some(self.scope));
                self.bind_type_parameters(scope, alias.type_parameters.as_ref());
                self.declare(
                    self.scope,
                    &alias.id.name,
                    Decl::TypeAlias { decl: alias, scope },
                    Namespaces::Type,
                );
            }
            Statement::InterfaceDeclaration(interface) => {
                let scope = self.push_scope(ScopeKind::Block, Some(self.scope));
                self.bind_type_parameters(scope, interface.type_parameters.as_ref());
                self.declare(
                    self.scope,
                    &interface.id.name,
                    Decl::Interface {
                        decl: interface,
                        scope,
                    },
                    Namespaces::Type,
                );
            }
            Statement::EnumDeclaration(decl) => {
                self.declare(
                    self.scope,
                    &decl.id.name,
                    Decl::Enum {
                        decl,
                        scope: self.scope,
                    },
                    Namespaces::Both,
                );
                for member in &decl.members {
                    if let Some(init) = &member.initializer {
                        self.root_expression(init, None);
                    }
                }
            }
            Statement::NamespaceDeclaration(ns) => self.bind_namespace(ns),
            Statement::Block(block) => self.bind_block(block),
            Statement::If(stmt) => {
                self.root_expression(&stmt.test, None);
                self.bind_statement(&stmt.consequent);
                if let Some(alternate) = &stmt.alternate {
                    self.bind_statement(alternate);
                }
            }
            Statement::Switch(stmt) => {
                self.root_expression(&stmt.discriminant, None);
                let outer = self.scope;
                self.scope = self.push_scope(ScopeKind::Block, Some(outer));
                self.register_scope(stmt.span.start);
                for case in stmt.cases.iter() {
                    if let Some(test) = &case.test {
                        self.root_expression(test, None);
                    }
                    self.bind_statements(&case.consequent);
                }
                self.scope = outer;
            }
            Statement::For(stmt) => {
                let outer = self.scope;
                self.scope = self.push_scope(ScopeKind::Block, Some(outer));
                self.register_scope(stmt.span.start);
                match &stmt.init {
                    Some(ForInit::Variable(decl)) => self.bind_variable_declaration(decl),
                    Some(ForInit::Expression(expr)) => self.root_expression(expr, None),
                    None => {}
                }
                if let Some(test) = &stmt.test {
                    self.root_expression(test, None);
                }
                if let Some(update) = &stmt.update {
                    self.root_expression(update, None);
                }
                self.bind_statement(&stmt.body);
                self.scope = outer;
            }
            Statement::ForIn(stmt) => self.bind_for_in_of(&stmt.left, &stmt.right, false, &stmt.body, stmt.span),
            Statement::ForOf(stmt) => self.bind_for_in_of(&stmt.left, &stmt.right, true, &stmt.body, stmt.span),
            Statement::While(stmt) => {
                self.root_expression(&stmt.test, None);
                self.bind_statement(&stmt.body);
            }
            Statement::DoWhile(stmt) => {
                self.bind_statement(&stmt.body);
                self.root_expression(&stmt.test, None);
            }
            Statement::Try(stmt) => {
                self.bind_block(&stmt.block);
                if let Some(handler) = &stmt.handler {
                    let outer = self.scope;
                    self.scope = self.push_scope(ScopeKind::Block, Some(outer));
                    self.register_scope(handler.span.start);
                    if let Some(param) = &handler.param {
                        self.bind_pattern(param, &[], &mut |_| Decl::CatchParameter);
                    }
                    self.bind_block(&handler.body);
                    self.scope = outer;
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.bind_block(finalizer);
                }
            }
            Statement::Return(stmt) => {
                if let Some(key) = self.function
                    && let Some(info) = self.functions.get_mut(&key)
                {
                    info.returns.push((stmt, self.scope));
                }
                if let Some(argument) = &stmt.argument {
                    let contextual = self
                        .function
                        .and_then(|key| self.functions.get(&key))
                        .and_then(|info| info.function.return_type());
                    self.root_expression(argument, contextual);
                }
            }
            Statement::Throw(stmt) => self.root_expression(&stmt.argument, None),
            Statement::Import(import) => {
                for specifier in &import.specifiers {
                    let local = specifier.local();
                    self.declare(self.scope, &local.name, Decl::Import, Namespaces::Both);
                }
            }
            Statement::Export(export) => {
                if let Some(declaration) = &export.declaration {
                    self.bind_statement(declaration);
                }
            }
            Statement::Expression(stmt) => self.root_expression(&stmt.expression, None),
            Statement::Labeled(stmt) => self.bind_statement(&stmt.body),
            Statement::Break(_) | Statement::Continue(_) | Statement::Empty | Statement::Debugger => {}
        }
    }

    /// Remember the current scope as the one a statement at `pos` opens.
    fn register_scope(&mut self, pos: usize) {
        let key = self.key(pos);
        self.block_scopes.insert(key, self.scope);
    }

    fn bind_block(&mut self, block: &'a BlockStatement) {
        let outer = self.scope;
        self.scope = self.push_scope(ScopeKind::Block, Some(outer));
        self.register_scope(block.span.start);
        self.bind_statements(&block.body);
        self.scope = outer;
    }

    fn bind_variable_declaration(&mut self, decl: &'a VariableDeclaration) {
        let target = match decl.kind {
            VariableKind::Var => self.var_scope,
            VariableKind::Let | VariableKind::Const => self.scope,
        };
        let scope = self.scope;
        for declarator in decl.declarations.iter() {
            let kind = decl.kind;
            let saved = self.scope;
            self.scope = target;
            self.bind_pattern(&declarator.id, &[], &mut |path| Decl::Variable {
                declarator,
                kind,
                path,
                scope,
            });
            self.scope = saved;
            if let Some(init) = &declarator.init {
                self.root_expression(init, declarator.type_annotation.as_ref());
            }
        }
    }

    fn bind_for_in_of(
        &mut self,
        left: &'a ForInOfLeft,
        right: &'a Expression,
        of: bool,
        body: &'a Statement,
        span: crate::lexer::Span,
    ) {
        self.root_expression(right, None);
        let outer = self.scope;
        self.scope = self.push_scope(ScopeKind::Block, Some(outer));
        self.register_scope(span.start);
        match left {
            ForInOfLeft::Variable(decl) => {
                let target = match decl.kind {
                    VariableKind::Var => self.var_scope,
                    VariableKind::Let | VariableKind::Const => self.scope,
                };
                let scope = self.scope;
                for declarator in decl.declarations.iter() {
                    let saved = self.scope;
                    self.scope = target;
                    self.bind_pattern(&declarator.id, &[], &mut |path| Decl::ForBinding {
                        right,
                        of,
                        path,
                        scope,
                    });
                    self.scope = saved;
                }
            }
            ForInOfLeft::Pattern(pattern) => self.walk_pattern_expressions(pattern),
        }
        self.bind_statement(body);
        self.scope = outer;
    }

    fn bind_namespace(&mut self, ns: &'a NamespaceDeclaration) {
        let is_global_augmentation =
            ns.declare && &*ns.id.name == "global" && ns.span.start == ns.id.span.start;
        if is_global_augmentation {
            let (saved_scope, saved_var) = (self.scope, self.var_scope);
            self.scope = self.global;
            self.var_scope = self.global;
            self.bind_statements(&ns.body);
            self.scope = saved_scope;
            self.var_scope = saved_var;
            return;
        }

        let is_identifier_path = ns
            .id
            .name
            .split('.')
            .all(|part| !part.is_empty() && crate::lexer::is_identifier_text(part));

        let (saved_scope, saved_var) = (self.scope, self.var_scope);
        if is_identifier_path {
            for part in ns.id.name.split('.') {
                let inner = self.push_scope(ScopeKind::Namespace, Some(self.scope));
                let name: Atom = Rc::from(part);
                self.declare(self.scope, &name, Decl::Namespace { scope: inner }, Namespaces::Both);
                self.scope = inner;
            }
        } else {
            // Ambient module declarations (`declare module "x"`) are not resolvable.
            self.scope = self.push_scope(ScopeKind::Namespace, Some(self.scope));
        }
        self.var_scope = self.scope;
        self.bind_statements(&ns.body);
        self.scope = saved_scope;
        self.var_scope = saved_var;
    }

    // ----- functions and classes -----

    fn bind_function(&mut self, function: FunctionRef<'a>, this: ThisBinding, method: bool) {
        let key = self.key(function.span().start);
        let outer = self.scope;
        let scope = self.push_scope(ScopeKind::Function(key), Some(outer));

        self.functions.insert(
            key,
            FunctionInfo {
                function,
                scope,
                root: self.root,
                returns: vec![],
                yields: vec![],
                this,
                method,
            },
        );

        let saved_scope = self.scope;
        let saved_var = self.var_scope;
        let saved_function = self.function.replace(key);
        let saved_root = self.root.take();
        self.scope = scope;
        self.var_scope = scope;

        if let FunctionRef::Expression(FunctionExpression { id: Some(id), .. }) = function {
            self.declare(scope, &id.name, Decl::Function { function, key }, Namespaces::Value);
        }
        self.bind_type_parameters(scope, function.type_parameters());

        for (index, param) in function.params().iter().enumerate() {
            self.bind_pattern(&param.pattern, &[], &mut |path| Decl::Parameter {
                function: key,
                index,
                path,
                scope,
            });
        }

        if let Some(body) = function.body() {
            // The body block shares the parameter scope.
            self.register_scope(body.span.start);
            self.bind_statements(&body.body);
        } else if let Some(expr) = function.expression_body() {
            self.root = saved_root;
            self.walk_expression(expr);
        }

        self.scope = saved_scope;
        self.var_scope = saved_var;
        self.function = saved_function;
        self.root = saved_root;
    }

    fn bind_class(&mut self, class: ClassRef<'a>) -> SymbolId {
        let key = self.key(class.span().start);
        let outer = self.scope;
        let name: Atom = class
            .id()
            .map(|id| Rc::clone(&id.name))
            .unwrap_or_else(|| Rc::from("(Anonymous class)"));

        let scope = self.push_scope(ScopeKind::Block, Some(outer));
        let decl = Decl::Class {
            class,
            scope: outer,
        };
        let symbol = match class {
            ClassRef::Declaration(ClassDeclaration { id: Some(_), .. }) => {
                self.declare(outer, &name, decl, Namespaces::Both)
            }
            ClassRef::Expression(ClassExpression { id: Some(_), .. }) => {
                let symbol = self.new_symbol(Rc::clone(&name), decl);
                if let Some(s) = self.scopes.get_mut(scope.0 as usize) {
                    s.values.insert(Rc::clone(&name), symbol);
                    s.types.insert(Rc::clone(&name), symbol);
                }
                symbol
            }
            _ => self.new_symbol(name, decl),
        };

        if let Some(s) = self.scopes.get_mut(scope.0 as usize) {
            s.kind = ScopeKind::Class(symbol);
        }
        self.class_symbols.insert(key, symbol);
        self.classes.insert(symbol, ClassInfo { class, scope });

        if let Some(super_class) = class.super_class() {
            self.root_expression(super_class, None);
        }

        let saved = self.scope;
        self.scope = scope;
        self.bind_type_parameters(scope, class.type_parameters());

        for member in class.members() {
            match member {
                ClassMember::Method(method) => {
                    if let ObjectPropertyKey::Computed(expr) = &method.key {
                        self.root_expression(expr, None);
                    }
                    let this = ThisBinding::Class {
                        class: symbol,
                        static_: method.static_,
                    };
                    self.bind_function(FunctionRef::Expression(&method.value), this, true);
                }
                ClassMember::Constructor(ctor) => {
                    let this = ThisBinding::Class {
                        class: symbol,
                        static_: false,
                    };
                    self.bind_function(FunctionRef::Constructor(ctor), this, true);
                }
                ClassMember::Property(prop) => {
                    if let Some(value) = &prop.value {
                        self.root_expression(value, prop.type_annotation.as_ref());
                    }
                }
                ClassMember::StaticBlock(block) => self.bind_block(block),
                ClassMember::MethodSignature(_) | ClassMember::Index(_) => {}
            }
        }

        self.scope = saved;
        symbol
    }

    // ----- patterns -----

    fn bind_pattern(
        &mut self,
        pattern: &'a Pattern,
        path: &[PathStep<'a>],
        make: &mut dyn FnMut(BindingPath<'a>) -> Decl<'a>,
    ) {
        match pattern {
            Pattern::Identifier(id) => {
                let decl = make(path.into());
                self.declare(self.scope, &id.name, decl, Namespaces::Value);
            }
            Pattern::Object(object) => {
                let mut seen = vec![];
                for property in &object.properties {
                    match property {
                        ObjectPatternProperty::KeyValue { key, value, .. } => {
                            let step = match key.static_name() {
                                Some(name) => {
                                    seen.push(Rc::clone(&name));
                                    PathStep::Property(name)
                                }
                                None => {
                                    if let ObjectPropertyKey::Computed(expr) = key {
                                        self.root_expression(expr, None);
                                    }
                                    PathStep::Unknown
                                }
                            };
                            let nested = extend(path, step);
                            self.bind_pattern(value, &nested, make);
                        }
                        ObjectPatternProperty::Rest(rest) => {
                            let nested = extend(path, PathStep::ObjectRest(seen.clone()));
                            self.bind_pattern(&rest.argument, &nested, make);
                        }
                    }
                }
            }
            Pattern::Array(array) => {
                for (index, element) in array.elements.iter().enumerate() {
                    match element {
                        Some(Pattern::Rest(rest)) => {
                            let nested = extend(path, PathStep::ArrayRest(index));
                            self.bind_pattern(&rest.argument, &nested, make);
                        }
                        Some(element) => {
                            let nested = extend(path, PathStep::Index(index));
                            self.bind_pattern(element, &nested, make);
                        }
                        None => {}
                    }
                }
            }
            Pattern::Rest(rest) => self.bind_pattern(&rest.argument, path, make),
            Pattern::Assignment(assign) => {
                self.root_expression(&assign.right, None);
                let nested = extend(path, PathStep::Default(&assign.right));
                self.bind_pattern(&assign.left, &nested, make);
            }
        }
    }

    fn walk_pattern_expressions(&mut self, pattern: &'a Pattern) {
        match pattern {
            Pattern::Identifier(_) => {}
            Pattern::Object(object) => {
                for property in &object.properties {
                    match property {
                        ObjectPatternProperty::KeyValue { key, value, .. } => {
                            if let ObjectPropertyKey::Computed(expr) = key {
                                self.walk_expression(expr);
                            }
                            self.walk_pattern_expressions(value);
                        }
                        ObjectPatternProperty::Rest(rest) => {
                            self.walk_pattern_expressions(&rest.argument);
                        }
                    }
                }
            }
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.walk_pattern_expressions(element);
                }
            }
            Pattern::Rest(rest) => self.walk_pattern_expressions(&rest.argument),
            Pattern::Assignment(assign) => {
                self.walk_pattern_expressions(&assign.left);
                self.walk_expression(&assign.right);
            }
        }
    }

    // ----- expressions -----

    fn walk_expression(&mut self, expr: &'a Expression) {
        match expr {
            Expression::Literal(_)
            | Expression::Identifier(_)
            | Expression::This(_)
            | Expression::Super(_) => {}
            Expression::Array(array) => {
                for element in array.elements.iter().flatten() {
                    match element {
                        ArrayElement::Expression(e) => self.walk_expression(e),
                        ArrayElement::Spread(spread) => self.walk_expression(&spread.argument),
                    }
                }
            }
            Expression::Object(object) => {
                for property in &object.properties {
                    match property {
                        ObjectProperty::Property(prop) => {
                            if let ObjectPropertyKey::Computed(key) = &prop.key {
                                self.walk_expression(key);
                            }
                            match &prop.value {
                                Expression::Function(func)
                                    if prop.method || prop.kind != PropertyKind::Init =>
                                {
                                    self.bind_function(
                                        FunctionRef::Expression(func),
                                        ThisBinding::Dynamic,
                                        true,
                                    );
                                }
                                value => self.walk_expression(value),
                            }
                        }
                        ObjectProperty::Spread(spread) => self.walk_expression(&spread.argument),
                    }
                }
            }
            Expression::Function(func) => {
                self.bind_function(FunctionRef::Expression(func), ThisBinding::Dynamic, false)
            }
            Expression::ArrowFunction(arrow) => {
                self.bind_function(FunctionRef::Arrow(arrow), ThisBinding::Lexical, false)
            }
            Expression::Class(class) => {
                self.bind_class(ClassRef::Expression(class));
            }
            Expression::Template(template) => {
                for e in &template.expressions {
                    self.walk_expression(e);
                }
            }
            Expression::TaggedTemplate(tagged) => {
                self.walk_expression(&tagged.tag);
                for e in &tagged.quasi.expressions {
                    self.walk_expression(e);
                }
            }
            Expression::Unary(unary) => self.walk_expression(&unary.argument),
            Expression::Binary(binary) => {
                self.walk_expression(&binary.left);
                self.walk_expression(&binary.right);
            }
            Expression::Logical(logical) => {
                self.walk_expression(&logical.left);
                self.walk_expression(&logical.right);
            }
            Expression::Conditional(cond) => {
                self.walk_expression(&cond.test);
                self.walk_expression(&cond.consequent);
                self.walk_expression(&cond.alternate);
            }
            Expression::Assignment(assign) => {
                match &assign.left {
                    AssignmentTarget::Identifier(_) => {}
                    AssignmentTarget::Member(member) => self.walk_member(member),
                    AssignmentTarget::Pattern(pattern) => self.walk_pattern_expressions(pattern),
                }
                self.walk_expression(&assign.right);
            }
            Expression::Update(update) => self.walk_expression(&update.argument),
            Expression::Sequence(seq) => {
                for e in &seq.expressions {
                    self.walk_expression(e);
                }
            }
            Expression::Member(member) => self.walk_member(member),
            Expression::Call(call) => {
                self.walk_expression(&call.callee);
                self.walk_arguments(&call.arguments);
            }
            Expression::New(new) => {
                self.walk_expression(&new.callee);
                self.walk_arguments(&new.arguments);
            }
            Expression::TypeAssertion(assertion) | Expression::Satisfies(assertion) => {
                self.walk_expression(&assertion.expression)
            }
            Expression::NonNull(non_null) => self.walk_expression(&non_null.expression),
            Expression::Spread(spread) => self.walk_expression(&spread.argument),
            Expression::Yield(yield_expr) => {
                if let Some(key) = self.function
                    && let Some(info) = self.functions.get_mut(&key)
                {
                    info.yields.push((yield_expr, self.scope));
                }
                if let Some(argument) = &yield_expr.argument {
                    self.walk_expression(argument);
                }
            }
            Expression::Await(await_expr) => self.walk_expression(&await_expr.argument),
            Expression::Parenthesized(inner, _) => self.walk_expression(inner),
        }
    }

    fn walk_member(&mut self, member: &'a MemberExpression) {
        self.walk_expression(&member.object);
        if let MemberProperty::Expression(property) = &member.property {
            self.walk_expression(property);
        }
    }

    fn walk_arguments(&mut self, arguments: &'a [Argument]) {
        for argument in arguments {
            match argument {
                Argument::Expression(e) => self.walk_expression(e),
                Argument::Spread(spread) => self.walk_expression(&spread.argument),
            }
        }
    }
}

impl Default for Binder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn extend<'a>(path: &[PathStep<'a>], step: PathStep<'a>) -> Vec<PathStep<'a>> {
    let mut nested = path.to_vec();
    nested.push(step);
    nested
}
