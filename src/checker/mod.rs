//! Type engine.
//!
//! A [`ProgramContext`] owns everything known about one source file checked
//! against the embedded declaration library: the bound scopes, the interned
//! types and the memo tables. Types are computed on demand: asking for the
//! signature of a function types exactly the expressions it depends on, and
//! every answer is cached by node position for the lifetime of the context.
//!
//! The checker is split across submodules that each add an
//! `impl ProgramContext` block:
//! - `declared`: type annotations, aliases, interfaces, classes and enums
//! - `expr`: expression and symbol value types
//! - `call`: call resolution and generic inference
//! - `relate`: assignability, subtype reduction and unions
//! - `returns`: signatures and return-type inference
//! - `display`: rendering types as TypeScript text

mod binder;
mod call;
mod declared;
mod display;
mod expr;
mod relate;
mod returns;
pub mod types;

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::trace;

pub use binder::{Binder, ClassRef, FunctionRef, ScopeId, SymbolId};
pub use display::TypePrinter;
pub use types::{ObjectShape, Signature, TypeData, TypeId, TypeInterner};

use crate::ast::Program;
use crate::error::AnnotateError;
use crate::parser::Parser;
use crate::string_dict::StringDict;

/// Declarations the checker resolves global names against.
pub const LIB_SOURCE: &str = include_str!("lib.d.ts");

/// Nesting limit for recursive type operations.
const MAX_DEPTH: u32 = 100;

/// Which parsed file a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);

impl FileId {
    pub const LIB: FileId = FileId(0);
    pub const SOURCE: FileId = FileId(1);
}

/// Identity of a syntax node: its file and start offset.
///
/// Two function-likes never start at the same offset, so this is enough to
/// key every per-function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub file: FileId,
    pub pos: usize,
}

impl NodeKey {
    pub fn new(file: FileId, pos: usize) -> Self {
        Self { file, pos }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("no checker information for the node at offset {0}")]
    UnresolvedNode(usize),

    #[error("type has no call signatures")]
    NoCallSignature,

    #[error("circular reference while resolving {0}")]
    Circularity(String),

    #[error("type nesting exceeded {MAX_DEPTH} levels")]
    DepthLimit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Keep `null` and `undefined` as distinct members of unions.
    pub strict_null_checks: bool,
}

/// Memo slot that can tell a finished entry from one being computed.
#[derive(Debug, Clone)]
enum Slot<T> {
    Pending,
    Done(T),
}

/// Type names bound by an enclosing construct that the binder never saw:
/// alias arguments during expansion, mapped keys and `infer` variables.
pub(crate) type TypeEnv = FxHashMap<crate::string_dict::Atom, TypeId>;

/// Parse the embedded declaration library.
pub fn parse_lib(string_dict: &mut StringDict) -> Result<Program, AnnotateError> {
    Parser::new(LIB_SOURCE, string_dict).parse_program()
}

pub struct ProgramContext<'a> {
    pub(crate) types: TypeInterner,
    pub(crate) binder: Binder<'a>,
    pub(crate) options: CheckOptions,

    /// Value-side types of symbols.
    symbol_types: FxHashMap<SymbolId, Slot<TypeId>>,
    /// Type-side meaning of non-generic aliases, keyed by alias symbol.
    alias_types: FxHashMap<SymbolId, Slot<TypeId>>,
    /// `TypeParameter` types minted for type parameter declarations.
    type_param_types: FxHashMap<SymbolId, TypeId>,
    /// Generic member tables of classes and interfaces.
    member_tables: FxHashMap<SymbolId, Slot<Rc<ObjectShape>>>,
    /// Static sides of classes, enums and namespaces.
    static_tables: FxHashMap<SymbolId, Rc<ObjectShape>>,
    /// Member tables after substituting type arguments, by instantiated type.
    apparent_shapes: FxHashMap<TypeId, Rc<ObjectShape>>,

    signatures: FxHashMap<NodeKey, Slot<Rc<Signature>>>,
    return_types: FxHashMap<NodeKey, Slot<TypeId>>,
    function_types: FxHashMap<NodeKey, TypeId>,
    /// Signatures untyped callbacks take their parameter types from.
    contextual: FxHashMap<NodeKey, Rc<Signature>>,
    /// Root expressions already typed for the sake of contextual typing.
    typed_roots: FxHashSet<NodeKey>,

    /// Answered assignability questions.
    assignable: FxHashMap<(TypeId, TypeId), bool>,
    /// Pairs currently being related; assumed to hold when met again.
    relating: Vec<(TypeId, TypeId)>,

    depth: u32,
    failure: Option<CheckError>,
    /// Set when alias expansion needed a concrete type but met a type
    /// parameter; the application is then kept deferred.
    generic_hit: bool,
}

impl<'a> ProgramContext<'a> {
    /// Bind `lib` (when given) and `program`, ready for on-demand checking.
    pub fn new(program: &'a Program, lib: Option<&'a Program>, options: CheckOptions) -> Self {
        let mut binder = Binder::new();
        if let Some(lib) = lib {
            binder.bind_lib(lib);
        }
        binder.bind_source(program, FileId::SOURCE);
        Self {
            types: TypeInterner::new(),
            binder,
            options,
            symbol_types: FxHashMap::default(),
            alias_types: FxHashMap::default(),
            type_param_types: FxHashMap::default(),
            member_tables: FxHashMap::default(),
            static_tables: FxHashMap::default(),
            apparent_shapes: FxHashMap::default(),
            signatures: FxHashMap::default(),
            return_types: FxHashMap::default(),
            function_types: FxHashMap::default(),
            contextual: FxHashMap::default(),
            typed_roots: FxHashSet::default(),
            assignable: FxHashMap::default(),
            relating: vec![],
            depth: 0,
            failure: None,
            generic_hit: false,
        }
    }

    pub fn strict(&self) -> bool {
        self.options.strict_null_checks
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.types
    }

    /// Call signature of the function declaration or method whose node
    /// starts at `start` in the source file.
    pub fn signature_of_declaration(&mut self, start: usize) -> Result<Rc<Signature>, CheckError> {
        let key = NodeKey::new(FileId::SOURCE, start);
        if self.binder.function(key).is_none() {
            return Err(CheckError::UnresolvedNode(key.pos));
        }
        self.failure = None;
        let signature = self.signature_of(key);
        self.finish(signature)
    }

    /// Type of the arrow or function expression starting at `start` in the
    /// source file, typed in the context of the expression it appears in.
    pub fn type_of_function_expression(&mut self, start: usize) -> Result<TypeId, CheckError> {
        let key = NodeKey::new(FileId::SOURCE, start);
        let Some(info) = self.binder.function(key) else {
            return Err(CheckError::UnresolvedNode(key.pos));
        };
        let root = info.root;
        self.failure = None;
        if let Some(root) = root {
            self.ensure_root_typed(root);
        }
        let ty = self.function_type(key);
        self.finish(ty)
    }

    /// Call signatures of a type, looking through references and unions.
    pub fn call_signatures(&mut self, ty: TypeId) -> Vec<Rc<Signature>> {
        self.signatures_of_type(ty, false)
    }

    /// Full, untruncated TypeScript text for a type.
    pub fn type_to_string(&self, ty: TypeId) -> String {
        TypePrinter::new(&self.types, &self.binder).print(ty)
    }

    fn finish<T>(&mut self, value: Result<T, CheckError>) -> Result<T, CheckError> {
        match self.failure.take() {
            Some(failure) => Err(failure),
            None => value,
        }
    }

    // ----- shared plumbing -----

    /// Enter one level of recursion; `false` once the limit is reached.
    pub(crate) fn enter(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            trace!(depth = self.depth, "type nesting limit reached");
            self.failure.get_or_insert(CheckError::DepthLimit);
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn file_of(&self, scope: ScopeId) -> FileId {
        self.binder
            .scope(scope)
            .map(|s| s.file)
            .unwrap_or(FileId::SOURCE)
    }

    pub(crate) fn global_reference(&mut self, name: &str, args: Vec<TypeId>) -> TypeId {
        match self.binder.global_type(name) {
            Some(symbol) => self.reference_type(symbol, args),
            None => TypeId::ANY,
        }
    }

    pub(crate) fn promise_of(&mut self, ty: TypeId) -> TypeId {
        self.global_reference("Promise", vec![ty])
    }
}

/// Format a number the way JavaScript's `Number.prototype.toString` does.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", format_number(-value));
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e3".
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let n = exponent + 1;

    if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{int_part}.{frac_part}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", (n - 1).abs())
        } else {
            format!("{first}.{rest}e{sign}{}", (n - 1).abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbers_like_javascript() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-1.5), "-1.5");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(123456789012.0), "123456789012");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn check_errors_render() {
        assert_eq!(
            CheckError::UnresolvedNode(12).to_string(),
            "no checker information for the node at offset 12"
        );
        assert_eq!(
            CheckError::DepthLimit.to_string(),
            "type nesting exceeded 100 levels"
        );
    }
}
