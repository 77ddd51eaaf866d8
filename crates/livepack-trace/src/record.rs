//! `Record`: one emit-time node per distinct traced value.

use livepack_common::RecordId;
use livepack_ir::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Sloppy,
    /// Recoverable: treated as sloppy-compatible per §7.
    Indeterminate,
}

/// Where in `deps`/`dependents` a reference lives: which AST node, and
/// which key within it (property name, array index, argument position).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeKey {
    Property(String),
    Index(u32),
    Argument(usize),
    Prototype,
    Element(u32),
    MapEntry(u32),
}

#[derive(Clone, Debug)]
pub struct DepEdge {
    pub target: RecordId,
    pub node: NodeId,
    pub key: EdgeKey,
}

/// A deferred top-level statement: a cyclic property assignment, a
/// prototype fixup, or a shared-buffer write that could not be expressed as
/// part of the record's own initializer expression.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub target: RecordId,
    pub key: EdgeKey,
    pub value: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Primitive,
    PlainObject,
    Array,
    Function,
    Class,
    Regex,
    Date,
    MapOrSet,
    TypedBuffer,
    BoxedPrimitive,
    Promise,
    Global,
    BuiltinModule,
    ImportProxy,
}

pub struct Record {
    pub id: RecordId,
    pub kind: RecordKind,
    pub name: String,
    pub node: NodeId,
    pub deps: Vec<DepEdge>,
    pub dependents: Vec<DepEdge>,
    pub assignments: Vec<Assignment>,
    /// Back-reference to the containing scope frame, for function records.
    pub scope_frame: Option<livepack_common::FrameId>,
    /// For `Function`/`Class`: the id into the function-metadata table, so
    /// the scope-factory splice pass can look up its params/body.
    pub function_id: Option<u32>,
    /// An overridden prototype edge (§4.1), resolved by `link_or_defer` into
    /// either a `RecordRef` or `Undefined` (deferred via an `Assignment`
    /// when circular). Always emitted as `Object.setPrototypeOf` once set,
    /// since an object-literal `__proto__` key can't express every case
    /// (symbols, circular targets) uniformly.
    pub prototype: Option<NodeId>,
    pub frozen: bool,
    pub sealed: bool,
    pub extensible: bool,
    pub to_string_tag: Option<String>,
    pub output: Option<livepack_common::OutputId>,
    pub is_circular: bool,
    pub strictness: Strictness,
    pub usage_count: u32,
}

impl Record {
    #[must_use]
    pub fn new(id: RecordId, kind: RecordKind, name: impl Into<String>, node: NodeId) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            node,
            deps: Vec::new(),
            dependents: Vec::new(),
            assignments: Vec::new(),
            scope_frame: None,
            function_id: None,
            prototype: None,
            frozen: false,
            sealed: false,
            extensible: true,
            to_string_tag: None,
            output: None,
            is_circular: false,
            strictness: Strictness::Indeterminate,
            usage_count: 0,
        }
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind == RecordKind::Primitive
    }
}
