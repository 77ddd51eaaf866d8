//! The node set.
//!
//! Kept deliberately small: only the constructs the emitter actually
//! produces for a serialized value or a scope factory, not a general-purpose
//! JS grammar. `Node::RecordRef` is the "edge" hole described in the data
//! model: a placeholder that the output scheduler resolves to either an
//! `Ident` (top-level binding) or the referenced record's own `node`
//! (inlining), never mutated via index in place — replacement happens by
//! writing a fresh node into the owning arena slot.

use livepack_common::{DescriptorBitmap, RecordId};

/// Index into a `NodeArena`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectPropKind {
    Value,
    Getter,
    Setter,
    GetterSetter,
}

#[derive(Clone, Debug)]
pub struct ObjectProp {
    pub key: NodeId,
    pub computed: bool,
    pub kind: ObjectPropKind,
    pub value: NodeId,
    /// Present only when `kind == GetterSetter`: the setter half.
    pub setter: Option<NodeId>,
    /// The descriptor flags this property was observed with. A prop whose
    /// bitmap isn't `default_data()` was routed through `defineProps` by the
    /// tracer rather than emitted as a literal key; carried here too so a
    /// renderer or later pass can tell a default prop from one that already
    /// went through the non-default path without re-deriving it.
    pub bitmap: DescriptorBitmap,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: NodeId,
    pub default: Option<NodeId>,
    pub rest: bool,
}

/// One emitted-JS AST fragment.
#[derive(Clone, Debug)]
pub enum Node {
    // --- Placeholders / edges -------------------------------------------------
    /// A hole pointing at another record's eventual identifier. Resolved by
    /// the output scheduler during emission (§4.4), never interpreted here.
    RecordRef(RecordId),
    /// A deferred circular-injection call site; resolved by the scope/block
    /// processor once the injector function exists (§4.2 step 3).
    CircularPlaceholder,

    // --- Literals --------------------------------------------------------------
    Undefined,
    Null,
    Bool(bool),
    /// Rendered via the number's canonical JS source form; `NaN`/`Infinity`
    /// become the corresponding global reference nodes by the emitter, not
    /// here (this crate has no text-rendering opinion).
    Number(f64),
    NegativeZero,
    NaN,
    Infinity { negative: bool },
    Str(String),
    BigInt(String),
    /// `new RegExp(source, flags)` form, used so the regex can be wrapped by
    /// `defineProps` like any other object if it carries extra properties.
    Regex { source: String, flags: String },
    Ident(String),
    This,
    Super,
    /// `Symbol(description)` or bare `Symbol()`.
    SymbolCall { description: Option<String> },

    // --- Containers --------------------------------------------------------------
    /// Sparse-array aware: a `None` element is a hole (`,,`), preserved
    /// through round-trip per the boundary-behavior requirement.
    ArrayExpr(Vec<Option<NodeId>>),
    ObjectExpr(Vec<ObjectProp>),
    /// `new Uint16Array(length)` ctor-with-length form, used instead of a
    /// literal array when a typed buffer is entirely default-valued.
    TypedArrayWithLength { ctor: &'static str, length: u32 },
    TypedArrayFromValues { ctor: &'static str, values: Vec<NodeId> },

    // --- Expressions -------------------------------------------------------------
    Member { object: NodeId, property: NodeId, computed: bool, optional: bool },
    Call { callee: NodeId, args: Vec<NodeId>, optional: bool },
    New { callee: NodeId, args: Vec<NodeId> },
    Assign { target: NodeId, value: NodeId },
    Sequence(Vec<NodeId>),
    Conditional { test: NodeId, consequent: NodeId, alternate: NodeId },
    Binary { op: &'static str, left: NodeId, right: NodeId },
    Logical { op: &'static str, left: NodeId, right: NodeId },
    Unary { op: &'static str, argument: NodeId },
    Spread(NodeId),
    /// `Reflect.get(Object.getPrototypeOf(owner), key, this)` — the
    /// `super.foo` replacement against a late-bound owner reference.
    ReflectGetSuper { owner: NodeId, key: NodeId, this: NodeId },
    ReflectSetSuper { owner: NodeId, key: NodeId, value: NodeId, this: NodeId },
    ArrowFunction {
        params: Vec<Param>,
        body: Vec<NodeId>,
        expr_body: Option<NodeId>,
        is_async: bool,
        use_strict_directive: bool,
    },
    FunctionExpr {
        name: Option<String>,
        params: Vec<Param>,
        body: Vec<NodeId>,
        is_async: bool,
        is_generator: bool,
        use_strict_directive: bool,
    },
    /// `(function(){ ... }).apply(thisValue, argumentsValue)` — frozen
    /// `this`/`arguments` injection wrapper (§4.2 step 7).
    ApplyWrapper { function: NodeId, this_arg: NodeId, args_arg: NodeId },
    ClassExpr {
        name: Option<String>,
        superclass: Option<NodeId>,
        members: Vec<ClassMember>,
    },

    // --- Statements -------------------------------------------------------------
    VarDecl { kind: VarKind, name: String, init: Option<NodeId> },
    ExprStmt(NodeId),
    Return(Option<NodeId>),
    Block(Vec<NodeId>),
    Directive(&'static str),

    // --- Module-shaped wrappers --------------------------------------------------
    Require(String),
    ImportDefault { source: String },
    ExportsAssign { key: String, value: NodeId },
    ModuleExportsAssign(NodeId),
    EsmExportDefault(NodeId),
    EsmExportNamed(Vec<(String, NodeId)>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

#[derive(Clone, Debug)]
pub struct ClassMember {
    pub key: NodeId,
    pub computed: bool,
    pub is_static: bool,
    pub kind: ClassMemberKind,
    pub value: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassMemberKind {
    Method,
    Getter,
    Setter,
    Field,
}
