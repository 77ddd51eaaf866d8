//! The traced host graph.
//!
//! The instrumenter (out of scope) is the thing that would, in a real
//! deployment, hand the tracer live interpreter values. This crate's input
//! boundary models what it hands over: a snapshot graph of `HostValue`s with
//! `Rc` reference identity for non-primitives, matching "all inputs ... are
//! captured at a logical snapshot before serialization begins" (§5).

use livepack_common::{DescriptorBitmap, Primitive};
use std::cell::RefCell;
use std::rc::Rc;

/// One own property as observed on a host object, in enumeration order:
/// integer-keyed slots first (numeric order), then string keys (insertion
/// order), then symbol keys (insertion order).
#[derive(Clone)]
pub struct HostProp {
    pub key: PropKey,
    pub bitmap: DescriptorBitmap,
    pub value: PropValue,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PropKey {
    /// An array index, `0 ..= 2^32 - 2`; `2^32 - 1` is deliberately excluded
    /// and represented as `Str("4294967295")` per the boundary-behavior spec.
    Index(u32),
    Str(String),
    Symbol(u64),
}

#[derive(Clone)]
pub enum PropValue {
    Data(HostValue),
    Accessor { getter: Option<HostValue>, setter: Option<HostValue> },
}

/// Tag distinguishing the traced value's reconstruction strategy. One
/// variant per `kind` listed in the data model, plus `Host` for values with
/// no reconstructible form (caught by the tracer as `UnreconstructibleValue`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    PlainObject,
    Array,
    Function,
    Class,
    Regex,
    Date,
    Map,
    Set,
    TypedBuffer,
    BoxedPrimitive,
    /// Only reachable as a module namespace object, per the data model note.
    Promise,
    Global,
    BuiltinModule,
    ImportProxy,
    /// Fallback for unknown native objects (still reconstructible, as a
    /// plain object with its prototype captured).
    UnknownNative,
    /// No reconstructible form exists (live socket/native handle). The
    /// tracer turns this into `LivepackError::UnreconstructibleValue`.
    Host,
}

pub struct HostObject {
    pub kind: ObjectKind,
    pub name_hint: Option<String>,
    /// `None` means "the standard prototype for this kind"; `Some` means an
    /// overridden prototype the tracer must capture explicitly.
    pub prototype: Option<HostValue>,
    pub props: Vec<HostProp>,
    pub extensible: bool,
    pub sealed: bool,
    pub frozen: bool,
    pub to_string_tag: Option<String>,
    /// For `Function`/`Class`: the id into the function-metadata table
    /// supplied by the instrumenter (§6 input contract).
    pub function_id: Option<u32>,
    /// Array/typed-buffer elements in numeric order, including holes.
    pub elements: Vec<Option<HostValue>>,
    /// Map/Set entries in insertion order.
    pub entries: Vec<(HostValue, Option<HostValue>)>,
    /// For `Global`/`BuiltinModule`: the canonical global name.
    pub global_name: Option<String>,
}

#[derive(Clone)]
pub enum HostValue {
    Primitive(Primitive),
    Object(Rc<RefCell<HostObject>>),
}

impl HostValue {
    /// Reference identity key for non-primitives; primitives are looked up
    /// by value instead (see `livepack_common::value_eq`).
    #[must_use]
    pub fn object_identity(&self) -> Option<usize> {
        match self {
            Self::Object(rc) => Some(Rc::as_ptr(rc) as usize),
            Self::Primitive(_) => None,
        }
    }
}
