//! The tracer's half of the §6 input contract: per-function metadata
//! captured by the instrumenter. Scope-frame/block tables are consumed
//! downstream by `livepack-scope`; the tracer only needs enough to stamp a
//! function record with its strictness and scope back-reference.

use crate::record::Strictness;
use livepack_common::{BlockId, FrameId};
use livepack_ir::NodeId;

#[derive(Clone, Debug)]
pub struct FunctionMeta {
    pub block_id: BlockId,
    pub frame_id: FrameId,
    pub strictness: Strictness,
    /// Names this function reads/writes from an enclosing scope.
    pub external_names: Vec<String>,
    pub contains_eval: bool,
    /// Parameter names, in declaration order, shared by every instance that
    /// closes over `block_id` (the scope-factory splice pass builds one
    /// function expression per block from a single representative instance's
    /// metadata, not once per instance).
    pub params: Vec<String>,
    pub is_async: bool,
    pub is_generator: bool,
    /// Pre-parsed body statements, already allocated into the same
    /// `NodeArena` the tracer uses (§6 input contract).
    pub body: Vec<NodeId>,
}

/// Supplied by the caller (the driver, wiring in instrumenter output); kept
/// as a trait rather than a concrete map type so the facade can hand the
/// tracer a thin view over its own tables without copying them.
pub trait FunctionMetaLookup {
    fn lookup(&self, function_id: u32) -> Option<&FunctionMeta>;
}

impl FunctionMetaLookup for rustc_hash::FxHashMap<u32, FunctionMeta> {
    fn lookup(&self, function_id: u32) -> Option<&FunctionMeta> {
        self.get(&function_id)
    }
}
