//! `ScopeFrame`: one runtime activation of a lexical block.

use livepack_common::{BlockId, FrameId, RecordId};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct ValueProps {
    pub record: RecordId,
    /// Set by step 3 (circular value detection): the edge can't be
    /// satisfied at factory-call time and is instead wired up by a deferred
    /// injector call.
    pub is_circular: bool,
}

#[derive(Debug)]
pub struct ScopeFrame {
    pub id: FrameId,
    pub block: BlockId,
    pub parent_frame: Option<FrameId>,
    /// Frame-parameter name -> captured value. Ordered by insertion so
    /// parameter-ordering (step 4) has a stable starting order to sort.
    pub values: FxHashMap<String, ValueProps>,
    pub value_order: Vec<String>,
    /// True when this frame was synthesized by step 1 (missing-scope
    /// completion) rather than observed directly.
    pub synthesized: bool,
}

impl ScopeFrame {
    #[must_use]
    pub fn new(id: FrameId, block: BlockId, parent_frame: Option<FrameId>) -> Self {
        Self { id, block, parent_frame, values: FxHashMap::default(), value_order: Vec::new(), synthesized: false }
    }

    pub fn bind(&mut self, name: impl Into<String>, record: RecordId) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.value_order.push(name.clone());
        }
        self.values.insert(name, ValueProps { record, is_circular: false });
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ValueProps> {
        self.values.get(name)
    }
}
