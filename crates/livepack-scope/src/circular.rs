//! Step 3: circular value detection.
//!
//! For each frame/param, if its value is a function defined in this block
//! (or a nested block), or recursively depends on one, the edge can't be
//! satisfied at factory-call time (the function doesn't exist yet while its
//! own enclosing frame is being constructed). The argument is replaced with
//! `undefined` and a deferred injector closes the loop after construction.

use crate::store::ScopeStore;
use livepack_common::BlockId;
use livepack_trace::{RecordKind, RecordStore};
use rustc_hash::FxHashSet;
use tracing::debug;

pub fn detect_circular_values(store: &mut ScopeStore, records: &RecordStore) {
    let block_ids: Vec<BlockId> = (0..store.blocks().len()).map(|i| BlockId(i as u32)).collect();
    for block_id in block_ids {
        detect_in_block(store, records, block_id);
    }
}

fn detect_in_block(store: &mut ScopeStore, records: &RecordStore, block_id: BlockId) {
    let param_names: Vec<String> = store.block(block_id).params.iter().map(|p| p.name.clone()).collect();
    let frames: Vec<_> = store.frames_of_block(block_id).map(|f| f.id).collect();

    let mut needs_injector = FxHashSet::default();

    for &frame_id in &frames {
        for name in &param_names {
            let record_id = match store.frame(frame_id).get(name) {
                Some(props) => props.record,
                None => continue,
            };
            let mut visited = FxHashSet::default();
            if depends_on_block_function(store, records, record_id, block_id, &mut visited) {
                store.frame_mut(frame_id).values.get_mut(name).unwrap().is_circular = true;
                needs_injector.insert(name.clone());
            }
        }
    }

    if !needs_injector.is_empty() {
        let block = store.block_mut(block_id);
        for name in needs_injector {
            if !block.injectors.contains(&name) {
                block.injectors.push(name);
            }
        }
        debug!(block = block_id.0, injectors = ?block.injectors, "circular params need injectors");
    }
}

/// True if `record_id` is itself a function whose scope frame's block is
/// `block_id` or a descendant of it, or if any of its dependencies
/// (recursively) are.
fn depends_on_block_function(
    store: &ScopeStore,
    records: &RecordStore,
    record_id: livepack_common::RecordId,
    block_id: BlockId,
    visited: &mut FxHashSet<livepack_common::RecordId>,
) -> bool {
    if !visited.insert(record_id) {
        return false;
    }
    let record = records.get(record_id);
    if record.kind == RecordKind::Function || record.kind == RecordKind::Class {
        if let Some(frame_id) = record.scope_frame {
            let func_block = store.frame(frame_id).block;
            if is_same_or_descendant(store, func_block, block_id) {
                return true;
            }
        }
    }
    record.deps.iter().any(|edge| depends_on_block_function(store, records, edge.target, block_id, visited))
}

fn is_same_or_descendant(store: &ScopeStore, candidate: BlockId, ancestor: BlockId) -> bool {
    let mut cursor = Some(candidate);
    let mut guard = 0;
    while let Some(b) = cursor {
        guard += 1;
        if guard > livepack_common::limits::MAX_SCOPE_WALK_ITERATIONS {
            return false;
        }
        if b == ancestor {
            return true;
        }
        cursor = store.block(b).parent;
    }
    false
}
