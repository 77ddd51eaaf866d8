//! Function/scope analyzer algorithm, §4.2 steps 1-4 (steps 5-7 live in
//! `strict.rs`, `mangle.rs`, and `frozen.rs`).

use crate::frame::ScopeFrame;
use crate::store::ScopeStore;
use livepack_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use livepack_common::{BlockId, FrameId};
use livepack_trace::RecordStore;
use tracing::{debug, trace};

/// Step 1: missing-scope completion.
///
/// If a frame's recorded parent frame's block doesn't match its own block's
/// parent block, the instrumenter never materialized an intermediate frame
/// (because that lexical block captured nothing observable at the time).
/// Synthesize one empty frame per missing block in the gap, so every
/// frame's parent ends up in its own block's parent block.
pub fn complete_missing_scopes(store: &mut ScopeStore) {
    let frame_ids: Vec<FrameId> = (0..store.frames().len()).map(|i| FrameId(i as u32)).collect();
    for frame_id in frame_ids {
        complete_one(store, frame_id);
    }
}

fn complete_one(store: &mut ScopeStore, frame_id: FrameId) {
    let block = store.frame(frame_id).block;
    let Some(expected_parent_block) = store.block(block).parent else {
        return; // top-level block has no parent to reconcile against
    };

    let actual_parent_frame = store.frame(frame_id).parent_frame;
    let actual_parent_block = actual_parent_frame.map(|pf| store.frame(pf).block);

    if actual_parent_block == Some(expected_parent_block) {
        return; // already correctly linked
    }

    // Walk the block-parent chain from `expected_parent_block` down toward
    // the frame's actual parent block (or to the root if there is none),
    // synthesizing one empty frame per block along the way.
    let mut gap_blocks = Vec::new();
    let mut cursor = Some(expected_parent_block);
    let mut iterations = 0;
    while let Some(b) = cursor {
        iterations += 1;
        assert!(iterations < MAX_SCOPE_WALK_ITERATIONS, "scope-chain walk exceeded safety limit; malformed block tree");
        if Some(b) == actual_parent_block {
            break;
        }
        gap_blocks.push(b);
        cursor = store.block(b).parent;
    }

    let mut previous_frame = actual_parent_frame;
    for gap_block in gap_blocks.into_iter().rev() {
        let new_id = store.next_frame_id();
        let mut synthesized = ScopeFrame::new(new_id, gap_block, previous_frame);
        synthesized.synthesized = true;
        store.add_frame(synthesized);
        previous_frame = Some(new_id);
        trace!(block = gap_block.0, frame = new_id.0, "synthesized missing scope frame");
    }

    store.frame_mut(frame_id).parent_frame = previous_frame;
    debug!(frame = frame_id.0, "completed missing-scope chain");
}

/// Step 2: inline-function detection.
///
/// For each block parameter `p`: if every frame of this block binds `p` to
/// a function defined in the *same* block, mark it locally-produced (the
/// factory declares `p = <function expression>` internally instead of
/// taking it as a parameter). If that function is referenced only by
/// sibling functions in the same block, it's also scope-internal-only.
pub fn detect_inline_functions(store: &mut ScopeStore, records: &RecordStore) {
    let block_ids: Vec<BlockId> = (0..store.blocks().len()).map(|i| BlockId(i as u32)).collect();
    for block_id in block_ids {
        detect_inline_functions_in_block(store, records, block_id);
    }
}

fn detect_inline_functions_in_block(store: &mut ScopeStore, records: &RecordStore, block_id: BlockId) {
    let param_names: Vec<String> = store.block(block_id).params.iter().map(|p| p.name.clone()).collect();
    let sibling_functions: Vec<_> = store.block(block_id).functions.clone();

    for name in param_names {
        let frames: Vec<_> = store.frames_of_block(block_id).map(|f| f.id).collect();
        if frames.is_empty() {
            continue;
        }

        let all_locally_produced = frames.iter().all(|&fid| {
            let frame = store.frame(fid);
            match frame.get(&name) {
                Some(props) => sibling_functions.contains(&props.record),
                None => false,
            }
        });

        if !all_locally_produced {
            continue;
        }

        // scope-internal-only: every frame's binding for `name` is a
        // function whose only dependents are other sibling functions in
        // `sibling_functions` (never exposed outside the block).
        let scope_internal_only = frames.iter().all(|&fid| {
            let frame = store.frame(fid);
            let Some(props) = frame.get(&name) else { return false };
            records
                .get(props.record)
                .dependents
                .iter()
                .all(|dep| sibling_functions.contains(&dep.target))
        });

        let block = store.block_mut(block_id);
        if let Some(param) = block.params.iter_mut().find(|p| p.name == name) {
            param.locally_produced = true;
            param.scope_internal_only = scope_internal_only;
            debug!(block = block_id.0, param = %param.name, scope_internal_only, "marked locally-produced param");
        }
    }
}

/// Step 4: parameter ordering.
///
/// Sort block parameters so those most commonly unbound (undefined or
/// circular) across this block's frames come last, so trailing `undefined`
/// arguments can be omitted at call sites.
pub fn order_parameters(store: &mut ScopeStore) {
    let block_ids: Vec<BlockId> = (0..store.blocks().len()).map(|i| BlockId(i as u32)).collect();
    for block_id in block_ids {
        order_parameters_in_block(store, block_id);
    }
}

fn order_parameters_in_block(store: &mut ScopeStore, block_id: BlockId) {
    let frames: Vec<FrameId> = store.frames_of_block(block_id).map(|f| f.id).collect();

    let mut unbound_rate: Vec<(String, f64)> = store
        .block(block_id)
        .params
        .iter()
        .map(|p| {
            let total = frames.len().max(1) as f64;
            let unbound = frames
                .iter()
                .filter(|&&fid| {
                    let frame = store.frame(fid);
                    match frame.get(&p.name) {
                        None => true,
                        Some(props) => props.is_circular,
                    }
                })
                .count() as f64;
            (p.name.clone(), unbound / total)
        })
        .collect();

    // Stable sort ascending by "commonly bound" = descending unbound rate,
    // ties broken by original (insertion) order via the stable sort itself.
    unbound_rate.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let block = store.block_mut(block_id);
    let mut reordered = Vec::with_capacity(block.params.len());
    for (name, _) in &unbound_rate {
        if let Some(pos) = block.params.iter().position(|p| &p.name == name) {
            reordered.push(block.params.remove(pos));
        }
    }
    block.params = reordered;
}
