//! Step 5: strict/sloppy reconciliation, per block.

use crate::block::Strictness as BlockStrictness;
use crate::store::ScopeStore;
use livepack_common::BlockId;
use livepack_trace::{RecordStore, Strictness as FnStrictness};
use tracing::debug;

const STRICT_RESERVED: &[&str] = &["arguments", "eval"];

/// Children of a block whose body needs its own `"use strict"` directive
/// (the block itself ended up sloppy, but this child function was strict).
/// `needs_strict_iife` additionally flags children with non-simple
/// parameters (default/rest), which can't carry a body-level directive in a
/// sloppy enclosing function and must be wrapped in a strict IIFE instead.
#[derive(Debug, Clone)]
pub struct StrictChildFixup {
    pub function_record: livepack_common::RecordId,
    pub needs_strict_iife: bool,
}

pub fn reconcile_strictness(
    store: &mut ScopeStore,
    records: &RecordStore,
    has_non_simple_params: impl Fn(livepack_common::RecordId) -> bool,
) -> Vec<StrictChildFixup> {
    let mut fixups = Vec::new();
    let block_ids: Vec<BlockId> = (0..store.blocks().len()).map(|i| BlockId(i as u32)).collect();
    for block_id in block_ids {
        reconcile_one(store, records, block_id, &has_non_simple_params, &mut fixups);
    }
    fixups
}

fn reconcile_one(
    store: &mut ScopeStore,
    records: &RecordStore,
    block_id: BlockId,
    has_non_simple_params: &impl Fn(livepack_common::RecordId) -> bool,
    fixups: &mut Vec<StrictChildFixup>,
) {
    let has_frozen_reserved = store
        .block(block_id)
        .params
        .iter()
        .any(|p| p.is_frozen_name && STRICT_RESERVED.contains(&p.name.as_str()));

    if has_frozen_reserved {
        store.block_mut(block_id).strictness = Some(BlockStrictness::Sloppy);
        debug!(block = block_id.0, "block forced sloppy: frozen reserved name");
        return;
    }

    let children = store.block(block_id).functions.clone();
    if children.is_empty() {
        // No children to take a cue from; default to strict, matching the
        // emitted-code convention of preferring strict unless forced sloppy.
        store.block_mut(block_id).strictness = Some(BlockStrictness::Strict);
        return;
    }

    let all_strict = children.iter().all(|&rec| records.get(rec).strictness == FnStrictness::Strict);
    if all_strict {
        store.block_mut(block_id).strictness = Some(BlockStrictness::Strict);
        return;
    }

    store.block_mut(block_id).strictness = Some(BlockStrictness::Sloppy);
    for &rec in &children {
        if records.get(rec).strictness == FnStrictness::Strict {
            fixups.push(StrictChildFixup { function_record: rec, needs_strict_iife: has_non_simple_params(rec) });
        }
    }
    debug!(block = block_id.0, fixups = fixups.len(), "block sloppy: mixed strict/sloppy children");
}
