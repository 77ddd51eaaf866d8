//! Function/scope analysis and block-factory emission (spec §4.2).
//!
//! Consumes the `RecordStore` built by `livepack-trace` plus the
//! instrumenter-supplied block/frame tables, runs the seven-step analyzer
//! (missing-scope completion, inline-function detection, circular-value
//! detection, parameter ordering, strict/sloppy reconciliation, name
//! mangling, frozen this/arguments injection), and emits each block's scope
//! factory as a `livepack-ir` fragment.

pub mod analyzer;
pub mod block;
pub mod circular;
pub mod factory;
pub mod frame;
pub mod frozen;
pub mod mangle;
pub mod splice;
pub mod store;
pub mod strict;
mod super_rewrite;

pub use analyzer::{complete_missing_scopes, detect_inline_functions, order_parameters};
pub use block::{Block, BlockParam, Strictness};
pub use circular::detect_circular_values;
pub use factory::{build_factory, build_factory_with_exposed, FactoryPlan};
pub use frame::{ScopeFrame, ValueProps};
pub use frozen::check_and_apply as apply_frozen_wrapper;
pub use mangle::{mangled_name, MangleStrategy, NameMangler};
pub use splice::splice_closures;
pub use store::ScopeStore;
pub use strict::{reconcile_strictness, StrictChildFixup};

use livepack_common::{BlockId, RecordPath, Result};
use livepack_trace::RecordStore;

/// Runs all seven analyzer steps over a fully-populated `ScopeStore`, in
/// the order the spec's block processor requires: later steps depend on
/// earlier ones having already settled (mangling needs frozen names from
/// step 7's candidates, strictness needs step 2's locally-produced params
/// resolved, and so on).
pub fn analyze(
    store: &mut ScopeStore,
    records: &RecordStore,
    has_non_simple_params: impl Fn(livepack_common::RecordId) -> bool,
) -> Result<Vec<StrictChildFixup>> {
    complete_missing_scopes(store);
    detect_inline_functions(store, records);
    detect_circular_values(store, records);
    order_parameters(store);
    let fixups = reconcile_strictness(store, records, has_non_simple_params);

    let block_ids: Vec<BlockId> = (0..store.blocks().len()).map(|i| BlockId(i as u32)).collect();
    for block_id in &block_ids {
        apply_frozen_wrapper(store, *block_id, &RecordPath::root())?;
    }

    Ok(fixups)
}
