//! Step 7: frozen `this`/`arguments` injection.
//!
//! When a captured `this`/`arguments` can't be parameterized (the function
//! uses `eval`), the block factory is wrapped so the top-level invocation is
//! `(function(){ ...return... }).apply(thisValue, argumentsValue)`.

use crate::store::ScopeStore;
use livepack_common::{BlockId, LivepackError, RecordPath};

/// A frozen `this`/`arguments` name that also needs circular injection
/// (step 3) can't be satisfied by either mechanism alone: injection fires
/// after the factory returns, but `.apply` needs the value *at call time*.
/// This is `FrozenConflict`, a documented fatal limitation (§7).
pub fn check_and_apply(store: &mut ScopeStore, block_id: BlockId, path: &RecordPath) -> Result<(), LivepackError> {
    let block = store.block(block_id);
    if !block.contains_eval {
        return Ok(());
    }

    for frozen_name in ["this", "arguments"] {
        let is_frozen = block.params.iter().any(|p| p.name == frozen_name && p.is_frozen_name);
        if !is_frozen {
            continue;
        }
        let is_circular = block.injectors.iter().any(|n| n == frozen_name);
        if is_circular {
            return Err(LivepackError::FrozenConflict { path: path.clone(), name: frozen_name.to_string() });
        }
    }

    store.block_mut(block_id).needs_apply_wrapper = true;
    Ok(())
}
