//! Output scheduler (§4.4): orders each output's declarations by a
//! worklist DFS over the dependency graph, deferring cyclic edges to
//! assignment statements.

use livepack_common::{limits::MAX_EMIT_DEPTH, OutputId, RecordId};
use livepack_trace::RecordStore;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// One output's emission plan: records in declaration order, plus the
/// subset of dependency edges that couldn't be satisfied inline and must
/// become deferred assignment statements instead.
pub struct EmitPlan {
    pub declaration_order: Vec<RecordId>,
    pub deferred: Vec<RecordId>,
}

/// Schedules every record assigned to `output` (per `assignment`). Visits
/// dependencies before dependents (a record's declaration comes after
/// everything it needs); when a dependency is already `InProgress` (a
/// cycle), scheduling it is skipped here — the scope/trace-level deferred
/// `Assignment` created during tracing (or scope circular-injection) is
/// what actually resolves the cycle at emission time, this scheduler just
/// must not infinite-loop walking it.
#[must_use]
pub fn schedule(records: &RecordStore, output: OutputId, assignment: &FxHashMap<RecordId, OutputId>, roots: &[RecordId]) -> EmitPlan {
    let mut state: FxHashMap<RecordId, VisitState> = FxHashMap::default();
    let mut order = Vec::new();
    let mut deferred = FxHashSet::default();

    for &root in roots {
        visit(records, root, output, assignment, &mut state, &mut order, &mut deferred, 0);
    }

    EmitPlan { declaration_order: order, deferred: deferred.into_iter().collect() }
}

#[allow(clippy::too_many_arguments)]
fn visit(
    records: &RecordStore,
    record_id: RecordId,
    output: OutputId,
    assignment: &FxHashMap<RecordId, OutputId>,
    state: &mut FxHashMap<RecordId, VisitState>,
    order: &mut Vec<RecordId>,
    deferred: &mut FxHashSet<RecordId>,
    depth: usize,
) {
    assert!(depth < MAX_EMIT_DEPTH, "dependency graph deeper than the emission safety limit");
    if assignment.get(&record_id) != Some(&output) {
        return; // belongs to a different output; referenced by name, not declared here
    }
    match state.get(&record_id) {
        Some(VisitState::Done) => return,
        Some(VisitState::InProgress) => {
            deferred.insert(record_id);
            return;
        }
        None => {}
    }
    state.insert(record_id, VisitState::InProgress);
    for edge in &records.get(record_id).deps {
        visit(records, edge.target, output, assignment, state, order, deferred, depth + 1);
    }
    state.insert(record_id, VisitState::Done);
    order.push(record_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepack_ir::NodeId;
    use livepack_trace::{EdgeKey, RecordKind};

    fn mk(records: &mut RecordStore, name: &str) -> RecordId {
        records.create(RecordKind::PlainObject, name, NodeId(0))
    }

    #[test]
    fn dependencies_are_declared_before_dependents() {
        let mut records = RecordStore::new();
        let a = mk(&mut records, "a");
        let b = mk(&mut records, "b");
        records.add_dep(a, b, NodeId(0), EdgeKey::Property("b".into()));

        let output = OutputId(0);
        let mut assignment = FxHashMap::default();
        assignment.insert(a, output);
        assignment.insert(b, output);

        let plan = schedule(&records, output, &assignment, &[a]);
        assert_eq!(plan.declaration_order, vec![b, a]);
        assert!(plan.deferred.is_empty());
    }

    #[test]
    fn cycle_defers_the_back_edge_instead_of_looping_forever() {
        let mut records = RecordStore::new();
        let a = mk(&mut records, "a");
        let b = mk(&mut records, "b");
        records.add_dep(a, b, NodeId(0), EdgeKey::Property("b".into()));
        records.add_dep(b, a, NodeId(0), EdgeKey::Property("a".into()));

        let output = OutputId(0);
        let mut assignment = FxHashMap::default();
        assignment.insert(a, output);
        assignment.insert(b, output);

        let plan = schedule(&records, output, &assignment, &[a]);
        assert_eq!(plan.declaration_order.len(), 2);
        assert_eq!(plan.deferred, vec![a]);
    }
}
