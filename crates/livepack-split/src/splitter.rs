//! Partition algorithm (§4.3): assigns each record to exactly one output.
//!
//! Every split point (the root value, plus each user-declared `split`/
//! `splitAsync` target) seeds its own output. A record reachable from a
//! single seed belongs to that seed's output; a record reachable from more
//! than one seed is automatic common extraction and moves to a shared
//! `common`/`common-split` output instead.

use crate::output::{Output, OutputKind};
use livepack_common::{OutputId, RecordId};
use livepack_trace::RecordStore;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct SplitPointSpec {
    pub root: RecordId,
    pub name: Option<String>,
    pub is_async: bool,
}

struct Seed {
    root: RecordId,
    kind: OutputKind,
    name: String,
}

/// Partitions every record reachable from `entry` (plus each declared split
/// point) into `Output`s. Record → output is computed once and fixed;
/// nothing downstream mutates the assignment.
pub fn partition(records: &RecordStore, entry: RecordId, split_points: &[SplitPointSpec]) -> (Vec<Output>, FxHashMap<RecordId, OutputId>) {
    let mut seeds = vec![Seed { root: entry, kind: OutputKind::ENTRY, name: "main".to_string() }];
    for (i, sp) in split_points.iter().enumerate() {
        let kind = if sp.is_async { OutputKind::ASYNC_SPLIT } else { OutputKind::SYNC_SPLIT };
        let name = sp.name.clone().unwrap_or_else(|| format!("split{i}"));
        seeds.push(Seed { root: sp.root, kind, name });
    }

    let seed_roots: FxHashSet<RecordId> = seeds.iter().map(|s| s.root).collect();

    // reached_by[record] = bitset of seed indices that can reach it without
    // crossing into another seed's boundary.
    let mut reached_by: FxHashMap<RecordId, FxHashSet<usize>> = FxHashMap::default();
    for (seed_index, seed) in seeds.iter().enumerate() {
        let mut stack = vec![seed.root];
        let mut visited = FxHashSet::default();
        while let Some(record_id) = stack.pop() {
            if !visited.insert(record_id) {
                continue;
            }
            reached_by.entry(record_id).or_default().insert(seed_index);
            if record_id != seed.root && seed_roots.contains(&record_id) {
                // Another seed's own root: it pulls its own dependencies
                // independently, don't walk past it from here.
                continue;
            }
            for edge in &records.get(record_id).deps {
                stack.push(edge.target);
            }
        }
    }

    let mut outputs = Vec::with_capacity(seeds.len() + 1);
    let mut assignment: FxHashMap<RecordId, OutputId> = FxHashMap::default();

    for (seed_index, seed) in seeds.iter().enumerate() {
        let id = OutputId(seed_index as u32);
        outputs.push(Output::new(id, seed.kind, seed.name.clone()));
        assignment.insert(seed.root, id);
    }
    outputs[0].exports.push(entry);
    for (seed_index, seed) in seeds.iter().enumerate().skip(1) {
        outputs[seed_index].exports.push(seed.root);
    }

    let common_output_id = OutputId(seeds.len() as u32);
    let mut common_records: Vec<RecordId> = Vec::new();
    let mut common_only_async = true;

    for (&record_id, seed_indices) in &reached_by {
        if seed_roots.contains(&record_id) {
            continue; // seed roots are already assigned to their own output
        }
        if seed_indices.len() == 1 {
            let seed_index = *seed_indices.iter().next().unwrap();
            assignment.insert(record_id, OutputId(seed_index as u32));
        } else {
            common_records.push(record_id);
            assignment.insert(record_id, common_output_id);
            if seed_indices.iter().any(|&i| !seeds[i].kind.is_async() && seeds[i].kind != OutputKind::COMMON) {
                common_only_async = false;
            }
        }
    }

    if !common_records.is_empty() {
        let kind = if common_only_async { OutputKind::COMMON_SPLIT } else { OutputKind::COMMON };
        let mut common_output = Output::new(common_output_id, kind, "common".to_string());
        common_records.sort_by_key(|r| r.0);
        common_output.exports = common_records;
        outputs.push(common_output);
        debug!(count = outputs.last().unwrap().exports.len(), "extracted common output");
    }

    link_cross_output_dependencies(records, &mut outputs, &assignment);

    (outputs, assignment)
}

fn link_cross_output_dependencies(records: &RecordStore, outputs: &mut [Output], assignment: &FxHashMap<RecordId, OutputId>) {
    for output in outputs.iter_mut() {
        let mut deps: FxHashSet<OutputId> = FxHashSet::default();
        for &record_id in &output.exports {
            collect_output_deps(records, record_id, output.id, assignment, &mut deps);
        }
        let mut deps: Vec<OutputId> = deps.into_iter().collect();
        deps.sort_by_key(|id| id.0);
        output.dependencies = deps;
    }
}

fn collect_output_deps(
    records: &RecordStore,
    record_id: RecordId,
    owning_output: OutputId,
    assignment: &FxHashMap<RecordId, OutputId>,
    out: &mut FxHashSet<OutputId>,
) {
    for edge in &records.get(record_id).deps {
        match assignment.get(&edge.target) {
            Some(&target_output) if target_output != owning_output => {
                out.insert(target_output);
            }
            Some(&target_output) if target_output == owning_output => {
                collect_output_deps(records, edge.target, owning_output, assignment, out);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepack_ir::NodeId;
    use livepack_trace::RecordKind;

    fn mk(records: &mut RecordStore, name: &str) -> RecordId {
        records.create(RecordKind::PlainObject, name, NodeId(0))
    }

    #[test]
    fn single_seed_owns_everything_it_reaches() {
        let mut records = RecordStore::new();
        let root = mk(&mut records, "root");
        let child = mk(&mut records, "child");
        records.add_dep(root, child, NodeId(0), livepack_trace::EdgeKey::Property("child".into()));

        let (outputs, assignment) = partition(&records, root, &[]);
        assert_eq!(outputs.len(), 1);
        assert_eq!(assignment[&root], outputs[0].id);
        assert_eq!(assignment[&child], outputs[0].id);
    }

    #[test]
    fn record_reached_by_two_seeds_moves_to_common() {
        let mut records = RecordStore::new();
        let entry = mk(&mut records, "entry");
        let split_root = mk(&mut records, "split");
        let shared = mk(&mut records, "shared");
        records.add_dep(entry, shared, NodeId(0), livepack_trace::EdgeKey::Property("shared".into()));
        records.add_dep(split_root, shared, NodeId(0), livepack_trace::EdgeKey::Property("shared".into()));

        let split_points = vec![SplitPointSpec { root: split_root, name: None, is_async: false }];
        let (outputs, assignment) = partition(&records, entry, &split_points);

        assert_eq!(outputs.len(), 3); // entry, split, common
        let common = outputs.iter().find(|o| o.kind.is_common()).expect("common output");
        assert_eq!(assignment[&shared], common.id);
        assert!(common.exports.contains(&shared));
    }

    #[test]
    fn entry_depending_on_split_root_records_cross_output_dependency() {
        let mut records = RecordStore::new();
        let entry = mk(&mut records, "entry");
        let split_root = mk(&mut records, "split");
        records.add_dep(entry, split_root, NodeId(0), livepack_trace::EdgeKey::Property("lazy".into()));

        let split_points = vec![SplitPointSpec { root: split_root, name: Some("lazy".into()), is_async: true }];
        let (outputs, _assignment) = partition(&records, entry, &split_points);

        let entry_output = outputs.iter().find(|o| o.kind == OutputKind::ENTRY).unwrap();
        let split_output = outputs.iter().find(|o| o.kind == OutputKind::ASYNC_SPLIT).unwrap();
        assert!(entry_output.dependencies.contains(&split_output.id));
    }
}
