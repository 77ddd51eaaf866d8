//! Per-output variable naming (§4.4).
//!
//! One instance per output, seeded with the globals that output's source
//! references, so local bindings never shadow them. Delegates the actual
//! name generation to the same `NameMangler` the scope/block processor
//! uses for frame parameters, keeping the two mangling passes consistent.

use livepack_common::RecordId;
use livepack_scope::{MangleStrategy, NameMangler};
use rustc_hash::FxHashMap;

pub struct NameTransform {
    mangler: NameMangler,
    assigned: FxHashMap<RecordId, String>,
}

impl NameTransform {
    #[must_use]
    pub fn new(strategy: MangleStrategy, globals: impl IntoIterator<Item = String>) -> Self {
        Self { mangler: NameMangler::new(strategy, Vec::new(), globals), assigned: FxHashMap::default() }
    }

    /// Returns the top-level binding name for `record`, generating and
    /// caching a fresh one on first use so repeated references (including
    /// through `Record::dependents`) always resolve to the same identifier.
    pub fn name_for(&mut self, record: RecordId, hint: &str) -> String {
        if let Some(existing) = self.assigned.get(&record) {
            return existing.clone();
        }
        let name = self.mangler.fresh(hint);
        self.assigned.insert(record, name.clone());
        name
    }

    #[must_use]
    pub fn existing_name(&self, record: RecordId) -> Option<&str> {
        self.assigned.get(&record).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepack_common::RecordId;

    #[test]
    fn same_record_gets_the_same_name_on_repeat_lookup() {
        let mut nt = NameTransform::new(MangleStrategy::Unmangled, vec![]);
        let first = nt.name_for(RecordId(0), "counter");
        let second = nt.name_for(RecordId(0), "counter");
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_records_with_the_same_hint_get_distinct_names() {
        let mut nt = NameTransform::new(MangleStrategy::Unmangled, vec![]);
        let a = nt.name_for(RecordId(0), "x");
        let b = nt.name_for(RecordId(1), "x");
        assert_ne!(a, b);
    }

    #[test]
    fn globals_are_never_reused_as_fresh_mangled_names() {
        let mut nt = NameTransform::new(MangleStrategy::Mangled, vec!["a".to_string()]);
        let first = nt.name_for(RecordId(0), "");
        assert_ne!(first, "a");
    }
}
