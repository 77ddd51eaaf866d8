//! Content-addressed table mapping each live value's identity to a `Record`.

use crate::record::{EdgeKey, Record, RecordKind};
use livepack_common::{Primitive, RecordId, value_eq};
use livepack_ir::NodeId;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct RecordStore {
    records: Vec<Record>,
    /// Reference-identity lookup: object pointer address -> record id.
    by_object_identity: FxHashMap<usize, RecordId>,
    /// Value-identity lookup for primitives, bucketed by a cheap
    /// discriminant so we never compare e.g. a string against a number.
    /// Each bucket keeps the exact `Primitive` alongside its id so
    /// `value_eq` (`NaN`/`-0` aware) can disambiguate within the bucket.
    primitive_buckets: FxHashMap<PrimitiveBucketKey, Vec<(Primitive, RecordId)>>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum PrimitiveBucketKey {
    Undefined,
    Null,
    Bool(bool),
    NumberBits(u64),
    String(String),
    BigInt(String),
}

fn bucket_key(p: &Primitive) -> PrimitiveBucketKey {
    match p {
        Primitive::Undefined => PrimitiveBucketKey::Undefined,
        Primitive::Null => PrimitiveBucketKey::Null,
        Primitive::Bool(b) => PrimitiveBucketKey::Bool(*b),
        // NaN and -0/+0 need value_eq (not bit equality) to disambiguate
        // within a bucket, so the numeric bucket groups by bit pattern
        // only as a fast pre-filter; the store still does a `value_eq`
        // scan within the bucket.
        Primitive::Number(n) => PrimitiveBucketKey::NumberBits(if n.is_nan() { u64::MAX } else { n.to_bits() }),
        Primitive::String(s) => PrimitiveBucketKey::String(s.clone()),
        Primitive::BigInt(s) => PrimitiveBucketKey::BigInt(s.clone()),
        Primitive::Symbol { id, .. } => PrimitiveBucketKey::NumberBits(*id),
    }
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, kind: RecordKind, name: impl Into<String>, node: NodeId) -> RecordId {
        let id = RecordId(self.records.len() as u32);
        self.records.push(Record::new(id, kind, name, node));
        id
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> &Record {
        &self.records[id.index()]
    }

    pub fn get_mut(&mut self, id: RecordId) -> &mut Record {
        &mut self.records[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Look up (or remember) the record for a non-primitive by reference
    /// identity.
    #[must_use]
    pub fn lookup_object(&self, identity: usize) -> Option<RecordId> {
        self.by_object_identity.get(&identity).copied()
    }

    pub fn register_object(&mut self, identity: usize, id: RecordId) {
        self.by_object_identity.insert(identity, id);
    }

    /// Look up the record for a primitive by value identity (`NaN == NaN`,
    /// `-0 != +0`).
    #[must_use]
    pub fn lookup_primitive(&self, value: &Primitive) -> Option<RecordId> {
        let bucket = self.primitive_buckets.get(&bucket_key(value))?;
        bucket.iter().find(|(found, _)| value_eq(found, value)).map(|(_, id)| *id)
    }

    pub fn register_primitive(&mut self, value: Primitive, id: RecordId) {
        self.primitive_buckets.entry(bucket_key(&value)).or_default().push((value, id));
    }

    /// Add a dependency edge from `from` to `to`, maintaining the
    /// deps/dependents inverse invariant.
    pub fn add_dep(&mut self, from: RecordId, to: RecordId, node: NodeId, key: EdgeKey) {
        self.records[from.index()].deps.push(crate::record::DepEdge { target: to, node, key: key.clone() });
        self.records[to.index()].dependents.push(crate::record::DepEdge { target: from, node, key });
        self.records[to.index()].usage_count += 1;
    }
}
