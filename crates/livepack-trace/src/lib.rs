//! The value tracer and record store (§4.1).
//!
//! Given a root value, walks the live graph, creates one `Record` per
//! distinct value (identity-keyed), classifies it, and registers dependency
//! edges. Downstream crates (`livepack-scope`, `livepack-split`,
//! `livepack-emit`) consume the resulting `RecordStore`.

pub mod classify;
pub mod contract;
pub mod record;
pub mod store;
pub mod tracer;
pub mod value;

pub use contract::{FunctionMeta, FunctionMetaLookup};
pub use record::{Assignment, DepEdge, EdgeKey, Record, RecordKind, Strictness};
pub use store::RecordStore;
pub use tracer::Tracer;
pub use value::{HostObject, HostProp, HostValue, ObjectKind, PropKey, PropValue};
