//! Shared types and utilities for the livepack serializer.
//!
//! This crate provides foundational types used across all livepack crates:
//! - String interning (`Atom`) for identifier and property-key dedup
//! - The `LivepackError` type and the `RecordPath` diagnostic trail
//! - Value-identity comparison helpers (`NaN`/`-0` aware)
//! - Shared limits and constants
//! - The `Stats` report shape for the `stats` config flag

pub mod descriptor;
pub mod error;
pub mod ids;
pub mod interner;
pub mod limits;
pub mod numeric;
pub mod stats;

pub use descriptor::{DescriptorBitmap, PropertyFlags};
pub use error::{LivepackError, RecordPath, RecordPathSegment, Result};
pub use ids::{BlockId, FrameId, OutputId, RecordId};
pub use interner::{Atom, Interner};
pub use numeric::{Primitive, value_eq};
pub use stats::{OutputStats, OutputStatsKind, Stats};
