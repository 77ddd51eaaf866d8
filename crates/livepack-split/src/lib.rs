//! The splitter (§4.3): partitions records into outputs.
//!
//! Honors explicit user split points, async split points, and automatic
//! common-subgraph extraction. A record's output is fixed before emission;
//! `partition` computes the whole assignment in one pass, it is never
//! revisited downstream.

pub mod output;
pub mod splitter;

pub use output::{ExportFormat, Output, OutputKind};
pub use splitter::{partition, SplitPointSpec};
