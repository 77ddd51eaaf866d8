//! `Output`: one emitted file, plus the bit-flag lattice of output kinds.

use bitflags::bitflags;
use livepack_common::{OutputId, RecordId};

bitflags! {
    /// A record's output is fixed once the splitter runs; `OutputKind` is
    /// the lattice described in §4.3, not a freely-combinable flag set in
    /// normal use (each `Output` has exactly one of the five named
    /// combinations below), but encoding it as bits lets masks select
    /// categories cheaply (`is_split()`, `is_common()`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct OutputKind: u8 {
        const ENTRY        = 1 << 0;
        const SYNC_SPLIT   = 1 << 1;
        const ASYNC_SPLIT  = 1 << 2;
        const COMMON       = 1 << 3;
        const COMMON_SPLIT = 1 << 4;
    }
}

impl OutputKind {
    #[must_use]
    pub const fn is_split(self) -> bool {
        self.intersects(Self::SYNC_SPLIT.union(Self::ASYNC_SPLIT).union(Self::COMMON_SPLIT))
    }

    #[must_use]
    pub const fn is_common(self) -> bool {
        self.intersects(Self::COMMON.union(Self::COMMON_SPLIT))
    }

    #[must_use]
    pub const fn is_async(self) -> bool {
        self.contains(Self::ASYNC_SPLIT)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Cjs,
    Esm,
    /// A single JS expression, no module wrapper (`exec: false` non-file use).
    Expr,
    /// Immediately-invoked, side-effecting only (`exec: true`).
    Exec,
}

#[derive(Debug)]
pub struct Output {
    pub id: OutputId,
    pub kind: OutputKind,
    pub name: String,
    /// Records directly exposed to importers, in declared/stable order.
    pub exports: Vec<RecordId>,
    /// Other outputs this file imports from.
    pub dependencies: Vec<OutputId>,
    pub strict_fn_records: Vec<RecordId>,
    pub sloppy_fn_records: Vec<RecordId>,
    /// `None` until the name-transform/hash pass (§4.4) resolves it; may
    /// contain a `[hash]` placeholder until the final splice.
    pub filename: Option<String>,
}

impl Output {
    #[must_use]
    pub fn new(id: OutputId, kind: OutputKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            exports: Vec::new(),
            dependencies: Vec::new(),
            strict_fn_records: Vec::new(),
            sloppy_fn_records: Vec::new(),
            filename: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_split_is_both_common_and_split() {
        let kind = OutputKind::COMMON_SPLIT;
        assert!(kind.is_common());
        assert!(kind.is_split());
    }

    #[test]
    fn entry_is_neither_common_nor_split() {
        let kind = OutputKind::ENTRY;
        assert!(!kind.is_common());
        assert!(!kind.is_split());
    }

    #[test]
    fn async_split_is_split_and_async() {
        let kind = OutputKind::ASYNC_SPLIT;
        assert!(kind.is_split());
        assert!(kind.is_async());
        assert!(!OutputKind::SYNC_SPLIT.is_async());
    }
}
