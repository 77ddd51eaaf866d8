//! File-granularity strict-mode choice (§4.4).
//!
//! An output's functions are a mix of strict and sloppy per the scope
//! processor's per-block reconciliation. The emitter picks one of two
//! whole-file strategies, minimizing total wrapping:
//!
//! (a) file is strict (`"use strict"` at the top), every sloppy function
//!     gets an indirect-`eval` escape hatch; or
//! (b) file stays sloppy, every strict function gets its own `"use strict"`
//!     body directive.
//!
//! ESM outputs are always implicitly strict, so there's nothing to choose:
//! a mixed ESM output still needs no wrapping because every function in it
//! already runs strict.

use livepack_split::ExportFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStrictness {
    /// `esm` output: implicitly strict, no per-function work needed.
    ImplicitStrict,
    /// Top-level `"use strict"`; `sloppy_count` functions need an
    /// indirect-`eval` wrapper to regain sloppy semantics.
    StrictFileWithSloppyWrappers,
    /// No top-level directive; `strict_count` functions get their own
    /// `"use strict"` body directive.
    SloppyFileWithStrictDirectives,
}

#[must_use]
pub fn choose(format: ExportFormat, strict_count: usize, sloppy_count: usize) -> FileStrictness {
    if format == ExportFormat::Esm {
        return FileStrictness::ImplicitStrict;
    }
    if sloppy_count <= strict_count {
        FileStrictness::StrictFileWithSloppyWrappers
    } else {
        FileStrictness::SloppyFileWithStrictDirectives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esm_is_always_implicit() {
        assert_eq!(choose(ExportFormat::Esm, 10, 0), FileStrictness::ImplicitStrict);
        assert_eq!(choose(ExportFormat::Esm, 0, 10), FileStrictness::ImplicitStrict);
    }

    #[test]
    fn cjs_picks_the_cheaper_wrapping_count() {
        assert_eq!(choose(ExportFormat::Cjs, 8, 2), FileStrictness::StrictFileWithSloppyWrappers);
        assert_eq!(choose(ExportFormat::Cjs, 2, 8), FileStrictness::SloppyFileWithStrictDirectives);
    }

    #[test]
    fn tie_prefers_the_strict_file() {
        assert_eq!(choose(ExportFormat::Cjs, 5, 5), FileStrictness::StrictFileWithSloppyWrappers);
    }
}
