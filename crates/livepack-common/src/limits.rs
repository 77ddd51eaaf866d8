//! Centralized constants shared across the pipeline.
//!
//! Kept in one place (mirroring the teacher codebase's `limits` module) so a
//! single crate-wide search finds every magic number.

/// Number of pad characters in a circular-filename placeholder, before the
/// decimal output-serial suffix (`PPPPPPPnnn`).
pub const PLACEHOLDER_PAD_LEN: usize = 7;

/// Final emitted hash length in characters (Base32-encoded SHA-1, truncated).
pub const HASH_LENGTH: usize = 8;

/// The uniform placeholder character used to normalize content before
/// hashing (`PPPPPPPP`, `HASH_LENGTH` repeats).
pub const PLACEHOLDER_CHAR: char = 'P';

/// Guard against runaway scope-chain walks (malformed/cyclic frame parent
/// chains supplied by a buggy instrumenter).
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Guard against runaway dependency-DFS recursion during emission ordering.
pub const MAX_EMIT_DEPTH: usize = 100_000;
