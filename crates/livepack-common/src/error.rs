//! Error kinds for the serializer core.
//!
//! One variant per §7 error kind. Every error carries the record-path from
//! root to the offending node (`RecordPath`) so the caller can report useful
//! context, and, where the instrumenter supplied one, a source location.

use std::fmt;

/// One step on the path from the root value to the value that triggered an
/// error: a property key, an array index, or a captured scope-frame
/// parameter name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordPathSegment {
    Property(String),
    Index(u32),
    ScopeParam(String),
    Root,
}

impl fmt::Display for RecordPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) => write!(f, ".{name}"),
            Self::Index(i) => write!(f, "[{i}]"),
            Self::ScopeParam(name) => write!(f, " (scope param `{name}`)"),
            Self::Root => write!(f, "<root>"),
        }
    }
}

/// The full path from root to the offending record, rendered like
/// `<root>.foo[3] (scope param \`bar\`)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordPath(pub Vec<RecordPathSegment>);

impl RecordPath {
    #[must_use]
    pub fn root() -> Self {
        Self(vec![RecordPathSegment::Root])
    }

    #[must_use]
    pub fn child(&self, segment: RecordPathSegment) -> Self {
        let mut path = self.0.clone();
        path.push(segment);
        Self(path)
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.0 {
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

/// Fatal errors the core can raise. All are fatal per §7; recoverable
/// conditions (missing scope frames, indeterminate strictness, empty output
/// exports) are handled inline and never constructed as this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LivepackError {
    /// A value has no known kind and no reconstructible form (e.g. a live
    /// native handle).
    UnreconstructibleValue { path: RecordPath, description: String },
    /// A `splitAsync` target transitively contains its own import function.
    CircularSplitAsync { path: RecordPath },
    /// A frozen name needs both `this`/`arguments` injection and circular
    /// injection at once; documented limitation.
    FrozenConflict { path: RecordPath, name: String },
    /// The file-naming scheme produced a duplicate filename with no
    /// `[hash]` placeholder available to disambiguate.
    HashCollision { filename: String },
    /// A built-in CommonJS-only global, or another non-portable host
    /// global, was reached by the tracer.
    UnsupportedGlobal { path: RecordPath, name: String },
    /// A source string literal contains an 8-char run matching the hash
    /// placeholder pattern.
    PlaceholderEscape { path: RecordPath, literal: String },
}

impl fmt::Display for LivepackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreconstructibleValue { path, description } => {
                write!(f, "cannot reconstruct value at {path}: {description}")
            }
            Self::CircularSplitAsync { path } => {
                write!(f, "splitAsync target at {path} transitively imports itself")
            }
            Self::FrozenConflict { path, name } => write!(
                f,
                "frozen name `{name}` at {path} needs both this/arguments injection and circular injection"
            ),
            Self::HashCollision { filename } => write!(
                f,
                "filename `{filename}` collides with another output and has no [hash] placeholder to disambiguate; add [hash] to the chunk name template"
            ),
            Self::UnsupportedGlobal { path, name } => {
                write!(f, "unsupported global `{name}` at {path}")
            }
            Self::PlaceholderEscape { path, literal } => write!(
                f,
                "string literal at {path} collides with the hash placeholder pattern: {literal:?}"
            ),
        }
    }
}

impl std::error::Error for LivepackError {}

pub type Result<T> = std::result::Result<T, LivepackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_segments_in_order() {
        let path = RecordPath::root()
            .child(RecordPathSegment::Property("foo".into()))
            .child(RecordPathSegment::Index(3));
        assert_eq!(path.to_string(), "<root>.foo[3]");
    }

    #[test]
    fn error_display_includes_path() {
        let err = LivepackError::UnsupportedGlobal {
            path: RecordPath::root().child(RecordPathSegment::Property("module".into())),
            name: "module".into(),
        };
        assert!(err.to_string().contains("<root>.module"));
    }
}
