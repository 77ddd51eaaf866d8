//! Small integer handles shared across crate boundaries.
//!
//! Kept here (rather than in `livepack-trace`/`livepack-scope`) so that
//! `livepack-ir` can reference a record or scope frame from inside an AST
//! node (`Node::RecordRef`) without creating a dependency cycle between the
//! tracer/scope crates and the IR crate.

use std::fmt;

macro_rules! small_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<usize> for $name {
            fn from(i: usize) -> Self {
                Self(i as u32)
            }
        }
    };
}

small_id!(RecordId, "Stable small integer identity for one traced value (the `id` field of a Record).");
small_id!(FrameId, "Identity of one scope-frame activation.");
small_id!(BlockId, "Identity of one lexical block (scope site).");
small_id!(OutputId, "Identity of one emitted output (file).");
