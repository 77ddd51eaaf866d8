//! Output scheduling, name transform, content hashing, runtime helpers, and
//! source rendering (§4.4-§4.5): the last stage before bytes hit disk.

pub mod emitter;
pub mod hashing;
pub mod helpers;
pub mod name_transform;
pub mod render;
pub mod scheduler;
pub mod strict_file;

pub use emitter::{emit_output, EmittedOutput};
pub use hashing::{content_hash, final_filename_hash, find_placeholder_sites, literal_collides_with_placeholder_pattern, splice_placeholders, PlaceholderSite};
pub use helpers::Helper;
pub use name_transform::NameTransform;
pub use render::Renderer;
pub use scheduler::{schedule, EmitPlan};
pub use strict_file::{choose as choose_file_strictness, FileStrictness};
