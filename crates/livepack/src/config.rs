//! `SerializeOptions`: the enumerated configuration surface (§6).
//!
//! Plain struct, not a file-parsed config; the driver (out of scope) is
//! responsible for turning a config file or CLI flags into this shape.

use livepack_scope::MangleStrategy;
use livepack_split::ExportFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceMaps {
    Off,
    On,
    Inline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comments {
    Retain,
    Drop,
}

#[derive(Clone, Debug)]
pub struct SerializeOptions {
    pub format: ExportFormat,
    /// Whether the host executes the output as strict already (skips the
    /// file-granularity strictness choice's sloppy branch entirely).
    pub strict_env: bool,
    pub minify: bool,
    pub mangle: bool,
    pub inline: bool,
    pub source_maps: SourceMaps,
    pub ext: String,
    pub map_ext: String,
    /// Templates accepting `[name]` and `[hash]`.
    pub entry_chunk_name: String,
    pub split_chunk_name: String,
    pub common_chunk_name: String,
    pub output_dir: String,
    pub comments: Comments,
    /// When set, a sibling JSON stats report is produced alongside the
    /// emitted files.
    pub stats: bool,
}

impl SerializeOptions {
    #[must_use]
    pub fn mangle_strategy(&self) -> MangleStrategy {
        if self.mangle { MangleStrategy::Mangled } else { MangleStrategy::Unmangled }
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Cjs,
            strict_env: false,
            minify: false,
            mangle: false,
            inline: true,
            source_maps: SourceMaps::Off,
            ext: "js".to_string(),
            map_ext: "js.map".to_string(),
            entry_chunk_name: "[name].[hash]".to_string(),
            split_chunk_name: "[name].[hash]".to_string(),
            common_chunk_name: "common.[hash]".to_string(),
            output_dir: String::new(),
            comments: Comments::Drop,
            stats: false,
        }
    }
}

/// Renders a chunk-name template by substituting `[name]` and `[hash]`.
#[must_use]
pub fn render_chunk_name(template: &str, name: &str, hash: &str) -> String {
    template.replace("[name]", name).replace("[hash]", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_favor_cjs_and_no_mangling() {
        let opts = SerializeOptions::default();
        assert_eq!(opts.format, ExportFormat::Cjs);
        assert_eq!(opts.mangle_strategy(), MangleStrategy::Unmangled);
    }

    #[test]
    fn chunk_name_template_substitutes_both_placeholders() {
        let name = render_chunk_name("[name].[hash].js", "main", "abcd1234");
        assert_eq!(name, "main.abcd1234.js");
    }
}
