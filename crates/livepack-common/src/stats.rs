//! The `stats` report: a sibling JSON listing every produced file.
//!
//! The `stats` config flag is named in §6 but its shape is not specified;
//! this mirrors the `Output` fields that are externally meaningful (`type`,
//! `name`, `filename`).

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputStatsKind {
    Entry,
    SyncSplit,
    AsyncSplit,
    Common,
    CommonSplit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputStats {
    #[serde(rename = "type")]
    pub kind: OutputStatsKind,
    pub name: String,
    pub filename: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub outputs: Vec<OutputStats>,
}

impl Stats {
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
