use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::blocks::normalize_color;

/// Fixed palette used when a tag arrives without a color.
pub const TAG_PALETTE: [&str; 8] = [
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#14b8a6", "#3b82f6", "#8b5cf6", "#ec4899",
];

/// Deterministic palette pick, cycling by position. Injectable so tests can
/// substitute their own sequence.
pub fn default_color(index: usize) -> String {
    TAG_PALETTE[index % TAG_PALETTE.len()].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawTag {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

pub fn normalize_tags(raw: &[RawTag]) -> Vec<Tag> {
    normalize_tags_with(raw, &mut default_color)
}

/// Trims labels, drops empties, dedupes case-insensitively (first occurrence
/// wins) and validates or assigns colors.
pub fn normalize_tags_with(raw: &[RawTag], next_color: &mut dyn FnMut(usize) -> String) -> Vec<Tag> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for entry in raw {
        let label = entry.label.trim();
        if label.is_empty() || !seen.insert(label.to_lowercase()) {
            continue;
        }
        let color = entry
            .color
            .as_deref()
            .and_then(normalize_color)
            .unwrap_or_else(|| next_color(tags.len()));
        tags.push(Tag {
            label: label.to_string(),
            color,
        });
    }
    tags
}
