use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::normalize::normalize_block;

/// One unit of note content. `position` is deliberately absent: ordering is
/// the block list itself, persisted as a 1-based column on write and never
/// carried around as state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub uid: String,
    pub color: Option<String>,
    pub body: BlockBody,
}

/// Closed set of block kinds. Each variant carries only the fields that are
/// meaningful for it; everything else simply cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockBody {
    Heading1 { text: String },
    Heading2 { text: String },
    Heading3 { text: String },
    Paragraph { text: String },
    Todo { text: String, checked: bool },
    Bulleted { items: Vec<String> },
    Numbered { items: Vec<String> },
    Quote { text: String },
    Callout { text: String, icon: Option<String> },
    Divider,
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self.body {
            BlockBody::Heading1 { .. } => "heading1",
            BlockBody::Heading2 { .. } => "heading2",
            BlockBody::Heading3 { .. } => "heading3",
            BlockBody::Paragraph { .. } => "paragraph",
            BlockBody::Todo { .. } => "todo",
            BlockBody::Bulleted { .. } => "bulleted",
            BlockBody::Numbered { .. } => "numbered",
            BlockBody::Quote { .. } => "quote",
            BlockBody::Callout { .. } => "callout",
            BlockBody::Divider => "divider",
        }
    }

    pub fn text(&self) -> &str {
        match &self.body {
            BlockBody::Heading1 { text }
            | BlockBody::Heading2 { text }
            | BlockBody::Heading3 { text }
            | BlockBody::Paragraph { text }
            | BlockBody::Todo { text, .. }
            | BlockBody::Quote { text }
            | BlockBody::Callout { text, .. } => text,
            BlockBody::Bulleted { .. } | BlockBody::Numbered { .. } | BlockBody::Divider => "",
        }
    }
}

/// Wire/storage image: a flat object with only the kind-relevant fields set.
impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("uid", &self.uid)?;
        map.serialize_entry("type", self.kind())?;
        match &self.body {
            BlockBody::Heading1 { text }
            | BlockBody::Heading2 { text }
            | BlockBody::Heading3 { text }
            | BlockBody::Paragraph { text }
            | BlockBody::Quote { text } => {
                map.serialize_entry("text", text)?;
            }
            BlockBody::Todo { text, checked } => {
                map.serialize_entry("text", text)?;
                map.serialize_entry("checked", checked)?;
            }
            BlockBody::Bulleted { items } | BlockBody::Numbered { items } => {
                map.serialize_entry("items", items)?;
            }
            BlockBody::Callout { text, icon } => {
                map.serialize_entry("text", text)?;
                if let Some(icon) = icon {
                    map.serialize_entry("icon", icon)?;
                }
            }
            BlockBody::Divider => {}
        }
        if let Some(color) = &self.color {
            map.serialize_entry("color", color)?;
        }
        map.end()
    }
}

/// Blocks are only ever constructed through the normalizer; deserializing
/// routes through it too. The one unrepresentable input is a todo with no
/// label, which the normalizer drops.
impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        normalize_block(&value).ok_or_else(|| D::Error::custom("todo block without text"))
    }
}

/// Accepts six hex digits with or without a leading `#`, yields `#rrggbb`.
pub fn normalize_color(input: &str) -> Option<String> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_lowercase()))
    } else {
        None
    }
}
