use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blocks::{parse_blocks_payload, Block};
use crate::ctx::UserId;
use crate::tags::{normalize_tags, RawTag, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idea,
    InProgress,
    Review,
    Blocked,
    Complete,
    Archived,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Idea,
        Status::InProgress,
        Status::Review,
        Status::Blocked,
        Status::Complete,
        Status::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idea => "idea",
            Status::InProgress => "in_progress",
            Status::Review => "review",
            Status::Blocked => "blocked",
            Status::Complete => "complete",
            Status::Archived => "archived",
        }
    }

    /// Server-side coercion of free text: exact match after lowercasing and
    /// separator folding, then unique prefix, then the default.
    pub fn coerce(input: &str) -> Self {
        let needle: String = input
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        if needle.is_empty() {
            return Status::default();
        }
        if let Some(status) = Self::ALL.iter().find(|s| s.as_str() == needle) {
            return *status;
        }
        let mut prefixed = Self::ALL.iter().filter(|s| s.as_str().starts_with(&needle));
        match (prefixed.next(), prefixed.next()) {
            (Some(status), None) => *status,
            _ => Status::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn coerce(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

/// Fixed-shape note properties; every invalid field reverts to its default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    pub project: String,
    pub location: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawProperties {
    pub project: Option<String>,
    pub location: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
}

impl Properties {
    pub fn normalize(raw: RawProperties) -> Self {
        Self {
            project: raw.project.as_deref().unwrap_or_default().trim().to_string(),
            location: raw.location.as_deref().unwrap_or_default().trim().to_string(),
            due_date: raw.due_date.as_deref().and_then(parse_date),
            priority: raw.priority.as_deref().map(Priority::coerce).unwrap_or_default(),
        }
    }
}

pub(crate) fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// The full editable aggregate: scalar fields, tag set and the ordered,
/// normalized block list, plus the flat `body` projection.
#[derive(Debug, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub date: Option<NaiveDate>,
    pub status: Status,
    pub icon: Option<String>,
    pub cover_url: Option<String>,
    pub properties: Properties,
    pub tags: Vec<Tag>,
    pub blocks: Vec<Block>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_by: Option<UserId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub date: Option<NaiveDate>,
    pub status: Status,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindNotesResponse {
    pub results: Vec<NoteSummary>,
}

/// Save form for both create and full update. `blocks` is the serialized
/// editor payload; `text` is the plaintext fallback the codec degrades to.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveNote {
    pub title: String,
    pub date: Option<String>,
    pub status: Option<String>,
    pub icon: Option<String>,
    pub cover_url: Option<String>,
    pub properties: RawProperties,
    pub tags: Vec<RawTag>,
    pub blocks: Option<String>,
    pub text: Option<String>,
}

/// Normalized, ready-to-persist note state.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
    pub date: Option<NaiveDate>,
    pub status: Status,
    pub icon: Option<String>,
    pub cover_url: Option<String>,
    pub properties: Properties,
    pub tags: Vec<Tag>,
    pub blocks: Vec<Block>,
}

impl NoteDraft {
    pub fn from_form(form: SaveNote) -> Self {
        let (blocks, body) = parse_blocks_payload(form.blocks.as_deref(), form.text.as_deref().unwrap_or_default());
        Self {
            title: form.title.trim().to_string(),
            body,
            date: form.date.as_deref().and_then(parse_date),
            status: form.status.as_deref().map(Status::coerce).unwrap_or_default(),
            icon: non_empty(form.icon),
            cover_url: non_empty(form.cover_url),
            properties: Properties::normalize(form.properties),
            tags: normalize_tags(&form.tags),
            blocks,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct ToggleChecked {
    pub checked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub ok: bool,
}
