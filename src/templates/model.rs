use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::blocks::{blocks_to_plaintext, generate_uid, normalize_block, Block, BlockBody};
use crate::notes::{Note, NoteDraft, Properties, Status};
use crate::tags::Tag;

#[derive(Debug, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub snapshot: TemplateSnapshot,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindTemplatesResponse {
    pub results: Vec<TemplateSummary>,
}

/// Point-in-time capture of a note's reusable content. Blocks are stored as
/// normalized wire objects; position is re-derived at clone time, never
/// frozen into the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSnapshot {
    pub title: String,
    pub icon: Option<String>,
    pub cover_url: Option<String>,
    pub status: Status,
    pub properties: Properties,
    pub tags: Vec<Tag>,
    pub blocks: Vec<Value>,
}

impl TemplateSnapshot {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            icon: note.icon.clone(),
            cover_url: note.cover_url.clone(),
            status: note.status,
            properties: note.properties.clone(),
            tags: note.tags.clone(),
            blocks: note.blocks.iter().filter_map(|b| serde_json::to_value(b).ok()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplate {
    pub note_id: Uuid,
    pub name: String,
}

/// Reconstitutes a fresh draft from a snapshot. Every block gets a brand-new
/// uid: block uids address the checkbox toggle and must stay note-local, so
/// two clones of the same template never share identity. A snapshot with no
/// blocks still yields one empty paragraph.
pub fn apply_template(mut draft: NoteDraft, snapshot: &TemplateSnapshot) -> NoteDraft {
    draft.title = snapshot.title.clone();
    draft.icon = snapshot.icon.clone();
    draft.cover_url = snapshot.cover_url.clone();
    draft.status = snapshot.status;
    draft.properties = snapshot.properties.clone();
    draft.tags = snapshot.tags.clone();

    let mut blocks: Vec<Block> = snapshot
        .blocks
        .iter()
        .filter_map(normalize_block)
        .map(|mut block| {
            block.uid = generate_uid();
            block
        })
        .collect();
    if blocks.is_empty() {
        blocks.push(Block {
            uid: generate_uid(),
            color: None,
            body: BlockBody::Paragraph { text: String::new() },
        });
    }

    draft.body = blocks_to_plaintext(&blocks);
    draft.blocks = blocks;
    draft
}
