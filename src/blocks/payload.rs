use std::collections::HashSet;

use serde_json::Value;

use super::model::Block;
use super::normalize::{generate_uid, normalize_block};
use super::plaintext::blocks_to_plaintext;

/// Parses the serialized block-editor payload into a normalized, ordered
/// block list plus the plaintext body to persist alongside it.
///
/// A blank payload, malformed JSON or a non-array top level are all expected
/// degenerate inputs (scripting disabled, editor bug, hand-rolled API call):
/// they degrade to a single paragraph synthesized from the plaintext
/// fallback instead of failing the save.
pub fn parse_blocks_payload(payload: Option<&str>, fallback_text: &str) -> (Vec<Block>, String) {
    let fallback = fallback_text.trim();

    let entries = payload
        .map(str::trim)
        .filter(|payload| !payload.is_empty())
        .and_then(|payload| serde_json::from_str::<Value>(payload).ok())
        .and_then(|value| match value {
            Value::Array(entries) => Some(entries),
            _ => None,
        });

    let Some(entries) = entries else {
        if fallback.is_empty() {
            return (Vec::new(), String::new());
        }
        let blocks: Vec<Block> = normalize_block(&serde_json::json!({
            "type": "paragraph",
            "text": fallback,
        }))
        .into_iter()
        .collect();
        return (blocks, fallback.to_string());
    };

    // Client uids are advisory; a repeated one gets replaced so the list
    // stays addressable per uid within the note.
    let mut seen = HashSet::new();
    let blocks: Vec<Block> = entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(normalize_block)
        .map(|mut block| {
            while !seen.insert(block.uid.clone()) {
                block.uid = generate_uid();
            }
            block
        })
        .collect();

    let body = if blocks.is_empty() {
        fallback.to_string()
    } else {
        blocks_to_plaintext(&blocks)
    };
    (blocks, body)
}
