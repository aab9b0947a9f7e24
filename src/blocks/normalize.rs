use rand::RngCore;
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

use super::model::{normalize_color, Block, BlockBody};

/// Max grapheme clusters kept for a callout icon. Icons are usually a single
/// emoji, which can span several code points.
const ICON_MAX_GRAPHEMES: usize = 4;

/// Short random token used to address a block within its note.
pub fn generate_uid() -> String {
    let mut bytes = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Canonicalizes one raw block object from any source: the client editor
/// payload, a stored row's payload or a template snapshot.
///
/// Returns `None` for non-objects and for todos whose trimmed text is empty;
/// a todo cannot exist without a label. Every other malformed field is
/// coerced to its kind-appropriate default, never rejected.
pub fn normalize_block(raw: &Value) -> Option<Block> {
    normalize_block_with(raw, &mut generate_uid)
}

/// Same as [`normalize_block`] with an injectable uid source.
pub fn normalize_block_with(raw: &Value, new_uid: &mut dyn FnMut() -> String) -> Option<Block> {
    let obj = raw.as_object()?;

    let str_field = |name: &str| obj.get(name).and_then(Value::as_str);

    let kind = str_field("type").unwrap_or_default();
    let text = str_field("text").unwrap_or_default().trim().to_string();

    let body = match kind {
        "heading1" => BlockBody::Heading1 { text },
        "heading2" => BlockBody::Heading2 { text },
        "heading3" => BlockBody::Heading3 { text },
        "todo" => {
            if text.is_empty() {
                return None;
            }
            let checked = obj.get("checked").and_then(Value::as_bool).unwrap_or(false);
            BlockBody::Todo { text, checked }
        }
        "bulleted" => BlockBody::Bulleted {
            items: normalize_items(obj.get("items")),
        },
        "numbered" => BlockBody::Numbered {
            items: normalize_items(obj.get("items")),
        },
        "quote" => BlockBody::Quote { text },
        "callout" => BlockBody::Callout {
            text,
            icon: normalize_icon(str_field("icon")),
        },
        "divider" => BlockBody::Divider,
        // Unknown kinds degrade to a paragraph rather than losing content.
        _ => BlockBody::Paragraph { text },
    };

    let uid = str_field("uid")
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
        .map(String::from)
        .unwrap_or_else(new_uid);

    let color = str_field("color").and_then(normalize_color);

    Some(Block { uid, color, body })
}

fn normalize_items(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_icon(raw: Option<&str>) -> Option<String> {
    let icon = raw?.trim();
    if icon.is_empty() {
        return None;
    }
    Some(icon.graphemes(true).take(ICON_MAX_GRAPHEMES).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_uid() -> String {
        "feedfacecafe".into()
    }

    fn normalize(raw: Value) -> Option<Block> {
        normalize_block_with(&raw, &mut fixed_uid)
    }

    #[test]
    fn unknown_or_missing_type_becomes_paragraph() {
        for raw in [json!({"text": "hi"}), json!({"type": "wat", "text": "hi"})] {
            let block = normalize(raw).unwrap();
            assert_eq!(block.body, BlockBody::Paragraph { text: "hi".into() });
        }
    }

    #[test]
    fn non_object_input_is_rejected() {
        assert_eq!(normalize(json!("paragraph")), None);
        assert_eq!(normalize(json!(42)), None);
        assert_eq!(normalize(json!(null)), None);
    }

    #[test]
    fn missing_uid_gets_generated() {
        let block = normalize(json!({"type": "quote", "text": "q", "uid": "  "})).unwrap();
        assert_eq!(block.uid, "feedfacecafe");

        let block = normalize(json!({"type": "quote", "text": "q", "uid": "keepme"})).unwrap();
        assert_eq!(block.uid, "keepme");
    }

    #[test]
    fn generated_uids_are_twelve_hex_chars() {
        let uid = generate_uid();
        assert_eq!(uid.len(), 12);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn todo_without_text_is_dropped() {
        assert_eq!(normalize(json!({"type": "todo", "text": ""})), None);
        assert_eq!(normalize(json!({"type": "todo", "text": "   "})), None);
        assert_eq!(normalize(json!({"type": "todo"})), None);
    }

    #[test]
    fn kind_irrelevant_fields_are_cleared() {
        let block = normalize(json!({
            "type": "paragraph",
            "text": "p",
            "checked": true,
            "items": ["a"],
            "icon": "🔥",
        }))
        .unwrap();
        assert_eq!(block.body, BlockBody::Paragraph { text: "p".into() });

        let block = normalize(json!({"type": "divider", "text": "ignored", "checked": true})).unwrap();
        assert_eq!(block.body, BlockBody::Divider);
    }

    #[test]
    fn items_are_trimmed_and_filtered() {
        let block = normalize(json!({
            "type": "bulleted",
            "items": [" a ", "", "   ", 5, null, "b"],
        }))
        .unwrap();
        assert_eq!(
            block.body,
            BlockBody::Bulleted {
                items: vec!["a".into(), "b".into()]
            }
        );

        let block = normalize(json!({"type": "numbered", "items": "not an array"})).unwrap();
        assert_eq!(block.body, BlockBody::Numbered { items: vec![] });
    }

    #[test]
    fn callout_icon_truncates_by_grapheme() {
        let block = normalize(json!({"type": "callout", "text": "c", "icon": "👩‍🔧⚡abc"})).unwrap();
        let BlockBody::Callout { icon, .. } = block.body else {
            panic!("expected callout");
        };
        // The ZWJ emoji counts as one cluster.
        assert_eq!(icon.as_deref(), Some("👩‍🔧⚡ab"));

        let block = normalize(json!({"type": "callout", "text": "c", "icon": "  "})).unwrap();
        let BlockBody::Callout { icon, .. } = block.body else {
            panic!("expected callout");
        };
        assert_eq!(icon, None);
    }

    #[test]
    fn invalid_color_is_cleared() {
        let block = normalize(json!({"type": "paragraph", "text": "p", "color": "AABBCC"})).unwrap();
        assert_eq!(block.color.as_deref(), Some("#aabbcc"));

        let block = normalize(json!({"type": "paragraph", "text": "p", "color": "red"})).unwrap();
        assert_eq!(block.color, None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raws = [
            json!({"type": "heading1", "text": "  Title  ", "color": "ff0000"}),
            json!({"type": "todo", "text": "check panel", "checked": true}),
            json!({"type": "bulleted", "items": [" a ", "b", ""]}),
            json!({"type": "callout", "text": "note", "icon": "⚠️⚠️⚠️⚠️⚠️"}),
            json!({"type": "divider", "text": "junk"}),
            json!({"type": "nonsense", "text": "x", "items": [1]}),
        ];
        for raw in raws {
            let once = normalize(raw).unwrap();
            let image = serde_json::to_value(&once).unwrap();
            let twice = normalize(image).unwrap();
            assert_eq!(once, twice);
        }
    }
}
