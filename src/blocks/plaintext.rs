use super::model::{Block, BlockBody};

/// Flat rendering of a single block, used for the legacy `body` column,
/// full-text search and previews.
pub fn block_to_plaintext(block: &Block) -> String {
    match &block.body {
        BlockBody::Divider => String::new(),
        BlockBody::Bulleted { items } | BlockBody::Numbered { items } => items
            .iter()
            .map(|item| format!("• {item}"))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => block.text().to_string(),
    }
}

/// Joins non-empty block projections with a blank line. Recomputed on every
/// save so the flat body never drifts from the structured list.
pub fn blocks_to_plaintext(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(block_to_plaintext)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}
