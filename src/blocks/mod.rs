mod model;
mod normalize;
mod payload;
mod plaintext;

pub use model::{normalize_color, Block, BlockBody};
pub use normalize::{generate_uid, normalize_block};
pub use payload::parse_blocks_payload;
pub use plaintext::blocks_to_plaintext;
