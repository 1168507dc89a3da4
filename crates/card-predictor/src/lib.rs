//! Card Predictor: core engine that reads card-round messages from a chat feed,
//! emits next-round predictions, and verifies them against later rounds.

pub mod config;
pub mod engine;
pub mod extract;
pub mod fingerprint;
pub mod progress;
pub mod types;

pub use config::PredictorConfig;
pub use engine::{format_prediction, success_glyph, CardPredictor, FAILED_GLYPH, PENDING_STATUS};
pub use extract::{
    combination_identity, count_glyphs, extract_bracketed_segments, extract_glyph_multiset,
    extract_round_id, first_segment_glyph_count, is_three_distinct,
};
pub use fingerprint::Fingerprint;
pub use progress::{is_final, is_provisional};
pub use types::*;
