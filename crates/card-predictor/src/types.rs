//! Core data types for card glyphs, combinations, and tracked predictions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical spade glyph.
pub const SPADE: &str = "\u{2660}\u{FE0F}";
/// Canonical heart glyph.
pub const HEART: &str = "\u{2665}\u{FE0F}";
/// Canonical diamond glyph.
pub const DIAMOND: &str = "\u{2666}\u{FE0F}";
/// Canonical club glyph.
pub const CLUB: &str = "\u{2663}\u{FE0F}";
/// Alternate heart spelling, normalized to [`HEART`] before counting.
pub const HEART_ALT: &str = "\u{2764}\u{FE0F}";

/// One of the four card suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Spade,
    Heart,
    Diamond,
    Club,
}

impl Suit {
    /// All suits in priority order.
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

    /// The canonical glyph for this suit.
    pub fn glyph(self) -> &'static str {
        match self {
            Suit::Spade => SPADE,
            Suit::Heart => HEART,
            Suit::Diamond => DIAMOND,
            Suit::Club => CLUB,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Three distinct suits observed in one bracketed segment.
///
/// The suits are kept sorted by glyph, so two combinations built from the
/// same suits compare equal regardless of source order or multiplicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Combination([Suit; 3]);

impl Combination {
    /// Build a combination from exactly three distinct suits.
    pub fn new(a: Suit, b: Suit, c: Suit) -> Option<Self> {
        if a == b || b == c || a == c {
            return None;
        }
        let mut suits = [a, b, c];
        suits.sort_by_key(|s| s.glyph());
        Some(Self(suits))
    }

    /// Build a combination from a multiset when it holds exactly three distinct suits.
    pub fn from_cards(cards: &[Suit]) -> Option<Self> {
        let mut distinct: Vec<Suit> = Vec::with_capacity(4);
        for card in cards {
            if !distinct.contains(card) {
                distinct.push(*card);
            }
        }
        match distinct.as_slice() {
            [a, b, c] => Self::new(*a, *b, *c),
            _ => None,
        }
    }

    /// The sorted suits of this combination.
    pub fn suits(&self) -> [Suit; 3] {
        self.0
    }

    /// Canonical key: the three glyphs concatenated in sorted order.
    pub fn key(&self) -> String {
        self.0.iter().map(|s| s.glyph()).collect()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<Combination> for String {
    fn from(c: Combination) -> Self {
        c.key()
    }
}

impl FromStr for Combination {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = crate::extract::extract_glyph_multiset(s);
        if cards.len() != 3 {
            return Err(PredictorError::InvalidCombination(s.to_string()));
        }
        Self::from_cards(&cards).ok_or_else(|| PredictorError::InvalidCombination(s.to_string()))
    }
}

impl TryFrom<String> for Combination {
    type Error = PredictorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The four combinations documented for the feed. Used for diagnostics and strict mode.
pub const KNOWN_COMBINATIONS: [Combination; 4] = [
    Combination([Suit::Spade, Suit::Heart, Suit::Diamond]),
    Combination([Suit::Spade, Suit::Club, Suit::Heart]),
    Combination([Suit::Spade, Suit::Club, Suit::Diamond]),
    Combination([Suit::Club, Suit::Heart, Suit::Diamond]),
];

/// Lifecycle state of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Pending,
    Correct,
    Failed,
}

impl PredictionStatus {
    pub fn is_pending(self) -> bool {
        self == PredictionStatus::Pending
    }
}

/// A prediction emitted for a round, tracked until it is confirmed or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Round the prediction is for.
    pub target_round: u64,
    /// Round whose message triggered the prediction.
    pub source_round: u64,
    pub combination: Combination,
    pub status: PredictionStatus,
    /// Rounds between the target and the verifying round. Zero until resolved.
    pub offset: u64,
    /// Text that was sent when the prediction was made.
    pub text: String,
    /// Rewritten text, set once resolved.
    pub resolved_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A positive prediction decision: the round that triggered it and its combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub round: u64,
    pub combination: Combination,
}

/// Outcome of resolving a pending prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationUpdate {
    pub predicted_round: u64,
    pub verifying_round: u64,
    pub offset: u64,
    pub status: PredictionStatus,
    /// Rewritten prediction text to deliver in place of the original.
    pub text: String,
    pub original_text: String,
}

/// What the engine produced for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineOutput {
    /// A new prediction was emitted for `round`.
    Predicted {
        round: u64,
        source_round: u64,
        combination: Combination,
        text: String,
    },
    /// A pending prediction was resolved.
    Resolved(VerificationUpdate),
}

impl EngineOutput {
    /// The outbound text to deliver.
    pub fn text(&self) -> &str {
        match self {
            EngineOutput::Predicted { text, .. } => text,
            EngineOutput::Resolved(update) => &update.text,
        }
    }
}

/// Counters describing an engine's tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorStats {
    pub pending: usize,
    pub correct: usize,
    pub failed: usize,
    pub provisional_rounds: usize,
    pub fingerprints: usize,
}

/// Errors that can occur when configuring the predictor.
#[derive(thiserror::Error, Debug)]
pub enum PredictorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid combination: {0}")]
    InvalidCombination(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type PredictorResult<T> = Result<T, PredictorError>;
