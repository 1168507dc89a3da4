//! Text extraction: round identifiers, bracketed card segments, and suit glyphs.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{Combination, Suit, HEART, HEART_ALT, KNOWN_COMBINATIONS};

fn round_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#[nN](\d+)").expect("round regex is valid"))
}

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("segment regex is valid"))
}

/// Extract the round identifier from a marker like `#n744` or `#N744`.
///
/// Only the first marker counts. Returns `None` when the marker is missing,
/// the number is zero, or it does not fit in a `u64`.
pub fn extract_round_id(text: &str) -> Option<u64> {
    let caps = round_re().captures(text)?;
    let round: u64 = caps.get(1)?.as_str().parse().ok()?;
    (round > 0).then_some(round)
}

/// Contents of every parenthesized group, left to right.
pub fn extract_bracketed_segments(text: &str) -> Vec<&str> {
    segment_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Suits present in a segment, one entry per occurrence, grouped in suit priority order.
pub fn extract_glyph_multiset(segment: &str) -> Vec<Suit> {
    let normalized = segment.replace(HEART_ALT, HEART);
    let mut cards = Vec::new();
    for suit in Suit::ALL {
        let count = normalized.matches(suit.glyph()).count();
        cards.extend(std::iter::repeat(suit).take(count));
    }
    cards
}

/// True when exactly three distinct suits are present.
pub fn is_three_distinct(cards: &[Suit]) -> bool {
    let mut seen = [false; 4];
    for card in cards {
        seen[*card as usize] = true;
    }
    seen.iter().filter(|s| **s).count() == 3
}

/// The canonical combination for a multiset with exactly three distinct suits.
pub fn combination_identity(cards: &[Suit]) -> Option<Combination> {
    let combination = Combination::from_cards(cards)?;
    if KNOWN_COMBINATIONS.contains(&combination) {
        tracing::debug!("Known combination matched: {combination}");
    } else {
        tracing::debug!("Accepting unlisted combination: {combination}");
    }
    Some(combination)
}

/// Total number of suit glyphs in a segment.
pub fn count_glyphs(segment: &str) -> usize {
    extract_glyph_multiset(segment).len()
}

/// Total number of suit glyphs in the first bracketed segment, or 0 if there is none.
pub fn first_segment_glyph_count(text: &str) -> usize {
    extract_bracketed_segments(text)
        .first()
        .copied()
        .map(count_glyphs)
        .unwrap_or(0)
}
