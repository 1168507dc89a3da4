//! The prediction engine.
//!
//! A [`CardPredictor`] consumes the messages of one chat in arrival order. For
//! every message it can emit a prediction for the next round (when a bracketed
//! segment shows exactly three distinct suits) or resolve an earlier prediction
//! (when a completed round lands within the verification window).
//!
//! All tables are owned by the instance; nothing is shared between chats.
//! Predictions and provisional entries expire by age. Round ids only decide
//! verification offsets, so a stray or out-of-order id cannot evict anything.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::config::{PredictorConfig, MAX_RETENTION_SECS};
use crate::extract::{
    combination_identity, extract_bracketed_segments, extract_glyph_multiset, extract_round_id,
    first_segment_glyph_count, is_three_distinct,
};
use crate::fingerprint::Fingerprint;
use crate::progress::{is_final, is_provisional};
use crate::types::{
    Combination, Decision, EngineOutput, Prediction, PredictionStatus, PredictorResult,
    PredictorStats, VerificationUpdate,
};

/// Status placeholder carried by a freshly emitted prediction.
pub const PENDING_STATUS: &str = "statut :\u{23F3}";

/// Status glyph for a prediction that ran out of rounds.
pub const FAILED_GLYPH: &str = "\u{274C}\u{2B55}";

/// Minimum number of suit glyphs in the first segment for a round to count as legible.
const MIN_LEGIBLE_CARDS: usize = 3;

/// Only the first two bracketed segments are inspected.
const MAX_SEGMENTS: usize = 2;

/// Render the outbound text for a prediction targeting `round`.
pub fn format_prediction(round: u64) -> String {
    format!("\u{1F535}{round} \u{1F535}3K: {PENDING_STATUS}")
}

/// Success glyph for a prediction confirmed `offset` rounds after its target,
/// e.g. `✅2️⃣`.
pub fn success_glyph(offset: u64) -> String {
    format!("\u{2705}{offset}\u{FE0F}\u{20E3}")
}

/// Stateful prediction engine for a single message source.
#[derive(Debug)]
pub struct CardPredictor {
    config: PredictorConfig,
    /// Insertion ordered; verification resolves the first eligible entry.
    predictions: Vec<Prediction>,
    /// Messages that already produced a prediction. Never evicted.
    fingerprints: HashSet<Fingerprint>,
    /// Round -> latest in-progress message for that round and when it arrived.
    provisional: HashMap<u64, (String, DateTime<Utc>)>,
}

impl Default for CardPredictor {
    fn default() -> Self {
        Self {
            config: PredictorConfig::default(),
            predictions: Vec::new(),
            fingerprints: HashSet::new(),
            provisional: HashMap::new(),
        }
    }
}

impl CardPredictor {
    /// Create an engine with a validated configuration.
    pub fn new(config: PredictorConfig) -> PredictorResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Decide whether this message should trigger a prediction for the next round.
    pub fn should_predict(&mut self, text: &str) -> Option<Decision> {
        let round = extract_round_id(text)?;
        let now = Utc::now();
        self.evict_expired(now);

        if is_provisional(text) {
            tracing::debug!("Round {round}: provisional message recorded");
            self.provisional.insert(round, (text.to_string(), now));
            return None;
        }

        if is_final(text) && self.provisional.remove(&round).is_some() {
            tracing::debug!("Round {round}: final message supersedes provisional");
        }

        let segments = extract_bracketed_segments(text);
        if segments.is_empty() {
            return None;
        }

        let fingerprint = Fingerprint::of(text);
        for (index, segment) in segments.iter().take(MAX_SEGMENTS).enumerate() {
            let cards = extract_glyph_multiset(segment);
            if !is_three_distinct(&cards) {
                continue;
            }
            let Some(combination) = combination_identity(&cards) else {
                continue;
            };
            if !self.config.accepts(&combination) {
                tracing::debug!("Round {round}: combination {combination} rejected in strict mode");
                continue;
            }
            if self.fingerprints.contains(&fingerprint) {
                tracing::debug!("Round {round}: duplicate message {fingerprint}");
                continue;
            }

            self.fingerprints.insert(fingerprint);
            tracing::debug!("Round {round}: combination {combination} in segment {}", index + 1);
            return Some(Decision { round, combination });
        }

        None
    }

    /// Emit a prediction for the round after `round` and start tracking it.
    ///
    /// An existing prediction for the same target is replaced in place.
    pub fn make_prediction(&mut self, round: u64, combination: Combination) -> String {
        let target = round.saturating_add(1);
        let text = format_prediction(target);

        let prediction = Prediction {
            target_round: target,
            source_round: round,
            combination,
            status: PredictionStatus::Pending,
            offset: 0,
            text: text.clone(),
            resolved_text: None,
            created_at: Utc::now(),
            resolved_at: None,
        };

        match self.predictions.iter_mut().find(|p| p.target_round == target) {
            Some(existing) => *existing = prediction,
            None => self.predictions.push(prediction),
        }

        tracing::info!("Predicted round {target} from combination {combination} in round {round}");
        text
    }

    /// Check whether this message resolves a pending prediction.
    ///
    /// Pending predictions are visited in creation order and the first one
    /// that resolves wins.
    pub fn verify_prediction(&mut self, text: &str) -> Option<VerificationUpdate> {
        let round = extract_round_id(text)?;
        self.evict_expired(Utc::now());

        let completed = is_final(text);
        let card_count = first_segment_glyph_count(text);
        let window = self.config.verification_window;

        for prediction in self.predictions.iter_mut().filter(|p| p.status.is_pending()) {
            let Some(offset) = round.checked_sub(prediction.target_round) else {
                continue;
            };
            if offset > window {
                continue;
            }

            tracing::debug!(
                "Checking round {} against round {round}: offset {offset}, completed {completed}, cards {card_count}",
                prediction.target_round
            );

            let (status, glyph) = if completed && card_count >= MIN_LEGIBLE_CARDS {
                (PredictionStatus::Correct, success_glyph(offset))
            } else if offset == window {
                (PredictionStatus::Failed, FAILED_GLYPH.to_string())
            } else {
                continue;
            };

            let resolved = prediction
                .text
                .replace(PENDING_STATUS, &format!("statut :{glyph}"));

            prediction.status = status;
            prediction.offset = offset;
            prediction.resolved_text = Some(resolved.clone());
            prediction.resolved_at = Some(Utc::now());

            tracing::info!(
                "Prediction for round {} resolved {status:?} at offset {offset}",
                prediction.target_round
            );

            return Some(VerificationUpdate {
                predicted_round: prediction.target_round,
                verifying_round: round,
                offset,
                status,
                text: resolved,
                original_text: prediction.text.clone(),
            });
        }

        None
    }

    /// Run one inbound message through verification, then the prediction decision.
    ///
    /// At most one output is produced. A message that resolves a prediction
    /// does not also emit one, even when its segments would qualify, so in a
    /// feed where every final round confirms the previous prediction only
    /// every other round yields a new prediction. Callers that want both can
    /// call [`verify_prediction`](Self::verify_prediction) and
    /// [`should_predict`](Self::should_predict) separately.
    pub fn process(&mut self, text: &str) -> Option<EngineOutput> {
        if let Some(update) = self.verify_prediction(text) {
            return Some(EngineOutput::Resolved(update));
        }

        let decision = self.should_predict(text)?;
        let text = self.make_prediction(decision.round, decision.combination);
        Some(EngineOutput::Predicted {
            round: decision.round.saturating_add(1),
            source_round: decision.round,
            combination: decision.combination,
            text,
        })
    }

    /// All tracked predictions in creation order.
    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// The prediction targeting `round`, if any.
    pub fn prediction(&self, round: u64) -> Option<&Prediction> {
        self.predictions.iter().find(|p| p.target_round == round)
    }

    /// The latest provisional message held for `round`.
    pub fn provisional_message(&self, round: u64) -> Option<&str> {
        self.provisional.get(&round).map(|(text, _)| text.as_str())
    }

    pub fn stats(&self) -> PredictorStats {
        let count = |status: PredictionStatus| {
            self.predictions
                .iter()
                .filter(|p| p.status == status)
                .count()
        };
        PredictorStats {
            pending: count(PredictionStatus::Pending),
            correct: count(PredictionStatus::Correct),
            failed: count(PredictionStatus::Failed),
            provisional_rounds: self.provisional.len(),
            fingerprints: self.fingerprints.len(),
        }
    }

    /// Drop predictions and provisional entries older than `retention_secs`.
    fn evict_expired(&mut self, now: DateTime<Utc>) {
        let Some(retention) = self.config.retention_secs else {
            return;
        };
        let age = Duration::seconds(retention.min(MAX_RETENTION_SECS) as i64);
        let Some(cutoff) = now.checked_sub_signed(age) else {
            return;
        };

        let pending_before = self.predictions.iter().filter(|p| p.status.is_pending()).count();
        let before = self.predictions.len() + self.provisional.len();
        self.predictions.retain(|p| p.created_at >= cutoff);
        self.provisional.retain(|_, (_, seen)| *seen >= cutoff);
        let after = self.predictions.len() + self.provisional.len();

        let pending_after = self.predictions.iter().filter(|p| p.status.is_pending()).count();
        if pending_after < pending_before {
            tracing::info!(
                "Dropped {} unresolved predictions older than {retention}s",
                pending_before - pending_after
            );
        }
        if after < before {
            tracing::debug!("Evicted {} entries created before {cutoff}", before - after);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Suit, CLUB, DIAMOND, HEART, HEART_ALT, KNOWN_COMBINATIONS, SPADE};

    fn spade_heart_diamond() -> Combination {
        Combination::new(Suit::Spade, Suit::Heart, Suit::Diamond).unwrap()
    }

    fn three_suits() -> String {
        format!("{SPADE}{HEART}{DIAMOND}")
    }

    fn four_suits() -> String {
        format!("{SPADE}{HEART}{DIAMOND}{CLUB}")
    }

    #[test]
    fn test_no_round_id_is_ignored() {
        let mut engine = CardPredictor::default();
        let text = format!("\u{2705} ({})", three_suits());
        assert!(engine.should_predict(&text).is_none());
        assert!(engine.verify_prediction(&text).is_none());
        assert!(engine.process(&text).is_none());
        assert_eq!(engine.stats(), PredictorStats::default());
    }

    #[test]
    fn test_three_distinct_triggers_prediction() {
        let mut engine = CardPredictor::default();
        let text = format!("#n100 Player ({}) Banker ({SPADE})", three_suits());

        let decision = engine.should_predict(&text).unwrap();
        assert_eq!(decision.round, 100);
        assert_eq!(decision.combination, spade_heart_diamond());

        let out = engine.make_prediction(decision.round, decision.combination);
        assert!(out.contains("101"));
        assert!(out.contains(PENDING_STATUS));

        let prediction = engine.prediction(101).unwrap();
        assert_eq!(prediction.status, PredictionStatus::Pending);
        assert_eq!(prediction.source_round, 100);
        assert_eq!(prediction.offset, 0);
        assert_eq!(prediction.text, out);
    }

    #[test]
    fn test_verification_at_offset_two() {
        let mut engine = CardPredictor::default();
        let original = engine.make_prediction(100, spade_heart_diamond());

        let update = engine
            .verify_prediction(&format!("#n103 \u{2705} ({})", four_suits()))
            .unwrap();
        assert_eq!(update.predicted_round, 101);
        assert_eq!(update.verifying_round, 103);
        assert_eq!(update.offset, 2);
        assert_eq!(update.status, PredictionStatus::Correct);
        assert_eq!(update.original_text, original);
        assert!(update.text.contains(&success_glyph(2)));
        assert!(update.text.contains("\u{2705}2\u{FE0F}\u{20E3}"));
        assert!(!update.text.contains(PENDING_STATUS));

        let prediction = engine.prediction(101).unwrap();
        assert_eq!(prediction.status, PredictionStatus::Correct);
        assert_eq!(prediction.offset, 2);
        assert_eq!(prediction.resolved_text.as_deref(), Some(update.text.as_str()));
        assert!(prediction.resolved_at.is_some());
    }

    #[test]
    fn test_offset_window_boundaries() {
        let mut engine = CardPredictor::default();
        engine.make_prediction(41, spade_heart_diamond());
        assert!(engine.prediction(42).is_some());

        // Before the target and past the window never match.
        let ok = format!("\u{2705} ({})", three_suits());
        assert!(engine.verify_prediction(&format!("#n41 {ok}")).is_none());
        assert!(engine.verify_prediction(&format!("#n46 {ok}")).is_none());

        // Inside the window without a completed round, nothing happens.
        assert!(engine.verify_prediction(&format!("#n44 ({SPADE})")).is_none());
        assert_eq!(engine.prediction(42).unwrap().status, PredictionStatus::Pending);

        let update = engine.verify_prediction(&format!("#n45 {ok}")).unwrap();
        assert_eq!(update.offset, 3);
        assert!(update.text.contains(&success_glyph(3)));
    }

    #[test]
    fn test_last_attempt_fails() {
        let mut engine = CardPredictor::default();
        engine.make_prediction(41, spade_heart_diamond());

        let update = engine.verify_prediction(&format!("#n45 ({SPADE})")).unwrap();
        assert_eq!(update.status, PredictionStatus::Failed);
        assert!(update.text.contains(FAILED_GLYPH));
        assert_eq!(engine.prediction(42).unwrap().status, PredictionStatus::Failed);
    }

    #[test]
    fn test_completion_needs_three_cards() {
        let mut engine = CardPredictor::default();
        engine.make_prediction(41, spade_heart_diamond());
        let two_cards = format!("#n43 \u{2705} ({SPADE}{HEART_ALT})");
        assert!(engine.verify_prediction(&two_cards).is_none());

        let offered = format!("#n43 \u{1F530} ({SPADE}{SPADE}{SPADE})");
        let update = engine.verify_prediction(&offered).unwrap();
        assert_eq!(update.offset, 1);
    }

    #[test]
    fn test_resolved_predictions_are_not_revisited() {
        let mut engine = CardPredictor::default();
        engine.make_prediction(10, spade_heart_diamond());
        let done = format!("#n11 \u{2705} ({})", three_suits());
        assert!(engine.verify_prediction(&done).is_some());
        assert!(engine.verify_prediction(&done).is_none());
        assert!(engine.verify_prediction(&format!("#n14 ({SPADE})")).is_none());
        assert_eq!(engine.stats().correct, 1);
    }

    #[test]
    fn test_first_created_prediction_wins() {
        let mut engine = CardPredictor::default();
        engine.make_prediction(10, spade_heart_diamond());
        engine.make_prediction(11, spade_heart_diamond());

        let done = format!("#n12 \u{2705} ({})", three_suits());
        let first = engine.verify_prediction(&done).unwrap();
        assert_eq!(first.predicted_round, 11);
        assert_eq!(first.offset, 1);

        let second = engine.verify_prediction(&done).unwrap();
        assert_eq!(second.predicted_round, 12);
        assert_eq!(second.offset, 0);
    }

    #[test]
    fn test_make_prediction_overwrites_in_place() {
        let mut engine = CardPredictor::default();
        engine.make_prediction(10, spade_heart_diamond());
        engine.make_prediction(20, spade_heart_diamond());
        engine.make_prediction(10, KNOWN_COMBINATIONS[3]);

        let predictions = engine.predictions();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].target_round, 11);
        assert_eq!(predictions[0].combination, KNOWN_COMBINATIONS[3]);
    }

    #[test]
    fn test_duplicate_message_predicts_once() {
        let mut engine = CardPredictor::default();
        let text = format!("#n7 ({}) ({})", three_suits(), four_suits());
        assert!(engine.should_predict(&text).is_some());
        assert!(engine.should_predict(&text).is_none());
        assert!(engine.should_predict(&format!("{text}\n")).is_none());
        assert_eq!(engine.stats().fingerprints, 1);
    }

    #[test]
    fn test_provisional_message_never_predicts() {
        let mut engine = CardPredictor::default();
        let provisional = format!("#n100 \u{23F0} ({SPADE}) ({})", three_suits());
        assert!(engine.should_predict(&provisional).is_none());
        assert_eq!(engine.provisional_message(100), Some(provisional.as_str()));

        let last = format!("#n100 \u{23F0} ({SPADE})");
        assert!(engine.should_predict(&last).is_none());
        assert_eq!(engine.provisional_message(100), Some(last.as_str()));

        let final_text = format!("#n100 \u{2705} ({})", three_suits());
        assert!(engine.should_predict(&final_text).is_some());
        assert!(engine.provisional_message(100).is_none());
    }

    #[test]
    fn test_second_segment_fallback() {
        let mut engine = CardPredictor::default();
        let text = format!("#n7 ({SPADE}{SPADE}) ({CLUB}{HEART}{DIAMOND})");
        let decision = engine.should_predict(&text).unwrap();
        assert_eq!(decision.combination, KNOWN_COMBINATIONS[3]);
    }

    #[test]
    fn test_only_first_two_segments() {
        let mut engine = CardPredictor::default();
        let text = format!("#n7 ({SPADE}) ({HEART}) ({})", three_suits());
        assert!(engine.should_predict(&text).is_none());
        assert!(engine.should_predict("#n7 no segments").is_none());
    }

    #[test]
    fn test_strict_mode_filters_combinations() {
        let config = PredictorConfig {
            strict_combinations: true,
            known_combinations: vec![spade_heart_diamond()],
            ..Default::default()
        };
        let mut engine = CardPredictor::new(config).unwrap();

        let other = format!("#n7 ({CLUB}{HEART}{DIAMOND})");
        assert!(engine.should_predict(&other).is_none());

        let fallback = format!("#n8 ({CLUB}{HEART}{DIAMOND}) ({})", three_suits());
        let decision = engine.should_predict(&fallback).unwrap();
        assert_eq!(decision.combination, spade_heart_diamond());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PredictorConfig {
            verification_window: 12,
            ..Default::default()
        };
        assert!(CardPredictor::new(config).is_err());
    }

    #[test]
    fn test_wider_window() {
        let config = PredictorConfig {
            verification_window: 5,
            ..Default::default()
        };
        let mut engine = CardPredictor::new(config).unwrap();
        engine.make_prediction(1, spade_heart_diamond());

        assert!(engine.verify_prediction(&format!("#n6 ({SPADE})")).is_none());
        let update = engine.verify_prediction(&format!("#n7 ({SPADE})")).unwrap();
        assert_eq!(update.status, PredictionStatus::Failed);
        assert_eq!(update.offset, 5);
    }

    #[test]
    fn test_eviction_by_age() {
        let config = PredictorConfig {
            retention_secs: Some(60),
            ..Default::default()
        };
        let mut engine = CardPredictor::new(config).unwrap();
        let text = format!("#n1 ({})", three_suits());
        let decision = engine.should_predict(&text).unwrap();
        engine.make_prediction(decision.round, decision.combination);
        engine.should_predict(&format!("#n2 \u{23F0} ({SPADE})"));

        engine.evict_expired(Utc::now() + Duration::seconds(30));
        assert_eq!(engine.predictions().len(), 1);
        assert!(engine.provisional_message(2).is_some());

        engine.evict_expired(Utc::now() + Duration::seconds(61));
        assert!(engine.predictions().is_empty());
        assert!(engine.provisional_message(2).is_none());

        // The message that predicted stays suppressed after its prediction expired.
        assert_eq!(engine.stats().fingerprints, 1);
        assert!(engine.should_predict(&text).is_none());
    }

    #[test]
    fn test_no_retention_keeps_everything() {
        let config = PredictorConfig {
            retention_secs: None,
            ..Default::default()
        };
        let mut engine = CardPredictor::new(config).unwrap();
        engine.make_prediction(1, spade_heart_diamond());
        engine.evict_expired(Utc::now() + Duration::days(3650));
        assert_eq!(engine.predictions().len(), 1);
    }

    #[test]
    fn test_stray_round_keeps_pending_state() {
        let mut engine = CardPredictor::default();
        let original = format!("#n100 \u{2705} ({})", three_suits());
        assert!(matches!(
            engine.process(&original),
            Some(EngineOutput::Predicted { round: 101, .. })
        ));

        assert!(engine.process("#n100000 chatter").is_none());
        assert_eq!(engine.stats().pending, 1);

        // A late message for an earlier round is ignored.
        assert!(engine.process(&format!("#n99 \u{2705} ({SPADE})")).is_none());
        assert_eq!(engine.stats().pending, 1);

        // Re-delivery never predicts twice.
        assert!(engine.process(&original).is_none());
        assert_eq!(engine.predictions().len(), 1);

        let update = engine
            .verify_prediction(&format!("#n101 \u{2705} ({CLUB}{CLUB}{CLUB})"))
            .unwrap();
        assert_eq!(update.predicted_round, 101);
        assert_eq!(update.status, PredictionStatus::Correct);
        assert_eq!(update.offset, 0);
    }

    #[test]
    fn test_completed_but_illegible_last_attempt_fails() {
        let mut engine = CardPredictor::default();
        engine.make_prediction(41, spade_heart_diamond());

        let short = format!("#n45 \u{2705} ({SPADE}{HEART})");
        let update = engine.verify_prediction(&short).unwrap();
        assert_eq!(update.status, PredictionStatus::Failed);
        assert_eq!(update.offset, 3);
        assert!(update.text.contains(FAILED_GLYPH));
    }

    #[test]
    fn test_process_predicts_then_resolves() {
        let mut engine = CardPredictor::default();

        let predicted = engine
            .process(&format!("#n100 \u{2705} ({})", three_suits()))
            .unwrap();
        match &predicted {
            EngineOutput::Predicted {
                round,
                source_round,
                combination,
                text,
            } => {
                assert_eq!(*round, 101);
                assert_eq!(*source_round, 100);
                assert_eq!(*combination, spade_heart_diamond());
                assert_eq!(text, &format_prediction(101));
            }
            other => panic!("expected prediction, got {other:?}"),
        }

        let resolved = engine
            .process(&format!("#n101 \u{2705} ({})", three_suits()))
            .unwrap();
        match resolved {
            EngineOutput::Resolved(update) => {
                assert_eq!(update.predicted_round, 101);
                assert_eq!(update.offset, 0);
                assert_eq!(predicted.text(), update.original_text);
            }
            other => panic!("expected resolution, got {other:?}"),
        }

        let stats = engine.stats();
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.pending, 0);
    }
}
