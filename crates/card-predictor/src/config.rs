//! Predictor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Combination, PredictorError, PredictorResult, KNOWN_COMBINATIONS};

/// Default number of rounds after the target in which a prediction can resolve.
pub const DEFAULT_VERIFICATION_WINDOW: u64 = 3;

/// Largest window that still has a single keycap digit per offset.
pub const MAX_VERIFICATION_WINDOW: u64 = 9;

/// Default age, in seconds, after which predictions and provisional entries are evicted.
pub const DEFAULT_RETENTION_SECS: u64 = 24 * 60 * 60;

/// Upper bound on the retention age (one year).
pub const MAX_RETENTION_SECS: u64 = 365 * 24 * 60 * 60;

/// Tunables for a [`CardPredictor`](crate::CardPredictor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Only trigger on combinations listed in `known_combinations`.
    pub strict_combinations: bool,
    pub known_combinations: Vec<Combination>,
    /// Largest offset at which a pending prediction may still resolve.
    pub verification_window: u64,
    /// Age in seconds after which predictions and provisional entries are
    /// dropped. `None` keeps everything for the lifetime of the engine.
    /// Message fingerprints are never evicted.
    pub retention_secs: Option<u64>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            strict_combinations: false,
            known_combinations: KNOWN_COMBINATIONS.to_vec(),
            verification_window: DEFAULT_VERIFICATION_WINDOW,
            retention_secs: Some(DEFAULT_RETENTION_SECS),
        }
    }
}

impl PredictorConfig {
    /// Parse a JSON configuration document. Missing fields take defaults.
    pub fn from_json(json: &str) -> PredictorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> PredictorResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PredictorError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> PredictorResult<()> {
        if self.verification_window > MAX_VERIFICATION_WINDOW {
            return Err(PredictorError::InvalidConfig(format!(
                "verification_window {} exceeds {MAX_VERIFICATION_WINDOW}",
                self.verification_window
            )));
        }

        if let Some(retention) = self.retention_secs {
            if retention == 0 || retention > MAX_RETENTION_SECS {
                return Err(PredictorError::InvalidConfig(format!(
                    "retention_secs {retention} must be between 1 and {MAX_RETENTION_SECS}"
                )));
            }
        }

        if self.strict_combinations && self.known_combinations.is_empty() {
            return Err(PredictorError::InvalidConfig(
                "strict_combinations requires at least one known combination".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a combination may trigger a prediction under this configuration.
    pub fn accepts(&self, combination: &Combination) -> bool {
        !self.strict_combinations || self.known_combinations.contains(combination)
    }
}
