//! Configuration loading and resolution.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use card_predictor::PredictorConfig;

use crate::types::{BotError, BotResult};

/// Path to a JSON predictor configuration file.
pub const CONFIG_ENV: &str = "CARD_PREDICTOR_CONFIG";
/// `true`/`1`/`yes` enables strict combination matching.
pub const STRICT_ENV: &str = "CARD_PREDICTOR_STRICT";
/// Verification window in rounds.
pub const WINDOW_ENV: &str = "CARD_PREDICTOR_WINDOW";
/// Retention age in seconds, or `none` to keep everything.
pub const RETENTION_ENV: &str = "CARD_PREDICTOR_RETENTION";

const DEFAULT_CONFIG_FILE: &str = "card-predictor.json";

/// Effective relay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub predictor: PredictorConfig,
    /// Also run private chats through the engine.
    pub include_private: bool,
    /// Run edited messages through the engine. The feed edits provisional
    /// round messages into final ones, so this is on by default.
    pub process_edits: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            predictor: PredictorConfig::default(),
            include_private: false,
            process_edits: true,
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_path: Option<PathBuf>,
    pub strict: Option<bool>,
    pub verification_window: Option<u64>,
    pub retention_secs: Option<Option<u64>>,
    pub include_private: Option<bool>,
    pub process_edits: Option<bool>,
}

/// `card-predictor.json` in the working directory, when present.
fn default_config_file() -> Option<PathBuf> {
    let cwd_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    cwd_config.exists().then_some(cwd_config)
}

/// Build settings from defaults, the config file, the environment, then CLI overrides.
pub fn resolve_settings(overrides: &SettingsOverrides) -> BotResult<BotSettings> {
    resolve_settings_with(overrides, |key| std::env::var(key).ok())
}

/// Same as [`resolve_settings`] with an explicit environment lookup.
pub fn resolve_settings_with(
    overrides: &SettingsOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> BotResult<BotSettings> {
    let mut settings = BotSettings::default();

    let config_path = overrides
        .config_path
        .clone()
        .or_else(|| env(CONFIG_ENV).map(PathBuf::from))
        .or_else(default_config_file);
    if let Some(path) = config_path {
        tracing::info!("Loading predictor config: {}", path.display());
        settings.predictor = PredictorConfig::load(&path)?;
    }

    apply_env(&mut settings.predictor, &env)?;

    if let Some(strict) = overrides.strict {
        settings.predictor.strict_combinations = strict;
    }
    if let Some(window) = overrides.verification_window {
        settings.predictor.verification_window = window;
    }
    if let Some(retention) = overrides.retention_secs {
        settings.predictor.retention_secs = retention;
    }
    if let Some(include_private) = overrides.include_private {
        settings.include_private = include_private;
    }
    if let Some(process_edits) = overrides.process_edits {
        settings.process_edits = process_edits;
    }

    settings.predictor.validate()?;
    Ok(settings)
}

fn apply_env(config: &mut PredictorConfig, env: &impl Fn(&str) -> Option<String>) -> BotResult<()> {
    if let Some(value) = env(STRICT_ENV) {
        config.strict_combinations = parse_flag(STRICT_ENV, &value)?;
    }
    if let Some(value) = env(WINDOW_ENV) {
        config.verification_window = parse_number(WINDOW_ENV, &value)?;
    }
    if let Some(value) = env(RETENTION_ENV) {
        config.retention_secs = match value.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => None,
            _ => Some(parse_number(RETENTION_ENV, &value)?),
        };
    }
    Ok(())
}

fn parse_flag(key: &str, value: &str) -> BotResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(BotError::Config(format!("{key}: expected a boolean, got '{other}'"))),
    }
}

fn parse_number(key: &str, value: &str) -> BotResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| BotError::Config(format!("{key}: invalid number '{value}': {e}")))
}
