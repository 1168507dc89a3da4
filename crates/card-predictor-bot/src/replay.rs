//! Replay a recorded feed, one message text per line, through a single engine.

use std::io::{BufRead, Write};

use serde::Serialize;

use card_predictor::{CardPredictor, PredictorConfig, PredictorStats};

use crate::types::BotResult;

/// Totals for one replay run.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub messages: u64,
    pub predictions: u64,
    pub resolutions: u64,
    pub stats: PredictorStats,
}

/// Feed each non-empty line of `reader` to a fresh engine and write every
/// output text to `writer`, one per line.
pub fn replay<R: BufRead, W: Write>(
    config: &PredictorConfig,
    reader: R,
    mut writer: W,
) -> BotResult<ReplaySummary> {
    let mut predictor = CardPredictor::new(config.clone())?;
    let mut messages = 0;
    let mut predictions = 0;
    let mut resolutions = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        messages += 1;

        let Some(output) = predictor.process(&line) else {
            continue;
        };
        match output {
            card_predictor::EngineOutput::Predicted { .. } => predictions += 1,
            card_predictor::EngineOutput::Resolved(_) => resolutions += 1,
        }
        writeln!(writer, "{}", output.text())?;
    }

    Ok(ReplaySummary {
        messages,
        predictions,
        resolutions,
        stats: predictor.stats(),
    })
}
