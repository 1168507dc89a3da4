//! Line codec: raw stdin lines in, newline-terminated outbound records out.

use crate::types::{BotError, BotResult, OutboundMessage, Update};

/// Decode one raw input line. Blank lines decode to `Ok(None)`.
pub fn decode_line(raw: &[u8]) -> BotResult<Option<Update>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| BotError::ParseError(format!("line is not UTF-8: {e}")))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| BotError::ParseError(e.to_string()))
}

/// Append `message` as one JSON line to `buf`.
pub fn encode_outbound(message: &OutboundMessage, buf: &mut Vec<u8>) -> BotResult<()> {
    serde_json::to_writer(&mut *buf, message)?;
    buf.push(b'\n');
    Ok(())
}
