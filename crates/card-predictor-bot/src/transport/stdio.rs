//! Stdio transport. Reads chat updates from stdin, writes outbound messages to stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::UpdateHandler;
use crate::types::BotResult;

use super::framing;

/// Counters for one transport run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportSummary {
    pub lines: u64,
    pub skipped: u64,
    pub sent: u64,
}

/// Stdio transport fed by an upstream webhook receiver or a recorded feed.
pub struct StdioTransport {
    handler: UpdateHandler,
}

impl StdioTransport {
    pub fn new(handler: UpdateHandler) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &UpdateHandler {
        &self.handler
    }

    /// Run the transport loop on the process's stdin and stdout.
    pub async fn run(&self) -> BotResult<TransportSummary> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Run the transport loop until `reader` reaches EOF.
    ///
    /// Malformed lines and lines the handler rejects are logged and skipped;
    /// only I/O errors end the loop.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> BotResult<TransportSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = TransportSummary::default();
        let mut line = Vec::new();
        let mut out = Vec::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_until(b'\n', &mut line).await?;

            if bytes_read == 0 {
                tracing::info!("EOF on input, shutting down");
                break;
            }

            let update = match framing::decode_line(&line) {
                Ok(Some(update)) => {
                    summary.lines += 1;
                    update
                }
                Ok(None) => continue,
                Err(e) => {
                    summary.lines += 1;
                    summary.skipped += 1;
                    tracing::warn!("Skipping line {}: {e}", summary.lines);
                    continue;
                }
            };

            match self.handler.handle_update(update).await {
                Ok(Some(outbound)) => {
                    out.clear();
                    framing::encode_outbound(&outbound, &mut out)?;
                    writer.write_all(&out).await?;
                    writer.flush().await?;
                    summary.sent += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to handle line {}: {e}", summary.lines);
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }
}
