//! Transport layer for chat updates.

pub mod framing;
pub mod stdio;

pub use stdio::{StdioTransport, TransportSummary};
