//! Card Predictor relay: feeds chat updates to per-chat prediction engines and
//! emits the messages to deliver back.

pub mod config;
pub mod protocol;
pub mod replay;
pub mod session;
pub mod transport;
pub mod types;

pub use config::{resolve_settings, BotSettings, SettingsOverrides};
pub use protocol::UpdateHandler;
pub use session::{ChatRegistry, ChatSession, SessionReport};
pub use transport::StdioTransport;
