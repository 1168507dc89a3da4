//! Per-chat session management.

pub mod manager;
pub mod registry;

pub use manager::{ChatSession, SessionReport};
pub use registry::ChatRegistry;
