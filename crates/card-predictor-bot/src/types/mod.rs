//! Inbound, outbound, and error types for the relay.

pub mod error;
pub mod outbound;
pub mod update;

pub use error::*;
pub use outbound::*;
pub use update::*;
