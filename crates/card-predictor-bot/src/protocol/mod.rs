//! Update handling.

pub mod handler;

pub use handler::UpdateHandler;
