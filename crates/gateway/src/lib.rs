//! Webhook gateway: HTTP surface and the relay pipeline.

pub mod error;
pub mod relay;
pub mod server;
pub mod state;

pub use {
    error::RelayError,
    relay::{IngestStatus, UNSUPPORTED_NOTICE},
    server::{build_app, start},
    state::AppState,
};
