//! Gemini generative-language API client.
//!
//! Covers the three surfaces the relay needs: multi-turn content generation,
//! the file store (upload/list/delete), and one-shot media description.

pub mod client;
pub mod error;
pub mod types;

pub use {
    client::{DEFAULT_API_BASE, GeminiClient},
    error::{Error, Result},
    types::FileInfo,
};
