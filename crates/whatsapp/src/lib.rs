//! WhatsApp Business Cloud API integration.
//!
//! Webhook payload types and extraction, subscription verification, and a
//! thin Graph API client for outbound sends and media retrieval.

pub mod client;
pub mod error;
pub mod types;
pub mod webhook;

pub use {
    client::{DEFAULT_GRAPH_BASE, WhatsAppClient},
    error::{Error, Result},
    types::{InboundMessage, MessageKind, WebhookPayload},
    webhook::verify_subscription,
};
