//! Webhook payload types for the WhatsApp Business Cloud API.
//!
//! Only the fields the relay actually reads are modeled; everything else in
//! the payload is ignored by serde.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// One inbound message as delivered by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub from: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<TextBody>,
    pub audio: Option<MediaRef>,
    pub image: Option<MediaRef>,
    pub document: Option<MediaRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Opaque reference the platform uses to fetch a short-lived download URL.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaRef {
    pub id: String,
}

/// What the relay does with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Plain text body.
    Text(String),
    /// Voice note; carries the media reference id.
    Audio(String),
    /// Photo; carries the media reference id.
    Image(String),
    /// Attachment, treated as PDF; carries the media reference id.
    Document(String),
    /// Anything the relay does not handle (location, contacts, stickers, …).
    Unsupported(String),
}

/// A webhook event reduced to what the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: String,
    pub kind: MessageKind,
}

impl WebhookPayload {
    /// Extract the first message of the first change of the first entry.
    ///
    /// The platform batches deliveries, but this relay mirrors the one-event-
    /// per-callback contract: anything beyond the first message is ignored.
    pub fn first_message(&self) -> Result<InboundMessage> {
        let message = self
            .entry
            .first()
            .and_then(|e| e.changes.first())
            .and_then(|c| c.value.messages.first())
            .ok_or_else(|| Error::malformed("no message in entry[0].changes[0].value"))?;

        let kind = match message.message_type.as_str() {
            "text" => {
                let body = message
                    .text
                    .as_ref()
                    .ok_or_else(|| Error::malformed("text message without text body"))?;
                MessageKind::Text(body.body.clone())
            },
            "audio" => MessageKind::Audio(media_id(&message.audio, "audio")?),
            "image" => MessageKind::Image(media_id(&message.image, "image")?),
            "document" => MessageKind::Document(media_id(&message.document, "document")?),
            other => MessageKind::Unsupported(other.to_string()),
        };

        Ok(InboundMessage {
            sender_id: message.from.clone(),
            kind,
        })
    }
}

fn media_id(media: &Option<MediaRef>, kind: &str) -> Result<String> {
    media
        .as_ref()
        .map(|m| m.id.clone())
        .ok_or_else(|| Error::malformed(format!("{kind} message without media reference")))
}
