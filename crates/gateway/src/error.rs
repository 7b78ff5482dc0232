//! Typed per-stage relay errors.
//!
//! Every stage failure is logged with its stage name and swallowed at the
//! HTTP boundary: the webhook transport treats non-2xx as "retry the
//! delivery", so the handler always acknowledges with 200.

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The webhook payload did not contain an extractable message.
    #[error("payload parse failed: {0}")]
    Parse(#[source] gembot_whatsapp::Error),

    /// Media metadata fetch or binary download failed.
    #[error("media fetch failed: {0}")]
    MediaFetch(#[source] gembot_whatsapp::Error),

    /// PDF could not be opened or rendered.
    #[error("rasterize failed: {0}")]
    Rasterize(#[source] gembot_media::Error),

    /// Scratch file write/read failed.
    #[error("scratch io failed: {0}")]
    Scratch(#[source] gembot_media::Error),

    /// Gemini upload, description or chat call failed.
    #[error("model call failed: {0}")]
    Model(#[source] gembot_gemini::Error),

    /// Outbound WhatsApp send failed.
    #[error("send failed: {0}")]
    Send(#[source] gembot_whatsapp::Error),
}

impl RelayError {
    /// Stage label for structured logging.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::MediaFetch(_) => "media_fetch",
            Self::Rasterize(_) => "rasterize",
            Self::Scratch(_) => "scratch",
            Self::Model(_) => "model",
            Self::Send(_) => "send",
        }
    }
}
