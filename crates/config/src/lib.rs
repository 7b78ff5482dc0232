//! Environment-sourced settings for the gembot relay.
//!
//! Everything is loaded once at startup; the relay holds an immutable
//! `Settings` for the lifetime of the process.

use secrecy::{ExposeSecret, Secret};

/// Default Gemini model when `MODEL_NAME` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Default bind address for the webhook server.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default port for the webhook server.
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required environment variable is missing or empty.
    #[error("missing required environment variable: {name}")]
    MissingVar { name: &'static str },

    /// An environment variable is present but unparseable.
    #[error("invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Relay configuration, sourced from the environment.
#[derive(Clone)]
pub struct Settings {
    /// WhatsApp Graph API access token.
    pub wa_token: Secret<String>,

    /// Gemini API key.
    pub gen_api_key: Secret<String>,

    /// Sender phone number id registered with the Graph API.
    pub phone_id: String,

    /// Pre-shared webhook subscription verification token.
    pub verify_token: String,

    /// Display name of the bot's owner, interpolated into the persona seed.
    pub owner_name: String,

    /// Display name the bot introduces itself with.
    pub bot_name: String,

    /// Gemini model identifier.
    pub model_name: String,

    /// Address the webhook server binds to.
    pub bind: String,

    /// Port the webhook server listens on.
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wa_token: Secret::new(String::new()),
            gen_api_key: Secret::new(String::new()),
            phone_id: String::new(),
            verify_token: String::new(),
            owner_name: String::new(),
            bot_name: String::new(),
            model_name: DEFAULT_MODEL.into(),
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("wa_token", &"[REDACTED]")
            .field("gen_api_key", &"[REDACTED]")
            .field("phone_id", &self.phone_id)
            .field("bot_name", &self.bot_name)
            .field("model_name", &self.model_name)
            .field("bind", &self.bind)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// `WA_TOKEN`, `GEN_API`, `PHONE_ID` and `VERIFY_TOKEN` are required;
    /// the rest fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            wa_token: Secret::new(required("WA_TOKEN")?),
            gen_api_key: Secret::new(required("GEN_API")?),
            phone_id: required("PHONE_ID")?,
            verify_token: required("VERIFY_TOKEN")?,
            owner_name: optional("OWNER_NAME").unwrap_or_else(|| "the operator".into()),
            bot_name: optional("BOT_NAME").unwrap_or_else(|| "Gembot".into()),
            model_name: optional("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.into()),
            bind: optional("GEMBOT_BIND").unwrap_or_else(|| DEFAULT_BIND.into()),
            port: match optional("GEMBOT_PORT") {
                Some(raw) => raw.parse().map_err(|e| Error::InvalidVar {
                    name: "GEMBOT_PORT",
                    message: format!("{e}"),
                })?,
                None => DEFAULT_PORT,
            },
        };

        tracing::debug!(
            phone_id = %settings.phone_id,
            model = %settings.model_name,
            "settings loaded from environment"
        );
        Ok(settings)
    }

    /// Expose the Graph API token for `Authorization: Bearer` headers.
    pub fn wa_token(&self) -> &str {
        self.wa_token.expose_secret()
    }

    /// Expose the Gemini API key for the `key` query parameter.
    pub fn gen_api_key(&self) -> &str {
        self.gen_api_key.expose_secret()
    }
}

fn required(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MissingVar { name }),
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
