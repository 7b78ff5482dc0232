//! Per-user conversation sessions.
//!
//! A `Session` is the rolling history fed to the model on every turn. The
//! store trait exists so the in-memory map used here can later be swapped
//! for a shared external store without touching the relay pipeline.

pub mod store;

use serde::{Deserialize, Serialize};

pub use store::{MemorySessionStore, SessionStore};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

/// One entry in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// One user's ongoing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub history: Vec<Turn>,
}

impl Session {
    /// Create a session seeded with the persona turn.
    ///
    /// The seed is local context only: it never triggers a model round trip
    /// and is never shown to the user.
    pub fn seeded(user_id: impl Into<String>, persona: &str) -> Self {
        Self {
            user_id: user_id.into(),
            history: vec![Turn::user(persona)],
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(Turn::user(text));
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.history.push(Turn::model(text));
    }

    /// Number of turns, including the persona seed.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Build the persona seed instruction for a new session.
///
/// The wording asks the model not to reply to the seed itself, so the first
/// user-visible reply always corresponds to a real inbound message.
pub fn persona_seed(bot_name: &str, owner_name: &str) -> String {
    format!(
        "I am using the Gemini API to run a personal WhatsApp assistant. \
         From now on you are \"{bot_name}\", created by {owner_name}. \
         Do not give any response to this prompt; it is a pre-prompt that \
         establishes your identity and is sent every time this bot starts. \
         Reply only to the prompts after this one. Remember your new \
         identity is {bot_name}."
    )
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_session_starts_with_persona_turn() {
        let session = Session::seeded("15550001111", &persona_seed("Gembot", "Alex"));
        assert_eq!(session.len(), 1);
        assert_eq!(session.history[0].role, Role::User);
        assert!(session.history[0].text.contains("Gembot"));
        assert!(session.history[0].text.contains("Alex"));
    }

    #[test]
    fn turns_accumulate_in_order() {
        let mut session = Session::seeded("u1", "seed");
        session.push_user("hello");
        session.push_model("hi there");
        session.push_user("how are you?");

        let roles: Vec<Role> = session.history.iter().map(|t| t.role).collect();
        assert_eq!(roles, [Role::User, Role::User, Role::Model, Role::User]);
        assert_eq!(session.history[2].text, "hi there");
    }
}
