//! UI-agnostic application state types
//!
//! These are shared by anything that drives a [`ChatView`](crate::ChatView)
//! and don't depend on any specific UI framework.

use serde::{Deserialize, Serialize};

/// Who produced a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

/// One turn in the conversation. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
        }
    }
}

/// Pre-chat upload prompt vs. active chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiPhase {
    #[default]
    Idle,
    Active,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub in_flight: bool,
    pub last_error: Option<String>,
}

/// Emitted after every transition that touches the conversation, the
/// loading flag, or the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEvent {
    ConversationChanged,
    LoadingChanged,
    PhaseChanged,
}
