use thiserror::Error;

/// Everything that can go wrong while asking the Q&A backend a question.
///
/// `Display` is the user-facing failure description that ends up inside the
/// apology message and in `RequestState::last_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AskError {
    /// The request never completed (backend unreachable, connection reset, ...)
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("API error: {0}")]
    Status(String),

    /// The body was not the JSON we expected
    #[error("{0}")]
    Malformed(String),

    /// The background request task ended without a result
    #[error("request interrupted: {0}")]
    Interrupted(String),
}

impl AskError {
    pub fn kind(&self) -> &'static str {
        match self {
            AskError::Transport(_) => "transport",
            AskError::Status(_) => "status",
            AskError::Malformed(_) => "malformed",
            AskError::Interrupted(_) => "interrupted",
        }
    }
}
