use thiserror::Error;

/// Errors surfaced by the battle controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with an error status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The server no longer accepts our token
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// The response body could not be understood
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The controller was torn down
    #[error("Battle view was closed")]
    TornDown,

    #[error("No battle in progress")]
    NoBattle,
}

impl ClientError {
    /// Message shown to the player
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
