use thiserror::Error;
use tz_core::ErrorEnvelope;

pub const NO_RESPONSE: &str = "No response from server. Please check your connection and try again.";

/// Coarse failure classes a UI renders differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with an error status.
    Server,
    /// No response arrived.
    Transport,
    /// Rejected or failed before or after the exchange, on this side.
    Local,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{}", server_message(.message, .details))]
    Server { status: u16, message: String, details: Option<String> },
    /// Error status without a JSON envelope.
    #[error("HTTP error! Status: {status}, Message: {reason}")]
    Http { status: u16, reason: String },
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Server { .. } | ClientError::Http { .. } => FailureKind::Server,
            ClientError::Transport(_) => FailureKind::Transport,
            ClientError::Validation(_) | ClientError::Unexpected(_) => FailureKind::Local,
        }
    }

    /// HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } | ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Transport(_) => NO_RESPONSE.to_string(),
            other => other.to_string(),
        }
    }
}

fn server_message(message: &str, details: &Option<String>) -> String {
    ErrorEnvelope { error: message.to_string(), details: details.clone() }.message()
}

pub type Result<T> = std::result::Result<T, ClientError>;
