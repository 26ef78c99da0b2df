use thiserror::Error;

use crate::detect::SourceLanguage;

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("{language} syntax error: {message}")]
    Syntax { language: SourceLanguage, message: String },
    #[error("Transpile error: {0}")]
    Transform(String),
    #[error("CSS error: {0}")]
    Css(String),
    #[error("Invalid ECMAScript target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },
    #[error("Minifier worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl MinifyError {
    /// True when the submitted source was rejected.
    pub fn is_input_error(&self) -> bool {
        matches!(self, MinifyError::Syntax { .. } | MinifyError::Transform(_) | MinifyError::Css(_))
    }
}

pub type Result<T> = std::result::Result<T, MinifyError>;
