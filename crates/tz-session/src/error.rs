use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No CSRF token on request")]
    MissingToken,
    #[error("CSRF token does not match session")]
    TokenMismatch,
    #[error("Malformed CSRF token")]
    MalformedToken,
}

pub type Result<T> = std::result::Result<T, SessionError>;
