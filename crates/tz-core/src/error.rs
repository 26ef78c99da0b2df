use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {key}={value}: {reason}")]
    InvalidConfig { key: String, value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
