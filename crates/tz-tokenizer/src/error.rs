use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenizeError {
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
    #[error("Failed to build encoding {name}: {reason}")]
    EncoderInit { name: String, reason: String },
    #[error("Failed to initialize tokenizer loader: {0}")]
    LoaderInit(String),
    #[error("Failed to load tokenizer {model}: {reason}")]
    PretrainedLoad { model: String, reason: String },
    #[error("Failed to encode text: {0}")]
    Encode(String),
    #[error("Tokenizer worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl TokenizeError {
    /// True when the request content itself was rejected.
    pub fn is_input_error(&self) -> bool {
        matches!(self, TokenizeError::UnknownEncoding(_))
    }
}

pub type Result<T> = std::result::Result<T, TokenizeError>;
