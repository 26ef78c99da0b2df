//! JSON error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;
use tz_core::ErrorEnvelope;
use tz_minifier::MinifyError;
use tz_tokenizer::TokenizeError;

pub const OPENAI_FAILED: &str = "Failed to tokenize text for OpenAI.";
pub const HF_FAILED: &str = "Failed to tokenize text for Hugging Face.";
pub const JAVASCRIPT_FAILED: &str = "Failed to minify JavaScript.";
pub const TYPESCRIPT_FAILED: &str = "Failed to minify TypeScript.";
pub const CSS_FAILED: &str = "Failed to minify CSS.";

/// Adapter errors that know whether the caller's input caused them.
pub trait AdapterError: std::error::Error {
    fn is_input_error(&self) -> bool;
}

impl AdapterError for TokenizeError {
    fn is_input_error(&self) -> bool {
        TokenizeError::is_input_error(self)
    }
}

impl AdapterError for MinifyError {
    fn is_input_error(&self) -> bool {
        MinifyError::is_input_error(self)
    }
}

/// API error with status code, message and optional details.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: msg.into(), details: None }
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::FORBIDDEN, message: msg.into(), details: None }
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: msg.into(), details: None }
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: msg.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Input errors become 400 with the adapter message as details.
    /// Anything else is logged and becomes a bare 500.
    pub fn failed(operation: &'static str, err: impl AdapterError) -> Self {
        if err.is_input_error() {
            Self::bad_request(operation).with_details(err.to_string())
        } else {
            error!(operation, error = %err, "Adapter failure");
            Self::internal(operation)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}
