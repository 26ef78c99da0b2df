//! JSON bodies exchanged between the client gateway and the dispatcher.
//!
//! Request fields are optional on the wire so that a missing field reaches
//! validation and produces an [`ErrorEnvelope`] instead of a decode failure.

use serde::{Deserialize, Serialize};

/// Default encoding used when a tokenization request names none.
pub const DEFAULT_ENCODING: &str = "cl100k_base";

/// Returns the value when it is present and non-empty.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Encoding table name for the encoder path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Pretrained tokenizer id for the Hugging Face path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl TokenizationRequest {
    pub fn encoder(text: impl Into<String>, model: Option<String>) -> Self {
        Self { text: Some(text.into()), model, model_name: None }
    }

    pub fn pretrained(text: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self { text: Some(text.into()), model: None, model_name: Some(model_name.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizationResult {
    pub token_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl MinificationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: Some(code.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinificationResult {
    pub minified_code: String,
}

impl MinificationResult {
    pub fn new(minified_code: impl Into<String>) -> Self {
        Self { minified_code: minified_code.into() }
    }
}

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// `error` and `details` joined for display.
    pub fn message(&self) -> String {
        match &self.details {
            Some(d) => format!("{} ({})", self.error, d),
            None => self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingsResponse {
    pub encodings: Vec<String>,
    pub default: String,
}
