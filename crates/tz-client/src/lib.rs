//! HTTP client for the Tokenizors API.
//!
//! Carries the session cookie, attaches CSRF tokens to POSTs and maps every
//! failure to a [`ClientError`] with a [`FailureKind`].

pub mod error;

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use tz_core::{
    CsrfTokenResponse, EncodingsResponse, ErrorEnvelope, HealthResponse, MinificationRequest, MinificationResult,
    TokenizationRequest, TokenizationResult,
};

pub use error::{ClientError, FailureKind, Result, NO_RESPONSE};

const TEXT_REQUIRED: &str = "Please enter text to calculate tokens.";
const CODE_REQUIRED: &str = "Please enter code to minify.";
const CSS_REQUIRED: &str = "Please enter CSS code to minify.";
const TYPESCRIPT_REQUIRED: &str = "Please enter TypeScript code to minify.";
const INVALID_CSRF: &str = "Invalid CSRF token";
/// Pretrained tokenizer the web UI counts with.
pub const DEFAULT_HF_MODEL: &str = "Xenova/llama-tokenizer";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Fetch and send CSRF tokens on POST.
    pub csrf: bool,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".into(),
            csrf: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn with_csrf(mut self, csrf: bool) -> Self {
        self.csrf = csrf;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    csrf_token: Mutex<Option<String>>,
}

impl ApiClient {
    /// Fails locally when the base URL does not parse or the HTTP client
    /// cannot be built; nothing is sent.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ClientError::Unexpected(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Unexpected(e.to_string()))?;
        Ok(Self { http, config, csrf_token: Mutex::new(None) })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ---- Tokenization ----

    pub async fn calculate_openai_tokens(&self, text: &str, model: Option<&str>) -> Result<TokenizationResult> {
        require(text, TEXT_REQUIRED)?;
        let body = TokenizationRequest::encoder(text, model.map(String::from));
        self.post("/api/tokenize/openai", &body).await
    }

    pub async fn calculate_hf_tokens(&self, text: &str, model_name: &str) -> Result<TokenizationResult> {
        require(text, TEXT_REQUIRED)?;
        let body = TokenizationRequest::pretrained(text, model_name);
        self.post("/api/tokenize/hf", &body).await
    }

    // ---- Minification ----

    pub async fn minify_remove_spaces(&self, code: &str) -> Result<MinificationResult> {
        require(code, CODE_REQUIRED)?;
        self.post("/api/minify/remove-spaces", &MinificationRequest::new(code)).await
    }

    pub async fn minify_remove_spaces_and_comments(&self, code: &str) -> Result<MinificationResult> {
        require(code, CODE_REQUIRED)?;
        self.post("/api/minify/remove-spaces-and-comments", &MinificationRequest::new(code)).await
    }

    pub async fn minify_rewrite_javascript(&self, code: &str) -> Result<MinificationResult> {
        require(code, CODE_REQUIRED)?;
        self.post("/api/minify/rewrite-javascript", &MinificationRequest::new(code)).await
    }

    pub async fn minify_typescript(&self, code: &str) -> Result<MinificationResult> {
        require(code, TYPESCRIPT_REQUIRED)?;
        self.post("/api/minify/typescript", &MinificationRequest::new(code)).await
    }

    pub async fn minify_css(&self, code: &str) -> Result<MinificationResult> {
        require(code, CSS_REQUIRED)?;
        self.post("/api/minify/css", &MinificationRequest::new(code)).await
    }

    // ---- Session and service info ----

    /// Requests a fresh CSRF token and remembers it for later POSTs.
    pub async fn fetch_csrf_token(&self) -> Result<String> {
        let token = self.request_csrf_token().await?;
        *self.csrf_token.lock().await = Some(token.clone());
        Ok(token)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/api/health").await
    }

    pub async fn encodings(&self) -> Result<EncodingsResponse> {
        self.get("/api/encodings").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn request_csrf_token(&self) -> Result<String> {
        let response: CsrfTokenResponse = self.get("/api/csrf-token").await?;
        Ok(response.csrf_token)
    }

    async fn current_csrf_token(&self) -> Result<String> {
        let mut slot = self.csrf_token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }
        let token = self.request_csrf_token().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self.http.get(self.url(path)).send().await.map_err(ClientError::Transport)?;
        decode(response).await
    }

    /// POSTs `body`; a rejected CSRF token is refreshed and the request retried once.
    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        if !self.config.csrf {
            return self.send_post(path, body, None).await;
        }

        let token = self.current_csrf_token().await?;
        match self.send_post(path, body, Some(&token)).await {
            Err(ClientError::Server { status: 403, ref message, .. }) if message == INVALID_CSRF => {
                warn!(path, "CSRF token rejected; refreshing");
                let token = self.fetch_csrf_token().await?;
                self.send_post(path, body, Some(&token)).await
            }
            other => other,
        }
    }

    async fn send_post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        csrf_token: Option<&str>,
    ) -> Result<T> {
        debug!(path, csrf = csrf_token.is_some(), "POST");
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = csrf_token {
            request = request.header("x-csrf-token", token);
        }
        let response = request.send().await.map_err(ClientError::Transport)?;
        decode(response).await
    }
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        Err(ClientError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ClientError::Transport)?;

    if status.is_success() {
        return serde_json::from_slice(&bytes).map_err(|e| ClientError::Unexpected(e.to_string()));
    }

    match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
        Ok(envelope) => Err(ClientError::Server {
            status: status.as_u16(),
            message: envelope.error,
            details: envelope.details,
        }),
        Err(_) => Err(ClientError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests;
