//! Token counting over built-in BPE encodings and pretrained hub tokenizers.

pub mod encoding;
pub mod error;
pub mod pretrained;

use std::sync::Arc;

use tz_core::config::TokenizerConfig;
use tz_core::TokenizationResult;

pub use encoding::{EncoderRegistry, SUPPORTED_ENCODINGS};
pub use error::{Result, TokenizeError};
pub use pretrained::{HubLoaderInit, LoaderInit, PretrainedCounter, PretrainedLoader, PretrainedTokenizer};

/// Entry point used by the dispatcher for both token counting paths.
pub struct TokenizerAdapter {
    encoders: Arc<EncoderRegistry>,
    pretrained: PretrainedCounter,
}

impl TokenizerAdapter {
    pub fn new(config: &TokenizerConfig) -> Self {
        let init = HubLoaderInit::new(config.hf_revision.clone(), config.hf_token.clone());
        Self::with_loader_init(config, Arc::new(init))
    }

    /// Same as [`TokenizerAdapter::new`] with a custom pretrained loader.
    pub fn with_loader_init(config: &TokenizerConfig, init: Arc<dyn LoaderInit>) -> Self {
        Self {
            encoders: Arc::new(EncoderRegistry::new(config.default_encoding.clone())),
            pretrained: PretrainedCounter::new(init),
        }
    }

    pub fn default_encoding(&self) -> &str {
        self.encoders.default_encoding()
    }

    pub fn encodings(&self) -> &'static [&'static str] {
        SUPPORTED_ENCODINGS
    }

    pub fn pretrained(&self) -> &PretrainedCounter {
        &self.pretrained
    }

    /// Counts tokens with a named encoding (`None` or blank selects the default).
    pub async fn count_encoded(&self, text: String, encoding: Option<String>) -> Result<TokenizationResult> {
        let encoders = self.encoders.clone();
        let token_count = tokio::task::spawn_blocking(move || encoders.count(&text, encoding.as_deref())).await??;
        Ok(TokenizationResult { token_count })
    }

    /// Counts input ids produced by the pretrained tokenizer `model_name`.
    pub async fn count_pretrained(&self, text: String, model_name: &str) -> Result<TokenizationResult> {
        let token_count = self.pretrained.count(text, model_name).await?;
        Ok(TokenizationResult { token_count })
    }
}

#[cfg(test)]
mod tests;
