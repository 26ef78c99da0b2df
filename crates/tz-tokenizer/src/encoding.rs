//! Built-in BPE encoding tables.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::error::{Result, TokenizeError};

/// Encoding names accepted by [`EncoderRegistry`].
pub const SUPPORTED_ENCODINGS: &[&str] = &[
    "cl100k_base",
    "o200k_base",
    "p50k_base",
    "p50k_edit",
    "r50k_base",
    "gpt2",
];

fn build_encoding(name: &str) -> Result<CoreBPE> {
    let built = match name {
        "cl100k_base" => tiktoken_rs::cl100k_base(),
        "o200k_base" => tiktoken_rs::o200k_base(),
        "p50k_base" => tiktoken_rs::p50k_base(),
        "p50k_edit" => tiktoken_rs::p50k_edit(),
        "r50k_base" | "gpt2" => tiktoken_rs::r50k_base(),
        other => return Err(TokenizeError::UnknownEncoding(other.to_string())),
    };
    built.map_err(|e| TokenizeError::EncoderInit { name: name.to_string(), reason: e.to_string() })
}

/// Lazily built, shared encoding tables keyed by name.
pub struct EncoderRegistry {
    cache: RwLock<HashMap<String, Arc<CoreBPE>>>,
    default_encoding: String,
}

impl EncoderRegistry {
    pub fn new(default_encoding: impl Into<String>) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            default_encoding: default_encoding.into(),
        }
    }

    pub fn default_encoding(&self) -> &str {
        &self.default_encoding
    }

    /// Blank or missing names fall back to the default encoding.
    pub fn resolve<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.default_encoding,
        }
    }

    pub fn get(&self, requested: Option<&str>) -> Result<Arc<CoreBPE>> {
        let name = self.resolve(requested);
        if !SUPPORTED_ENCODINGS.contains(&name) {
            return Err(TokenizeError::UnknownEncoding(name.to_string()));
        }

        if let Some(bpe) = self.cache.read().get(name) {
            return Ok(bpe.clone());
        }

        debug!(encoding = name, "Building encoding table");
        let bpe = Arc::new(build_encoding(name)?);
        let mut cache = self.cache.write();
        Ok(cache.entry(name.to_string()).or_insert(bpe).clone())
    }

    /// Number of tokens `text` encodes to. Special-token text counts as one token.
    pub fn count(&self, text: &str, requested: Option<&str>) -> Result<usize> {
        let bpe = self.get(requested)?;
        Ok(bpe.encode_with_special_tokens(text).len())
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::new(tz_core::DEFAULT_ENCODING)
    }
}
