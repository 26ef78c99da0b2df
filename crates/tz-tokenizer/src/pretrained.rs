//! Pretrained tokenizers fetched by model id.
//!
//! The loader is created on first use and shared for the life of the
//! process. Concurrent first callers wait on the same initialization; a
//! failed initialization leaves the cell empty so the next call retries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokenizers::{FromPretrainedParameters, Tokenizer};
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::{Result, TokenizeError};

/// A loaded tokenizer that can count input ids.
pub trait PretrainedTokenizer: Send + Sync {
    fn count(&self, text: &str) -> Result<usize>;
}

/// Fetches tokenizers by model id.
#[async_trait]
pub trait PretrainedLoader: Send + Sync {
    async fn load(&self, model_name: &str) -> Result<Arc<dyn PretrainedTokenizer>>;
}

/// Creates the process-wide loader.
#[async_trait]
pub trait LoaderInit: Send + Sync {
    async fn init(&self) -> Result<Arc<dyn PretrainedLoader>>;
}

/// Counts tokens with a lazily initialized [`PretrainedLoader`].
pub struct PretrainedCounter {
    loader: OnceCell<Arc<dyn PretrainedLoader>>,
    init: Arc<dyn LoaderInit>,
}

impl PretrainedCounter {
    pub fn new(init: Arc<dyn LoaderInit>) -> Self {
        Self { loader: OnceCell::new(), init }
    }

    pub fn is_initialized(&self) -> bool {
        self.loader.initialized()
    }

    pub async fn loader(&self) -> Result<&Arc<dyn PretrainedLoader>> {
        self.loader.get_or_try_init(|| self.init.init()).await
    }

    pub async fn count(&self, text: String, model_name: &str) -> Result<usize> {
        let tokenizer = self.loader().await?.load(model_name).await?;
        tokio::task::spawn_blocking(move || tokenizer.count(&text)).await?
    }
}

/// Builds a [`HubLoader`] for the Hugging Face hub.
pub struct HubLoaderInit {
    revision: String,
    token: Option<String>,
}

impl HubLoaderInit {
    pub fn new(revision: impl Into<String>, token: Option<String>) -> Self {
        Self { revision: revision.into(), token }
    }
}

#[async_trait]
impl LoaderInit for HubLoaderInit {
    async fn init(&self) -> Result<Arc<dyn PretrainedLoader>> {
        if self.revision.trim().is_empty() {
            return Err(TokenizeError::LoaderInit("hub revision must not be empty".into()));
        }
        info!(revision = %self.revision, authenticated = self.token.is_some(), "Pretrained tokenizer loader ready");
        Ok(Arc::new(HubLoader::new(self.revision.clone(), self.token.clone())))
    }
}

/// Loads `tokenizer.json` from the hub (or its local cache) and keeps
/// loaded tokenizers per model id.
pub struct HubLoader {
    revision: String,
    token: Option<String>,
    loaded: RwLock<HashMap<String, Arc<HubTokenizer>>>,
}

impl HubLoader {
    pub fn new(revision: String, token: Option<String>) -> Self {
        Self { revision, token, loaded: RwLock::new(HashMap::new()) }
    }

    fn params(&self) -> FromPretrainedParameters {
        FromPretrainedParameters {
            revision: self.revision.clone(),
            token: self.token.clone(),
            ..FromPretrainedParameters::default()
        }
    }
}

#[async_trait]
impl PretrainedLoader for HubLoader {
    async fn load(&self, model_name: &str) -> Result<Arc<dyn PretrainedTokenizer>> {
        if let Some(t) = self.loaded.read().get(model_name) {
            return Ok(t.clone());
        }

        let started = Instant::now();
        let name = model_name.to_string();
        let params = self.params();
        let tokenizer = tokio::task::spawn_blocking(move || Tokenizer::from_pretrained(&name, Some(params)))
            .await?
            .map_err(|e| TokenizeError::PretrainedLoad {
                model: model_name.to_string(),
                reason: e.to_string(),
            })?;
        info!(model = model_name, elapsed_ms = started.elapsed().as_millis() as u64, "Loaded pretrained tokenizer");

        let tokenizer = Arc::new(HubTokenizer(tokenizer));
        let mut loaded = self.loaded.write();
        Ok(loaded.entry(model_name.to_string()).or_insert(tokenizer).clone())
    }
}

pub struct HubTokenizer(Tokenizer);

impl PretrainedTokenizer for HubTokenizer {
    fn count(&self, text: &str) -> Result<usize> {
        self.0
            .encode(text, true)
            .map(|encoding| encoding.get_ids().len())
            .map_err(|e| TokenizeError::Encode(e.to_string()))
    }
}
