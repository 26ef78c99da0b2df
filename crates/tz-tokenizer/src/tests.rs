use crate::*;
use crate::pretrained::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tz_core::config::TokenizerConfig;

/// Splits on whitespace; stands in for a hub tokenizer.
struct WordTokenizer;

impl PretrainedTokenizer for WordTokenizer {
    fn count(&self, text: &str) -> crate::Result<usize> {
        Ok(text.split_whitespace().count())
    }
}

struct FakeLoader;

#[async_trait]
impl PretrainedLoader for FakeLoader {
    async fn load(&self, model_name: &str) -> crate::Result<Arc<dyn PretrainedTokenizer>> {
        if model_name == "missing/model" {
            return Err(TokenizeError::PretrainedLoad { model: model_name.into(), reason: "404".into() });
        }
        Ok(Arc::new(WordTokenizer))
    }
}

#[derive(Default)]
struct CountingInit {
    calls: AtomicUsize,
    fail_first: bool,
}

#[async_trait]
impl LoaderInit for CountingInit {
    async fn init(&self) -> crate::Result<Arc<dyn PretrainedLoader>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail_first && n == 0 {
            return Err(TokenizeError::LoaderInit("cold start".into()));
        }
        Ok(Arc::new(FakeLoader))
    }
}

fn adapter_with(init: Arc<CountingInit>) -> TokenizerAdapter {
    TokenizerAdapter::with_loader_init(&TokenizerConfig::default(), init)
}

// ========== Encoder Registry ==========

#[test]
fn test_hello_world_cl100k() {
    let reg = EncoderRegistry::default();
    assert_eq!(reg.count("hello world", None).unwrap(), 2);
}

#[test]
fn test_non_empty_text_has_tokens() {
    let reg = EncoderRegistry::default();
    for text in ["a", " ", "\n", "日本語", "fn main() {}"] {
        assert!(reg.count(text, None).unwrap() >= 1, "{text:?}");
    }
}

#[test]
fn test_empty_text_zero_tokens() {
    let reg = EncoderRegistry::default();
    assert_eq!(reg.count("", None).unwrap(), 0);
}

#[test]
fn test_resolve_default() {
    let reg = EncoderRegistry::default();
    assert_eq!(reg.resolve(None), "cl100k_base");
    assert_eq!(reg.resolve(Some("")), "cl100k_base");
    assert_eq!(reg.resolve(Some("  ")), "cl100k_base");
    assert_eq!(reg.resolve(Some(" p50k_base ")), "p50k_base");
}

#[test]
fn test_unknown_encoding_is_input_error() {
    let reg = EncoderRegistry::default();
    let err = reg.count("hi", Some("gpt-42")).unwrap_err();
    assert!(matches!(err, TokenizeError::UnknownEncoding(ref n) if n == "gpt-42"));
    assert!(err.is_input_error());
}

#[test]
fn test_gpt2_alias() {
    let reg = EncoderRegistry::default();
    let a = reg.count("hello world, again", Some("gpt2")).unwrap();
    let b = reg.count("hello world, again", Some("r50k_base")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_table_is_cached() {
    let reg = EncoderRegistry::default();
    let a = reg.get(Some("cl100k_base")).unwrap();
    let b = reg.get(None).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_special_tokens_counted() {
    let reg = EncoderRegistry::default();
    assert_eq!(reg.count("<|endoftext|>", None).unwrap(), 1);
}

#[test]
fn test_o200k_encodes() {
    let reg = EncoderRegistry::default();
    assert!(reg.count("hello world", Some("o200k_base")).unwrap() >= 1);
}

// ========== Error Classification ==========

#[test]
fn test_system_errors_are_not_input_errors() {
    assert!(!TokenizeError::LoaderInit("x".into()).is_input_error());
    assert!(!TokenizeError::PretrainedLoad { model: "m".into(), reason: "r".into() }.is_input_error());
    assert!(!TokenizeError::Encode("x".into()).is_input_error());
}

// ========== Adapter ==========

#[tokio::test]
async fn test_count_encoded_default() {
    let adapter = adapter_with(Arc::new(CountingInit::default()));
    let r = adapter.count_encoded("hello world".into(), None).await.unwrap();
    assert_eq!(r.token_count, 2);
}

#[tokio::test]
async fn test_count_encoded_unknown() {
    let adapter = adapter_with(Arc::new(CountingInit::default()));
    let err = adapter.count_encoded("hi".into(), Some("nope".into())).await.unwrap_err();
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_count_pretrained() {
    let adapter = adapter_with(Arc::new(CountingInit::default()));
    let r = adapter.count_pretrained("one two three".into(), "Xenova/llama-tokenizer").await.unwrap();
    assert_eq!(r.token_count, 3);
}

#[tokio::test]
async fn test_count_pretrained_missing_model() {
    let adapter = adapter_with(Arc::new(CountingInit::default()));
    let err = adapter.count_pretrained("x".into(), "missing/model").await.unwrap_err();
    assert!(!err.is_input_error());
}

#[test]
fn test_encodings_listed() {
    let adapter = adapter_with(Arc::new(CountingInit::default()));
    assert!(adapter.encodings().contains(&"cl100k_base"));
    assert_eq!(adapter.default_encoding(), "cl100k_base");
}

// ========== Lazy Loader Initialization ==========

#[tokio::test]
async fn test_loader_not_initialized_until_used() {
    let init = Arc::new(CountingInit::default());
    let adapter = adapter_with(init.clone());
    adapter.count_encoded("hi".into(), None).await.unwrap();
    assert!(!adapter.pretrained().is_initialized());
    assert_eq!(init.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_calls_initialize_once() {
    let init = Arc::new(CountingInit::default());
    let adapter = Arc::new(adapter_with(init.clone()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let adapter = adapter.clone();
        handles.push(tokio::spawn(async move {
            adapter.count_pretrained(format!("word {i}"), "m").await
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().unwrap().token_count, 2);
    }

    assert_eq!(init.calls.load(Ordering::SeqCst), 1);
    assert!(adapter.pretrained().is_initialized());
}

#[tokio::test]
async fn test_failed_init_is_retried() {
    let init = Arc::new(CountingInit { fail_first: true, ..Default::default() });
    let adapter = adapter_with(init.clone());

    assert!(adapter.count_pretrained("a b".into(), "m").await.is_err());
    assert!(!adapter.pretrained().is_initialized());

    assert_eq!(adapter.count_pretrained("a b".into(), "m").await.unwrap().token_count, 2);
    adapter.count_pretrained("a b".into(), "m").await.unwrap();
    assert_eq!(init.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_hub_init_rejects_blank_revision() {
    let init = HubLoaderInit::new(" ", None);
    assert!(matches!(init.init().await, Err(TokenizeError::LoaderInit(_))));
}

#[tokio::test]
async fn test_hub_init_is_lazy_and_offline() {
    let init = HubLoaderInit::new("main", None);
    assert!(init.init().await.is_ok());
}
