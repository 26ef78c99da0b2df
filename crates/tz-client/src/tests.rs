use crate::*;
use async_trait::async_trait;
use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tz_core::AppConfig;
use tz_server::{app_with_state, state::AppState};
use tz_tokenizer::{LoaderInit, PretrainedLoader, PretrainedTokenizer, TokenizeError, TokenizerAdapter};

struct CharTokenizer;

impl PretrainedTokenizer for CharTokenizer {
    fn count(&self, text: &str) -> tz_tokenizer::Result<usize> {
        Ok(text.chars().count())
    }
}

struct OfflineLoader;

#[async_trait]
impl PretrainedLoader for OfflineLoader {
    async fn load(&self, model_name: &str) -> tz_tokenizer::Result<Arc<dyn PretrainedTokenizer>> {
        if model_name == DEFAULT_HF_MODEL {
            Ok(Arc::new(CharTokenizer))
        } else {
            Err(TokenizeError::PretrainedLoad { model: model_name.into(), reason: "offline".into() })
        }
    }
}

struct OfflineInit;

#[async_trait]
impl LoaderInit for OfflineInit {
    async fn init(&self) -> tz_tokenizer::Result<Arc<dyn PretrainedLoader>> {
        Ok(Arc::new(OfflineLoader))
    }
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_api(config: AppConfig) -> String {
    let tokenizer = TokenizerAdapter::with_loader_init(&config.tokenizer, Arc::new(OfflineInit));
    serve(app_with_state(AppState::new(config).with_tokenizer(tokenizer))).await
}

async fn client_for(config: AppConfig) -> ApiClient {
    let base = spawn_api(config).await;
    ApiClient::new(ClientConfig::new(base)).unwrap()
}

/// Base URL of a port nothing listens on.
async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ========== Round Trips ==========

#[tokio::test]
async fn test_openai_tokens_with_csrf() {
    let client = client_for(AppConfig::default()).await;
    let result = client.calculate_openai_tokens("hello world", Some("cl100k_base")).await.unwrap();
    assert_eq!(result.token_count, 2);
}

#[tokio::test]
async fn test_hf_tokens() {
    let client = client_for(AppConfig::default()).await;
    let result = client.calculate_hf_tokens("abc", DEFAULT_HF_MODEL).await.unwrap();
    assert_eq!(result.token_count, 3);
}

#[tokio::test]
async fn test_minify_operations() {
    let client = client_for(AppConfig::default()).await;
    assert_eq!(client.minify_remove_spaces("a b\nc").await.unwrap().minified_code, "abc");
    assert_eq!(
        client.minify_remove_spaces_and_comments("a // x\n  b").await.unwrap().minified_code,
        "a b"
    );
    assert_eq!(client.minify_css("body { margin: 0; }").await.unwrap().minified_code, "body{margin:0}");

    let js = client.minify_rewrite_javascript("export const answer = 40 + 2;").await.unwrap();
    assert!(js.minified_code.contains("42"), "{}", js.minified_code);

    let ts = client.minify_typescript("export const n: number = 1;").await.unwrap();
    assert!(!ts.minified_code.contains("number"), "{}", ts.minified_code);
}

#[tokio::test]
async fn test_health_and_encodings() {
    let client = client_for(AppConfig::default()).await;
    assert_eq!(client.health().await.unwrap().status, "ok");
    let encodings = client.encodings().await.unwrap();
    assert_eq!(encodings.default, "cl100k_base");
    assert!(encodings.encodings.iter().any(|e| e == "p50k_base"));
}

#[tokio::test]
async fn test_fetch_csrf_token_is_stored() {
    let client = client_for(AppConfig::default()).await;
    let token = client.fetch_csrf_token().await.unwrap();
    assert_eq!(client.csrf_token.lock().await.as_deref(), Some(token.as_str()));
}

// ========== CSRF Handling ==========

#[tokio::test]
async fn test_stale_token_refreshed_once() {
    let client = client_for(AppConfig::default()).await;
    client.fetch_csrf_token().await.unwrap();
    *client.csrf_token.lock().await = Some("stale-token".into());

    let result = client.minify_remove_spaces("a b").await.unwrap();
    assert_eq!(result.minified_code, "ab");
    assert_ne!(client.csrf_token.lock().await.as_deref(), Some("stale-token"));
}

#[tokio::test]
async fn test_client_without_csrf_is_rejected() {
    let base = spawn_api(AppConfig::default()).await;
    let client = ApiClient::new(ClientConfig::new(base).with_csrf(false)).unwrap();
    let err = client.minify_remove_spaces("a b").await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 403, .. }));
    assert_eq!(err.user_message(), "Invalid CSRF token");
}

#[tokio::test]
async fn test_csrf_disabled_on_both_sides() {
    let base = spawn_api(AppConfig::default().with_csrf(false)).await;
    let client = ApiClient::new(ClientConfig::new(base).with_csrf(false)).unwrap();
    assert_eq!(client.minify_remove_spaces("a b").await.unwrap().minified_code, "ab");
}

// ========== Failure Classification ==========

#[tokio::test]
async fn test_server_error_envelope() {
    let client = client_for(AppConfig::default()).await;
    let err = client.minify_rewrite_javascript("const = ;").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Server);
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Failed to minify JavaScript.");
    assert!(matches!(err, ClientError::Server { details: Some(_), .. }));
}

#[tokio::test]
async fn test_server_internal_error() {
    let client = client_for(AppConfig::default()).await;
    let err = client.calculate_hf_tokens("abc", "nobody/missing").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Failed to tokenize text for Hugging Face.");
}

#[tokio::test]
async fn test_non_json_error_status() {
    let router = Router::new().route("/api/health", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }));
    let client = ApiClient::new(ClientConfig::new(serve(router).await)).unwrap();
    let err = client.health().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Server);
    assert_eq!(err.to_string(), "HTTP error! Status: 502, Message: Bad Gateway");
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let router = Router::new().route("/api/encodings", get(|| async { "not json" }));
    let client = ApiClient::new(ClientConfig::new(serve(router).await)).unwrap();
    let err = client.encodings().await.unwrap_err();
    assert!(matches!(err, ClientError::Unexpected(_)));
    assert_eq!(err.kind(), FailureKind::Local);
}

#[tokio::test]
async fn test_transport_failure() {
    let client = ApiClient::new(ClientConfig::new(closed_port().await).with_csrf(false)).unwrap();
    let err = client.calculate_openai_tokens("hello", None).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
    assert_eq!(err.user_message(), NO_RESPONSE);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_empty_input_rejected_locally() {
    // Nothing listens here, so reaching the network would be a transport error.
    let client = ApiClient::new(ClientConfig::new(closed_port().await)).unwrap();

    let cases = [
        (client.calculate_openai_tokens("", None).await, "Please enter text to calculate tokens."),
        (client.calculate_hf_tokens("", DEFAULT_HF_MODEL).await, "Please enter text to calculate tokens."),
    ];
    for (result, message) in cases {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Local);
        assert_eq!(err.user_message(), message);
    }

    let minify = [
        (client.minify_remove_spaces("").await, "Please enter code to minify."),
        (client.minify_rewrite_javascript("").await, "Please enter code to minify."),
        (client.minify_css("").await, "Please enter CSS code to minify."),
        (client.minify_typescript("").await, "Please enter TypeScript code to minify."),
    ];
    for (result, message) in minify {
        let err = result.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(err.user_message(), message);
    }
}

#[test]
fn test_construction_failure_is_local() {
    let err = ApiClient::new(ClientConfig::new("not a url")).err().unwrap();
    assert!(matches!(err, ClientError::Unexpected(_)));
    assert_eq!(err.kind(), FailureKind::Local);
    assert_ne!(err.user_message(), NO_RESPONSE);
}

#[test]
fn test_server_error_display_includes_details() {
    let err = ClientError::Server { status: 400, message: "Failed to minify CSS.".into(), details: Some("bad".into()) };
    assert_eq!(err.to_string(), "Failed to minify CSS. (bad)");
    assert_eq!(err.user_message(), "Failed to minify CSS.");
}
