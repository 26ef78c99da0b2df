use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use tz_core::{
    non_empty, CsrfTokenResponse, EncodingsResponse, HealthResponse, MinificationRequest, MinificationResult,
    TokenizationRequest, TokenizationResult,
};
use tz_session::issue_token;

use crate::cache::cache_responses;
use crate::error::{ApiError, CSS_FAILED, HF_FAILED, JAVASCRIPT_FAILED, OPENAI_FAILED, TYPESCRIPT_FAILED};
use crate::extract::ApiJson;
use crate::state::AppState;

const CODE_REQUIRED: &str = "Code is required for minification.";

/// Every API route. Only the idempotent reads go through the response cache.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(tokenize_routes())
        .merge(minify_routes())
        .merge(csrf_routes())
        .merge(cached_routes(state))
}

pub fn tokenize_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tokenize/openai", post(tokenize_openai))
        .route("/api/tokenize/hf", post(tokenize_hf))
}

pub fn minify_routes() -> Router<AppState> {
    Router::new()
        .route("/api/minify/remove-spaces", post(remove_spaces))
        .route("/api/minify/remove-spaces-and-comments", post(remove_spaces_and_comments))
        .route("/api/minify/rewrite-javascript", post(rewrite_javascript))
        .route("/api/minify/typescript", post(minify_typescript))
        .route("/api/minify/css", post(minify_css))
}

pub fn csrf_routes() -> Router<AppState> {
    Router::new().route("/api/csrf-token", get(csrf_token))
}

pub fn cached_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/encodings", get(encodings))
        .route_layer(middleware::from_fn_with_state(state.clone(), cache_responses))
}

fn required(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    non_empty(&value).map(str::to_owned).ok_or_else(|| ApiError::bad_request(message))
}

async fn tokenize_openai(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TokenizationRequest>,
) -> Result<Json<TokenizationResult>, ApiError> {
    let text = required(req.text, "Text is required for tokenization.")?;
    let result = state
        .tokenizer
        .count_encoded(text, req.model)
        .await
        .map_err(|e| ApiError::failed(OPENAI_FAILED, e))?;
    Ok(Json(result))
}

async fn tokenize_hf(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TokenizationRequest>,
) -> Result<Json<TokenizationResult>, ApiError> {
    let text = required(req.text, "Text is required for HF tokenization.")?;
    let model_name = required(req.model_name, "modelName is required for HF tokenization.")?;
    let result = state
        .tokenizer
        .count_pretrained(text, &model_name)
        .await
        .map_err(|e| ApiError::failed(HF_FAILED, e))?;
    Ok(Json(result))
}

async fn remove_spaces(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MinificationRequest>,
) -> Result<Json<MinificationResult>, ApiError> {
    let code = required(req.code, CODE_REQUIRED)?;
    Ok(Json(state.minifier.remove_spaces(&code)))
}

async fn remove_spaces_and_comments(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MinificationRequest>,
) -> Result<Json<MinificationResult>, ApiError> {
    let code = required(req.code, CODE_REQUIRED)?;
    Ok(Json(state.minifier.remove_spaces_and_comments(&code)))
}

async fn rewrite_javascript(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MinificationRequest>,
) -> Result<Json<MinificationResult>, ApiError> {
    let code = required(req.code, CODE_REQUIRED)?;
    let result = state
        .minifier
        .rewrite_javascript(code)
        .await
        .map_err(|e| ApiError::failed(JAVASCRIPT_FAILED, e))?;
    Ok(Json(result))
}

async fn minify_typescript(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MinificationRequest>,
) -> Result<Json<MinificationResult>, ApiError> {
    let code = required(req.code, CODE_REQUIRED)?;
    let result = state
        .minifier
        .typescript(code)
        .await
        .map_err(|e| ApiError::failed(TYPESCRIPT_FAILED, e))?;
    Ok(Json(result))
}

async fn minify_css(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MinificationRequest>,
) -> Result<Json<MinificationResult>, ApiError> {
    let code = required(req.code, CODE_REQUIRED)?;
    let result = state
        .minifier
        .css(code)
        .await
        .map_err(|e| ApiError::failed(CSS_FAILED, e))?;
    Ok(Json(result))
}

/// Issues a token for the caller's session, starting one if needed.
async fn csrf_token(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let (session, created) = state.sessions.get_or_create(state.session_id_from_headers(&headers));
    let body = Json(CsrfTokenResponse { csrf_token: issue_token(&session.csrf_secret) });

    if !created {
        return Ok(body.into_response());
    }
    info!(session_id = %session.id, "Started session");
    let cookie = HeaderValue::from_str(&state.session_cookie.set_cookie(&session.id))
        .map_err(|e| ApiError::internal("Failed to generate CSRF token.").with_details(e.to_string()))?;
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

async fn encodings(State(state): State<AppState>) -> Json<EncodingsResponse> {
    Json(EncodingsResponse {
        encodings: state.tokenizer.encodings().iter().map(|e| e.to_string()).collect(),
        default: state.tokenizer.default_encoding().to_string(),
    })
}
