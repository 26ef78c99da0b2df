use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tracing::{error, info};
use tz_session::{token_from_headers, verify_token, SessionError};

use crate::error::ApiError;
use crate::state::AppState;

pub const INVALID_CSRF: &str = "Invalid CSRF token";
pub const INTERNAL_ERROR: &str = "Internal server error";

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Rejects state-changing requests without a token bound to the caller's session.
pub async fn csrf_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.config.csrf.enabled || is_safe(req.method()) {
        return next.run(req).await;
    }

    let headers = req.headers();
    let verdict = match state.session_from_headers(headers) {
        None => Err(SessionError::MissingToken),
        Some(session) => {
            let token = token_from_headers(|name| headers.get(name).and_then(|v| v.to_str().ok()));
            match token {
                Some(token) => verify_token(&session.csrf_secret, token),
                None => Err(SessionError::MissingToken),
            }
        }
    };

    match verdict {
        Ok(()) => next.run(req).await,
        Err(reason) => {
            info!(method = %req.method(), path = req.uri().path(), %reason, "Rejected CSRF token");
            ApiError::forbidden(INVALID_CSRF).into_response()
        }
    }
}

/// Converts a handler panic into the generic 500 envelope.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = detail, "Handler panicked");
    ApiError::internal(INTERNAL_ERROR).into_response()
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
