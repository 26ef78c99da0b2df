use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;

pub const INVALID_JSON: &str = "Invalid JSON body.";

/// `Json` whose rejection is rendered as an [`ApiError`] envelope.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let err = ApiError::bad_request(INVALID_JSON).with_details(rejection.body_text());
                // An oversized body keeps its own status.
                Err(match rejection.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => err.with_status(StatusCode::PAYLOAD_TOO_LARGE),
                    _ => err,
                })
            }
        }
    }
}
