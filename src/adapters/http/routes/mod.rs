pub mod plan;
pub mod subscription;

use axum::Router;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/plans", plan::router())
        .nest("/subscriptions", subscription::router())
}

/// The gateway authenticates the caller and forwards the identity as a
/// UUID in `X-User-Id`. A missing or garbled header means the request
/// never went through the gateway.
pub fn current_user_id(headers: &HeaderMap) -> AppResult<Uuid> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or(AppError::InvalidCredentials)
}
