//! HTTP endpoints for theme preferences and frontend runtime configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::model::{Theme, ThemePreference};
use super::store::MemoryStore;
use super::transport::{PREFERENCE_PATH, USER_HEADER};
use crate::config::{Configuration, PublicConfig};

/// Shared state for the preference service.
#[derive(Debug)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub store: MemoryStore,
}

impl AppState {
    pub fn new(config: Arc<Configuration>) -> Self {
        Self {
            config,
            store: MemoryStore::new(),
        }
    }
}

/// Errors rendered as JSON bodies in the same shape the frontend expects.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    /// Field-level validation failures, keyed by field name.
    Invalid(BTreeMap<&'static str, Vec<String>>),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Authentication credentials were not provided." })),
            )
                .into_response(),
            Self::Invalid(fields) => (StatusCode::BAD_REQUEST, Json(json!(fields))).into_response(),
            Self::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ThemeUpdate {
    pub theme: String,
}

/// Builds the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(PREFERENCE_PATH, get(get_theme).patch(update_theme))
        .route("/api/config/", get(runtime_config))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// The session layer upstream sets the user header; its absence means no session.
fn current_user(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::Unauthenticated)
}

pub async fn get_theme(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ThemePreference>, ApiError> {
    let user = current_user(&headers)?;
    Ok(Json(state.store.get_or_create(&user)))
}

pub async fn update_theme(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ThemeUpdate>, JsonRejection>,
) -> Result<Json<ThemePreference>, ApiError> {
    let user = current_user(&headers)?;
    let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let theme: Theme = update.theme.parse().map_err(|e| {
        warn!(%user, value = %update.theme, "rejected theme update");
        ApiError::Invalid(BTreeMap::from([("theme", vec![format!("{e}")])]))
    })?;

    let saved = state.store.update(&user, theme);
    info!(%user, %theme, "theme preference updated");
    Ok(Json(saved))
}

pub async fn runtime_config(State(state): State<Arc<AppState>>) -> Json<PublicConfig> {
    Json(state.config.public_view())
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
