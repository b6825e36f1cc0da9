pub mod postal;
pub mod server;

use axum::{
    routing::get,
    Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Build the HTTP router; unknown paths fall back to the static UI directory
pub fn router(state: Arc<AppState>, public_dir: &Path) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/status", get(postal::get_status))
        .route("/api/zip/:code", get(postal::lookup_zip))
        .route("/api/address", get(postal::lookup_address))
        .route(
            "/api/admin/reload",
            get(postal::get_reload_status).post(postal::reload_index),
        )
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
