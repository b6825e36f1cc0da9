//! Postal lookup endpoints / 郵便番号検索 API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::ApiResponse;
use crate::postal::{self, IndexStatus, LookupResponse, SearchIndex};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/status - データ状態
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<IndexStatus> {
    Json(postal::status(&state.index.snapshot()))
}

/// GET /api/zip/:code - 郵便番号 → 住所
pub async fn lookup_zip(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Json<LookupResponse> {
    let index = state.index.snapshot();
    let response = postal::lookup_by_zip(&index, &code);
    tracing::debug!("zip lookup {:?}: {} results", code, response.results.len());
    Json(response)
}

/// GET /api/address?q= - 住所 → 郵便番号
pub async fn lookup_address(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddressQuery>,
) -> Json<LookupResponse> {
    let index = state.index.snapshot();
    let response = postal::lookup_by_address(&index, &query.q);
    tracing::debug!("address lookup {:?}: {} results", query.q, response.results.len());
    Json(response)
}

/// Reload status report / 再読み込み状態
#[derive(Debug, Serialize)]
pub struct ReloadStatus {
    /// "reloading" | "error" | "not_built" | "idle"
    pub status: String,
    pub count: usize,
    pub last_updated: Option<String>,
    pub error_message: Option<String>,
}

/// GET /api/admin/reload - 再読み込み状態
pub async fn get_reload_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ReloadStatus>> {
    let progress = state.reload.get_progress();
    let index = postal::status(&state.index.snapshot());

    let status = if progress.is_running {
        "reloading"
    } else if progress.error.is_some() {
        "error"
    } else if !index.ready {
        "not_built"
    } else {
        "idle"
    };

    let last_updated = progress.last_done_time.map(|ts| {
        chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default()
    });

    Json(ApiResponse::success(ReloadStatus {
        status: status.to_string(),
        count: index.count,
        last_updated,
        error_message: progress.error,
    }))
}

/// POST /api/admin/reload - 成果物からインデックスを再構築して差し替え
pub async fn reload_index(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<IndexStatus>>) {
    if !state.reload.try_start() {
        return (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(409, "再読み込み中です")),
        );
    }

    // The task owns the slot until it finishes, even if this request is dropped
    let task = tokio::spawn(do_reload_index(state));

    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(format!("reload task failed: {}", e)),
    };

    match result {
        Ok(status) => (StatusCode::OK, Json(ApiResponse::success(status))),
        Err(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(500, &message)),
        ),
    }
}

/// 再構築 → 差し替え → 完了記録 / build, swap, then release the slot
async fn do_reload_index(state: Arc<AppState>) -> Result<IndexStatus, String> {
    let path = state.artifact_path.clone();
    let built = tokio::task::spawn_blocking(move || SearchIndex::load(&path)).await;

    let result = match built {
        Ok(Ok(index)) => {
            let status = postal::status(&index);
            state.index.replace(index);
            tracing::info!("Postal index reloaded: {} records", status.count);
            Ok(status)
        }
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("reload task failed: {}", e)),
    };

    match &result {
        Ok(_) => state.reload.finish(None),
        Err(message) => {
            tracing::warn!("Postal index reload failed, keeping current index: {}", message);
            state.reload.finish(Some(message.clone()));
        }
    }
    result
}
