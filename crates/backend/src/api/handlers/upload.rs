use axum::{
    extract::{Multipart, Path},
    Json,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

use contracts::usecases::csv_import::{ProgressResponse, UploadResponse};

use crate::shared::config;
use crate::usecases::csv_import::{ImportExecutor, ProgressTracker};
use crate::usecases::webhook_dispatch;

static IMPORT_EXECUTOR: Lazy<Arc<ImportExecutor>> = Lazy::new(|| {
    let tracker = Arc::new(ProgressTracker::new());
    Arc::new(ImportExecutor::new(
        tracker,
        webhook_dispatch::event_sender(),
    ))
});

/// Shared executor instance; also used by the startup cleanup task
pub fn import_executor() -> Arc<ImportExecutor> {
    IMPORT_EXECUTOR.clone()
}

/// POST /api/upload
///
/// Accepts a multipart CSV upload, stores it to the upload directory and
/// starts the import pipeline. Responds with the task id immediately;
/// the pipeline runs detached.
pub async fn upload_csv(
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, axum::http::StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| axum::http::StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(axum::http::StatusCode::BAD_REQUEST);
        }

        let data = field
            .bytes()
            .await
            .map_err(|_| axum::http::StatusCode::BAD_REQUEST)?;

        let upload_dir = std::path::PathBuf::from(&config::get().import.upload_dir);
        if let Err(e) = std::fs::create_dir_all(&upload_dir) {
            tracing::error!("Failed to create upload dir: {}", e);
            return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        }

        let task_id = uuid::Uuid::new_v4().to_string();
        let file_path = upload_dir.join(format!("{}_{}", task_id, filename));
        if let Err(e) = std::fs::write(&file_path, &data) {
            tracing::error!("Failed to store upload {}: {}", file_path.display(), e);
            return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        }

        let response = IMPORT_EXECUTOR
            .start_import(task_id, &filename, file_path)
            .await;
        return Ok(Json(response));
    }

    Err(axum::http::StatusCode::BAD_REQUEST)
}

/// GET /api/upload/progress/:task_id
pub async fn get_progress(
    Path(task_id): Path<String>,
) -> Result<Json<ProgressResponse>, axum::http::StatusCode> {
    match IMPORT_EXECUTOR.get_progress(&task_id) {
        Some(task) => Ok(Json(ProgressResponse::from(task))),
        None => Err(axum::http::StatusCode::NOT_FOUND),
    }
}
