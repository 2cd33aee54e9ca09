use axum::{
    extract::{Path, Query},
    Json,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::Arc;

use contracts::domain::webhook::{Webhook, WebhookDto, WebhookLogEntry, WebhookUpdateDto};
use contracts::usecases::webhook_dispatch::{WebhookDeliveryResult, WebhookTestRequest};

use crate::domain::webhook;
use crate::shared::config;
use crate::usecases::webhook_dispatch::WebhookDispatcher;

static DISPATCHER: Lazy<Arc<WebhookDispatcher>> =
    Lazy::new(|| Arc::new(WebhookDispatcher::new(config::get().webhooks.timeout_secs)));

/// Shared dispatcher instance; the startup event consumer uses the same
/// client and timeout policy as the test endpoint.
pub fn dispatcher() -> Arc<WebhookDispatcher> {
    DISPATCHER.clone()
}

#[derive(Deserialize)]
pub struct WebhookListQuery {
    pub event_type: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct WebhookLogsQuery {
    pub limit: Option<u64>,
}

/// GET /api/webhooks
pub async fn list(
    Query(query): Query<WebhookListQuery>,
) -> Result<Json<Vec<Webhook>>, axum::http::StatusCode> {
    match webhook::service::list(query.event_type.as_deref(), query.enabled).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Failed to list webhooks: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/webhooks/:id
pub async fn get_by_id(Path(id): Path<i32>) -> Result<Json<Webhook>, axum::http::StatusCode> {
    match webhook::service::get_by_id(id).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get webhook {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/webhooks
pub async fn create(Json(dto): Json<WebhookDto>) -> Result<Json<Webhook>, axum::http::StatusCode> {
    match webhook::service::create(dto).await {
        Ok(item) => Ok(Json(item)),
        Err(e) => {
            tracing::error!("Failed to create webhook: {}", e);
            Err(axum::http::StatusCode::BAD_REQUEST)
        }
    }
}

/// PUT /api/webhooks/:id
pub async fn update(
    Path(id): Path<i32>,
    Json(dto): Json<WebhookUpdateDto>,
) -> Result<Json<Webhook>, axum::http::StatusCode> {
    match webhook::service::update(id, dto).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to update webhook {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/webhooks/:id
pub async fn delete(Path(id): Path<i32>) -> Result<(), axum::http::StatusCode> {
    match webhook::service::delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete webhook {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/webhooks/:id/test
///
/// Single synchronous delivery; the result is returned to the caller
/// whether the endpoint answered or not.
pub async fn test(
    Path(id): Path<i32>,
    Json(request): Json<WebhookTestRequest>,
) -> Result<Json<WebhookDeliveryResult>, axum::http::StatusCode> {
    match DISPATCHER.test(id, &request.event_type).await {
        Ok(Some(result)) => Ok(Json(result)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to test webhook {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/webhooks/:id/logs
pub async fn logs(
    Path(id): Path<i32>,
    Query(query): Query<WebhookLogsQuery>,
) -> Result<Json<Vec<WebhookLogEntry>>, axum::http::StatusCode> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    match webhook::service::get_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get webhook {}: {}", id, e);
            return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
    match webhook::service::logs(id, limit).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Failed to list webhook {} logs: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
