use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;

use contracts::domain::product::{Product, ProductDto, ProductListResponse};

use crate::domain::product;

#[derive(Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub active: Option<bool>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// GET /api/products
pub async fn list(
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>, axum::http::StatusCode> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
    match product::service::list(query.search.as_deref(), query.active, page, page_size).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Failed to list products: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/products/:id
pub async fn get_by_id(Path(id): Path<i32>) -> Result<Json<Product>, axum::http::StatusCode> {
    match product::service::get_by_id(id).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get product {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/products
pub async fn create(Json(dto): Json<ProductDto>) -> Result<Json<Product>, axum::http::StatusCode> {
    match product::service::create(dto).await {
        Ok(item) => Ok(Json(item)),
        Err(e) => {
            tracing::error!("Failed to create product: {}", e);
            Err(axum::http::StatusCode::BAD_REQUEST)
        }
    }
}

/// PUT /api/products/:id
pub async fn update(
    Path(id): Path<i32>,
    Json(dto): Json<ProductDto>,
) -> Result<Json<Product>, axum::http::StatusCode> {
    match product::service::update(id, dto).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to update product {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/products/:id
pub async fn delete(Path(id): Path<i32>) -> Result<(), axum::http::StatusCode> {
    match product::service::delete(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete product {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/products — bulk delete of the whole catalog
pub async fn delete_all() -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match product::service::delete_all().await {
        Ok(count) => Ok(Json(
            serde_json::json!({ "message": format!("Deleted {} products", count) }),
        )),
        Err(e) => {
            tracing::error!("Failed to delete products: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
