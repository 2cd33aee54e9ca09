use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers;

/// Route table for the whole service
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // CSV IMPORT
        // ========================================
        .route("/api/upload", post(handlers::upload::upload_csv))
        .route(
            "/api/upload/progress/:task_id",
            get(handlers::upload::get_progress),
        )
        // ========================================
        // PRODUCTS (persistence pass-through)
        // ========================================
        .route(
            "/api/products",
            get(handlers::products::list)
                .post(handlers::products::create)
                .delete(handlers::products::delete_all),
        )
        .route(
            "/api/products/:id",
            get(handlers::products::get_by_id)
                .put(handlers::products::update)
                .delete(handlers::products::delete),
        )
        // ========================================
        // WEBHOOKS
        // ========================================
        .route(
            "/api/webhooks",
            get(handlers::webhooks::list).post(handlers::webhooks::create),
        )
        .route(
            "/api/webhooks/:id",
            get(handlers::webhooks::get_by_id)
                .put(handlers::webhooks::update)
                .delete(handlers::webhooks::delete),
        )
        .route("/api/webhooks/:id/test", post(handlers::webhooks::test))
        .route("/api/webhooks/:id/logs", get(handlers::webhooks::logs))
}
