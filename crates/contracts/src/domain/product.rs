use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product entity as persisted in the catalog, keyed by unique SKU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: i32,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for product create/update endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDto {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// One page of the product list, with pagination bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// One validated CSV row, the unit of work for the import pipeline.
/// Transient: lives only between the row parser and the upsert engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: i32,
    pub active: bool,
}
