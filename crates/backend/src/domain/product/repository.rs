use chrono::Utc;
use contracts::domain::product::{Product, ProductListResponse, ProductRow};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: i32,
    pub active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Product {
            id: m.id,
            sku: m.sku,
            name: m.name,
            description: m.description,
            price: m.price,
            quantity: m.quantity,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list(
    search: Option<&str>,
    active: Option<bool>,
    page: u64,
    page_size: u64,
) -> anyhow::Result<ProductListResponse> {
    let mut query = Entity::find();
    if let Some(term) = search {
        let pattern = format!("%{}%", term);
        query = query.filter(
            Column::Sku
                .like(pattern.clone())
                .or(Column::Name.like(pattern)),
        );
    }
    if let Some(active) = active {
        query = query.filter(Column::Active.eq(active));
    }

    let paginator = query
        .order_by_asc(Column::Sku)
        .paginate(conn(), page_size.max(1));
    let counts = paginator.num_items_and_pages().await?;
    // Pages are 1-indexed on the API, 0-indexed in the paginator
    let items = paginator
        .fetch_page(page.saturating_sub(1))
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ProductListResponse {
        items,
        total: counts.number_of_items,
        page,
        page_size,
        total_pages: counts.number_of_pages,
    })
}

pub async fn get_by_id(id: i32) -> anyhow::Result<Option<Product>> {
    Ok(Entity::find_by_id(id).one(conn()).await?.map(Into::into))
}

pub async fn find_by_sku(sku: &str) -> anyhow::Result<Option<Product>> {
    Ok(find_by_sku_on(conn(), sku).await?.map(Into::into))
}

/// SKU lookup is case-insensitive: "ab-1" and "AB-1" are the same key.
async fn find_by_sku_on<C: ConnectionTrait>(db: &C, sku: &str) -> Result<Option<Model>, DbErr> {
    Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(Column::Sku))).eq(sku.to_lowercase()))
        .one(db)
        .await
}

pub async fn insert(model: ActiveModel) -> anyhow::Result<Product> {
    Ok(model.insert(conn()).await?.into())
}

pub async fn update(model: ActiveModel) -> anyhow::Result<Product> {
    Ok(model.update(conn()).await?.into())
}

pub async fn delete(id: i32) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}

/// Bulk delete of the whole catalog; returns the number of rows removed
pub async fn delete_all() -> anyhow::Result<u64> {
    let result = Entity::delete_many().exec(conn()).await?;
    Ok(result.rows_affected)
}

/// Apply one validated row inside an open transaction: insert when the SKU
/// is unknown, otherwise overwrite the mutable fields. SKU itself is never
/// rewritten.
pub async fn upsert_row_txn(
    txn: &DatabaseTransaction,
    row: &ProductRow,
) -> Result<super::UpsertOutcome, DbErr> {
    let now = Utc::now();
    match find_by_sku_on(txn, &row.sku).await? {
        Some(existing) => {
            let mut model: ActiveModel = existing.into();
            model.name = Set(row.name.clone());
            model.description = Set(row.description.clone());
            model.price = Set(row.price);
            model.quantity = Set(row.quantity);
            model.active = Set(row.active);
            model.updated_at = Set(Some(now));
            model.update(txn).await?;
            Ok(super::UpsertOutcome::Updated)
        }
        None => {
            let model = ActiveModel {
                id: NotSet,
                sku: Set(row.sku.clone()),
                name: Set(row.name.clone()),
                description: Set(row.description.clone()),
                price: Set(row.price),
                quantity: Set(row.quantity),
                active: Set(row.active),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            };
            model.insert(txn).await?;
            Ok(super::UpsertOutcome::Created)
        }
    }
}
