use contracts::domain::webhook::Webhook;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "webhooks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub url: String,
    pub event_type: String,
    pub enabled: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Webhook {
    fn from(m: Model) -> Self {
        Webhook {
            id: m.id,
            url: m.url,
            event_type: m.event_type,
            enabled: m.enabled,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list(event_type: Option<&str>, enabled: Option<bool>) -> anyhow::Result<Vec<Webhook>> {
    let mut query = Entity::find();
    if let Some(event_type) = event_type {
        query = query.filter(Column::EventType.contains(event_type));
    }
    if let Some(enabled) = enabled {
        query = query.filter(Column::Enabled.eq(enabled));
    }
    let items = query
        .order_by_asc(Column::Id)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Webhooks the dispatcher fans an event out to: exact event type match,
/// enabled only.
pub async fn list_enabled_for_event(event_type: &str) -> anyhow::Result<Vec<Webhook>> {
    let items = Entity::find()
        .filter(Column::EventType.eq(event_type))
        .filter(Column::Enabled.eq(true))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: i32) -> anyhow::Result<Option<Webhook>> {
    Ok(Entity::find_by_id(id).one(conn()).await?.map(Into::into))
}

pub async fn insert(model: ActiveModel) -> anyhow::Result<Webhook> {
    Ok(model.insert(conn()).await?.into())
}

pub async fn update(model: ActiveModel) -> anyhow::Result<Webhook> {
    Ok(model.update(conn()).await?.into())
}

pub async fn delete(id: i32) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
