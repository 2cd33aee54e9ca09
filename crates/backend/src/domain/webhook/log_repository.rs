use chrono::Utc;
use contracts::domain::webhook::WebhookLogEntry;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::shared::data::db::get_connection;

/// Response bodies are truncated before logging so a chatty endpoint
/// cannot bloat the log table.
const MAX_LOGGED_BODY: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "webhook_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub webhook_id: i32,
    pub event_type: String,
    pub status_code: Option<i32>,
    pub response_body: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for WebhookLogEntry {
    fn from(m: Model) -> Self {
        WebhookLogEntry {
            id: m.id,
            webhook_id: m.webhook_id,
            event_type: m.event_type,
            status_code: m.status_code,
            response_body: m.response_body,
            error_message: m.error_message,
            created_at: m.created_at,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn record_attempt(
    webhook_id: i32,
    event_type: &str,
    status_code: Option<u16>,
    response_body: Option<&str>,
    error_message: Option<&str>,
) -> anyhow::Result<()> {
    let model = ActiveModel {
        id: NotSet,
        webhook_id: Set(webhook_id),
        event_type: Set(event_type.to_string()),
        status_code: Set(status_code.map(i32::from)),
        response_body: Set(response_body.map(|b| truncate(b, MAX_LOGGED_BODY))),
        error_message: Set(error_message.map(|e| e.to_string())),
        created_at: Set(Some(Utc::now())),
    };
    model.insert(conn()).await?;
    Ok(())
}

pub async fn list_for_webhook(webhook_id: i32, limit: u64) -> anyhow::Result<Vec<WebhookLogEntry>> {
    let items = Entity::find()
        .filter(Column::WebhookId.eq(webhook_id))
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789", 4), "0123");
    }
}
