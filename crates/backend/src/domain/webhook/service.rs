use chrono::Utc;
use contracts::domain::webhook::{Webhook, WebhookDto, WebhookLogEntry, WebhookUpdateDto};
use sea_orm::{NotSet, Set};

use super::log_repository;
use super::repository::{self, ActiveModel};

pub async fn list(event_type: Option<&str>, enabled: Option<bool>) -> anyhow::Result<Vec<Webhook>> {
    repository::list(event_type, enabled).await
}

pub async fn list_enabled_for_event(event_type: &str) -> anyhow::Result<Vec<Webhook>> {
    repository::list_enabled_for_event(event_type).await
}

pub async fn get_by_id(id: i32) -> anyhow::Result<Option<Webhook>> {
    repository::get_by_id(id).await
}

pub async fn create(dto: WebhookDto) -> anyhow::Result<Webhook> {
    if dto.url.trim().is_empty() {
        anyhow::bail!("Webhook URL must not be empty");
    }
    let now = Utc::now();
    let model = ActiveModel {
        id: NotSet,
        url: Set(dto.url),
        event_type: Set(dto.event_type),
        enabled: Set(dto.enabled),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    };
    repository::insert(model).await
}

pub async fn update(id: i32, dto: WebhookUpdateDto) -> anyhow::Result<Option<Webhook>> {
    let Some(existing) = repository::get_by_id(id).await? else {
        return Ok(None);
    };
    let model = ActiveModel {
        id: Set(existing.id),
        url: Set(dto.url.unwrap_or(existing.url)),
        event_type: Set(dto.event_type.unwrap_or(existing.event_type)),
        enabled: Set(dto.enabled.unwrap_or(existing.enabled)),
        created_at: Set(existing.created_at),
        updated_at: Set(Some(Utc::now())),
    };
    Ok(Some(repository::update(model).await?))
}

pub async fn delete(id: i32) -> anyhow::Result<bool> {
    repository::delete(id).await
}

pub async fn logs(webhook_id: i32, limit: u64) -> anyhow::Result<Vec<WebhookLogEntry>> {
    log_repository::list_for_webhook(webhook_id, limit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::setup_test_db;

    #[tokio::test]
    async fn dispatch_listing_filters_event_and_enabled() {
        setup_test_db().await;

        let a = create(WebhookDto {
            url: "http://example.com/a".to_string(),
            event_type: "svc.filter_test".to_string(),
            enabled: true,
        })
        .await
        .unwrap();
        let b = create(WebhookDto {
            url: "http://example.com/b".to_string(),
            event_type: "svc.filter_test".to_string(),
            enabled: false,
        })
        .await
        .unwrap();
        create(WebhookDto {
            url: "http://example.com/c".to_string(),
            event_type: "svc.other_event".to_string(),
            enabled: true,
        })
        .await
        .unwrap();

        let hooks = list_enabled_for_event("svc.filter_test").await.unwrap();
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].id, a.id);

        // Re-enabling brings the second one back into dispatch scope
        update(
            b.id,
            WebhookUpdateDto {
                enabled: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let hooks = list_enabled_for_event("svc.filter_test").await.unwrap();
        assert_eq!(hooks.len(), 2);
    }
}
