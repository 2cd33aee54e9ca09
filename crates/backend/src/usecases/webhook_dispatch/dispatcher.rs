use std::time::Instant;

use contracts::usecases::csv_import::ImportEvent;
use contracts::usecases::webhook_dispatch::WebhookDeliveryResult;
use serde_json::json;
use tokio::sync::mpsc;

use crate::domain::webhook::{log_repository, service as webhook_service};

/// Delivers event notifications to registered webhook URLs.
///
/// Every attempt is bounded by the client timeout, and per-webhook
/// failures never propagate past the log: a dead endpoint cannot fail an
/// import or starve other subscribers.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    /// Attempts per delivery. Notifications are fire-and-forget today;
    /// raising this adds bounded retry without changing any caller.
    max_attempts: u32,
}

impl WebhookDispatcher {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            max_attempts: 1,
        }
    }

    /// Consume terminal import events and fan them out. Runs until the
    /// sender side is closed.
    pub async fn run(&self, mut events: mpsc::Receiver<ImportEvent>) {
        while let Some(event) = events.recv().await {
            let payload = match &event {
                ImportEvent::Completed {
                    task_id,
                    created,
                    updated,
                    failed,
                } => json!({
                    "task_id": task_id,
                    "created": created,
                    "updated": updated,
                    "failed": failed,
                }),
                ImportEvent::Failed {
                    task_id,
                    error_message,
                } => json!({
                    "task_id": task_id,
                    "error": error_message,
                }),
            };
            self.notify(event.event_type(), &payload).await;
        }
    }

    /// Deliver an event to every enabled webhook subscribed to it.
    /// Failures are logged per webhook and swallowed.
    pub async fn notify(&self, event_type: &str, payload: &serde_json::Value) {
        let webhooks = match webhook_service::list_enabled_for_event(event_type).await {
            Ok(webhooks) => webhooks,
            Err(e) => {
                tracing::error!("Failed to load webhooks for {}: {}", event_type, e);
                return;
            }
        };

        for webhook in webhooks {
            let result = self.deliver(&webhook.url, event_type, payload).await;
            if result.success {
                tracing::info!(
                    "Webhook {} notified for {}: {:?}",
                    webhook.id,
                    event_type,
                    result.status_code
                );
            } else {
                tracing::warn!(
                    "Webhook {} delivery for {} failed: {}",
                    webhook.id,
                    event_type,
                    result
                        .error_message
                        .as_deref()
                        .unwrap_or("non-2xx response")
                );
            }
            if let Err(e) = log_repository::record_attempt(
                webhook.id,
                event_type,
                result.status_code,
                result.response_body.as_deref(),
                result.error_message.as_deref(),
            )
            .await
            {
                tracing::error!("Failed to log webhook {} attempt: {}", webhook.id, e);
            }
        }
    }

    /// Single synchronous delivery to one webhook, for the test endpoint.
    /// Returns `None` when the webhook does not exist. Import task state
    /// is never touched.
    pub async fn test(
        &self,
        webhook_id: i32,
        event_type: &str,
    ) -> anyhow::Result<Option<WebhookDeliveryResult>> {
        let Some(webhook) = webhook_service::get_by_id(webhook_id).await? else {
            return Ok(None);
        };

        let payload = json!({ "test": true, "event_type": event_type });
        let mut result = self.deliver(&webhook.url, event_type, &payload).await;
        result.webhook_id = Some(webhook.id);

        if let Err(e) = log_repository::record_attempt(
            webhook.id,
            event_type,
            result.status_code,
            result.response_body.as_deref(),
            result.error_message.as_deref(),
        )
        .await
        {
            tracing::error!("Failed to log webhook {} test: {}", webhook.id, e);
        }

        Ok(Some(result))
    }

    /// One HTTP delivery: POST with `{"event": ..., "data": ...}` body and
    /// an `X-Webhook-Event` header. A response of any status ends the
    /// attempt loop; only transport errors are retried.
    pub async fn deliver(
        &self,
        url: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> WebhookDeliveryResult {
        let started = Instant::now();
        let body = json!({ "event": event_type, "data": payload });

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match self
                .client
                .post(url)
                .header("X-Webhook-Event", event_type)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => {
                    let status_code = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    return WebhookDeliveryResult::succeeded(
                        status_code,
                        text,
                        started.elapsed().as_millis() as u64,
                    );
                }
                Err(e) => {
                    if attempt < self.max_attempts {
                        continue;
                    }
                    last_error = Some(e.to_string());
                }
            }
        }

        WebhookDeliveryResult::failed(
            last_error.unwrap_or_else(|| "Webhook request failed".to_string()),
            started.elapsed().as_millis() as u64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_url_reports_failure_without_panicking() {
        let dispatcher = WebhookDispatcher::new(2);
        let result = dispatcher
            .deliver(
                "http://127.0.0.1:9/hook",
                "webhook.test",
                &json!({"test": true}),
            )
            .await;

        assert!(!result.success);
        assert!(result.status_code.is_none());
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn delivery_to_live_endpoint_succeeds() {
        use axum::{routing::post, Router};

        let app = Router::new().route("/hook", post(|| async { "ok" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let dispatcher = WebhookDispatcher::new(5);
        let result = dispatcher
            .deliver(
                &format!("http://{}/hook", addr),
                "import.completed",
                &json!({"task_id": "t1"}),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.response_body.as_deref(), Some("ok"));
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn non_2xx_response_is_not_a_success() {
        use axum::{http::StatusCode, routing::post, Router};

        let app = Router::new().route(
            "/hook",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let dispatcher = WebhookDispatcher::new(5);
        let result = dispatcher
            .deliver(
                &format!("http://{}/hook", addr),
                "import.completed",
                &json!({}),
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.status_code, Some(500));
        assert_eq!(result.response_body.as_deref(), Some("boom"));
    }
}
