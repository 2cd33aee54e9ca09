use serde::{Deserialize, Serialize};

/// Body of POST /api/webhooks/:id/test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookTestRequest {
    pub event_type: String,
}

/// Outcome of a single delivery attempt. Returned synchronously to the
/// caller of a test delivery; not persisted beyond the webhook log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDeliveryResult {
    pub webhook_id: Option<i32>,
    pub success: bool,
    pub status_code: Option<u16>,
    pub response_body: Option<String>,
    pub error_message: Option<String>,
    pub response_time_ms: u64,
}

impl WebhookDeliveryResult {
    pub fn succeeded(status_code: u16, response_body: String, response_time_ms: u64) -> Self {
        Self {
            webhook_id: None,
            success: (200..300).contains(&status_code),
            status_code: Some(status_code),
            response_body: Some(response_body),
            error_message: None,
            response_time_ms,
        }
    }

    pub fn failed(error_message: String, response_time_ms: u64) -> Self {
        Self {
            webhook_id: None,
            success: false,
            status_code: None,
            response_body: None,
            error_message: Some(error_message),
            response_time_ms,
        }
    }
}
