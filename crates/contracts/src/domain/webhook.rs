use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered webhook subscription. Consumed read-only by the dispatcher
/// when an event fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: i32,
    pub url: String,
    /// Event this webhook subscribes to, e.g. "import.completed"
    pub event_type: String,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDto {
    pub url: String,
    pub event_type: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookUpdateDto {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// One recorded delivery attempt, kept for troubleshooting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookLogEntry {
    pub id: i32,
    pub webhook_id: i32,
    pub event_type: String,
    pub status_code: Option<i32>,
    pub response_body: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
