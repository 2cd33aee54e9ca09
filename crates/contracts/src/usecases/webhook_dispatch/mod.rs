pub mod delivery;

pub use delivery::{WebhookDeliveryResult, WebhookTestRequest};
