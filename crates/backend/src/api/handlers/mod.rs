pub mod products;
pub mod upload;
pub mod webhooks;
