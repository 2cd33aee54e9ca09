pub mod product;
pub mod webhook;
