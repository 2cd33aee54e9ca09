pub mod csv_import;
pub mod webhook_dispatch;
