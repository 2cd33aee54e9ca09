pub mod error;
pub mod executor;
pub mod progress_tracker;
pub mod row_parser;

pub use error::{ImportError, RowError};
pub use executor::ImportExecutor;
pub use progress_tracker::{ProgressTracker, RowOutcome};
pub use row_parser::RowParser;
