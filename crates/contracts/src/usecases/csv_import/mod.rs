pub mod events;
pub mod progress;
pub mod response;

pub use events::ImportEvent;
pub use progress::{ImportStatus, ImportTask};
pub use response::{ProgressResponse, UploadResponse};
