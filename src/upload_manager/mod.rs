pub mod core;
mod models;

pub use self::core::UploadManager;
pub use models::{UploadEvent, UploadMode, UploadQueueState, UploadStatus, UploadTask};
