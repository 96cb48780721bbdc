pub mod api;
pub mod db;
pub mod devserver;
pub mod error;
pub mod http;
pub mod logging;
pub mod router;
pub mod settings;
pub mod store;
pub mod upload_manager;

pub use error::{ApiError, ApiResult, StorageError, StorageResult};
