use thiserror::Error;

/// 接口调用失败的分类。Display 文本即展示给用户的提示语。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 服务端返回了非 2xx 状态码。
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 响应信封中的 code 非 0。
    #[error("{message}")]
    Business { code: serde_json::Value, message: String },

    /// 请求已发出但没有收到响应（超时、断网等）。
    #[error("{0}")]
    NoResponse(String),

    /// 请求在发出前就构造失败。
    #[error("{0}")]
    Request(String),

    #[error("failed to read local file: {0}")]
    Io(String),

    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl From<std::io::Error> for ApiError {
    fn from(value: std::io::Error) -> Self {
        ApiError::Io(value.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Encode(value.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 本地 sqlite 设置存储的错误。
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to resolve application data directory")]
    DataDir,

    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid setting {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
