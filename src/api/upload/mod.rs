mod list;
mod manage;
mod models;
mod smart;
mod stats;

pub use models::{FileListItem, FileListPage, FileListQuery, LocalFile, UploadStats};

use crate::http::ApiClient;

/// 上传相关接口。列表与统计失败时降级为空结果，其余接口把错误交给调用方。
#[derive(Clone)]
pub struct UploadApi {
    client: ApiClient,
}

impl UploadApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}
