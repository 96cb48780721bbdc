use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UploadMode {
    /// JSON 字节数组上传。
    Smart,
    /// multipart 表单上传。
    Multipart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UploadStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UploadTask {
    pub task_id: String,
    pub file_name: String,
    pub size: u64,
    pub mode: UploadMode,
    pub status: UploadStatus,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub error_message: Option<String>,
    pub response: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UploadQueueState {
    pub active: Vec<UploadTask>,
    pub completed: Vec<UploadTask>,
    pub failed: Vec<UploadTask>,
}

/// 任务结束时广播给订阅者。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum UploadEvent {
    Progress { task_id: String, file_name: String, percent: u8 },
    Completed { task_id: String, file_name: String },
    Failed { task_id: String, file_name: String, message: String },
}
