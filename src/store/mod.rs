//! 内存中的全局状态：上传进度与文件列表。
//!
//! 所有修改都经过 [`AppStore::commit`]；动作方法只是对应 mutation 的薄封装。
//! 不持久化，也不做并发协调，最后一次写入生效。

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::trace;

use crate::api::upload::FileListItem;
use crate::http::recover_lock;

pub const MAX_PROGRESS: u8 = 100;

#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    SetUploadProgress { file_name: String, progress: u8 },
    ClearUploadProgress(String),
    SetFileList(Vec<FileListItem>),
    /// 新文件插入列表头部。
    AddFile(FileListItem),
    /// 按 `id` 字段的 JSON 相等性移除。
    RemoveFile(Value),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreState {
    pub upload_progress: BTreeMap<String, u8>,
    pub file_list: Vec<FileListItem>,
}

impl StoreState {
    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetUploadProgress {
                file_name,
                progress,
            } => {
                self.upload_progress
                    .insert(file_name, progress.min(MAX_PROGRESS));
            }
            Mutation::ClearUploadProgress(file_name) => {
                self.upload_progress.remove(&file_name);
            }
            Mutation::SetFileList(list) => self.file_list = list,
            Mutation::AddFile(file) => self.file_list.insert(0, file),
            Mutation::RemoveFile(id) => self.file_list.retain(|file| file.id() != Some(&id)),
        }
    }
}

/// 可克隆的状态句柄，所有克隆共享同一份状态。
#[derive(Clone, Default)]
pub struct AppStore {
    state: Arc<Mutex<StoreState>>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&self, mutation: Mutation) {
        trace!(?mutation, "store commit");
        recover_lock(&self.state).apply(mutation);
    }

    pub fn upload_progress(&self) -> BTreeMap<String, u8> {
        recover_lock(&self.state).upload_progress.clone()
    }

    pub fn file_list(&self) -> Vec<FileListItem> {
        recover_lock(&self.state).file_list.clone()
    }

    pub fn snapshot(&self) -> StoreState {
        recover_lock(&self.state).clone()
    }

    pub fn update_upload_progress(&self, file_name: impl Into<String>, progress: u8) {
        self.commit(Mutation::SetUploadProgress {
            file_name: file_name.into(),
            progress,
        });
    }

    pub fn clear_upload_progress(&self, file_name: impl Into<String>) {
        self.commit(Mutation::ClearUploadProgress(file_name.into()));
    }

    pub fn set_file_list(&self, list: Vec<FileListItem>) {
        self.commit(Mutation::SetFileList(list));
    }

    pub fn add_file(&self, file: FileListItem) {
        self.commit(Mutation::AddFile(file));
    }

    pub fn remove_file(&self, id: impl Into<Value>) {
        self.commit(Mutation::RemoveFile(id.into()));
    }
}
