use super::models::{UploadEvent, UploadMode, UploadQueueState, UploadStatus, UploadTask};
use crate::api::upload::{FileListPage, FileListQuery, LocalFile, UploadApi};
use crate::error::ApiResult;
use crate::http::{envelope, recover_lock, ProgressFn};
use crate::store::AppStore;
use serde_json::Value;
use std::{
    sync::{
        mpsc::{self, Receiver, SyncSender, TrySendError},
        Arc, Condvar, Mutex,
    },
    thread,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{error, info};
use uuid::Uuid;

const EVENT_CHANNEL_CAP: usize = 64;
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 2;

/// 在后台线程执行上传，并把进度与结果同步到 store。
///
/// 生命周期：开始时进度记为 0，回调中按百分比更新；成功后把返回的文件
/// 记录插到列表头部；无论成败最终都清除该文件的进度条目。
#[derive(Clone)]
pub struct UploadManager {
    api: UploadApi,
    store: AppStore,
    state: Arc<Mutex<InnerState>>,
    subscribers: Arc<Mutex<Vec<SyncSender<UploadEvent>>>>,
    concurrency_guard: Arc<Semaphore>,
}

#[derive(Clone, Default)]
struct InnerState {
    active: Vec<UploadTask>,
    completed: Vec<UploadTask>,
    failed: Vec<UploadTask>,
}

impl UploadManager {
    pub fn new(api: UploadApi, store: AppStore, concurrency: usize) -> Self {
        Self {
            api,
            store,
            state: Arc::new(Mutex::new(InnerState::default())),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            concurrency_guard: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// 排队一个上传任务并立即返回任务 id。
    pub fn enqueue(&self, file: LocalFile, mode: UploadMode) -> String {
        let task_id = Uuid::new_v4().to_string();
        let task = UploadTask {
            task_id: task_id.clone(),
            file_name: file.name.clone(),
            size: file.size(),
            mode,
            status: UploadStatus::InProgress,
            started_at: current_timestamp(),
            completed_at: None,
            error_message: None,
            response: None,
        };
        recover_lock(&self.state).active.push(task);
        self.store.update_upload_progress(file.name.clone(), 0);
        info!(%task_id, file = %file.name, ?mode, "upload queued");

        let manager = self.clone();
        let worker_task_id = task_id.clone();
        thread::spawn(move || {
            let _permit = manager.concurrency_guard.acquire();
            let progress = manager.progress_callback(&worker_task_id, &file.name);
            let result = match mode {
                UploadMode::Smart => manager.api.smart_upload(&file, Some(progress)),
                UploadMode::Multipart => manager.api.upload_file(&file, Some(progress)),
            }
            // 上传接口不经过客户端的信封判定，在这里补上
            .and_then(|body| envelope::unwrap_envelope(body).map_err(Into::into));
            match result {
                Ok(response) => manager.mark_success(&worker_task_id, &file.name, response),
                Err(err) => manager.mark_failure(&worker_task_id, &file.name, err.to_string()),
            }
        });

        task_id
    }

    /// 刷新文件列表并整体替换 store 中的列表；失败时得到空列表。
    pub fn refresh_file_list(&self, query: &FileListQuery) -> FileListPage {
        let page = self.api.get_file_list(query);
        self.store.set_file_list(page.list.clone());
        page
    }

    /// 删除成功后才从 store 中移除对应条目。
    pub fn delete_file(&self, object_name: &str, file_id: Value) -> ApiResult<Value> {
        let response = self.api.delete_file(object_name)?;
        self.store.remove_file(file_id);
        Ok(response)
    }

    pub fn snapshot(&self) -> UploadQueueState {
        recover_lock(&self.state).clone().into()
    }

    pub fn clear_history(&self) -> UploadQueueState {
        let mut state = recover_lock(&self.state);
        state.completed.clear();
        state.failed.clear();
        (*state).clone().into()
    }

    pub fn subscribe(&self) -> Receiver<UploadEvent> {
        let (tx, rx) = mpsc::sync_channel(EVENT_CHANNEL_CAP);
        recover_lock(&self.subscribers).push(tx);
        rx
    }

    fn progress_callback(&self, task_id: &str, file_name: &str) -> ProgressFn {
        let manager = self.clone();
        let task_id = task_id.to_string();
        let file_name = file_name.to_string();
        let mut last_percent = None;
        Box::new(move |sent: u64, total: Option<u64>| {
            let percent = percent_of(sent, total);
            if last_percent == Some(percent) {
                return;
            }
            last_percent = Some(percent);
            manager.store.update_upload_progress(file_name.clone(), percent);
            manager.broadcast(UploadEvent::Progress {
                task_id: task_id.clone(),
                file_name: file_name.clone(),
                percent,
            });
        })
    }

    /// response 是信封里的 `data`，只有对象才当作文件记录加入列表。
    fn mark_success(&self, task_id: &str, file_name: &str, response: Value) {
        if response.is_object() {
            self.store.add_file(response.clone().into());
        }
        self.store.clear_upload_progress(file_name);

        let mut state = recover_lock(&self.state);
        if let Some(pos) = state.active.iter().position(|t| t.task_id == task_id) {
            let mut task = state.active.remove(pos);
            task.status = UploadStatus::Completed;
            task.completed_at = Some(current_timestamp());
            task.response = Some(response);
            state.completed.insert(0, task);
        }
        drop(state);

        info!(%task_id, file = %file_name, "upload completed");
        self.broadcast(UploadEvent::Completed {
            task_id: task_id.to_string(),
            file_name: file_name.to_string(),
        });
    }

    fn mark_failure(&self, task_id: &str, file_name: &str, message: String) {
        self.store.clear_upload_progress(file_name);

        let mut state = recover_lock(&self.state);
        if let Some(pos) = state.active.iter().position(|t| t.task_id == task_id) {
            let mut task = state.active.remove(pos);
            task.status = UploadStatus::Failed;
            task.completed_at = Some(current_timestamp());
            task.error_message = Some(message.clone());
            state.failed.insert(0, task);
        }
        drop(state);

        error!(%task_id, file = %file_name, %message, "upload failed");
        self.broadcast(UploadEvent::Failed {
            task_id: task_id.to_string(),
            file_name: file_name.to_string(),
            message,
        });
    }

    fn broadcast(&self, event: UploadEvent) {
        let mut subs = recover_lock(&self.subscribers);
        subs.retain_mut(|sender| match sender.try_send(event.clone()) {
            Ok(_) => true,
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

impl From<InnerState> for UploadQueueState {
    fn from(value: InnerState) -> Self {
        Self {
            active: value.active,
            completed: value.completed,
            failed: value.failed,
        }
    }
}

fn percent_of(sent: u64, total: Option<u64>) -> u8 {
    match total {
        Some(0) | None => 0,
        Some(total) => (u128::from(sent.min(total)) * 100 / u128::from(total)) as u8,
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or_default()
}

struct Semaphore {
    state: Mutex<SemaphoreState>,
    cvar: Condvar,
}

struct SemaphoreState {
    available: usize,
    max: usize,
}

impl Semaphore {
    fn new(max: usize) -> Self {
        Self {
            state: Mutex::new(SemaphoreState {
                available: max,
                max,
            }),
            cvar: Condvar::new(),
        }
    }

    fn acquire(&self) -> SemaphorePermit<'_> {
        let mut state = recover_lock(&self.state);
        while state.available == 0 {
            state = self.cvar.wait(state).unwrap_or_else(|p| p.into_inner());
        }
        state.available -= 1;
        SemaphorePermit { semaphore: self }
    }

    fn release(&self) {
        let mut state = recover_lock(&self.state);
        if state.available < state.max {
            state.available += 1;
            self.cvar.notify_one();
        }
    }
}

struct SemaphorePermit<'a> {
    semaphore: &'a Semaphore,
}

impl<'a> Drop for SemaphorePermit<'a> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}
