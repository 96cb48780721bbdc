use serde::Serialize;
use std::sync::{
    mpsc::{self, Receiver, SyncSender, TrySendError},
    Arc, Mutex,
};
use std::time::{SystemTime, UNIX_EPOCH};

const TOAST_CHANNEL_CAP: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Error,
}

/// 一条短暂展示的提示消息。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub timestamp_millis: i64,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
            timestamp_millis: current_timestamp(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
            timestamp_millis: current_timestamp(),
        }
    }
}

/// 面向用户的提示出口。客户端在每次失败时恰好调用一次。
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// 只写日志的实现，没有 UI 时使用。
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => tracing::warn!(toast = %toast.message, "error notification"),
            ToastLevel::Info => tracing::info!(toast = %toast.message, "info notification"),
        }
    }
}

/// 把提示广播给所有订阅的 UI 通道；接收端断开后自动清理。
#[derive(Clone, Default)]
pub struct ToastCenter {
    subscribers: Arc<Mutex<Vec<SyncSender<Toast>>>>,
}

impl ToastCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<Toast> {
        let (tx, rx) = mpsc::sync_channel(TOAST_CHANNEL_CAP);
        recover_lock(&self.subscribers).push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        recover_lock(&self.subscribers).len()
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, toast: Toast) {
        TracingNotifier.notify(toast.clone());
        let mut subs = recover_lock(&self.subscribers);
        subs.retain_mut(|sender| match sender.try_send(toast.clone()) {
            Ok(_) => true,
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

pub(crate) fn recover_lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(g) => g,
        Err(poison) => poison.into_inner(),
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or_default()
}
