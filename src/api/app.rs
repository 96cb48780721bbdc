//! 面向 UI 宿主的入口：启动时构建唯一的应用上下文，界面动作都经由这里。

use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::{mpsc::Receiver, Arc};

use super::upload::{FileListPage, FileListQuery, LocalFile, UploadApi, UploadStats};
use super::user::UserApi;
use crate::db::SettingsDb;
use crate::error::ApiResult;
use crate::http::{ApiClient, ClientOptions, ReqwestTransport, SettingsTokenSource, Toast, ToastCenter};
use crate::logging::{init_logging, DEFAULT_LOG_LEVEL};
use crate::router::{Page, Router};
use crate::settings;
use crate::store::AppStore;
use crate::upload_manager::{
    core::DEFAULT_UPLOAD_CONCURRENCY, UploadEvent, UploadManager, UploadMode, UploadQueueState,
};

static APP_CONTEXT: OnceCell<AppContext> = OnceCell::new();

/// 进程内唯一的一组客户端、接口模块与状态。
#[derive(Clone)]
pub struct AppContext {
    pub db: SettingsDb,
    pub client: ApiClient,
    pub uploads: UploadApi,
    pub users: UserApi,
    pub store: AppStore,
    pub toasts: ToastCenter,
    pub manager: UploadManager,
    pub router: Router,
}

impl AppContext {
    /// 后端地址与默认超时在构建时从设置表读取，修改后需重新启动才生效。
    pub fn build(db: SettingsDb) -> Result<Self, String> {
        db.init().map_err(|e| e.to_string())?;
        let options = ClientOptions {
            origin: settings::get_api_origin(&db).map_err(|e| e.to_string())?,
            default_timeout: settings::get_request_timeout(&db).map_err(|e| e.to_string())?,
            ..ClientOptions::default()
        };
        let transport = ReqwestTransport::new().map_err(|e| e.to_string())?;
        let toasts = ToastCenter::new();
        let client = ApiClient::new(
            options,
            Arc::new(transport),
            Arc::new(SettingsTokenSource::new(db.clone())),
            Arc::new(toasts.clone()),
        );

        let uploads = UploadApi::new(client.clone());
        let store = AppStore::new();
        let manager = UploadManager::new(uploads.clone(), store.clone(), DEFAULT_UPLOAD_CONCURRENCY);
        Ok(Self {
            db,
            users: UserApi::new(client.clone()),
            client,
            uploads,
            store,
            toasts,
            manager,
            router: Router::new(),
        })
    }

    pub fn shared() -> Result<&'static AppContext, String> {
        APP_CONTEXT.get_or_try_init(|| {
            let db = SettingsDb::open_default().map_err(|e| e.to_string())?;
            AppContext::build(db)
        })
    }
}

#[flutter_rust_bridge::frb]
pub fn init_app(log_level: Option<String>) -> Result<(), String> {
    init_logging(log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
    let context = AppContext::shared()?;
    tracing::info!(database = %context.db.path().display(), "file admin client ready");
    Ok(())
}

#[flutter_rust_bridge::frb]
pub fn set_auth_token(token: String) -> Result<(), String> {
    settings::set_token(&AppContext::shared()?.db, &token).map_err(|e| e.to_string())
}

#[flutter_rust_bridge::frb]
pub fn clear_auth_token() -> Result<(), String> {
    settings::clear_token(&AppContext::shared()?.db).map_err(|e| e.to_string())
}

#[flutter_rust_bridge::frb]
pub fn set_api_origin(origin: String) -> Result<String, String> {
    settings::set_api_origin(&AppContext::shared()?.db, &origin).map_err(|e| e.to_string())
}

/// 以智能上传方式排队本地文件，返回任务 id。
#[flutter_rust_bridge::frb]
pub fn enqueue_smart_upload(path: String) -> Result<String, String> {
    let file = LocalFile::from_path(&path).map_err(|e| e.to_string())?;
    Ok(AppContext::shared()?.manager.enqueue(file, UploadMode::Smart))
}

#[flutter_rust_bridge::frb]
pub fn enqueue_multipart_upload(path: String) -> Result<String, String> {
    let file = LocalFile::from_path(&path).map_err(|e| e.to_string())?;
    Ok(AppContext::shared()?.manager.enqueue(file, UploadMode::Multipart))
}

#[flutter_rust_bridge::frb]
pub fn upload_queue_state() -> Result<UploadQueueState, String> {
    Ok(AppContext::shared()?.manager.snapshot())
}

/// 供 Rust 侧宿主直接订阅；桥接层拿不到 `Receiver`。
#[flutter_rust_bridge::frb(ignore)]
pub fn upload_events() -> Result<Receiver<UploadEvent>, String> {
    Ok(AppContext::shared()?.manager.subscribe())
}

#[flutter_rust_bridge::frb(ignore)]
pub fn toast_stream() -> Result<Receiver<Toast>, String> {
    Ok(AppContext::shared()?.toasts.subscribe())
}

#[flutter_rust_bridge::frb]
pub fn upload_progress() -> Result<Vec<(String, u8)>, String> {
    Ok(AppContext::shared()?
        .store
        .upload_progress()
        .into_iter()
        .collect())
}

/// 刷新并返回文件列表；失败时为空列表。
#[flutter_rust_bridge::frb]
pub fn refresh_file_list(
    page: Option<u32>,
    page_size: Option<u32>,
    keyword: Option<String>,
) -> Result<FileListPage, String> {
    let query = FileListQuery {
        page,
        page_size,
        keyword,
        ..Default::default()
    };
    Ok(AppContext::shared()?.manager.refresh_file_list(&query))
}

#[flutter_rust_bridge::frb]
pub fn upload_stats() -> Result<UploadStats, String> {
    Ok(AppContext::shared()?.uploads.get_upload_stats())
}

/// 删除文件；file_id 按 JSON 解析，解析不了就当作字符串 id。
#[flutter_rust_bridge::frb]
pub fn delete_file(object_name: String, file_id: String) -> Result<(), String> {
    let id = serde_json::from_str::<Value>(&file_id).unwrap_or(Value::String(file_id));
    AppContext::shared()?
        .manager
        .delete_file(&object_name, id)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[flutter_rust_bridge::frb]
pub fn cleanup_uploads() -> Result<(), String> {
    AppContext::shared()?
        .uploads
        .cleanup_uploads()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[flutter_rust_bridge::frb]
pub fn file_detail(file_id: String) -> Result<String, String> {
    let detail = AppContext::shared()?
        .uploads
        .get_file_detail(&file_id)
        .map_err(|e| e.to_string())?;
    Ok(detail.to_string())
}

/// 用户管理接口：入参与返回值都是 JSON 文本，由界面自行解析。
#[flutter_rust_bridge::frb]
pub fn list_users(params: Vec<(String, String)>) -> Result<String, String> {
    json_reply(AppContext::shared()?.users.list_users(&params))
}

#[flutter_rust_bridge::frb]
pub fn get_user(user_id: String) -> Result<String, String> {
    json_reply(AppContext::shared()?.users.get_user(&user_id))
}

#[flutter_rust_bridge::frb]
pub fn create_user(payload: String) -> Result<String, String> {
    let payload = parse_payload(&payload)?;
    json_reply(AppContext::shared()?.users.create_user(&payload))
}

#[flutter_rust_bridge::frb]
pub fn update_user(user_id: String, payload: String) -> Result<String, String> {
    let payload = parse_payload(&payload)?;
    json_reply(AppContext::shared()?.users.update_user(&user_id, &payload))
}

#[flutter_rust_bridge::frb]
pub fn update_user_status(payload: String) -> Result<String, String> {
    let payload = parse_payload(&payload)?;
    json_reply(AppContext::shared()?.users.update_user_status(&payload))
}

#[flutter_rust_bridge::frb]
pub fn real_name_verify(payload: String) -> Result<String, String> {
    let payload = parse_payload(&payload)?;
    json_reply(AppContext::shared()?.users.real_name_verify(&payload))
}

#[flutter_rust_bridge::frb]
pub fn delete_user(user_id: String) -> Result<String, String> {
    json_reply(AppContext::shared()?.users.delete_user(&user_id))
}

fn parse_payload(payload: &str) -> Result<Value, String> {
    serde_json::from_str(payload).map_err(|e| format!("请求数据不是合法的 JSON: {e}"))
}

fn json_reply(result: ApiResult<Value>) -> Result<String, String> {
    result.map(|value| value.to_string()).map_err(|e| e.to_string())
}

#[flutter_rust_bridge::frb]
pub fn resolve_route(path: String) -> Result<Option<Page>, String> {
    Ok(AppContext::shared()?.router.resolve(&path).map(|r| r.page.page))
}
