use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::envelope::{self, NO_RESPONSE_MESSAGE, UNKNOWN_ERROR_MESSAGE};
use super::notify::{Notifier, Toast};
use super::token::TokenSource;
use super::transport::{
    Method, MultipartBody, PreparedRequest, ProgressFn, RawResponse, RequestBody, Transport,
    TransportError,
};
use crate::error::{ApiError, ApiResult};
use crate::settings::DEFAULT_API_ORIGIN;

pub const DEFAULT_BASE_PATH: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// 上传接口单独使用的长超时，容忍大文件。
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub origin: String,
    pub base_path: String,
    pub default_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            origin: DEFAULT_API_ORIGIN.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            upload_timeout: UPLOAD_TIMEOUT,
        }
    }
}

/// 一次接口调用；path 相对于客户端的 base path。
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    timeout: Option<Duration>,
    progress: Option<ProgressFn>,
    keep_envelope: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            method,
            path,
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
            progress: None,
            keep_envelope: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_progress(mut self, progress: Option<ProgressFn>) -> Self {
        self.progress = progress;
        self
    }

    /// 成功时返回整个信封而不是 `data`，失败判定与提示不变。
    pub fn keep_envelope(mut self) -> Self {
        self.keep_envelope = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// 所有出站请求共用的客户端：拼接地址、注入 token、解释响应并在失败时提示用户。
#[derive(Clone)]
pub struct ApiClient {
    options: ClientOptions,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenSource>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        options: ClientOptions,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            options,
            transport,
            tokens,
            notifier,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn upload_timeout(&self) -> Duration {
        self.options.upload_timeout
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.options.origin.trim_end_matches('/'),
            self.options.base_path.trim_end_matches('/'),
            path
        )
    }

    pub fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        let ApiRequest {
            method,
            path,
            query,
            body,
            timeout,
            progress,
            keep_envelope,
        } = request;

        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = self.tokens.token().filter(|t| !t.trim().is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let prepared = PreparedRequest {
            method,
            url: self.url_for(&path),
            query,
            headers,
            body,
            timeout: timeout.unwrap_or(self.options.default_timeout),
            progress,
        };
        debug!(?method, url = %prepared.url, "sending api request");

        match self.transport.execute(prepared) {
            Ok(response) => self.handle_response(&path, response, keep_envelope),
            Err(err) => Err(self.handle_transport_error(&path, err)),
        }
    }

    pub fn get(&self, path: &str, query: Vec<(String, String)>) -> ApiResult<Value> {
        self.send(ApiRequest::get(path).query(query))
    }

    pub fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ApiResult<Value> {
        self.send(ApiRequest::post(path).json(serde_json::to_value(body)?))
    }

    pub fn post_empty(&self, path: &str) -> ApiResult<Value> {
        self.send(ApiRequest::post(path))
    }

    pub fn put_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ApiResult<Value> {
        self.send(ApiRequest::put(path).json(serde_json::to_value(body)?))
    }

    pub fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send(ApiRequest::delete(path))
    }

    fn handle_response(
        &self,
        path: &str,
        response: RawResponse,
        keep_envelope: bool,
    ) -> ApiResult<Value> {
        if !(200..300).contains(&response.status) {
            let message =
                envelope::status_error_message(response.status, &response.status_text, &response.body);
            warn!(%path, status = response.status, %message, "api request failed with status");
            self.notifier.notify(Toast::error(message.clone()));
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        let outcome = if keep_envelope && !envelope::bypasses_envelope(path) {
            envelope::check_envelope(response.body)
        } else {
            envelope::unwrap_body(path, response.body)
        };
        outcome.map_err(|rejection| {
            warn!(%path, code = %rejection.code, message = %rejection.message, "api request rejected");
            self.notifier.notify(Toast::error(rejection.message.clone()));
            ApiError::Business {
                code: rejection.code,
                message: rejection.message,
            }
        })
    }

    fn handle_transport_error(&self, path: &str, err: TransportError) -> ApiError {
        let error = match err {
            TransportError::NoResponse(cause) => {
                warn!(%path, %cause, "no response from server");
                ApiError::NoResponse(NO_RESPONSE_MESSAGE.to_string())
            }
            TransportError::Build(cause) => {
                warn!(%path, %cause, "failed to build request");
                let message = if cause.trim().is_empty() {
                    UNKNOWN_ERROR_MESSAGE.to_string()
                } else {
                    cause
                };
                ApiError::Request(message)
            }
        };
        self.notifier.notify(Toast::error(error.to_string()));
        error
    }
}
