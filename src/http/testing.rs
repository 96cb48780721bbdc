//! 测试用的脚本化传输层与记录型通知器。

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::notify::{recover_lock, Notifier, Toast};
use super::transport::{
    Method, PreparedRequest, RawResponse, RequestBody, Transport, TransportError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedBody {
    Empty,
    Json(Value),
    Multipart {
        text_fields: Vec<(String, String)>,
        file_field: String,
        file_name: String,
        content_type: String,
        len: usize,
    },
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RecordedBody,
    pub timeout: Duration,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// 按顺序返回预设结果；脚本耗尽后返回无响应错误。
/// 带进度回调的请求会收到一次“全部发送完毕”的回调。
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<RawResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        recover_lock(&self.requests).clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let PreparedRequest {
            method,
            url,
            query,
            headers,
            body,
            timeout,
            progress,
        } = request;

        let (recorded, len) = match body {
            RequestBody::Empty => (RecordedBody::Empty, 0),
            RequestBody::Json(value) => {
                let len = serde_json::to_vec(&value).map(|b| b.len()).unwrap_or(0);
                (RecordedBody::Json(value), len)
            }
            RequestBody::Multipart(m) => {
                let len = m.bytes.len();
                (
                    RecordedBody::Multipart {
                        text_fields: m.text_fields,
                        file_field: m.file_field,
                        file_name: m.file_name,
                        content_type: m.content_type,
                        len,
                    },
                    len,
                )
            }
        };

        if let Some(mut cb) = progress {
            cb(len as u64, Some(len as u64));
        }

        recover_lock(&self.requests).push(RecordedRequest {
            method,
            url,
            query,
            headers,
            body: recorded,
            timeout,
        });

        recover_lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::NoResponse("script exhausted".to_string())))
    }
}

pub fn ok(body: Value) -> RawResponse {
    status(200, "OK", body)
}

pub fn status(code: u16, text: &str, body: Value) -> RawResponse {
    RawResponse {
        status: code,
        status_text: text.to_string(),
        body,
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        recover_lock(&self.toasts)
            .iter()
            .map(|t| t.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        recover_lock(&self.toasts).push(toast);
    }
}
