use reqwest::blocking::{
    multipart::{Form, Part},
    Body, Client,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::io::{Cursor, Read};
use std::time::Duration;
use thiserror::Error;

use super::envelope::decode_body;

/// 上传进度回调：(已发送字节数, 总字节数)。
pub type ProgressFn = Box<dyn FnMut(u64, Option<u64>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// multipart 表单：若干文本字段加一个文件字段。
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub text_fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

/// 已经拼好绝对 URL 与请求头、可直接交给传输层的请求。
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub timeout: Duration,
    pub progress: Option<ProgressFn>,
}

/// 服务端给出的任意响应（含非 2xx），body 已解码为 JSON。
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// 请求已发出但没有收到响应。
    #[error("no response: {0}")]
    NoResponse(String),
    /// 请求本身构造失败，没有发出。
    #[error("{0}")]
    Build(String),
}

/// 出站 HTTP 的唯一接缝；生产实现基于 reqwest，测试中替换为脚本化实现。
pub trait Transport: Send + Sync {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportError>;
}

/// 构建一个带有重定向策略的阻塞式 HTTP 客户端，超时由每个请求单独指定。
pub(crate) fn build_blocking_client() -> Result<Client, TransportError> {
    Client::builder()
        .redirect(Policy::limited(10))
        .build()
        .map_err(|e| TransportError::Build(format!("failed to build HTTP client: {e}")))
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            client: build_blocking_client()?,
        })
    }
}

impl Transport for ReqwestTransport {
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

        let mut builder = self.client.request(method.into(), url).timeout(timeout);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| TransportError::Build(format!("failed to encode body: {e}")))?;
                let total = bytes.len() as u64;
                let reader = ProgressReader::new(Cursor::new(bytes), total, progress);
                builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::sized(reader, total))
            }
            RequestBody::Multipart(multipart) => {
                let total = multipart.bytes.len() as u64;
                let reader = ProgressReader::new(Cursor::new(multipart.bytes), total, progress);
                let file_part = Part::reader_with_length(reader, total)
                    .file_name(multipart.file_name)
                    .mime_str(&multipart.content_type)
                    .map_err(|e| TransportError::Build(format!("invalid content type: {e}")))?;
                let form = multipart
                    .text_fields
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value))
                    .part(multipart.file_field, file_part);
                builder.multipart(form)
            }
        };

        let response = builder.send().map_err(classify_send_error)?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let bytes = response
            .bytes()
            .map_err(|e| TransportError::NoResponse(format!("failed to read response body: {e}")))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            body: decode_body(&bytes),
        })
    }
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Build(err.to_string())
    } else {
        TransportError::NoResponse(err.to_string())
    }
}

/// 负责对上传请求体做进度回调的 Reader。
struct ProgressReader<R: Read> {
    inner: R,
    sent: u64,
    total: u64,
    progress: Option<ProgressFn>,
}

impl<R: Read> ProgressReader<R> {
    fn new(inner: R, total: u64, progress: Option<ProgressFn>) -> Self {
        Self {
            inner,
            sent: 0,
            total,
            progress,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read_bytes = self.inner.read(buf)?;
        if read_bytes > 0 {
            self.sent = self.sent.saturating_add(read_bytes as u64);
            if let Some(cb) = self.progress.as_mut() {
                cb(self.sent, Some(self.total));
            }
        }
        Ok(read_bytes)
    }
}
