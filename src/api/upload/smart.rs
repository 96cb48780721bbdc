use serde_json::Value;
use tracing::info;

use super::{
    models::{LocalFile, SmartUploadPayload},
    UploadApi,
};
use crate::error::ApiResult;
use crate::http::{ApiRequest, MultipartBody, ProgressFn};

const FILE_FIELD: &str = "file";
const UPLOAD_ID_FIELD: &str = "uploadID";

impl UploadApi {
    /// 智能上传：整个文件以字节数组形式放进 JSON 请求体。
    pub fn smart_upload(&self, file: &LocalFile, on_progress: Option<ProgressFn>) -> ApiResult<Value> {
        let payload = serde_json::to_value(SmartUploadPayload {
            filename: &file.name,
            content_type: &file.content_type,
            file_data: &file.bytes,
        })?;
        info!(file = %file.name, size = file.size(), "starting smart upload");

        self.client.send(
            ApiRequest::post("/upload/smart")
                .json(payload)
                .timeout(self.client.upload_timeout())
                .on_progress(on_progress),
        )
    }

    /// 直接以 multipart 表单上传。
    pub fn upload_file(&self, file: &LocalFile, on_progress: Option<ProgressFn>) -> ApiResult<Value> {
        info!(file = %file.name, size = file.size(), "starting multipart upload");
        self.client.send(
            ApiRequest::post("/upload/file")
                .multipart(file_form(file, Vec::new()))
                .timeout(self.client.upload_timeout())
                .on_progress(on_progress),
        )
    }

    /// 带会话号的 multipart 上传，后端据 uploadID 关联同一次上传。
    pub fn upload_with_session(
        &self,
        file: &LocalFile,
        upload_id: Option<&str>,
        on_progress: Option<ProgressFn>,
    ) -> ApiResult<Value> {
        let fields = upload_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| vec![(UPLOAD_ID_FIELD.to_string(), id.to_string())])
            .unwrap_or_default();
        self.client.send(
            ApiRequest::post("/upload")
                .multipart(file_form(file, fields))
                .timeout(self.client.upload_timeout())
                .on_progress(on_progress),
        )
    }
}

fn file_form(file: &LocalFile, text_fields: Vec<(String, String)>) -> MultipartBody {
    MultipartBody {
        text_fields,
        file_field: FILE_FIELD.to_string(),
        file_name: file.name.clone(),
        content_type: file.content_type.clone(),
        bytes: file.bytes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{ok, status, RecordedBody, RecordingNotifier, ScriptedTransport};
    use crate::http::{ApiClient, ClientOptions, StaticToken, UPLOAD_TIMEOUT};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn api(transport: &Arc<ScriptedTransport>) -> (UploadApi, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let client = ApiClient::new(
            ClientOptions::default(),
            transport.clone(),
            Arc::new(StaticToken(Some("tok".into()))),
            notifier.clone(),
        );
        (UploadApi::new(client), notifier)
    }

    #[test]
    fn smart_upload_posts_byte_array_json() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(json!({"id": 5, "name": "a.txt"}))]));
        let (api, _) = api(&transport);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let file = LocalFile::new("a.txt", None, vec![104, 105]);
        let result = api
            .smart_upload(
                &file,
                Some(Box::new(move |sent: u64, total: Option<u64>| sink.lock().unwrap().push((sent, total)))),
            )
            .unwrap();

        assert_eq!(result, json!({"id": 5, "name": "a.txt"}));
        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://localhost:8001/api/upload/smart");
        assert_eq!(request.timeout, UPLOAD_TIMEOUT);
        assert_eq!(
            request.body,
            RecordedBody::Json(json!({
                "filename": "a.txt",
                "content_type": "text/plain",
                "file_data": [104, 105]
            }))
        );
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn upload_with_session_sends_upload_id_field() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(json!({})), ok(json!({}))]));
        let (api, _) = api(&transport);
        let file = LocalFile::new("b.bin", None, vec![0; 16]);

        api.upload_with_session(&file, Some("u-1"), None).unwrap();
        api.upload_with_session(&file, Some(" "), None).unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://localhost:8001/api/upload");
        assert_eq!(
            requests[0].body,
            RecordedBody::Multipart {
                text_fields: vec![("uploadID".to_string(), "u-1".to_string())],
                file_field: "file".to_string(),
                file_name: "b.bin".to_string(),
                content_type: "application/octet-stream".to_string(),
                len: 16,
            }
        );
        assert!(matches!(
            &requests[1].body,
            RecordedBody::Multipart { text_fields, .. } if text_fields.is_empty()
        ));
    }

    #[test]
    fn upload_failures_propagate() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(
            413,
            "Payload Too Large",
            json!({}),
        )]));
        let (api, notifier) = api(&transport);
        let file = LocalFile::new("big.zip", None, vec![1; 4]);

        let err = api.upload_file(&file, None).unwrap_err();
        assert_eq!(err.to_string(), "Payload Too Large");
        assert_eq!(notifier.messages(), vec!["Payload Too Large"]);
        assert_eq!(transport.requests()[0].url, "http://localhost:8001/api/upload/file");
    }
}
