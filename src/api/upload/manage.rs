use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::{json, Value};

use super::UploadApi;
use crate::error::ApiResult;

impl UploadApi {
    pub fn delete_file(&self, object_name: &str) -> ApiResult<Value> {
        self.client
            .post_json("/user/deleteFile", &json!({ "objectName": object_name }))
    }

    pub fn get_file_detail(&self, file_id: &str) -> ApiResult<Value> {
        let encoded = utf8_percent_encode(file_id.trim(), NON_ALPHANUMERIC);
        self.client.get(&format!("/file/{encoded}"), Vec::new())
    }

    /// 请求后端清理未完成的上传。
    pub fn cleanup_uploads(&self) -> ApiResult<Value> {
        self.client.post_empty("/upload/cleanup")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{ok, RecordedBody, RecordingNotifier, ScriptedTransport};
    use crate::http::{ApiClient, ClientOptions, Method, StaticToken};
    use std::sync::Arc;

    #[test]
    fn pass_through_endpoints() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok(json!({"code": 0, "data": true})),
            ok(json!({"code": 0, "data": {"id": "a b"}})),
            ok(json!({"removed": 3})),
        ]));
        let api = UploadApi::new(ApiClient::new(
            ClientOptions::default(),
            transport.clone(),
            Arc::new(StaticToken(None)),
            Arc::new(RecordingNotifier::default()),
        ));

        assert_eq!(api.delete_file("2024/a.txt").unwrap(), json!(true));
        assert_eq!(api.get_file_detail("a b").unwrap(), json!({"id": "a b"}));
        assert_eq!(api.cleanup_uploads().unwrap(), json!({"removed": 3}));

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[0].body,
            RecordedBody::Json(json!({"objectName": "2024/a.txt"}))
        );
        assert_eq!(requests[1].url, "http://localhost:8001/api/file/a%20b");
        assert_eq!(requests[2].url, "http://localhost:8001/api/upload/cleanup");
    }
}
