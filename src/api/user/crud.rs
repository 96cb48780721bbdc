use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;

use super::UserApi;
use crate::error::ApiResult;

fn user_path(user_id: &str) -> String {
    format!("/user/{}", utf8_percent_encode(user_id.trim(), NON_ALPHANUMERIC))
}

impl UserApi {
    pub fn list_users(&self, params: &[(String, String)]) -> ApiResult<Value> {
        self.client.get("/user/list", params.to_vec())
    }

    pub fn get_user(&self, user_id: &str) -> ApiResult<Value> {
        self.client.get(&user_path(user_id), Vec::new())
    }

    pub fn create_user<T: Serialize + ?Sized>(&self, data: &T) -> ApiResult<Value> {
        self.client.post_json("/user", data)
    }

    pub fn update_user<T: Serialize + ?Sized>(&self, user_id: &str, data: &T) -> ApiResult<Value> {
        self.client.put_json(&user_path(user_id), data)
    }

    pub fn update_user_status<T: Serialize + ?Sized>(&self, data: &T) -> ApiResult<Value> {
        self.client.put_json("/user/status", data)
    }

    /// 提交实名认证资料。
    pub fn real_name_verify<T: Serialize + ?Sized>(&self, data: &T) -> ApiResult<Value> {
        self.client.post_json("/user/realname", data)
    }

    pub fn delete_user(&self, user_id: &str) -> ApiResult<Value> {
        self.client.delete(&user_path(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::testing::{ok, RecordedBody, RecordingNotifier, ScriptedTransport};
    use crate::http::{ApiClient, ClientOptions, Method, StaticToken};
    use serde_json::json;
    use std::sync::Arc;

    fn api(transport: &Arc<ScriptedTransport>) -> (UserApi, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let client = ApiClient::new(
            ClientOptions::default(),
            transport.clone(),
            Arc::new(StaticToken(Some("admin".into()))),
            notifier.clone(),
        );
        (UserApi::new(client), notifier)
    }

    #[test]
    fn crud_routes_and_methods() {
        let responses = (0..7).map(|i| ok(json!({"code": 0, "data": i}))).collect();
        let transport = Arc::new(ScriptedTransport::new(responses));
        let (api, _) = api(&transport);

        api.list_users(&[("page".into(), "1".into())]).unwrap();
        api.get_user("42").unwrap();
        api.create_user(&json!({"name": "li"})).unwrap();
        api.update_user("42", &json!({"name": "wang"})).unwrap();
        api.update_user_status(&json!({"id": 42, "status": 0})).unwrap();
        api.real_name_verify(&json!({"idCard": "x"})).unwrap();
        assert_eq!(api.delete_user("42").unwrap(), json!(6));

        let calls: Vec<(Method, String)> = transport
            .requests()
            .into_iter()
            .map(|r| (r.method, r.url.trim_start_matches("http://localhost:8001/api").to_string()))
            .collect();
        assert_eq!(
            calls,
            vec![
                (Method::Get, "/user/list".to_string()),
                (Method::Get, "/user/42".to_string()),
                (Method::Post, "/user".to_string()),
                (Method::Put, "/user/42".to_string()),
                (Method::Put, "/user/status".to_string()),
                (Method::Post, "/user/realname".to_string()),
                (Method::Delete, "/user/42".to_string()),
            ]
        );
        assert_eq!(
            transport.requests()[2].body,
            RecordedBody::Json(json!({"name": "li"}))
        );
        assert_eq!(transport.requests()[0].header("Authorization"), Some("Bearer admin"));
    }

    #[test]
    fn errors_propagate_to_caller() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(
            json!({"code": 403, "msg": "禁止操作"}),
        )]));
        let (api, notifier) = api(&transport);

        let err = api.delete_user("1").unwrap_err();
        assert!(matches!(err, ApiError::Business { ref message, .. } if message == "禁止操作"));
        assert_eq!(notifier.messages(), vec!["禁止操作"]);
    }
}
