//! 响应信封 `{code, msg, data}` 的解释规则。
//!
//! 这些都是纯函数，客户端在拿到响应之后调用，方便单独测试。

use serde_json::{Map, Value};

pub(crate) const DEFAULT_FAILURE_MESSAGE: &str = "请求失败";
pub(crate) const NO_RESPONSE_MESSAGE: &str = "服务器无响应";
pub(crate) const UNKNOWN_ERROR_MESSAGE: &str = "未知错误";

/// 业务层失败：信封里的 code 非 0。
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub code: Value,
    pub message: String,
}

impl From<Rejection> for crate::error::ApiError {
    fn from(rejection: Rejection) -> Self {
        Self::Business {
            code: rejection.code,
            message: rejection.message,
        }
    }
}

/// 路径中带 `upload` 的接口不走信封，原样返回响应体。
pub fn bypasses_envelope(path: &str) -> bool {
    path.contains("upload")
}

/// 解释一个 2xx 响应体。
pub fn unwrap_body(path: &str, body: Value) -> Result<Value, Rejection> {
    if bypasses_envelope(path) {
        return Ok(match body {
            Value::Null => Value::Object(Map::new()),
            other => other,
        });
    }

    unwrap_envelope(body)
}

/// 不看路径，直接按信封规则解释：成功取 `data`（没有 `data` 键时取整体），失败给出 [`Rejection`]。
pub fn unwrap_envelope(body: Value) -> Result<Value, Rejection> {
    match check_envelope(body)? {
        Value::Object(mut map) => Ok(match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        }),
        other => Ok(other),
    }
}

/// 只判定成败，成功时原样保留整个信封，`data` 旁边的 `total`/`count` 等字段不丢。
pub fn check_envelope(body: Value) -> Result<Value, Rejection> {
    let Value::Object(map) = body else {
        return Ok(body);
    };
    if is_success_code(map.get("code")) {
        return Ok(Value::Object(map));
    }
    Err(Rejection {
        code: map.get("code").cloned().unwrap_or(Value::Null),
        message: message_field(&map)
            .unwrap_or(DEFAULT_FAILURE_MESSAGE)
            .to_string(),
    })
}

/// code 缺失或为数值 0 都算成功。
pub fn is_success_code(code: Option<&Value>) -> bool {
    match code {
        None => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// 非 2xx 状态码的提示语：优先服务端 msg，其次状态文本，最后状态码。
pub fn status_error_message(status: u16, status_text: &str, body: &Value) -> String {
    if let Some(msg) = body.as_object().and_then(message_field) {
        return msg.to_string();
    }
    if !status_text.trim().is_empty() {
        return status_text.to_string();
    }
    format!("HTTP {status}")
}

/// 把原始字节解码成 JSON；空体视为 `{}`，非 JSON 文本保留为字符串。
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn message_field(map: &Map<String, Value>) -> Option<&str> {
    map.get("msg")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_returns_data_or_whole_body() {
        let body = json!({"code": 0, "msg": "ok", "data": {"id": 1}});
        assert_eq!(unwrap_body("/user/1", body).unwrap(), json!({"id": 1}));

        let no_code = json!({"data": [1, 2]});
        assert_eq!(unwrap_body("/user/list", no_code).unwrap(), json!([1, 2]));

        let no_data = json!({"code": 0, "msg": "ok"});
        assert_eq!(
            unwrap_body("/user/list", no_data.clone()).unwrap(),
            no_data
        );

        let explicit_null = json!({"code": 0, "data": null});
        assert_eq!(unwrap_body("/user/list", explicit_null).unwrap(), Value::Null);
    }

    #[test]
    fn non_zero_code_is_rejected_with_message() {
        let rejection = unwrap_body("/user/1", json!({"code": 1001, "msg": "无权限"})).unwrap_err();
        assert_eq!(rejection.code, json!(1001));
        assert_eq!(rejection.message, "无权限");

        let blank = unwrap_body("/user/1", json!({"code": "E1", "msg": ""})).unwrap_err();
        assert_eq!(blank.message, DEFAULT_FAILURE_MESSAGE);

        let null_code = unwrap_body("/user/1", json!({"code": null})).unwrap_err();
        assert_eq!(null_code.code, Value::Null);
    }

    #[test]
    fn check_keeps_siblings_of_data() {
        let body = json!({"code": 0, "data": [{"id": 1}], "count": 10});
        assert_eq!(check_envelope(body.clone()).unwrap(), body);
        assert_eq!(
            check_envelope(json!({"code": 3, "msg": "busy"})).unwrap_err().message,
            "busy"
        );
        assert_eq!(unwrap_envelope(json!({"code": 0, "data": 5})).unwrap(), json!(5));
    }

    #[test]
    fn upload_paths_return_raw_body() {
        let body = json!({"code": 500, "msg": "boom", "data": 1});
        assert_eq!(unwrap_body("/upload/smart", body.clone()).unwrap(), body);
        assert_eq!(unwrap_body("/user/uploadStats", Value::Null).unwrap(), json!({}));
    }

    #[test]
    fn non_object_bodies_pass_through() {
        assert_eq!(unwrap_body("/user/list", json!("plain")).unwrap(), json!("plain"));
        assert_eq!(unwrap_body("/user/list", json!([1])).unwrap(), json!([1]));
    }

    #[test]
    fn status_message_fallback_chain() {
        assert_eq!(
            status_error_message(500, "Internal Server Error", &json!({"msg": "db down"})),
            "db down"
        );
        assert_eq!(
            status_error_message(502, "Bad Gateway", &json!("<html>")),
            "Bad Gateway"
        );
        assert_eq!(status_error_message(599, "", &json!({})), "HTTP 599");
    }

    #[test]
    fn decode_body_handles_empty_and_text() {
        assert_eq!(decode_body(b""), json!({}));
        assert_eq!(decode_body(b" \n"), json!({}));
        assert_eq!(decode_body(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(decode_body(b"uploaded"), json!("uploaded"));
    }
}
