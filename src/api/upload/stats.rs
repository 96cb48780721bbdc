use serde_json::{Map, Value};
use tracing::warn;

use super::{list::as_count, models::UploadStats, UploadApi};
use crate::http::envelope::is_success_code;

const TOTAL_UPLOADS: [&str; 3] = ["totalUploads", "total_uploads", "total"];
const SUCCESS_UPLOADS: [&str; 3] = ["successUploads", "success_uploads", "success"];
const TOTAL_SIZE: [&str; 3] = ["totalSize", "total_size", "size"];
const TODAY_UPLOADS: [&str; 3] = ["todayUploads", "today_uploads", "today"];

impl UploadApi {
    /// 获取上传统计。失败时返回全 0，不向上抛错。
    pub fn get_upload_stats(&self) -> UploadStats {
        // 路径含 upload，客户端不会拆信封，这里自行处理。
        match self.client.get("/user/uploadStats", Vec::new()) {
            Ok(body) => normalize_upload_stats(body).unwrap_or_else(|| {
                warn!("upload stats response not understood; showing zeros");
                UploadStats::default()
            }),
            Err(err) => {
                warn!(error = %err, "upload stats unavailable; showing zeros");
                UploadStats::default()
            }
        }
    }
}

/// 返回 None 表示响应是一个失败信封或者根本不是对象。
pub(crate) fn normalize_upload_stats(body: Value) -> Option<UploadStats> {
    let Value::Object(mut map) = body else {
        return None;
    };
    if map.contains_key("code") {
        if !is_success_code(map.get("code")) {
            return None;
        }
        if let Some(Value::Object(data)) = map.remove("data") {
            map = data;
        }
    }

    Some(UploadStats {
        total_uploads: pick(&map, &TOTAL_UPLOADS),
        success_uploads: pick(&map, &SUCCESS_UPLOADS),
        total_size: pick(&map, &TOTAL_SIZE),
        today_uploads: pick(&map, &TODAY_UPLOADS),
    })
}

fn pick(map: &Map<String, Value>, keys: &[&str]) -> u64 {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(as_count))
        .unwrap_or(0)
}
