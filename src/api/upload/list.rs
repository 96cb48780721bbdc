use serde_json::{Map, Value};
use tracing::warn;

use super::{
    models::{FileListItem, FileListPage, FileListQuery},
    UploadApi,
};
use crate::http::ApiRequest;

const LIST_FIELDS: [&str; 2] = ["list", "data"];
const TOTAL_FIELDS: [&str; 2] = ["total", "count"];

impl UploadApi {
    /// 拉取文件列表。任何失败都降级为空列表，不向上抛错。
    ///
    /// 保留整个信封，`data` 为数组时与它同级的 `total`/`count` 才能读到。
    pub fn get_file_list(&self, query: &FileListQuery) -> FileListPage {
        let request = ApiRequest::get("/user/getFileList")
            .query(query.to_pairs())
            .keep_envelope();
        match self.client.send(request) {
            Ok(payload) => normalize_file_list(payload),
            Err(err) => {
                warn!(error = %err, "file list unavailable; showing empty list");
                FileListPage::default()
            }
        }
    }
}

/// 兼容 `list`/`data` 与 `total`/`count` 两套字段名；裸数组直接当作列表。
pub(crate) fn normalize_file_list(payload: Value) -> FileListPage {
    match payload {
        Value::Array(items) => page_from_items(items, None),
        Value::Object(map) => normalize_object(map),
        _ => FileListPage::default(),
    }
}

fn normalize_object(mut map: Map<String, Value>) -> FileListPage {
    let total = TOTAL_FIELDS
        .iter()
        .find_map(|key| map.get(*key).and_then(as_count));

    for key in LIST_FIELDS {
        match map.remove(key) {
            Some(Value::Array(items)) => return page_from_items(items, total),
            // 后端偶尔多包一层 {data: {list, total}}
            Some(Value::Object(inner)) => return normalize_object(inner),
            _ => {}
        }
    }
    FileListPage {
        list: Vec::new(),
        total: total.unwrap_or(0),
    }
}

fn page_from_items(items: Vec<Value>, total: Option<u64>) -> FileListPage {
    let total = total.unwrap_or(items.len() as u64);
    FileListPage {
        list: items.into_iter().map(FileListItem::from).collect(),
        total,
    }
}

pub(crate) fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
