use crate::db::SettingsDb;
use crate::error::{StorageError, StorageResult};
use std::time::Duration;
use url::Url;

const ORIGIN_KEY: &str = "api_origin";
const TIMEOUT_KEY: &str = "request_timeout_secs";
pub const DEFAULT_API_ORIGIN: &str = "http://localhost:8001";
pub const MIN_TIMEOUT_SECS: u64 = 5;
pub const MAX_TIMEOUT_SECS: u64 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 后端服务地址；未设置时指向本地开发后端。
pub fn get_api_origin(db: &SettingsDb) -> StorageResult<String> {
    if let Some(value) = db.get_setting(ORIGIN_KEY)? {
        return Ok(value);
    }
    Ok(DEFAULT_API_ORIGIN.to_string())
}

/// 只接受 http/https 的绝对地址，写入前去掉末尾的 `/`。
pub fn set_api_origin(db: &SettingsDb, origin: &str) -> StorageResult<String> {
    let parsed = Url::parse(origin.trim()).map_err(|e| invalid(ORIGIN_KEY, e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(ORIGIN_KEY, "scheme must be http or https"));
    }
    let normalized = parsed.as_str().trim_end_matches('/').to_string();
    db.set_setting(ORIGIN_KEY, &normalized)?;
    Ok(normalized)
}

/// 默认请求超时；缺失时返回默认值，越界值被夹到 [MIN, MAX]。
pub fn get_request_timeout(db: &SettingsDb) -> StorageResult<Duration> {
    let secs = match db.get_setting(TIMEOUT_KEY)? {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| invalid(TIMEOUT_KEY, e.to_string()))?
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
        None => DEFAULT_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}

pub fn set_request_timeout(db: &SettingsDb, secs: u64) -> StorageResult<u64> {
    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(invalid(
            TIMEOUT_KEY,
            format!("must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS}"),
        ));
    }
    db.set_setting(TIMEOUT_KEY, &secs.to_string())?;
    Ok(secs)
}

fn invalid(key: &str, reason: impl Into<String>) -> StorageError {
    StorageError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, SettingsDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = SettingsDb::at(dir.path().join("endpoint.db"));
        (dir, db)
    }

    #[test]
    fn origin_defaults_and_validates() {
        let (_dir, db) = temp_db();
        assert_eq!(get_api_origin(&db).unwrap(), DEFAULT_API_ORIGIN);

        assert!(set_api_origin(&db, "ftp://example.com").is_err());
        assert!(set_api_origin(&db, "not a url").is_err());

        let stored = set_api_origin(&db, "https://files.example.com/").unwrap();
        assert_eq!(stored, "https://files.example.com");
        assert_eq!(get_api_origin(&db).unwrap(), "https://files.example.com");
    }

    #[test]
    fn timeout_is_range_checked_and_clamped() {
        let (_dir, db) = temp_db();
        assert_eq!(get_request_timeout(&db).unwrap(), Duration::from_secs(30));
        assert!(set_request_timeout(&db, 1).is_err());
        assert_eq!(set_request_timeout(&db, 60).unwrap(), 60);
        assert_eq!(get_request_timeout(&db).unwrap(), Duration::from_secs(60));

        db.set_setting(TIMEOUT_KEY, "9000").unwrap();
        assert_eq!(
            get_request_timeout(&db).unwrap(),
            Duration::from_secs(MAX_TIMEOUT_SECS)
        );
    }
}
