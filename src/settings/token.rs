use crate::db::SettingsDb;
use crate::error::StorageResult;

/// 持久化 bearer token 使用的固定键。
pub const TOKEN_KEY: &str = "token";

/// 读取已保存的 token；空串视为未登录。
pub fn get_token(db: &SettingsDb) -> StorageResult<Option<String>> {
    Ok(db
        .get_setting(TOKEN_KEY)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

pub fn set_token(db: &SettingsDb, token: &str) -> StorageResult<()> {
    db.set_setting(TOKEN_KEY, token.trim())
}

pub fn clear_token(db: &SettingsDb) -> StorageResult<()> {
    db.delete_setting(TOKEN_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let db = SettingsDb::at(dir.path().join("t.db"));

        set_token(&db, "   ").unwrap();
        assert_eq!(get_token(&db).unwrap(), None);

        set_token(&db, " secret ").unwrap();
        assert_eq!(get_token(&db).unwrap().as_deref(), Some("secret"));

        clear_token(&db).unwrap();
        assert_eq!(get_token(&db).unwrap(), None);
    }
}
