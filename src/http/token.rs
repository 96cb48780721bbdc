use crate::db::SettingsDb;
use crate::settings;

/// 每次请求前查询一次 token；返回 None 时请求不带认证头。
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// 固定 token，主要用于脚本与测试。
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// 从本地 sqlite 设置表的固定键读取 token。
#[derive(Debug, Clone)]
pub struct SettingsTokenSource {
    db: SettingsDb,
}

impl SettingsTokenSource {
    pub fn new(db: SettingsDb) -> Self {
        Self { db }
    }
}

impl TokenSource for SettingsTokenSource {
    fn token(&self) -> Option<String> {
        match settings::get_token(&self.db) {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted token; sending unauthenticated");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_source_reads_latest_value_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let db = SettingsDb::at(dir.path().join("token.db"));
        let source = SettingsTokenSource::new(db.clone());

        assert_eq!(source.token(), None);
        settings::set_token(&db, "t1").unwrap();
        assert_eq!(source.token().as_deref(), Some("t1"));
        settings::set_token(&db, "t2").unwrap();
        assert_eq!(source.token().as_deref(), Some("t2"));
    }
}
