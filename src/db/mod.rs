use crate::error::{StorageError, StorageResult};
use directories::ProjectDirs;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

mod settings;

pub(crate) use settings::SETTINGS_TABLE_SCHEMA;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "Fileadmin";
const APPLICATION: &str = "Fileadmin";
const DB_FILE_NAME: &str = "fileadmin.db";

/// 本地持久化状态（token、后端地址等）所在的 sqlite 文件。
/// 每次操作都重新打开连接，保证多个线程读到的都是最新值。
#[derive(Debug, Clone)]
pub struct SettingsDb {
    path: PathBuf,
}

impl SettingsDb {
    /// 使用平台默认的应用数据目录。
    pub fn open_default() -> StorageResult<Self> {
        let dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(StorageError::DataDir)?;
        Ok(Self::at(dirs.data_dir().join(DB_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn init(&self) -> StorageResult<()> {
        self.with_connection(|_| Ok(()))
    }

    pub(crate) fn with_connection<T, F>(&self, operation: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let conn = self.open_connection()?;
        operation(&conn)
    }

    fn open_connection(&self) -> StorageResult<Connection> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
                path: dir.display().to_string(),
                source,
            })?;
        }

        let conn = Connection::open(&self.path)?;
        apply_migrations(&conn)?;
        Ok(conn)
    }
}

fn apply_migrations(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(SETTINGS_TABLE_SCHEMA)?;
    Ok(())
}

pub(crate) fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or(0)
}
