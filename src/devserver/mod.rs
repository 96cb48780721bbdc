//! 前端开发服务器代理与构建产物配置。
//!
//! 加载顺序：内置默认值 → 可选的 `fileadmin.{toml,json,yaml}` 文件 →
//! `FILEADMIN_` 前缀的环境变量（层级用 `__` 分隔，如 `FILEADMIN_DEV_SERVER__PORT`）。

mod build;
mod proxy;

pub use build::{BuildConfig, ChunkGroup, ChunkScope};
pub use proxy::{DevServerConfig, ProxyRule, ProxyTarget};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

const CONFIG_FILE_STEM: &str = "fileadmin";
const ENV_PREFIX: &str = "FILEADMIN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub dev_server: DevServerConfig,
    pub build: BuildConfig,
}

impl FrontendConfig {
    /// 从工作目录下的 `fileadmin.*`（可缺省）与环境变量加载。
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(CONFIG_FILE_STEM).required(false))
    }

    /// 从指定文件加载，格式由扩展名决定。
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(Config::try_from(&FrontendConfig::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let loaded: FrontendConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dev_server.validate()?;
        self.build.validate()
    }
}
