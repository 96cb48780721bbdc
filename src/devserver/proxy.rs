use config::ConfigError;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_BACKEND: &str = "http://localhost:8001";

/// 一条代理规则：以 prefix 开头的请求转发到 target。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRule {
    pub prefix: String,
    pub target: String,
    /// 转发时把 Host 头改成目标地址。
    #[serde(default)]
    pub change_origin: bool,
    /// 是否允许 WebSocket 升级。
    #[serde(default)]
    pub ws: bool,
}

impl ProxyRule {
    /// 按路径段匹配：`/api` 匹配 `/api`、`/api/x`、`/api?x`，不匹配 `/apix`。
    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub url: String,
    /// None 表示保留客户端原始 Host。
    pub host_header: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevServerConfig {
    pub host: String,
    pub port: u16,
    pub proxy: Vec<ProxyRule>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            proxy: vec![
                ProxyRule {
                    prefix: "/api".to_string(),
                    target: DEFAULT_BACKEND.to_string(),
                    change_origin: true,
                    ws: true,
                },
                ProxyRule {
                    prefix: "/user".to_string(),
                    target: DEFAULT_BACKEND.to_string(),
                    change_origin: true,
                    ws: false,
                },
            ],
        }
    }
}

impl DevServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 找到最长匹配前缀的规则并计算转发地址。
    /// WebSocket 升级请求只交给开启了 ws 的规则。
    pub fn resolve_proxy(&self, path: &str, upgrade_websocket: bool) -> Option<ProxyTarget> {
        let rule = self
            .proxy
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| rule.prefix.len())?;
        if upgrade_websocket && !rule.ws {
            return None;
        }

        let base = match Url::parse(&rule.target) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(target_url = %rule.target, error = %err, "invalid proxy target");
                return None;
            }
        };
        let url = base.join(path).ok()?;
        let host_header = if rule.change_origin {
            base.host_str().map(|host| match base.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            })
        } else {
            None
        };

        Some(ProxyTarget {
            url: url.to_string(),
            host_header,
        })
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.proxy {
            if !rule.prefix.starts_with('/') {
                return Err(ConfigError::Message(format!(
                    "proxy prefix must start with '/': {}",
                    rule.prefix
                )));
            }
            let target = Url::parse(&rule.target).map_err(|e| {
                ConfigError::Message(format!("invalid proxy target {}: {e}", rule.target))
            })?;
            if !matches!(target.scheme(), "http" | "https") {
                return Err(ConfigError::Message(format!(
                    "proxy target must be http(s): {}",
                    rule.target
                )));
            }
        }
        Ok(())
    }
}
