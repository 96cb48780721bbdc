use config::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkScope {
    All,
    Initial,
    Async,
}

/// 代码分包规则：模块路径匹配 test 的归入 name，优先级高者胜出。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkGroup {
    pub name: String,
    pub test: String,
    pub priority: i32,
    #[serde(default = "default_scope")]
    pub chunks: ChunkScope,
}

fn default_scope() -> ChunkScope {
    ChunkScope::All
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub public_path: String,
    pub output_dir: String,
    pub assets_dir: String,
    pub production_source_map: bool,
    pub css_extract_in_production: bool,
    pub css_source_map: bool,
    pub split_chunks: ChunkScope,
    pub chunk_groups: Vec<ChunkGroup>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            public_path: "/".to_string(),
            output_dir: "dist".to_string(),
            assets_dir: "static".to_string(),
            production_source_map: false,
            css_extract_in_production: true,
            css_source_map: false,
            split_chunks: ChunkScope::All,
            chunk_groups: vec![
                ChunkGroup {
                    name: "chunk-vendors".to_string(),
                    test: r"[\\/]node_modules[\\/]".to_string(),
                    priority: 10,
                    chunks: ChunkScope::Initial,
                },
                ChunkGroup {
                    name: "chunk-element-plus".to_string(),
                    test: r"[\\/]node_modules[\\/]element-plus[\\/]".to_string(),
                    priority: 20,
                    chunks: ChunkScope::All,
                },
            ],
        }
    }
}

impl BuildConfig {
    /// 开发构建总是生成 source map，生产构建看配置。
    pub fn source_map_enabled(&self, production: bool) -> bool {
        !production || self.production_source_map
    }

    pub fn css_extract_enabled(&self, production: bool) -> bool {
        production && self.css_extract_in_production
    }

    /// 静态资源在输出目录中的相对路径。
    pub fn asset_path(&self, file_name: &str) -> String {
        let dir = self.assets_dir.trim_matches('/');
        if dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{dir}/{}", file_name.trim_start_matches('/'))
        }
    }

    /// 模块归属的分包名；没有规则命中时返回 None（留在入口包中）。
    pub fn chunk_for(&self, module_path: &str) -> Option<&str> {
        self.chunk_groups
            .iter()
            .filter(|group| match Regex::new(&group.test) {
                Ok(re) => re.is_match(module_path),
                Err(err) => {
                    tracing::warn!(chunk = %group.name, error = %err, "invalid chunk pattern");
                    false
                }
            })
            .max_by_key(|group| group.priority)
            .map(|group| group.name.as_str())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Message("build.output_dir cannot be empty".into()));
        }
        for group in &self.chunk_groups {
            Regex::new(&group.test).map_err(|e| {
                ConfigError::Message(format!("invalid pattern for chunk {}: {e}", group.name))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_plus_beats_generic_vendor_chunk() {
        let build = BuildConfig::default();
        assert_eq!(
            build.chunk_for("/app/node_modules/element-plus/es/index.mjs"),
            Some("chunk-element-plus")
        );
        assert_eq!(
            build.chunk_for("C:\\app\\node_modules\\axios\\index.js"),
            Some("chunk-vendors")
        );
        assert_eq!(build.chunk_for("/app/src/views/Home.vue"), None);
    }

    #[test]
    fn source_maps_and_css_extraction_follow_mode() {
        let build = BuildConfig::default();
        assert!(build.source_map_enabled(false));
        assert!(!build.source_map_enabled(true));
        assert!(build.css_extract_enabled(true));
        assert!(!build.css_extract_enabled(false));
        assert_eq!(build.asset_path("/app.js"), "static/app.js");
    }

    #[test]
    fn bad_patterns_fail_validation() {
        let mut build = BuildConfig::default();
        build.chunk_groups[0].test = "([".to_string();
        assert!(build.validate().is_err());
    }
}
