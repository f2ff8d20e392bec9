use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

const DEFAULT_EXTRACTION_URL: &str = "https://plankton-app-qajlk.ondigitalocean.app/extraction_api";
const DEFAULT_MATCHING_URL: &str = "https://endeavor-interview-api-gzwki.ondigitalocean.app/match/batch";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub extraction: ExtractionConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 未配置 url 时使用内存存储
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingConfig {
    pub url: String,
    /// 每个查询返回的候选数量
    pub limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default(),
            extraction: ExtractionConfig {
                url: DEFAULT_EXTRACTION_URL.to_string(),
            },
            matching: MatchingConfig {
                url: DEFAULT_MATCHING_URL.to_string(),
                limit: 5,
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> autopo.toml (可选) -> AUTOPO_* 环境变量 -> DATABASE_URL / SERVER_HOST / SERVER_PORT
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("autopo").required(false))
            .add_source(
                Environment::with_prefix("AUTOPO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?;

        Ok(builder.build()?.try_deserialize()?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let d = Self::default();
        config::Config::builder()
            .set_default("server.host", d.server.host)?
            .set_default("server.port", i64::from(d.server.port))?
            .set_default("extraction.url", d.extraction.url)?
            .set_default("matching.url", d.matching.url)?
            .set_default("matching.limit", d.matching.limit as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_deserialize_to_default_config() {
        let cfg: AppConfig = AppConfig::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.database.url, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [server]
            port = 9090

            [database]
            url = "postgres://localhost/autopo"

            [matching]
            limit = 3
        "#;
        let cfg: AppConfig = AppConfig::defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.database.url.as_deref(), Some("postgres://localhost/autopo"));
        assert_eq!(cfg.matching.limit, 3);
        assert_eq!(cfg.extraction.url, DEFAULT_EXTRACTION_URL);
    }
}
