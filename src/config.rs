use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "answer_checker.toml";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 抽取 / 评测服务地址
    pub api_base_url: String,
    /// 会话持久化文件
    pub session_file: PathBuf,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 评测重试策略 ---
    pub evaluation_max_attempts: u32,
    pub evaluation_retry_delay_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            session_file: PathBuf::from(".answer_checker/session.json"),
            request_timeout_secs: 120,
            evaluation_max_attempts: 3,
            evaluation_retry_delay_ms: 500,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件中的可选项
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    session_file: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    evaluation_max_attempts: Option<u32>,
    evaluation_retry_delay_ms: Option<u64>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 只从环境变量读取（未设置的项使用默认值）
    pub fn from_env() -> AppResult<Self> {
        Ok(Self::default().with_env_overrides()?)
    }

    /// 读取 TOML 配置文件（不存在则跳过），再叠加环境变量
    pub fn load(path: &Path) -> AppResult<Self> {
        let base = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                    path: path.display().to_string(),
                    source,
                })?;
            Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };

        Ok(base.with_env_overrides()?)
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            api_base_url: file.api_base_url.unwrap_or(default.api_base_url),
            session_file: file.session_file.unwrap_or(default.session_file),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(default.request_timeout_secs),
            evaluation_max_attempts: file.evaluation_max_attempts.unwrap_or(default.evaluation_max_attempts),
            evaluation_retry_delay_ms: file.evaluation_retry_delay_ms.unwrap_or(default.evaluation_retry_delay_ms),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: std::env::var("GRADER_API_BASE_URL").unwrap_or(self.api_base_url),
            session_file: std::env::var("SESSION_FILE").map(PathBuf::from).unwrap_or(self.session_file),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?.unwrap_or(self.request_timeout_secs),
            evaluation_max_attempts: env_parse("EVALUATION_MAX_ATTEMPTS", "u32")?.unwrap_or(self.evaluation_max_attempts),
            evaluation_retry_delay_ms: env_parse("EVALUATION_RETRY_DELAY_MS", "u64")?.unwrap_or(self.evaluation_retry_delay_ms),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }
}

/// 读取并解析环境变量；未设置返回 None，无法解析时报错
fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_toml_overrides_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "http://grader.local:9000"
            evaluation_max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://grader.local:9000");
        assert_eq!(config.evaluation_max_attempts, 5);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        std::env::set_var("GRADER_API_BASE_URL", "http://env-host:1234");
        std::env::set_var("EVALUATION_MAX_ATTEMPTS", " 7 ");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_base_url, "http://env-host:1234");
        assert_eq!(config.evaluation_max_attempts, 7);
        assert_eq!(config.evaluation_retry_delay_ms, 500);

        std::env::remove_var("GRADER_API_BASE_URL");
        std::env::remove_var("EVALUATION_MAX_ATTEMPTS");
    }

    #[test]
    #[serial]
    fn test_unparsable_env_var_is_reported() {
        std::env::set_var("EVALUATION_RETRY_DELAY_MS", "not-a-number");

        let err = Config::from_env().unwrap_err();
        std::env::remove_var("EVALUATION_RETRY_DELAY_MS");

        match err {
            crate::error::AppError::Config(ConfigError::EnvVarParseFailed {
                var_name, value, ..
            }) => {
                assert_eq!(var_name, "EVALUATION_RETRY_DELAY_MS");
                assert_eq!(value, "not-a-number");
            }
            other => panic!("意外的错误: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.evaluation_max_attempts, 3);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "api_base_url = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }
}
