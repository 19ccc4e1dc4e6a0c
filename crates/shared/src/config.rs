//! 配置管理模块
//!
//! 客户端配置由调用方在构造时提供，构造后不再变化。
//! 支持默认值、可选的配置文件、`.env` 与环境变量覆盖。

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{ActionError, Result};
use crate::retry::RetryConfig;

/// 默认 API 地址
pub const DEFAULT_BASE_URL: &str = "https://api.usebootstrap.org";

/// 默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 环境变量前缀（SIMPLISE_API_KEY -> api_key）
const ENV_PREFIX: &str = "SIMPLISE";

/// 无 input 数据时 action 的请求体编码
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// multipart/form-data，单个 `action` 部分，值全部字符串化
    #[default]
    Multipart,
    /// application/json，直接发送未字符串化的规则
    Json,
}

/// 客户端配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub body_encoding: BodyEncoding,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            body_encoding: BodyEncoding::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// 使用 API key 和默认值创建配置
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_body_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.body_encoding = encoding;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. 内置默认值
    /// 2. .env 文件（存在时）
    /// 3. {SIMPLISE_CONFIG_DIR:-config}/simplise.toml（可选）
    /// 4. 环境变量（SIMPLISE_ 前缀，嵌套字段用双下划线，
    ///    如 SIMPLISE_RETRY__MAX_RETRIES -> retry.max_retries）
    pub fn load() -> Result<Self> {
        // .env 只是便利，缺失不算错误
        let _ = dotenvy::dotenv();

        let config_dir =
            std::env::var("SIMPLISE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(Path::new(&config_dir))
    }

    /// 从指定目录加载配置（不读取 .env）
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from(config_dir.join("simplise.toml")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(
            config_dir = %config_dir.display(),
            base_url = %config.base_url,
            body_encoding = ?config.body_encoding,
            "客户端配置已加载"
        );
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ActionError::Config(
                "缺少 API key（请设置 SIMPLISE_API_KEY）".to_string(),
            ));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ActionError::Config(format!(
                "base_url 必须以 http:// 或 https:// 开头: {}",
                self.base_url
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ActionError::Config("timeout_seconds 必须大于 0".to_string()));
        }

        if self.retry.max_retry_delay == 0 {
            return Err(ActionError::Config(
                "retry.max_retry_delay 必须大于 0".to_string(),
            ));
        }

        Ok(())
    }

    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// 去掉末尾斜杠的 base URL
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
