//! 统一可观测性模块
//!
//! 日志基于 tracing，指标基于 metrics crate。
//! 客户端库本身只发出事件与计数；是否输出、输出到哪里由宿主进程决定。

pub mod metrics;
pub mod tracing;

use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 日志级别（如 "info", "debug"），RUST_LOG 优先
    pub log_level: String,

    /// 是否启用 JSON 格式日志
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

pub use self::tracing::init as init_tracing;
