//! 统一错误处理模块
//!
//! 定义 action 客户端所有的错误类型，使用 thiserror 提供良好的错误信息。
//! 本地构造错误（参数、序列化）同步返回，不会发送到远端；
//! 远端错误只分类一次，不做二次解释。

use thiserror::Error;

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum ActionError {
    // ==================== 本地构造错误 ====================
    #[error("无效的参数: {operator} - {message}")]
    InvalidArgument { operator: String, message: String },

    #[error("规则序列化失败: {0}")]
    Serialization(String),

    // ==================== 传输错误 ====================
    #[error("传输层错误: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ==================== 远端错误 ====================
    #[error("远端拒绝请求: status={status} error={error}")]
    RemoteRejection {
        status: u16,
        error: String,
        message: Option<String>,
    },

    #[error("重试次数已用尽: status={status} attempts={attempts}")]
    RetryExhausted { status: u16, attempts: u32 },

    // ==================== 配置错误 ====================
    #[error("配置错误: {0}")]
    Config(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, ActionError>;

impl ActionError {
    /// 参数错误的便捷构造
    pub fn invalid_argument(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// 不携带底层错误的传输错误
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::RemoteRejection { .. } => "REMOTE_REJECTION",
            Self::RetryExhausted { .. } => "RETRY_EXHAUSTED",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 只有网络层故障（连接失败、超时）按指数退避重试；
    /// 429/202 的重试由响应状态驱动，不经过这里。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// 远端返回的 HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejection { status, .. } | Self::RetryExhausted { status, .. } => {
                Some(*status)
            }
            Self::Transport {
                source: Some(err), ..
            } => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("请求超时: {err}")
        } else if err.is_connect() {
            format!("连接失败: {err}")
        } else {
            err.to_string()
        };

        Self::Transport {
            message,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ActionError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = ActionError::invalid_argument("num.sub", "期望 2 个参数, 实际 1 个");
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert_eq!(
            err.to_string(),
            "无效的参数: num.sub - 期望 2 个参数, 实际 1 个"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(ActionError::transport("connection refused").is_retryable());

        let rejected = ActionError::RemoteRejection {
            status: 400,
            error: "unsupported_operator".to_string(),
            message: None,
        };
        assert!(!rejected.is_retryable());
        assert!(!ActionError::Serialization("NaN".to_string()).is_retryable());
    }

    #[test]
    fn test_status() {
        let exhausted = ActionError::RetryExhausted {
            status: 429,
            attempts: 3,
        };
        assert_eq!(exhausted.status(), Some(429));
        assert_eq!(exhausted.code(), "RETRY_EXHAUSTED");
        assert_eq!(ActionError::transport("boom").status(), None);
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: ActionError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "SERIALIZATION_ERROR");
    }
}
