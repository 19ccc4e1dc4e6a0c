//! 模拟服务数据模型
//!
//! 包含收到的请求记录与预设响应，用于测试断言和脚本化回放。

pub mod recorded;
pub mod scripted;

pub use recorded::{RecordedBody, RecordedPart, RecordedRequest};
pub use scripted::ScriptedResponse;

use serde::{Deserialize, Serialize};

/// 错误响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}
