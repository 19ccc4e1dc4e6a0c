//! 预设响应
//!
//! 测试把响应按顺序压入脚本，服务收到请求时依次弹出；脚本为空时回到默认行为。

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::ErrorResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: String,
}

impl ScriptedResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// 200 纯文本结果
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// 202 处理中
    pub fn accepted() -> Self {
        Self::new(202, "")
    }

    /// 429 限流
    pub fn rate_limited(retry_after: impl Into<String>) -> Self {
        Self::new(429, "").with_header("retry-after", retry_after)
    }

    /// 带 `error` / `message` JSON 体的错误响应
    pub fn error(status: u16, error: &str, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorResponse::new(error, message)).unwrap_or_default();
        Self::new(status, body).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl IntoResponse for ScriptedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();

        for (name, value) in &self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "忽略无效的预设响应头"),
            }
        }
        response
    }
}
