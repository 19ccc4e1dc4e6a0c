//! HTTP 传输层
//!
//! [`ActionTransport`] 只负责把一个 [`ActionRequest`] 发出去并拿回原始响应，
//! 不解释状态码；重试与响应分类在 `client` 中完成。

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use simplise_shared::config::ClientConfig;
use simplise_shared::error::{ActionError, Result};
use tracing::debug;

/// 规则执行端点
pub const ACTION_LOGIC_PATH: &str = "/action-logic";

/// 202 响应中指示后续轮询地址的响应头
pub const RESOURCE_PATH_HEADER: &str = "sp-resource-path";

const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// 请求体
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// 单个 JSON 文档
    Json(Value),
    /// multipart/form-data，`action` 与可选的 `input` 两个 JSON 部分
    Multipart { action: Value, input: Option<Value> },
}

/// 一次待发送的请求
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub method: HttpMethod,
    /// 相对基础地址的路径，或绝对 URL
    pub path: String,
    pub body: RequestBody,
}

impl ActionRequest {
    /// `POST /action-logic`
    pub fn post(body: RequestBody) -> Self {
        Self {
            method: HttpMethod::Post,
            path: ACTION_LOGIC_PATH.to_string(),
            body,
        }
    }

    /// 202 续传：对资源路径发起不带请求体的 GET
    pub fn poll(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }
}

/// 远端响应
#[derive(Debug, Clone)]
pub struct ActionResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    attempts: u32,
}

impl ActionResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            attempts: 1,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 响应头的文本值，非 ASCII 的值视为不存在
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// 原始响应体
    pub fn body(&self) -> &str {
        &self.body
    }

    /// 产生这个响应共发送了几次请求
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// 2xx 且不是 202
    pub fn is_success(&self) -> bool {
        self.status.is_success() && self.status != StatusCode::ACCEPTED
    }

    pub fn is_pending(&self) -> bool {
        self.status == StatusCode::ACCEPTED
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    pub fn retry_after(&self) -> Option<&str> {
        self.header(RETRY_AFTER.as_str())
    }

    /// 非空的 `sp-resource-path`
    pub fn resource_path(&self) -> Option<&str> {
        self.header(RESOURCE_PATH_HEADER)
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }

    /// 结果文本
    ///
    /// 响应体本身是纯文本；如果恰好是一个 JSON 字符串字面量则取出其内容。
    pub fn text(&self) -> String {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(Value::String(s)) => s,
            _ => self.body.clone(),
        }
    }

    /// 转换为类型化结果
    ///
    /// 成功返回结果文本；仍为 202/429 时返回 `RetryExhausted`；其它状态为 `RemoteRejection`。
    pub fn into_result(self) -> Result<String> {
        if self.is_success() {
            Ok(self.text())
        } else if self.is_pending() || self.is_rate_limited() {
            Err(ActionError::RetryExhausted {
                status: self.status.as_u16(),
                attempts: self.attempts,
            })
        } else {
            Err(self.rejection())
        }
    }

    pub(crate) fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// 尽力解析错误响应体中的 `error` / `message`，解析失败时按纯文本处理
    pub(crate) fn rejection(&self) -> ActionError {
        let status = self.status.as_u16();
        let fallback = || format!("HTTP error! status: {status}");

        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(&self.body) {
            let error = obj
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(fallback);
            let message = obj.get("message").and_then(Value::as_str).map(str::to_string);
            return ActionError::RemoteRejection { status, error, message };
        }

        let text = self.body.trim();
        ActionError::RemoteRejection {
            status,
            error: fallback(),
            message: (!text.is_empty()).then(|| text.to_string()),
        }
    }
}

/// 传输抽象
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionTransport: Send + Sync {
    /// 发送一次请求；只有网络层失败才返回错误，任何 HTTP 状态都作为响应返回
    async fn send(&self, request: &ActionRequest) -> Result<ActionResponse>;
}

/// 基于 reqwest 的传输实现，连接池由 `Client` 管理
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 绝对 URL 原样使用，其它路径拼接到基础地址之后
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

#[async_trait]
impl ActionTransport for HttpTransport {
    async fn send(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let url = self.url_for(&request.path);
        debug!(method = ?request.method, url = %url, "发送 action 请求");

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        }
        .bearer_auth(&self.api_key);

        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart { action, input } => builder.multipart(multipart_form(action, input.as_ref())?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        debug!(status = status.as_u16(), body_len = body.len(), "收到 action 响应");
        Ok(ActionResponse::new(status, headers, body))
    }
}

fn multipart_form(action: &Value, input: Option<&Value>) -> Result<Form> {
    let form = Form::new().part("action", json_part(action)?);
    match input {
        Some(input) => Ok(form.part("input", json_part(input)?)),
        None => Ok(form),
    }
}

fn json_part(value: &Value) -> Result<Part> {
    let text = serde_json::to_string(value)?;
    Ok(Part::text(text).mime_str(JSON_MIME)?)
}
