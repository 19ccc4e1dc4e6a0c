//! 收到的请求记录

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 一次收到的请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// `Authorization` 头原文
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: RecordedBody,
}

impl RecordedRequest {
    /// 去掉 `Bearer ` 前缀后的 token
    pub fn bearer_token(&self) -> Option<&str> {
        self.authorization.as_deref()?.strip_prefix("Bearer ")
    }
}

/// 请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordedBody {
    Empty,
    Json(Value),
    /// 无法解析为 JSON 的文本
    Text(String),
    Multipart(Vec<RecordedPart>),
}

impl RecordedBody {
    /// multipart 中指定名称的部分
    pub fn part(&self, name: &str) -> Option<&RecordedPart> {
        match self {
            Self::Multipart(parts) => parts.iter().find(|p| p.name == name),
            _ => None,
        }
    }

    /// 提交的规则：multipart 的 `action` 部分或 JSON 请求体
    pub fn action(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Multipart(_) => self.part("action").map(|p| &p.value),
            _ => None,
        }
    }

    /// multipart 的 `input` 部分
    pub fn input(&self) -> Option<&Value> {
        self.part("input").map(|p| &p.value)
    }
}

/// multipart 的一个部分，内容能解析为 JSON 时保存解析结果，否则保存原文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedPart {
    pub name: String,
    pub content_type: Option<String>,
    pub value: Value,
}

impl RecordedPart {
    pub fn new(name: impl Into<String>, content_type: Option<String>, text: &str) -> Self {
        let value = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
        Self {
            name: name.into(),
            content_type,
            value,
        }
    }
}
