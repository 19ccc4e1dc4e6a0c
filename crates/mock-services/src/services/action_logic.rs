//! Mock action-logic 服务
//!
//! - `POST /action-logic`：记录请求；有预设响应时按顺序返回，否则按参考语义回答 `bool` 规则
//! - 其它路径（如 202 指向的轮询地址）：记录请求并返回预设响应，没有则 404
//! - `/_mock/*`：查看请求日志、追加预设响应、清空状态

use std::sync::Arc;

use axum::{
    Json, Router,
    body::to_bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{
        HeaderMap, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;

use crate::evaluator::{evaluate, render};
use crate::models::{ErrorResponse, RecordedBody, RecordedPart, RecordedRequest, ScriptedResponse};
use crate::store::MockState;

// ============================================================================
// 路由配置
// ============================================================================

/// 构建 action-logic 服务路由
pub fn action_logic_routes() -> Router<Arc<MockState>> {
    Router::new()
        .route("/action-logic", post(action_logic))
        .route("/_mock/requests", get(list_requests).delete(reset))
        .route("/_mock/script", post(push_script))
        .fallback(continuation)
}

// ============================================================================
// 端点处理函数
// ============================================================================

/// 执行规则
#[tracing::instrument(skip_all)]
async fn action_logic(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let recorded = match read_request(request).await {
        Ok(recorded) => recorded,
        Err(message) => return bad_request("invalid_request", message),
    };

    let authorized = recorded.bearer_token().is_some_and(|token| !token.trim().is_empty());
    let action = recorded.body.action().cloned();
    let input = recorded
        .body
        .input()
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    state.record(recorded);

    if let Some(scripted) = state.next_response() {
        tracing::info!(status = scripted.status, "返回预设响应");
        return scripted.into_response();
    }

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("unauthorized", "缺少 Bearer token")),
        )
            .into_response();
    }

    let Some(action) = action else {
        return bad_request("invalid_request", "缺少 action");
    };

    match evaluate(&action, &input) {
        Ok(result) => {
            let text = render(&result);
            tracing::info!(result = %text, "规则求值完成");
            (StatusCode::OK, text).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "规则求值失败");
            bad_request(err.code(), err.to_string())
        }
    }
}

/// 轮询等其它路径
#[tracing::instrument(skip_all)]
async fn continuation(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let recorded = match read_request(request).await {
        Ok(recorded) => recorded,
        Err(message) => return bad_request("invalid_request", message),
    };
    let path = recorded.path.clone();
    state.record(recorded);

    match state.next_response() {
        Some(scripted) => {
            tracing::info!(path = %path, status = scripted.status, "返回预设响应");
            scripted.into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("not_found", format!("路径不存在: {path}"))),
        )
            .into_response(),
    }
}

/// 查看请求日志
async fn list_requests(State(state): State<Arc<MockState>>) -> Json<Vec<RecordedRequest>> {
    Json(state.requests())
}

/// 追加预设响应
async fn push_script(
    State(state): State<Arc<MockState>>,
    Json(responses): Json<Vec<ScriptedResponse>>,
) -> StatusCode {
    tracing::info!(count = responses.len(), "追加预设响应");
    state.push_responses(responses);
    StatusCode::NO_CONTENT
}

/// 清空请求日志和预设响应
async fn reset(State(state): State<Arc<MockState>>) -> StatusCode {
    state.reset();
    StatusCode::NO_CONTENT
}

// ============================================================================
// 辅助函数
// ============================================================================

fn bad_request(error: &str, message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error, message))).into_response()
}

fn header_text(headers: &HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

/// 读取完整请求：multipart 逐个读取部分，其它请求体按 JSON 解析，失败时保留原文
async fn read_request(request: Request) -> Result<RecordedRequest, String> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let authorization = header_text(request.headers(), AUTHORIZATION);
    let content_type = header_text(request.headers(), CONTENT_TYPE);

    let is_multipart = content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let body = if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| e.to_string())?;

        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
            let name = field.name().unwrap_or_default().to_string();
            let part_type = field.content_type().map(str::to_string);
            let text = field.text().await.map_err(|e| e.to_string())?;
            parts.push(RecordedPart::new(name, part_type, &text));
        }
        RecordedBody::Multipart(parts)
    } else {
        let bytes = to_bytes(request.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        if bytes.is_empty() {
            RecordedBody::Empty
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => RecordedBody::Json(value),
                Err(_) => RecordedBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
            }
        }
    };

    tracing::debug!(method = %method, path = %path, "收到请求");
    Ok(RecordedRequest {
        method,
        path,
        authorization,
        content_type,
        body,
    })
}
