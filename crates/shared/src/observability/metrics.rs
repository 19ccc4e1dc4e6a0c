//! 客户端指标
//!
//! 基于 metrics crate 的计数器。未安装 recorder 时所有调用都是空操作，
//! 由宿主进程决定是否导出（如 Prometheus）。

/// 请求总数，按 HTTP 状态码（或 `transport_error`）打标签
pub const ACTION_REQUESTS_TOTAL: &str = "action_requests_total";

/// 重试总数，按原因（`rate_limited` / `accepted` / `transport_error`）打标签
pub const ACTION_RETRIES_TOTAL: &str = "action_retries_total";

/// 注册指标描述，出现在导出端点的 HELP 注释中
pub fn describe() {
    metrics::describe_counter!(
        ACTION_REQUESTS_TOTAL,
        "Total number of action-logic HTTP attempts"
    );
    metrics::describe_counter!(ACTION_RETRIES_TOTAL, "Total number of action-logic retries");
}

/// 记录一次请求尝试
pub fn record_attempt(status: &str) {
    metrics::counter!(ACTION_REQUESTS_TOTAL, "status" => status.to_string()).increment(1);
}

/// 记录一次重试
pub fn record_retry(reason: &'static str) {
    metrics::counter!(ACTION_RETRIES_TOTAL, "reason" => reason).increment(1);
}
