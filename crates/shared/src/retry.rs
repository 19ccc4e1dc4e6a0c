//! 重试配置与退避策略
//!
//! 远端服务通过两种状态要求客户端稍后再试：
//! - 429 Too Many Requests：限流，`retry-after` 给出等待时间
//! - 202 Accepted：异步处理中，可能附带 `sp-resource-path` 指向新的轮询地址
//!
//! 网络层故障（连接失败、超时）则按固定的指数退避重试。
//! 所有等待时间都会被限制在 `[0, max_retry_delay]` 区间内。

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// `retry-after` 缺失或无法解析时的默认等待秒数
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// 网络错误退避上限（秒）
pub const NETWORK_BACKOFF_CAP_SECS: u64 = 5;

// ---------------------------------------------------------------------------
// RetryConfig: 重试策略配置
// ---------------------------------------------------------------------------

/// 重试策略配置
///
/// 每个请求使用一份不可变的配置；调用方可以通过 [`RetryOverrides`]
/// 在单次调用中覆盖部分字段。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 最大重试次数（不含首次执行）
    pub max_retries: u32,
    /// 单次等待的上限（秒）
    pub max_retry_delay: u64,
    /// 是否对 429 响应重试
    pub enable_retry_for_429: bool,
    /// 是否对 202 响应继续轮询
    pub enable_retry_for_202: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_delay: 5,
            enable_retry_for_429: true,
            enable_retry_for_202: true,
        }
    }
}

/// 单次调用的重试配置覆盖项，未设置的字段沿用客户端默认值
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryOverrides {
    pub max_retries: Option<u32>,
    pub max_retry_delay: Option<u64>,
    pub enable_retry_for_429: Option<bool>,
    pub enable_retry_for_202: Option<bool>,
}

impl RetryOverrides {
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn max_retry_delay(mut self, seconds: u64) -> Self {
        self.max_retry_delay = Some(seconds);
        self
    }

    pub fn retry_for_429(mut self, enabled: bool) -> Self {
        self.enable_retry_for_429 = Some(enabled);
        self
    }

    pub fn retry_for_202(mut self, enabled: bool) -> Self {
        self.enable_retry_for_202 = Some(enabled);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl RetryConfig {
    /// 合并单次调用的覆盖项，返回新的配置，原配置不变
    pub fn merged(&self, overrides: &RetryOverrides) -> Self {
        Self {
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            max_retry_delay: overrides.max_retry_delay.unwrap_or(self.max_retry_delay),
            enable_retry_for_429: overrides
                .enable_retry_for_429
                .unwrap_or(self.enable_retry_for_429),
            enable_retry_for_202: overrides
                .enable_retry_for_202
                .unwrap_or(self.enable_retry_for_202),
        }
    }

    /// 是否还能继续重试（attempt 为已完成的重试轮次，从 0 开始）
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// 把秒数限制在 `[0, max_retry_delay]`
    pub fn clamp_secs(&self, seconds: i64) -> Duration {
        let seconds = u64::try_from(seconds).unwrap_or(0);
        Duration::from_secs(seconds.min(self.max_retry_delay))
    }

    /// 根据 `retry-after` 头计算等待时间
    pub fn retry_after_delay(&self, header: Option<&str>) -> Duration {
        self.retry_after_delay_at(header, Utc::now())
    }

    /// 根据 `retry-after` 头计算等待时间，`now` 用于 HTTP-date 形式的换算
    ///
    /// 解析顺序：整数秒 → HTTP-date（RFC 2822）→ RFC 3339 / ISO 8601，
    /// 全部失败时取 1 秒。结果总是落在 `[0, max_retry_delay]` 内。
    pub fn retry_after_delay_at(&self, header: Option<&str>, now: DateTime<Utc>) -> Duration {
        let Some(value) = header.map(str::trim).filter(|v| !v.is_empty()) else {
            return self.clamp_secs(DEFAULT_RETRY_AFTER_SECS as i64);
        };

        if let Ok(seconds) = value.parse::<i64>() {
            return self.clamp_secs(seconds);
        }

        match parse_http_date(value) {
            Some(date) => self.clamp_secs((date - now).num_seconds()),
            None => self.clamp_secs(DEFAULT_RETRY_AFTER_SECS as i64),
        }
    }
}

/// 解析 HTTP-date，兼容 RFC 3339 与不带时区的 ISO 8601（按 UTC 处理）
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// 网络错误的退避时间：`min(2^attempt, 5)` 秒（attempt 从 0 开始）
pub fn network_backoff(attempt: u32) -> Duration {
    let secs = 1u64
        .checked_shl(attempt)
        .unwrap_or(u64::MAX)
        .min(NETWORK_BACKOFF_CAP_SECS);
    Duration::from_secs(secs)
}

// ---------------------------------------------------------------------------
// 单元测试
// ---------------------------------------------------------------------------
