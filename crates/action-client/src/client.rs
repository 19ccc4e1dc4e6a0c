//! 执行客户端
//!
//! 把操作树或原始规则提交到 `/action-logic`，并驱动 429/202 重试协议：
//!
//! - 2xx（202 除外）：成功，返回响应
//! - 202：按 `retry-after` 等待后重发；带 `sp-resource-path` 时改为 GET 该路径
//! - 429：按 `retry-after` 等待后重发原请求
//! - 其它非 2xx：立即返回 `RemoteRejection`，不重试
//! - 网络错误：按 `min(2^attempt, 5)` 秒退避，最后一次的错误向上传播
//!
//! 429/202 重试用尽时返回最后一个响应而不是错误，调用方需要检查状态，
//! 或使用 [`ActionResponse::into_result`] 得到类型化的失败。

use simplise_shared::config::{BodyEncoding, ClientConfig};
use simplise_shared::error::Result;
use simplise_shared::observability::metrics;
use simplise_shared::retry::{RetryConfig, RetryOverrides, network_backoff};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::builders::sequence;
use crate::operation::Operation;
use crate::rule::{self, InputData, WireRule};
use crate::transport::{ActionRequest, ActionResponse, ActionTransport, HttpTransport, RequestBody};

/// 单次调用的选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// 合并到客户端默认重试配置上的覆盖项
    pub retry: RetryOverrides,
    /// 覆盖客户端默认的请求体编码
    pub encoding: Option<BodyEncoding>,
}

impl RequestOptions {
    pub fn with_retry(mut self, retry: RetryOverrides) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

/// action 执行客户端
///
/// 构造后配置只读，可以在多个任务间共享并发调用。
#[derive(Debug, Clone)]
pub struct ActionClient<T = HttpTransport> {
    transport: T,
    retry: RetryConfig,
    encoding: BodyEncoding,
}

impl ActionClient<HttpTransport> {
    /// 使用 reqwest 传输创建客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        metrics::describe();

        let transport = HttpTransport::new(&config)?;
        info!(
            base_url = %transport.base_url(),
            timeout_secs = config.timeout_seconds,
            max_retries = config.retry.max_retries,
            "action 客户端已初始化"
        );

        Ok(Self::with_transport(transport, config.retry, config.body_encoding))
    }

    /// 从 `.env`、配置文件和 `SIMPLISE_` 环境变量加载配置并创建客户端
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::load()?)
    }
}

impl<T: ActionTransport> ActionClient<T> {
    pub fn with_transport(transport: T, retry: RetryConfig, encoding: BodyEncoding) -> Self {
        Self {
            transport,
            retry,
            encoding,
        }
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 序列化并执行一个操作
    pub async fn execute(&self, operation: &Operation, input: Option<&InputData>) -> Result<ActionResponse> {
        self.execute_with(operation, input, &RequestOptions::default()).await
    }

    pub async fn execute_with(
        &self,
        operation: &Operation,
        input: Option<&InputData>,
        options: &RequestOptions,
    ) -> Result<ActionResponse> {
        let rule = rule::serialize(operation)?;
        self.execute_raw_with(&rule, input, options).await
    }

    /// 一次提交多个操作；多于一个时包装为 `sequence`
    pub async fn execute_all(&self, operations: &[Operation], input: Option<&InputData>) -> Result<ActionResponse> {
        match operations {
            [single] => self.execute(single, input).await,
            many => self.execute(&sequence(many.iter().cloned()), input).await,
        }
    }

    /// 直接提交一条线上规则，不经过构造函数
    pub async fn execute_raw(&self, rule: &WireRule, data: Option<&InputData>) -> Result<ActionResponse> {
        self.execute_raw_with(rule, data, &RequestOptions::default()).await
    }

    #[instrument(skip_all, fields(operator = %rule.operator()))]
    pub async fn execute_raw_with(
        &self,
        rule: &WireRule,
        data: Option<&InputData>,
        options: &RequestOptions,
    ) -> Result<ActionResponse> {
        let retry = self.retry.merged(&options.retry);
        let encoding = options.encoding.unwrap_or(self.encoding);
        let request = ActionRequest::post(build_body(rule, data, encoding));

        self.send_with_retry(request, &retry).await
    }

    async fn send_with_retry(&self, mut request: ActionRequest, retry: &RetryConfig) -> Result<ActionResponse> {
        let mut attempt: u32 = 0;

        loop {
            let sent = attempt + 1;

            let response = match self.transport.send(&request).await {
                Ok(response) => response.with_attempts(sent),
                Err(err) => {
                    metrics::record_attempt("transport_error");

                    if !err.is_retryable() || !retry.should_retry(attempt) {
                        warn!(attempt = sent, error = %err, "action 请求失败, 放弃重试");
                        return Err(err);
                    }

                    let delay = network_backoff(attempt);
                    warn!(
                        attempt = sent,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "网络错误, 将在退避后重试"
                    );
                    metrics::record_retry("transport_error");
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }
            };

            let status = response.status();
            metrics::record_attempt(status.as_str());

            let reason = if response.is_pending() && retry.enable_retry_for_202 {
                "accepted"
            } else if response.is_rate_limited() && retry.enable_retry_for_429 {
                "rate_limited"
            } else if status.is_success() || response.is_pending() || response.is_rate_limited() {
                if attempt > 0 {
                    info!(attempt = sent, status = status.as_u16(), "action 请求在重试后完成");
                }
                return Ok(response);
            } else {
                warn!(attempt = sent, status = status.as_u16(), "action 请求被远端拒绝");
                return Err(response.rejection());
            };

            if !retry.should_retry(attempt) {
                warn!(
                    attempt = sent,
                    status = status.as_u16(),
                    max_retries = retry.max_retries,
                    "已达最大重试次数, 返回最后一个响应"
                );
                return Ok(response);
            }

            let delay = retry.retry_after_delay(response.retry_after());
            if response.is_pending() {
                if let Some(path) = response.resource_path() {
                    request = ActionRequest::poll(path);
                }
            }

            info!(
                attempt = sent,
                status = status.as_u16(),
                delay_secs = delay.as_secs(),
                path = %request.path,
                "action 请求未完成, 等待后重试"
            );
            metrics::record_retry(reason);
            sleep(delay).await;
            attempt += 1;
        }
    }
}

/// 组装请求体
///
/// 有输入数据时总是 multipart（`action` + `input`，均已字符串化）；
/// 没有输入数据时按编码选择单部分 multipart 或未字符串化的 JSON 文档。
pub(crate) fn build_body(rule: &WireRule, data: Option<&InputData>, encoding: BodyEncoding) -> RequestBody {
    match (data.filter(|d| !d.is_empty()), encoding) {
        (Some(data), _) => RequestBody::Multipart {
            action: rule::stringify_rule(rule),
            input: Some(rule::stringify_input(data)),
        },
        (None, BodyEncoding::Multipart) => RequestBody::Multipart {
            action: rule::stringify_rule(rule),
            input: None,
        },
        (None, BodyEncoding::Json) => RequestBody::Json(rule.to_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::data;
    use crate::transport::{HttpMethod, MockActionTransport};
    use mockall::Sequence;
    use reqwest::StatusCode;
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde_json::json;
    use simplise_shared::error::ActionError;
    use std::time::Duration;
    use tokio::time::Instant;

    fn response(status: u16, body: &str, headers: &[(&'static str, &'static str)]) -> ActionResponse {
        let mut map = HeaderMap::new();
        for &(name, value) in headers {
            map.insert(name, HeaderValue::from_static(value));
        }
        ActionResponse::new(StatusCode::from_u16(status).unwrap(), map, body)
    }

    fn client(mock: MockActionTransport, max_retries: u32) -> ActionClient<MockActionTransport> {
        let retry = RetryConfig {
            max_retries,
            ..RetryConfig::default()
        };
        ActionClient::with_transport(mock, retry, BodyEncoding::Multipart)
    }

    #[test]
    fn test_build_body_with_input_is_multipart() {
        let rule = rule::serialize(&data::bool(data::input("flag"))).unwrap();
        let input = data::obj("flag", true);

        let body = build_body(&rule, Some(&input), BodyEncoding::Json);
        assert_eq!(
            body,
            RequestBody::Multipart {
                action: json!({"bool": [{"input": ["flag"]}]}),
                input: Some(json!({"flag": "True"})),
            }
        );
    }

    #[test]
    fn test_build_body_without_input() {
        let rule = rule::serialize(&data::bool(0)).unwrap();

        assert_eq!(
            build_body(&rule, None, BodyEncoding::Multipart),
            RequestBody::Multipart {
                action: json!({"bool": ["0"]}),
                input: None,
            }
        );
        assert_eq!(
            build_body(&rule, Some(&InputData::new()), BodyEncoding::Json),
            RequestBody::Json(json!({"bool": [0]}))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Post && req.path == "/action-logic")
            .times(1)
            .returning(|_| Ok(response(200, "true", &[])));

        let resp = client(mock, 3).execute(&data::bool(1), None).await.unwrap();
        assert_eq!(resp.text(), "true");
        assert_eq!(resp.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_follows_resource_path() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Post)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(202, "", &[("sp-resource-path", "/poll/1"), ("retry-after", "1")])));
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Get && req.path == "/poll/1" && req.body == RequestBody::Empty)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, "result", &[])));

        let resp = client(mock, 3).execute(&data::bool(1), None).await.unwrap();
        assert_eq!(resp.text(), "result");
        assert_eq!(resp.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_without_path_resends_original() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Post)
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(202, "", &[])));
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Post)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, "done", &[])));

        let start = Instant::now();
        let resp = client(mock, 3).execute(&data::bool(1), None).await.unwrap();
        assert_eq!(resp.text(), "done");
        // 缺少 retry-after 时每次等待 1 秒
        assert_eq!(start.elapsed().as_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_returns_last_response() {
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(3)
            .returning(|_| Ok(response(429, "slow down", &[("retry-after", "0")])));

        let resp = client(mock, 2).execute(&data::bool(1), None).await.unwrap();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.attempts(), 3);

        let err = resp.into_result().unwrap_err();
        assert!(matches!(err, ActionError::RetryExhausted { status: 429, attempts: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_exhaustion_returns_last_pending_response() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Post && req.path == "/action-logic")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(202, "", &[("sp-resource-path", "/poll/7"), ("retry-after", "1")])));
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Get && req.path == "/poll/7" && req.body == RequestBody::Empty)
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(202, "", &[("sp-resource-path", "/poll/7"), ("retry-after", "1")])));

        let start = Instant::now();
        let resp = client(mock, 2).execute(&data::bool(1), None).await.unwrap();
        assert!(resp.is_pending());
        assert_eq!(resp.attempts(), 3);
        assert_eq!(resp.resource_path(), Some("/poll/7"));
        assert_eq!(start.elapsed().as_secs(), 2);

        let err = resp.into_result().unwrap_err();
        assert!(matches!(err, ActionError::RetryExhausted { status: 202, attempts: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_exhaustion_without_path_resends_post() {
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .withf(|req| req.method == HttpMethod::Post && req.path == "/action-logic")
            .times(3)
            .returning(|_| Ok(response(202, "queued", &[])));

        let resp = client(mock, 2).execute(&data::bool(1), None).await.unwrap();
        assert!(resp.is_pending());
        assert_eq!(resp.attempts(), 3);
        assert_eq!(resp.body(), "queued");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honors_http_date() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                let at = (chrono::Utc::now() + chrono::Duration::seconds(11)).to_rfc2822();
                let mut headers = HeaderMap::new();
                headers.insert("retry-after", HeaderValue::from_str(&at).unwrap());
                Ok(ActionResponse::new(StatusCode::TOO_MANY_REQUESTS, headers, ""))
            });
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, "ok", &[])));

        let retry = RetryConfig {
            max_retry_delay: 30,
            ..RetryConfig::default()
        };
        let client = ActionClient::with_transport(mock, retry, BodyEncoding::Multipart);

        let start = Instant::now();
        let resp = client.execute(&data::bool(1), None).await.unwrap();
        assert_eq!(resp.text(), "ok");
        // HTTP-date 精确到秒，换算结果约为 10 秒
        let waited = start.elapsed().as_secs();
        assert!((9..=11).contains(&waited), "waited {waited}s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_elapsed_http_date_retries_immediately() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(429, "", &[("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT")])));
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, "ok", &[])));

        let start = Instant::now();
        let resp = client(mock, 3).execute(&data::bool(1), None).await.unwrap();
        assert_eq!(resp.attempts(), 2);
        assert_eq!(start.elapsed().as_secs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honors_retry_after() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(429, "", &[("retry-after", "2")])));
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, "ok", &[])));

        let start = Instant::now();
        let resp = client(mock, 3).execute(&data::bool(1), None).await.unwrap();
        assert_eq!(resp.text(), "ok");
        assert_eq!(start.elapsed().as_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_is_clamped() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(429, "", &[("retry-after", "120")])));
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, "ok", &[])));

        let start = Instant::now();
        client(mock, 3).execute(&data::bool(1), None).await.unwrap();
        // max_retry_delay 默认 5 秒
        assert_eq!(start.elapsed().as_secs(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_status_is_not_retried() {
        let mut mock = MockActionTransport::new();
        mock.expect_send().times(1).returning(|_| {
            Ok(response(
                400,
                r#"{"error":"unsupported_operator","message":"num.unknown"}"#,
                &[],
            ))
        });

        let err = client(mock, 3).execute(&data::bool(1), None).await.unwrap_err();
        match err {
            ActionError::RemoteRejection { status, error, .. } => {
                assert_eq!(status, 400);
                assert_eq!(error, "unsupported_operator");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_backs_off_then_propagates() {
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(3)
            .returning(|_| Err(ActionError::transport("connection refused")));

        let start = Instant::now();
        let err = client(mock, 2).execute(&data::bool(1), None).await.unwrap_err();
        assert_eq!(err.code(), "TRANSPORT_ERROR");
        // 1s + 2s
        assert_eq!(start.elapsed().as_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_then_success() {
        let mut seq = Sequence::new();
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ActionError::transport("timeout")));
        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, "42", &[])));

        let resp = client(mock, 3).execute(&data::num("42"), None).await.unwrap();
        assert_eq!(resp.text(), "42");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_accepted_retry_returns_response() {
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(response(202, "", &[("sp-resource-path", "/poll/1")])));

        let options = RequestOptions::default().with_retry(RetryOverrides::default().retry_for_202(false));
        let resp = client(mock, 3)
            .execute_with(&data::bool(1), None, &options)
            .await
            .unwrap();
        assert!(resp.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_call_override_limits_retries() {
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(response(429, "", &[("retry-after", "1")])));

        let options = RequestOptions::default().with_retry(RetryOverrides::default().max_retries(0));
        let resp = client(mock, 3)
            .execute_with(&data::bool(1), None, &options)
            .await
            .unwrap();
        assert!(resp.is_rate_limited());
        assert_eq!(resp.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_all_wraps_in_sequence() {
        let mut mock = MockActionTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.body
                    == RequestBody::Json(json!({"sequence": [{"input": ["a"]}, {"input": ["b"]}]}))
            })
            .times(1)
            .returning(|_| Ok(response(200, "ok", &[])));

        let client = ActionClient::with_transport(mock, RetryConfig::default(), BodyEncoding::Json);
        let resp = client
            .execute_all(&[data::input("a"), data::input("b")], None)
            .await
            .unwrap();
        assert!(resp.is_success());
    }
}
