//! 共享库
//!
//! 包含 action 客户端与 mock 服务共用的错误类型、配置加载、重试策略与可观测性初始化代码。

pub mod config;
pub mod error;
pub mod observability;
pub mod retry;

pub use self::config::{BodyEncoding, ClientConfig};
pub use error::{ActionError, Result};
pub use retry::{RetryConfig, RetryOverrides};
