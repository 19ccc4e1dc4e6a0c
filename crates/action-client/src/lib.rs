//! Simplise action 客户端
//!
//! 构建结构化的规则表达式（类似 JsonLogic 的操作树），
//! 序列化为远端规则服务的线上格式并通过 HTTP 提交，返回单个字符串结果。
//!
//! - `operation`: 不可变的操作树节点
//! - `catalog`: 操作符目录（线上名称与参数个数）
//! - `builders`: 各类操作的类型化构造函数
//! - `rule`: 操作树到线上规则的序列化，以及 multipart 传输前的字符串化
//! - `transport`: HTTP 传输抽象与 reqwest 实现
//! - `client`: 带 429/202 重试协议的执行客户端
//!
//! # 使用示例
//!
//! ```rust
//! use action_client::{args, data, decimal, logic};
//!
//! let total = decimal::mul(decimal::add([5, 3]), 2);
//! let rule = total.to_rule().unwrap();
//! assert_eq!(
//!     rule.to_string(),
//!     r#"{"decimal.mul":[{"decimal.add":[5,3]},2]}"#
//! );
//!
//! let guard = logic::and(args![true, data::input("vip")]);
//! assert_eq!(
//!     guard.to_rule().unwrap().to_string(),
//!     r#"{"and":[{"bool":[true]},{"input":["vip"]}]}"#
//! );
//! ```

pub mod builders;
pub mod catalog;
pub mod client;
pub mod operation;
pub mod rule;
pub mod transport;

pub use builders::{array, data, decimal, logic, num, sequence, string};
pub use catalog::{ActionKind, Arity};
pub use client::{ActionClient, RequestOptions};
pub use operation::{Literal, Operation, OperationArg};
pub use rule::{InputData, WireRule, serialize, stringify};
pub use transport::{ActionRequest, ActionResponse, ActionTransport, HttpTransport};

pub use simplise_shared::{ActionError, BodyEncoding, ClientConfig, Result, RetryConfig, RetryOverrides};
