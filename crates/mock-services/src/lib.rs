//! Mock Services
//!
//! 模拟远端 `/action-logic` 规则服务，用于集成测试和本地开发。
//!
//! # 主要模块
//!
//! - `models`: 记录的请求与预设的响应
//! - `store`: 请求日志与响应脚本的内存存储
//! - `evaluator`: `bool` / `input` 的参考真值语义
//! - `services`: axum 路由与处理函数
//! - `server`: 在随机端口上启动的测试服务器
//!
//! 这不是规则引擎：默认只回答 `bool` 规则，其它操作符返回 400。
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use mock_services::models::ScriptedResponse;
//! use mock_services::server::MockServer;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let server = MockServer::start().await?;
//! server
//!     .state()
//!     .push_response(ScriptedResponse::accepted().with_header("sp-resource-path", "/poll/1"));
//! server.state().push_response(ScriptedResponse::ok("true"));
//!
//! println!("mock listening on {}", server.base_url());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod evaluator;
pub mod models;
pub mod server;
pub mod services;
pub mod store;
