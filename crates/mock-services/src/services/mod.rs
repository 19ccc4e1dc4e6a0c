//! Mock 服务模块
//!
//! 提供模拟的 `/action-logic` REST 端点及测试用的管理端点。

pub mod action_logic;


pub use action_logic::action_logic_routes;
