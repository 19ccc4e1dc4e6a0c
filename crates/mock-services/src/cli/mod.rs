//! CLI 模块
//!
//! 定义命令行结构并把子命令分发到具体实现。

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
