//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand};

/// Mock action-logic 服务命令行工具
#[derive(Parser, Debug)]
#[command(name = "mock-server")]
#[command(version, about = "Simplise action-logic 模拟服务")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// 输出 JSON 格式日志
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动 Mock 服务（HTTP）
    Server {
        /// 服务端口
        #[arg(short, long, default_value = "8089")]
        port: u16,
    },

    /// 按参考真值语义本地求值一条 `bool` 规则，输出与服务端相同的文本
    Eval {
        /// 规则 JSON，如 '{"bool":[{"input":["vip"]}]}'
        rule: String,

        /// 输入数据 JSON 对象
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_defaults() {
        let cli = Cli::try_parse_from(["mock-server", "server"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert!(!cli.json_logs);
        assert!(matches!(cli.command, Commands::Server { port: 8089 }));
    }

    #[test]
    fn test_parse_eval() {
        let cli = Cli::try_parse_from([
            "mock-server",
            "--json-logs",
            "eval",
            r#"{"bool":["0"]}"#,
            "--input",
            r#"{"x":"1"}"#,
        ])
        .unwrap();
        assert!(cli.json_logs);
        match cli.command {
            Commands::Eval { rule, input } => {
                assert_eq!(rule, r#"{"bool":["0"]}"#);
                assert_eq!(input.as_deref(), Some(r#"{"x":"1"}"#));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
