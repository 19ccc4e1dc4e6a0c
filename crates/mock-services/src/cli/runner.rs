//! CLI 命令执行器

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::info;

use crate::evaluator::{evaluate, render};
use crate::server;
use crate::store::MockState;

/// 命令执行器
#[derive(Debug, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// 启动 HTTP 服务并阻塞到 Ctrl+C
    pub async fn run_server(&self, port: u16) -> Result<()> {
        info!(port, "启动 Mock 服务");
        server::serve(port, Arc::new(MockState::new())).await
    }

    /// 本地求值，返回服务端会给出的结果文本
    pub fn run_eval(&self, rule: &str, input: Option<&str>) -> Result<String> {
        let rule: Value = serde_json::from_str(rule).context("规则不是合法的 JSON")?;
        let input = match input {
            Some(text) => match serde_json::from_str::<Value>(text).context("输入数据不是合法的 JSON")? {
                Value::Object(map) => map,
                _ => bail!("输入数据必须是 JSON 对象"),
            },
            None => Map::new(),
        };

        let result = evaluate(&rule, &input)?;
        Ok(render(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_eval() {
        let runner = CommandRunner::new();
        assert_eq!(runner.run_eval(r#"{"bool":["0"]}"#, None).unwrap(), "false");
        assert_eq!(
            runner
                .run_eval(r#"{"bool":[{"input":["vip"]}]}"#, Some(r#"{"vip":"True"}"#))
                .unwrap(),
            "true"
        );
    }

    #[test]
    fn test_run_eval_errors() {
        let runner = CommandRunner::new();
        assert!(runner.run_eval("not json", None).is_err());
        assert!(runner.run_eval(r#"{"bool":[1]}"#, Some("[1]")).is_err());
        assert!(runner.run_eval(r#"{"num.add":[1]}"#, None).is_err());
    }
}
