//! `bool` 规则的参考求值
//!
//! 只实现远端服务文档化的真值语义：
//! - 数字为 0 时为假
//! - 字符串为空、忽略大小写等于 `"false"`、或可解析为 0 时为假
//! - 空数组、空对象、null 为假
//! - 布尔值保持不变
//! - 其余为真
//!
//! 支持的操作符只有 `bool` 与 `input`，其它一律拒绝。

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("不支持的操作符: {0}")]
    UnsupportedOperator(String),

    #[error("无效的规则: {0}")]
    InvalidRule(String),
}

impl EvalError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedOperator(_) => "unsupported_operator",
            Self::InvalidRule(_) => "invalid_rule",
        }
    }
}

/// 真值判断
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false") {
                return false;
            }
            !matches!(trimmed.parse::<f64>(), Ok(f) if f == 0.0)
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// 对一条规则求值，顶层必须是 `{operator: args}`
pub fn evaluate(rule: &Value, input: &Map<String, Value>) -> Result<Value, EvalError> {
    match rule {
        Value::Object(map) if map.len() == 1 => apply(map, input),
        _ => Err(EvalError::InvalidRule("规则必须是只包含一个操作符的对象".to_string())),
    }
}

/// 参数求值：单键对象视为嵌套操作，其它值是字面量
fn resolve(arg: &Value, input: &Map<String, Value>) -> Result<Value, EvalError> {
    match arg {
        Value::Object(map) if map.len() == 1 => apply(map, input),
        other => Ok(other.clone()),
    }
}

fn apply(map: &Map<String, Value>, input: &Map<String, Value>) -> Result<Value, EvalError> {
    let Some((operator, args)) = map.iter().next() else {
        return Err(EvalError::InvalidRule("规则为空".to_string()));
    };

    let args: Vec<&Value> = match args {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    match operator.as_str() {
        "bool" => {
            let [arg] = args.as_slice() else {
                return Err(EvalError::InvalidRule(format!("bool 期望 1 个参数, 实际 {} 个", args.len())));
            };
            Ok(Value::Bool(truthy(&resolve(arg, input)?)))
        }
        "input" => {
            let [key] = args.as_slice() else {
                return Err(EvalError::InvalidRule(format!("input 期望 1 个参数, 实际 {} 个", args.len())));
            };
            let key = key
                .as_str()
                .ok_or_else(|| EvalError::InvalidRule("input 的参数必须是字符串".to_string()))?;
            Ok(input.get(key).cloned().unwrap_or(Value::Null))
        }
        other => Err(EvalError::UnsupportedOperator(other.to_string())),
    }
}

/// 结果的纯文本形式，与远端一致：布尔值为 `true` / `false`，字符串不加引号
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy_numbers() {
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(truthy(&json!(-1)));
        assert!(truthy(&json!(0.5)));
    }

    #[test]
    fn test_truthy_strings() {
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!("false")));
        assert!(!truthy(&json!("False")));
        assert!(!truthy(&json!("FALSE")));
        assert!(!truthy(&json!("0")));
        assert!(!truthy(&json!("0.0")));
        assert!(truthy(&json!("True")));
        assert!(truthy(&json!("no")));
        assert!(truthy(&json!("1")));
    }

    #[test]
    fn test_truthy_collections_and_null() {
        assert!(!truthy(&json!([])));
        assert!(!truthy(&json!({})));
        assert!(!truthy(&json!(null)));
        assert!(truthy(&json!([0])));
        assert!(truthy(&json!({"a": 0})));
        assert!(truthy(&json!(true)));
        assert!(!truthy(&json!(false)));
    }

    #[test]
    fn test_evaluate_bool_with_input() {
        let input = json!({"vip": "True", "score": "0"});
        let input = input.as_object().unwrap();

        assert_eq!(evaluate(&json!({"bool": ["0"]}), input), Ok(json!(false)));
        assert_eq!(evaluate(&json!({"bool": [{"input": ["vip"]}]}), input), Ok(json!(true)));
        assert_eq!(evaluate(&json!({"bool": [{"input": ["score"]}]}), input), Ok(json!(false)));
        assert_eq!(evaluate(&json!({"bool": [{"input": ["missing"]}]}), input), Ok(json!(false)));
    }

    #[test]
    fn test_evaluate_rejects_other_operators() {
        let input = Map::new();
        let err = evaluate(&json!({"num.add": [1, 2]}), &input).unwrap_err();
        assert_eq!(err, EvalError::UnsupportedOperator("num.add".to_string()));
        assert_eq!(err.code(), "unsupported_operator");

        let err = evaluate(&json!({"bool": [1, 2]}), &input).unwrap_err();
        assert_eq!(err.code(), "invalid_rule");
        assert!(evaluate(&json!([1]), &input).is_err());
        assert_eq!(evaluate(&json!({"bool": [[]]}), &input), Ok(json!(false)));
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!(true)), "true");
        assert_eq!(render(&json!("x")), "x");
    }
}
