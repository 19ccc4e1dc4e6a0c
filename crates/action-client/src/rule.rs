//! 线上规则格式
//!
//! `serialize` 把操作树递归展开为 `{operator: [arg, ...]}`，字面量原样保留；
//! `stringify` 是 multipart 传输前的归一化步骤，把所有字面量转为字符串。
//! 两者都是纯函数，相同输入总是得到相同输出。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simplise_shared::error::{ActionError, Result};

use crate::operation::{Operation, OperationArg};

/// 与规则一起提交的输入数据记录
pub type InputData = Map<String, Value>;

/// 线上规则：恰好一个键（操作符）映射到参数数组
///
/// 反序列化经过 [`WireRule::from_value`] 校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct WireRule(Map<String, Value>);

impl WireRule {
    pub fn new(operator: impl Into<String>, args: Vec<Value>) -> Self {
        let mut map = Map::with_capacity(1);
        map.insert(operator.into(), Value::Array(args));
        Self(map)
    }

    /// 校验一段原始 JSON 规则
    ///
    /// 必须是只有一个键的对象；值不是数组时按一元简写包装为单元素数组。
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(ActionError::Serialization(format!(
                "规则必须是 JSON 对象, 实际为 {}",
                json_kind(&value)
            )));
        };
        if map.len() != 1 {
            return Err(ActionError::Serialization(format!(
                "规则必须恰好包含一个操作符, 实际 {} 个",
                map.len()
            )));
        }

        let Some((operator, args)) = map.into_iter().next() else {
            return Err(ActionError::Serialization("规则为空".to_string()));
        };
        if operator.is_empty() {
            return Err(ActionError::Serialization("操作符不能为空".to_string()));
        }
        let args = match args {
            Value::Array(items) => items,
            other => vec![other],
        };
        Ok(Self::new(operator, args))
    }

    pub fn operator(&self) -> &str {
        self.0.keys().next().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[Value] {
        match self.0.values().next() {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for WireRule {
    type Error = ActionError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<WireRule> for Value {
    fn from(rule: WireRule) -> Self {
        rule.into_value()
    }
}

impl fmt::Display for WireRule {
    /// 紧凑 JSON
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = Value::Object(self.0.clone());
        write!(f, "{value}")
    }
}

/// 操作树到线上规则
///
/// 嵌套操作递归序列化，字面量原样保留。非有限浮点数会返回 `Serialization` 错误。
pub fn serialize(operation: &Operation) -> Result<WireRule> {
    let args = operation
        .args()
        .iter()
        .map(serialize_arg)
        .collect::<Result<Vec<_>>>()?;
    Ok(WireRule::new(operation.operator(), args))
}

fn serialize_arg(arg: &OperationArg) -> Result<Value> {
    match arg {
        OperationArg::Operation(op) => serialize(op).map(WireRule::into_value),
        OperationArg::Literal(lit) => lit.to_value(),
    }
}

/// 把 JSON 中的每个字面量递归转为字符串
///
/// - 布尔值 → `"True"` / `"False"`
/// - 整数 → 十进制文本；浮点数 → 带小数部分的最短表示（`0.0`、`3.14`、`1e+20`）
/// - 字符串原样保留，`null` 保持为 `null`
/// - 数组、对象逐元素处理，对象的键不变
pub fn stringify(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(true) => Value::String("True".to_string()),
        Value::Bool(false) => Value::String("False".to_string()),
        Value::Number(n) => {
            let text = if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_float).unwrap_or_else(|| n.to_string())
            };
            Value::String(text)
        }
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => Value::Array(items.iter().map(stringify).collect()),
        Value::Object(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), stringify(v))).collect()),
    }
}

pub fn stringify_rule(rule: &WireRule) -> Value {
    stringify(&Value::Object(rule.0.clone()))
}

pub fn stringify_input(input: &InputData) -> Value {
    stringify(&Value::Object(input.clone()))
}

/// 浮点数的文本形式
///
/// 与远端服务的历史格式一致：`[1e-4, 1e16)` 区间内用定点表示并保证有小数部分，
/// 区间外用科学计数法，指数至少两位并带符号。
pub(crate) fn format_float(x: f64) -> String {
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    if !x.is_finite() {
        return if x.is_nan() {
            "nan".to_string()
        } else if x > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let abs = x.abs();
    if (1e-4..1e16).contains(&abs) {
        let text = x.to_string();
        if text.contains('.') { text } else { format!("{text}.0") }
    } else {
        // `{:e}` 给出 "1.5e-5"，转为 "1.5e-05"
        let text = format!("{x:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => text,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
