//! 操作树
//!
//! 一个 [`Operation`] 是规则表达式中的一个节点：操作符名称 + 有序参数列表。
//! 参数可以是嵌套的操作，也可以是字面量。节点构造后不可变，
//! 由持有它的父节点或调用方独占。

use std::fmt;

use serde_json::Value;
use simplise_shared::error::{ActionError, Result};

use crate::rule::{self, WireRule};

/// 字面量参数
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// 数组、对象或超出 i64 范围的整数，原样透传
    ///
    /// 单键对象与嵌套规则在线上无法区分，序列化时会被拒绝。
    Json(Value),
}

impl Literal {
    /// 转换为 JSON 值；非有限浮点数（NaN、∞）无法表示
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Self::Null => Ok(Value::Null),
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Int(i) => Ok(Value::from(*i)),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .ok_or_else(|| ActionError::Serialization(format!("无法表示的浮点数: {f}"))),
            Self::Str(s) => Ok(Value::String(s.clone())),
            Self::Json(v) if looks_like_rule(v) => Err(ActionError::Serialization(format!(
                "单键对象字面量会被当作操作解析, 请改用 Operation: {v}"
            ))),
            Self::Json(v) => Ok(v.clone()),
        }
    }
}

/// 递归查找单键对象
fn looks_like_rule(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.len() == 1 || map.values().any(looks_like_rule),
        Value::Array(items) => items.iter().any(looks_like_rule),
        _ => false,
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => Self::Str(s),
            Value::Number(n) if n.is_f64() => n.as_f64().map_or(Self::Json(Value::Number(n.clone())), Self::Float),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Json(Value::Number(n)),
            },
            other => Self::Json(other),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// 操作参数：嵌套操作或字面量
#[derive(Debug, Clone, PartialEq)]
pub enum OperationArg {
    Operation(Operation),
    Literal(Literal),
}

impl OperationArg {
    /// 如果参数是布尔字面量，返回其值
    pub fn as_bool_literal(&self) -> Option<bool> {
        match self {
            Self::Literal(Literal::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Self::Operation(op) => Some(op),
            Self::Literal(_) => None,
        }
    }
}

impl fmt::Display for OperationArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(op) => op.fmt(f),
            Self::Literal(lit) => lit.fmt(f),
        }
    }
}

impl From<Operation> for OperationArg {
    fn from(op: Operation) -> Self {
        Self::Operation(op)
    }
}

impl From<Literal> for OperationArg {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl From<Value> for OperationArg {
    fn from(value: Value) -> Self {
        Self::Literal(value.into())
    }
}

impl From<bool> for OperationArg {
    fn from(b: bool) -> Self {
        Self::Literal(Literal::Bool(b))
    }
}

impl From<&str> for OperationArg {
    fn from(s: &str) -> Self {
        Self::Literal(Literal::Str(s.to_string()))
    }
}

impl From<String> for OperationArg {
    fn from(s: String) -> Self {
        Self::Literal(Literal::Str(s))
    }
}

impl From<&String> for OperationArg {
    fn from(s: &String) -> Self {
        Self::Literal(Literal::Str(s.clone()))
    }
}

impl From<f64> for OperationArg {
    fn from(f: f64) -> Self {
        Self::Literal(Literal::Float(f))
    }
}

impl From<f32> for OperationArg {
    fn from(f: f32) -> Self {
        Self::Literal(Literal::Float(f64::from(f)))
    }
}

impl From<u64> for OperationArg {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(i) => Self::Literal(Literal::Int(i)),
            Err(_) => Self::Literal(Literal::Json(Value::from(n))),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OperationArg {
                fn from(n: $ty) -> Self {
                    Self::Literal(Literal::Int(i64::from(n)))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// 操作树节点
///
/// 相等性是结构相等：操作符相同，且参数按顺序递归相等。
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    operator: String,
    args: Vec<OperationArg>,
}

impl Operation {
    /// 创建任意操作符的节点
    ///
    /// 这一层不校验操作符名称和参数个数（那是构造函数的职责），
    /// 只保证操作符非空。
    pub fn new<I>(operator: impl Into<String>, args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<OperationArg>,
    {
        let operator = operator.into();
        if operator.trim().is_empty() {
            return Err(ActionError::invalid_argument("<empty>", "操作符不能为空"));
        }

        Ok(Self {
            operator,
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// 目录内操作符的构造入口，操作符来自静态表，必然非空
    pub(crate) fn from_parts(operator: &'static str, args: Vec<OperationArg>) -> Self {
        debug_assert!(!operator.is_empty());
        Self {
            operator: operator.to_string(),
            args,
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn args(&self) -> &[OperationArg] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<OperationArg>) {
        (self.operator, self.args)
    }

    /// 序列化为线上规则
    pub fn to_rule(&self) -> Result<WireRule> {
        rule::serialize(self)
    }
}

impl fmt::Display for Operation {
    /// 紧凑的函数调用形式，如 `decimal.mul(decimal.add(5, 3), 2)`，用于日志
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operator)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// 把异构参数收集为 `Vec<OperationArg>`，用于可变参数的构造函数
///
/// ```rust
/// use action_client::{args, data, num};
///
/// let sum = num::add(args![1, 2.5, data::input("bonus")]);
/// assert_eq!(sum.args().len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::OperationArg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::OperationArg::from($arg)),+]
    };
}
