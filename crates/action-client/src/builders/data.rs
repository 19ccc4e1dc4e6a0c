//! 数据类操作：布尔转换、数值、输入引用，以及输入数据记录

use serde_json::Value;

use crate::catalog::ActionKind;
use crate::operation::{Operation, OperationArg};
use crate::rule::InputData;

fixed! {
    /// `bool(value)`
    ///
    /// 客户端不做任何转换，真值判断完全由远端服务负责：
    /// 数字为 0 时为假；空字符串、忽略大小写等于 `"false"`、
    /// 或可解析为 0 的字符串为假；空数组、空对象和 null 为假；
    /// 布尔值保持不变；其余为真。
    bool(value) => Bool
}

fixed! {
    /// `num(value)`：转换为数值
    num(value) => Num
}

/// `input(key)`：引用输入数据记录中的同名条目，由远端解析
pub fn input(key: impl Into<String>) -> Operation {
    ActionKind::Input.node(vec![OperationArg::from(key.into())])
}

/// `null()`
pub fn null() -> Operation {
    ActionKind::Null.node(Vec::new())
}

/// 单条目的输入数据记录 `{key: value}`
///
/// 不是操作节点，用于组装与规则一起提交的 `input` 部分。
/// 多个条目可以用 `extend` 合并。
pub fn obj(key: impl Into<String>, value: impl Into<Value>) -> InputData {
    let mut record = InputData::new();
    record.insert(key.into(), value.into());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Literal;
    use serde_json::json;

    #[test]
    fn test_bool_passes_value_through() {
        let op = bool(0);
        assert_eq!(op.operator(), "bool");
        assert_eq!(op.args(), &[OperationArg::Literal(Literal::Int(0))]);

        let nested = bool(input("flag"));
        assert_eq!(nested.args()[0].as_operation().map(|o| o.operator()), Some("input"));
    }

    #[test]
    fn test_input_and_null() {
        assert_eq!(input("vip").args(), &[OperationArg::from("vip")]);
        assert!(null().args().is_empty());
        assert_eq!(num("42").operator(), "num");
    }

    #[test]
    fn test_obj_is_single_entry_record() {
        let mut record = obj("user", "alice");
        assert_eq!(record.len(), 1);
        record.extend(obj("age", 30));
        assert_eq!(serde_json::Value::Object(record), json!({"user": "alice", "age": 30}));
    }
}
