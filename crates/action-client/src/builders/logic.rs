//! 逻辑操作族

use crate::catalog::ActionKind;
use crate::operation::{Operation, OperationArg};

/// `and(conditions...)`
///
/// 每个布尔字面量参数都被单独包装为 `bool` 节点，
/// 其余参数（操作、字符串、数字）按原顺序保留。
///
/// ```rust
/// use action_client::{args, data, logic};
///
/// let op = logic::and(args![true, data::input("vip"), false]);
/// assert_eq!(
///     op.to_rule().unwrap().to_string(),
///     r#"{"and":[{"bool":[true]},{"input":["vip"]},{"bool":[false]}]}"#
/// );
/// ```
pub fn and<I>(conditions: I) -> Operation
where
    I: IntoIterator,
    I::Item: Into<OperationArg>,
{
    ActionKind::And.node(conditions.into_iter().map(Into::into).collect())
}

variadic!(or => Or);
fixed!(not(condition) => Not);
fixed!(
    /// `if(condition, then, else)`
    if_then_else(condition, then_value, else_value) => If
);
fixed!(eq(a, b) => Eq);
fixed!(ne(a, b) => Ne);
fixed!(gt(a, b) => Gt);
fixed!(gte(a, b) => Gte);
fixed!(lt(a, b) => Lt);
fixed!(lte(a, b) => Lte);

pub(crate) fn wrap_bool_literals(args: Vec<OperationArg>) -> Vec<OperationArg> {
    args.into_iter()
        .map(|arg| match arg.as_bool_literal() {
            Some(b) => OperationArg::Operation(ActionKind::Bool.node(vec![b.into()])),
            None => arg,
        })
        .collect()
}
