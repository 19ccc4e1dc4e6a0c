//! 类型化构造函数
//!
//! 按操作族分组，每个函数返回一个 [`Operation`] 节点。
//! 固定参数个数的操作由函数签名保证参数个数；
//! 可变参数的操作接受任意 `IntoIterator`，异构参数可用 [`args!`](crate::args) 收集。
//! 构造函数是纯函数，不做本地求值也不产生日志。

use crate::catalog::ActionKind;
use crate::operation::Operation;

/// 可变参数构造函数
macro_rules! variadic {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        pub fn $name<I>(args: I) -> $crate::operation::Operation
        where
            I: IntoIterator,
            I::Item: Into<$crate::operation::OperationArg>,
        {
            $crate::catalog::ActionKind::$kind.node(args.into_iter().map(Into::into).collect())
        }
    };
}

/// 固定参数个数的构造函数
macro_rules! fixed {
    ($(#[$meta:meta])* $name:ident($($param:ident),+) => $kind:ident) => {
        $(#[$meta])*
        pub fn $name($($param: impl Into<$crate::operation::OperationArg>),+) -> $crate::operation::Operation {
            $crate::catalog::ActionKind::$kind.node(vec![$($param.into()),+])
        }
    };
}

pub mod array;
pub mod data;
pub mod decimal;
pub mod logic;
pub mod num;
pub mod string;

/// 把多个操作组合成一个 `sequence` 节点，一次调用提交
pub fn sequence<I>(ops: I) -> Operation
where
    I: IntoIterator<Item = Operation>,
{
    ActionKind::Sequence.node(ops.into_iter().map(Into::into).collect())
}
