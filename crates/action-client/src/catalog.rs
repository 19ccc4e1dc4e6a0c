//! 操作符目录
//!
//! 列出构造函数能产生的全部操作符及其线上名称与参数个数。
//! 类型化的构造函数都委托到这里；`ActionKind::build` 同时是运行时按名称
//! 动态构造节点的入口（例如从配置中读出操作符名称）。

use std::fmt;
use std::str::FromStr;

use simplise_shared::error::{ActionError, Result};

use crate::builders::logic::wrap_bool_literals;
use crate::operation::{Operation, OperationArg};

/// 参数个数约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// 恰好 n 个
    Fixed(usize),
    /// [min, max] 闭区间
    Range(usize, usize),
    /// 任意个数，包括 0
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Self::Fixed(n) => count == n,
            Self::Range(min, max) => (min..=max).contains(&count),
            Self::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Range(min, max) => write!(f, "{min}..={max}"),
            Self::Variadic => write!(f, "任意"),
        }
    }
}

macro_rules! action_kinds {
    ($($variant:ident => $operator:literal, $arity:expr;)+) => {
        /// 已知操作符
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ActionKind {
            $($variant,)+
        }

        impl ActionKind {
            /// 目录中的全部操作符
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$variant,)+];

            /// 线上操作符名称
            pub fn operator(&self) -> &'static str {
                match self {
                    $(Self::$variant => $operator,)+
                }
            }

            pub fn arity(&self) -> Arity {
                match self {
                    $(Self::$variant => $arity,)+
                }
            }

            /// 按线上名称查找
            pub fn from_operator(operator: &str) -> Option<Self> {
                match operator {
                    $($operator => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

action_kinds! {
    // data
    Bool => "bool", Arity::Fixed(1);
    Num => "num", Arity::Fixed(1);
    Input => "input", Arity::Fixed(1);
    Null => "null", Arity::Fixed(0);

    // num
    NumAdd => "num.add", Arity::Variadic;
    NumSub => "num.sub", Arity::Fixed(2);
    NumMul => "num.mul", Arity::Fixed(2);
    NumDiv => "num.div", Arity::Fixed(2);
    NumMod => "num.mod", Arity::Fixed(2);
    NumPow => "num.pow", Arity::Fixed(2);
    NumAbs => "num.abs", Arity::Fixed(1);
    NumGt => "num.gt", Arity::Fixed(2);
    NumGte => "num.gte", Arity::Fixed(2);
    NumLt => "num.lt", Arity::Fixed(2);
    NumLte => "num.lte", Arity::Fixed(2);
    NumMax => "num.max", Arity::Variadic;
    NumMin => "num.min", Arity::Variadic;
    NumBetween => "num.between", Arity::Fixed(3);
    NumBetweenExclusive => "num.between_exclusive", Arity::Fixed(3);

    // decimal
    DecimalAdd => "decimal.add", Arity::Variadic;
    DecimalSub => "decimal.sub", Arity::Fixed(2);
    DecimalMul => "decimal.mul", Arity::Fixed(2);
    DecimalDiv => "decimal.div", Arity::Fixed(2);
    DecimalMod => "decimal.mod", Arity::Fixed(2);
    DecimalPow => "decimal.pow", Arity::Fixed(2);
    DecimalAbs => "decimal.abs", Arity::Fixed(1);
    DecimalRound => "decimal.round", Arity::Range(1, 2);
    DecimalGt => "decimal.gt", Arity::Fixed(2);
    DecimalGte => "decimal.gte", Arity::Fixed(2);
    DecimalLt => "decimal.lt", Arity::Fixed(2);
    DecimalLte => "decimal.lte", Arity::Fixed(2);
    DecimalMax => "decimal.max", Arity::Variadic;
    DecimalMin => "decimal.min", Arity::Variadic;
    DecimalBetween => "decimal.between", Arity::Fixed(3);
    DecimalBetweenExclusive => "decimal.between_exclusive", Arity::Fixed(3);

    // logic
    And => "and", Arity::Variadic;
    Or => "or", Arity::Variadic;
    Not => "not", Arity::Fixed(1);
    If => "if", Arity::Fixed(3);
    Eq => "==", Arity::Fixed(2);
    Ne => "!=", Arity::Fixed(2);
    Gt => ">", Arity::Fixed(2);
    Gte => ">=", Arity::Fixed(2);
    Lt => "<", Arity::Fixed(2);
    Lte => "<=", Arity::Fixed(2);

    // string
    Concat => "str.concat", Arity::Variadic;
    Upper => "str.upper", Arity::Fixed(1);
    Lower => "str.lower", Arity::Fixed(1);

    // array
    Filter => "filter", Arity::Fixed(2);
    Map => "map", Arity::Fixed(2);

    Sequence => "sequence", Arity::Variadic;
}

impl ActionKind {
    /// 按运行时参数个数构造节点
    ///
    /// 参数个数不满足 [`Arity`] 时返回 `InvalidArgument`，不截断也不补齐。
    /// `and` 的布尔字面量参数会被包装为 `bool` 节点。
    pub fn build<I>(self, args: I) -> Result<Operation>
    where
        I: IntoIterator,
        I::Item: Into<OperationArg>,
    {
        let args: Vec<OperationArg> = args.into_iter().map(Into::into).collect();
        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(ActionError::invalid_argument(
                self.operator(),
                format!("期望 {} 个参数, 实际 {} 个", arity, args.len()),
            ));
        }
        Ok(self.node(args))
    }

    /// 类型化构造函数使用的入口，参数个数已由函数签名保证
    pub(crate) fn node(self, args: Vec<OperationArg>) -> Operation {
        let args = match self {
            Self::And => wrap_bool_literals(args),
            _ => args,
        };
        Operation::from_parts(self.operator(), args)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operator())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_operator(s).ok_or_else(|| ActionError::invalid_argument(s, "未知的操作符"))
    }
}
