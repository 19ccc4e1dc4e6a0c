//! 高精度十进制操作族 `decimal.*`
//!
//! 与 `num.*` 形状相同，只是由远端按精确十进制运算。客户端不做本地计算。

variadic!(add => DecimalAdd);
fixed!(sub(a, b) => DecimalSub);
fixed!(mul(a, b) => DecimalMul);
fixed!(div(a, b) => DecimalDiv);
fixed!(
    /// `decimal.mod`
    modulo(a, b) => DecimalMod
);
fixed!(pow(base, exponent) => DecimalPow);
fixed!(abs(value) => DecimalAbs);
fixed!(
    /// 保留 `precision` 位小数；省略精度时用 [`ActionKind::build`](crate::ActionKind::build)
    round(value, precision) => DecimalRound
);
fixed!(gt(a, b) => DecimalGt);
fixed!(gte(a, b) => DecimalGte);
fixed!(lt(a, b) => DecimalLt);
fixed!(lte(a, b) => DecimalLte);
variadic!(max => DecimalMax);
variadic!(min => DecimalMin);
fixed!(between(value, lower, upper) => DecimalBetween);
fixed!(between_exclusive(value, lower, upper) => DecimalBetweenExclusive);
