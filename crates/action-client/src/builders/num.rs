//! 数值操作族 `num.*`

variadic!(add => NumAdd);
fixed!(sub(a, b) => NumSub);
fixed!(mul(a, b) => NumMul);
fixed!(div(a, b) => NumDiv);
fixed!(
    /// `num.mod`
    modulo(a, b) => NumMod
);
fixed!(pow(base, exponent) => NumPow);
fixed!(abs(value) => NumAbs);
fixed!(gt(a, b) => NumGt);
fixed!(gte(a, b) => NumGte);
fixed!(lt(a, b) => NumLt);
fixed!(lte(a, b) => NumLte);
variadic!(max => NumMax);
variadic!(min => NumMin);
fixed!(
    /// 闭区间 `lower <= value <= upper`
    between(value, lower, upper) => NumBetween
);
fixed!(
    /// 开区间 `lower < value < upper`
    between_exclusive(value, lower, upper) => NumBetweenExclusive
);
