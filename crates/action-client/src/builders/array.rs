//! 数组操作

fixed!(
    /// 保留满足 `condition` 的元素
    filter(array, condition) => Filter
);
fixed!(
    /// 对每个元素应用 `transform`
    map(array, transform) => Map
);
