//! 字符串操作族 `str.*`

variadic!(concat => Concat);
fixed!(upper(value) => Upper);
fixed!(lower(value) => Lower);
