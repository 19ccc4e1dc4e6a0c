//! 内存存储
//!
//! 请求日志与响应脚本都放在 parking_lot 互斥锁后面，由所有请求处理函数共享。

mod request_log;

pub use request_log::MockState;
