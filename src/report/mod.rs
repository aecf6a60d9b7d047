//! 状态上报模块
//!
//! 提供上报报文构建和发送功能

pub mod http;
pub mod payload;
pub mod sender;

// 重新导出主要类型
pub use http::HttpStatusReporter;
pub use payload::StatusReport;
pub use sender::{ReportResponse, StatusReporter};
