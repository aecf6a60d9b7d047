//! 核心模块
//!
//! 包含探测流程和应用程序生命周期管理

pub mod app;
pub mod probe;

// 重新导出主要类型
pub use app::execute_command;
pub use probe::{ProbeOutcome, ProbeRecord, ProbeRunner, EXIT_FAILURE, EXIT_SUCCESS, EXIT_UNCLASSIFIABLE};
