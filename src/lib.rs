//! Status Scraper - 服务状态页抓取与上报工具
//!
//! 抓取外部服务的状态页，按CSS选择器提取状态文本，判断服务正常/异常后
//! 通过带认证的HTTP POST上报到状态服务器。每次运行只探测一个服务：
//! - 精确文本比较 + 关键词正则回退的状态分类
//! - TOML配置文件 / 环境变量配置
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod report;
pub mod status;


// 重新导出主要类型
pub use config::{ProbeConfig, RawProbeConfig};
pub use error::ProbeError;
pub use status::{classify, Classification, ClassificationInput, StatusKind};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
