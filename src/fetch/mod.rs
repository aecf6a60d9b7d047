//! 状态页抓取模块
//!
//! 提供状态页下载和CSS选择器文本提取功能

pub mod extract;
pub mod fetcher;

// 重新导出主要类型
pub use extract::extract_text;
pub use fetcher::{HttpPageFetcher, StatusPageFetcher};
