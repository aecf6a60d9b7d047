//! 状态分类模块
//!
//! 提供状态文本分类逻辑和分类结果类型

pub mod classifier;
pub mod result;

// 重新导出主要类型
pub use classifier::{classify, ClassificationInput};
pub use result::{Classification, MatchEvidence, StatusKind, REGEX_MATCH_NOTES};
