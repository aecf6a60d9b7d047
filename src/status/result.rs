//! 状态分类结果数据结构
//!
//! 定义分类输出的状态枚举、正则匹配证据以及分类结果

use serde::{Deserialize, Serialize};

/// 正则匹配时附带的固定免责说明
pub const REGEX_MATCH_NOTES: &str =
    "The status was extracted from the webpage text and may not be completely accurate.";

/// 服务状态，序列化为 `"up"` / `"down"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// 服务正常
    Up,
    /// 服务异常
    Down,
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusKind::Up => write!(f, "up"),
            StatusKind::Down => write!(f, "down"),
        }
    }
}

/// 正则回退匹配时记录的证据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvidence {
    /// 固定免责说明
    pub notes: String,
    /// 抓取到的原始文本
    pub actual_text: String,
    /// 正则实际捕获的片段（保留原始大小写）
    pub matched_text: String,
}

impl MatchEvidence {
    /// 创建匹配证据
    pub fn new(actual_text: &str, matched_text: &str) -> Self {
        Self {
            notes: REGEX_MATCH_NOTES.to_string(),
            actual_text: actual_text.to_string(),
            matched_text: matched_text.to_string(),
        }
    }
}

/// 分类结果
///
/// 精确匹配不带证据；正则回退匹配携带 [`MatchEvidence`]；
/// 无法判断时返回 `Unclassifiable`，由调用方决定退出码。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 与期望的正常文本完全一致
    ExactUp,
    /// 与期望的异常文本完全一致
    ExactDown,
    /// 正则匹配到正常关键词
    RegexUp(MatchEvidence),
    /// 正则匹配到异常关键词
    RegexDown(MatchEvidence),
    /// 无法判断状态
    Unclassifiable,
}

impl Classification {
    /// 获取分类得到的状态，无法判断时返回 `None`
    pub fn status(&self) -> Option<StatusKind> {
        match self {
            Classification::ExactUp | Classification::RegexUp(_) => Some(StatusKind::Up),
            Classification::ExactDown | Classification::RegexDown(_) => Some(StatusKind::Down),
            Classification::Unclassifiable => None,
        }
    }

    /// 获取正则匹配证据（仅正则回退匹配时存在）
    pub fn evidence(&self) -> Option<&MatchEvidence> {
        match self {
            Classification::RegexUp(evidence) | Classification::RegexDown(evidence) => {
                Some(evidence)
            }
            _ => None,
        }
    }

    /// 是否为精确匹配
    pub fn is_exact(&self) -> bool {
        matches!(self, Classification::ExactUp | Classification::ExactDown)
    }

    /// 是否无法判断
    pub fn is_unclassifiable(&self) -> bool {
        matches!(self, Classification::Unclassifiable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_kind_serialization() {
        assert_eq!(serde_json::to_string(&StatusKind::Up).unwrap(), "\"up\"");
        assert_eq!(serde_json::to_string(&StatusKind::Down).unwrap(), "\"down\"");
    }

    #[test]
    fn test_exact_classification_has_no_evidence() {
        assert_eq!(Classification::ExactUp.status(), Some(StatusKind::Up));
        assert_eq!(Classification::ExactDown.status(), Some(StatusKind::Down));
        assert!(Classification::ExactUp.evidence().is_none());
        assert!(Classification::ExactDown.is_exact());
    }

    #[test]
    fn test_regex_classification_carries_evidence() {
        let result = Classification::RegexDown(MatchEvidence::new("Some trouble", "trouble"));
        assert_eq!(result.status(), Some(StatusKind::Down));
        assert!(!result.is_exact());

        let evidence = result.evidence().unwrap();
        assert_eq!(evidence.notes, REGEX_MATCH_NOTES);
        assert_eq!(evidence.actual_text, "Some trouble");
        assert_eq!(evidence.matched_text, "trouble");
    }

    #[test]
    fn test_unclassifiable_has_no_status() {
        assert!(Classification::Unclassifiable.status().is_none());
        assert!(Classification::Unclassifiable.evidence().is_none());
        assert!(Classification::Unclassifiable.is_unclassifiable());
    }
}
