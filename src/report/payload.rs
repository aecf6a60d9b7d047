//! 上报数据结构
//!
//! 定义发送到状态服务器的JSON报文

use crate::status::{Classification, MatchEvidence, StatusKind};
use serde::{Deserialize, Serialize};

/// 状态上报报文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// 抓取到的原始状态文本
    pub description: String,
    /// 是否为信息性事件，抓取结果固定为 `false`
    pub informational: bool,
    /// 分类得到的状态
    pub status: StatusKind,
    /// 正则匹配证据，仅正则回退匹配时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<MatchEvidence>,
}

impl StatusReport {
    /// 根据分类结果构建上报报文
    ///
    /// # 参数
    /// * `description` - 抓取到的原始状态文本
    /// * `classification` - 分类结果
    ///
    /// # 返回
    /// * `Option<Self>` - 无法判断状态时返回 `None`
    pub fn from_classification(description: &str, classification: &Classification) -> Option<Self> {
        let status = classification.status()?;

        Some(Self {
            description: description.to_string(),
            informational: false,
            status,
            extra: classification.evidence().cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exact_report_omits_extra() {
        let report =
            StatusReport::from_classification("Smooth sailing!", &Classification::ExactUp).unwrap();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "description": "Smooth sailing!",
                "informational": false,
                "status": "up"
            })
        );
    }

    #[test]
    fn test_regex_report_includes_extra() {
        let text = "Some systems are experiencing difficulty";
        let classification = Classification::RegexDown(MatchEvidence::new(text, "Some systems"));
        let report = StatusReport::from_classification(text, &classification).unwrap();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "description": text,
                "informational": false,
                "status": "down",
                "extra": {
                    "notes": crate::status::REGEX_MATCH_NOTES,
                    "actual_text": text,
                    "matched_text": "Some systems"
                }
            })
        );
    }

    #[test]
    fn test_unclassifiable_produces_no_report() {
        assert!(StatusReport::from_classification("???", &Classification::Unclassifiable).is_none());
    }
}
