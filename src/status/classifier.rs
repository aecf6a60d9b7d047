//! 状态文本分类器
//!
//! 按固定优先级对抓取到的状态文本进行分类：
//! 1. 与期望的正常文本精确比较
//! 2. 与期望的异常文本精确比较（仅在配置了异常文本时）
//! 3. 正常关键词正则回退
//! 4. 异常关键词正则回退
//!
//! 任一层命中即返回，正常关键词总是先于异常关键词检查。

use crate::status::result::{Classification, MatchEvidence};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

/// 正常状态关键词（大小写不敏感，单词边界锚定）
const UP_PATTERN: &str = r"(?i)\b(?P<status>smooth sailing|up|all systems go|(?:no|zero) (?:issues?|problems?)|operating normally)\b";

/// 异常状态关键词（大小写不敏感，单词边界锚定）
const DOWN_PATTERN: &str =
    r"(?i)\b(?P<status>trouble|down|some systems|difficulty|(?:issues?|problems?)|non-operational)\b";

static UP_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static DOWN_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn up_regex() -> Option<&'static Regex> {
    UP_REGEX.get_or_init(|| compile_pattern(UP_PATTERN)).as_ref()
}

fn down_regex() -> Option<&'static Regex> {
    DOWN_REGEX.get_or_init(|| compile_pattern(DOWN_PATTERN)).as_ref()
}

/// 编译关键词模式，失败时记录错误并跳过对应的正则层
fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("状态关键词正则编译失败: {}", e);
            None
        }
    }
}

/// 分类输入
#[derive(Debug, Clone, Copy)]
pub struct ClassificationInput<'a> {
    /// 抓取到的状态文本（可能为空）
    pub text: &'a str,
    /// 期望的正常文本
    pub expected_up: &'a str,
    /// 期望的异常文本（可选）
    pub expected_down: Option<&'a str>,
}

impl<'a> ClassificationInput<'a> {
    /// 创建分类输入
    pub fn new(text: &'a str, expected_up: &'a str, expected_down: Option<&'a str>) -> Self {
        Self {
            text,
            expected_up,
            expected_down,
        }
    }
}

/// 对状态文本进行分类
///
/// # 参数
/// * `input` - 分类输入
///
/// # 返回
/// * `Classification` - 分类结果，无法判断时为 `Classification::Unclassifiable`
pub fn classify(input: &ClassificationInput<'_>) -> Classification {
    let text = input.text;

    if text == input.expected_up {
        info!("状态文本与期望的正常文本一致: {}", text);
        return Classification::ExactUp;
    }

    // 未配置或为空的异常文本直接跳过，不与空字符串比较
    if let Some(expected_down) = input.expected_down.filter(|down| !down.is_empty()) {
        if text == expected_down {
            info!("状态文本与期望的异常文本一致: {}", text);
            return Classification::ExactDown;
        }
    }

    debug!("精确匹配失败，使用正则匹配状态文本: {:?}", text);

    if let Some(matched) = capture_status(up_regex(), text) {
        info!("正则匹配到正常状态: {}", matched);
        return Classification::RegexUp(MatchEvidence::new(text, matched));
    }

    if let Some(matched) = capture_status(down_regex(), text) {
        info!("正则匹配到异常状态: {}", matched);
        return Classification::RegexDown(MatchEvidence::new(text, matched));
    }

    warn!("无法根据状态文本判断服务状态: {:?}", text);
    Classification::Unclassifiable
}

/// 返回第一个匹配的 `status` 捕获组
fn capture_status<'t>(regex: Option<&Regex>, text: &'t str) -> Option<&'t str> {
    regex?
        .captures(text)
        .and_then(|captures| captures.name("status"))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::result::{StatusKind, REGEX_MATCH_NOTES};

    fn classify_text(text: &str, up: &str, down: Option<&str>) -> Classification {
        classify(&ClassificationInput::new(text, up, down))
    }

    #[test]
    fn test_patterns_compile() {
        assert!(up_regex().is_some());
        assert!(down_regex().is_some());
        assert!(compile_pattern("(?P<status>unclosed").is_none());
    }

    #[test]
    fn test_exact_up_match() {
        let result = classify_text("Smooth sailing!", "Smooth sailing!", Some("Uh oh"));
        assert_eq!(result, Classification::ExactUp);
        assert!(result.evidence().is_none());
    }

    #[test]
    fn test_exact_down_match() {
        let result = classify_text("Uh oh", "Smooth sailing!", Some("Uh oh"));
        assert_eq!(result, Classification::ExactDown);
        assert!(result.evidence().is_none());
    }

    #[test]
    fn test_exact_match_is_case_sensitive_and_untrimmed() {
        // 精确比较失败后落入正则层
        let result = classify_text(" All Systems Go ", "All Systems Go", None);
        match result {
            Classification::RegexUp(evidence) => {
                assert_eq!(evidence.matched_text, "All Systems Go");
                assert_eq!(evidence.actual_text, " All Systems Go ");
            }
            other => panic!("expected regex up, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_up_takes_priority_over_exact_down() {
        let result = classify_text("same", "same", Some("same"));
        assert_eq!(result, Classification::ExactUp);
    }

    #[test]
    fn test_absent_down_text_never_matches_exactly() {
        // 空文本不应因异常文本为空而被判定为 down
        assert_eq!(
            classify_text("", "OK", Some("")),
            Classification::Unclassifiable
        );
        assert_eq!(classify_text("", "OK", None), Classification::Unclassifiable);
    }

    #[test]
    fn test_empty_text_is_unclassifiable() {
        let result = classify_text("", "OK", None);
        assert!(result.is_unclassifiable());
        assert!(result.status().is_none());
    }

    #[test]
    fn test_regex_down_preserves_case() {
        let result = classify_text("We are having TROUBLE right now", "OK", None);
        assert_eq!(result.status(), Some(StatusKind::Down));
        let evidence = result.evidence().unwrap();
        assert_eq!(evidence.matched_text, "TROUBLE");
        assert_eq!(evidence.notes, REGEX_MATCH_NOTES);
    }

    #[test]
    fn test_standalone_trouble_is_down() {
        let result = classify_text("Houston, we have trouble.", "OK", Some("Outage"));
        match result {
            Classification::RegexDown(evidence) => {
                assert_eq!(evidence.matched_text, "trouble");
                assert_eq!(evidence.actual_text, "Houston, we have trouble.");
            }
            other => panic!("expected regex down, got {other:?}"),
        }
    }

    #[test]
    fn test_up_keywords_win_over_down_keywords() {
        let result = classify_text("no issues here but some trouble too", "OK", None);
        match result {
            Classification::RegexUp(evidence) => assert_eq!(evidence.matched_text, "no issues"),
            other => panic!("expected regex up, got {other:?}"),
        }
    }

    #[test]
    fn test_up_wins_even_when_down_keyword_comes_first() {
        let result = classify_text("Earlier trouble resolved, systems are up", "OK", None);
        match result {
            Classification::RegexUp(evidence) => assert_eq!(evidence.matched_text, "up"),
            other => panic!("expected regex up, got {other:?}"),
        }
    }

    #[test]
    fn test_word_boundary_prevents_subword_match() {
        // "upward" 不能作为 "up" 命中；"all clear" 也不在关键词中
        let result = classify_text("upward trend, all clear", "OK", None);
        assert!(result.is_unclassifiable());

        let result = classify_text("downstream sync", "OK", None);
        assert!(result.is_unclassifiable());

        let result = classify_text("troubleshooting guide", "OK", None);
        assert!(result.is_unclassifiable());
    }

    #[test]
    fn test_issue_singular_and_plural() {
        let result = classify_text("Known issue with login", "OK", None);
        assert_eq!(result.evidence().unwrap().matched_text, "issue");

        let result = classify_text("Problems detected", "OK", None);
        assert_eq!(result.evidence().unwrap().matched_text, "Problems");
    }

    #[test]
    fn test_negated_issue_phrases_are_up() {
        for (text, matched) in [
            ("There are zero problems", "zero problems"),
            ("No issue reported", "No issue"),
            ("no problem at all", "no problem"),
        ] {
            let result = classify_text(text, "OK", None);
            assert_eq!(result.status(), Some(StatusKind::Up), "text: {text}");
            assert_eq!(result.evidence().unwrap().matched_text, matched);
        }
    }

    #[test]
    fn test_hyphenated_non_operational_is_down() {
        let result = classify_text("Service is non-operational", "OK", None);
        assert_eq!(result.status(), Some(StatusKind::Down));
        assert_eq!(result.evidence().unwrap().matched_text, "non-operational");
    }

    #[test]
    fn test_first_occurrence_is_reported() {
        let result = classify_text("Operating normally, smooth sailing", "OK", None);
        assert_eq!(result.evidence().unwrap().matched_text, "Operating normally");
    }

    #[test]
    fn test_actual_text_is_verbatim() {
        let text = "  Some Systems are DEGRADED \n";
        let result = classify_text(text, "OK", None);
        let evidence = result.evidence().unwrap();
        assert_eq!(evidence.actual_text, text);
        assert!(evidence.actual_text.contains(&evidence.matched_text));
    }
}
