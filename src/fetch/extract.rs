//! 状态文本提取
//!
//! 使用CSS选择器从状态页HTML中提取第一个匹配元素的文本

use crate::error::FetchError;
use scraper::{Html, Selector};

/// 从HTML中提取选择器第一个匹配元素的文本
///
/// 元素内所有文本节点按文档顺序拼接，连续空白折叠为单个空格并去除首尾空白。
/// 元素存在但文本为空时返回空字符串，交由分类器处理。
///
/// # 参数
/// * `html` - 页面HTML
/// * `selector` - CSS选择器
///
/// # 返回
/// * `Result<String, FetchError>` - 提取到的文本
pub fn extract_text(html: &str, selector: &str) -> Result<String, FetchError> {
    let parsed_selector = Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })?;

    let document = Html::parse_document(html);
    let element = document
        .select(&parsed_selector)
        .next()
        .ok_or_else(|| FetchError::NoMatch {
            selector: selector.to_string(),
        })?;

    let raw: String = element.text().collect();
    Ok(squash_whitespace(&raw))
}

fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
