//! 配置数据结构定义
//!
//! 定义探测配置结构体、环境变量名称和验证逻辑

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// 状态服务器上报地址
pub const ENV_REPORT_STATUS_URL: &str = "STATUS_SERVER_REPORT_STATUS_URL";
/// 状态服务器域名（未配置上报地址时使用）
pub const ENV_STATUS_SERVER_FQDN: &str = "STATUS_SERVER_FQDN";
/// 服务标识（未配置上报地址时使用）
pub const ENV_STATUS_SERVER_SERVICE_SLUG: &str = "STATUS_SERVER_SERVICE_SLUG";
/// 状态服务器API密钥
pub const ENV_STATUS_SERVER_API_KEY: &str = "STATUS_SERVER_API_KEY";
/// 被探测服务的状态页地址
pub const ENV_SERVICE_STATUS_URL: &str = "SERVICE_STATUS_URL";
/// 状态页CSS选择器
pub const ENV_SERVICE_STATUS_HTML_SELECTOR: &str = "SERVICE_STATUS_HTML_SELECTOR";
/// 期望的正常状态文本
pub const ENV_EXPECTED_STATUS_UP_TEXT: &str = "EXPECTED_STATUS_UP_TEXT";
/// 期望的异常状态文本
pub const ENV_EXPECTED_STATUS_DOWN_TEXT: &str = "EXPECTED_STATUS_DOWN_TEXT";
/// 请求超时时间（秒）
pub const ENV_TIMEOUT_SECONDS: &str = "STATUS_PROBE_TIMEOUT_SECONDS";

/// 配置缺失时输出到标准错误的用法说明
pub const CONFIG_USAGE: &str = "\
抓取服务状态页中的状态文本，判断服务正常/异常后上报到状态服务器。

配置通过环境变量提供（也可以在 --config 指定的TOML文件中使用对应的小写键名）:

  STATUS_SERVER_REPORT_STATUS_URL   状态上报地址，例如 https://status.addsrv.com/events/slack/events
                                    未设置时使用 https://{STATUS_SERVER_FQDN}/services/{STATUS_SERVER_SERVICE_SLUG}/events
  STATUS_SERVER_FQDN                状态服务器域名，例如 status.addsrv.com
  STATUS_SERVER_SERVICE_SLUG        服务标识，例如 slack
  STATUS_SERVER_API_KEY             状态服务器API密钥（通常为机器人token），必需
  SERVICE_STATUS_URL                服务状态页地址，例如 https://status.slack.com，必需
  SERVICE_STATUS_HTML_SELECTOR      选取状态元素的CSS选择器，例如 '#current_status h1'，必需
  EXPECTED_STATUS_UP_TEXT           表示正常的状态文本，例如 'Smooth sailing!'，必需
  EXPECTED_STATUS_DOWN_TEXT         表示异常的状态文本，可选
  STATUS_PROBE_TIMEOUT_SECONDS      请求超时时间（秒），默认 30

精确比较失败时会回退到关键词正则匹配，并在上报数据的 'extra' 字段中附带匹配信息。
";

/// 原始配置，所有字段均为可选
///
/// 可以来自TOML文件或环境变量，经 [`RawProbeConfig::resolve`] 验证后得到 [`ProbeConfig`]。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProbeConfig {
    /// 状态上报地址
    pub report_status_url: Option<String>,
    /// 状态服务器域名
    pub status_server_fqdn: Option<String>,
    /// 服务标识
    pub status_server_service_slug: Option<String>,
    /// 状态服务器API密钥
    pub status_server_api_key: Option<String>,
    /// 服务状态页地址
    pub service_status_url: Option<String>,
    /// 状态页CSS选择器
    pub service_status_html_selector: Option<String>,
    /// 期望的正常状态文本
    pub expected_status_up_text: Option<String>,
    /// 期望的异常状态文本
    pub expected_status_down_text: Option<String>,
    /// 请求超时时间（秒）
    pub request_timeout_seconds: Option<u64>,
}

/// 验证后的探测配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// 状态上报地址
    pub report_status_url: String,
    /// 状态服务器API密钥
    pub api_key: String,
    /// 服务状态页地址
    pub service_status_url: String,
    /// 状态页CSS选择器
    pub html_selector: String,
    /// 期望的正常状态文本
    pub expected_up_text: String,
    /// 期望的异常状态文本
    pub expected_down_text: Option<String>,
    /// 请求超时时间（秒）
    pub request_timeout_seconds: u64,
}

// 默认值函数
fn default_timeout() -> u64 {
    30
}

/// 脱敏时保留密钥前缀所需的最小长度
const MIN_KEY_LEN_FOR_PREFIX: usize = 8;

/// 空字符串视为未设置
fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// 覆盖值为空时回退到原值
fn prefer(over: Option<String>, base: Option<String>) -> Option<String> {
    over.filter(|v| !v.is_empty()).or(base)
}

impl RawProbeConfig {
    /// 用另一份配置覆盖当前配置，`other` 中已设置且非空的字段优先
    pub fn merge(self, other: RawProbeConfig) -> RawProbeConfig {
        RawProbeConfig {
            report_status_url: prefer(other.report_status_url, self.report_status_url),
            status_server_fqdn: prefer(other.status_server_fqdn, self.status_server_fqdn),
            status_server_service_slug: prefer(
                other.status_server_service_slug,
                self.status_server_service_slug,
            ),
            status_server_api_key: prefer(
                other.status_server_api_key,
                self.status_server_api_key,
            ),
            service_status_url: prefer(other.service_status_url, self.service_status_url),
            service_status_html_selector: prefer(
                other.service_status_html_selector,
                self.service_status_html_selector,
            ),
            expected_status_up_text: prefer(
                other.expected_status_up_text,
                self.expected_status_up_text,
            ),
            expected_status_down_text: prefer(
                other.expected_status_down_text,
                self.expected_status_down_text,
            ),
            request_timeout_seconds: other
                .request_timeout_seconds
                .or(self.request_timeout_seconds),
        }
    }

    /// 验证并生成最终配置
    ///
    /// 一次性收集所有缺失的必需项，任何一项缺失都不会生成配置。
    ///
    /// # 返回
    /// * `Result<ProbeConfig, ConfigError>` - 验证后的配置
    pub fn resolve(&self) -> Result<ProbeConfig, ConfigError> {
        let mut missing = Vec::new();

        let report_status_url = match non_empty(&self.report_status_url) {
            Some(url) => Some(url),
            None => {
                let fqdn = non_empty(&self.status_server_fqdn);
                let slug = non_empty(&self.status_server_service_slug);
                if fqdn.is_none() {
                    missing.push(ENV_STATUS_SERVER_FQDN);
                }
                if slug.is_none() {
                    missing.push(ENV_STATUS_SERVER_SERVICE_SLUG);
                }
                fqdn.zip(slug)
                    .map(|(fqdn, slug)| format!("https://{fqdn}/services/{slug}/events"))
            }
        };

        // 密钥中的换行符一律去除
        let api_key = non_empty(&self.status_server_api_key)
            .map(|key| key.replace(['\n', '\r'], ""))
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            missing.push(ENV_STATUS_SERVER_API_KEY);
        }

        let service_status_url = non_empty(&self.service_status_url);
        if service_status_url.is_none() {
            missing.push(ENV_SERVICE_STATUS_URL);
        }

        let html_selector = non_empty(&self.service_status_html_selector);
        if html_selector.is_none() {
            missing.push(ENV_SERVICE_STATUS_HTML_SELECTOR);
        }

        let expected_up_text = non_empty(&self.expected_status_up_text);
        if expected_up_text.is_none() {
            missing.push(ENV_EXPECTED_STATUS_UP_TEXT);
        }

        let (
            Some(report_status_url),
            Some(api_key),
            Some(service_status_url),
            Some(html_selector),
            Some(expected_up_text),
        ) = (
            report_status_url,
            api_key,
            service_status_url,
            html_selector,
            expected_up_text,
        )
        else {
            return Err(ConfigError::MissingFields {
                fields: missing.into_iter().map(String::from).collect(),
            });
        };

        let config = ProbeConfig {
            report_status_url,
            api_key,
            service_status_url,
            html_selector,
            expected_up_text,
            expected_down_text: non_empty(&self.expected_status_down_text),
            request_timeout_seconds: self.request_timeout_seconds.unwrap_or_else(default_timeout),
        };

        validate_config(&config).map_err(ConfigError::ValidationError)?;
        Ok(config)
    }
}

impl ProbeConfig {
    /// 请求超时时间
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_seconds)
    }

    /// 脱敏后的配置摘要，API密钥只保留前4个字符，过短的密钥完全隐藏
    pub fn redacted_summary(&self) -> serde_json::Value {
        let masked_key = if self.api_key.chars().count() < MIN_KEY_LEN_FOR_PREFIX {
            "****".to_string()
        } else {
            self.api_key.chars().take(4).collect::<String>() + "****"
        };

        json!({
            "report_status_url": self.report_status_url,
            "status_server_api_key": masked_key,
            "service_status_url": self.service_status_url,
            "service_status_html_selector": self.html_selector,
            "expected_status_up_text": self.expected_up_text,
            "expected_status_down_text": self.expected_down_text,
            "request_timeout_seconds": self.request_timeout_seconds,
        })
    }
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &ProbeConfig) -> Result<(), String> {
    if config.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    for (name, url) in [
        (ENV_REPORT_STATUS_URL, &config.report_status_url),
        (ENV_SERVICE_STATUS_URL, &config.service_status_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(format!("{name} 的URL格式无效: {url}"));
        }
    }

    if config.html_selector.trim().is_empty() {
        return Err("CSS选择器不能为空".to_string());
    }

    Ok(())
}
