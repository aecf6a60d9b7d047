//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Status Scraper 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum ProbeError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 状态页抓取相关错误
    #[error("状态页抓取错误: {0}")]
    Fetch(#[from] FetchError),

    /// 状态上报相关错误
    #[error("状态上报错误: {0}")]
    Report(#[from] ReportError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// 是否为配置错误（需要输出用法说明）
    pub fn is_config_error(&self) -> bool {
        matches!(self, ProbeError::Config(_))
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 缺少必需的配置项，一次性列出全部缺失项
    #[error("缺少必需的配置项: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 状态页抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP请求错误
    #[error("HTTP请求失败: {0}")]
    RequestError(#[from] reqwest::Error),

    /// 状态页返回非成功状态码
    #[error("状态页返回错误状态码: {status} ({url})")]
    HttpStatus { url: String, status: u16 },

    /// CSS选择器无法解析
    #[error("无效的CSS选择器 '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// 选择器没有匹配到任何元素
    #[error("选择器 '{selector}' 未匹配到任何元素")]
    NoMatch { selector: String },
}

/// 状态上报错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    /// HTTP请求错误
    #[error("上报请求失败: {0}")]
    RequestError(#[from] reqwest::Error),

    /// 上报数据序列化失败
    #[error("上报数据序列化失败: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ProbeError>;
