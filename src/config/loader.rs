//! 配置加载器实现
//!
//! 提供TOML配置文件解析、`${VAR}` 环境变量替换以及环境变量配置读取

use crate::config::types::{
    RawProbeConfig, ProbeConfig, ENV_EXPECTED_STATUS_DOWN_TEXT, ENV_EXPECTED_STATUS_UP_TEXT,
    ENV_REPORT_STATUS_URL, ENV_SERVICE_STATUS_HTML_SELECTOR, ENV_SERVICE_STATUS_URL,
    ENV_STATUS_SERVER_API_KEY, ENV_STATUS_SERVER_FQDN, ENV_STATUS_SERVER_SERVICE_SLUG,
    ENV_TIMEOUT_SECONDS,
};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<RawProbeConfig>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<RawProbeConfig>;

    /// 从字符串加载配置
    ///
    /// # 参数
    /// * `content` - 配置文件内容
    ///
    /// # 返回
    /// * `Result<RawProbeConfig>` - 加载的配置或错误
    async fn load_from_string(&self, content: &str) -> Result<RawProbeConfig>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {}", e)))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(ConfigError::EnvVarError {
                        var: var_name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(result)
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str) -> Result<RawProbeConfig> {
        let processed_content = self.substitute_env_vars(content)?;

        let config: RawProbeConfig = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?;

        Ok(config)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<RawProbeConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {}", e)))?;

        let config = self.parse_toml(&content)?;

        log::info!("成功加载配置文件: {}", path.display());

        Ok(config)
    }

    async fn load_from_string(&self, content: &str) -> Result<RawProbeConfig> {
        let config = self.parse_toml(content)?;
        log::debug!("成功解析配置字符串");
        Ok(config)
    }
}

/// 环境变量配置读取
pub struct EnvConfigLoader;

impl EnvConfigLoader {
    /// 从进程环境变量读取配置
    pub fn from_env() -> Result<RawProbeConfig> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过查找函数读取配置
    ///
    /// # 参数
    /// * `lookup` - 根据变量名返回变量值
    ///
    /// # 返回
    /// * `Result<RawProbeConfig>` - 读取到的配置
    pub fn from_lookup<F>(lookup: F) -> Result<RawProbeConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout_seconds = match lookup(ENV_TIMEOUT_SECONDS).filter(|v| !v.is_empty())
        {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "{ENV_TIMEOUT_SECONDS} 必须是正整数: {value}"
                ))
            })?),
            None => None,
        };

        Ok(RawProbeConfig {
            report_status_url: lookup(ENV_REPORT_STATUS_URL),
            status_server_fqdn: lookup(ENV_STATUS_SERVER_FQDN),
            status_server_service_slug: lookup(ENV_STATUS_SERVER_SERVICE_SLUG),
            status_server_api_key: lookup(ENV_STATUS_SERVER_API_KEY),
            service_status_url: lookup(ENV_SERVICE_STATUS_URL),
            service_status_html_selector: lookup(ENV_SERVICE_STATUS_HTML_SELECTOR),
            expected_status_up_text: lookup(ENV_EXPECTED_STATUS_UP_TEXT),
            expected_status_down_text: lookup(ENV_EXPECTED_STATUS_DOWN_TEXT),
            request_timeout_seconds,
        })
    }
}

/// 加载探测配置
///
/// 先读取可选的TOML配置文件，再用环境变量覆盖，最后统一验证。
///
/// # 参数
/// * `config_path` - 可选的配置文件路径
///
/// # 返回
/// * `Result<ProbeConfig>` - 验证后的配置
pub async fn load_probe_config(config_path: Option<&Path>) -> Result<ProbeConfig> {
    let file_config = match config_path {
        Some(path) => TomlConfigLoader::new(true).load_from_file(path).await?,
        None => RawProbeConfig::default(),
    };

    let env_config = EnvConfigLoader::from_env()?;
    let config = file_config.merge(env_config).resolve()?;

    log::debug!(
        "探测配置: 状态页 {} 选择器 {:?} 上报地址 {}",
        config.service_status_url,
        config.html_selector,
        config.report_status_url
    );

    Ok(config)
}
