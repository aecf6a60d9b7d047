//! 配置管理模块
//!
//! 提供配置文件解析、环境变量读取和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{load_probe_config, ConfigLoader, EnvConfigLoader, TomlConfigLoader};
pub use types::{validate_config, ProbeConfig, RawProbeConfig, CONFIG_USAGE};
