//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Status Scraper - 抓取服务状态页并上报状态
#[derive(Parser, Debug, Clone)]
#[command(
    name = "status-scraper",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None,
    after_help = crate::config::CONFIG_USAGE
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "TOML配置文件路径（环境变量优先于文件）",
        env = "STATUS_PROBE_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "STATUS_PROBE_LOG_LEVEL",
        global = true
    )]
    pub log_level: LogLevel,

    /// 是否输出JSON格式日志
    #[arg(long, help = "输出JSON格式日志", global = true)]
    pub json_logs: bool,

    /// 日志文件路径
    #[arg(
        long,
        value_name = "FILE",
        help = "日志写入文件而不是标准错误",
        env = "STATUS_PROBE_LOG_FILE",
        global = true
    )]
    pub log_file: Option<PathBuf>,

    /// 子命令，缺省时执行完整探测
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// 抓取状态页、分类并上报（默认）
    Run,

    /// 抓取并分类，只输出将要上报的报文，不发送
    Check {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },

    /// 离线分类一段状态文本
    Classify {
        /// 待分类的状态文本
        #[arg(value_name = "TEXT", help = "待分类的状态文本")]
        text: String,

        /// 期望的正常状态文本
        #[arg(long, value_name = "TEXT", help = "期望的正常状态文本")]
        up: String,

        /// 期望的异常状态文本
        #[arg(long, value_name = "TEXT", help = "期望的异常状态文本")]
        down: Option<String>,
    },

    /// 验证配置
    Validate,

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl Args {
    /// 实际要执行的命令，未指定时为 `Run`
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let args = Args::try_parse_from(["status-scraper"]).unwrap();
        assert_eq!(args.command(), Commands::Run);
    }

    #[test]
    fn test_classify_args() {
        let args = Args::try_parse_from([
            "status-scraper",
            "classify",
            "Minor trouble",
            "--up",
            "Smooth sailing!",
        ])
        .unwrap();

        match args.command() {
            Commands::Classify { text, up, down } => {
                assert_eq!(text, "Minor trouble");
                assert_eq!(up, "Smooth sailing!");
                assert!(down.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "status-scraper",
            "check",
            "--format",
            "json",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();

        assert_eq!(args.log_level, LogLevel::Debug);
        assert!(args.json_logs);
        assert!(args.log_file.is_none());
        assert_eq!(
            args.command(),
            Commands::Check {
                format: OutputFormat::Json
            }
        );
    }

    #[test]
    fn test_log_file_option() {
        let args =
            Args::try_parse_from(["status-scraper", "validate", "--log-file", "/tmp/probe.log"])
                .unwrap();
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/probe.log")));
        assert_eq!(args.command(), Commands::Validate);
    }
}
