//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑，每个命令返回进程退出码

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::load_probe_config;
use crate::core::probe::{ProbeOutcome, ProbeRunner, EXIT_SUCCESS, EXIT_UNCLASSIFIABLE};
use crate::error::Result;
use crate::fetch::HttpPageFetcher;
use crate::logging::LoggingSystem;
use crate::report::HttpStatusReporter;
use crate::status::{classify, Classification, ClassificationInput};
use async_trait::async_trait;
use serde_json::json;
use std::io::{self, Write};
use tracing::info;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令，返回进程退出码
    async fn execute(&self, args: &Args) -> Result<u8>;
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<u8> {
        if let Some(Commands::Version { format }) = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(EXIT_SUCCESS)
    }
}

/// 探测命令：抓取、分类并上报
pub struct RunCommand<'a> {
    /// 已初始化的日志系统
    pub logging: &'a LoggingSystem,
}

#[async_trait]
impl<'a> Command for RunCommand<'a> {
    async fn execute(&self, args: &Args) -> Result<u8> {
        let config = load_probe_config(args.config.as_deref()).await?;

        let fetcher = HttpPageFetcher::new(config.request_timeout())?;
        let reporter = HttpStatusReporter::new(
            config.report_status_url.clone(),
            config.api_key.clone(),
            config.request_timeout(),
        )?;

        let outcome = ProbeRunner::new(&config, &fetcher).run(&reporter).await?;

        self.logging.probe_outcome_log(&config.service_status_url, &outcome);

        if let ProbeOutcome::Reported { response, .. } = &outcome {
            // 无论状态码如何都输出响应体
            writeln!(io::stdout().lock(), "{}", response.body)?;
        }

        Ok(outcome.exit_code())
    }
}

/// 检查命令：抓取并分类，输出报文但不上报
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<u8> {
        let format = match &args.command {
            Some(Commands::Check { format }) => format.clone(),
            _ => OutputFormat::Text,
        };

        let config = load_probe_config(args.config.as_deref()).await?;
        let fetcher = HttpPageFetcher::new(config.request_timeout())?;
        let record = ProbeRunner::new(&config, &fetcher).probe().await?;
        let report = record.report();

        match format {
            OutputFormat::Json => {
                let output = json!({
                    "checked_at": record.checked_at.to_rfc3339(),
                    "service_status_url": config.service_status_url,
                    "report_status_url": config.report_status_url,
                    "report": report,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!(
                    "[{}] {}",
                    record.checked_at.format("%Y-%m-%d %H:%M:%S"),
                    config.service_status_url
                );
                println!("状态文本: {:?}", record.text);
                print_classification(&record.classification);
                if let Some(report) = &report {
                    println!("上报报文: {}", serde_json::to_string(report)?);
                }
            }
        }

        Ok(if report.is_some() {
            EXIT_SUCCESS
        } else {
            EXIT_UNCLASSIFIABLE
        })
    }
}

/// 分类命令：离线分类给定文本
pub struct ClassifyCommand;

#[async_trait]
impl Command for ClassifyCommand {
    async fn execute(&self, args: &Args) -> Result<u8> {
        let Some(Commands::Classify { text, up, down }) = &args.command else {
            return Ok(EXIT_SUCCESS);
        };

        let classification = classify(&ClassificationInput::new(text, up, down.as_deref()));
        let output = classification_json(&classification);
        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(if classification.is_unclassifiable() {
            EXIT_UNCLASSIFIABLE
        } else {
            EXIT_SUCCESS
        })
    }
}

/// 验证命令：加载并验证配置
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<u8> {
        let config = load_probe_config(args.config.as_deref()).await?;
        info!("配置验证通过");
        println!("{}", serde_json::to_string_pretty(&config.redacted_summary())?);
        Ok(EXIT_SUCCESS)
    }
}

/// 分类结果的JSON表示
pub fn classification_json(classification: &Classification) -> serde_json::Value {
    let tier = match classification {
        Classification::ExactUp | Classification::ExactDown => "exact",
        Classification::RegexUp(_) | Classification::RegexDown(_) => "regex",
        Classification::Unclassifiable => "none",
    };

    let mut output = json!({
        "status": classification.status(),
        "tier": tier,
    });
    if let Some(evidence) = classification.evidence() {
        output["extra"] = json!(evidence);
    }
    output
}

fn print_classification(classification: &Classification) {
    match classification {
        Classification::ExactUp | Classification::ExactDown => {
            if let Some(status) = classification.status() {
                println!("分类结果: {} (精确匹配)", status);
            }
        }
        Classification::RegexUp(evidence) | Classification::RegexDown(evidence) => {
            if let Some(status) = classification.status() {
                println!(
                    "分类结果: {} (正则匹配: {:?})",
                    status, evidence.matched_text
                );
            }
        }
        Classification::Unclassifiable => println!("分类结果: 无法判断"),
    }
}
