//! 应用程序核心逻辑
//!
//! 包含主函数、命令执行以及错误到退出码的映射

use crate::cli::args::{Args, Commands};
use crate::cli::commands::{
    CheckCommand, ClassifyCommand, Command, RunCommand, ValidateCommand, VersionCommand,
};
use crate::config::CONFIG_USAGE;
use crate::core::probe::EXIT_FAILURE;
use crate::error::{ProbeError, Result};
use crate::logging::{LogConfig, LoggingSystem};
use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

/// 应用程序主函数
pub async fn main() -> ExitCode {
    let args = Args::parse();
    ExitCode::from(run(&args).await)
}

/// 初始化日志并执行命令，返回进程退出码
pub async fn run(args: &Args) -> u8 {
    let logging = match init_logging(args) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("{e:#}");
            return EXIT_FAILURE;
        }
    };

    info!("{} v{} 启动", crate::APP_NAME, crate::VERSION);

    match execute_command(args, &logging).await {
        Ok(code) => code,
        Err(e) => exit_code_for_error(&e),
    }
}

/// 根据命令行参数初始化日志系统
fn init_logging(args: &Args) -> Result<LoggingSystem> {
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        json_format: args.json_logs,
        file_path: args.log_file.clone(),
        ..Default::default()
    };

    let logging = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;
    Ok(logging)
}

/// 记录错误并返回对应的退出码，配置错误额外输出用法说明
pub fn exit_code_for_error(e: &ProbeError) -> u8 {
    error!("命令执行失败: {}", e);
    if e.is_config_error() {
        eprintln!("{CONFIG_USAGE}");
    }
    EXIT_FAILURE
}

/// 执行CLI命令，返回进程退出码
pub async fn execute_command(args: &Args, logging: &LoggingSystem) -> Result<u8> {
    match args.command() {
        Commands::Run => RunCommand { logging }.execute(args).await,
        Commands::Check { .. } => CheckCommand.execute(args).await,
        Commands::Classify { .. } => ClassifyCommand.execute(args).await,
        Commands::Validate => ValidateCommand.execute(args).await,
        Commands::Version { .. } => VersionCommand.execute(args).await,
    }
}
