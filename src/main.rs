//! Status Scraper 主程序入口
//!
//! 单次探测：抓取状态页、分类并上报后退出

use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    status_scraper::core::app::main().await
}
