//! 状态上报发送器模块
//!
//! 定义状态上报的trait和基础实现

use crate::error::Result;
use crate::report::payload::StatusReport;
use async_trait::async_trait;
use serde::Serialize;

/// 状态服务器的响应
///
/// 非2xx响应不视为错误，原样返回给调用方输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应体文本
    pub body: String,
}

impl ReportResponse {
    /// 状态码是否为2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 状态上报发送器trait
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// 发送状态报文
    ///
    /// # 参数
    /// * `report` - 状态上报报文
    ///
    /// # 返回
    /// * `Result<ReportResponse>` - 服务器响应
    async fn send_report(&self, report: &StatusReport) -> Result<ReportResponse>;
}
