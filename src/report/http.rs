//! HTTP状态上报发送器
//!
//! 将状态报文以JSON形式POST到状态服务器，使用 `Authorization: JWT <key>` 认证

use crate::error::{ReportError, Result};
use crate::report::payload::StatusReport;
use crate::report::sender::{ReportResponse, StatusReporter};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP状态上报发送器
pub struct HttpStatusReporter {
    /// HTTP客户端
    client: Client,
    /// 上报地址
    report_url: String,
    /// 状态服务器API密钥
    api_key: String,
}

impl HttpStatusReporter {
    /// 创建新的上报发送器
    ///
    /// # 参数
    /// * `report_url` - 上报地址
    /// * `api_key` - 状态服务器API密钥
    /// * `timeout` - 请求超时时间
    ///
    /// # 返回
    /// * `Result<Self>` - 发送器实例
    pub fn new(report_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(ReportError::RequestError)?;

        Ok(Self {
            client,
            report_url,
            api_key,
        })
    }

    /// 构建认证请求头的值
    fn authorization_value(&self) -> String {
        format!("JWT {}", self.api_key)
    }
}

#[async_trait]
impl StatusReporter for HttpStatusReporter {
    async fn send_report(&self, report: &StatusReport) -> Result<ReportResponse> {
        let payload = serde_json::to_string(report).map_err(ReportError::SerializeError)?;
        debug!("上报报文: {}", payload);

        let response = self
            .client
            .post(&self.report_url)
            .header(AUTHORIZATION, self.authorization_value())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(ReportError::RequestError)?;

        let status = response.status();
        let body = response.text().await.map_err(ReportError::RequestError)?;

        if status.is_success() {
            info!("状态上报成功: {} -> {}", report.status, self.report_url);
        } else {
            // 不重试、不视为失败，仅记录
            warn!("状态服务器返回非成功状态码: {} - {}", status, body);
        }

        Ok(ReportResponse {
            status_code: status.as_u16(),
            body,
        })
    }
}
