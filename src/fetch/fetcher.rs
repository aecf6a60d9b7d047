//! 状态页抓取器实现
//!
//! 通过HTTP获取状态页并用CSS选择器提取状态文本

use crate::error::{FetchError, Result};
use crate::fetch::extract::extract_text;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// 状态页抓取器trait，定义抓取接口
#[async_trait]
pub trait StatusPageFetcher: Send + Sync {
    /// 抓取页面并提取状态文本
    ///
    /// # 参数
    /// * `url` - 状态页URL
    /// * `selector` - CSS选择器
    ///
    /// # 返回
    /// * `Result<String>` - 第一个匹配元素的文本
    async fn fetch_status_text(&self, url: &str, selector: &str) -> Result<String>;
}

/// 基于HTTP的状态页抓取器
pub struct HttpPageFetcher {
    /// HTTP客户端
    client: Client,
}

impl HttpPageFetcher {
    /// 创建新的HTTP抓取器
    ///
    /// # 参数
    /// * `timeout` - 请求超时时间
    ///
    /// # 返回
    /// * `Result<Self>` - 抓取器实例
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(FetchError::RequestError)?;

        Ok(Self { client })
    }

    /// 下载页面HTML，非2xx状态码视为错误
    async fn download(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::RequestError)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(FetchError::RequestError)?;

        debug!(
            "状态页下载完成: {} ({} 字节, {}ms)",
            url,
            body.len(),
            start_time.elapsed().as_millis()
        );

        Ok(body)
    }
}

#[async_trait]
impl StatusPageFetcher for HttpPageFetcher {
    async fn fetch_status_text(&self, url: &str, selector: &str) -> Result<String> {
        info!("抓取状态页: {}", url);
        let html = self.download(url).await?;
        let text = extract_text(&html, selector)?;
        info!("提取到状态文本: {:?}", text);
        Ok(text)
    }
}
