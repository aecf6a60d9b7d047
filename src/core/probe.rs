//! 探测流程
//!
//! 抓取状态页 → 提取状态文本 → 分类 → 构建报文 → 上报，并将结果映射为退出码

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::fetch::StatusPageFetcher;
use crate::report::{ReportResponse, StatusReport, StatusReporter};
use crate::status::{classify, Classification, ClassificationInput};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// 成功分类并上报时的退出码
pub const EXIT_SUCCESS: u8 = 0;
/// 配置、抓取或上报出错时的退出码
pub const EXIT_FAILURE: u8 = 1;
/// 无法判断状态时的退出码
pub const EXIT_UNCLASSIFIABLE: u8 = 255;

/// 单次抓取和分类的记录
#[derive(Debug, Clone)]
pub struct ProbeRecord {
    /// 抓取到的状态文本
    pub text: String,
    /// 分类结果
    pub classification: Classification,
    /// 探测时间
    pub checked_at: DateTime<Utc>,
}

impl ProbeRecord {
    /// 根据分类结果构建上报报文，无法判断时返回 `None`
    pub fn report(&self) -> Option<StatusReport> {
        StatusReport::from_classification(&self.text, &self.classification)
    }
}

/// 探测结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 已分类并上报
    Reported {
        /// 上报的报文
        report: StatusReport,
        /// 状态服务器响应
        response: ReportResponse,
    },
    /// 无法判断状态，未上报
    Unclassifiable {
        /// 抓取到的状态文本
        text: String,
    },
}

impl ProbeOutcome {
    /// 进程退出码
    pub fn exit_code(&self) -> u8 {
        match self {
            ProbeOutcome::Reported { .. } => EXIT_SUCCESS,
            ProbeOutcome::Unclassifiable { .. } => EXIT_UNCLASSIFIABLE,
        }
    }
}

/// 探测执行器
pub struct ProbeRunner<'a> {
    /// 探测配置
    config: &'a ProbeConfig,
    /// 状态页抓取器
    fetcher: &'a dyn StatusPageFetcher,
}

impl<'a> ProbeRunner<'a> {
    /// 创建探测执行器
    pub fn new(config: &'a ProbeConfig, fetcher: &'a dyn StatusPageFetcher) -> Self {
        Self { config, fetcher }
    }

    /// 抓取并分类，不上报
    pub async fn probe(&self) -> Result<ProbeRecord> {
        let text = self
            .fetcher
            .fetch_status_text(&self.config.service_status_url, &self.config.html_selector)
            .await?;

        let classification = classify(&ClassificationInput::new(
            &text,
            &self.config.expected_up_text,
            self.config.expected_down_text.as_deref(),
        ));

        Ok(ProbeRecord {
            text,
            classification,
            checked_at: Utc::now(),
        })
    }

    /// 完整探测流程：抓取、分类并上报
    ///
    /// 无法判断状态时不发送任何请求，返回 `ProbeOutcome::Unclassifiable`。
    pub async fn run(&self, reporter: &dyn StatusReporter) -> Result<ProbeOutcome> {
        let record = self.probe().await?;

        let Some(report) = record.report() else {
            warn!("无法判断服务状态，跳过上报: {:?}", record.text);
            return Ok(ProbeOutcome::Unclassifiable { text: record.text });
        };

        info!(
            "服务状态: {}{}",
            report.status,
            if record.classification.is_exact() {
                ""
            } else {
                "（正则匹配）"
            }
        );

        let response = reporter.send_report(&report).await?;

        Ok(ProbeOutcome::Reported { report, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ProbeError};
    use crate::status::StatusKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticFetcher(std::result::Result<String, String>);

    #[async_trait]
    impl StatusPageFetcher for StaticFetcher {
        async fn fetch_status_text(&self, _url: &str, selector: &str) -> Result<String> {
            self.0.clone().map_err(|_| {
                FetchError::NoMatch {
                    selector: selector.to_string(),
                }
                .into()
            })
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        sent: Mutex<Vec<StatusReport>>,
    }

    #[async_trait]
    impl StatusReporter for RecordingReporter {
        async fn send_report(&self, report: &StatusReport) -> Result<ReportResponse> {
            self.sent.lock().unwrap().push(report.clone());
            Ok(ReportResponse {
                status_code: 200,
                body: "ok".to_string(),
            })
        }
    }

    fn test_config(down: Option<&str>) -> ProbeConfig {
        ProbeConfig {
            report_status_url: "https://status.example.com/services/slack/events".to_string(),
            api_key: "token".to_string(),
            service_status_url: "https://status.slack.com".to_string(),
            html_selector: "#current_status h1".to_string(),
            expected_up_text: "Smooth sailing!".to_string(),
            expected_down_text: down.map(str::to_string),
            request_timeout_seconds: 10,
        }
    }

    #[tokio::test]
    async fn test_exact_match_is_reported() {
        let config = test_config(None);
        let fetcher = StaticFetcher(Ok("Smooth sailing!".to_string()));
        let reporter = RecordingReporter::default();

        let outcome = ProbeRunner::new(&config, &fetcher)
            .run(&reporter)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
        let sent = reporter.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].status, StatusKind::Up);
        assert!(sent[0].extra.is_none());
        assert!(!sent[0].informational);
    }

    #[tokio::test]
    async fn test_regex_match_is_reported_with_evidence() {
        let config = test_config(Some("Outage"));
        let fetcher = StaticFetcher(Ok("Some systems are degraded".to_string()));
        let reporter = RecordingReporter::default();

        let outcome = ProbeRunner::new(&config, &fetcher)
            .run(&reporter)
            .await
            .unwrap();

        match outcome {
            ProbeOutcome::Reported { report, response } => {
                assert_eq!(report.status, StatusKind::Down);
                assert_eq!(report.description, "Some systems are degraded");
                assert_eq!(report.extra.unwrap().matched_text, "Some systems");
                assert_eq!(response.body, "ok");
            }
            other => panic!("expected reported outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unclassifiable_skips_report() {
        let config = test_config(None);
        let fetcher = StaticFetcher(Ok(String::new()));
        let reporter = RecordingReporter::default();

        let outcome = ProbeRunner::new(&config, &fetcher)
            .run(&reporter)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code(), EXIT_UNCLASSIFIABLE);
        assert!(matches!(outcome, ProbeOutcome::Unclassifiable { .. }));
        assert!(reporter.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let config = test_config(None);
        let fetcher = StaticFetcher(Err("no match".to_string()));
        let reporter = RecordingReporter::default();

        let result = ProbeRunner::new(&config, &fetcher).run(&reporter).await;

        assert!(matches!(
            result,
            Err(ProbeError::Fetch(FetchError::NoMatch { .. }))
        ));
        assert!(reporter.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_probe_does_not_report() {
        let config = test_config(Some("Uh oh"));
        let fetcher = StaticFetcher(Ok("Uh oh".to_string()));

        let record = ProbeRunner::new(&config, &fetcher).probe().await.unwrap();
        assert_eq!(record.classification, Classification::ExactDown);
        assert_eq!(record.report().unwrap().status, StatusKind::Down);
    }
}
