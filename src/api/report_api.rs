// ==========================================
// 棉花混配质量报表系统 - 报表 API
// ==========================================
// 职责: 校验请求 → 并发读取四类输入 → 引擎聚合 → 响应信封
// 约束: 任一读取失败即整体失败,不返回部分结果
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::api::dto::{RawReportRequest, ReportResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::ReportValidator;
use crate::config::ReportConfig;
use crate::domain::query::ReportQuery;
use crate::engine::{MixingReportEngine, ReportInputs};
use crate::repository::{RecordSource, RepositoryError, SqliteRecordSource};

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    source: Arc<dyn RecordSource>,
    engine: MixingReportEngine,
    config: ReportConfig,
}

impl ReportApi {
    /// 创建新的ReportApi实例
    pub fn new(source: Arc<dyn RecordSource>, config: ReportConfig) -> Self {
        let engine = MixingReportEngine::new(config.blend_top_n);
        Self {
            source,
            engine,
            config,
        }
    }

    /// 以 SQLite 数据库为数据源创建
    pub fn open(db_path: &str, config: ReportConfig) -> ApiResult<Self> {
        let source = SqliteRecordSource::new(db_path)?;
        Ok(Self::new(Arc::new(source), config))
    }

    /// 生成报表
    ///
    /// # 返回
    /// - Ok(ReportResponse): 报表条目 (已按时间降序)
    /// - Err(ApiError): 请求校验失败 / 数据源读取失败
    pub async fn generate_report(&self, request: RawReportRequest) -> ApiResult<ReportResponse> {
        let query = ReportValidator::new(&self.config).validate(&request)?;

        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "generate_report",
            request_id = %request_id,
            report_type = %query.report_type
        );

        async move {
            let inputs = self.fetch_inputs(&query).await?;
            debug!(
                issues = inputs.issues.len(),
                mixing_rows = inputs.mixing_rows.len(),
                lot_results = inputs.lot_results.len(),
                variety_weights = inputs.variety_weights.len(),
                "报表输入读取完成"
            );

            let entries = self.engine.generate(&query, &inputs);
            info!(entry_count = entries.len(), "报表生成完成");

            Ok(ReportResponse {
                request_id,
                report_type: query.report_type,
                generated_at: Utc::now(),
                entry_count: entries.len(),
                entries,
            })
        }
        .instrument(span)
        .await
    }

    /// 并发读取四类输入
    async fn fetch_inputs(&self, query: &ReportQuery) -> ApiResult<ReportInputs> {
        let (issues, mixing_rows, lot_results, variety_weights) = futures::try_join!(
            async {
                self.source
                    .fetch_issue_records(query)
                    .await
                    .map_err(|e| upstream("issue_record", e))
            },
            async {
                self.source
                    .fetch_mixing_rows(query)
                    .await
                    .map_err(|e| upstream("mixing_row", e))
            },
            async {
                self.source
                    .fetch_lot_results(query)
                    .await
                    .map_err(|e| upstream("lot_result", e))
            },
            async {
                self.source
                    .fetch_variety_weights()
                    .await
                    .map_err(|e| upstream("variety_weight", e))
            },
        )?;

        Ok(ReportInputs {
            issues,
            mixing_rows,
            lot_results,
            variety_weights,
        })
    }
}

fn upstream(source: &str, err: RepositoryError) -> ApiError {
    tracing::error!(source, error = %err, "数据源读取失败");
    ApiError::UpstreamFetch(format!("{}: {}", source, err))
}
