// ==========================================
// 棉花混配质量报表系统 - 记录数据源 Trait
// ==========================================
// 职责: 定义报表所需的四类只读查询 (不包含实现)
// 约束: 四类查询相互独立,调用方可并发发起
// 实现者: SqliteRecordSource / MemoryRecordSource
// ==========================================

use crate::domain::query::ReportQuery;
use crate::domain::records::{IssueRecord, LotResult, MixingRow, VarietyWeight};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// 发料记录
    async fn fetch_issue_records(&self, query: &ReportQuery) -> RepositoryResult<Vec<IssueRecord>>;

    /// 混配明细 (实现可按 unit / line / blend_code 预过滤)
    async fn fetch_mixing_rows(&self, query: &ReportQuery) -> RepositoryResult<Vec<MixingRow>>;

    /// 批次检验结果
    async fn fetch_lot_results(&self, query: &ReportQuery) -> RepositoryResult<Vec<LotResult>>;

    /// 品种映射
    async fn fetch_variety_weights(&self) -> RepositoryResult<Vec<VarietyWeight>>;
}
