// ==========================================
// 棉花混配质量报表系统 - 内存数据源
// ==========================================
// 职责: 以预加载的记录集合实现 RecordSource
// 用途: 嵌入式调用 / 测试 / 由 JSON 快照生成报表
// ==========================================

use crate::domain::query::ReportQuery;
use crate::domain::records::{IssueRecord, LotResult, MixingRow, VarietyWeight};
use crate::engine::ReportInputs;
use crate::repository::error::RepositoryResult;
use crate::repository::record_source::RecordSource;
use async_trait::async_trait;

/// 内存数据源 (不做预过滤,过滤统一由引擎完成)
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    inputs: ReportInputs,
}

impl MemoryRecordSource {
    pub fn new(inputs: ReportInputs) -> Self {
        Self { inputs }
    }

    /// 从 JSON 快照创建
    ///
    /// 格式: {"issues": [...], "mixing_rows": [...], "lot_results": [...], "variety_weights": [...]}
    pub fn from_json(json: &str) -> RepositoryResult<Self> {
        let inputs: ReportInputs = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("JSON 快照解析失败: {}", e))?;
        Ok(Self::new(inputs))
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn fetch_issue_records(&self, _query: &ReportQuery) -> RepositoryResult<Vec<IssueRecord>> {
        Ok(self.inputs.issues.clone())
    }

    async fn fetch_mixing_rows(&self, _query: &ReportQuery) -> RepositoryResult<Vec<MixingRow>> {
        Ok(self.inputs.mixing_rows.clone())
    }

    async fn fetch_lot_results(&self, _query: &ReportQuery) -> RepositoryResult<Vec<LotResult>> {
        Ok(self.inputs.lot_results.clone())
    }

    async fn fetch_variety_weights(&self) -> RepositoryResult<Vec<VarietyWeight>> {
        Ok(self.inputs.variety_weights.clone())
    }
}
