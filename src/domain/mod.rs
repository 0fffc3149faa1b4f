// ==========================================
// 棉花混配质量报表系统 - 领域模型层
// ==========================================
// 职责: 定义输入记录、派生汇总对象、基础类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod query;
pub mod records;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use query::ReportQuery;
pub use records::{IssueKey, IssueRecord, LotMetrics, LotResult, Metric, MixingRow, VarietyWeight};
pub use summary::{BlendComponent, BlendComposition, SummaryEntry, WeightedMetrics};
pub use types::ReportType;
