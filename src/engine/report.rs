// ==========================================
// 棉花混配质量报表系统 - 报表引擎
// ==========================================
// 职责: 组装完整聚合流水线
// 输入: 单次请求预取的四类记录 + 已校验查询条件
// 输出: 排序后的 SummaryEntry 列表
// ==========================================
// 红线: 同一输入多次运行结果一致 (无隐藏状态)
// ==========================================

mod core;
mod filter;
mod grouping;


pub use core::MixingReportEngine;
pub use filter::RowFilter;
pub use grouping::IssueIndex;

use crate::domain::records::{IssueRecord, LotResult, MixingRow, VarietyWeight};
use serde::{Deserialize, Serialize};

// ==========================================
// ReportInputs - 单次请求的输入集合
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportInputs {
    pub issues: Vec<IssueRecord>,
    pub mixing_rows: Vec<MixingRow>,
    pub lot_results: Vec<LotResult>,
    pub variety_weights: Vec<VarietyWeight>,
}
