// ==========================================
// 棉花混配质量报表系统 - 报表查询条件
// ==========================================
// 职责: 已校验的报表请求条件 (引擎与数据源共用)
// 约束: 由 API 层校验后构造,引擎不再做格式校验
// ==========================================

use crate::domain::types::ReportType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 报表查询条件
///
/// 空的过滤集合表示不过滤
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub report_type: ReportType,

    /// 发料日期下界 (含)
    pub from_date: Option<NaiveDate>,

    /// 发料日期上界 (含)
    pub to_date: Option<NaiveDate>,

    pub units: Vec<String>,
    pub lines: Vec<String>,
    pub blend_codes: Vec<String>,

    /// 日报: 匹配混配号; 周/月报: 匹配棉花名称签名
    pub mixings: Vec<String>,

    /// 混配号数值下界 (含)
    pub mixing_no_from: Option<i64>,

    /// 混配号数值上界 (含)
    pub mixing_no_to: Option<i64>,
}

impl ReportQuery {
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            ..Default::default()
        }
    }

    pub fn has_date_range(&self) -> bool {
        self.from_date.is_some() || self.to_date.is_some()
    }

    pub fn has_mixing_no_range(&self) -> bool {
        self.mixing_no_from.is_some() || self.mixing_no_to.is_some()
    }
}
