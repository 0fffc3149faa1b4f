// ==========================================
// 棉花混配质量报表系统 - API 请求/响应结构
// ==========================================
// 职责: 传输层形态的请求 (全部为可选字符串) 与报表响应信封
// ==========================================

use crate::domain::summary::SummaryEntry;
use crate::domain::types::ReportType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 报表请求 (未校验)
///
/// 过滤字段可以是 JSON 数组 (`["U1","U2"]`)、JSON 标量或原始字符串
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReportRequest {
    pub from_date: Option<String>, // YYYY-MM-DD
    pub to_date: Option<String>,   // YYYY-MM-DD
    pub report_type: Option<String>,
    pub unit: Option<String>,
    pub line: Option<String>,
    pub blend_code: Option<String>,
    pub mixing: Option<String>,
    pub mixing_no_from: Option<String>,
    pub mixing_no_to: Option<String>,
}

impl RawReportRequest {
    /// 按字段名设置参数值
    ///
    /// # 返回
    /// - true: 字段已识别
    /// - false: 未知字段
    pub fn set_field(&mut self, key: &str, value: &str) -> bool {
        let slot = match key.trim() {
            "from_date" => &mut self.from_date,
            "to_date" => &mut self.to_date,
            "report_type" => &mut self.report_type,
            "unit" => &mut self.unit,
            "line" => &mut self.line,
            "blend_code" => &mut self.blend_code,
            "mixing" => &mut self.mixing,
            "mixing_no_from" => &mut self.mixing_no_from,
            "mixing_no_to" => &mut self.mixing_no_to,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }
}

/// 解析过滤参数
///
/// 规则: 先尝试 JSON 解码 (数组或标量),失败时整体视为单个值
pub fn parse_filter_values(raw: Option<&str>) -> Vec<String> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Vec::new(),
    };

    let values = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Ok(Value::Null) => Vec::new(),
        Ok(value) => match scalar_text(&value) {
            Some(text) => vec![text],
            None => vec![raw.to_string()],
        },
        Err(_) => vec![raw.to_string()],
    };

    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 报表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    /// 请求ID (与日志 span 一致)
    pub request_id: String,
    pub report_type: ReportType,
    pub generated_at: DateTime<Utc>,
    pub entry_count: usize,
    pub entries: Vec<SummaryEntry>,
}
