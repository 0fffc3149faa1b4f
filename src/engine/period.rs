// ==========================================
// 棉花混配质量报表系统 - 周期分桶
// ==========================================
// 职责: 发料日期 + 报表粒度 → 周期标签 / 排序键 / 排序值
// 规则:
//   - daily:   YYYY-MM-DD, 排序值 = 毫秒时间戳
//   - weekly:  YYYY-MM-W<n>, n = ceil(日/7), 排序键 YYYY-MM-0n, 排序值 YYYYMM0n
//   - monthly: YYYY-MM, 排序值 YYYYMM
// 日期缺失或无法解析 → None (周/月汇总时该记录被排除)
// ==========================================

use crate::domain::types::ReportType;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 支持的日期时间格式 (按顺序尝试)
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// 支持的纯日期格式
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// 解析发料日期 (时间按 UTC 处理)
pub fn parse_issue_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 发料日期的毫秒时间戳
pub fn issue_timestamp_millis(raw: Option<&str>) -> Option<i64> {
    raw.and_then(parse_issue_datetime)
        .map(|dt| dt.and_utc().timestamp_millis())
}

// ==========================================
// PeriodBucket - 周期桶
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub label: String,
    pub sort_key: String,
    pub sort_value: i64,
}

// ==========================================
// PeriodBucketer - 周期分桶器
// ==========================================
// 无状态,所有方法都是纯函数
pub struct PeriodBucketer;

impl PeriodBucketer {
    /// 计算周期桶
    ///
    /// # 返回
    /// - Some(PeriodBucket): 日期有效
    /// - None: 日期缺失或无法解析
    pub fn bucket(raw_date: Option<&str>, report_type: ReportType) -> Option<PeriodBucket> {
        let dt = raw_date.and_then(parse_issue_datetime)?;
        Some(Self::bucket_datetime(dt, report_type))
    }

    /// 对已解析的日期时间分桶
    pub fn bucket_datetime(dt: NaiveDateTime, report_type: ReportType) -> PeriodBucket {
        let date = dt.date();
        let year = date.year();
        let month = date.month();

        match report_type {
            ReportType::Daily => {
                let label = date.format("%Y-%m-%d").to_string();
                PeriodBucket {
                    sort_key: label.clone(),
                    label,
                    sort_value: dt.and_utc().timestamp_millis(),
                }
            }
            ReportType::Weekly => {
                let week = week_of_month(date.day());
                PeriodBucket {
                    label: format!("{:04}-{:02}-W{}", year, month, week),
                    sort_key: format!("{:04}-{:02}-{:02}", year, month, week),
                    sort_value: i64::from(year) * 10_000 + i64::from(month) * 100 + i64::from(week),
                }
            }
            ReportType::Monthly => {
                let label = format!("{:04}-{:02}", year, month);
                PeriodBucket {
                    sort_key: label.clone(),
                    label,
                    sort_value: i64::from(year) * 100 + i64::from(month),
                }
            }
        }
    }
}

/// 月内周序号: ceil(day / 7)
fn week_of_month(day: u32) -> u32 {
    (day + 6) / 7
}
