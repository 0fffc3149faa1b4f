// ==========================================
// 棉花混配质量报表系统 - 报表请求校验器
// ==========================================
// 职责: RawReportRequest → ReportQuery
// 约束: 校验在任何数据读取之前完成,任何一项失败即返回错误
// ==========================================

use chrono::NaiveDate;

use crate::api::dto::{parse_filter_values, RawReportRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ReportConfig;
use crate::domain::query::ReportQuery;
use crate::domain::types::ReportType;

/// 报表请求校验器
pub struct ReportValidator<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportValidator<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// 校验请求并生成查询条件
    pub fn validate(&self, request: &RawReportRequest) -> ApiResult<ReportQuery> {
        let report_type = match non_blank(request.report_type.as_deref()) {
            Some(raw) => raw
                .parse::<ReportType>()
                .map_err(|_| ApiError::InvalidReportType(raw.to_string()))?,
            None => self.config.default_report_type,
        };

        let from_date = parse_date("from_date", request.from_date.as_deref())?;
        let to_date = parse_date("to_date", request.to_date.as_deref())?;
        self.check_date_range(from_date, to_date)?;

        let mixing_no_from = parse_bound("mixing_no_from", request.mixing_no_from.as_deref())?;
        let mixing_no_to = parse_bound("mixing_no_to", request.mixing_no_to.as_deref())?;
        if let (Some(from), Some(to)) = (mixing_no_from, mixing_no_to) {
            if from > to {
                return Err(ApiError::InvalidRange(format!(
                    "mixing_no_from({}) 大于 mixing_no_to({})",
                    from, to
                )));
            }
        }

        Ok(ReportQuery {
            report_type,
            from_date,
            to_date,
            units: parse_filter_values(request.unit.as_deref()),
            lines: parse_filter_values(request.line.as_deref()),
            blend_codes: parse_filter_values(request.blend_code.as_deref()),
            mixings: parse_filter_values(request.mixing.as_deref()),
            mixing_no_from,
            mixing_no_to,
        })
    }

    fn check_date_range(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> ApiResult<()> {
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Ok(()),
        };

        if from > to {
            return Err(ApiError::InvalidDateRange(format!(
                "from_date({}) 晚于 to_date({})",
                from, to
            )));
        }

        if let Some(max_days) = self.config.max_span_days {
            let span = (to - from).num_days() + 1;
            if span > max_days {
                return Err(ApiError::InvalidDateRange(format!(
                    "日期跨度 {} 天超过上限 {} 天",
                    span, max_days
                )));
            }
        }

        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match non_blank(value) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::InvalidDate {
                field: field.to_string(),
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}

fn parse_bound(field: &str, value: Option<&str>) -> ApiResult<Option<i64>> {
    match non_blank(value) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::InvalidNumericBound {
                field: field.to_string(),
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}
