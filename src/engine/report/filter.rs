use crate::domain::query::ReportQuery;
use crate::domain::records::MixingRow;
use crate::engine::blend::signature_matches;
use crate::engine::period::parse_issue_datetime;

// ==========================================
// RowFilter - 请求过滤条件
// ==========================================
// 比较规则: 去空白,忽略 ASCII 大小写; 空集合不过滤
pub struct RowFilter<'q> {
    query: &'q ReportQuery,
}

impl<'q> RowFilter<'q> {
    pub fn new(query: &'q ReportQuery) -> Self {
        Self { query }
    }

    /// 明细级过滤: unit / line / blend_code / 混配号范围 / 日报混配号
    pub fn accepts_row(&self, row: &MixingRow) -> bool {
        let q = self.query;

        if !matches_any(&q.units, &row.unit)
            || !matches_any(&q.lines, &row.line)
            || !matches_any(&q.blend_codes, row.blend_code.as_deref().unwrap_or(""))
        {
            return false;
        }

        if q.has_mixing_no_range() {
            let Some(n) = row.mixing_number() else {
                return false;
            };
            if q.mixing_no_from.is_some_and(|from| n < from) || q.mixing_no_to.is_some_and(|to| n > to) {
                return false;
            }
        }

        // 周/月报的 mixing 过滤作用于构成签名,见 accepts_signature
        q.report_type.is_periodic() || matches_any(&q.mixings, &row.mixing_no)
    }

    /// 发料日期范围 (含两端); 设置范围时无效日期被排除
    pub fn accepts_issue_date(&self, raw: Option<&str>) -> bool {
        let q = self.query;
        if !q.has_date_range() {
            return true;
        }

        let Some(date) = raw.and_then(parse_issue_datetime).map(|dt| dt.date()) else {
            return false;
        };
        q.from_date.map_or(true, |from| date >= from) && q.to_date.map_or(true, |to| date <= to)
    }

    /// 周/月报: mixing 过滤匹配构成签名
    pub fn accepts_signature(&self, signature: &str) -> bool {
        let q = self.query;
        if !q.report_type.is_periodic() || q.mixings.is_empty() {
            return true;
        }
        q.mixings.iter().any(|filter| signature_matches(filter, signature))
    }
}

fn matches_any(filters: &[String], value: &str) -> bool {
    filters.is_empty()
        || filters
            .iter()
            .any(|f| f.trim().eq_ignore_ascii_case(value.trim()))
}
