use crate::domain::records::{IssueKey, IssueRecord, MixingRow};
use crate::domain::types::ReportType;
use crate::engine::period::{PeriodBucket, PeriodBucketer};
use crate::engine::weighted::GroupRow;
use std::collections::HashMap;

// ==========================================
// IssueIndex - 发料记录索引
// ==========================================
/// 明细 → 发料记录关联
///
/// 先按 (unit, line, mixing_no, blend_code) 复合键匹配,
/// 无匹配时回退为仅按 mixing_no 匹配 (均取第一条)
pub struct IssueIndex<'a> {
    by_key: HashMap<IssueKey, &'a IssueRecord>,
    by_mixing_no: HashMap<&'a str, &'a IssueRecord>,
}

impl<'a> IssueIndex<'a> {
    pub fn new(issues: &'a [IssueRecord]) -> Self {
        let mut by_key = HashMap::with_capacity(issues.len());
        let mut by_mixing_no = HashMap::with_capacity(issues.len());
        for issue in issues {
            by_key.entry(IssueKey::of_issue(issue)).or_insert(issue);
            by_mixing_no.entry(issue.mixing_no.as_str()).or_insert(issue);
        }
        Self { by_key, by_mixing_no }
    }

    pub fn resolve(&self, row: &MixingRow) -> Option<&'a IssueRecord> {
        self.by_key
            .get(&IssueKey::of_row(row))
            .or_else(|| self.by_mixing_no.get(row.mixing_no.as_str()))
            .copied()
    }
}

// ==========================================
// 分组
// ==========================================

/// 分组键: 日报为混配号,周/月报为周期排序键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    bucket: String,
    unit: String,
    line: String,
    blend_code: Option<String>,
}

/// 待聚合分组
#[derive(Debug)]
pub(super) struct PendingGroup<'a> {
    pub unit: &'a str,
    pub line: &'a str,
    pub blend_code: Option<&'a str>,
    /// 周/月报的周期桶 (日报由组内最早发料日期决定)
    pub period: Option<PeriodBucket>,
    pub rows: Vec<GroupRow<'a>>,
}

/// 按报表粒度分组,保持首次出现顺序
///
/// 周/月报中周期标签为空的明细被排除
pub(super) fn group_rows<'a>(rows: Vec<GroupRow<'a>>, report_type: ReportType) -> Vec<PendingGroup<'a>> {
    let mut groups: Vec<PendingGroup<'a>> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut undated = 0usize;

    for gr in rows {
        let (bucket, period) = if report_type.is_periodic() {
            match PeriodBucketer::bucket(gr.issue_date, report_type) {
                Some(p) => (p.sort_key.clone(), Some(p)),
                None => {
                    undated += 1;
                    continue;
                }
            }
        } else {
            (gr.row.mixing_no.clone(), None)
        };

        let key = GroupKey {
            bucket,
            unit: gr.row.unit.clone(),
            line: gr.row.line.clone(),
            blend_code: gr.row.blend_code.clone(),
        };

        match index.get(&key) {
            Some(&i) => groups[i].rows.push(gr),
            None => {
                index.insert(key, groups.len());
                groups.push(PendingGroup {
                    unit: &gr.row.unit,
                    line: &gr.row.line,
                    blend_code: gr.row.blend_code.as_deref(),
                    period,
                    rows: vec![gr],
                });
            }
        }
    }

    if undated > 0 {
        tracing::debug!(undated, report_type = %report_type, "发料日期无效,已排除出周期汇总");
    }
    groups
}

/// 按混配号拆分 (保持首次出现顺序)
pub(super) fn split_by_mixing<'a>(rows: &[GroupRow<'a>]) -> Vec<Vec<GroupRow<'a>>> {
    let mut parts: Vec<Vec<GroupRow<'a>>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for gr in rows {
        let mixing_no = gr.row.mixing_no.trim();
        match index.get(mixing_no) {
            Some(&i) => parts[i].push(*gr),
            None => {
                index.insert(mixing_no, parts.len());
                parts.push(vec![*gr]);
            }
        }
    }
    parts
}
