use super::filter::RowFilter;
use super::grouping::{group_rows, split_by_mixing, IssueIndex, PendingGroup};
use super::ReportInputs;
use crate::domain::query::ReportQuery;
use crate::domain::summary::{BlendComposition, SummaryEntry};
use crate::domain::types::ReportType;
use crate::engine::blend::{BlendResolver, DEFAULT_TOP_COMPONENTS};
use crate::engine::blend_version::BlendVersionParser;
use crate::engine::continuity::{ChangeRates, ContinuitySnapshot, ContinuityTracker, SignatureKey};
use crate::engine::lookup::{LotLookup, VarietyLookup};
use crate::engine::period::PeriodBucketer;
use crate::engine::weighted::{GroupAggregate, GroupRow, WeightedAggregator};
use std::cmp::Ordering;
use tracing::{debug, info};

// ==========================================
// MixingReportEngine - 混配质量报表引擎
// ==========================================
// 红线: 无状态引擎,同一输入多次运行结果一致
pub struct MixingReportEngine {
    blend_resolver: BlendResolver,
}

impl Default for MixingReportEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_COMPONENTS)
    }
}

/// 聚合完成、尚未补充连续性结果的条目
struct DraftEntry {
    entry: SummaryEntry,
    signature: SignatureKey,
    snapshot: ContinuitySnapshot,
    /// 周期内按混配号计算的变化率 (仅周/月报)
    local_rates: Option<ChangeRates>,
    /// 排序值 (日报: 发料时间戳; 周/月报: 周期排序值)
    sort_value: Option<i64>,
}

impl MixingReportEngine {
    /// 创建报表引擎
    ///
    /// # 参数
    /// - `top_components`: 周/月报保留的构成数
    pub fn new(top_components: usize) -> Self {
        Self {
            blend_resolver: BlendResolver::new(top_components),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成报表
    ///
    /// # 参数
    /// - `query`: 已校验的查询条件
    /// - `inputs`: 本次请求预取的输入集合
    ///
    /// # 返回
    /// 按周期/发料日期降序排列的汇总条目 (相同时保持插入顺序)
    pub fn generate(&self, query: &ReportQuery, inputs: &ReportInputs) -> Vec<SummaryEntry> {
        let report_type = query.report_type;
        let filter = RowFilter::new(query);
        let lots = LotLookup::new(&inputs.lot_results);
        let varieties = VarietyLookup::new(&inputs.variety_weights);

        // 1. 明细关联发料记录并过滤
        let rows = self.resolve_rows(&filter, inputs);

        // 2. 分组
        let groups = group_rows(rows, report_type);

        // 3. 聚合 + 构成
        let mut drafts: Vec<DraftEntry> = Vec::with_capacity(groups.len());
        for group in &groups {
            let aggregate = WeightedAggregator::aggregate(&group.rows, &lots);
            let blend = self
                .blend_resolver
                .resolve(&group.rows, &lots, &varieties, report_type);

            if !filter.accepts_signature(&blend.mixing) {
                continue;
            }

            let mut draft = Self::draft_entry(group, aggregate, blend, report_type);
            if report_type.is_periodic() {
                draft.local_rates = Some(ContinuityTracker::period_local(Self::mixing_snapshots(
                    &group.rows,
                    &lots,
                )));
            }
            drafts.push(draft);
        }

        // 4. 连续性
        let continuity_input: Vec<(SignatureKey, ContinuitySnapshot)> = drafts
            .iter()
            .map(|d| (d.signature.clone(), d.snapshot.clone()))
            .collect();
        let change_overs = ContinuityTracker::track(&continuity_input);

        for (draft, change) in drafts.iter_mut().zip(change_overs) {
            // 周期内结果可计算时优先
            let mut rates = change.rates;
            if let Some(local) = draft.local_rates {
                rates.bale_change_over_percent = local.bale_change_over_percent.or(rates.bale_change_over_percent);
                rates.lot_change_over_percent = local.lot_change_over_percent.or(rates.lot_change_over_percent);
            }
            draft.entry.bale_change_over_percent = rates.bale_change_over_percent;
            draft.entry.lot_change_over_percent = rates.lot_change_over_percent;
            draft.entry.previous_mixing_ref = change.previous_mixing_ref;
        }

        // 5. 降序输出 (稳定排序,相同时保持插入顺序)
        drafts.sort_by(|a, b| cmp_desc_nulls_last(a.sort_value, b.sort_value));

        info!(
            report_type = %report_type,
            groups = groups.len(),
            entries = drafts.len(),
            "报表聚合完成"
        );

        drafts.into_iter().map(|d| d.entry).collect()
    }

    /// 明细关联发料记录,应用请求过滤
    fn resolve_rows<'a>(&self, filter: &RowFilter<'_>, inputs: &'a ReportInputs) -> Vec<GroupRow<'a>> {
        let issues = IssueIndex::new(&inputs.issues);
        let mut unmatched = 0usize;

        let rows: Vec<GroupRow<'a>> = inputs
            .mixing_rows
            .iter()
            .filter(|row| filter.accepts_row(row))
            .filter_map(|row| match issues.resolve(row) {
                Some(issue) => Some(GroupRow {
                    row,
                    issue_date: issue.issue_date.as_deref(),
                }),
                None => {
                    unmatched += 1;
                    None
                }
            })
            .filter(|gr| filter.accepts_issue_date(gr.issue_date))
            .collect();

        if unmatched > 0 {
            debug!(unmatched, "混配明细无对应发料记录,已跳过");
        }
        rows
    }

    /// 由聚合结果构造条目草稿
    fn draft_entry(
        group: &PendingGroup<'_>,
        aggregate: GroupAggregate,
        blend_composition: BlendComposition,
        report_type: ReportType,
    ) -> DraftEntry {
        let version = BlendVersionParser::parse(group.blend_code);
        let issue_bucket = aggregate
            .issue_date
            .map(|dt| PeriodBucketer::bucket_datetime(dt, ReportType::Daily));
        let issue_timestamp = issue_bucket.as_ref().map(|b| b.sort_value);

        let period = match report_type {
            ReportType::Daily => issue_bucket.clone(),
            ReportType::Weekly | ReportType::Monthly => group.period.clone(),
        };
        let sort_value = period.as_ref().map(|p| p.sort_value);

        let entry = SummaryEntry {
            period_label: period.as_ref().map(|p| p.label.clone()),
            period_sort_key: period.as_ref().map(|p| p.sort_key.clone()),
            unit: group.unit.to_string(),
            line: group.line.to_string(),
            blend_code: group.blend_code.map(str::to_string),
            issue_date: issue_bucket.map(|b| b.label),
            mixing_range: aggregate.mixing_range.clone(),
            total_bales: aggregate.total_bales,
            no_of_lots: aggregate.no_of_lots,
            weighted_metrics: aggregate.weighted_metrics,
            min_mic: aggregate.min_mic,
            min_mic_percent: aggregate.min_mic_percent,
            blend_composition,
            bale_change_over_percent: None,
            lot_change_over_percent: None,
            previous_mixing_ref: None,
        };

        DraftEntry {
            entry,
            signature: SignatureKey {
                unit: group.unit.to_string(),
                line: group.line.to_string(),
                blend_group_key: version.group_key,
            },
            snapshot: ContinuitySnapshot {
                issue_timestamp,
                version_number: version.version_number,
                max_mixing_number: aggregate.max_mixing_number,
                total_bales: aggregate.total_bales,
                no_of_lots: aggregate.no_of_lots,
                lot_bales: aggregate.lot_bales,
                mixing_ref: aggregate.mixing_range,
            },
            local_rates: None,
            sort_value,
        }
    }

    /// 周期内按混配号拆分的子条目快照
    fn mixing_snapshots(rows: &[GroupRow<'_>], lots: &LotLookup<'_>) -> Vec<ContinuitySnapshot> {
        split_by_mixing(rows)
            .into_iter()
            .map(|part| {
                let aggregate = WeightedAggregator::aggregate(&part, lots);
                ContinuitySnapshot {
                    issue_timestamp: aggregate
                        .issue_date
                        .map(|dt| dt.and_utc().timestamp_millis()),
                    version_number: None,
                    max_mixing_number: aggregate.max_mixing_number,
                    total_bales: aggregate.total_bales,
                    no_of_lots: aggregate.no_of_lots,
                    lot_bales: aggregate.lot_bales,
                    mixing_ref: aggregate.mixing_range,
                }
            })
            .collect()
    }
}

/// 降序,无值排最后
fn cmp_desc_nulls_last(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
