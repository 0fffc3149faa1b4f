// ==========================================
// 棉花混配质量报表系统 - 包数加权聚合
// ==========================================
// 职责: 对一组混配明细计算包数加权质量指标
// 输入: 分组明细 (含发料日期) + 批次结果索引
// 输出: GroupAggregate
// ==========================================
// 数据异常策略 (尽力而为,不报错):
//   - 包数缺失/非数值 → 0
//   - 指标缺失/非数值 → 贡献 0,但包数仍计入分母 (稀释效应保留)
//   - 批次无检验结果 → 同指标缺失
// ==========================================

use crate::domain::records::{Metric, MixingRow};
use crate::domain::summary::WeightedMetrics;
use crate::engine::lookup::LotLookup;
use crate::engine::period::parse_issue_datetime;
use crate::engine::round_to;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};

/// 参与聚合的一条明细 (已关联发料日期)
#[derive(Debug, Clone, Copy)]
pub struct GroupRow<'a> {
    pub row: &'a MixingRow,
    pub issue_date: Option<&'a str>,
}

// ==========================================
// GroupAggregate - 分组聚合结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub total_bales: f64,
    pub no_of_lots: usize,
    pub weighted_metrics: WeightedMetrics,
    pub min_mic: Option<String>,
    pub min_mic_percent: f64,
    pub mixing_range: String,
    /// 组内最早有效发料时间
    pub issue_date: Option<NaiveDateTime>,
    /// 批号 → 包数合计 (连续性比较使用)
    pub lot_bales: BTreeMap<String, f64>,
    /// 组内最大数值混配号
    pub max_mixing_number: Option<i64>,
}

// ==========================================
// WeightedAggregator - 加权聚合器
// ==========================================
// 红线: 无状态,所有方法都是纯函数
pub struct WeightedAggregator;

impl WeightedAggregator {
    /// 聚合一组明细
    pub fn aggregate(rows: &[GroupRow<'_>], lots: &LotLookup<'_>) -> GroupAggregate {
        let total_bales: f64 = rows.iter().map(|r| r.row.bales()).sum();

        GroupAggregate {
            total_bales,
            no_of_lots: Self::distinct_lots(rows).len(),
            weighted_metrics: Self::weighted_metrics(rows, lots, total_bales),
            min_mic: Self::min_mic(rows, lots),
            min_mic_percent: Self::min_mic_percent(rows, lots, total_bales),
            mixing_range: mixing_range(rows.iter().map(|r| r.row.mixing_no.as_str())),
            issue_date: earliest_issue_date(rows),
            lot_bales: lot_bales(rows.iter().map(|r| r.row)),
            max_mixing_number: rows.iter().filter_map(|r| r.row.mixing_number()).max(),
        }
    }

    fn distinct_lots<'a>(rows: &[GroupRow<'a>]) -> BTreeSet<&'a str> {
        rows.iter()
            .map(|r| r.row.lot_no.trim())
            .filter(|lot| !lot.is_empty())
            .collect()
    }

    /// Σ(包数 × 指标) / 总包数, 两位小数
    fn weighted_metrics(rows: &[GroupRow<'_>], lots: &LotLookup<'_>, total_bales: f64) -> WeightedMetrics {
        let mut metrics = WeightedMetrics::default();
        if total_bales <= 0.0 {
            return metrics;
        }

        for metric in Metric::ALL {
            let weighted_sum: f64 = rows
                .iter()
                .map(|r| {
                    let value = lots
                        .get(&r.row.lot_no)
                        .and_then(|lot| lot.metrics.value(metric))
                        .unwrap_or(0.0);
                    r.row.bales() * value
                })
                .sum();
            metrics.set(metric, round_to(weighted_sum / total_bales, 2));
        }
        metrics
    }

    /// 各批次最低马值中的最小值 (不加权)
    fn min_mic(rows: &[GroupRow<'_>], lots: &LotLookup<'_>) -> Option<String> {
        Self::distinct_lots(rows)
            .into_iter()
            .filter_map(|lot_no| lots.get(lot_no).and_then(|lot| lot.metrics.min_mic))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
            .map(|v| format!("{:.2}", v))
    }

    /// 最低马值包数占比的包数加权平均
    ///
    /// 缺少 min_mic_bale_per_lot 或 no_of_bale <= 0 的批次不进入分子
    fn min_mic_percent(rows: &[GroupRow<'_>], lots: &LotLookup<'_>, total_bales: f64) -> f64 {
        if total_bales <= 0.0 {
            return 0.0;
        }

        let numerator: f64 = rows
            .iter()
            .filter_map(|r| {
                let share = lots.get(&r.row.lot_no)?.metrics.min_mic_bale_share()?;
                Some(r.row.bales() * share)
            })
            .sum();
        round_to(numerator / total_bales, 2)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 混配号范围: "<min>-<max>", 相同时为单值
///
/// 优先按数值比较; 全部非数值时按字典序
pub fn mixing_range<'a, I>(mixing_nos: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = mixing_nos
        .into_iter()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();

    let numeric: Vec<i64> = distinct.iter().filter_map(|m| m.parse::<i64>().ok()).collect();
    let (min, max) = if numeric.is_empty() {
        match (distinct.iter().next(), distinct.iter().next_back()) {
            (Some(min), Some(max)) => (min.to_string(), max.to_string()),
            _ => return String::new(),
        }
    } else {
        let min = numeric.iter().min().copied().unwrap_or_default();
        let max = numeric.iter().max().copied().unwrap_or_default();
        (min.to_string(), max.to_string())
    };

    if min == max {
        min
    } else {
        format!("{}-{}", min, max)
    }
}

/// 最早有效发料时间 (相同时取原始顺序中的第一条)
pub fn earliest_issue_date(rows: &[GroupRow<'_>]) -> Option<NaiveDateTime> {
    rows.iter()
        .filter_map(|r| r.issue_date.and_then(parse_issue_datetime))
        .fold(None, |acc, dt| match acc {
            Some(current) if current <= dt => Some(current),
            _ => Some(dt),
        })
}

/// 批号 → 包数合计
pub fn lot_bales<'a, I>(rows: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a MixingRow>,
{
    let mut totals = BTreeMap::new();
    for row in rows {
        let lot = row.lot_no.trim();
        if lot.is_empty() {
            continue;
        }
        *totals.entry(lot.to_string()).or_insert(0.0) += row.bales();
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{LotMetrics, LotResult};

    fn row(mixing_no: &str, lot_no: &str, bales: Option<f64>) -> MixingRow {
        MixingRow {
            mixing_no: mixing_no.to_string(),
            unit: "U1".to_string(),
            line: "L1".to_string(),
            blend_code: Some("A".to_string()),
            lot_no: lot_no.to_string(),
            issue_bale: bales,
        }
    }

    fn lot(lot_no: &str, mic: Option<f64>) -> LotResult {
        LotResult {
            lot_no: lot_no.to_string(),
            variety: None,
            metrics: LotMetrics {
                mic,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_weighted_mic() {
        let rows = vec![row("10", "L1", Some(100.0)), row("10", "L2", Some(50.0))];
        let lots = vec![lot("L1", Some(4.0)), lot("L2", Some(5.0))];
        let lookup = LotLookup::new(&lots);
        let group: Vec<GroupRow> = rows
            .iter()
            .map(|r| GroupRow { row: r, issue_date: Some("2024-01-10") })
            .collect();

        let agg = WeightedAggregator::aggregate(&group, &lookup);
        assert_eq!(agg.total_bales, 150.0);
        assert_eq!(agg.no_of_lots, 2);
        assert_eq!(agg.weighted_metrics.mic, 4.33);
        assert_eq!(agg.mixing_range, "10");
    }

    #[test]
    fn test_missing_metric_dilutes() {
        // 缺失指标的包数仍计入分母
        let rows = vec![row("10", "L1", Some(100.0)), row("10", "L2", Some(100.0))];
        let lots = vec![lot("L1", Some(4.0)), lot("L2", None)];
        let lookup = LotLookup::new(&lots);
        let group: Vec<GroupRow> = rows.iter().map(|r| GroupRow { row: r, issue_date: None }).collect();

        let agg = WeightedAggregator::aggregate(&group, &lookup);
        assert_eq!(agg.weighted_metrics.mic, 2.0);
    }

    #[test]
    fn test_zero_bales() {
        let rows = vec![row("10", "L1", None), row("11", "L2", Some(0.0))];
        let lots = vec![lot("L1", Some(4.0)), lot("L2", Some(5.0))];
        let lookup = LotLookup::new(&lots);
        let group: Vec<GroupRow> = rows.iter().map(|r| GroupRow { row: r, issue_date: None }).collect();

        let agg = WeightedAggregator::aggregate(&group, &lookup);
        assert_eq!(agg.total_bales, 0.0);
        assert_eq!(agg.weighted_metrics, WeightedMetrics::default());
        assert_eq!(agg.min_mic_percent, 0.0);
        assert_eq!(agg.min_mic, None);
        assert_eq!(agg.mixing_range, "10-11");
    }

    #[test]
    fn test_min_mic_and_percent() {
        let rows = vec![row("10", "L1", Some(60.0)), row("10", "L2", Some(40.0)), row("10", "L3", Some(100.0))];
        let lots = vec![
            LotResult {
                lot_no: "L1".to_string(),
                variety: None,
                metrics: LotMetrics {
                    min_mic: Some(3.456),
                    min_mic_bale_per_lot: Some(10.0),
                    no_of_bale: Some(100.0),
                    ..Default::default()
                },
            },
            LotResult {
                lot_no: "L2".to_string(),
                variety: None,
                metrics: LotMetrics {
                    min_mic: Some(3.8),
                    min_mic_bale_per_lot: Some(5.0),
                    no_of_bale: Some(0.0),
                    ..Default::default()
                },
            },
        ];
        let lookup = LotLookup::new(&lots);
        let group: Vec<GroupRow> = rows.iter().map(|r| GroupRow { row: r, issue_date: None }).collect();

        let agg = WeightedAggregator::aggregate(&group, &lookup);
        assert_eq!(agg.min_mic.as_deref(), Some("3.46"));
        // 60 × 10% / 200 = 3.0 (L2 无有效总包数, L3 无结果,均不进入分子)
        assert_eq!(agg.min_mic_percent, 3.0);
    }

    #[test]
    fn test_mixing_range_numeric_order() {
        assert_eq!(mixing_range(["9", "10", "100"]), "9-100");
        assert_eq!(mixing_range(["12"]), "12");
        assert_eq!(mixing_range(["B", "A"]), "A-B");
        assert_eq!(mixing_range(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_earliest_issue_date_skips_invalid() {
        let rows = vec![row("1", "L1", Some(1.0)), row("2", "L1", Some(1.0)), row("3", "L1", Some(1.0))];
        let group = vec![
            GroupRow { row: &rows[0], issue_date: Some("bad") },
            GroupRow { row: &rows[1], issue_date: Some("2024-02-03") },
            GroupRow { row: &rows[2], issue_date: Some("2024-02-01") },
        ];
        let earliest = earliest_issue_date(&group).unwrap();
        assert_eq!(earliest.format("%Y-%m-%d").to_string(), "2024-02-01");
    }
}
