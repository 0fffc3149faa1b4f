// ==========================================
// 棉花混配质量报表系统 - 连续性跟踪
// ==========================================
// 职责: 同一签名 (unit, line, 配方签名) 内排序并计算变化率
// 排序: 发料时间升序 (无时间排最后)
//       → 版本号升序 (无版本视为 +∞)
//       → 最大混配号升序 (无混配号视为 +∞)
//       → 原始顺序
// 变化率 (与紧邻前序比较):
//   - 包数变化率 = Σ|当前包数 - 前序包数| / 前序总包数 × 100
//   - 批次变化率 = (新增批次 + 移除批次) / 前序批次数 × 100
// 周/月报: 周期内按混配号拆分子条目,两两比较后取算术平均,
//          可计算时优先于跨周期结果
// ==========================================

use crate::engine::round_to;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ==========================================
// SignatureKey - 连续性分组键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureKey {
    pub unit: String,
    pub line: String,
    pub blend_group_key: String,
}

// ==========================================
// ContinuitySnapshot - 参与比较的条目快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContinuitySnapshot {
    pub issue_timestamp: Option<i64>,
    pub version_number: Option<i64>,
    pub max_mixing_number: Option<i64>,
    pub total_bales: f64,
    pub no_of_lots: usize,
    pub lot_bales: BTreeMap<String, f64>,
    /// 渲染后的混配号范围
    pub mixing_ref: String,
}

/// 两条目间的变化率
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChangeRates {
    pub bale_change_over_percent: Option<f64>,
    pub lot_change_over_percent: Option<f64>,
}

/// 条目的连续性结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeOver {
    pub rates: ChangeRates,
    pub previous_mixing_ref: Option<String>,
}

// ==========================================
// ContinuityTracker - 连续性跟踪器
// ==========================================
// 红线: 无状态,所有方法都是纯函数
pub struct ContinuityTracker;

impl ContinuityTracker {
    /// 跨条目连续性计算
    ///
    /// # 参数
    /// - `entries`: (签名, 快照) 列表
    ///
    /// # 返回
    /// 与输入同序的 ChangeOver 列表
    pub fn track(entries: &[(SignatureKey, ContinuitySnapshot)]) -> Vec<ChangeOver> {
        let mut results = vec![ChangeOver::default(); entries.len()];

        let mut groups: HashMap<&SignatureKey, Vec<usize>> = HashMap::new();
        for (idx, (key, _)) in entries.iter().enumerate() {
            groups.entry(key).or_default().push(idx);
        }

        for (key, mut members) in groups {
            members.sort_by(|&a, &b| compare_entries(&entries[a].1, &entries[b].1));

            let mut last_seen: Option<&ContinuitySnapshot> = None;
            for idx in members {
                let current = &entries[idx].1;
                if let Some(previous) = last_seen {
                    results[idx] = ChangeOver {
                        rates: Self::compare(previous, current),
                        previous_mixing_ref: Some(previous.mixing_ref.clone()),
                    };
                }
                last_seen = Some(current);
            }

            tracing::trace!(
                unit = %key.unit,
                line = %key.line,
                blend_group_key = %key.blend_group_key,
                "连续性分组处理完成"
            );
        }

        results
    }

    /// 与前序条目比较
    pub fn compare(previous: &ContinuitySnapshot, current: &ContinuitySnapshot) -> ChangeRates {
        let lots: BTreeSet<&String> = previous.lot_bales.keys().chain(current.lot_bales.keys()).collect();

        let mut abs_diff = 0.0;
        let mut new_lots = 0usize;
        let mut removed_lots = 0usize;
        for lot in lots {
            let before = previous.lot_bales.get(lot).copied().unwrap_or(0.0);
            let after = current.lot_bales.get(lot).copied().unwrap_or(0.0);
            abs_diff += (after - before).abs();

            if before == 0.0 && after > 0.0 {
                new_lots += 1;
            } else if before > 0.0 && after == 0.0 {
                removed_lots += 1;
            }
        }

        ChangeRates {
            bale_change_over_percent: (previous.total_bales > 0.0)
                .then(|| round_to(abs_diff / previous.total_bales * 100.0, 2)),
            lot_change_over_percent: (previous.no_of_lots > 0).then(|| {
                round_to((new_lots + removed_lots) as f64 / previous.no_of_lots as f64 * 100.0, 2)
            }),
        }
    }

    /// 周期内按混配号的平均变化率
    ///
    /// 子条目按发料时间 (无时间排最后) → 混配号排序,两两比较后取可计算值的算术平均
    pub fn period_local(mut sub_entries: Vec<ContinuitySnapshot>) -> ChangeRates {
        sub_entries.sort_by(|a, b| {
            cmp_nulls_last(a.issue_timestamp, b.issue_timestamp)
                .then_with(|| cmp_nulls_last(a.max_mixing_number, b.max_mixing_number))
        });

        let mut bale_rates = Vec::new();
        let mut lot_rates = Vec::new();
        for pair in sub_entries.windows(2) {
            let rates = Self::compare(&pair[0], &pair[1]);
            bale_rates.extend(rates.bale_change_over_percent);
            lot_rates.extend(rates.lot_change_over_percent);
        }

        ChangeRates {
            bale_change_over_percent: mean(&bale_rates),
            lot_change_over_percent: mean(&lot_rates),
        }
    }
}

/// 组内排序比较
fn compare_entries(a: &ContinuitySnapshot, b: &ContinuitySnapshot) -> Ordering {
    cmp_nulls_last(a.issue_timestamp, b.issue_timestamp)
        .then_with(|| cmp_nulls_last(a.version_number, b.version_number))
        .then_with(|| cmp_nulls_last(a.max_mixing_number, b.max_mixing_number))
}

/// None 视为 +∞
fn cmp_nulls_last(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 算术平均 (两位小数)
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round_to(values.iter().sum::<f64>() / values.len() as f64, 2))
    }
}
