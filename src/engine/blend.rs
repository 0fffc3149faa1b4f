// ==========================================
// 棉花混配质量报表系统 - 混配构成解析
// ==========================================
// 职责: 计算分组的棉花名称构成及占比
// 贡献值: 包数 × 品种权重,按棉花名称累加
// 规则:
//   - 日报: 名称忽略大小写升序,占比取整, "+" 连接
//           无正贡献时回退为全部映射名称,占比为 0
//   - 周/月报: 贡献降序,占比一位小数,仅保留前 N 个
//           mixing 字段为正贡献名称集合的规范化签名
// 约束: 批次无映射品种时仅跳过构成计算,不影响指标
// ==========================================

use crate::domain::summary::{BlendComponent, BlendComposition};
use crate::domain::types::ReportType;
use crate::engine::lookup::{LotLookup, VarietyLookup};
use crate::engine::round_to;
use crate::engine::weighted::GroupRow;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// 周/月报默认保留的构成数
pub const DEFAULT_TOP_COMPONENTS: usize = 3;

// ==========================================
// BlendResolver - 混配构成解析器
// ==========================================
pub struct BlendResolver {
    top_components: usize,
}

impl Default for BlendResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_COMPONENTS)
    }
}

impl BlendResolver {
    pub fn new(top_components: usize) -> Self {
        Self {
            top_components: top_components.max(1),
        }
    }

    /// 计算分组构成
    pub fn resolve(
        &self,
        rows: &[GroupRow<'_>],
        lots: &LotLookup<'_>,
        varieties: &VarietyLookup<'_>,
        report_type: ReportType,
    ) -> BlendComposition {
        let contributions = Self::contributions(rows, lots, varieties);

        match report_type {
            ReportType::Daily => Self::daily_composition(contributions),
            ReportType::Weekly | ReportType::Monthly => self.periodic_composition(contributions),
        }
    }

    /// 按棉花名称累加贡献值 (保持首次出现顺序)
    fn contributions(
        rows: &[GroupRow<'_>],
        lots: &LotLookup<'_>,
        varieties: &VarietyLookup<'_>,
    ) -> Vec<(String, f64)> {
        let mut order: Vec<(String, f64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for r in rows {
            let Some(mapping) = lots
                .variety_of(&r.row.lot_no)
                .and_then(|variety| varieties.get(variety))
            else {
                tracing::trace!(lot_no = %r.row.lot_no, "批次无映射品种,跳过构成计算");
                continue;
            };
            if mapping.cotton_name.is_empty() {
                continue;
            }

            let value = r.row.bales() * mapping.weight;
            match index.get(mapping.cotton_name) {
                Some(&i) => order[i].1 += value,
                None => {
                    index.insert(mapping.cotton_name.to_string(), order.len());
                    order.push((mapping.cotton_name.to_string(), value));
                }
            }
        }
        order
    }

    fn daily_composition(mut contributions: Vec<(String, f64)>) -> BlendComposition {
        contributions.sort_by(|a, b| compare_names(&a.0, &b.0));

        let total: f64 = contributions.iter().map(|(_, v)| v.max(0.0)).sum();
        let components: Vec<BlendComponent> = contributions
            .into_iter()
            .map(|(cotton_name, contribution)| {
                let percent = if total > 0.0 {
                    (contribution.max(0.0) / total * 100.0).round()
                } else {
                    0.0
                };
                BlendComponent {
                    cotton_name,
                    contribution,
                    percent,
                }
            })
            .collect();

        BlendComposition {
            mixing: components
                .iter()
                .map(|c| c.cotton_name.as_str())
                .collect::<Vec<_>>()
                .join("+"),
            blend_percent: components
                .iter()
                .map(|c| format!("{}", c.percent as i64))
                .collect::<Vec<_>>()
                .join("+"),
            components,
        }
    }

    fn periodic_composition(&self, mut contributions: Vec<(String, f64)>) -> BlendComposition {
        // 签名仅包含正贡献的名称
        let signature = normalize_signature(
            contributions
                .iter()
                .filter(|(_, value)| *value > 0.0)
                .map(|(name, _)| name.as_str()),
        );

        contributions.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| compare_names(&a.0, &b.0))
        });

        let total: f64 = contributions.iter().map(|(_, v)| v.max(0.0)).sum();
        let components: Vec<BlendComponent> = contributions
            .into_iter()
            .take(self.top_components)
            .map(|(cotton_name, contribution)| {
                let percent = if total > 0.0 {
                    round_to(contribution.max(0.0) / total * 100.0, 1)
                } else {
                    0.0
                };
                BlendComponent {
                    cotton_name,
                    contribution,
                    percent,
                }
            })
            .collect();

        BlendComposition {
            mixing: signature,
            blend_percent: components
                .iter()
                .map(|c| format!("{} {:.1}%", c.cotton_name, c.percent))
                .collect::<Vec<_>>()
                .join(", "),
            components,
        }
    }
}

// ==========================================
// 签名工具
// ==========================================

/// 名称比较: 忽略大小写,相同时按原文
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// 名称集合规范化签名: 去空白、去重、排序、"+" 连接
pub fn normalize_signature<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join("+")
}

/// 过滤值是否匹配签名 (两侧均按 "+" 拆分规范化,忽略大小写)
pub fn signature_matches(filter: &str, signature: &str) -> bool {
    let canonical = |raw: &str| {
        raw.split('+')
            .map(|n| n.trim().to_uppercase())
            .filter(|n| !n.is_empty())
            .collect::<BTreeSet<_>>()
    };
    let wanted = canonical(filter);
    !wanted.is_empty() && wanted == canonical(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{LotMetrics, LotResult, MixingRow, VarietyWeight};

    fn row(lot_no: &str, bales: f64) -> MixingRow {
        MixingRow {
            mixing_no: "10".to_string(),
            unit: "U1".to_string(),
            line: "L1".to_string(),
            blend_code: Some("A".to_string()),
            lot_no: lot_no.to_string(),
            issue_bale: Some(bales),
        }
    }

    fn lot(lot_no: &str, variety: Option<&str>) -> LotResult {
        LotResult {
            lot_no: lot_no.to_string(),
            variety: variety.map(str::to_string),
            metrics: LotMetrics::default(),
        }
    }

    fn weight(variety: &str, cotton_name: &str, w: f64) -> VarietyWeight {
        VarietyWeight {
            variety: variety.to_string(),
            cotton_name: cotton_name.to_string(),
            weight: Some(w),
        }
    }

    fn fixture() -> (Vec<MixingRow>, Vec<LotResult>, Vec<VarietyWeight>) {
        let rows = vec![
            row("L1", 60.0),
            row("L2", 30.0),
            row("L3", 10.0),
            row("L4", 20.0),
            row("L5", 5.0),
        ];
        let lots = vec![
            lot("L1", Some("V-DCH")),
            lot("L2", Some("V-MCU")),
            lot("L3", Some("V-DCH")),
            lot("L4", Some("V-BUN")),
            lot("L5", None),
        ];
        let weights = vec![
            weight("V-DCH", "dch", 1.0),
            weight("V-MCU", "MCU", 1.0),
            weight("V-BUN", "Bunny", 0.5),
        ];
        (rows, lots, weights)
    }

    #[test]
    fn test_daily_composition() {
        let (rows, lots, weights) = fixture();
        let lot_lookup = LotLookup::new(&lots);
        let variety_lookup = VarietyLookup::new(&weights);
        let group: Vec<GroupRow> = rows.iter().map(|r| GroupRow { row: r, issue_date: None }).collect();

        let blend = BlendResolver::default().resolve(&group, &lot_lookup, &variety_lookup, ReportType::Daily);
        // dch=70, MCU=30, Bunny=10 → 总 110
        assert_eq!(blend.mixing, "Bunny+dch+MCU");
        assert_eq!(blend.blend_percent, "9+64+27");
        assert!((blend.percent_total() - 100.0).abs() <= 1.0);
    }

    #[test]
    fn test_daily_fallback_without_positive_contribution() {
        let rows = vec![row("L1", 0.0), row("L2", 0.0)];
        let lots = vec![lot("L1", Some("V-MCU")), lot("L2", Some("V-DCH"))];
        let weights = vec![weight("V-DCH", "DCH", 1.0), weight("V-MCU", "MCU", 1.0)];
        let lot_lookup = LotLookup::new(&lots);
        let variety_lookup = VarietyLookup::new(&weights);
        let group: Vec<GroupRow> = rows.iter().map(|r| GroupRow { row: r, issue_date: None }).collect();

        let blend = BlendResolver::default().resolve(&group, &lot_lookup, &variety_lookup, ReportType::Daily);
        assert_eq!(blend.mixing, "DCH+MCU");
        assert_eq!(blend.blend_percent, "0+0");
    }

    #[test]
    fn test_periodic_composition_top_n() {
        let (rows, lots, weights) = fixture();
        let lot_lookup = LotLookup::new(&lots);
        let variety_lookup = VarietyLookup::new(&weights);
        let group: Vec<GroupRow> = rows.iter().map(|r| GroupRow { row: r, issue_date: None }).collect();

        let blend = BlendResolver::new(2).resolve(&group, &lot_lookup, &variety_lookup, ReportType::Weekly);
        assert_eq!(blend.mixing, "Bunny+MCU+dch");
        assert_eq!(blend.blend_percent, "dch 63.6%, MCU 27.3%");
        assert_eq!(blend.components.len(), 2);

        let monthly = BlendResolver::default().resolve(&group, &lot_lookup, &variety_lookup, ReportType::Monthly);
        assert_eq!(monthly.blend_percent, "dch 63.6%, MCU 27.3%, Bunny 9.1%");
    }

    #[test]
    fn test_periodic_signature_skips_zero_contribution() {
        let rows = vec![row("L1", 60.0), row("L2", 30.0), row("L3", 0.0)];
        let lots = vec![
            lot("L1", Some("V-DCH")),
            lot("L2", Some("V-ZERO")),
            lot("L3", Some("V-MCU")),
        ];
        let weights = vec![
            weight("V-DCH", "DCH", 1.0),
            weight("V-ZERO", "ZERO", 0.0),
            weight("V-MCU", "MCU", 1.0),
        ];
        let lot_lookup = LotLookup::new(&lots);
        let variety_lookup = VarietyLookup::new(&weights);
        let group: Vec<GroupRow> = rows.iter().map(|r| GroupRow { row: r, issue_date: None }).collect();

        let blend = BlendResolver::default().resolve(&group, &lot_lookup, &variety_lookup, ReportType::Monthly);
        assert_eq!(blend.mixing, "DCH");
        assert!(signature_matches("dch", &blend.mixing));
        assert!(!signature_matches("DCH+MCU", &blend.mixing));
    }

    #[test]
    fn test_signature_helpers() {
        assert_eq!(normalize_signature(["MCU", " DCH ", "MCU", ""]), "DCH+MCU");
        assert!(signature_matches("mcu + dch", "DCH+MCU"));
        assert!(!signature_matches("DCH", "DCH+MCU"));
        assert!(!signature_matches("", ""));
    }
}
