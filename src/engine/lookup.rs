// ==========================================
// 棉花混配质量报表系统 - 参考数据索引
// ==========================================
// 职责: 将请求内预取的批次结果/品种映射建成只读索引
// 红线: 显式传参,不使用全局缓存
// ==========================================

use crate::domain::records::{LotResult, VarietyWeight};
use std::collections::HashMap;

// ==========================================
// LotLookup - 批号 → 检验结果
// ==========================================
/// 批号索引 (重复批号取第一条)
pub struct LotLookup<'a> {
    by_lot: HashMap<&'a str, &'a LotResult>,
}

impl<'a> LotLookup<'a> {
    pub fn new(lots: &'a [LotResult]) -> Self {
        let mut by_lot = HashMap::with_capacity(lots.len());
        for lot in lots {
            by_lot.entry(lot.lot_no.trim()).or_insert(lot);
        }
        Self { by_lot }
    }

    pub fn get(&self, lot_no: &str) -> Option<&'a LotResult> {
        self.by_lot.get(lot_no.trim()).copied()
    }

    /// 批号对应的品种
    pub fn variety_of(&self, lot_no: &str) -> Option<&'a str> {
        self.get(lot_no).and_then(|lot| lot.variety.as_deref())
    }

    pub fn len(&self) -> usize {
        self.by_lot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lot.is_empty()
    }
}

// ==========================================
// VarietyLookup - 品种 → 棉花名称/权重
// ==========================================

/// 品种映射目标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarietyMapping<'a> {
    pub cotton_name: &'a str,
    pub weight: f64,
}

/// 品种索引 (去空白,忽略大小写; 重复品种取第一条; 缺失权重按 0)
pub struct VarietyLookup<'a> {
    by_variety: HashMap<String, VarietyMapping<'a>>,
}

impl<'a> VarietyLookup<'a> {
    pub fn new(weights: &'a [VarietyWeight]) -> Self {
        let mut by_variety = HashMap::with_capacity(weights.len());
        for w in weights {
            let key = normalize_variety(&w.variety);
            if key.is_empty() {
                continue;
            }
            by_variety.entry(key).or_insert(VarietyMapping {
                cotton_name: w.cotton_name.trim(),
                weight: w.weight.unwrap_or(0.0),
            });
        }
        Self { by_variety }
    }

    pub fn get(&self, variety: &str) -> Option<VarietyMapping<'a>> {
        self.by_variety.get(&normalize_variety(variety)).copied()
    }
}

fn normalize_variety(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::LotMetrics;

    #[test]
    fn test_lot_lookup_first_wins() {
        let lots = vec![
            LotResult {
                lot_no: "L1".to_string(),
                variety: Some("DCH".to_string()),
                metrics: LotMetrics::default(),
            },
            LotResult {
                lot_no: "L1".to_string(),
                variety: Some("MCU".to_string()),
                metrics: LotMetrics::default(),
            },
        ];
        let lookup = LotLookup::new(&lots);
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.variety_of(" L1 "), Some("DCH"));
        assert_eq!(lookup.variety_of("L2"), None);
    }

    #[test]
    fn test_variety_lookup_case_insensitive() {
        let weights = vec![
            VarietyWeight {
                variety: "shankar-6".to_string(),
                cotton_name: "S6".to_string(),
                weight: Some(1.5),
            },
            VarietyWeight {
                variety: "MCU".to_string(),
                cotton_name: "MCU5".to_string(),
                weight: None,
            },
        ];
        let lookup = VarietyLookup::new(&weights);
        let s6 = lookup.get("SHANKAR-6").unwrap();
        assert_eq!(s6.cotton_name, "S6");
        assert_eq!(s6.weight, 1.5);
        assert_eq!(lookup.get("mcu").unwrap().weight, 0.0);
        assert!(lookup.get("unknown").is_none());
    }
}
