// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use cotton_mixing_report::domain::records::{
    IssueRecord, LotMetrics, LotResult, MixingRow, VarietyWeight,
};
use cotton_mixing_report::engine::ReportInputs;

// ==========================================
// IssueRecord 构建器
// ==========================================

pub struct IssueBuilder {
    unit: String,
    line: String,
    blend_code: Option<String>,
    mixing_no: String,
    issue_date: Option<String>,
}

impl IssueBuilder {
    pub fn new(mixing_no: &str) -> Self {
        Self {
            unit: "U1".to_string(),
            line: "L1".to_string(),
            blend_code: None,
            mixing_no: mixing_no.to_string(),
            issue_date: None,
        }
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn line(mut self, line: &str) -> Self {
        self.line = line.to_string();
        self
    }

    pub fn blend_code(mut self, code: &str) -> Self {
        self.blend_code = Some(code.to_string());
        self
    }

    pub fn issue_date(mut self, date: &str) -> Self {
        self.issue_date = Some(date.to_string());
        self
    }

    pub fn build(self) -> IssueRecord {
        IssueRecord {
            unit: self.unit,
            line: self.line,
            blend_code: self.blend_code,
            mixing_no: self.mixing_no,
            issue_date: self.issue_date,
        }
    }
}

// ==========================================
// MixingRow 构建器
// ==========================================

pub struct MixingRowBuilder {
    mixing_no: String,
    unit: String,
    line: String,
    blend_code: Option<String>,
    lot_no: String,
    issue_bale: Option<f64>,
}

impl MixingRowBuilder {
    pub fn new(mixing_no: &str, lot_no: &str) -> Self {
        Self {
            mixing_no: mixing_no.to_string(),
            unit: "U1".to_string(),
            line: "L1".to_string(),
            blend_code: None,
            lot_no: lot_no.to_string(),
            issue_bale: None,
        }
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn line(mut self, line: &str) -> Self {
        self.line = line.to_string();
        self
    }

    pub fn blend_code(mut self, code: &str) -> Self {
        self.blend_code = Some(code.to_string());
        self
    }

    pub fn bales(mut self, bales: f64) -> Self {
        self.issue_bale = Some(bales);
        self
    }

    pub fn build(self) -> MixingRow {
        MixingRow {
            mixing_no: self.mixing_no,
            unit: self.unit,
            line: self.line,
            blend_code: self.blend_code,
            lot_no: self.lot_no,
            issue_bale: self.issue_bale,
        }
    }
}

// ==========================================
// LotResult 构建器
// ==========================================

pub struct LotResultBuilder {
    lot_no: String,
    variety: Option<String>,
    metrics: LotMetrics,
}

impl LotResultBuilder {
    pub fn new(lot_no: &str) -> Self {
        Self {
            lot_no: lot_no.to_string(),
            variety: None,
            metrics: LotMetrics::default(),
        }
    }

    pub fn variety(mut self, variety: &str) -> Self {
        self.variety = Some(variety.to_string());
        self
    }

    pub fn mic(mut self, mic: f64) -> Self {
        self.metrics.mic = Some(mic);
        self
    }

    pub fn strength(mut self, strength: f64) -> Self {
        self.metrics.strength = Some(strength);
        self
    }

    pub fn min_mic(mut self, min_mic: f64, bales_below: f64, no_of_bale: f64) -> Self {
        self.metrics.min_mic = Some(min_mic);
        self.metrics.min_mic_bale_per_lot = Some(bales_below);
        self.metrics.no_of_bale = Some(no_of_bale);
        self
    }

    pub fn build(self) -> LotResult {
        LotResult {
            lot_no: self.lot_no,
            variety: self.variety,
            metrics: self.metrics,
        }
    }
}

pub fn variety_weight(variety: &str, cotton_name: &str, weight: f64) -> VarietyWeight {
    VarietyWeight {
        variety: variety.to_string(),
        cotton_name: cotton_name.to_string(),
        weight: Some(weight),
    }
}

// ==========================================
// 标准场景
// ==========================================

/// 两个连续混配号 (10 → 11),同一拼配族 25_31
///
/// - 10: LOT-A 100 包 + LOT-B 50 包, 2024-01-02
/// - 11: LOT-A 100 包 + LOT-C 50 包, 2024-01-05
pub fn two_mixing_scenario() -> ReportInputs {
    ReportInputs {
        issues: vec![
            IssueBuilder::new("10").blend_code("25_31_V1").issue_date("2024-01-02").build(),
            IssueBuilder::new("11").blend_code("25_31_V2").issue_date("2024-01-05").build(),
        ],
        mixing_rows: vec![
            MixingRowBuilder::new("10", "LOT-A").blend_code("25_31_V1").bales(100.0).build(),
            MixingRowBuilder::new("10", "LOT-B").blend_code("25_31_V1").bales(50.0).build(),
            MixingRowBuilder::new("11", "LOT-A").blend_code("25_31_V2").bales(100.0).build(),
            MixingRowBuilder::new("11", "LOT-C").blend_code("25_31_V2").bales(50.0).build(),
        ],
        lot_results: vec![
            LotResultBuilder::new("LOT-A").variety("DCH").mic(4.0).min_mic(3.6, 20.0, 100.0).build(),
            LotResultBuilder::new("LOT-B").variety("MCU").mic(5.0).build(),
            LotResultBuilder::new("LOT-C").variety("MCU").mic(3.0).build(),
        ],
        variety_weights: vec![variety_weight("DCH", "DCH", 1.0), variety_weight("MCU", "MCU", 1.0)],
    }
}
