// ==========================================
// 棉花混配质量报表系统 - 输入记录
// ==========================================
// 职责: 定义聚合引擎消费的四类只读输入
//   - IssueRecord: 发料记录 (混配号 → 发料日期)
//   - MixingRow: 混配明细 (混配号 × 批号 → 包数)
//   - LotResult: 批次检验结果 (质量指标)
//   - VarietyWeight: 品种映射 (品种 → 棉花名称 + 权重)
// 约束: 数值字段宽松解析,非数值/缺失一律为 None,由引擎按 0 处理
// ==========================================

use serde::{Deserialize, Deserializer, Serialize};

// ==========================================
// 宽松数值解析
// ==========================================

/// 宽松解析 JSON 值为 f64
///
/// - 数字 → Some
/// - 数字字符串 (允许首尾空白) → Some
/// - 其他 (null / 空串 / 非数值 / NaN) → None
pub fn lenient_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_lenient_f64(s),
        _ => None,
    }
}

/// 宽松解析字符串为 f64
pub fn parse_lenient_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_f64))
}

fn de_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn de_opt_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let code = de_code(deserializer)?;
    Ok(if code.is_empty() { None } else { Some(code) })
}

/// 解析混配号为整数 (非数值返回 None)
pub fn parse_mixing_number(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

// ==========================================
// IssueRecord - 发料记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    #[serde(deserialize_with = "de_code")]
    pub unit: String,

    #[serde(deserialize_with = "de_code")]
    pub line: String,

    #[serde(default, deserialize_with = "de_opt_code")]
    pub blend_code: Option<String>,

    #[serde(deserialize_with = "de_code")]
    pub mixing_no: String,

    /// 原始发料日期 (可能缺失或无法解析)
    #[serde(default)]
    pub issue_date: Option<String>,
}

// ==========================================
// MixingRow - 混配明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixingRow {
    #[serde(deserialize_with = "de_code")]
    pub mixing_no: String,

    #[serde(deserialize_with = "de_code")]
    pub unit: String,

    #[serde(deserialize_with = "de_code")]
    pub line: String,

    #[serde(default, deserialize_with = "de_opt_code")]
    pub blend_code: Option<String>,

    #[serde(deserialize_with = "de_code")]
    pub lot_no: String,

    /// 发料包数 (非数值/缺失为 None)
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub issue_bale: Option<f64>,
}

impl MixingRow {
    /// 参与计算的包数 (缺失按 0)
    pub fn bales(&self) -> f64 {
        self.issue_bale.unwrap_or(0.0)
    }

    /// 数值化混配号
    pub fn mixing_number(&self) -> Option<i64> {
        parse_mixing_number(&self.mixing_no)
    }
}

// ==========================================
// 质量指标
// ==========================================

/// 参与包数加权的质量指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Mic,
    #[serde(rename = "str")]
    Strength,
    Uhml,
    Rd,
    PlusB,
    Sf,
    Ui,
    Elong,
    Trash,
    Moist,
}

impl Metric {
    /// 全部加权指标 (输出顺序)
    pub const ALL: [Metric; 10] = [
        Metric::Mic,
        Metric::Strength,
        Metric::Uhml,
        Metric::Rd,
        Metric::PlusB,
        Metric::Sf,
        Metric::Ui,
        Metric::Elong,
        Metric::Trash,
        Metric::Moist,
    ];
}

/// 批次检验指标 (HVI)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LotMetrics {
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub uhml: Option<f64>,
    #[serde(default, rename = "str", deserialize_with = "de_opt_f64")]
    pub strength: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub mic: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub rd: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub plus_b: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub sf: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub ui: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub elong: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub trash: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub moist: Option<f64>,
    /// 批内最低马值
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub min_mic: Option<f64>,
    /// 批内最低马值包数
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub min_mic_bale_per_lot: Option<f64>,
    /// 批次总包数
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub no_of_bale: Option<f64>,
}

impl LotMetrics {
    /// 读取指定指标
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mic => self.mic,
            Metric::Strength => self.strength,
            Metric::Uhml => self.uhml,
            Metric::Rd => self.rd,
            Metric::PlusB => self.plus_b,
            Metric::Sf => self.sf,
            Metric::Ui => self.ui,
            Metric::Elong => self.elong,
            Metric::Trash => self.trash,
            Metric::Moist => self.moist,
        }
    }

    /// 批内最低马值包数占比 (%)
    ///
    /// 缺少 min_mic_bale_per_lot 或 no_of_bale <= 0 时返回 None (不参与分子)
    pub fn min_mic_bale_share(&self) -> Option<f64> {
        let per_lot = self.min_mic_bale_per_lot?;
        let total = self.no_of_bale.filter(|n| *n > 0.0)?;
        Some(per_lot * 100.0 / total)
    }
}

// ==========================================
// LotResult - 批次检验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotResult {
    #[serde(deserialize_with = "de_code")]
    pub lot_no: String,

    #[serde(default, deserialize_with = "de_opt_code")]
    pub variety: Option<String>,

    #[serde(flatten)]
    pub metrics: LotMetrics,
}

// ==========================================
// VarietyWeight - 品种映射
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarietyWeight {
    #[serde(deserialize_with = "de_code")]
    pub variety: String,

    #[serde(deserialize_with = "de_code")]
    pub cotton_name: String,

    /// 混配权重 (缺失按 0)
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub weight: Option<f64>,
}

// ==========================================
// IssueKey - 发料复合键
// ==========================================
/// (unit, line, mixing_no, blend_code) 复合键
///
/// 以结构体作为 HashMap 键,避免字符串拼接键在字段含分隔符时碰撞
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey {
    pub unit: String,
    pub line: String,
    pub mixing_no: String,
    pub blend_code: Option<String>,
}

impl IssueKey {
    pub fn of_issue(record: &IssueRecord) -> Self {
        Self {
            unit: record.unit.clone(),
            line: record.line.clone(),
            mixing_no: record.mixing_no.clone(),
            blend_code: record.blend_code.clone(),
        }
    }

    pub fn of_row(row: &MixingRow) -> Self {
        Self {
            unit: row.unit.clone(),
            line: row.line.clone(),
            mixing_no: row.mixing_no.clone(),
            blend_code: row.blend_code.clone(),
        }
    }
}
