// ==========================================
// 棉花混配质量报表系统 - 汇总条目
// ==========================================
// 职责: 定义单次请求内由引擎生成的派生对象
// 生命周期: 每次请求新建,响应后丢弃 (无跨请求状态)
// ==========================================

use crate::domain::records::Metric;
use serde::{Deserialize, Serialize};

// ==========================================
// WeightedMetrics - 包数加权指标
// ==========================================
/// 包数加权后的质量指标 (保留两位小数,总包数为 0 时全部为 0)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedMetrics {
    pub mic: f64,
    #[serde(rename = "str")]
    pub strength: f64,
    pub uhml: f64,
    pub rd: f64,
    pub plus_b: f64,
    pub sf: f64,
    pub ui: f64,
    pub elong: f64,
    pub trash: f64,
    pub moist: f64,
}

impl WeightedMetrics {
    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Mic => &mut self.mic,
            Metric::Strength => &mut self.strength,
            Metric::Uhml => &mut self.uhml,
            Metric::Rd => &mut self.rd,
            Metric::PlusB => &mut self.plus_b,
            Metric::Sf => &mut self.sf,
            Metric::Ui => &mut self.ui,
            Metric::Elong => &mut self.elong,
            Metric::Trash => &mut self.trash,
            Metric::Moist => &mut self.moist,
        };
        *slot = value;
    }
}

// ==========================================
// BlendComposition - 混配构成
// ==========================================

/// 单个棉花名称的贡献
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendComponent {
    /// 棉花名称
    pub cotton_name: String,

    /// 贡献值 (Σ 包数 × 品种权重)
    pub contribution: f64,

    /// 占比 (%),日报为整数,周/月报保留一位小数
    pub percent: f64,
}

/// 混配构成
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendComposition {
    /// 棉花名称组合 (日报: 名称以 "+" 连接; 周/月报: 规范化签名)
    pub mixing: String,

    /// 占比文本 (日报: "60+40"; 周/月报: "DCH 60.0%, MCU 40.0%")
    pub blend_percent: String,

    /// 构成明细 (与 blend_percent 同序)
    pub components: Vec<BlendComponent>,
}

impl BlendComposition {
    /// 明细占比合计
    pub fn percent_total(&self) -> f64 {
        self.components.iter().map(|c| c.percent).sum()
    }
}

// ==========================================
// SummaryEntry - 汇总条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// 周期标签 (日: YYYY-MM-DD, 周: YYYY-MM-W<n>, 月: YYYY-MM)
    pub period_label: Option<String>,

    /// 周期排序键
    pub period_sort_key: Option<String>,

    pub unit: String,
    pub line: String,
    pub blend_code: Option<String>,

    /// 组内最早有效发料日期 (YYYY-MM-DD)
    pub issue_date: Option<String>,

    /// 混配号范围 ("12-15" 或 "12")
    pub mixing_range: String,

    /// 总包数
    pub total_bales: f64,

    /// 批次数 (去重)
    pub no_of_lots: usize,

    /// 包数加权指标
    pub weighted_metrics: WeightedMetrics,

    /// 最低马值 (两位小数文本)
    pub min_mic: Option<String>,

    /// 最低马值包数占比 (%)
    pub min_mic_percent: f64,

    /// 混配构成
    pub blend_composition: BlendComposition,

    /// 包数变化率 (%)
    pub bale_change_over_percent: Option<f64>,

    /// 批次变化率 (%)
    pub lot_change_over_percent: Option<f64>,

    /// 前序条目的混配号范围
    pub previous_mixing_ref: Option<String>,
}
