// ==========================================
// 棉花混配质量报表系统 - 引擎层
// ==========================================
// 职责: 实现聚合规则,不做 I/O,不拼 SQL
// 流水线: 明细关联发料 → 分组 → 加权聚合 + 构成解析
//         → 连续性跟踪 → 排序输出
// 红线: 所有引擎均为纯计算,无跨请求状态
// ==========================================

pub mod blend;
pub mod blend_version;
pub mod continuity;
pub mod lookup;
pub mod period;
pub mod report;
pub mod weighted;

// 重导出核心引擎
pub use blend::{normalize_signature, signature_matches, BlendResolver};
pub use blend_version::{BlendVersion, BlendVersionParser, NO_VERSION_KEY};
pub use continuity::{ChangeOver, ChangeRates, ContinuitySnapshot, ContinuityTracker, SignatureKey};
pub use lookup::{LotLookup, VarietyLookup};
pub use period::{PeriodBucket, PeriodBucketer};
pub use report::{MixingReportEngine, ReportInputs};
pub use weighted::{GroupAggregate, GroupRow, WeightedAggregator};

/// 按小数位四舍五入
pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
