// ==========================================
// 棉花混配质量报表系统 - 领域类型定义
// ==========================================
// 职责: 报表粒度等基础枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 报表粒度 (Report Type)
// ==========================================
// 序列化格式: lowercase (与请求参数一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Daily, // 按混配号逐条汇总
    Weekly,  // 按周汇总
    Monthly, // 按月汇总
}

impl ReportType {
    /// 转换为请求/配置中使用的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Daily => "daily",
            ReportType::Weekly => "weekly",
            ReportType::Monthly => "monthly",
        }
    }

    /// 是否为周期汇总 (weekly / monthly)
    pub fn is_periodic(&self) -> bool {
        !matches!(self, ReportType::Daily)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 非法报表粒度
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("未知的报表粒度: {0}")]
pub struct UnknownReportType(pub String);

impl FromStr for ReportType {
    type Err = UnknownReportType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportType::Daily),
            "weekly" => Ok(ReportType::Weekly),
            "monthly" => Ok(ReportType::Monthly),
            _ => Err(UnknownReportType(s.to_string())),
        }
    }
}
