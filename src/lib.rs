// ==========================================
// 棉花混配质量报表系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 混配质量报表聚合 (日 / 周 / 月)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与报表类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 聚合规则
pub mod engine;

// 配置层 - 报表默认参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 报表接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BlendComposition, IssueRecord, LotResult, MixingRow, ReportQuery, ReportType,
    SummaryEntry, VarietyWeight,
};

// 引擎
pub use engine::{MixingReportEngine, ReportInputs};

// API
pub use api::{ApiError, ApiResult, RawReportRequest, ReportApi, ReportResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "棉花混配质量报表系统";
