// ==========================================
// 棉花混配质量报表系统 - API 层
// ==========================================
// 职责: 请求校验与报表生成入口,供 CLI / 嵌入方调用
// ==========================================

pub mod dto;
pub mod error;
pub mod report_api;
pub mod validator;

// 重导出核心类型
pub use dto::{parse_filter_values, RawReportRequest, ReportResponse};
pub use error::{ApiError, ApiResult};
pub use report_api::ReportApi;
pub use validator::ReportValidator;
