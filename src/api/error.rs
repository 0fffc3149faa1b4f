// ==========================================
// 棉花混配质量报表系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可读的错误消息
// 约束: 校验错误在任何数据读取之前返回
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求校验错误
    // ==========================================
    #[error("无效的报表类型: {0} (可选: daily / weekly / monthly)")]
    InvalidReportType(String),

    #[error("无效的日期: {field}={value} (格式: YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("无效的日期区间: {0}")]
    InvalidDateRange(String),

    #[error("无效的数值参数: {field}={value}")]
    InvalidNumericBound { field: String, value: String },

    #[error("无效的区间: {0}")]
    InvalidRange(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据源读取失败: {0}")]
    UpstreamFetch(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为请求校验错误 (调用方可修正后重试)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidReportType(_)
                | ApiError::InvalidDate { .. }
                | ApiError::InvalidDateRange(_)
                | ApiError::InvalidNumericBound { .. }
                | ApiError::InvalidRange(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg) => {
                ApiError::DatabaseError(format!("数据库连接失败: {}", msg))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::MissingTable(table) => {
                ApiError::UpstreamFetch(format!("数据表缺失: {}", table))
            }
            RepositoryError::SourceUnavailable(msg) => ApiError::UpstreamFetch(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
