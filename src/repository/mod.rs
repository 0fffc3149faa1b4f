// ==========================================
// 棉花混配质量报表系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供报表输入的数据访问接口,屏蔽存储细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod memory_source;
pub mod record_source;
pub mod sqlite_source;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use memory_source::MemoryRecordSource;
pub use record_source::RecordSource;
pub use sqlite_source::SqliteRecordSource;
