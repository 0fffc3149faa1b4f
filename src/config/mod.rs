// ==========================================
// 棉花混配质量报表系统 - 配置层
// ==========================================
// 职责: 报表默认参数管理
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, get_default_db_path, ConfigManager, ReportConfig};
