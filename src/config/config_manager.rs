// ==========================================
// 棉花混配质量报表系统 - 配置管理器
// ==========================================
// 职责: 报表默认参数加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::ReportType;
use crate::engine::blend::DEFAULT_TOP_COMPONENTS;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ReportConfig - 报表默认参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 请求未指定 report_type 时使用
    pub default_report_type: ReportType,
    /// 周/月报表拼配构成展示的前 N 个组分
    pub blend_top_n: usize,
    /// 日期区间最大跨度 (天),None 表示不限制
    pub max_span_days: Option<i64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_report_type: ReportType::Daily,
            blend_top_n: DEFAULT_TOP_COMPONENTS,
            max_span_days: None,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值 (存在则覆盖)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 加载报表默认参数
    ///
    /// 说明：配置缺失或格式错误时回退到默认值,并记录 warn 日志
    pub fn load_report_config(&self) -> Result<ReportConfig, Box<dyn Error>> {
        let defaults = ReportConfig::default();

        let default_report_type = match self.get_global_config_value(config_keys::DEFAULT_REPORT_TYPE)? {
            Some(raw) => raw.parse::<ReportType>().unwrap_or_else(|_| {
                tracing::warn!(
                    config_key = config_keys::DEFAULT_REPORT_TYPE,
                    raw_value = %raw,
                    "报表类型配置无法识别，使用默认值"
                );
                defaults.default_report_type
            }),
            None => defaults.default_report_type,
        };

        let blend_top_n = match self.get_global_config_value(config_keys::BLEND_TOP_N)? {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        config_key = config_keys::BLEND_TOP_N,
                        raw_value = %raw,
                        "拼配组分数量配置无效，使用默认值"
                    );
                    defaults.blend_top_n
                }
            },
            None => defaults.blend_top_n,
        };

        let max_span_days = match self.get_global_config_value(config_keys::MAX_SPAN_DAYS)? {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    tracing::warn!(
                        config_key = config_keys::MAX_SPAN_DAYS,
                        raw_value = %raw,
                        "日期跨度配置无效，不限制跨度"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(ReportConfig {
            default_report_type,
            blend_top_n,
            max_span_days,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DEFAULT_REPORT_TYPE: &str = "report.default_type";
    pub const BLEND_TOP_N: &str = "report.blend_top_n";
    pub const MAX_SPAN_DAYS: &str = "report.max_span_days";
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 数据库路径解析顺序:
/// 1. 环境变量 COTTON_MIXING_REPORT_DB_PATH
/// 2. 用户数据目录 cotton-mixing-report/cotton_mixing_report.db
/// 3. 当前目录 ./cotton_mixing_report.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("COTTON_MIXING_REPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./cotton_mixing_report.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("cotton-mixing-report");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("cotton_mixing_report.db");
        }
    }

    path.to_string_lossy().to_string()
}
