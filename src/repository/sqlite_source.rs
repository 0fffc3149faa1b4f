// ==========================================
// 棉花混配质量报表系统 - SQLite 数据源
// ==========================================
// 职责: 从 SQLite 读模型读取四类报表输入
// 红线: Repository 不含业务逻辑 (过滤仅做等值预筛,规则由引擎执行)
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::query::ReportQuery;
use crate::domain::records::{
    parse_lenient_f64, IssueRecord, LotMetrics, LotResult, MixingRow, VarietyWeight,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_source::RecordSource;
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteRecordSource - SQLite 数据源
// ==========================================
pub struct SqliteRecordSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordSource {
    /// 创建新的 SqliteRecordSource 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建数据源实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询发料记录
    ///
    /// 说明: 不按 unit/line/blend_code 预筛,保证按混配号的回退关联可用
    pub fn query_issue_records(&self) -> RepositoryResult<Vec<IssueRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT unit, line, blend_code, mixing_no, issue_date
            FROM issue_record
            ORDER BY rowid
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(IssueRecord {
                    unit: code_at(row, 0)?,
                    line: code_at(row, 1)?,
                    blend_code: opt_code_at(row, 2)?,
                    mixing_no: code_at(row, 3)?,
                    issue_date: opt_code_at(row, 4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// 查询混配明细 (按 unit / line / blend_code 等值预筛,忽略大小写)
    pub fn query_mixing_rows(&self, query: &ReportQuery) -> RepositoryResult<Vec<MixingRow>> {
        let mut sql = String::from(
            "SELECT mixing_no, unit, line, blend_code, lot_no, issue_bale FROM mixing_row WHERE 1 = 1",
        );
        let mut params: Vec<String> = Vec::new();
        push_in_filter(&mut sql, &mut params, "unit", &query.units);
        push_in_filter(&mut sql, &mut params, "line", &query.lines);
        push_in_filter(&mut sql, &mut params, "blend_code", &query.blend_codes);
        sql.push_str(" ORDER BY rowid");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(MixingRow {
                    mixing_no: code_at(row, 0)?,
                    unit: code_at(row, 1)?,
                    line: code_at(row, 2)?,
                    blend_code: opt_code_at(row, 3)?,
                    lot_no: code_at(row, 4)?,
                    issue_bale: number_at(row, 5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// 查询批次检验结果
    pub fn query_lot_results(&self) -> RepositoryResult<Vec<LotResult>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                lot_no, variety,
                uhml, str, mic, rd, plus_b, sf, ui, elong, trash, moist,
                min_mic, min_mic_bale_per_lot, no_of_bale
            FROM lot_result
            ORDER BY rowid
            "#,
        )?;

        let lots = stmt
            .query_map([], |row| {
                Ok(LotResult {
                    lot_no: code_at(row, 0)?,
                    variety: opt_code_at(row, 1)?,
                    metrics: LotMetrics {
                        uhml: number_at(row, 2)?,
                        strength: number_at(row, 3)?,
                        mic: number_at(row, 4)?,
                        rd: number_at(row, 5)?,
                        plus_b: number_at(row, 6)?,
                        sf: number_at(row, 7)?,
                        ui: number_at(row, 8)?,
                        elong: number_at(row, 9)?,
                        trash: number_at(row, 10)?,
                        moist: number_at(row, 11)?,
                        min_mic: number_at(row, 12)?,
                        min_mic_bale_per_lot: number_at(row, 13)?,
                        no_of_bale: number_at(row, 14)?,
                    },
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lots)
    }

    /// 查询品种映射
    pub fn query_variety_weights(&self) -> RepositoryResult<Vec<VarietyWeight>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT variety, cotton_name, weight FROM variety_weight ORDER BY rowid",
        )?;

        let weights = stmt
            .query_map([], |row| {
                Ok(VarietyWeight {
                    variety: code_at(row, 0)?,
                    cotton_name: code_at(row, 1)?,
                    weight: number_at(row, 2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(weights)
    }
}

#[async_trait]
impl RecordSource for SqliteRecordSource {
    async fn fetch_issue_records(&self, _query: &ReportQuery) -> RepositoryResult<Vec<IssueRecord>> {
        self.query_issue_records()
    }

    async fn fetch_mixing_rows(&self, query: &ReportQuery) -> RepositoryResult<Vec<MixingRow>> {
        self.query_mixing_rows(query)
    }

    async fn fetch_lot_results(&self, _query: &ReportQuery) -> RepositoryResult<Vec<LotResult>> {
        self.query_lot_results()
    }

    async fn fetch_variety_weights(&self) -> RepositoryResult<Vec<VarietyWeight>> {
        self.query_variety_weights()
    }
}

// ==========================================
// 行读取辅助函数
// ==========================================

/// 追加 "UPPER(TRIM(col)) IN (?, ...)" 条件
fn push_in_filter(sql: &mut String, params: &mut Vec<String>, column: &str, values: &[String]) {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return;
    }

    let placeholders = vec!["?"; values.len()].join(", ");
    sql.push_str(&format!(" AND UPPER(TRIM(COALESCE({}, ''))) IN ({})", column, placeholders));
    params.extend(values);
}

/// 读取代码列 (文本/数字 → 去空白文本, NULL → 空串)
fn code_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get::<_, Value>(idx)? {
        Value::Text(s) => s.trim().to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Null | Value::Blob(_) => String::new(),
    })
}

fn opt_code_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    let code = code_at(row, idx)?;
    Ok(if code.is_empty() { None } else { Some(code) })
}

/// 读取数值列 (非数值文本 → None)
fn number_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get::<_, Value>(idx)? {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        Value::Text(s) => parse_lenient_f64(&s),
        Value::Null | Value::Blob(_) => None,
    })
}
