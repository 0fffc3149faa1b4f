// ==========================================
// 棉花混配质量报表系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout,减少并发读写时的偶发 busy 错误
// - 提供报表读模型的建表脚本 (幂等)
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 报表读模型建表脚本
///
/// 说明：数值列声明为 REAL,但允许写入非数值文本 (由读取侧宽松解析)
pub const REPORT_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS issue_record (
    unit        TEXT NOT NULL,
    line        TEXT NOT NULL,
    blend_code  TEXT,
    mixing_no   TEXT NOT NULL,
    issue_date  TEXT
);
CREATE INDEX IF NOT EXISTS idx_issue_record_mixing ON issue_record (mixing_no);

CREATE TABLE IF NOT EXISTS mixing_row (
    mixing_no   TEXT NOT NULL,
    unit        TEXT NOT NULL,
    line        TEXT NOT NULL,
    blend_code  TEXT,
    lot_no      TEXT NOT NULL,
    issue_bale  REAL
);
CREATE INDEX IF NOT EXISTS idx_mixing_row_mixing ON mixing_row (mixing_no);

CREATE TABLE IF NOT EXISTS lot_result (
    lot_no                TEXT NOT NULL,
    variety               TEXT,
    uhml                  REAL,
    str                   REAL,
    mic                   REAL,
    rd                    REAL,
    plus_b                REAL,
    sf                    REAL,
    ui                    REAL,
    elong                 REAL,
    trash                 REAL,
    moist                 REAL,
    min_mic               REAL,
    min_mic_bale_per_lot  REAL,
    no_of_bale            REAL
);
CREATE INDEX IF NOT EXISTS idx_lot_result_lot ON lot_result (lot_no);

CREATE TABLE IF NOT EXISTS variety_weight (
    variety      TEXT NOT NULL,
    cotton_name  TEXT NOT NULL,
    weight       REAL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id  TEXT NOT NULL DEFAULT 'global',
    key       TEXT NOT NULL,
    value     TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化报表读模型 (已存在的表保持不变)
pub fn ensure_report_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(REPORT_SCHEMA_SQL)
}
