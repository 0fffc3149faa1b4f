// ==========================================
// 棉花混配质量报表系统 - 命令行入口
// ==========================================
// 用法:
//   cotton-mixing-report report_type=weekly from_date=2024-01-01 unit='["U1","U2"]'
//   cotton-mixing-report snapshot=./inputs.json report_type=daily
//   cotton-mixing-report db=./cotton_mixing_report.db mixing=DCH+MCU
// 输出: 报表 JSON 写入 stdout,日志写入 stderr
// ==========================================

use std::sync::Arc;

use anyhow::{bail, Context};
use cotton_mixing_report::api::{RawReportRequest, ReportApi};
use cotton_mixing_report::config::{get_default_db_path, ConfigManager, ReportConfig};
use cotton_mixing_report::db::{ensure_report_schema, open_sqlite_connection};
use cotton_mixing_report::repository::MemoryRecordSource;
use cotton_mixing_report::{logging, APP_NAME, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let mut request = RawReportRequest::default();
    let mut db_path: Option<String> = None;
    let mut snapshot_path: Option<String> = None;

    for arg in std::env::args().skip(1) {
        let (key, value) = match arg.split_once('=') {
            Some(pair) => pair,
            None => bail!("参数格式错误 (应为 key=value): {}", arg),
        };
        match key.trim() {
            "db" => db_path = Some(value.to_string()),
            "snapshot" => snapshot_path = Some(value.to_string()),
            other => {
                if !request.set_field(other, value) {
                    bail!("未知参数: {}", other);
                }
            }
        }
    }

    let api = match snapshot_path {
        Some(path) => {
            tracing::info!("使用 JSON 快照: {}", path);
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("读取快照失败: {}", path))?;
            let source = MemoryRecordSource::from_json(&json)?;
            ReportApi::new(Arc::new(source), ReportConfig::default())
        }
        None => {
            let db_path = db_path.unwrap_or_else(get_default_db_path);
            tracing::info!("使用数据库: {}", db_path);

            {
                let conn = open_sqlite_connection(&db_path)
                    .with_context(|| format!("无法打开数据库: {}", db_path))?;
                ensure_report_schema(&conn).context("初始化报表表结构失败")?;
            }

            let config = ConfigManager::new(&db_path)
                .and_then(|manager| manager.load_report_config())
                .map_err(|e| anyhow::anyhow!("加载报表配置失败: {}", e))?;

            ReportApi::open(&db_path, config)?
        }
    };

    let response = api.generate_report(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
