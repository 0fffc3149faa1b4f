// ==========================================
// ReportApi 集成测试
// ==========================================
// 测试范围:
// 1. SQLite 数据源 → 日报 / 周报 / 月报
// 2. 请求校验 (在任何数据读取之前)
// 3. 数据源失败整体中止
// 4. 配置默认值 (config_kv)
// ==========================================

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cotton_mixing_report::api::{ApiError, RawReportRequest, ReportApi};
use cotton_mixing_report::config::{config_keys, ConfigManager, ReportConfig};
use cotton_mixing_report::domain::query::ReportQuery;
use cotton_mixing_report::domain::records::{IssueRecord, LotResult, MixingRow, VarietyWeight};
use cotton_mixing_report::domain::types::ReportType;
use cotton_mixing_report::repository::{
    MemoryRecordSource, RecordSource, RepositoryError, RepositoryResult,
};
use helpers::test_data_builder::*;
use test_helpers::*;

fn request(pairs: &[(&str, &str)]) -> RawReportRequest {
    let mut request = RawReportRequest::default();
    for (key, value) in pairs {
        assert!(request.set_field(key, value), "未知字段: {}", key);
    }
    request
}

fn seeded_api() -> (tempfile::NamedTempFile, ReportApi) {
    let (temp_file, db_path) = create_test_db().expect("无法创建测试数据库");
    seed_inputs(&db_path, &two_mixing_scenario()).expect("写入测试数据失败");
    let api = ReportApi::open(&db_path, ReportConfig::default()).expect("无法创建ReportApi");
    (temp_file, api)
}

// ==========================================
// 测试数据源
// ==========================================

/// 记录调用次数,可指定批次检验结果读取失败
struct ProbeSource {
    inner: MemoryRecordSource,
    calls: AtomicUsize,
    fail_lots: bool,
}

impl ProbeSource {
    fn new(fail_lots: bool) -> Self {
        Self {
            inner: MemoryRecordSource::new(two_mixing_scenario()),
            calls: AtomicUsize::new(0),
            fail_lots,
        }
    }
}

#[async_trait]
impl RecordSource for ProbeSource {
    async fn fetch_issue_records(&self, query: &ReportQuery) -> RepositoryResult<Vec<IssueRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_issue_records(query).await
    }

    async fn fetch_mixing_rows(&self, query: &ReportQuery) -> RepositoryResult<Vec<MixingRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_mixing_rows(query).await
    }

    async fn fetch_lot_results(&self, query: &ReportQuery) -> RepositoryResult<Vec<LotResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lots {
            return Err(RepositoryError::SourceUnavailable("检验系统超时".to_string()));
        }
        self.inner.fetch_lot_results(query).await
    }

    async fn fetch_variety_weights(&self) -> RepositoryResult<Vec<VarietyWeight>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_variety_weights().await
    }
}

// ==========================================
// 日报
// ==========================================

#[tokio::test]
async fn test_daily_report_from_sqlite() {
    let (_temp_file, api) = seeded_api();

    let response = api.generate_report(RawReportRequest::default()).await.unwrap();

    assert_eq!(response.report_type, ReportType::Daily);
    assert_eq!(response.entry_count, 2);
    assert!(!response.request_id.is_empty());

    // 按发料日期降序
    let latest = &response.entries[0];
    let earliest = &response.entries[1];
    assert_eq!(latest.mixing_range, "11");
    assert_eq!(earliest.mixing_range, "10");

    assert_eq!(earliest.total_bales, 150.0);
    assert_eq!(earliest.no_of_lots, 2);
    assert_eq!(earliest.weighted_metrics.mic, 4.33);
    assert_eq!(earliest.min_mic.as_deref(), Some("3.60"));
    assert_eq!(earliest.min_mic_percent, 13.33);
    assert_eq!(earliest.blend_composition.mixing, "DCH+MCU");
    assert_eq!(earliest.blend_composition.blend_percent, "67+33");
    assert_eq!(earliest.bale_change_over_percent, None);
    assert_eq!(earliest.previous_mixing_ref, None);

    assert_eq!(latest.weighted_metrics.mic, 3.67);
    assert_eq!(latest.bale_change_over_percent, Some(66.67));
    assert_eq!(latest.lot_change_over_percent, Some(100.0));
    assert_eq!(latest.previous_mixing_ref.as_deref(), Some("10"));
}

#[tokio::test]
async fn test_daily_report_filters() {
    let (_temp_file, api) = seeded_api();

    let response = api
        .generate_report(request(&[("mixing", r#"["11"]"#)]))
        .await
        .unwrap();
    assert_eq!(response.entry_count, 1);
    assert_eq!(response.entries[0].mixing_range, "11");

    let response = api
        .generate_report(request(&[("from_date", "2024-01-03"), ("to_date", "2024-01-31")]))
        .await
        .unwrap();
    assert_eq!(response.entry_count, 1);
    assert_eq!(response.entries[0].issue_date.as_deref(), Some("2024-01-05"));

    let response = api
        .generate_report(request(&[("unit", "u2")]))
        .await
        .unwrap();
    assert_eq!(response.entry_count, 0);

    let response = api
        .generate_report(request(&[("mixing_no_from", "11"), ("mixing_no_to", "20")]))
        .await
        .unwrap();
    assert_eq!(response.entry_count, 1);
}

// ==========================================
// 周报 / 月报
// ==========================================

#[tokio::test]
async fn test_weekly_report_period_labels() {
    let (_temp_file, api) = seeded_api();

    let response = api
        .generate_report(request(&[("report_type", "weekly")]))
        .await
        .unwrap();

    assert_eq!(response.report_type, ReportType::Weekly);
    assert_eq!(response.entry_count, 2);
    for entry in &response.entries {
        assert_eq!(entry.period_label.as_deref(), Some("2024-01-W1"));
        assert_eq!(entry.blend_composition.mixing, "DCH+MCU");
    }
}

#[tokio::test]
async fn test_monthly_report_signature_filter() {
    let (_temp_file, api) = seeded_api();

    let response = api
        .generate_report(request(&[("report_type", "monthly"), ("mixing", "mcu + dch")]))
        .await
        .unwrap();
    assert_eq!(response.entry_count, 2);
    assert!(response
        .entries
        .iter()
        .all(|e| e.period_label.as_deref() == Some("2024-01")));

    let response = api
        .generate_report(request(&[("report_type", "monthly"), ("mixing", "DCH")]))
        .await
        .unwrap();
    assert_eq!(response.entry_count, 0);
}

// ==========================================
// 校验与失败
// ==========================================

#[tokio::test]
async fn test_validation_fails_before_fetch() {
    let source = Arc::new(ProbeSource::new(false));
    let api = ReportApi::new(source.clone(), ReportConfig::default());

    let result = api.generate_report(request(&[("report_type", "hourly")])).await;
    assert!(matches!(result, Err(ApiError::InvalidReportType(_))));

    let result = api
        .generate_report(request(&[("from_date", "2024-02-01"), ("to_date", "2024-01-01")]))
        .await;
    assert!(matches!(result, Err(ApiError::InvalidDateRange(_))));

    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_failure_aborts_request() {
    let source = Arc::new(ProbeSource::new(true));
    let api = ReportApi::new(source, ReportConfig::default());

    let result = api.generate_report(RawReportRequest::default()).await;
    match result {
        Err(ApiError::UpstreamFetch(msg)) => assert!(msg.contains("lot_result")),
        other => panic!("Expected UpstreamFetch, got {:?}", other.map(|r| r.entry_count)),
    }
}

#[tokio::test]
async fn test_memory_source_matches_sqlite_source() {
    let (_temp_file, sqlite_api) = seeded_api();
    let memory_api = ReportApi::new(
        Arc::new(MemoryRecordSource::new(two_mixing_scenario())),
        ReportConfig::default(),
    );

    let from_sqlite = sqlite_api.generate_report(RawReportRequest::default()).await.unwrap();
    let from_memory = memory_api.generate_report(RawReportRequest::default()).await.unwrap();
    assert_eq!(from_sqlite.entries, from_memory.entries);
}

// ==========================================
// 配置
// ==========================================

#[tokio::test]
async fn test_config_defaults_from_database() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_inputs(&db_path, &two_mixing_scenario()).unwrap();
    set_config(&db_path, config_keys::DEFAULT_REPORT_TYPE, "monthly").unwrap();
    set_config(&db_path, config_keys::MAX_SPAN_DAYS, "10").unwrap();

    let config = ConfigManager::new(&db_path)
        .unwrap()
        .load_report_config()
        .unwrap();
    assert_eq!(config.default_report_type, ReportType::Monthly);

    let api = ReportApi::open(&db_path, config).unwrap();
    let response = api.generate_report(RawReportRequest::default()).await.unwrap();
    assert_eq!(response.report_type, ReportType::Monthly);

    let result = api
        .generate_report(request(&[("from_date", "2024-01-01"), ("to_date", "2024-01-31")]))
        .await;
    assert!(matches!(result, Err(ApiError::InvalidDateRange(_))));
}
