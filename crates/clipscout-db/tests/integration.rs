//! Offline unit tests for clipscout-db pool configuration and row types.
//! These tests do not require a live database connection.

use clipscout_core::AppConfig;
use clipscout_db::{PoolConfig, SessionRow, VideoRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        ..AppConfig::for_tests()
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`SessionRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn session_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = SessionRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        user_id: "user-1".to_string(),
        topic: "latte art".to_string(),
        status: "active".to_string(),
        current_step: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.user_id, "user-1");
    assert_eq!(row.topic, "latte art");
    assert_eq!(row.status, "active");
    assert!(row.current_step.is_none());
}

/// Compile-time smoke test: confirm that [`VideoRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn video_row_has_expected_fields() {
    use chrono::Utc;

    let row = VideoRow {
        id: 42_i64,
        session_id: 7_i64,
        source_id: "abc123".to_string(),
        platform: "youtube".to_string(),
        title: "Latte art basics".to_string(),
        description: String::new(),
        url: "https://example.com/v/abc123".to_string(),
        thumbnail_url: String::new(),
        views: 10_000_i64,
        likes: 900_i64,
        comments: 40_i64,
        duration_secs: 30_i32,
        published_at: None,
        engagement_score: 9.8_f64,
        is_viral: false,
        analysis: None,
        analysis_origin: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 42);
    assert_eq!(row.session_id, 7);
    assert_eq!(row.platform, "youtube");
    assert_eq!(row.views, 10_000);
    assert!(row.analysis.is_none());
    assert!(row.analysis_origin.is_none());
}
