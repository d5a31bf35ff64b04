//! Tests for configuration overrides

use std::time::Duration;

use purok_analytics::config::{
    ENV_CACHE_ENABLED, ENV_CACHE_MAX_ENTRIES, ENV_REGISTRATION_TREND_MONTHS,
};
use purok_analytics::{AnalyticsConfig, AnalyticsError, CallerContext, ReportService, Role};

use crate::utils::{reference_instant, three_zone_registry};

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| (*value).to_string())
    }
}

#[test]
fn test_registration_window_override_reaches_service() {
    let config = AnalyticsConfig::from_lookup(lookup(&[(ENV_REGISTRATION_TREND_MONTHS, "9")])).unwrap();
    let service = ReportService::new(three_zone_registry(), config);
    let admin = CallerContext::new(Role::Admin, None);

    let series = service.registration_trend(&admin, reference_instant()).unwrap();
    assert_eq!(series.points.len(), 9);
    assert_eq!(series.points[0].month_label, "2023-10");
}

#[test]
fn test_disabled_cache_still_serves_reports() {
    let config = AnalyticsConfig::from_lookup(lookup(&[(ENV_CACHE_ENABLED, "false")])).unwrap();
    assert!(!config.cache.enabled);

    let service = ReportService::new(three_zone_registry(), config);
    let admin = CallerContext::new(Role::Admin, None);
    assert_eq!(service.summary(&admin, reference_instant()).unwrap().total_residents, 5);
    assert_eq!(service.invalidate_all(), 0);
}

#[test]
fn test_malformed_flag_rejected() {
    let err = AnalyticsConfig::from_lookup(lookup(&[(ENV_CACHE_ENABLED, "maybe")])).unwrap_err();
    assert!(matches!(err, AnalyticsError::Config(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_negative_count_rejected() {
    let err = AnalyticsConfig::from_lookup(lookup(&[(ENV_CACHE_MAX_ENTRIES, "-1")])).unwrap_err();
    assert!(matches!(err, AnalyticsError::Config(_)));
}

#[test]
fn test_defaults_without_overrides() {
    let config = AnalyticsConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config.cache.ttl, Duration::from_secs(300));
    assert_eq!(config.vulnerable_trend_months, 6);
    assert_eq!(config.registration_trend_months, 12);
}
