//! Tests for the report service facade

use purok_analytics::{
    AnalyticsConfig, AnalyticsError, CallerContext, InMemoryRegistry, ReportResponse,
    ReportService, ReportStatus, Role, Scope, SummaryReport, TrendFamily, TrendSeries,
};

use crate::utils::{FailingRegistry, reference_instant, scenario_registry, three_zone_registry};

#[test]
fn test_secretary_sees_everything() {
    let service = ReportService::new(three_zone_registry(), AnalyticsConfig::default());
    let secretary = CallerContext::new(Role::Secretary, Some(2));

    let report = service.summary(&secretary, reference_instant()).unwrap();
    assert_eq!(report.scope, Scope::Unrestricted);
    assert_eq!(report.total_residents, 5);
}

#[test]
fn test_leader_is_confined_to_assigned_zone() {
    let service = ReportService::new(three_zone_registry(), AnalyticsConfig::default());
    let caller = CallerContext::parse("purok-leader", Some(2)).unwrap();

    let report = service.summary(&caller, reference_instant()).unwrap();
    assert_eq!(report.scope, Scope::RestrictedToZone(2));
    assert_eq!(report.total_households, 1);

    let trend = service.vulnerable_trend(&caller, reference_instant()).unwrap();
    assert_eq!(trend.scope, Scope::RestrictedToZone(2));
    assert_eq!(trend.points.len(), 6);
    assert!(trend.is_all_zero());
}

#[test]
fn test_unknown_role_is_rejected() {
    let err = CallerContext::parse("guest", None).unwrap_err();
    assert!(matches!(err, AnalyticsError::UnknownRole(role) if role == "guest"));
}

#[test]
fn test_leader_without_zone_is_a_configuration_error() {
    let service = ReportService::new(scenario_registry(), AnalyticsConfig::default());
    let caller = CallerContext::new(Role::PurokLeader, None);

    let response = ReportResponse::from_result(service.summary(&caller, reference_instant()));
    assert_eq!(response.status, ReportStatus::Failed);
    assert!(!response.retryable);
    assert!(response.message.unwrap().contains("purok_leader"));
}

#[test]
fn test_scenario_response_is_ok() {
    let service = ReportService::new(scenario_registry(), AnalyticsConfig::default());
    let admin = CallerContext::new(Role::Admin, None);

    let response = ReportResponse::from_result(service.summary(&admin, reference_instant()));
    assert_eq!(response.status, ReportStatus::Ok);
    let report = response.report.unwrap();
    assert_eq!(report.vulnerable_counts.pregnant_proxy, 1);
}

#[test]
fn test_empty_registry_is_no_data_not_failure() {
    let service = ReportService::new(InMemoryRegistry::new(), AnalyticsConfig::default());
    let admin = CallerContext::new(Role::Admin, None);

    let summary = ReportResponse::from_result(service.summary(&admin, reference_instant()));
    assert_eq!(summary.status, ReportStatus::NoData);

    let trend = ReportResponse::from_result(service.registration_trend(&admin, reference_instant()));
    assert_eq!(trend.status, ReportStatus::NoData);
    assert_eq!(trend.report.unwrap().points.len(), 12);
}

#[test]
fn test_registry_outage_is_retryable_failure() {
    let service = ReportService::new(FailingRegistry, AnalyticsConfig::default());
    let admin = CallerContext::new(Role::Admin, None);

    let response: ReportResponse<SummaryReport> =
        ReportResponse::from_result(service.summary(&admin, reference_instant()));
    assert_eq!(response.status, ReportStatus::Failed);
    assert!(response.retryable);
    assert!(response.report.is_none());
}

#[test]
fn test_zero_month_trend_rejected() {
    let service = ReportService::new(scenario_registry(), AnalyticsConfig::default());
    let admin = CallerContext::new(Role::Admin, None);

    let response: ReportResponse<TrendSeries> = ReportResponse::from_result(service.trend(
        &admin,
        TrendFamily::Vulnerable,
        Some(0),
        reference_instant(),
    ));
    assert_eq!(response.status, ReportStatus::Failed);
    assert!(!response.retryable);
}

#[test]
fn test_response_json_shape() {
    let service = ReportService::new(scenario_registry(), AnalyticsConfig::default());
    let leader = CallerContext::new(Role::PurokLeader, Some(1));

    let response = ReportResponse::from_result(service.summary(&leader, reference_instant()));
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["retryable"], false);
    assert!(json.get("message").is_none());
    assert_eq!(json["report"]["scope"]["kind"], "restricted_to_zone");
    assert_eq!(json["report"]["scope"]["purok_id"], 1);
    assert_eq!(json["report"]["vulnerable_counts"]["seniors"], 1);
    assert_eq!(json["report"]["per_zone_breakdown"][0]["households"], 2);
}
