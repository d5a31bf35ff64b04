//! Tests for caching through the report service

use std::sync::Arc;
use std::time::Duration;

use purok_analytics::{
    AnalyticsConfig, CacheConfig, CallerContext, InMemoryCacheBackend, ReportCache, ReportKey,
    ReportKind, ReportService, Role, Scope, TrendFamily,
};

use crate::utils::{
    CountingRegistry, FailingCacheBackend, at, reference_instant, three_zone_registry,
};

fn cached_service() -> ReportService<Arc<CountingRegistry>> {
    ReportService::with_cache(
        Arc::new(CountingRegistry::new(three_zone_registry())),
        ReportCache::new(InMemoryCacheBackend::new(Duration::from_secs(60), 64)),
        AnalyticsConfig::default(),
    )
}

#[test]
fn test_cached_and_uncached_results_agree() {
    let cached = cached_service();
    let uncached = ReportService::new(
        three_zone_registry(),
        AnalyticsConfig {
            cache: CacheConfig {
                enabled: false,
                ..CacheConfig::default()
            },
            ..AnalyticsConfig::default()
        },
    );
    let admin = CallerContext::new(Role::Admin, None);
    let leader = CallerContext::new(Role::PurokLeader, Some(1));

    for caller in [admin, leader] {
        let a = cached.summary(&caller, reference_instant()).unwrap();
        let b = cached.summary(&caller, reference_instant()).unwrap();
        let c = uncached.summary(&caller, reference_instant()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);

        let a = cached.vulnerable_trend(&caller, reference_instant()).unwrap();
        let c = uncached.vulnerable_trend(&caller, reference_instant()).unwrap();
        assert_eq!(a, c);
    }
}

#[test]
fn test_repeat_request_does_not_reread_registry() {
    let service = cached_service();
    let admin = CallerContext::new(Role::Admin, None);

    service.summary(&admin, reference_instant()).unwrap();
    let reads = service.registry().resident_reads();
    service.summary(&admin, reference_instant()).unwrap();
    assert_eq!(service.registry().resident_reads(), reads);
}

#[test]
fn test_zones_never_share_entries() {
    let service = cached_service();
    let leader_one = CallerContext::new(Role::PurokLeader, Some(1));
    let leader_two = CallerContext::new(Role::PurokLeader, Some(2));
    let admin = CallerContext::new(Role::Admin, None);

    let one = service.summary(&leader_one, reference_instant()).unwrap();
    let two = service.summary(&leader_two, reference_instant()).unwrap();
    let all = service.summary(&admin, reference_instant()).unwrap();

    assert_eq!(one.scope, Scope::RestrictedToZone(1));
    assert_eq!(one.total_residents, 3);
    assert_eq!(two.scope, Scope::RestrictedToZone(2));
    assert_eq!(two.total_residents, 2);
    assert_eq!(all.scope, Scope::Unrestricted);
    assert_eq!(all.total_residents, 5);
}

#[test]
fn test_different_days_are_different_entries() {
    let service = cached_service();
    let admin = CallerContext::new(Role::Admin, None);
    let today = reference_instant();
    let tomorrow = today + chrono::TimeDelta::days(1);

    let a = service.summary(&admin, today).unwrap();
    let b = service.summary(&admin, tomorrow).unwrap();
    assert_eq!(a.reference_instant, at(2024, 6, 15, 0, 0));
    assert_eq!(b.reference_instant, at(2024, 6, 16, 0, 0));
}

#[test]
fn test_later_request_same_day_matches_fresh_computation() {
    let cached = cached_service();
    let uncached = ReportService::with_cache(
        three_zone_registry(),
        ReportCache::disabled(),
        AnalyticsConfig::default(),
    );
    let admin = CallerContext::new(Role::Admin, None);
    let noon = at(2024, 6, 15, 12, 0);
    let evening = at(2024, 6, 15, 18, 0);

    cached.summary(&admin, noon).unwrap();
    cached.vulnerable_trend(&admin, noon).unwrap();
    let reads = cached.registry().resident_reads();

    let hit = cached.summary(&admin, evening).unwrap();
    assert_eq!(cached.registry().resident_reads(), reads);
    assert_eq!(hit, uncached.summary(&admin, evening).unwrap());

    let hit = cached.vulnerable_trend(&admin, evening).unwrap();
    assert_eq!(cached.registry().resident_reads(), reads);
    assert_eq!(hit, uncached.vulnerable_trend(&admin, evening).unwrap());
}

#[test]
fn test_cache_failure_is_absorbed() {
    let service = ReportService::with_cache(
        three_zone_registry(),
        ReportCache::new(FailingCacheBackend),
        AnalyticsConfig::default(),
    );
    let admin = CallerContext::new(Role::Admin, None);

    let report = service.summary(&admin, reference_instant()).unwrap();
    assert_eq!(report.total_residents, 5);
    assert_eq!(service.invalidate_all(), 0);
    assert_eq!(service.invalidate_zone(1), 0);
}

#[test]
fn test_zone_invalidation_drops_zone_and_unrestricted_entries() {
    let service = cached_service();
    let leader_one = CallerContext::new(Role::PurokLeader, Some(1));
    let leader_two = CallerContext::new(Role::PurokLeader, Some(2));
    let admin = CallerContext::new(Role::Admin, None);

    for caller in [leader_one, leader_two, admin] {
        service.summary(&caller, reference_instant()).unwrap();
    }

    assert_eq!(service.invalidate_zone(1), 2);

    let day = reference_instant().date();
    let zone_two_key = ReportKey::new(
        ReportKind::Summary,
        Role::PurokLeader,
        Scope::RestrictedToZone(2),
        day,
    );
    assert!(service.cache().invalidate(&zone_two_key));
}

#[test]
fn test_caller_invalidation_drops_all_report_kinds() {
    let service = cached_service();
    let leader = CallerContext::new(Role::PurokLeader, Some(1));
    let admin = CallerContext::new(Role::Admin, None);

    service.summary(&leader, reference_instant()).unwrap();
    service.vulnerable_trend(&leader, reference_instant()).unwrap();
    service.registration_trend(&leader, reference_instant()).unwrap();
    service.summary(&admin, reference_instant()).unwrap();

    assert_eq!(service.invalidate_caller(&leader).unwrap(), 3);
    assert_eq!(service.invalidate_all(), 1);
}

#[test]
fn test_explicit_key_invalidation_forces_recompute() {
    let service = cached_service();
    let leader = CallerContext::new(Role::PurokLeader, Some(2));
    service
        .trend(&leader, TrendFamily::Registrations, Some(3), reference_instant())
        .unwrap();

    let key = ReportKey::new(
        ReportKind::Trend {
            family: TrendFamily::Registrations,
            months: 3,
        },
        Role::PurokLeader,
        Scope::RestrictedToZone(2),
        reference_instant().date(),
    );
    assert!(service.cache().invalidate(&key));

    let reads = service.registry().resident_reads();
    service
        .trend(&leader, TrendFamily::Registrations, Some(3), reference_instant())
        .unwrap();
    assert!(service.registry().resident_reads() > reads);
}

#[test]
fn test_concurrent_callers_get_their_own_reports() {
    let service = cached_service();
    let callers = [
        CallerContext::new(Role::PurokLeader, Some(1)),
        CallerContext::new(Role::PurokLeader, Some(2)),
        CallerContext::new(Role::Admin, None),
    ];

    let fresh = ReportService::with_cache(
        three_zone_registry(),
        ReportCache::disabled(),
        AnalyticsConfig::default(),
    );
    let expected: Vec<_> = callers
        .iter()
        .map(|caller| {
            (
                fresh.summary(caller, reference_instant()).unwrap(),
                fresh.vulnerable_trend(caller, reference_instant()).unwrap(),
            )
        })
        .collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            for (caller, (summary, trend)) in callers.iter().zip(&expected) {
                let service = &service;
                s.spawn(move || {
                    for _ in 0..8 {
                        let got = service.summary(caller, reference_instant()).unwrap();
                        assert_eq!(got.scope, caller.scope().unwrap());
                        assert_eq!(&got, summary);
                        let got = service.vulnerable_trend(caller, reference_instant()).unwrap();
                        assert_eq!(&got, trend);
                    }
                });
            }
        }
    });

    // Three callers, two report kinds each
    assert_eq!(service.invalidate_all(), 6);
}
