//! Tests for cohort and vulnerability classification

use purok_analytics::algorithm::classification::pregnancy_proxy_placeholder;
use purok_analytics::{Cohort, OccupationStatus, Resident, Sex, classify};

use crate::utils::{at, date};

fn born(y: i32, m: u32, d: u32) -> Resident {
    Resident::new(1, 1, date(y, m, d), at(2020, 1, 1, 0, 0))
}

#[test]
fn test_exact_cohort_boundaries() {
    let reference = at(2024, 6, 15, 8, 0);

    let cases = [
        // (birthdate, expected age, expected cohort)
        (date(2023, 6, 16), 0, Cohort::Infant),
        (date(2023, 6, 15), 1, Cohort::Child),
        (date(2006, 6, 16), 17, Cohort::Child),
        (date(2006, 6, 15), 18, Cohort::Adult),
        (date(1964, 6, 16), 59, Cohort::Adult),
        (date(1964, 6, 15), 60, Cohort::Senior),
    ];

    for (birthdate, age, cohort) in cases {
        let resident = Resident::new(1, 1, birthdate, reference);
        let c = classify(&resident, reference);
        assert_eq!(c.age, age, "age for {birthdate}");
        assert_eq!(c.cohort, cohort, "cohort for {birthdate}");
    }
}

#[test]
fn test_flags_follow_cohort() {
    let reference = at(2024, 6, 15, 8, 0);

    let senior = classify(&born(1950, 1, 1), reference);
    assert!(senior.flags.is_senior);
    assert!(!senior.flags.is_infant);

    let infant = classify(&born(2024, 1, 1), reference);
    assert!(infant.flags.is_infant);
    assert!(!infant.flags.is_senior);

    let adult = classify(&born(1990, 1, 1), reference);
    assert!(!adult.flags.any());
}

#[test]
fn test_pwd_passthrough() {
    let reference = at(2024, 6, 15, 8, 0);
    let resident = born(1990, 1, 1).with_pwd(true);
    assert!(classify(&resident, reference).flags.is_pwd);
}

#[test]
fn test_pregnancy_placeholder_rule() {
    let female_other = born(1995, 5, 5)
        .with_sex(Sex::Female)
        .with_occupation(OccupationStatus::Other);
    let female_unknown = born(1995, 5, 5).with_sex(Sex::Female);
    let male_other = born(1995, 5, 5)
        .with_sex(Sex::Male)
        .with_occupation(OccupationStatus::Other);

    assert!(pregnancy_proxy_placeholder(&female_other));
    assert!(!pregnancy_proxy_placeholder(&female_unknown));
    assert!(!pregnancy_proxy_placeholder(&male_other));
}

#[test]
fn test_unrecognized_occupation_is_not_other() {
    let resident = born(1995, 5, 5)
        .with_sex(Sex::Female)
        .with_occupation(OccupationStatus::from("farmer"));
    assert_eq!(resident.occupation_status, OccupationStatus::Unknown);
    assert!(!pregnancy_proxy_placeholder(&resident));
}

#[test]
fn test_future_birthdate_is_age_zero() {
    let reference = at(2024, 6, 15, 8, 0);
    let c = classify(&born(2025, 1, 1), reference);
    assert_eq!(c.age, 0);
    assert_eq!(c.cohort, Cohort::Infant);
}

#[test]
fn test_classification_ignores_time_of_day() {
    let resident = born(1964, 6, 15);
    let morning = classify(&resident, at(2024, 6, 15, 0, 0));
    let evening = classify(&resident, at(2024, 6, 15, 23, 59));
    assert_eq!(morning, evening);
    assert_eq!(morning.cohort, Cohort::Senior);
}
