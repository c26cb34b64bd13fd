//! Parameterized tests for the compatibility engine
//!
//! Blood compatibility tables and score tables, using test-case.

use chrono::Duration;
use donormatch::core::models::{
    BloodType, Donation, DonationId, DonationRequest, OrganType, RequestId, Resource, Urgency,
};
use donormatch::core::services::{CompatibilityEngine, Ineligibility, ScoringPolicy, Verdict};
use test_case::test_case;

use crate::common::fixtures::{DonationBuilder, RequestBuilder, now};

fn donation(builder: DonationBuilder) -> Donation {
    builder.build().into_donation(DonationId(1))
}

fn request(builder: RequestBuilder) -> DonationRequest {
    builder.build().into_request(RequestId(1))
}

fn score(given: DonationBuilder, needed: RequestBuilder) -> Verdict {
    CompatibilityEngine::default().score(&donation(given), &request(needed), now())
}

// =============================================================================
// Blood Type Compatibility
// =============================================================================

#[test_case(BloodType::ONeg, BloodType::AbPos, true ; "universal donor to universal recipient")]
#[test_case(BloodType::ONeg, BloodType::BNeg, true ; "o negative to b negative")]
#[test_case(BloodType::OPos, BloodType::APos, true ; "o positive to a positive")]
#[test_case(BloodType::OPos, BloodType::ANeg, false ; "rh positive to rh negative")]
#[test_case(BloodType::ANeg, BloodType::APos, true ; "rh negative to rh positive")]
#[test_case(BloodType::APos, BloodType::BPos, false ; "a to b")]
#[test_case(BloodType::BNeg, BloodType::AbNeg, true ; "b negative to ab negative")]
#[test_case(BloodType::AbPos, BloodType::ONeg, false ; "ab positive to o negative")]
#[test_case(BloodType::AbNeg, BloodType::AbPos, true ; "ab negative to ab positive")]
fn test_blood_donation_table(donor: BloodType, recipient: BloodType, expected: bool) {
    assert_eq!(donor.can_donate_to(recipient), expected);
}

#[test]
fn test_every_type_can_give_to_itself() {
    for t in BloodType::ALL {
        assert!(t.can_donate_to(t), "{t}");
    }
}

// =============================================================================
// Scores
// =============================================================================

#[test_case(Urgency::Normal, Urgency::Normal, 0, 100 ; "perfect fresh pair")]
#[test_case(Urgency::Critical, Urgency::Normal, 0, 100 ; "more urgent offer is not penalized")]
#[test_case(Urgency::High, Urgency::Critical, 0, 90 ; "one level short")]
#[test_case(Urgency::Low, Urgency::Critical, 0, 70 ; "three levels short")]
#[test_case(Urgency::Normal, Urgency::Normal, 15, 90 ; "half way to horizon")]
#[test_case(Urgency::Normal, Urgency::Normal, 45, 80 ; "past horizon")]
fn test_exact_type_scores(offered: Urgency, needed: Urgency, age_days: i64, expected: u8) {
    let verdict = score(
        DonationBuilder::new(Resource::Blood(BloodType::BPos)).urgency(offered).age_days(age_days),
        RequestBuilder::new(Resource::Blood(BloodType::BPos)).urgency(needed),
    );
    assert_eq!(verdict, Verdict::Eligible(expected));
}

#[test]
fn test_compatible_type_earns_broad_fit() {
    let verdict = score(
        DonationBuilder::new(Resource::Blood(BloodType::ONeg)),
        RequestBuilder::new(Resource::Blood(BloodType::APos)),
    );
    assert_eq!(verdict, Verdict::Eligible(80));
}

#[test]
fn test_custom_policy_changes_weights() {
    let policy = ScoringPolicy {
        type_weight: 60,
        urgency_weight: 40,
        recency_weight: 0,
        ..ScoringPolicy::default()
    };
    assert!(policy.validate().is_ok());
    let engine = CompatibilityEngine::new(policy);
    let verdict = engine.score(
        &donation(DonationBuilder::new(Resource::Blood(BloodType::ONeg)).age_days(100)),
        &request(RequestBuilder::new(Resource::Blood(BloodType::ONeg))),
        now(),
    );
    assert_eq!(verdict, Verdict::Eligible(100));
}

#[test_case(60, 30, 20 ; "weights over 100")]
#[test_case(10, 10, 10 ; "weights under 100")]
fn test_policy_weights_must_sum_to_100(type_weight: u8, urgency_weight: u8, recency_weight: u8) {
    let policy = ScoringPolicy {
        type_weight,
        urgency_weight,
        recency_weight,
        ..ScoringPolicy::default()
    };
    assert!(policy.validate().is_err());
}

// =============================================================================
// Ineligibility
// =============================================================================

#[test]
fn test_incompatible_blood_is_ineligible() {
    let verdict = score(
        DonationBuilder::new(Resource::Blood(BloodType::AbPos)),
        RequestBuilder::new(Resource::Blood(BloodType::ONeg)),
    );
    assert!(matches!(verdict, Verdict::Ineligible(Ineligibility::IncompatibleType { .. })));
}

#[test_case(Resource::Blood(BloodType::ONeg), Resource::Organ(OrganType::Kidney) ; "blood for organ")]
#[test_case(Resource::Organ(OrganType::Kidney), Resource::Tissue(OrganType::Cornea) ; "organ for tissue")]
fn test_kind_mismatch_is_ineligible(given: Resource, needed: Resource) {
    let verdict = score(DonationBuilder::new(given), RequestBuilder::new(needed));
    assert!(matches!(verdict, Verdict::Ineligible(Ineligibility::KindMismatch { .. })));
}

#[test_case(OrganType::Kidney, OrganType::Kidney, true ; "same organ")]
#[test_case(OrganType::Kidney, OrganType::Liver, false ; "different organ")]
fn test_organs_match_exactly(given: OrganType, needed: OrganType, eligible: bool) {
    let verdict = score(
        DonationBuilder::new(Resource::Organ(given)),
        RequestBuilder::new(Resource::Organ(needed)),
    );
    assert_eq!(verdict.score().is_some(), eligible);
}

#[test]
fn test_lapsed_offer_is_ineligible() {
    let yesterday = now().date_naive() - Duration::days(1);
    let verdict = score(
        DonationBuilder::new(Resource::Tissue(OrganType::Skin)).available_until(yesterday),
        RequestBuilder::new(Resource::Tissue(OrganType::Skin)),
    );
    assert_eq!(verdict, Verdict::Ineligible(Ineligibility::Lapsed(yesterday)));
}

#[test]
fn test_offer_lasting_until_today_is_eligible() {
    let verdict = score(
        DonationBuilder::new(Resource::Tissue(OrganType::Skin)).available_until(now().date_naive()),
        RequestBuilder::new(Resource::Tissue(OrganType::Skin)),
    );
    assert_eq!(verdict, Verdict::Eligible(100));
}
