//! Candidate search scenarios

use std::sync::Arc;

use chrono::Duration;
use donormatch::core::error::MatchingError;
use donormatch::core::models::{BloodType, Caller, OrganType, Resource, Urgency};
use donormatch::core::ports::EntityStore;
use donormatch::core::services::RequestLifecycle;

use crate::common::fixtures::{DonationBuilder, FixedDistance, RequestBuilder, World, now};

fn world() -> World {
    World::with_distance(Arc::new(FixedDistance(10.0)))
}

#[test]
fn test_critical_universal_donor_request() {
    let w = world();
    let store: &dyn EntityStore = &*w.store;
    let request = RequestBuilder::new(Resource::Blood(BloodType::ONeg))
        .urgency(Urgency::Critical)
        .insert(store);
    let low = DonationBuilder::new(Resource::Blood(BloodType::ONeg)).urgency(Urgency::Low).insert(store);
    let critical = DonationBuilder::new(Resource::Blood(BloodType::ONeg))
        .urgency(Urgency::Critical)
        .insert(store);
    DonationBuilder::new(Resource::Blood(BloodType::AbPos)).urgency(Urgency::Critical).insert(store);

    let candidates = w.matching.find_candidates_at(request.id, now()).unwrap();

    let ids: Vec<_> = candidates.iter().map(|c| c.donation.id).collect();
    assert_eq!(ids, vec![critical.id, low.id]);
    assert_eq!(candidates[0].compatibility_score, 100);
    assert_eq!(candidates[1].compatibility_score, 70);
    assert!(candidates.iter().all(|c| c.request_id == request.id));
    assert!(candidates.iter().all(|c| (c.distance - 10.0).abs() < f64::EPSILON));
}

#[test]
fn test_unknown_request_is_not_found() {
    let w = world();
    let err = w.matching.find_candidates_at(donormatch::core::models::RequestId(42), now()).unwrap_err();
    assert_eq!(err, MatchingError::not_found("request", 42));
}

#[test]
fn test_cancelled_request_has_no_candidates() {
    let w = world();
    let request = RequestBuilder::new(Resource::Organ(OrganType::Kidney)).insert(&*w.store);
    RequestLifecycle::new(w.store.clone())
        .cancel(&Caller::new("requester", "Requester"), request.id)
        .unwrap();

    let err = w.matching.find_candidates_at(request.id, now()).unwrap_err();
    assert!(matches!(err, MatchingError::InvalidState { entity: "request", .. }), "{err}");
}

#[test]
fn test_reserved_donation_is_excluded() {
    let w = world();
    let store: &dyn EntityStore = &*w.store;
    let first = RequestBuilder::new(Resource::Blood(BloodType::APos)).insert(store);
    let second = RequestBuilder::new(Resource::Blood(BloodType::APos)).insert(store);
    let taken = DonationBuilder::new(Resource::Blood(BloodType::APos)).insert(store);
    let free = DonationBuilder::new(Resource::Blood(BloodType::ANeg)).insert(store);

    w.transactions.create_match_at(taken.id, first.id, 100, 10.0, now()).unwrap();

    let candidates = w.matching.find_candidates_at(second.id, now()).unwrap();
    let ids: Vec<_> = candidates.iter().map(|c| c.donation.id).collect();
    assert_eq!(ids, vec![free.id]);
}

#[test]
fn test_lapsed_donation_is_excluded() {
    let w = world();
    let store: &dyn EntityStore = &*w.store;
    let request = RequestBuilder::new(Resource::Tissue(OrganType::Cornea)).insert(store);
    DonationBuilder::new(Resource::Tissue(OrganType::Cornea))
        .available_until(now().date_naive() - Duration::days(2))
        .insert(store);

    assert!(w.matching.find_candidates_at(request.id, now()).unwrap().is_empty());
}

#[test]
fn test_kinds_do_not_mix() {
    let w = world();
    let store: &dyn EntityStore = &*w.store;
    let request = RequestBuilder::new(Resource::Tissue(OrganType::Skin)).insert(store);
    DonationBuilder::new(Resource::Organ(OrganType::Kidney)).insert(store);
    DonationBuilder::new(Resource::Blood(BloodType::ONeg)).insert(store);
    let skin = DonationBuilder::new(Resource::Tissue(OrganType::Skin)).insert(store);

    let candidates = w.matching.find_candidates_at(request.id, now()).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].donation.id, skin.id);
}

#[test]
fn test_results_are_deterministic() {
    let w = world();
    let store: &dyn EntityStore = &*w.store;
    let request = RequestBuilder::new(Resource::Blood(BloodType::AbPos)).insert(store);
    for t in BloodType::ALL {
        DonationBuilder::new(Resource::Blood(t)).insert(store);
        DonationBuilder::new(Resource::Blood(t)).age_days(10).insert(store);
    }

    let first = w.matching.find_candidates_at(request.id, now()).unwrap();
    let second = w.matching.find_candidates_at(request.id, now()).unwrap();
    assert_eq!(first.len(), 16);
    assert_eq!(first, second);
    for pair in first.windows(2) {
        assert!(pair[0].compatibility_score >= pair[1].compatibility_score);
    }
}

#[test]
fn test_no_donations_gives_empty_list() {
    let w = world();
    let request = RequestBuilder::new(Resource::Organ(OrganType::Heart)).insert(&*w.store);
    assert!(w.matching.find_candidates_at(request.id, now()).unwrap().is_empty());
}

#[test]
fn test_only_the_requester_lists_candidates() {
    let w = world();
    let request = RequestBuilder::new(Resource::Blood(BloodType::APos)).insert(&*w.store);
    DonationBuilder::new(Resource::Blood(BloodType::APos)).insert(&*w.store);

    let err = w.matching.find_candidates(&Caller::new("donor", "Donor"), request.id).unwrap_err();
    assert!(matches!(err, MatchingError::Forbidden(_)), "{err}");

    let candidates = w.matching.find_candidates(&Caller::new("requester", "Requester"), request.id).unwrap();
    assert_eq!(candidates.len(), 1);
}
