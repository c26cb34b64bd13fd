//! Request cancellation scenarios

use donormatch::core::error::MatchingError;
use donormatch::core::models::{BloodType, Caller, RequestId, RequestStatus, Resource};
use donormatch::core::ports::EntityStore;
use donormatch::core::services::RequestLifecycle;

use crate::common::fixtures::{DonationBuilder, RequestBuilder, World, now};

fn owner() -> Caller {
    Caller::new("requester", "Requester")
}

#[test]
fn test_owner_cancels_active_request() {
    let w = World::new();
    let request = RequestBuilder::new(Resource::Blood(BloodType::ANeg)).insert(&*w.store);

    let cancelled = RequestLifecycle::new(w.store.clone()).cancel(&owner(), request.id).unwrap();

    assert_eq!(cancelled.status, RequestStatus::Cancelled);
    assert_eq!(w.store.request(request.id).unwrap().unwrap().status, RequestStatus::Cancelled);
}

#[test]
fn test_other_user_cannot_cancel() {
    let w = World::new();
    let request = RequestBuilder::new(Resource::Blood(BloodType::ANeg)).insert(&*w.store);

    let err = RequestLifecycle::new(w.store.clone())
        .cancel(&Caller::new("sam", "Sam"), request.id)
        .unwrap_err();

    assert!(matches!(err, MatchingError::Forbidden(_)), "{err}");
    assert_eq!(w.store.request(request.id).unwrap().unwrap().status, RequestStatus::Active);
}

#[test]
fn test_fulfilled_request_cannot_be_cancelled() {
    let w = World::new();
    let store: &dyn EntityStore = &*w.store;
    let request = RequestBuilder::new(Resource::Blood(BloodType::ANeg)).insert(store);
    let donation = DonationBuilder::new(Resource::Blood(BloodType::ONeg)).insert(store);
    w.transactions.create_match_at(donation.id, request.id, 80, 2.0, now()).unwrap();

    let err = RequestLifecycle::new(w.store.clone()).cancel(&owner(), request.id).unwrap_err();

    assert!(matches!(err, MatchingError::InvalidState { entity: "request", .. }), "{err}");
    assert_eq!(store.request(request.id).unwrap().unwrap().status, RequestStatus::Fulfilled);
}

#[test]
fn test_cancelling_twice_is_invalid_state() {
    let w = World::new();
    let request = RequestBuilder::new(Resource::Blood(BloodType::ANeg)).insert(&*w.store);
    let lifecycle = RequestLifecycle::new(w.store.clone());
    lifecycle.cancel(&owner(), request.id).unwrap();

    let err = lifecycle.cancel(&owner(), request.id).unwrap_err();
    assert!(matches!(err, MatchingError::InvalidState { .. }), "{err}");
}

#[test]
fn test_unknown_request_is_not_found() {
    let w = World::new();
    let err = RequestLifecycle::new(w.store.clone()).cancel(&owner(), RequestId(8)).unwrap_err();
    assert_eq!(err, MatchingError::not_found("request", 8));
}
