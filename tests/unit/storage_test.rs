//! Snapshot persistence of the memory store

use donormatch::adapters::MemoryStore;
use donormatch::core::error::MatchingError;
use donormatch::core::models::{BloodType, DonationStatus, RequestStatus, Resource};
use donormatch::core::ports::{EntityStore, StoreTransaction};
use donormatch::core::services::{CompatibilityEngine, MatchTransactionManager};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

use crate::common::fixtures::{DonationBuilder, RequestBuilder, now};

#[test]
fn test_snapshot_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("data").join("store.json");

    let (request_id, donation_id) = {
        let store = Arc::new(MemoryStore::open(&path).unwrap());
        let request = RequestBuilder::new(Resource::Blood(BloodType::BNeg)).insert(&*store);
        let donation = DonationBuilder::new(Resource::Blood(BloodType::ONeg)).insert(&*store);
        MatchTransactionManager::new(store, CompatibilityEngine::default())
            .create_match_at(donation.id, request.id, 80, 4.0, now())
            .unwrap();
        (request.id, donation.id)
    };
    assert!(path.exists());

    let reopened = MemoryStore::open(&path).unwrap();
    assert_eq!(reopened.request(request_id).unwrap().unwrap().status, RequestStatus::Fulfilled);
    assert_eq!(reopened.donation(donation_id).unwrap().unwrap().status, DonationStatus::Reserved);
    assert_eq!(reopened.active_matches().unwrap().len(), 1);

    let next = RequestBuilder::new(Resource::Blood(BloodType::BNeg)).insert(&reopened);
    assert!(next.id > request_id, "ids keep counting after reopen");
}

#[test]
fn test_failed_transaction_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    let store = MemoryStore::open(&path).unwrap();
    let request = RequestBuilder::new(Resource::Blood(BloodType::APos)).insert(&store);
    let before = std::fs::read_to_string(&path).unwrap();

    let result = store.transaction(&mut |tx: &mut dyn StoreTransaction| {
        let mut changed = tx.request(request.id).unwrap();
        changed.status = RequestStatus::Cancelled;
        tx.update_request(changed)?;
        Err(MatchingError::Conflict("abort".to_string()))
    });

    assert!(matches!(result, Err(MatchingError::Conflict(_))));
    assert_eq!(store.request(request.id).unwrap().unwrap().status, RequestStatus::Active);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_stores_sharing_a_snapshot_see_each_others_commits() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    let (first_request, second_request, donation) = {
        let seed = MemoryStore::open(&path).unwrap();
        (
            RequestBuilder::new(Resource::Blood(BloodType::APos)).insert(&seed),
            RequestBuilder::new(Resource::Blood(BloodType::APos)).insert(&seed),
            DonationBuilder::new(Resource::Blood(BloodType::ONeg)).insert(&seed),
        )
    };

    let first = Arc::new(MemoryStore::open(&path).unwrap());
    let second = Arc::new(MemoryStore::open(&path).unwrap());
    MatchTransactionManager::new(first, CompatibilityEngine::default())
        .create_match_at(donation.id, first_request.id, 80, 4.0, now())
        .unwrap();
    let err = MatchTransactionManager::new(second, CompatibilityEngine::default())
        .create_match_at(donation.id, second_request.id, 80, 4.0, now())
        .unwrap_err();
    assert!(matches!(err, MatchingError::Conflict(_)), "{err}");

    let reopened = MemoryStore::open(&path).unwrap();
    assert_eq!(reopened.request(first_request.id).unwrap().unwrap().status, RequestStatus::Fulfilled);
    assert_eq!(reopened.request(second_request.id).unwrap().unwrap().status, RequestStatus::Active);
    assert_eq!(reopened.active_matches().unwrap().len(), 1);
}

#[test]
fn test_racing_stores_commit_one_match() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    let seed = MemoryStore::open(&path).unwrap();
    let requests = [
        RequestBuilder::new(Resource::Blood(BloodType::BPos)).insert(&seed),
        RequestBuilder::new(Resource::Blood(BloodType::BPos)).insert(&seed),
    ];
    let donation_id = DonationBuilder::new(Resource::Blood(BloodType::ONeg)).insert(&seed).id;
    drop(seed);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = requests
        .iter()
        .map(|request| {
            let store = Arc::new(MemoryStore::open(&path).unwrap());
            let barrier = Arc::clone(&barrier);
            let request_id = request.id;
            thread::spawn(move || {
                let manager = MatchTransactionManager::new(store, CompatibilityEngine::default());
                barrier.wait();
                manager.create_match_at(donation_id, request_id, 75, 2.0, now())
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(MemoryStore::open(&path).unwrap().active_matches().unwrap().len(), 1);
}

#[test]
fn test_corrupt_snapshot_is_a_storage_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    std::fs::write(&path, "{ definitely not a store").unwrap();

    let err = MemoryStore::open(&path).unwrap_err();
    assert!(matches!(err, MatchingError::Storage(_)), "{err}");
}

#[test]
fn test_memory_only_store_starts_empty() {
    let store = MemoryStore::new();
    assert!(store.matches().unwrap().is_empty());
    assert!(store.requests_owned_by("anyone").unwrap().is_empty());
}
