//! Property-based tests for scoring and ranking
//!
//! Uses proptest to verify properties that should hold for all inputs.

use donormatch::core::models::{
    BloodType, DonationId, MatchCandidate, RequestId, Resource, Urgency,
};
use donormatch::core::services::{CompatibilityEngine, rank};
use proptest::prelude::*;

use crate::common::fixtures::{DonationBuilder, RequestBuilder, now};

fn blood_type() -> impl Strategy<Value = BloodType> {
    prop::sample::select(BloodType::ALL.to_vec())
}

fn urgency() -> impl Strategy<Value = Urgency> {
    prop::sample::select(vec![Urgency::Low, Urgency::Normal, Urgency::High, Urgency::Critical])
}

fn score(given: BloodType, offered: Urgency, age: i64, needed: BloodType, wanted: Urgency) -> Option<u8> {
    let donation = DonationBuilder::new(Resource::Blood(given))
        .urgency(offered)
        .age_days(age)
        .build()
        .into_donation(DonationId(1));
    let request = RequestBuilder::new(Resource::Blood(needed))
        .urgency(wanted)
        .build()
        .into_request(RequestId(1));
    CompatibilityEngine::default().score(&donation, &request, now()).score()
}

proptest! {
    /// Eligibility follows blood compatibility exactly, and scores stay in range
    #[test]
    fn score_in_range_iff_compatible(
        given in blood_type(),
        needed in blood_type(),
        offered in urgency(),
        wanted in urgency(),
        age in 0_i64..400,
    ) {
        match score(given, offered, age, needed, wanted) {
            Some(s) => {
                prop_assert!(given.can_donate_to(needed));
                prop_assert!(s <= 100);
            },
            None => prop_assert!(!given.can_donate_to(needed)),
        }
    }

    /// A more urgent offer never scores lower
    #[test]
    fn urgency_is_monotone(
        t in blood_type(),
        a in urgency(),
        b in urgency(),
        wanted in urgency(),
        age in 0_i64..60,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score(t, high, age, t, wanted) >= score(t, low, age, t, wanted));
    }

    /// A fresher offer never scores lower
    #[test]
    fn freshness_is_monotone(
        t in blood_type(),
        offered in urgency(),
        wanted in urgency(),
        a in 0_i64..90,
        b in 0_i64..90,
    ) {
        let (young, old) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score(t, offered, young, t, wanted) >= score(t, offered, old, t, wanted));
    }

    /// An exact type never scores below a merely compatible one
    #[test]
    fn exact_type_beats_compatible_type(
        given in blood_type(),
        needed in blood_type(),
        offered in urgency(),
        wanted in urgency(),
        age in 0_i64..60,
    ) {
        prop_assume!(given != needed && given.can_donate_to(needed));
        prop_assert!(score(needed, offered, age, needed, wanted) > score(given, offered, age, needed, wanted));
    }

    /// Ranking orders by score, then distance, and is a permutation
    #[test]
    fn rank_orders_by_score_then_distance(
        entries in prop::collection::vec((0_u8..=100, 0.0_f64..500.0), 0..20),
    ) {
        let mut candidates: Vec<MatchCandidate> = entries
            .iter()
            .enumerate()
            .map(|(i, (score, distance))| MatchCandidate {
                request_id: RequestId(1),
                donation: DonationBuilder::new(Resource::Blood(BloodType::ONeg))
                    .build()
                    .into_donation(DonationId(i as u64 + 1)),
                compatibility_score: *score,
                distance: *distance,
            })
            .collect();
        rank(&mut candidates);

        prop_assert_eq!(candidates.len(), entries.len());
        for pair in candidates.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.compatibility_score >= b.compatibility_score);
            if a.compatibility_score == b.compatibility_score {
                prop_assert!(a.distance <= b.distance);
                if a.distance == b.distance {
                    prop_assert!(a.donation.id < b.donation.id);
                }
            }
        }
    }
}
