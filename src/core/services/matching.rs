//! Matching service - ranked donation candidates for a request
//!
//! Read-only: the result is a point-in-time snapshot, and callers must
//! expect [`MatchTransactionManager`](super::MatchTransactionManager) to
//! re-validate when they commit.
//!
//! Distance lookups run on a small fixed pool of threads, each lookup
//! bounded by the lookup timeout.
//! A pair whose distance is unavailable or late is dropped from the result;
//! it never fails the whole query.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::compatibility::{CompatibilityEngine, Verdict};
use super::lifecycle;
use crate::core::error::{MatchingError, Result};
use crate::core::models::{Caller, Donation, DonationId, Location, MatchCandidate, RequestId};
use crate::core::ports::{DistanceError, DistanceProvider, EntityStore};

/// Default bound on a single distance lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound on threads running distance lookups for one query
pub const LOOKUP_WORKERS: usize = 8;

/// Finds and ranks candidate donations for requests
#[derive(Clone)]
pub struct MatchingService {
    store: Arc<dyn EntityStore>,
    engine: CompatibilityEngine,
    distance: Arc<dyn DistanceProvider>,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for MatchingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchingService")
            .field("engine", &self.engine)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}

impl MatchingService {
    /// Create a matching service
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        engine: CompatibilityEngine,
        distance: Arc<dyn DistanceProvider>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            store,
            engine,
            distance,
            lookup_timeout,
        }
    }

    /// Ranked candidates for an active request owned by `caller`, as of now
    ///
    /// Candidates carry donor contact details, so only the requester may
    /// list them.
    pub fn find_candidates(&self, caller: &Caller, request_id: RequestId) -> Result<Vec<MatchCandidate>> {
        let request = self
            .store
            .request(request_id)?
            .ok_or_else(|| MatchingError::not_found("request", request_id.0))?;
        if request.owner != caller.id {
            return Err(MatchingError::Forbidden(format!(
                "request {request_id} belongs to another requester"
            )));
        }
        self.find_candidates_at(request_id, Utc::now())
    }

    /// Ranked candidates for an active request, scored as of `now`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the request does not exist
    /// - `InvalidState` if the request is not active
    pub fn find_candidates_at(
        &self,
        request_id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchCandidate>> {
        let request = self
            .store
            .request(request_id)?
            .ok_or_else(|| MatchingError::not_found("request", request_id.0))?;
        lifecycle::ensure_matchable(&request)?;

        let bound: HashSet<DonationId> =
            self.store.active_matches()?.into_iter().map(|m| m.donation_id).collect();

        let scored: Vec<(Donation, u8)> = self
            .store
            .available_donations(request.resource.kind())?
            .into_iter()
            .filter(|donation| !bound.contains(&donation.id))
            .filter_map(|donation| match self.engine.score(&donation, &request, now) {
                Verdict::Eligible(score) => Some((donation, score)),
                Verdict::Ineligible(reason) => {
                    debug!("Donation {} skipped for request {}: {reason}", donation.id, request.id);
                    None
                },
            })
            .collect();

        let targets: Vec<Location> = scored.iter().map(|(d, _)| d.location.clone()).collect();
        let distances = self.measure(&request.location, targets);

        let mut candidates: Vec<MatchCandidate> = scored
            .into_iter()
            .zip(distances)
            .filter_map(|((donation, score), distance)| match distance {
                Ok(km) => Some(MatchCandidate {
                    request_id: request.id,
                    donation,
                    compatibility_score: score,
                    distance: km,
                }),
                Err(e) => {
                    warn!("Donation {} omitted from request {}: {e}", donation.id, request.id);
                    None
                },
            })
            .collect();

        rank(&mut candidates);
        debug!("Request {} has {} candidate(s)", request.id, candidates.len());
        Ok(candidates)
    }

    /// Look up distances from each target to `origin`, in target order
    ///
    /// At most [`LOOKUP_WORKERS`] threads run lookups. A lookup that takes
    /// longer than the lookup timeout counts as timed out, and the query
    /// stops waiting once no lookup has finished within one timeout.
    fn measure(&self, origin: &Location, targets: Vec<Location>) -> Vec<Result<f64, DistanceError>> {
        let timeout = self.lookup_timeout;
        let mut results = vec![Err(DistanceError::Timeout(timeout)); targets.len()];
        if targets.is_empty() {
            return results;
        }

        let targets = Arc::new(targets);
        let next = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let mut started = 0_usize;
        for worker in 0..LOOKUP_WORKERS.min(targets.len()) {
            let tx = tx.clone();
            let provider = Arc::clone(&self.distance);
            let origin = origin.clone();
            let targets = Arc::clone(&targets);
            let next = Arc::clone(&next);
            let stop = Arc::clone(&stop);
            let spawned = thread::Builder::new().name(format!("distance-{worker}")).spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(target) = targets.get(index) else { break };
                    let begun = Instant::now();
                    let result = provider.distance(target, &origin);
                    let result = if begun.elapsed() > timeout {
                        Err(DistanceError::Timeout(timeout))
                    } else {
                        result
                    };
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
            match spawned {
                Ok(_) => started += 1,
                Err(e) => warn!("Distance worker {worker} not started: {e}"),
            }
        }
        drop(tx);

        if started == 0 {
            for slot in &mut results {
                *slot = Err(DistanceError::Unavailable("no distance worker available".to_string()));
            }
            return results;
        }

        let mut pending = results.len();
        while pending > 0 {
            match rx.recv_timeout(timeout) {
                Ok((index, result)) => {
                    results[index] = result.and_then(checked_distance);
                    pending -= 1;
                },
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    warn!("{pending} distance lookup(s) gave no answer within {timeout:?}");
                    break;
                },
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    for slot in results.iter_mut().filter(|r| matches!(r, Err(DistanceError::Timeout(_)))) {
                        *slot = Err(DistanceError::Unavailable("lookup aborted".to_string()));
                    }
                    break;
                },
            }
        }
        stop.store(true, Ordering::Relaxed);
        results
    }
}

fn checked_distance(km: f64) -> Result<f64, DistanceError> {
    if km.is_finite() && km >= 0.0 {
        Ok(km)
    } else {
        Err(DistanceError::Unavailable(format!("provider returned invalid distance {km}")))
    }
}

/// Order candidates for display
///
/// Descending score, then ascending distance, then older offers first,
/// then lower donation id, so equal inputs always give equal output.
pub fn rank(candidates: &mut [MatchCandidate]) {
    candidates.sort_by(|a, b| {
        b.compatibility_score
            .cmp(&a.compatibility_score)
            .then_with(|| a.distance.total_cmp(&b.distance))
            .then_with(|| a.donation.created_at.cmp(&b.donation.created_at))
            .then_with(|| a.donation.id.cmp(&b.donation.id))
    });
}
