//! Distance provider adapters
//!
//! - [`HaversineDistance`] - great-circle distance from coordinates
//! - [`DistanceTable`] - configured distances between labeled places

use std::collections::HashMap;

use crate::core::models::Location;
use crate::core::ports::{DistanceError, DistanceProvider};

/// Mean Earth radius in km
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between locations that carry coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineDistance;

impl DistanceProvider for HaversineDistance {
    fn distance(&self, from: &Location, to: &Location) -> Result<f64, DistanceError> {
        let (lat1, lon1) = from
            .coordinates()
            .ok_or_else(|| DistanceError::Unavailable(format!("no coordinates for {from}")))?;
        let (lat2, lon2) = to
            .coordinates()
            .ok_or_else(|| DistanceError::Unavailable(format!("no coordinates for {to}")))?;

        let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
        let d_phi = (lat2 - lat1).to_radians();
        let d_lambda = (lon2 - lon1).to_radians();
        let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        Ok(2.0 * EARTH_RADIUS_KM * a.sqrt().clamp(0.0, 1.0).asin())
    }
}

/// Symmetric lookup table keyed by location labels (case-insensitive)
///
/// Identical labels are 0 km apart. Pairs missing from the table go to the
/// fallback provider when one is set, and are unavailable otherwise.
#[derive(Default)]
pub struct DistanceTable {
    entries: HashMap<(String, String), f64>,
    fallback: Option<Box<dyn DistanceProvider>>,
}

impl std::fmt::Debug for DistanceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceTable")
            .field("entries", &self.entries.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl DistanceTable {
    /// An empty table without fallback
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `fallback` for pairs the table does not know
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl DistanceProvider + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Record the distance between two places
    pub fn insert(&mut self, a: &str, b: &str, km: f64) {
        self.entries.insert(key(a, b), km);
    }

    /// Number of recorded pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pair is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DistanceProvider for DistanceTable {
    fn distance(&self, from: &Location, to: &Location) -> Result<f64, DistanceError> {
        if normalize(&from.label) == normalize(&to.label) {
            return Ok(0.0);
        }
        if let Some(km) = self.entries.get(&key(&from.label, &to.label)) {
            return Ok(*km);
        }
        match &self.fallback {
            Some(fallback) => fallback.distance(from, to),
            None => Err(DistanceError::Unavailable(format!("no distance known between {from} and {to}"))),
        }
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

fn key(a: &str, b: &str) -> (String, String) {
    let (a, b) = (normalize(a), normalize(b));
    if a <= b { (a, b) } else { (b, a) }
}
