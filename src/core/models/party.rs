//! People and places
//!
//! - [`Location`] - where a donor or requester is
//! - [`Caller`] - the authenticated identity acting on the system
//! - [`DonorProfile`] - donor details snapshotted onto a donation

use serde::{Deserialize, Serialize};

/// A place, as a human label with optional coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display label (city, hospital, ...)
    pub label: String,

    /// Latitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    /// A location known only by its label
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            latitude: None,
            longitude: None,
        }
    }

    /// A location with coordinates
    #[must_use]
    pub fn at(label: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            label: label.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Coordinates, when both are known
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// The identity performing an operation, as resolved by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caller {
    /// Stable user id; owner key for requests and donations
    pub id: String,

    /// Display name
    pub name: String,

    /// Profile location, used when a payload does not give one
    #[serde(default)]
    pub location: Option<Location>,

    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,
}

impl Caller {
    /// A caller with only an id and name
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: None,
            phone: None,
        }
    }
}

/// Donor details carried on a donation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorProfile {
    /// Donor user id (owner of the donation)
    pub id: String,

    /// Donor display name
    pub name: String,

    /// Contact phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
