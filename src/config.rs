//! Configuration management
//!
//! Settings live in a TOML file, by default `~/.config/donormatch/config.toml`
//! (XDG standard). Every section is optional; a missing file means defaults.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:3001"
//!
//! [storage]
//! path = "/var/lib/donormatch/store.json"
//!
//! [matching]
//! distance = "table"
//! distance_timeout_ms = 1500
//!
//! [scoring]
//! type_weight = 50
//! urgency_weight = 30
//! recency_weight = 20
//!
//! [[distances]]
//! from = "Lyon"
//! to = "Grenoble"
//! km = 105.0
//!
//! [[users]]
//! id = "alice"
//! name = "Alice Martin"
//! token = "secret-token"
//! location = "Lyon"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::adapters::{DistanceTable, HaversineDistance, TokenDirectory};
use crate::core::models::{Caller, Location};
use crate::core::ports::DistanceProvider;
use crate::core::services::ScoringPolicy;

/// Application name used for config and data directories
pub const APP_DIR: &str = "donormatch";

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Entity store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Matching service settings
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Compatibility scoring weights
    #[serde(default)]
    pub scoring: ScoringPolicy,
    /// Known distances between labeled places
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distances: Vec<DistanceEntry>,
    /// Users and their bearer tokens
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserEntry>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Entity store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file; defaults to `<data dir>/donormatch/store.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Keep everything in memory and never write a snapshot
    #[serde(default)]
    pub memory: bool,
}

/// Which distance provider to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMode {
    /// Great-circle distance from coordinates
    #[default]
    Coordinates,
    /// The `[[distances]]` table, falling back to coordinates
    Table,
}

/// Matching service settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Bound on each distance lookup, in milliseconds
    #[serde(default = "default_distance_timeout_ms")]
    pub distance_timeout_ms: u64,
    /// Distance provider
    #[serde(default)]
    pub distance: DistanceMode,
}

const fn default_distance_timeout_ms() -> u64 {
    2000
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            distance_timeout_ms: default_distance_timeout_ms(),
            distance: DistanceMode::default(),
        }
    }
}

/// A known distance between two labeled places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceEntry {
    /// First place
    pub from: String,
    /// Second place
    pub to: String,
    /// Distance in km
    pub km: f64,
}

/// A user known to the token directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    /// User id
    pub id: String,
    /// Display name
    pub name: String,
    /// Bearer token for HTTP access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Profile location label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Profile latitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Profile longitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Contact phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserEntry {
    /// The caller this entry describes
    #[must_use]
    pub fn to_caller(&self) -> Caller {
        Caller {
            id: self.id.clone(),
            name: self.name.clone(),
            location: self.location.as_ref().map(|label| Location {
                label: label.clone(),
                latitude: self.latitude,
                longitude: self.longitude,
            }),
            phone: self.phone.clone(),
        }
    }
}

impl Settings {
    /// Default config file path
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Load settings
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// if present, and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> anyhow::Result<()> {
        self.scoring.validate().map_err(anyhow::Error::msg)?;
        if self.matching.distance_timeout_ms == 0 {
            anyhow::bail!("matching.distance_timeout_ms must be positive");
        }
        if let Some(entry) = self.distances.iter().find(|d| !(d.km.is_finite() && d.km >= 0.0)) {
            anyhow::bail!("distance {} -> {} must be a non-negative number", entry.from, entry.to);
        }
        let mut ids: Vec<&str> = self.users.iter().map(|u| u.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            anyhow::bail!("duplicate user id: {}", pair[0]);
        }
        Ok(())
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Snapshot file for the entity store, or `None` for memory-only
    #[must_use]
    pub fn store_path(&self) -> Option<PathBuf> {
        if self.storage.memory {
            return None;
        }
        self.storage
            .path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join("store.json")))
    }

    /// Bound on each distance lookup
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.matching.distance_timeout_ms)
    }

    /// Identity provider built from `[[users]]`
    #[must_use]
    pub fn directory(&self) -> TokenDirectory {
        let mut directory = TokenDirectory::new();
        for user in &self.users {
            directory.register(user.to_caller(), user.token.as_deref());
        }
        directory
    }

    /// Distance provider selected by `[matching] distance`
    #[must_use]
    pub fn distance_provider(&self) -> Arc<dyn DistanceProvider> {
        match self.matching.distance {
            DistanceMode::Coordinates => Arc::new(HaversineDistance),
            DistanceMode::Table => {
                let mut table = DistanceTable::new().with_fallback(HaversineDistance);
                for entry in &self.distances {
                    table.insert(&entry.from, &entry.to, entry.km);
                }
                Arc::new(table)
            },
        }
    }
}
