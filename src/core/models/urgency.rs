//! Urgency levels and quantity units

use serde::{Deserialize, Serialize};

/// How urgently a resource is needed (requests) or can be released (donations)
///
/// Variants are declared in ascending order, so `Ord` follows urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Can wait
    Low,
    /// Routine (default)
    #[default]
    Normal,
    /// Needed soon
    High,
    /// Life-threatening
    Critical,
}

impl Urgency {
    /// Numeric rank, 0 (low) to 3 (critical)
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    /// Highest rank
    pub const MAX_RANK: u8 = 3;
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" | "medium" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" | "urgent" => Ok(Self::Critical),
            _ => Err(format!("Invalid urgency: {s}. Use: low, normal, high, critical")),
        }
    }
}

/// Unit a quantity is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Generic units (default)
    #[default]
    Units,
    /// Milliliters
    Ml,
    /// Pints
    Pints,
    /// Bags
    Bags,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Units => write!(f, "units"),
            Self::Ml => write!(f, "ml"),
            Self::Pints => write!(f, "pints"),
            Self::Bags => write!(f, "bags"),
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "units" | "unit" => Ok(Self::Units),
            "ml" | "milliliters" => Ok(Self::Ml),
            "pints" | "pint" => Ok(Self::Pints),
            "bags" | "bag" => Ok(Self::Bags),
            _ => Err(format!("Invalid unit: {s}. Use: units, ml, pints, bags")),
        }
    }
}
