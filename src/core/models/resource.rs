//! Donated resources
//!
//! A request or donation is always for exactly one resource: a blood type,
//! or an organ/tissue type. [`Resource`] encodes the "blood type xor organ
//! type" rule in the type system, so only [`Resource::from_parts`] has to
//! validate loose input.

use serde::{Deserialize, Serialize};

/// Broad category of a donation or request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationKind {
    /// Whole blood or blood products
    Blood,
    /// Solid organs
    Organ,
    /// Tissue (cornea, marrow, skin, bone)
    Tissue,
}

impl std::fmt::Display for DonationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blood => write!(f, "blood"),
            Self::Organ => write!(f, "organ"),
            Self::Tissue => write!(f, "tissue"),
        }
    }
}

impl std::str::FromStr for DonationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blood" => Ok(Self::Blood),
            "organ" => Ok(Self::Organ),
            "tissue" => Ok(Self::Tissue),
            _ => Err(format!("Invalid kind: {s}. Use: blood, organ, tissue")),
        }
    }
}

/// ABO/Rh blood type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    /// A positive
    #[serde(rename = "A+")]
    APos,
    /// A negative
    #[serde(rename = "A-")]
    ANeg,
    /// B positive
    #[serde(rename = "B+")]
    BPos,
    /// B negative
    #[serde(rename = "B-")]
    BNeg,
    /// AB positive
    #[serde(rename = "AB+")]
    AbPos,
    /// AB negative
    #[serde(rename = "AB-")]
    AbNeg,
    /// O positive
    #[serde(rename = "O+")]
    OPos,
    /// O negative
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodType {
    /// All eight types, in the order forms usually list them
    pub const ALL: [Self; 8] = [
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::AbPos,
        Self::AbNeg,
        Self::OPos,
        Self::ONeg,
    ];

    /// Whether red cells carry the A antigen
    #[must_use]
    pub const fn has_a(self) -> bool {
        matches!(self, Self::APos | Self::ANeg | Self::AbPos | Self::AbNeg)
    }

    /// Whether red cells carry the B antigen
    #[must_use]
    pub const fn has_b(self) -> bool {
        matches!(self, Self::BPos | Self::BNeg | Self::AbPos | Self::AbNeg)
    }

    /// Whether the type is Rh(D) positive
    #[must_use]
    pub const fn rh_positive(self) -> bool {
        matches!(self, Self::APos | Self::BPos | Self::AbPos | Self::OPos)
    }

    /// Red cell donor compatibility
    ///
    /// The donor must not carry any antigen the recipient lacks.
    #[must_use]
    pub const fn can_donate_to(self, recipient: Self) -> bool {
        let abo_ok = (!self.has_a() || recipient.has_a()) && (!self.has_b() || recipient.has_b());
        let rh_ok = !self.rh_positive() || recipient.rh_positive();
        abo_ok && rh_ok
    }

    /// Canonical label (`"AB-"`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
        }
    }
}

impl std::fmt::Display for BloodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BloodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Invalid blood type: {s}. Use: A+, A-, B+, B-, AB+, AB-, O+, O-"))
    }
}

/// Organ or tissue type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganType {
    /// Kidney
    Kidney,
    /// Liver
    Liver,
    /// Heart
    Heart,
    /// Lung
    Lung,
    /// Pancreas
    Pancreas,
    /// Cornea
    Cornea,
    /// Bone marrow
    BoneMarrow,
    /// Skin
    Skin,
    /// Bone
    Bone,
}

impl OrganType {
    /// Every organ and tissue type
    pub const ALL: [Self; 9] = [
        Self::Kidney,
        Self::Liver,
        Self::Heart,
        Self::Lung,
        Self::Pancreas,
        Self::Cornea,
        Self::BoneMarrow,
        Self::Skin,
        Self::Bone,
    ];

    /// The kind this type belongs to (organ or tissue)
    #[must_use]
    pub const fn kind(self) -> DonationKind {
        match self {
            Self::Kidney | Self::Liver | Self::Heart | Self::Lung | Self::Pancreas => {
                DonationKind::Organ
            },
            Self::Cornea | Self::BoneMarrow | Self::Skin | Self::Bone => DonationKind::Tissue,
        }
    }

    /// Human label (`"bone marrow"`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kidney => "kidney",
            Self::Liver => "liver",
            Self::Heart => "heart",
            Self::Lung => "lung",
            Self::Pancreas => "pancreas",
            Self::Cornea => "cornea",
            Self::BoneMarrow => "bone marrow",
            Self::Skin => "skin",
            Self::Bone => "bone",
        }
    }
}

impl std::fmt::Display for OrganType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrganType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL.into_iter().find(|t| t.as_str() == normalized).ok_or_else(|| {
            format!(
                "Invalid organ type: {s}. Use: kidney, liver, heart, lung, pancreas, cornea, \
                 bone marrow, skin, bone"
            )
        })
    }
}

/// The concrete resource a request asks for or a donation offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "lowercase")]
pub enum Resource {
    /// Blood of a given type
    Blood(BloodType),
    /// A solid organ
    Organ(OrganType),
    /// A tissue
    Tissue(OrganType),
}

impl Resource {
    /// Build a resource from loosely-typed form fields
    ///
    /// Exactly one of `blood_type` / `organ_type` must be given, matching
    /// `kind`, and an organ type must belong to the requested kind.
    pub fn from_parts(
        kind: DonationKind,
        blood_type: Option<BloodType>,
        organ_type: Option<OrganType>,
    ) -> Result<Self, String> {
        match (kind, blood_type, organ_type) {
            (DonationKind::Blood, Some(blood), None) => Ok(Self::Blood(blood)),
            (DonationKind::Blood, Some(_), Some(_)) => {
                Err("organType is not allowed for blood".to_string())
            },
            (DonationKind::Blood, None, _) => Err("bloodType is required for blood".to_string()),
            (_, Some(_), _) => Err(format!("bloodType is not allowed for {kind}")),
            (_, None, None) => Err(format!("organType is required for {kind}")),
            (DonationKind::Organ | DonationKind::Tissue, None, Some(organ)) => {
                if organ.kind() == kind {
                    Ok(if kind == DonationKind::Organ {
                        Self::Organ(organ)
                    } else {
                        Self::Tissue(organ)
                    })
                } else {
                    Err(format!("{organ} is a {} type, not {kind}", organ.kind()))
                }
            },
        }
    }

    /// Broad kind of this resource
    #[must_use]
    pub const fn kind(self) -> DonationKind {
        match self {
            Self::Blood(_) => DonationKind::Blood,
            Self::Organ(_) => DonationKind::Organ,
            Self::Tissue(_) => DonationKind::Tissue,
        }
    }

    /// Blood type, if this is blood
    #[must_use]
    pub const fn blood_type(self) -> Option<BloodType> {
        match self {
            Self::Blood(t) => Some(t),
            Self::Organ(_) | Self::Tissue(_) => None,
        }
    }

    /// Organ or tissue type, if this is not blood
    #[must_use]
    pub const fn organ_type(self) -> Option<OrganType> {
        match self {
            Self::Blood(_) => None,
            Self::Organ(t) | Self::Tissue(t) => Some(t),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blood(t) => write!(f, "blood {t}"),
            Self::Organ(t) => write!(f, "organ {t}"),
            Self::Tissue(t) => write!(f, "tissue {t}"),
        }
    }
}
