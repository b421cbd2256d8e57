//! Loyalty tier ranks and their presentation.

use serde::{Deserialize, Serialize};

/// A loyalty rank unlocked by cumulative purchase volume.
///
/// Variants are declared in rank order, so the derived `Ord` gives
/// `Lead < Silver < Gold < Platinum`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Entry tier every user starts in.
    #[default]
    Lead,
    Silver,
    Gold,
    /// Top tier. Has no upgrade requirement.
    Platinum,
}

impl Tier {
    /// All tiers, lowest rank first.
    pub const ALL: [Self; 4] = [Self::Lead, Self::Silver, Self::Gold, Self::Platinum];

    /// Zero-based rank of this tier.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Lead => 0,
            Self::Silver => 1,
            Self::Gold => 2,
            Self::Platinum => 3,
        }
    }

    /// The next tier up, or `None` for the top tier.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Lead => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Default display metadata for this tier.
    #[must_use]
    pub const fn presentation(self) -> TierPresentation {
        match self {
            Self::Lead => TierPresentation {
                display_name: "Lead",
                color: "#6B7280",
                icon: "droplet",
            },
            Self::Silver => TierPresentation {
                display_name: "Silver",
                color: "#9CA3AF",
                icon: "medal",
            },
            Self::Gold => TierPresentation {
                display_name: "Gold",
                color: "#F59E0B",
                icon: "trophy",
            },
            Self::Platinum => TierPresentation {
                display_name: "Platinum",
                color: "#8B5CF6",
                icon: "crown",
            },
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tier: {0}")]
pub struct TierParseError(pub String);

impl std::str::FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lead" => Ok(Self::Lead),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

/// Display metadata for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPresentation {
    pub display_name: &'static str,
    /// Hex color used for badges and charts.
    pub color: &'static str,
    /// Icon identifier.
    pub icon: &'static str,
}
