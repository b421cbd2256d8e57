//! The complete rule set as a single document.

use serde::{Deserialize, Serialize};

use super::{CashbackSettings, CommissionSettings, TierTable};
use crate::error::RulesError;

/// Tier requirements, commission settings and cashback settings together.
///
/// This is the shape of rule files on disk and of test fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesBundle {
    pub tier_requirements: TierTable,
    pub commission: CommissionSettings,
    pub cashback: CashbackSettings,
}

impl RulesBundle {
    /// Bundle with the program defaults.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            tier_requirements: TierTable::standard(),
            commission: CommissionSettings::default(),
            cashback: CashbackSettings::default(),
        }
    }

    /// Validate every part of the bundle against the tier table.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<(), RulesError> {
        self.tier_requirements.validate()?;
        self.commission.validate(&self.tier_requirements)?;
        self.cashback.validate(&self.tier_requirements)
    }
}
