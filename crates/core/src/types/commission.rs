//! Influencer commission settings.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Tier, TierTable};
use crate::error::{RulesError, ensure_non_negative};

/// Commission settings edited from the admin dashboard.
///
/// Percentages are whole numbers: a `base_commission_rate` of `5` means 5%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSettings {
    /// Percentage of the sale amount paid before tier multipliers.
    pub base_commission_rate: Decimal,
    /// Currency paid per liter sold.
    pub cashback_rate: Decimal,
    pub tier_multipliers: BTreeMap<Tier, Decimal>,
    /// Minimum balance before an influencer can request a payout.
    #[serde(default)]
    pub payout_threshold: Decimal,
    /// Upper bound on commission. `None` means uncapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_cap: Option<Decimal>,
    #[serde(default)]
    pub minimum_active_users: u32,
}

impl Default for CommissionSettings {
    fn default() -> Self {
        Self {
            base_commission_rate: Decimal::from(5),
            cashback_rate: Decimal::new(5, 2),
            tier_multipliers: BTreeMap::from([
                (Tier::Lead, Decimal::ONE),
                (Tier::Silver, Decimal::new(12, 1)),
                (Tier::Gold, Decimal::new(15, 1)),
                (Tier::Platinum, Decimal::from(2)),
            ]),
            payout_threshold: Decimal::from(50),
            commission_cap: None,
            minimum_active_users: 0,
        }
    }
}

impl CommissionSettings {
    /// Multiplier for a tier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTier` if the tier has no multiplier.
    pub fn multiplier(&self, tier: Tier) -> Result<Decimal, RulesError> {
        self.tier_multipliers
            .get(&tier)
            .copied()
            .ok_or(RulesError::InvalidTier(tier))
    }

    /// Whether an accrued balance has reached the payout threshold.
    #[must_use]
    pub fn is_payout_eligible(&self, balance: Decimal) -> bool {
        balance >= self.payout_threshold
    }

    /// Whether an influencer has enough active referred users to earn.
    #[must_use]
    pub const fn meets_minimum_active_users(&self, active_users: u32) -> bool {
        active_users >= self.minimum_active_users
    }

    /// Check the settings against the tier table before saving.
    ///
    /// # Errors
    ///
    /// Returns `NegativeValue` for a negative rate, threshold, cap or
    /// multiplier, and `InvalidTier` when a configured tier has no multiplier.
    pub fn validate(&self, tiers: &TierTable) -> Result<(), RulesError> {
        ensure_non_negative("base commission rate", self.base_commission_rate)?;
        ensure_non_negative("cashback rate", self.cashback_rate)?;
        ensure_non_negative("payout threshold", self.payout_threshold)?;
        if let Some(cap) = self.commission_cap {
            ensure_non_negative("commission cap", cap)?;
        }
        for (tier, multiplier) in &self.tier_multipliers {
            ensure_non_negative(&format!("{tier} multiplier"), *multiplier)?;
        }
        for tier in tiers.tiers() {
            self.multiplier(tier)?;
        }
        Ok(())
    }
}
