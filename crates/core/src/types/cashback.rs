//! Customer cashback settings.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Tier, TierTable};
use crate::error::{RulesError, ensure_non_negative};

/// Per-tier cashback benefits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBenefit {
    /// Applied to the base cashback rate.
    pub multiplier: Decimal,
    #[serde(default)]
    pub min_purchase: Decimal,
    /// Extra percentage advertised for the tier.
    #[serde(default)]
    pub bonus_rate: Decimal,
    /// Liters needed to reach the next tier. `None` for the top tier.
    #[serde(default)]
    pub upgrade_requirement: Option<Decimal>,
}

impl TierBenefit {
    /// Benefit with only a multiplier set.
    #[must_use]
    pub const fn with_multiplier(multiplier: Decimal) -> Self {
        Self {
            multiplier,
            min_purchase: Decimal::ZERO,
            bonus_rate: Decimal::ZERO,
            upgrade_requirement: None,
        }
    }
}

/// Extra cashback unlocked by monthly volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBonus {
    /// Liters per month needed to unlock the bonus.
    pub threshold: Decimal,
    /// Percentage of the base cashback added on top.
    pub bonus: Decimal,
}

/// Bonuses layered on top of the base cashback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyProgram {
    pub enabled: bool,
    /// Percentage of base cashback for a consecutive-month streak.
    #[serde(default)]
    pub streak_bonus: Decimal,
    /// Flat amount credited for a referral.
    #[serde(default)]
    pub referral_bonus: Decimal,
    /// Flat amount credited during the birthday month.
    #[serde(default)]
    pub birthday_bonus: Decimal,
}

/// Cashback settings edited from the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashbackSettings {
    /// Percentage per liter before tier multipliers.
    pub base_cashback_rate: Decimal,
    pub tier_benefits: BTreeMap<Tier, TierBenefit>,
    /// Ordered by strictly increasing threshold.
    #[serde(default)]
    pub volume_bonuses: Vec<VolumeBonus>,
    #[serde(default)]
    pub loyalty_program: LoyaltyProgram,
}

impl Default for CashbackSettings {
    fn default() -> Self {
        let benefit = |multiplier: Decimal, upgrade: Option<i64>| TierBenefit {
            upgrade_requirement: upgrade.map(Decimal::from),
            ..TierBenefit::with_multiplier(multiplier)
        };
        Self {
            base_cashback_rate: Decimal::from(2),
            tier_benefits: BTreeMap::from([
                (Tier::Lead, benefit(Decimal::ONE, Some(50))),
                (Tier::Silver, benefit(Decimal::new(12, 1), Some(30))),
                (Tier::Gold, benefit(Decimal::new(15, 1), Some(20))),
                (Tier::Platinum, benefit(Decimal::from(2), None)),
            ]),
            volume_bonuses: vec![
                VolumeBonus {
                    threshold: Decimal::from(100),
                    bonus: Decimal::from(10),
                },
                VolumeBonus {
                    threshold: Decimal::from(250),
                    bonus: Decimal::from(20),
                },
            ],
            loyalty_program: LoyaltyProgram::default(),
        }
    }
}

impl CashbackSettings {
    /// Benefits for a tier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTier` if the tier has no benefit entry.
    pub fn benefit(&self, tier: Tier) -> Result<&TierBenefit, RulesError> {
        self.tier_benefits
            .get(&tier)
            .ok_or(RulesError::InvalidTier(tier))
    }

    /// Highest volume bonus unlocked by the monthly liters, if any.
    #[must_use]
    pub fn volume_bonus_for(&self, monthly_liters: Decimal) -> Option<&VolumeBonus> {
        self.volume_bonuses
            .iter()
            .filter(|vb| vb.threshold <= monthly_liters)
            .max_by_key(|vb| vb.threshold)
    }

    /// Check the settings against the tier table before saving.
    ///
    /// # Errors
    ///
    /// Returns `NegativeValue` for negative rates or bonuses,
    /// `VolumeBonusOrder` when volume thresholds do not strictly increase,
    /// and `InvalidTier` when a configured tier has no benefit entry.
    pub fn validate(&self, tiers: &TierTable) -> Result<(), RulesError> {
        ensure_non_negative("base cashback rate", self.base_cashback_rate)?;
        for (tier, benefit) in &self.tier_benefits {
            ensure_non_negative(&format!("{tier} multiplier"), benefit.multiplier)?;
            ensure_non_negative(&format!("{tier} minimum purchase"), benefit.min_purchase)?;
            ensure_non_negative(&format!("{tier} bonus rate"), benefit.bonus_rate)?;
        }

        for bonus in &self.volume_bonuses {
            ensure_non_negative("volume bonus threshold", bonus.threshold)?;
            ensure_non_negative("volume bonus", bonus.bonus)?;
        }
        for pair in self.volume_bonuses.windows(2) {
            if let [previous, next] = pair
                && next.threshold <= previous.threshold
            {
                return Err(RulesError::VolumeBonusOrder {
                    previous: previous.threshold,
                    next: next.threshold,
                });
            }
        }

        let program = &self.loyalty_program;
        ensure_non_negative("streak bonus", program.streak_bonus)?;
        ensure_non_negative("referral bonus", program.referral_bonus)?;
        ensure_non_negative("birthday bonus", program.birthday_bonus)?;

        for tier in tiers.tiers() {
            self.benefit(tier)?;
        }
        Ok(())
    }
}
