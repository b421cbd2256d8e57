//! Tier threshold rows and the table that orders them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Tier;
use crate::error::{RulesError, ensure_non_negative};
use crate::rules::{self, TierProgress};

/// Minimum cumulative liters required to reach a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierThreshold {
    pub tier: Tier,
    pub minimum_liters: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Inactive tiers are skipped during resolution.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl TierThreshold {
    /// Create an active threshold with no cosmetic overrides.
    #[must_use]
    pub const fn new(tier: Tier, minimum_liters: Decimal) -> Self {
        Self {
            tier,
            minimum_liters,
            display_name: None,
            description: None,
            color: None,
            icon: None,
            is_active: true,
        }
    }

    /// Display name, falling back to the tier's default.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or(self.tier.presentation().display_name)
    }

    /// Badge color, falling back to the tier's default.
    #[must_use]
    pub fn color(&self) -> &str {
        self.color
            .as_deref()
            .unwrap_or(self.tier.presentation().color)
    }

    /// Icon identifier, falling back to the tier's default.
    #[must_use]
    pub fn icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(self.tier.presentation().icon)
    }
}

/// The tier requirements list.
///
/// List order is display order only. Resolution sorts by liters, so two
/// tables holding the same rows in a different order resolve identically
/// but still compare unequal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable(Vec<TierThreshold>);

impl TierTable {
    /// Wrap an existing list of thresholds.
    #[must_use]
    pub const fn new(thresholds: Vec<TierThreshold>) -> Self {
        Self(thresholds)
    }

    /// The program defaults: lead 0, silver 50, gold 80, platinum 100 liters.
    #[must_use]
    pub fn standard() -> Self {
        Self(vec![
            TierThreshold::new(Tier::Lead, Decimal::ZERO),
            TierThreshold::new(Tier::Silver, Decimal::from(50)),
            TierThreshold::new(Tier::Gold, Decimal::from(80)),
            TierThreshold::new(Tier::Platinum, Decimal::from(100)),
        ])
    }

    /// All rows in display order.
    #[must_use]
    pub fn thresholds(&self) -> &[TierThreshold] {
        &self.0
    }

    /// Mutable access to the rows, for editing.
    pub fn thresholds_mut(&mut self) -> &mut Vec<TierThreshold> {
        &mut self.0
    }

    /// Consume the table and return its rows.
    #[must_use]
    pub fn into_inner(self) -> Vec<TierThreshold> {
        self.0
    }

    /// Look up the row for a tier.
    #[must_use]
    pub fn get(&self, tier: Tier) -> Option<&TierThreshold> {
        self.0.iter().find(|t| t.tier == tier)
    }

    /// Mutable lookup of the row for a tier.
    pub fn get_mut(&mut self, tier: Tier) -> Option<&mut TierThreshold> {
        self.0.iter_mut().find(|t| t.tier == tier)
    }

    /// Active rows in display order.
    pub fn active(&self) -> impl Iterator<Item = &TierThreshold> {
        self.0.iter().filter(|t| t.is_active)
    }

    /// Tiers configured in this table, in display order.
    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.0.iter().map(|t| t.tier)
    }

    /// Activate or deactivate a tier. Rows are never removed.
    ///
    /// Returns `false` if the tier is not in the table.
    pub fn set_active(&mut self, tier: Tier, active: bool) -> bool {
        self.get_mut(tier).is_some_and(|row| {
            row.is_active = active;
            true
        })
    }

    /// Tier reached with the given cumulative liters.
    #[must_use]
    pub fn resolve(&self, cumulative_liters: Decimal) -> Tier {
        rules::resolve_tier(cumulative_liters, &self.0)
    }

    /// Current tier and distance to the next active tier.
    #[must_use]
    pub fn progress(&self, cumulative_liters: Decimal) -> TierProgress {
        rules::tier_progress(cumulative_liters, &self.0)
    }

    /// Check the table before it is saved.
    ///
    /// # Errors
    ///
    /// - `DuplicateTier` if a tier appears twice
    /// - `NegativeValue` if a minimum is negative
    /// - `InvalidThresholdOrder` if minimums decrease as rank increases
    /// - `NoActiveTier` if every row is inactive
    pub fn validate(&self) -> Result<(), RulesError> {
        let mut by_rank: Vec<&TierThreshold> = Vec::with_capacity(self.0.len());
        for row in &self.0 {
            if by_rank.iter().any(|seen| seen.tier == row.tier) {
                return Err(RulesError::DuplicateTier(row.tier));
            }
            ensure_non_negative(&format!("{} minimum liters", row.tier), row.minimum_liters)?;
            by_rank.push(row);
        }
        by_rank.sort_by_key(|row| row.tier);

        for pair in by_rank.windows(2) {
            if let [lower, higher] = pair
                && higher.minimum_liters < lower.minimum_liters
            {
                return Err(RulesError::InvalidThresholdOrder {
                    lower: lower.tier,
                    lower_minimum: lower.minimum_liters,
                    higher: higher.tier,
                    higher_minimum: higher.minimum_liters,
                });
            }
        }

        if self.active().next().is_none() {
            return Err(RulesError::NoActiveTier);
        }
        Ok(())
    }
}

impl From<Vec<TierThreshold>> for TierTable {
    fn from(thresholds: Vec<TierThreshold>) -> Self {
        Self(thresholds)
    }
}
