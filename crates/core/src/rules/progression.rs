//! Progress toward the next tier and tier transitions.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::resolve_tier;
use crate::types::{Tier, TierThreshold};

/// Where a user stands relative to the next tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierProgress {
    pub current: Tier,
    /// Next active tier up, `None` at the top.
    pub next: Option<Tier>,
    /// Liters still needed to reach `next`.
    pub liters_to_next: Option<Decimal>,
    /// Share of the gap between the current and next tier already covered,
    /// from 0 to 1. Always 1 at the top.
    pub fraction: Decimal,
}

/// Compute progress for `cumulative_liters` against the threshold rows.
#[must_use]
pub fn tier_progress(cumulative_liters: Decimal, thresholds: &[TierThreshold]) -> TierProgress {
    let current = resolve_tier(cumulative_liters, thresholds);

    let next = thresholds
        .iter()
        .filter(|t| t.is_active && t.tier > current)
        .min_by_key(|t| t.tier);

    let Some(next) = next else {
        return TierProgress {
            current,
            next: None,
            liters_to_next: None,
            fraction: Decimal::ONE,
        };
    };

    let floor = thresholds
        .iter()
        .find(|t| t.tier == current)
        .map_or(Decimal::ZERO, |t| t.minimum_liters);
    let span = next.minimum_liters - floor;
    let fraction = if span > Decimal::ZERO {
        ((cumulative_liters - floor) / span)
            .clamp(Decimal::ZERO, Decimal::ONE)
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    TierProgress {
        current,
        next: Some(next.tier),
        liters_to_next: Some((next.minimum_liters - cumulative_liters).max(Decimal::ZERO)),
        fraction,
    }
}

/// What to do when recomputation yields a lower tier than before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DowngradePolicy {
    /// Keep the previous tier. Tiers only ever move up.
    #[default]
    Retain,
    /// Move the user down to the recomputed tier.
    Allow,
}

/// Outcome of recomputing a user's tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierTransition {
    Unchanged { tier: Tier },
    Upgraded { from: Tier, to: Tier },
    Downgraded { from: Tier, to: Tier },
    /// The recomputed tier was lower but the policy kept the old one.
    Retained { tier: Tier, resolved: Tier },
}

impl TierTransition {
    /// Tier the user holds after the transition.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        match *self {
            Self::Unchanged { tier } | Self::Retained { tier, .. } => tier,
            Self::Upgraded { to, .. } | Self::Downgraded { to, .. } => to,
        }
    }
}

/// Classify the move from `previous` to a freshly `resolved` tier.
#[must_use]
pub fn apply_transition(previous: Tier, resolved: Tier, policy: DowngradePolicy) -> TierTransition {
    match resolved.cmp(&previous) {
        std::cmp::Ordering::Equal => TierTransition::Unchanged { tier: previous },
        std::cmp::Ordering::Greater => TierTransition::Upgraded {
            from: previous,
            to: resolved,
        },
        std::cmp::Ordering::Less => match policy {
            DowngradePolicy::Retain => TierTransition::Retained {
                tier: previous,
                resolved,
            },
            DowngradePolicy::Allow => TierTransition::Downgraded {
                from: previous,
                to: resolved,
            },
        },
    }
}
