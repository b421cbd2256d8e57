//! Cumulative liters to tier resolution.

use rust_decimal::Decimal;

use crate::types::{Tier, TierThreshold};

/// Resolve the tier reached with `cumulative_liters`.
///
/// Only active rows take part. A row qualifies when its minimum is at or
/// below the liters (the boundary is inclusive), and the highest-ranked
/// qualifying tier wins. For a validated table this is the same as walking
/// the rows from the largest minimum down and taking the first match, and
/// it keeps the result non-decreasing in liters even for unvalidated input.
///
/// When nothing qualifies the lowest-ranked active tier is returned, or
/// [`Tier::Lead`] if no row is active. A user is never left without a tier.
#[must_use]
pub fn resolve_tier(cumulative_liters: Decimal, thresholds: &[TierThreshold]) -> Tier {
    thresholds
        .iter()
        .filter(|t| t.is_active && t.minimum_liters <= cumulative_liters)
        .map(|t| t.tier)
        .max()
        .unwrap_or_else(|| fallback_tier(thresholds))
}

/// Lowest-ranked active tier, or `Lead` when nothing is active.
#[must_use]
pub fn fallback_tier(thresholds: &[TierThreshold]) -> Tier {
    thresholds
        .iter()
        .filter(|t| t.is_active)
        .map(|t| t.tier)
        .min()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::TierTable;

    fn liters(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_standard_table_scenario() {
        let table = TierTable::standard();
        assert_eq!(table.resolve(liters(80)), Tier::Gold);
        assert_eq!(table.resolve(liters(79)), Tier::Silver);
        assert_eq!(table.resolve(liters(100)), Tier::Platinum);
        assert_eq!(table.resolve(liters(5_000)), Tier::Platinum);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let table = TierTable::standard();
        for row in table.thresholds() {
            assert_eq!(table.resolve(row.minimum_liters), row.tier);
        }
    }

    #[test]
    fn test_fractional_liters_below_boundary() {
        let table = TierTable::standard();
        assert_eq!(table.resolve(Decimal::new(4999, 2)), Tier::Lead);
        assert_eq!(table.resolve(Decimal::new(5000, 2)), Tier::Silver);
    }

    #[test]
    fn test_zero_liters_returns_lowest_active_tier() {
        assert_eq!(TierTable::standard().resolve(Decimal::ZERO), Tier::Lead);

        let mut table = TierTable::standard();
        table.set_active(Tier::Lead, false);
        assert_eq!(table.resolve(Decimal::ZERO), Tier::Silver);
    }

    #[test]
    fn test_inactive_tiers_are_skipped() {
        let mut table = TierTable::standard();
        table.set_active(Tier::Gold, false);
        assert_eq!(table.resolve(liters(85)), Tier::Silver);
        assert_eq!(table.resolve(liters(100)), Tier::Platinum);
    }

    #[test]
    fn test_no_active_tier_defaults_to_lead() {
        let mut table = TierTable::standard();
        for tier in Tier::ALL {
            table.set_active(tier, false);
        }
        assert_eq!(table.resolve(liters(1_000)), Tier::Lead);
        assert_eq!(resolve_tier(liters(10), &[]), Tier::Lead);
    }

    #[test]
    fn test_list_order_does_not_matter() {
        let mut rows = TierTable::standard().into_inner();
        rows.reverse();
        let table = TierTable::new(rows);
        assert_eq!(table.resolve(liters(80)), Tier::Gold);
        assert_eq!(table.resolve(liters(10)), Tier::Lead);
    }

    #[test]
    fn test_equal_minimums_pick_higher_rank() {
        let table = TierTable::new(vec![
            TierThreshold::new(Tier::Lead, liters(0)),
            TierThreshold::new(Tier::Silver, liters(50)),
            TierThreshold::new(Tier::Gold, liters(50)),
        ]);
        assert_eq!(table.resolve(liters(50)), Tier::Gold);
    }

    #[test]
    fn test_resolution_is_monotonic_in_liters() {
        let tables = [
            TierTable::standard(),
            // Deliberately out of order: gold below silver.
            TierTable::new(vec![
                TierThreshold::new(Tier::Lead, liters(0)),
                TierThreshold::new(Tier::Silver, liters(50)),
                TierThreshold::new(Tier::Gold, liters(40)),
                TierThreshold::new(Tier::Platinum, liters(120)),
            ]),
        ];

        for table in &tables {
            let mut previous = table.resolve(Decimal::ZERO);
            for step in 0..=300 {
                let tier = table.resolve(Decimal::new(step * 5, 1));
                assert!(tier >= previous, "tier dropped at {step}");
                previous = tier;
            }
        }
    }
}
