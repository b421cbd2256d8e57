//! Influencer commission calculation.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::RulesError;
use crate::types::{CommissionSettings, Tier};

/// Commission earned on a single sale by an influencer whose referred user
/// holds `tier`.
///
/// `effective_rate = base_commission_rate * multiplier / 100`, and the result
/// is `sale_amount * effective_rate`, clamped to the commission cap when one
/// is set. The amount is exact and unrounded, so it stays linear in
/// `sale_amount` below the cap. Tracking the cap across a month is the job of
/// [`MonthlyCommissionLedger`].
///
/// # Errors
///
/// Returns `InvalidTier` if the tier has no multiplier. A missing entry never
/// falls back to 1x.
pub fn calculate_commission(
    sale_amount: Decimal,
    tier: Tier,
    settings: &CommissionSettings,
) -> Result<Decimal, RulesError> {
    let multiplier = settings.multiplier(tier)?;
    let effective_rate = settings.base_commission_rate * multiplier / Decimal::ONE_HUNDRED;
    let commission = sale_amount * effective_rate;

    Ok(match settings.commission_cap {
        Some(cap) if commission > cap => cap,
        _ => commission,
    })
}

/// Month-to-date commission accrual for one influencer.
///
/// Applies the commission cap to the running monthly total rather than to
/// individual sales. Each calendar month accrues separately, so a new month
/// starts from zero and sales may be recorded out of order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyCommissionLedger {
    accrued: BTreeMap<(i32, u32), Decimal>,
}

impl MonthlyCommissionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commission accrued in the month containing `date`.
    #[must_use]
    pub fn accrued(&self, date: NaiveDate) -> Decimal {
        self.accrued
            .get(&month_key(date))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Record a sale and return the commission credited for it.
    ///
    /// The credit is the sale's commission limited to whatever headroom is
    /// left under the cap for that month.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTier` if the tier has no multiplier. Nothing is
    /// recorded in that case.
    pub fn record(
        &mut self,
        date: NaiveDate,
        sale_amount: Decimal,
        tier: Tier,
        settings: &CommissionSettings,
    ) -> Result<Decimal, RulesError> {
        let commission = calculate_commission(sale_amount, tier, settings)?;
        let accrued = self.accrued.entry(month_key(date)).or_insert(Decimal::ZERO);

        let credited = match settings.commission_cap {
            Some(cap) => commission.min((cap - *accrued).max(Decimal::ZERO)),
            None => commission,
        };
        *accrued += credited;
        Ok(credited)
    }
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
