//! Customer cashback calculation.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::RulesError;
use crate::types::{CashbackSettings, Tier};

/// Caller-supplied facts about the customer's month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CashbackContext {
    /// Liters bought so far this month, used for volume bonuses.
    pub monthly_liters: Decimal,
    /// The customer has bought in consecutive months.
    pub streak: bool,
    /// The current month is the customer's birthday month.
    pub birthday_month: bool,
}

impl CashbackContext {
    /// Build a context, deriving the birthday flag from dates.
    #[must_use]
    pub fn for_month(
        monthly_liters: Decimal,
        streak: bool,
        birthday: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        Self {
            monthly_liters,
            streak,
            birthday_month: birthday.is_some_and(|b| b.month() == today.month()),
        }
    }
}

/// Cashback split into its parts.
///
/// Components are unrounded; `total` is rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CashbackBreakdown {
    pub base: Decimal,
    pub volume_bonus: Decimal,
    pub streak_bonus: Decimal,
    pub birthday_bonus: Decimal,
    pub total: Decimal,
}

/// Compute each part of the cashback for a purchase.
///
/// - base: `liters * base_cashback_rate * multiplier / 100`
/// - volume bonus: the highest tier of `volume_bonuses` reached by
///   `context.monthly_liters`, as a percentage of base
/// - streak bonus: percentage of base, loyalty program only
/// - birthday bonus: flat amount, loyalty program only
///
/// A purchase of zero liters earns nothing, flat bonuses included, whatever
/// the tier or settings. Negative liters are a caller error and are not
/// checked here.
///
/// # Errors
///
/// Returns `InvalidTier` if the tier has no benefit entry and liters are
/// non-zero.
pub fn cashback_breakdown(
    liters: Decimal,
    tier: Tier,
    settings: &CashbackSettings,
    context: &CashbackContext,
) -> Result<CashbackBreakdown, RulesError> {
    if liters.is_zero() {
        return Ok(CashbackBreakdown::default());
    }
    let benefit = settings.benefit(tier)?;

    let base = liters * settings.base_cashback_rate * benefit.multiplier / Decimal::ONE_HUNDRED;

    let volume_bonus = settings
        .volume_bonus_for(context.monthly_liters)
        .map_or(Decimal::ZERO, |vb| base * vb.bonus / Decimal::ONE_HUNDRED);

    let program = &settings.loyalty_program;
    let streak_bonus = if program.enabled && context.streak {
        base * program.streak_bonus / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let birthday_bonus = if program.enabled && context.birthday_month {
        program.birthday_bonus
    } else {
        Decimal::ZERO
    };

    let total = round_currency(base + volume_bonus + streak_bonus + birthday_bonus);

    Ok(CashbackBreakdown {
        base,
        volume_bonus,
        streak_bonus,
        birthday_bonus,
        total,
    })
}

/// Cashback awarded for a purchase, rounded to cents.
///
/// # Errors
///
/// Returns `InvalidTier` if the tier has no benefit entry.
pub fn calculate_cashback(
    liters: Decimal,
    tier: Tier,
    settings: &CashbackSettings,
    context: &CashbackContext,
) -> Result<Decimal, RulesError> {
    Ok(cashback_breakdown(liters, tier, settings, context)?.total)
}

/// Flat amount credited for a successful referral.
#[must_use]
pub fn referral_award(settings: &CashbackSettings) -> Decimal {
    let program = &settings.loyalty_program;
    if program.enabled {
        round_currency(program.referral_bonus)
    } else {
        Decimal::ZERO
    }
}

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{LoyaltyProgram, TierBenefit};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn loyalty_settings() -> CashbackSettings {
        CashbackSettings {
            loyalty_program: LoyaltyProgram {
                enabled: true,
                streak_bonus: dec("5"),
                referral_bonus: dec("10"),
                birthday_bonus: dec("3.50"),
            },
            ..CashbackSettings::default()
        }
    }

    #[test]
    fn test_silver_scenario_without_volume_bonus() {
        let settings = CashbackSettings::default();
        let context = CashbackContext {
            monthly_liters: dec("50"),
            ..CashbackContext::default()
        };
        let cashback = calculate_cashback(dec("50"), Tier::Silver, &settings, &context).unwrap();
        assert_eq!(cashback, dec("1.20"));
    }

    #[test]
    fn test_volume_bonus_uses_monthly_liters() {
        let settings = CashbackSettings::default();
        let context = CashbackContext {
            monthly_liters: dec("120"),
            ..CashbackContext::default()
        };
        let breakdown =
            cashback_breakdown(dec("50"), Tier::Silver, &settings, &context).unwrap();
        assert_eq!(breakdown.base, dec("1.2"));
        assert_eq!(breakdown.volume_bonus, dec("0.12"));
        assert_eq!(breakdown.total, dec("1.32"));
    }

    #[test]
    fn test_highest_volume_bonus_applies() {
        let settings = CashbackSettings::default();
        let context = CashbackContext {
            monthly_liters: dec("300"),
            ..CashbackContext::default()
        };
        let breakdown = cashback_breakdown(dec("100"), Tier::Lead, &settings, &context).unwrap();
        // base 2.00, +20%
        assert_eq!(breakdown.volume_bonus, dec("0.4"));
        assert_eq!(breakdown.total, dec("2.40"));
    }

    #[test]
    fn test_zero_liters_yields_zero() {
        let settings = loyalty_settings();
        let context = CashbackContext {
            monthly_liters: dec("500"),
            streak: true,
            birthday_month: true,
        };
        for tier in Tier::ALL {
            let cashback = calculate_cashback(Decimal::ZERO, tier, &settings, &context).unwrap();
            assert_eq!(cashback, Decimal::ZERO);
        }
    }

    #[test]
    fn test_loyalty_bonuses() {
        let settings = loyalty_settings();
        let context = CashbackContext {
            monthly_liters: Decimal::ZERO,
            streak: true,
            birthday_month: true,
        };
        let breakdown = cashback_breakdown(dec("50"), Tier::Gold, &settings, &context).unwrap();
        // base = 50 * 2 * 1.5 / 100 = 1.5
        assert_eq!(breakdown.base, dec("1.5"));
        assert_eq!(breakdown.streak_bonus, dec("0.075"));
        assert_eq!(breakdown.birthday_bonus, dec("3.50"));
        assert_eq!(breakdown.total, dec("5.08"));
    }

    #[test]
    fn test_loyalty_bonuses_ignored_when_disabled() {
        let mut settings = loyalty_settings();
        settings.loyalty_program.enabled = false;
        let context = CashbackContext {
            streak: true,
            birthday_month: true,
            ..CashbackContext::default()
        };
        let cashback = calculate_cashback(dec("50"), Tier::Gold, &settings, &context).unwrap();
        assert_eq!(cashback, dec("1.50"));
    }

    #[test]
    fn test_rounding_to_cents() {
        let mut settings = CashbackSettings::default();
        settings
            .tier_benefits
            .insert(Tier::Lead, TierBenefit::with_multiplier(Decimal::ONE));
        settings.base_cashback_rate = dec("1.25");
        // 0.3 * 1.25 / 100 = 0.00375
        let cashback = calculate_cashback(
            dec("0.3"),
            Tier::Lead,
            &settings,
            &CashbackContext::default(),
        )
        .unwrap();
        assert_eq!(cashback, dec("0.00"));

        // 1 * 1.25 / 100 = 0.0125 -> 0.01
        let cashback =
            calculate_cashback(Decimal::ONE, Tier::Lead, &settings, &CashbackContext::default())
                .unwrap();
        assert_eq!(cashback, dec("0.01"));
    }

    #[test]
    fn test_missing_benefit_is_an_error() {
        let mut settings = CashbackSettings::default();
        settings.tier_benefits.remove(&Tier::Platinum);
        assert_eq!(
            calculate_cashback(
                dec("10"),
                Tier::Platinum,
                &settings,
                &CashbackContext::default()
            ),
            Err(RulesError::InvalidTier(Tier::Platinum))
        );
    }

    #[test]
    fn test_zero_liters_without_benefit_entry() {
        let mut settings = CashbackSettings::default();
        settings.tier_benefits.clear();
        let context = CashbackContext {
            birthday_month: true,
            ..CashbackContext::default()
        };
        assert_eq!(
            calculate_cashback(Decimal::ZERO, Tier::Gold, &settings, &context),
            Ok(Decimal::ZERO)
        );
    }

    #[test]
    fn test_referral_award() {
        assert_eq!(referral_award(&loyalty_settings()), dec("10"));
        assert_eq!(referral_award(&CashbackSettings::default()), Decimal::ZERO);
    }

    #[test]
    fn test_context_for_month() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let birthday = NaiveDate::from_ymd_opt(1990, 10, 2).unwrap();
        let context = CashbackContext::for_month(dec("40"), true, Some(birthday), today);
        assert!(context.birthday_month);
        assert!(context.streak);

        let other = NaiveDate::from_ymd_opt(1990, 4, 2).unwrap();
        assert!(!CashbackContext::for_month(dec("40"), false, Some(other), today).birthday_month);
        assert!(!CashbackContext::for_month(dec("40"), false, None, today).birthday_month);
    }
}
