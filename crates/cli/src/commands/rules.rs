//! Calculations against a loaded rules bundle.
//!
//! # Usage
//!
//! ```bash
//! aqua-cli resolve-tier 85
//! aqua-cli commission 1000 --liters 85 --date 2024-06-01
//! aqua-cli cashback 10 --tier silver --monthly 120 --streak
//! aqua-cli progress 45 --previous gold
//! aqua-cli --file bundle.yaml validate
//! ```

use aqua_rewards_core::{
    CashbackContext, DowngradePolicy, MonthlyCommissionLedger, RulesBundle, Tier, TierTransition,
    apply_transition, cashback_breakdown, referral_award, resolve_tier as resolve,
    tier_progress,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::CliError;

/// Inputs for a cashback calculation.
#[derive(Debug, Clone)]
pub struct CashbackRequest {
    pub liters: Decimal,
    pub tier: Tier,
    pub monthly_liters: Decimal,
    pub streak: bool,
    pub birthday: Option<NaiveDate>,
    pub today: NaiveDate,
}

/// Use the explicit tier, or resolve one from cumulative liters.
#[must_use]
pub fn pick_tier(bundle: &RulesBundle, tier: Option<Tier>, cumulative: Option<Decimal>) -> Tier {
    tier.unwrap_or_else(|| {
        resolve(
            cumulative.unwrap_or(Decimal::ZERO),
            bundle.tier_requirements.thresholds(),
        )
    })
}

/// Resolve and describe the tier for cumulative liters.
pub fn resolve_tier(bundle: &RulesBundle, liters: Decimal) -> Tier {
    let tier = resolve(liters, bundle.tier_requirements.thresholds());
    let (name, color, icon) = bundle.tier_requirements.get(tier).map_or_else(
        || {
            let p = tier.presentation();
            (p.display_name, p.color, p.icon)
        },
        |t| (t.display_name(), t.color(), t.icon()),
    );

    info!(%liters, %tier, name, color, icon, "Resolved tier");
    tier
}

/// Record sales in a monthly ledger and report the credited commission.
///
/// # Errors
///
/// Returns `Rules` if the tier has no commission multiplier.
pub fn commission(
    bundle: &RulesBundle,
    sales: &[Decimal],
    tier: Tier,
    date: NaiveDate,
) -> Result<Decimal, CliError> {
    let settings = &bundle.commission;
    let mut ledger = MonthlyCommissionLedger::new();

    for &sale in sales {
        let credited = ledger.record(date, sale, tier, settings)?;
        info!(%sale, %tier, %credited, "Commission");
    }

    let total = ledger.accrued(date);
    info!(
        %total,
        cap = ?settings.commission_cap,
        payout_eligible = settings.is_payout_eligible(total),
        payout_threshold = %settings.payout_threshold,
        "Monthly commission"
    );
    Ok(total)
}

/// Report cashback and its components.
///
/// # Errors
///
/// Returns `Rules` if the tier has no cashback benefit.
pub fn cashback(bundle: &RulesBundle, request: &CashbackRequest) -> Result<Decimal, CliError> {
    let context = CashbackContext::for_month(
        request.monthly_liters,
        request.streak,
        request.birthday,
        request.today,
    );
    let breakdown = cashback_breakdown(request.liters, request.tier, &bundle.cashback, &context)?;

    info!(
        liters = %request.liters,
        tier = %request.tier,
        base = %breakdown.base,
        volume_bonus = %breakdown.volume_bonus,
        streak_bonus = %breakdown.streak_bonus,
        birthday_bonus = %breakdown.birthday_bonus,
        total = %breakdown.total,
        "Cashback"
    );

    if bundle.cashback.loyalty_program.enabled {
        info!(award = %referral_award(&bundle.cashback), "Referral award");
    }
    Ok(breakdown.total)
}

/// Report progress toward the next tier.
pub fn progress(
    bundle: &RulesBundle,
    liters: Decimal,
    previous: Option<Tier>,
    allow_downgrade: bool,
) -> Option<TierTransition> {
    let progress = tier_progress(liters, bundle.tier_requirements.thresholds());

    match (progress.next, progress.liters_to_next) {
        (Some(next), Some(remaining)) => info!(
            current = %progress.current,
            %next,
            %remaining,
            fraction = %progress.fraction,
            "Progress"
        ),
        _ => info!(current = %progress.current, "Top tier reached"),
    }

    let policy = if allow_downgrade {
        DowngradePolicy::Allow
    } else {
        DowngradePolicy::Retain
    };
    let transition = previous.map(|previous| apply_transition(previous, progress.current, policy));

    if let Some(transition) = transition {
        match transition {
            TierTransition::Retained { tier, resolved } => {
                info!(%tier, %resolved, "Tier retained");
            }
            other => info!(tier = %other.tier(), ?other, "Tier transition"),
        }
    }
    transition
}

/// Validate every settings document in the bundle.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn validate(bundle: &RulesBundle) -> Result<(), CliError> {
    if let Err(e) = bundle.validate() {
        warn!(error = %e, "Rules bundle is invalid");
        return Err(e.into());
    }

    for threshold in bundle.tier_requirements.active() {
        info!(
            tier = %threshold.tier,
            minimum_liters = %threshold.minimum_liters,
            name = threshold.display_name(),
            "Active tier"
        );
    }
    info!("Rules bundle is valid");
    Ok(())
}
