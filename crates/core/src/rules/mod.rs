//! Pure rule evaluation over loaded settings.
//!
//! Nothing here performs I/O or holds shared state; every function can be
//! called from any thread or task without locking.

pub mod cashback;
pub mod commission;
pub mod progression;
pub mod resolver;

pub use cashback::{
    CashbackBreakdown, CashbackContext, calculate_cashback, cashback_breakdown, referral_award,
};
pub use commission::{MonthlyCommissionLedger, calculate_commission};
pub use progression::{DowngradePolicy, TierProgress, TierTransition, apply_transition, tier_progress};
pub use resolver::{fallback_tier, resolve_tier};
