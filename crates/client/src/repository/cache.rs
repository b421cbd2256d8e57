//! Cache types for settings responses.

use aqua_rewards_core::{CashbackSettings, CommissionSettings, TierTable};

/// Cache key for each settings document.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    TierRequirements,
    CommissionSettings,
    CashbackSettings,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    TierRequirements(TierTable),
    CommissionSettings(Box<CommissionSettings>),
    CashbackSettings(Box<CashbackSettings>),
}
