//! Read-only cashback statistics shown on the dashboard.

use std::collections::BTreeMap;

use aqua_rewards_core::Tier;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Response of `GET /cashback/stats/overview`.
///
/// Every field defaults when the backend omits it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashbackOverview {
    pub total_cashback_paid: Decimal,
    pub total_liters: Decimal,
    pub active_users: u64,
    pub pending_payouts: Decimal,
    pub users_by_tier: BTreeMap<Tier, u64>,
}

impl CashbackOverview {
    /// Average cashback paid per active user, or zero with no users.
    #[must_use]
    pub fn average_cashback_per_user(&self) -> Decimal {
        if self.active_users == 0 {
            return Decimal::ZERO;
        }
        (self.total_cashback_paid / Decimal::from(self.active_users))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
