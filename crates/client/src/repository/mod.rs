//! Settings repositories.
//!
//! The rules engine never fetches anything itself. A [`SettingsRepository`]
//! owns fetching, caching and persisting settings, and callers pass the
//! loaded values into the pure functions of `aqua-rewards-core`.
//!
//! Saves are last-write-wins: the backend offers no version check, so two
//! admins editing the same settings overwrite each other.

mod cache;
mod http;

pub use http::HttpSettingsRepository;

use std::future::Future;

use aqua_rewards_core::{CashbackSettings, CommissionSettings, TierTable};

use crate::error::ApiError;
use crate::overview::CashbackOverview;

/// Source of persisted loyalty settings.
pub trait SettingsRepository: Send + Sync {
    /// `GET /tier-requirements`
    fn tier_requirements(&self) -> impl Future<Output = Result<TierTable, ApiError>> + Send;

    /// `PUT /tier-requirements`, returning the canonical copy.
    fn save_tier_requirements(
        &self,
        table: &TierTable,
    ) -> impl Future<Output = Result<TierTable, ApiError>> + Send;

    /// `GET /commission-settings`
    fn commission_settings(
        &self,
    ) -> impl Future<Output = Result<CommissionSettings, ApiError>> + Send;

    /// `POST /commission-settings`, returning the canonical copy.
    fn save_commission_settings(
        &self,
        settings: &CommissionSettings,
    ) -> impl Future<Output = Result<CommissionSettings, ApiError>> + Send;

    /// `GET /cashback-settings`
    fn cashback_settings(&self)
    -> impl Future<Output = Result<CashbackSettings, ApiError>> + Send;

    /// `PUT /cashback-settings`, returning the canonical copy.
    fn save_cashback_settings(
        &self,
        settings: &CashbackSettings,
    ) -> impl Future<Output = Result<CashbackSettings, ApiError>> + Send;

    /// `GET /cashback/stats/overview`. Never cached.
    fn cashback_overview(&self) -> impl Future<Output = Result<CashbackOverview, ApiError>> + Send;
}
