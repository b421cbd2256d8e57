//! Aqua Rewards Core - Tier, commission and cashback rules engine.
//!
//! This crate holds the loyalty rules shared by every Aqua Rewards
//! component:
//! - tier thresholds and the resolver mapping cumulative liters to a tier
//! - commission and cashback calculators driven by tier multipliers
//! - dirty-state tracking for settings edited before a save
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no shared state. Settings are fetched and persisted by
//! `aqua-rewards-client` and handed in here by reference.
//!
//! All amounts, rates and liters are [`rust_decimal::Decimal`]. Percentages
//! are whole numbers: `5` means 5%.
//!
//! # Modules
//!
//! - [`types`] - Tiers, threshold tables and settings records
//! - [`rules`] - Resolver, progression, commission and cashback calculators
//! - [`draft`] - Change detection between edited and persisted settings
//! - [`error`] - [`RulesError`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod draft;
pub mod error;
pub mod rules;
pub mod types;

pub use draft::{SettingsDraft, has_changed};
pub use error::RulesError;
pub use rules::{
    CashbackBreakdown, CashbackContext, DowngradePolicy, MonthlyCommissionLedger, TierProgress,
    TierTransition, apply_transition, calculate_cashback, calculate_commission,
    cashback_breakdown, referral_award, resolve_tier, tier_progress,
};
pub use types::{
    CashbackSettings, CommissionSettings, LoyaltyProgram, RulesBundle, Tier, TierBenefit,
    TierParseError, TierPresentation, TierTable, TierThreshold, VolumeBonus,
};
