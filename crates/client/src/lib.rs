//! Aqua Rewards Client - Settings backend access for the loyalty rules engine.
//!
//! # Architecture
//!
//! - [`repository`] - [`SettingsRepository`] trait and its cached REST implementation
//! - [`editor`] - Draft editing with no-op detection and validated saves
//! - [`poll`] - Background refresh of the cashback overview
//! - [`config`] - Environment configuration with a redacted API token
//!
//! The rules themselves live in `aqua-rewards-core`; this crate only moves
//! settings between the backend and those pure functions.
//!
//! # Example
//!
//! ```rust,ignore
//! use aqua_rewards_client::{ClientConfig, HttpSettingsRepository, SettingsRepository};
//! use aqua_rewards_core::resolve_tier;
//!
//! let config = ClientConfig::from_env()?;
//! let repository = HttpSettingsRepository::new(&config)?;
//!
//! let tiers = repository.tier_requirements().await?;
//! let tier = resolve_tier(liters, tiers.thresholds());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod editor;
pub mod error;
pub mod overview;
pub mod poll;
pub mod repository;

pub use config::{ClientConfig, ConfigError};
pub use editor::{SaveOutcome, SaveSummary, SettingsEditor};
pub use error::ApiError;
pub use overview::CashbackOverview;
pub use poll::{Poller, poll_overview};
pub use repository::{HttpSettingsRepository, SettingsRepository};
