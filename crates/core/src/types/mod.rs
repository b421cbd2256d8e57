//! Settings and tier types for the rules engine.

pub mod bundle;
pub mod cashback;
pub mod commission;
pub mod threshold;
pub mod tier;

pub use bundle::RulesBundle;
pub use cashback::{CashbackSettings, LoyaltyProgram, TierBenefit, VolumeBonus};
pub use commission::CommissionSettings;
pub use threshold::{TierTable, TierThreshold};
pub use tier::{Tier, TierParseError, TierPresentation};
