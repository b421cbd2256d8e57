//! Errors raised by the rules engine.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::Tier;

/// Errors from rule evaluation and settings validation.
///
/// Calculation errors are never papered over with a default value, since a
/// substituted multiplier would misstate a financial amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The tier has no entry in a multiplier or benefit map.
    #[error("no multiplier or benefit configured for tier {0}")]
    InvalidTier(Tier),

    /// A higher-ranked tier requires fewer liters than a lower-ranked one.
    #[error(
        "tier {higher} requires {higher_minimum} liters, less than {lower} ({lower_minimum} liters)"
    )]
    InvalidThresholdOrder {
        lower: Tier,
        lower_minimum: Decimal,
        higher: Tier,
        higher_minimum: Decimal,
    },

    /// Every tier in the table is inactive.
    #[error("at least one tier must remain active")]
    NoActiveTier,

    /// The same tier appears more than once in the table.
    #[error("tier {0} is listed more than once")]
    DuplicateTier(Tier),

    /// A quantity that must be non-negative is negative.
    #[error("{field} must not be negative (got {value})")]
    NegativeValue { field: String, value: Decimal },

    /// Volume bonus thresholds are not strictly increasing.
    #[error("volume bonus threshold {next} must be greater than {previous}")]
    VolumeBonusOrder { previous: Decimal, next: Decimal },
}

impl RulesError {
    pub(crate) fn negative(field: impl Into<String>, value: Decimal) -> Self {
        Self::NegativeValue {
            field: field.into(),
            value,
        }
    }
}

/// Return an error when `value` is below zero.
pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> Result<(), RulesError> {
    if value < Decimal::ZERO {
        return Err(RulesError::negative(field, value));
    }
    Ok(())
}
