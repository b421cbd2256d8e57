//! Load, edit and save loyalty settings.
//!
//! A [`SettingsEditor`] holds one draft per settings document. Saving a
//! document validates it and writes it only when it differs from the last
//! persisted copy; an unchanged draft reports [`SaveOutcome::NoChanges`]
//! without touching the network.

use aqua_rewards_core::{
    CashbackSettings, CommissionSettings, RulesBundle, SettingsDraft, TierTable,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::repository::SettingsRepository;

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome<T> {
    /// Nothing was edited; no request was sent.
    NoChanges,
    /// The backend accepted the write and returned this canonical copy.
    Saved(T),
}

impl<T> SaveOutcome<T> {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Which documents [`SettingsEditor::save_all`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveSummary {
    pub tier_requirements: bool,
    pub commission: bool,
    pub cashback: bool,
}

impl SaveSummary {
    /// Whether any document was written.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.tier_requirements || self.commission || self.cashback
    }
}

/// Editable copies of every settings document.
#[derive(Debug)]
pub struct SettingsEditor<R> {
    repository: R,
    tier_requirements: SettingsDraft<TierTable>,
    commission: SettingsDraft<CommissionSettings>,
    cashback: SettingsDraft<CashbackSettings>,
}

impl<R: SettingsRepository> SettingsEditor<R> {
    /// Fetch all settings and start editing them.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error.
    #[instrument(skip(repository))]
    pub async fn load(repository: R) -> Result<Self, ApiError> {
        let (tier_requirements, commission, cashback) = tokio::try_join!(
            repository.tier_requirements(),
            repository.commission_settings(),
            repository.cashback_settings(),
        )?;

        Ok(Self {
            repository,
            tier_requirements: SettingsDraft::new(tier_requirements),
            commission: SettingsDraft::new(commission),
            cashback: SettingsDraft::new(cashback),
        })
    }

    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    #[must_use]
    pub const fn tier_requirements(&self) -> &SettingsDraft<TierTable> {
        &self.tier_requirements
    }

    pub const fn tier_requirements_mut(&mut self) -> &mut SettingsDraft<TierTable> {
        &mut self.tier_requirements
    }

    #[must_use]
    pub const fn commission(&self) -> &SettingsDraft<CommissionSettings> {
        &self.commission
    }

    pub const fn commission_mut(&mut self) -> &mut SettingsDraft<CommissionSettings> {
        &mut self.commission
    }

    #[must_use]
    pub const fn cashback(&self) -> &SettingsDraft<CashbackSettings> {
        &self.cashback
    }

    pub const fn cashback_mut(&mut self) -> &mut SettingsDraft<CashbackSettings> {
        &mut self.cashback
    }

    /// Whether any document has unsaved edits.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.tier_requirements.is_dirty() || self.commission.is_dirty() || self.cashback.is_dirty()
    }

    /// The edited settings as one bundle.
    #[must_use]
    pub fn bundle(&self) -> RulesBundle {
        RulesBundle {
            tier_requirements: self.tier_requirements.current().clone(),
            commission: self.commission.current().clone(),
            cashback: self.cashback.current().clone(),
        }
    }

    /// Discard all edits.
    pub fn reset(&mut self) {
        self.tier_requirements.reset();
        self.commission.reset();
        self.cashback.reset();
    }

    /// Save the tier requirements if edited.
    ///
    /// # Errors
    ///
    /// Returns `Rules` if the table fails validation, or the backend error.
    #[instrument(skip(self))]
    pub async fn save_tier_requirements(&mut self) -> Result<SaveOutcome<TierTable>, ApiError> {
        if !self.tier_requirements.is_dirty() {
            info!("No changes to tier requirements");
            return Ok(SaveOutcome::NoChanges);
        }
        self.tier_requirements.current().validate()?;

        let saved = self
            .repository
            .save_tier_requirements(self.tier_requirements.current())
            .await?;
        self.tier_requirements.mark_saved(saved.clone());
        Ok(SaveOutcome::Saved(saved))
    }

    /// Save the commission settings if edited.
    ///
    /// Validated against the saved tier table, not unsaved tier edits.
    ///
    /// # Errors
    ///
    /// Returns `Rules` if the settings fail validation, or the backend error.
    #[instrument(skip(self))]
    pub async fn save_commission(&mut self) -> Result<SaveOutcome<CommissionSettings>, ApiError> {
        if !self.commission.is_dirty() {
            info!("No changes to commission settings");
            return Ok(SaveOutcome::NoChanges);
        }
        self.commission
            .current()
            .validate(self.tier_requirements.original())?;

        let saved = self
            .repository
            .save_commission_settings(self.commission.current())
            .await?;
        self.commission.mark_saved(saved.clone());
        Ok(SaveOutcome::Saved(saved))
    }

    /// Save the cashback settings if edited.
    ///
    /// Validated against the saved tier table, not unsaved tier edits.
    ///
    /// # Errors
    ///
    /// Returns `Rules` if the settings fail validation, or the backend error.
    #[instrument(skip(self))]
    pub async fn save_cashback(&mut self) -> Result<SaveOutcome<CashbackSettings>, ApiError> {
        if !self.cashback.is_dirty() {
            info!("No changes to cashback settings");
            return Ok(SaveOutcome::NoChanges);
        }
        self.cashback
            .current()
            .validate(self.tier_requirements.original())?;

        let saved = self
            .repository
            .save_cashback_settings(self.cashback.current())
            .await?;
        self.cashback.mark_saved(saved.clone());
        Ok(SaveOutcome::Saved(saved))
    }

    /// Validate the whole bundle, then save every edited document.
    ///
    /// Tier requirements go first since the other documents are validated
    /// against them.
    ///
    /// # Errors
    ///
    /// Returns `Rules` before any write if the bundle is invalid, otherwise
    /// the first backend error. Documents saved before the error stay saved.
    #[instrument(skip(self))]
    pub async fn save_all(&mut self) -> Result<SaveSummary, ApiError> {
        if self.is_dirty() {
            self.bundle().validate()?;
        }

        Ok(SaveSummary {
            tier_requirements: self.save_tier_requirements().await?.is_saved(),
            commission: self.save_commission().await?.is_saved(),
            cashback: self.save_cashback().await?.is_saved(),
        })
    }
}
