//! Dirty-state tracking for edited settings.

/// Whether `current` differs structurally from `original`.
///
/// Works for any settings type with a deep `PartialEq`. Tier multiplier and
/// benefit maps are `BTreeMap`s, so their comparison ignores insertion order;
/// the tier requirements list compares in order because list order is the
/// display order.
#[must_use]
pub fn has_changed<T: PartialEq + ?Sized>(current: &T, original: &T) -> bool {
    current != original
}

/// A last-persisted snapshot paired with a live edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDraft<T> {
    original: T,
    current: T,
}

impl<T: Clone + PartialEq> SettingsDraft<T> {
    /// Start editing from the persisted value.
    #[must_use]
    pub fn new(original: T) -> Self {
        Self {
            current: original.clone(),
            original,
        }
    }

    /// Last-persisted value.
    #[must_use]
    pub const fn original(&self) -> &T {
        &self.original
    }

    /// Value being edited.
    #[must_use]
    pub const fn current(&self) -> &T {
        &self.current
    }

    /// Mutable access to the value being edited.
    pub const fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    /// Apply an edit in place.
    pub fn edit(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.current);
    }

    /// Whether saving would write anything.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        has_changed(&self.current, &self.original)
    }

    /// Discard edits.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
    }

    /// Adopt the canonical copy returned by a save as the new baseline.
    pub fn mark_saved(&mut self, canonical: T) {
        self.current = canonical.clone();
        self.original = canonical;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{CashbackSettings, CommissionSettings, Tier, TierTable};

    #[test]
    fn test_has_changed_is_reflexive() {
        let commission = CommissionSettings::default();
        assert!(!has_changed(&commission, &commission.clone()));

        let cashback = CashbackSettings::default();
        assert!(!has_changed(&cashback, &cashback.clone()));

        let tiers = TierTable::standard();
        assert!(!has_changed(&tiers, &tiers.clone()));
    }

    #[test]
    fn test_same_value_edit_is_not_a_change() {
        let original = CommissionSettings::default();
        let mut draft = SettingsDraft::new(original);
        draft.edit(|s| s.base_commission_rate = "5.0".parse().unwrap());
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_leaf_changes_are_detected() {
        let original = CashbackSettings::default();

        let mut edited = original.clone();
        edited.loyalty_program.birthday_bonus = Decimal::ONE;
        assert!(has_changed(&edited, &original));

        let mut edited = original.clone();
        edited
            .tier_benefits
            .get_mut(&Tier::Gold)
            .unwrap()
            .upgrade_requirement = None;
        assert!(has_changed(&edited, &original));

        let mut edited = original.clone();
        edited.volume_bonuses[0].bonus = Decimal::from(11);
        assert!(has_changed(&edited, &original));
    }

    #[test]
    fn test_map_order_is_ignored() {
        let forward: BTreeMap<Tier, Decimal> = Tier::ALL
            .iter()
            .map(|t| (*t, Decimal::from(t.rank())))
            .collect();
        let backward: BTreeMap<Tier, Decimal> = Tier::ALL
            .iter()
            .rev()
            .map(|t| (*t, Decimal::from(t.rank())))
            .collect();
        let a = CommissionSettings {
            tier_multipliers: forward,
            ..CommissionSettings::default()
        };
        let b = CommissionSettings {
            tier_multipliers: backward,
            ..CommissionSettings::default()
        };
        assert!(!has_changed(&a, &b));
    }

    #[test]
    fn test_tier_list_order_matters() {
        let original = TierTable::standard();
        let mut rows = original.clone().into_inner();
        rows.swap(0, 1);
        assert!(has_changed(&TierTable::new(rows), &original));
    }

    #[test]
    fn test_draft_lifecycle() {
        let mut draft = SettingsDraft::new(TierTable::standard());
        assert!(!draft.is_dirty());

        draft.current_mut().set_active(Tier::Gold, false);
        assert!(draft.is_dirty());

        draft.reset();
        assert!(!draft.is_dirty());

        draft.edit(|t| {
            t.get_mut(Tier::Silver).unwrap().minimum_liters = Decimal::from(40);
        });
        let saved = draft.current().clone();
        draft.mark_saved(saved.clone());
        assert!(!draft.is_dirty());
        assert_eq!(draft.original(), &saved);
    }
}
