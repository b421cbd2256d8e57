//! End-to-end rule calculations with settings served by the backend.
//!
//! The rules come from `fixtures/bundle.yaml`, are served by the fake
//! backend, and are read back through the HTTP repository before being
//! handed to the calculators.

#![allow(clippy::unwrap_used)]

use aqua_rewards_client::{SaveOutcome, SettingsEditor, SettingsRepository};
use aqua_rewards_core::{
    CashbackContext, MonthlyCommissionLedger, RulesBundle, Tier, calculate_cashback,
    calculate_commission, referral_award, resolve_tier,
};
use aqua_rewards_integration_tests::FakeBackend;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn fixture() -> RulesBundle {
    serde_yaml::from_str(include_str!("../fixtures/bundle.yaml")).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_fixture_bundle_is_valid() {
    let bundle = fixture();
    bundle.validate().unwrap();

    let gold = bundle.tier_requirements.get(Tier::Gold).unwrap();
    assert_eq!(gold.color(), "#D4AF37");
    assert_eq!(gold.icon(), "trophy");

    let silver = bundle.tier_requirements.get(Tier::Silver).unwrap();
    assert_eq!(silver.color(), Tier::Silver.presentation().color);
    assert_eq!(bundle.commission.commission_cap, Some(dec("100")));
}

#[tokio::test]
async fn test_tier_boundaries_from_backend() {
    let backend = FakeBackend::with_bundle(fixture()).await.unwrap();
    let repo = backend.repository().unwrap();

    let table = repo.tier_requirements().await.unwrap();
    let thresholds = table.thresholds();

    assert_eq!(resolve_tier(dec("80"), thresholds), Tier::Gold);
    assert_eq!(resolve_tier(dec("79"), thresholds), Tier::Silver);
    assert_eq!(resolve_tier(dec("100"), thresholds), Tier::Platinum);
    assert_eq!(resolve_tier(Decimal::ZERO, thresholds), Tier::Lead);
}

#[tokio::test]
async fn test_deactivated_tier_is_skipped() {
    let mut bundle = fixture();
    bundle.tier_requirements.set_active(Tier::Gold, false);
    let backend = FakeBackend::with_bundle(bundle).await.unwrap();
    let repo = backend.repository().unwrap();

    let table = repo.tier_requirements().await.unwrap();
    assert_eq!(table.resolve(dec("85")), Tier::Silver);
    assert_eq!(table.resolve(dec("100")), Tier::Platinum);
}

#[tokio::test]
async fn test_gold_commission_and_monthly_cap() {
    let backend = FakeBackend::with_bundle(fixture()).await.unwrap();
    let repo = backend.repository().unwrap();
    let settings = repo.commission_settings().await.unwrap();

    assert_eq!(
        calculate_commission(dec("1000"), Tier::Gold, &settings).unwrap(),
        dec("75")
    );

    let mut ledger = MonthlyCommissionLedger::new();
    let june = date(2024, 6, 3);
    assert_eq!(
        ledger
            .record(june, dec("1000"), Tier::Gold, &settings)
            .unwrap(),
        dec("75")
    );
    assert_eq!(
        ledger
            .record(date(2024, 6, 20), dec("1000"), Tier::Gold, &settings)
            .unwrap(),
        dec("25")
    );
    assert_eq!(ledger.accrued(june), dec("100"));
    assert!(settings.is_payout_eligible(ledger.accrued(june)));

    // July starts from zero.
    assert_eq!(
        ledger
            .record(date(2024, 7, 1), dec("1000"), Tier::Gold, &settings)
            .unwrap(),
        dec("75")
    );
}

#[tokio::test]
async fn test_silver_cashback_with_bonuses() {
    let backend = FakeBackend::with_bundle(fixture()).await.unwrap();
    let repo = backend.repository().unwrap();
    let settings = repo.cashback_settings().await.unwrap();

    let plain = CashbackContext {
        monthly_liters: dec("50"),
        ..CashbackContext::default()
    };
    assert_eq!(
        calculate_cashback(dec("50"), Tier::Silver, &settings, &plain).unwrap(),
        dec("1.20")
    );

    let volume = CashbackContext {
        monthly_liters: dec("120"),
        ..CashbackContext::default()
    };
    assert_eq!(
        calculate_cashback(dec("50"), Tier::Silver, &settings, &volume).unwrap(),
        dec("1.32")
    );

    let streak = CashbackContext {
        streak: true,
        ..plain
    };
    assert_eq!(
        calculate_cashback(dec("50"), Tier::Silver, &settings, &streak).unwrap(),
        dec("1.26")
    );

    let birthday = CashbackContext::for_month(
        dec("50"),
        false,
        Some(date(1990, 6, 14)),
        date(2024, 6, 1),
    );
    assert_eq!(
        calculate_cashback(dec("50"), Tier::Silver, &settings, &birthday).unwrap(),
        dec("3.70")
    );

    assert_eq!(
        calculate_cashback(Decimal::ZERO, Tier::Silver, &settings, &birthday).unwrap(),
        Decimal::ZERO
    );
    assert_eq!(referral_award(&settings), dec("10"));
}

#[tokio::test]
async fn test_resaving_same_commission_rate_is_skipped() {
    let backend = FakeBackend::with_bundle(fixture()).await.unwrap();
    let mut editor = SettingsEditor::load(backend.repository().unwrap())
        .await
        .unwrap();

    editor
        .commission_mut()
        .edit(|s| s.base_commission_rate = dec("5.0"));

    assert!(!editor.is_dirty());
    assert_eq!(
        editor.save_commission().await.unwrap(),
        SaveOutcome::NoChanges
    );
    assert_eq!(backend.writes(), 0);
}
