//! Aqua Rewards CLI - Tier lookups, payout calculations and settings tools.
//!
//! # Usage
//!
//! ```bash
//! # Resolve the tier for 85 cumulative liters
//! aqua-cli resolve-tier 85
//!
//! # Commission on two purchases by a gold referred user, capped per month
//! aqua-cli commission 1000 250 --tier gold
//!
//! # Cashback for a 10 liter purchase with the rules in a bundle file
//! aqua-cli --file bundle.yaml cashback 10 --tier silver --streak
//!
//! # Download the live settings as a bundle
//! aqua-cli pull -o bundle.yaml
//! ```
//!
//! # Commands
//!
//! - `resolve-tier` - Map cumulative liters to a tier
//! - `commission` - Commission for one or more sales
//! - `cashback` - Cashback for a purchase, with its breakdown
//! - `progress` - Distance to the next tier and upgrade/downgrade handling
//! - `validate` - Check a rules bundle
//! - `pull` - Fetch the live settings as a bundle
//! - `watch-overview` - Poll the cashback overview
//!
//! Rules come from `--file` when given, otherwise from the backend configured
//! by `AQUA_API_BASE_URL` and `AQUA_API_TOKEN`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use aqua_rewards_core::Tier;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "aqua-cli")]
#[command(author, version, about = "Aqua Rewards CLI tools")]
struct Cli {
    /// Rules bundle (YAML or JSON) to use instead of the backend
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the tier for cumulative liters
    ResolveTier {
        /// Cumulative liters purchased
        liters: Decimal,
    },
    /// Calculate commission for sales in one month
    Commission {
        /// Sale amounts
        #[arg(required = true)]
        sales: Vec<Decimal>,

        /// Tier of the referred user who made the purchases
        #[arg(short, long, required_unless_present = "liters")]
        tier: Option<Tier>,

        /// Resolve the referred user's tier from cumulative liters instead
        #[arg(short, long, conflicts_with = "tier")]
        liters: Option<Decimal>,

        /// Sale date (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Calculate cashback for a purchase
    Cashback {
        /// Liters in this purchase
        liters: Decimal,

        /// Buyer tier
        #[arg(short, long, required_unless_present = "cumulative")]
        tier: Option<Tier>,

        /// Resolve the buyer tier from cumulative liters instead
        #[arg(short, long, conflicts_with = "tier")]
        cumulative: Option<Decimal>,

        /// Liters bought this month, for volume bonuses (defaults to the purchase)
        #[arg(short, long)]
        monthly: Option<Decimal>,

        /// The buyer has an active purchase streak
        #[arg(long)]
        streak: bool,

        /// Buyer birthday
        #[arg(long)]
        birthday: Option<NaiveDate>,
    },
    /// Show progress toward the next tier
    Progress {
        /// Cumulative liters purchased
        liters: Decimal,

        /// Tier currently held, to apply upgrade or downgrade rules
        #[arg(short, long)]
        previous: Option<Tier>,

        /// Let users drop to a lower tier
        #[arg(long)]
        allow_downgrade: bool,
    },
    /// Validate a rules bundle
    Validate,
    /// Download the live settings as a bundle
    Pull {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Poll the cashback overview until interrupted
    WatchOverview {
        /// Seconds between refreshes (defaults to `AQUA_POLL_INTERVAL_SECS`)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Text logs by default, JSON when `AQUA_LOG_JSON` is set.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aqua_rewards_cli=info,aqua_rewards_client=warn".into());

    let is_json = std::env::var("AQUA_LOG_JSON").is_ok();
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file = cli.file.as_deref();

    match cli.command {
        Commands::ResolveTier { liters } => {
            let bundle = commands::load_bundle(file).await?;
            commands::rules::resolve_tier(&bundle, liters);
        }
        Commands::Commission {
            sales,
            tier,
            liters,
            date,
        } => {
            let bundle = commands::load_bundle(file).await?;
            let tier = commands::rules::pick_tier(&bundle, tier, liters);
            commands::rules::commission(&bundle, &sales, tier, date.unwrap_or_else(today))?;
        }
        Commands::Cashback {
            liters,
            tier,
            cumulative,
            monthly,
            streak,
            birthday,
        } => {
            let bundle = commands::load_bundle(file).await?;
            let tier = commands::rules::pick_tier(&bundle, tier, cumulative);
            let request = commands::rules::CashbackRequest {
                liters,
                tier,
                monthly_liters: monthly.unwrap_or(liters),
                streak,
                birthday,
                today: today(),
            };
            commands::rules::cashback(&bundle, &request)?;
        }
        Commands::Progress {
            liters,
            previous,
            allow_downgrade,
        } => {
            let bundle = commands::load_bundle(file).await?;
            commands::rules::progress(&bundle, liters, previous, allow_downgrade);
        }
        Commands::Validate => {
            let bundle = commands::load_bundle(file).await?;
            commands::rules::validate(&bundle)?;
        }
        Commands::Pull { output } => commands::settings::pull(output.as_deref()).await?,
        Commands::WatchOverview { interval } => commands::overview::watch(interval).await?,
    }
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_interval_must_be_positive() {
        assert!(Cli::try_parse_from(["aqua-cli", "watch-overview", "--interval", "0"]).is_err());

        let cli = Cli::try_parse_from(["aqua-cli", "watch-overview", "--interval", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::WatchOverview { interval: Some(5) }
        ));
    }

    #[test]
    fn test_commission_tier_or_liters() {
        let cli = Cli::try_parse_from(["aqua-cli", "commission", "1000", "--tier", "gold"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Commission {
                tier: Some(Tier::Gold),
                liters: None,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["aqua-cli", "commission", "1000"]).is_err());
    }
}
