//! Live cashback overview.
//!
//! # Usage
//!
//! ```bash
//! aqua-cli watch-overview --interval 10
//! ```

use std::time::Duration;

use aqua_rewards_client::{CashbackOverview, ClientConfig, HttpSettingsRepository, poll_overview};
use tracing::info;

use super::CliError;

/// Poll the overview and log each refresh until Ctrl-C.
///
/// # Errors
///
/// Returns error if configuration is missing or the client cannot be built.
pub async fn watch(interval: Option<u64>) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    let repository = HttpSettingsRepository::new(&config)?;
    let interval = interval.map_or(config.poll_interval, Duration::from_secs);

    info!(?interval, "Watching cashback overview (Ctrl-C to stop)");
    let poller = poll_overview(repository, interval);
    let mut updates = poller.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(overview) = updates.borrow_and_update().clone() {
                    log_overview(&overview);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                break;
            }
        }
    }
    Ok(())
}

fn log_overview(overview: &CashbackOverview) {
    info!(
        total_cashback_paid = %overview.total_cashback_paid,
        total_liters = %overview.total_liters,
        active_users = overview.active_users,
        pending_payouts = %overview.pending_payouts,
        average_per_user = %overview.average_cashback_per_user(),
        "Cashback overview"
    );
    for (tier, users) in &overview.users_by_tier {
        info!(%tier, users, "Users by tier");
    }
}
