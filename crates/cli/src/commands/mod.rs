//! Command implementations and the shared rules loader.

pub mod overview;
pub mod rules;
pub mod settings;

use std::path::Path;

use aqua_rewards_client::{
    ApiError, ClientConfig, ConfigError, HttpSettingsRepository, SettingsRepository,
};
use aqua_rewards_core::{RulesBundle, RulesError};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid rules bundle: {0}")]
    Bundle(#[from] serde_yaml::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Load rules from a bundle file, or from the backend when no file is given.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed, or if the backend
/// request fails.
pub async fn load_bundle(file: Option<&Path>) -> Result<RulesBundle, CliError> {
    match file {
        Some(path) => read_bundle(path).await,
        None => {
            let repository = connect()?;
            fetch_bundle(&repository).await
        }
    }
}

/// Parse a YAML (or JSON) bundle file.
async fn read_bundle(path: &Path) -> Result<RulesBundle, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let bundle: RulesBundle = serde_yaml::from_str(&content)?;
    debug!(path = %path.display(), "Loaded rules bundle");
    Ok(bundle)
}

/// Repository for the backend configured in the environment.
///
/// # Errors
///
/// Returns error if configuration is missing or the client cannot be built.
pub fn connect() -> Result<HttpSettingsRepository, CliError> {
    let config = ClientConfig::from_env()?;
    let repository = HttpSettingsRepository::new(&config)?;
    info!(base_url = %repository.base_url(), "Using settings backend");
    Ok(repository)
}

/// Fetch every settings document in parallel.
///
/// # Errors
///
/// Returns the first backend error.
pub async fn fetch_bundle<R: SettingsRepository>(repository: &R) -> Result<RulesBundle, CliError> {
    let (tier_requirements, commission, cashback) = tokio::try_join!(
        repository.tier_requirements(),
        repository.commission_settings(),
        repository.cashback_settings(),
    )?;

    Ok(RulesBundle {
        tier_requirements,
        commission,
        cashback,
    })
}
