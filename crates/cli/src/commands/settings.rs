//! Settings download.
//!
//! # Usage
//!
//! ```bash
//! # Print the live settings as YAML
//! aqua-cli pull
//!
//! # Save them for offline calculations
//! aqua-cli pull -o bundle.yaml
//! aqua-cli --file bundle.yaml resolve-tier 85
//! ```
//!
//! # Environment Variables
//!
//! - `AQUA_API_BASE_URL` - Base URL of the rewards backend
//! - `AQUA_API_TOKEN` - Bearer token for the backend

use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use super::{CliError, connect, fetch_bundle};

/// Fetch the live settings and write them as a YAML bundle.
///
/// # Errors
///
/// Returns error if the backend request fails or the output cannot be
/// written.
pub async fn pull(output: Option<&Path>) -> Result<(), CliError> {
    let repository = connect()?;
    let bundle = fetch_bundle(&repository).await?;

    if let Err(e) = bundle.validate() {
        warn!(error = %e, "Live settings do not pass validation");
    }

    let yaml = serde_yaml::to_string(&bundle)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, yaml).await?;
            info!(path = %path.display(), "Settings written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(yaml.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
