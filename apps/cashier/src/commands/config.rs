//! # Config Commands
//!
//! Shows the configuration the cashier is actually running with.

use std::path::PathBuf;

use tracing::debug;

use crate::error::AppError;
use crate::state::{CashierConfig, ConfigError};

/// `config`: the effective configuration as TOML, optionally written to
/// `path` (or the default config file).
pub fn show(config: &CashierConfig, save: bool, path: Option<PathBuf>) -> Result<String, AppError> {
    debug!("config command");
    let rendered = toml::to_string_pretty(config).map_err(ConfigError::from)?;

    if save {
        let written = config.save(path)?;
        return Ok(format!("{}\n# saved to {}", rendered.trim_end(), written.display()));
    }

    Ok(rendered)
}
