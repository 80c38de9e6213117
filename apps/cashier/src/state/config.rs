//! # Cashier Configuration
//!
//! Settings the cashier reads at startup and never writes during a session.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MESA_RESTAURANT_NAME="La Cantina"                                  │
//! │     MESA_DEFAULT_TIP_PERCENT=10                                        │
//! │                                                                         │
//! │  2. TOML Config File (--config, or the platform config dir)            │
//! │     ~/.config/mesa-cashier/cashier.toml (Linux)                        │
//! │     ~/Library/Application Support/com.mesa.cashier/cashier.toml        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! restaurant_name = "La Cantina"
//! default_tip_percent = 10
//! currency_symbol = "$"
//! currency_decimals = 2
//! receipt_width = 32
//! discount_presets = [10, 20, 50]
//! tip_presets = [10, 15, 20]
//! ```

use std::path::{Path, PathBuf};

use mesa_core::receipt::MIN_TICKET_WIDTH;
use mesa_core::settlement::{DISCOUNT_PRESETS, TIP_PRESETS};
use mesa_core::validation::parse_percentage;
use mesa_core::{Money, Percentage};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Largest number of decimals `format_currency` will print.
const MAX_CURRENCY_DECIMALS: u8 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config file: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid cashier configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Percentage buttons must be between 1% and 100%.
fn check_presets(field: &str, presets: &[u32]) -> ConfigResult<()> {
    match presets.iter().find(|p| !(1..=100).contains(*p)) {
        Some(p) => Err(ConfigError::Invalid(format!(
            "{} entry {}% is outside 1-100%",
            field, p
        ))),
        None => Ok(()),
    }
}

/// Cashier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashierConfig {
    /// Printed at the top of every ticket.
    pub restaurant_name: String,

    /// Tip seeded when a bill without a stored tip is opened. Zero disables it.
    pub default_tip_percent: Percentage,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for display
    pub currency_decimals: u8,

    /// Ticket paper width in characters (typically 32, 42 or 48)
    pub receipt_width: usize,

    /// Discount percentage buttons.
    pub discount_presets: Vec<u32>,

    /// Tip percentage buttons.
    pub tip_presets: Vec<u32>,
}

impl Default for CashierConfig {
    fn default() -> Self {
        CashierConfig {
            restaurant_name: "Mi Restaurante".to_string(),
            default_tip_percent: Percentage::zero(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            receipt_width: 32,
            discount_presets: DISCOUNT_PRESETS.to_vec(),
            tip_presets: TIP_PRESETS.to_vec(),
        }
    }
}

impl CashierConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`cashier.toml`); a missing file is not an error
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cashier config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses one TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Cashier config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.restaurant_name.trim().is_empty() {
            return Err(ConfigError::Invalid("restaurant_name must not be empty".into()));
        }

        if self.receipt_width < MIN_TICKET_WIDTH {
            return Err(ConfigError::Invalid(format!(
                "receipt_width must be at least {}, got {}",
                MIN_TICKET_WIDTH, self.receipt_width
            )));
        }

        if self.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "currency_decimals must be at most {}",
                MAX_CURRENCY_DECIMALS
            )));
        }

        check_presets("discount_presets", &self.discount_presets)?;
        check_presets("tip_presets", &self.tip_presets)?;

        Ok(())
    }

    /// Applies `MESA_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are logged and
    /// ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("MESA_RESTAURANT_NAME") {
            debug!(restaurant_name = %name, "Overriding restaurant name from environment");
            self.restaurant_name = name;
        }

        if let Some(tip) = lookup("MESA_DEFAULT_TIP_PERCENT") {
            match parse_percentage(&tip) {
                Ok(percent) => self.default_tip_percent = percent,
                Err(e) => warn!(value = %tip, error = %e, "Ignoring MESA_DEFAULT_TIP_PERCENT"),
            }
        }

        if let Some(symbol) = lookup("MESA_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(width) = lookup("MESA_RECEIPT_WIDTH") {
            match width.trim().parse::<usize>() {
                Ok(w) => self.receipt_width = w,
                Err(_) => warn!(value = %width, "Ignoring MESA_RECEIPT_WIDTH"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "mesa", "cashier")
            .map(|dirs| dirs.config_dir().join("cashier.toml"))
    }

    /// Formats an amount for display with the configured symbol and decimals.
    ///
    /// ## Example
    /// ```rust
    /// use mesa_cashier::state::CashierConfig;
    /// use mesa_core::Money;
    ///
    /// let config = CashierConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let decimals = self.currency_decimals.min(MAX_CURRENCY_DECIMALS);
        let value = amount
            .to_decimal()
            .abs()
            .round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero);

        format!(
            "{}{}{:.prec$}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            value,
            prec = decimals as usize
        )
    }
}
