//! # Engine Configuration
//!
//! Stores engine configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`INNKEEP_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.
//! If hot-reloading is added later, we'd wrap in `RwLock`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration.
///
/// ## Fields
/// Most fields have sensible defaults for development.
/// Production deployments should configure these properly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// House name (displayed on bills and reports)
    pub house_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Cash float placed in the drawer when a shift opens, minor units
    pub opening_cash_minor: i64,

    /// How long an operation waits on a contended entity lock before
    /// giving up with a Busy error, in milliseconds
    pub lock_wait_ms: u64,

    /// When set, a shift cannot close while rentals opened during it
    /// are still unsettled
    pub require_same_shift_settlement: bool,
}

impl Default for EngineConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - House: "Innkeep Dev House"
    /// - Currency: VND (zero decimals)
    /// - Opening cash: 500,000
    /// - Lock wait: 2000 ms
    /// - Same-shift settlement: not required
    fn default() -> Self {
        EngineConfig {
            house_name: "Innkeep Dev House".to_string(),
            currency_code: "VND".to_string(),
            currency_symbol: "₫".to_string(),
            currency_decimals: 0,
            opening_cash_minor: 500_000,
            lock_wait_ms: 2_000,
            require_same_shift_settlement: false,
        }
    }
}

impl EngineConfig {
    /// Creates a new EngineConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `INNKEEP_HOUSE_NAME`: Override house name
    /// - `INNKEEP_OPENING_CASH`: Override opening cash (minor units)
    /// - `INNKEEP_LOCK_WAIT_MS`: Override lock wait bound
    /// - `INNKEEP_REQUIRE_SAME_SHIFT_SETTLEMENT`: "1" or "true" to enable
    pub fn from_env() -> Self {
        let mut config = EngineConfig::default();

        if let Ok(house_name) = std::env::var("INNKEEP_HOUSE_NAME") {
            config.house_name = house_name;
        }

        if let Ok(opening_cash) = std::env::var("INNKEEP_OPENING_CASH") {
            if let Ok(minor) = opening_cash.parse::<i64>() {
                config.opening_cash_minor = minor;
            }
        }

        if let Ok(wait) = std::env::var("INNKEEP_LOCK_WAIT_MS") {
            if let Ok(ms) = wait.parse::<u64>() {
                config.lock_wait_ms = ms;
            }
        }

        if let Ok(flag) = std::env::var("INNKEEP_REQUIRE_SAME_SHIFT_SETTLEMENT") {
            config.require_same_shift_settlement = flag == "1" || flag.eq_ignore_ascii_case("true");
        }

        config
    }

    /// The bounded lock wait as a Duration.
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }

    /// Formats a minor-unit amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = EngineConfig::default();
    /// assert_eq!(config.format_currency(50000), "₫50000");
    /// ```
    pub fn format_currency(&self, minor: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = minor / divisor;
        let frac = (minor % divisor).abs();

        format!(
            "{}{}{}",
            if minor < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}
