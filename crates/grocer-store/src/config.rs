//! # Store Configuration
//!
//! Configuration for the store engine and the simulation harness.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GROCER_STORE_NAME="Corner Market"                                  │
//! │     GROCER_GRACE_PERIOD_MS=250                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/store/store.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.grocer.store/store.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # store.toml
//! [store]
//! name = "Corner Market"
//! waiting_room_capacity = 0   # 0 = unbounded
//! register_line_limit = 0     # 0 = unbounded
//! grace_period_ms = 5000
//!
//! [simulation]
//! registers = 2
//! shoppers = 8
//! service_interval_ms = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Store Settings
// =============================================================================

/// Settings the store engine itself reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Human-readable store name, used in logs.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// How many closed-store shoppers may wait to enter. 0 = unbounded.
    #[serde(default)]
    pub waiting_room_capacity: usize,

    /// Line limit for registers the store creates itself. 0 = unbounded.
    #[serde(default)]
    pub register_line_limit: usize,

    /// How long shutdown waits for stopped shoppers to reach checkout.
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: u64,
}

fn default_store_name() -> String {
    "Corner Market".to_string()
}

fn default_grace_period() -> u64 {
    5000
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            waiting_room_capacity: 0,
            register_line_limit: 0,
            grace_period_ms: default_grace_period(),
        }
    }
}

impl StoreSettings {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

// =============================================================================
// Simulation Settings
// =============================================================================

/// Settings for the shopping-day harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Registers opened at the start of the day.
    #[serde(default = "default_registers")]
    pub registers: usize,

    /// Shoppers sent into the store.
    #[serde(default = "default_shoppers")]
    pub shoppers: usize,

    /// Pause between service ticks.
    #[serde(default = "default_service_interval")]
    pub service_interval_ms: u64,
}

fn default_registers() -> usize {
    2
}
fn default_shoppers() -> usize {
    8
}
fn default_service_interval() -> u64 {
    10
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            registers: default_registers(),
            shoppers: default_shoppers(),
            service_interval_ms: default_service_interval(),
        }
    }
}

impl SimulationSettings {
    pub fn service_interval(&self) -> Duration {
        Duration::from_millis(self.service_interval_ms)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (store.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Store config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "store name must not be empty".into(),
            ));
        }

        if self.simulation.service_interval_ms == 0 {
            return Err(StoreError::InvalidConfig(
                "service_interval_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides. Unparseable numbers are
    /// logged and ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("GROCER_STORE_NAME") {
            debug!(name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        override_number("GROCER_WAITING_ROOM_CAPACITY", &mut self.store.waiting_room_capacity);
        override_number("GROCER_REGISTER_LINE_LIMIT", &mut self.store.register_line_limit);
        override_number("GROCER_GRACE_PERIOD_MS", &mut self.store.grace_period_ms);
        override_number("GROCER_REGISTERS", &mut self.simulation.registers);
        override_number("GROCER_SHOPPERS", &mut self.simulation.shoppers);
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "grocer", "store")
            .map(|dirs| dirs.config_dir().join("store.toml"))
    }
}

fn override_number<T: std::str::FromStr + std::fmt::Display>(var: &str, target: &mut T) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    match raw.parse::<T>() {
        Ok(value) => {
            debug!(var, %value, "Overriding setting from environment");
            *target = value;
        }
        Err(_) => warn!(var, value = %raw, "Ignoring unparseable environment override"),
    }
}
