//! TOML file configuration for the listener daemon.
//!
//! These structs directly map to the `supplyline.toml` file format. The
//! database URL deliberately stays out of the file and comes from the
//! `DATABASE_URL` environment variable.

use alloy_primitives::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use supplyline_core::events::EventKind;
use supplyline_core::processors::{ContractAddresses, ListenerSettings};
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub signers: SignersConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
}

/// Ledger node connection section.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node (e.g., "http://127.0.0.1:8545").
    pub endpoint: Url,
    pub contracts: ContractsConfig,
}

/// Deployed addresses of the four supply-chain contracts.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    pub retail_store: Address,
    pub distributor: Address,
    pub delivery: Address,
    pub manufacturer: Address,
}

/// Sender identities for contract calls submitted through the ledger node.
///
/// Keys stay on the node; these are only the unlocked account addresses
/// calls are sent from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignersConfig {
    pub distributor: Option<Address>,
    pub manufacturer: Option<Address>,
    pub retail_store: Option<Address>,
}

/// Polling section.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    /// Seconds between poll cycles unless overridden per event.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Per-event overrides, keyed by snake_case event name.
    #[serde(default)]
    pub poll_intervals: HashMap<EventKind, u64>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            poll_intervals: HashMap::new(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    2
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn listener_settings(&self) -> ListenerSettings {
        ListenerSettings {
            contracts: ContractAddresses {
                retail_store: self.ledger.contracts.retail_store,
                distributor: self.ledger.contracts.distributor,
                delivery: self.ledger.contracts.delivery,
                manufacturer: self.ledger.contracts.manufacturer,
            },
            default_poll_interval: Duration::from_secs(self.listener.poll_interval_secs),
            poll_intervals: self
                .listener
                .poll_intervals
                .iter()
                .map(|(kind, secs)| (*kind, Duration::from_secs(*secs)))
                .collect(),
        }
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
