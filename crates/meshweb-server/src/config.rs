use std::path::Path;

use meshweb_proto::constants::{DEFAULT_ANNOUNCE_INTERVAL_SECS, MIN_ANNOUNCE_INTERVAL_SECS};
use meshweb_proto::persist::{read_json_or, write_json_atomic};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Server-side `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub enabled: bool,
    pub transfer_mode: String,
    pub server_name: String,
    pub auto_announce_interval: u64,
    pub auto_announce_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            transfer_mode: "lxmf".to_string(),
            server_name: "LXMF HTML Server".to_string(),
            auto_announce_interval: DEFAULT_ANNOUNCE_INTERVAL_SECS,
            auto_announce_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Loads `config.json` from `storage_root`, falling back to defaults
    /// on a missing or malformed file rather than aborting.
    pub fn load(storage_root: &Path) -> Self {
        let mut config: Self = read_json_or(&storage_root.join("config.json"), Self::default());
        config.clamp_interval();
        config
    }

    pub fn save(&self, storage_root: &Path) -> Result<(), ServerError> {
        write_json_atomic(&storage_root.join("config.json"), self)
    }

    /// Enforces the minimum announce interval.
    pub fn clamp_interval(&mut self) {
        if self.auto_announce_interval < MIN_ANNOUNCE_INTERVAL_SECS {
            self.auto_announce_interval = MIN_ANNOUNCE_INTERVAL_SECS;
        }
    }
}
