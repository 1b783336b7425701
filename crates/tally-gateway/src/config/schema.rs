use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use tally_core::error::{Result, TallyError};
use tally_core::StoreOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub health: HealthConfig,
}

impl TallyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TallyError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.store.validate()?;
        self.health.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            TallyError::InvalidConfig(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Longest accepted key, in characters. Unbounded when absent.
    #[serde(default)]
    pub max_key_length: Option<usize>,
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_key_length == Some(0) {
            return Err(TallyError::InvalidConfig(
                "store.max_key_length must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn options(&self) -> StoreOptions {
        StoreOptions {
            max_key_length: self.max_key_length,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_property")]
    pub property: String,

    #[serde(default = "default_sub_property")]
    pub sub_property: String,

    #[serde(default = "default_sink_timeout_ms")]
    pub sink_timeout_ms: u64,

    /// Also file an Error report each cycle (rollback drills).
    #[serde(default)]
    pub inject_error_report: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_ms: default_interval_ms(),
            property: default_property(),
            sub_property: default_sub_property(),
            sink_timeout_ms: default_sink_timeout_ms(),
            inject_error_report: false,
        }
    }
}

impl HealthConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=3_600_000).contains(&self.interval_ms) {
            return Err(TallyError::InvalidConfig(
                "health.interval_ms must be between 1000 and 3600000".into(),
            ));
        }
        if self.sink_timeout_ms == 0 || self.sink_timeout_ms >= self.interval_ms {
            return Err(TallyError::InvalidConfig(
                "health.sink_timeout_ms must be positive and less than interval_ms".into(),
            ));
        }
        if self.property.is_empty() || self.sub_property.is_empty() {
            return Err(TallyError::InvalidConfig(
                "health.property and health.sub_property must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reports go stale after two missed intervals.
    pub fn time_to_live(&self) -> Duration {
        self.interval() * 2
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }
}

fn default_true() -> bool {
    true
}
fn default_interval_ms() -> u64 {
    30_000
}
fn default_property() -> String {
    "VotingServiceHealth".into()
}
fn default_sub_property() -> String {
    "Heartbeat".into()
}
fn default_sink_timeout_ms() -> u64 {
    5_000
}
