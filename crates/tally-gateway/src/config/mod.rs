//! Service config loader (strict parsing).

pub mod schema;

use std::fs;

use tally_core::error::{Result, TallyError};

pub use schema::{GatewaySection, HealthConfig, StoreSection, TallyConfig};

pub fn load_from_file(path: &str) -> Result<TallyConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TallyError::InvalidConfig(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<TallyConfig> {
    let cfg: TallyConfig = serde_yaml::from_str(s)
        .map_err(|e| TallyError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
