//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use tracemeter_core::error::{Result, TraceMeterError};

pub use schema::{ExporterConfig, ExporterSection, InstrumentsSection, PropsInstrument};

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TraceMeterError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| TraceMeterError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
