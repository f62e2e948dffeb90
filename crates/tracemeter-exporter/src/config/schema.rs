use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;
use tracemeter_core::error::{Result, TraceMeterError};
use tracemeter_core::AllowedProps;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub instruments: InstrumentsSection,
}

impl ExporterConfig {
    /// Config for a listener on `port`, everything else defaulted.
    pub fn with_port(port: u16) -> Self {
        Self {
            version: 1,
            exporter: ExporterSection {
                port: Some(port),
                ..ExporterSection::default()
            },
            instruments: InstrumentsSection::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TraceMeterError::UnsupportedVersion);
        }
        self.exporter.validate()?;
        self.instruments.validate()?;
        Ok(())
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            instruments: InstrumentsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// No port, no listener.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_collect_defaults")]
    pub collect_defaults: bool,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            collect_defaults: default_collect_defaults(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if let Some(port) = self.port {
            self.socket_addr(port)?;
        }
        Ok(())
    }

    pub fn socket_addr(&self, port: u16) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| TraceMeterError::Config(format!("exporter.host {:?}: {e}", self.host)))?;
        Ok(SocketAddr::new(ip, port))
    }

    /// Bind address, if a listener is configured.
    pub fn listen_addr(&self) -> Result<Option<SocketAddr>> {
        self.port.map(|p| self.socket_addr(p)).transpose()
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_collect_defaults() -> bool {
    true
}

/// Instruments the binary creates at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentsSection {
    #[serde(default)]
    pub trace: Option<PropsInstrument>,
    #[serde(default)]
    pub memory: Option<PropsInstrument>,
    #[serde(default)]
    pub timer: bool,
}

impl InstrumentsSection {
    pub fn validate(&self) -> Result<()> {
        for (name, inst) in [("trace", &self.trace), ("memory", &self.memory)] {
            if let Some(inst) = inst {
                inst.allowed().map_err(|e| {
                    TraceMeterError::Config(format!("instruments.{name}.allowed_props: {e}"))
                })?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropsInstrument {
    #[serde(default)]
    pub allowed_props: Vec<String>,
}

impl PropsInstrument {
    pub fn allowed(&self) -> Result<AllowedProps> {
        AllowedProps::new(self.allowed_props.iter().cloned())
    }
}
