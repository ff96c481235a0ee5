//! Configuration loading.

use serde::Deserialize;
use std::env;
use std::path::Path;
use tokio::time::Duration;

pub mod settings;

pub use settings::{InfluxSettings, ReadyNasSettings, SnmpSettings};

use crate::collector::VolumeStatusScheme;
use crate::error::{Error, Result};
use crate::snmp::{Secret, Target};

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Device to poll
    pub readynas: ReadyNasSettings,
    /// SNMP protocol settings
    #[serde(default)]
    pub snmp: SnmpSettings,
    /// Time-series database, required only for the InfluxDB output
    #[serde(default)]
    pub influxdb: Option<InfluxSettings>,
    /// Numbering used for volume status codes
    #[serde(default)]
    pub volume_status: VolumeStatusScheme,
}

impl AppConfig {
    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.readynas.host.trim().is_empty() {
            return Err(Error::Config("readynas.host must not be empty".to_string()));
        }
        match self.snmp.version {
            2 | 3 => {}
            1 => {
                return Err(Error::Config(
                    "SNMPv1 is not supported, set snmp.version to 2".to_string(),
                ))
            }
            v => return Err(Error::Config(format!("unknown snmp.version {}", v))),
        }
        if self.snmp.version == 2 && self.get_community().is_empty() {
            return Err(Error::Config("readynas.community must be set".to_string()));
        }
        Ok(())
    }

    /// Device address; `READYNAS_HOST` overrides the file.
    pub fn get_target(&self) -> Target {
        let host = env::var("READYNAS_HOST").unwrap_or_else(|_| self.readynas.host.clone());
        Target::new(host, self.readynas.port)
    }

    /// Request timeout; `SNMP_TIMEOUT` (seconds) overrides the file.
    pub fn get_timeout(&self) -> Duration {
        let secs = env::var("SNMP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.snmp.timeout);
        Duration::from_secs(secs)
    }

    /// Community string; `READYNAS_COMMUNITY` overrides the file.
    pub fn get_community(&self) -> String {
        env::var("READYNAS_COMMUNITY").unwrap_or_else(|_| self.readynas.community.clone())
    }

    pub fn use_v3(&self) -> bool {
        self.snmp.version == 3
    }

    /// Secret material for the credential builder.
    pub fn secret(&self) -> Secret {
        if self.use_v3() {
            Secret::Usm(self.snmp.user.clone().unwrap_or_default())
        } else {
            Secret::Community(self.get_community())
        }
    }

    pub fn influx(&self) -> Result<&InfluxSettings> {
        self.influxdb
            .as_ref()
            .ok_or_else(|| Error::Config("the influxdb section is required for this output".to_string()))
    }
}
