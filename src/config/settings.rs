use serde::Deserialize;

use crate::snmp::{UsmUser, DEFAULT_PORT};

/// The polled device.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyNasSettings {
    /// Hostname or IP address of the ReadyNAS
    pub host: String,
    /// Read-only community string
    #[serde(default)]
    pub community: String,
    /// SNMP agent port
    #[serde(default = "default_snmp_port")]
    pub port: u16,
}

/// SNMP protocol settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SnmpSettings {
    /// Protocol version: 2 (v2c) or 3
    #[serde(default = "default_version")]
    pub version: u8,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// SNMPv3 user, only read when version is 3
    #[serde(default)]
    pub user: Option<UsmUser>,
}

impl Default for SnmpSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            timeout: default_timeout(),
            user: None,
        }
    }
}

/// InfluxDB 1.x connection.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxSettings {
    pub host: String,
    #[serde(default = "default_influx_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub dbname: String,
    /// Use HTTPS
    #[serde(default)]
    pub ssl: bool,
}

fn default_snmp_port() -> u16 {
    DEFAULT_PORT
}

fn default_version() -> u8 {
    2
}

fn default_timeout() -> u64 {
    10
}

fn default_influx_port() -> u16 {
    8086
}
