//! ReadyNAS SNMP poller
//!
//! Polls a Netgear ReadyNAS for one metric table per run, normalizes the rows
//! and hands them to InfluxDB or prints them as JSON for Telegraf.

pub mod collector;
pub mod config;
pub mod error;
pub mod formatter;
pub mod snmp;

pub use collector::{poll_and_emit, Metric, Record, TableNormalizer};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use formatter::{Emitter, InfluxEmitter, JsonEmitter};
pub use snmp::{Credential, QueryExecutor, RawRow, Scalar, SnmpQuery};
