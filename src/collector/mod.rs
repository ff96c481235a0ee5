//! Table normalizers: turn raw SNMP rows into metric records.
//!
//! Each ReadyNAS table has one normalizer with a fixed field list and one
//! rule per field. The shared [`TableNormalizer::collect`] walks the table,
//! resolves the device name once and shapes every row into a [`Record`].

use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;

use crate::error::{Error, Result};
use crate::formatter::Emitter;
use crate::snmp::{MibField, QueryExecutor, RawRow, Scalar};

pub mod disk;
pub mod fan;
pub mod interface;
pub mod temperature;
pub mod uptime;
pub mod volume;

pub use disk::DiskTable;
pub use fan::FanTable;
pub use interface::InterfaceTable;
pub use temperature::TemperatureTable;
pub use uptime::UptimeTable;
pub use volume::{VolumeStatus, VolumeStatusScheme, VolumeTable};

pub const READYNAS_MIB: &str = "READYNASOS-MIB";

/// Device name, fetched once per invocation to tag every record.
pub const SYS_NAME: MibField = MibField::new("SNMPv2-MIB", "sysName");

/// The metric tables a single invocation can poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Disks,
    Fans,
    Temperature,
    Volumes,
    Interfaces,
    Uptime,
}

impl Metric {
    /// Short table name used in logs and errors.
    pub fn table(&self) -> &'static str {
        match self {
            Metric::Disks => "disk",
            Metric::Fans => "fan",
            Metric::Temperature => "temperature",
            Metric::Volumes => "volume",
            Metric::Interfaces => "interface",
            Metric::Uptime => "uptime",
        }
    }

    /// Time-series measurement the records are written to.
    pub fn measurement(&self) -> &'static str {
        match self {
            Metric::Disks => "snmp_disk_stats",
            Metric::Fans => "snmp_fan_stats",
            Metric::Temperature => "snmp_temperature_measurements",
            Metric::Volumes => "snmp_volume_stats",
            Metric::Interfaces => "snmp_interface_stats",
            Metric::Uptime => "snmp_uptime",
        }
    }

    pub fn normalizer(&self, scheme: VolumeStatusScheme) -> Box<dyn TableNormalizer> {
        match self {
            Metric::Disks => Box::new(DiskTable),
            Metric::Fans => Box::new(FanTable),
            Metric::Temperature => Box::new(TemperatureTable),
            Metric::Volumes => Box::new(VolumeTable::new(scheme)),
            Metric::Interfaces => Box::new(InterfaceTable),
            Metric::Uptime => Box::new(UptimeTable),
        }
    }
}

/// A normalized row: identifying tags plus measured fields.
///
/// Serializes as one flat JSON object, tags first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    tags: Vec<(String, Scalar)>,
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&mut self, key: &str, value: Scalar) {
        upsert(&mut self.tags, key, value);
    }

    pub fn field(&mut self, key: &str, value: Scalar) {
        upsert(&mut self.fields, key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.tags
            .iter()
            .chain(self.fields.iter())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn tags(&self) -> &[(String, Scalar)] {
        &self.tags
    }

    pub fn fields(&self) -> &[(String, Scalar)] {
        &self.fields
    }
}

fn upsert(entries: &mut Vec<(String, Scalar)>, key: &str, value: Scalar) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key.to_string(), value)),
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tags.len() + self.fields.len()))?;
        for (key, value) in self.tags.iter().chain(self.fields.iter()) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Shapes the raw rows of one metric table.
#[async_trait]
pub trait TableNormalizer: Send + Sync {
    fn metric(&self) -> Metric;

    /// Columns requested from the device, in walk order.
    fn fields(&self) -> &'static [MibField];

    /// Applies the table's field rules to one row.
    ///
    /// Fails with [`Error::UnexpectedField`] on a field the table has no
    /// rule for.
    fn shape(&self, row: &RawRow, record: &mut Record) -> Result<()>;

    /// Walks the table and shapes every row, tagging each with the device name.
    async fn collect(&self, executor: &mut dyn QueryExecutor) -> Result<Vec<Record>> {
        let table = self.metric().table();
        let rows = executor.walk(self.fields()).await?;
        info!("Walked {} table: {} rows", table, rows.len());

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let host = resolve_host_name(executor).await?;

        rows.iter()
            .map(|row| {
                let mut record = Record::new();
                record.tag("host", host.clone());
                self.shape(row, &mut record)?;
                Ok(record)
            })
            .collect()
    }
}

/// Fetches `sysName.0` from the device.
pub async fn resolve_host_name(executor: &mut dyn QueryExecutor) -> Result<Scalar> {
    let rows = executor.get(&[SYS_NAME]).await?;
    rows.into_iter()
        .next()
        .and_then(|row| row.iter().next().map(|(_, value)| value.clone()))
        .ok_or_else(|| Error::Query("device returned no sysName".to_string()))
}

pub(crate) fn unexpected(metric: Metric, field: &str) -> Error {
    Error::UnexpectedField {
        table: metric.table(),
        field: field.to_string(),
    }
}

/// Runs one full poll-and-emit cycle for a single table.
///
/// Nothing reaches the emitter unless the whole table was collected.
pub async fn poll_and_emit(
    normalizer: &dyn TableNormalizer,
    executor: &mut dyn QueryExecutor,
    emitter: &mut dyn Emitter,
) -> Result<bool> {
    let records = normalizer.collect(executor).await?;
    emitter.emit(normalizer.metric(), &records).await
}
