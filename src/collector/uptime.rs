use async_trait::async_trait;
use tracing::info;

use super::{unexpected, Metric, Record, TableNormalizer, SYS_NAME};
use crate::error::Result;
use crate::snmp::{brief_name, MibField, QueryExecutor, RawRow};

const FIELDS: &[MibField] = &[
    SYS_NAME,
    MibField::new("DISMAN-EVENT-MIB", "sysUpTimeInstance"),
];

/// Device uptime in hundredths of a second.
///
/// A single GET; the host tag comes from the same response, so no separate
/// name lookup is made.
pub struct UptimeTable;

#[async_trait]
impl TableNormalizer for UptimeTable {
    fn metric(&self) -> Metric {
        Metric::Uptime
    }

    fn fields(&self) -> &'static [MibField] {
        FIELDS
    }

    fn shape(&self, row: &RawRow, record: &mut Record) -> Result<()> {
        for (name, value) in row.iter() {
            match brief_name(name)? {
                "sysName" => record.tag("host", value.clone()),
                "sysUpTimeInstance" => record.field("uptime", value.clone()),
                other => return Err(unexpected(self.metric(), other)),
            }
        }
        Ok(())
    }

    async fn collect(&self, executor: &mut dyn QueryExecutor) -> Result<Vec<Record>> {
        let rows = executor.get(self.fields()).await?;
        info!("Fetched uptime: {} rows", rows.len());

        rows.iter()
            .map(|row| {
                let mut record = Record::new();
                self.shape(row, &mut record)?;
                Ok(record)
            })
            .collect()
    }
}
