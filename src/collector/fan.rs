use super::{unexpected, Metric, Record, TableNormalizer, READYNAS_MIB};
use crate::error::Result;
use crate::snmp::{brief_name, MibField, RawRow, Scalar};

const FIELDS: &[MibField] = &[
    MibField::new(READYNAS_MIB, "fanNumber"),
    MibField::new(READYNAS_MIB, "fanRPM"),
    MibField::new(READYNAS_MIB, "fanStatus"),
];

/// READYNASOS-MIB `fanTable`; `fanStatus` is 0 for `ok`, 1 otherwise.
pub struct FanTable;

pub fn fan_status(status: &Scalar) -> i64 {
    if status.as_str() == Some("ok") {
        0
    } else {
        1
    }
}

impl TableNormalizer for FanTable {
    fn metric(&self) -> Metric {
        Metric::Fans
    }

    fn fields(&self) -> &'static [MibField] {
        FIELDS
    }

    fn shape(&self, row: &RawRow, record: &mut Record) -> Result<()> {
        for (name, value) in row.iter() {
            match brief_name(name)? {
                "fanNumber" => record.tag("fan_number", value.clone()),
                "fanRPM" => record.field("fan_speed_rpm", value.clone()),
                "fanStatus" => record.field("fan_status", Scalar::Integer(fan_status(value))),
                other => return Err(unexpected(self.metric(), other)),
            }
        }
        Ok(())
    }
}
