use super::{unexpected, Metric, Record, TableNormalizer, READYNAS_MIB};
use crate::error::Result;
use crate::snmp::{brief_name, MibField, RawRow};

const FIELDS: &[MibField] = &[
    MibField::new(READYNAS_MIB, "temperatureNumber"),
    MibField::new(READYNAS_MIB, "temperatureValue"),
];

/// READYNASOS-MIB `temperatureTable`.
///
/// Values are Celsius as reported; the MIB's Fahrenheit units are wrong and
/// no conversion is applied.
pub struct TemperatureTable;

impl TableNormalizer for TemperatureTable {
    fn metric(&self) -> Metric {
        Metric::Temperature
    }

    fn fields(&self) -> &'static [MibField] {
        FIELDS
    }

    fn shape(&self, row: &RawRow, record: &mut Record) -> Result<()> {
        for (name, value) in row.iter() {
            match brief_name(name)? {
                "temperatureNumber" => record.tag("temperature_number", value.clone()),
                "temperatureValue" => record.field("temperature_celsius", value.clone()),
                other => return Err(unexpected(self.metric(), other)),
            }
        }
        Ok(())
    }
}
