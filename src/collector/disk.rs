use super::{unexpected, Metric, Record, TableNormalizer, READYNAS_MIB};
use crate::error::Result;
use crate::snmp::{brief_name, MibField, RawRow, Scalar};

const FIELDS: &[MibField] = &[
    MibField::new(READYNAS_MIB, "diskNumber"),
    MibField::new(READYNAS_MIB, "ataError"),
    MibField::new(READYNAS_MIB, "diskState"),
    MibField::new(READYNAS_MIB, "diskTemperature"),
];

/// READYNASOS-MIB `diskTable`.
///
/// The MIB documents `diskState` as 0 (online) / 1 (offline) but the device
/// returns strings; they are folded back into that binary code. Temperatures
/// arrive in Celsius although the MIB claims Fahrenheit.
pub struct DiskTable;

/// `ONLINE` is healthy; every other reported state counts as failed.
pub fn disk_status(state: &Scalar) -> i64 {
    if state.as_str() == Some("ONLINE") {
        0
    } else {
        1
    }
}

impl TableNormalizer for DiskTable {
    fn metric(&self) -> Metric {
        Metric::Disks
    }

    fn fields(&self) -> &'static [MibField] {
        FIELDS
    }

    fn shape(&self, row: &RawRow, record: &mut Record) -> Result<()> {
        for (name, value) in row.iter() {
            match brief_name(name)? {
                "diskNumber" => record.tag("disk_number", value.clone()),
                "ataError" => record.field("ata_error_count", value.clone()),
                "diskState" => record.field("disk_status", Scalar::Integer(disk_status(value))),
                "diskTemperature" => record.field("disk_temperature", value.clone()),
                other => return Err(unexpected(self.metric(), other)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_disk_status_is_binary() {
        assert_eq!(disk_status(&Scalar::from("ONLINE")), 0);
        for state in ["OFFLINE", "online", "FAILED", ""] {
            assert_eq!(disk_status(&Scalar::from(state)), 1);
        }
        assert_eq!(disk_status(&Scalar::Integer(0)), 1);
    }

    #[test]
    fn test_shape_disk_row() {
        let row = RawRow::new()
            .with("READYNASOS-MIB::diskNumber.2", 2i64)
            .with("READYNASOS-MIB::ataError.2", 16i64)
            .with("READYNASOS-MIB::diskState.2", "ONLINE")
            .with("READYNASOS-MIB::diskTemperature.2", 35i64);

        let mut record = Record::new();
        DiskTable.shape(&row, &mut record).unwrap();

        assert_eq!(record.tags(), &[("disk_number".to_string(), Scalar::Integer(2))]);
        assert_eq!(record.get("ata_error_count"), Some(&Scalar::Integer(16)));
        assert_eq!(record.get("disk_status"), Some(&Scalar::Integer(0)));
        assert_eq!(record.get("disk_temperature"), Some(&Scalar::Integer(35)));
    }

    #[test]
    fn test_unknown_disk_field_fails() {
        let row = RawRow::new()
            .with("READYNASOS-MIB::diskNumber.1", 1i64)
            .with("READYNASOS-MIB::diskSerial.1", "WD-1234");

        let err = DiskTable.shape(&row, &mut Record::new()).unwrap_err();
        match err {
            Error::UnexpectedField { table, field } => {
                assert_eq!(table, "disk");
                assert_eq!(field, "diskSerial");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_name_fails() {
        let row = RawRow::new().with("1.3.6.1.4.1.4526.22.3.1.1.1", 1i64);
        assert!(matches!(
            DiskTable.shape(&row, &mut Record::new()),
            Err(Error::Format(_))
        ));
    }
}
