use super::{unexpected, Metric, Record, TableNormalizer};
use crate::error::Result;
use crate::snmp::{brief_name, MibField, RawRow};

const IF_MIB: &str = "IF-MIB";

// Byte and packet counts come from the 64-bit ifXTable counters only.
const FIELDS: &[MibField] = &[
    MibField::new(IF_MIB, "ifIndex"),
    MibField::new(IF_MIB, "ifName"),
    MibField::new(IF_MIB, "ifType"),
    MibField::new(IF_MIB, "ifAdminStatus"),
    MibField::new(IF_MIB, "ifOperStatus"),
    MibField::new(IF_MIB, "ifHCInOctets"),
    MibField::new(IF_MIB, "ifHCInUcastPkts"),
    MibField::new(IF_MIB, "ifHCInMulticastPkts"),
    MibField::new(IF_MIB, "ifHCInBroadcastPkts"),
    MibField::new(IF_MIB, "ifHCOutOctets"),
    MibField::new(IF_MIB, "ifHCOutUcastPkts"),
    MibField::new(IF_MIB, "ifHCOutMulticastPkts"),
    MibField::new(IF_MIB, "ifHCOutBroadcastPkts"),
    MibField::new(IF_MIB, "ifInDiscards"),
    MibField::new(IF_MIB, "ifInErrors"),
    MibField::new(IF_MIB, "ifOutDiscards"),
    MibField::new(IF_MIB, "ifOutErrors"),
];

/// IF-MIB interface counters.
///
/// `ifName` identifies the row; every other requested column passes through
/// under its own name, status columns included, without translation.
pub struct InterfaceTable;

impl TableNormalizer for InterfaceTable {
    fn metric(&self) -> Metric {
        Metric::Interfaces
    }

    fn fields(&self) -> &'static [MibField] {
        FIELDS
    }

    fn shape(&self, row: &RawRow, record: &mut Record) -> Result<()> {
        for (name, value) in row.iter() {
            let field = brief_name(name)?;
            if field == "ifName" {
                record.tag(field, value.clone());
            } else if FIELDS.iter().any(|f| f.name == field) {
                record.field(field, value.clone());
            } else {
                return Err(unexpected(self.metric(), field));
            }
        }
        Ok(())
    }
}
