use snmp2::Oid;
use std::fmt;

use crate::error::{Error, Result};

/// Splits a dotted numeric OID into its sub-identifiers.
///
/// A leading dot is accepted. Slices of components order the same way the
/// OIDs do, which is what the walk relies on.
pub fn oid_components(dotted: &str) -> Result<Vec<u64>> {
    dotted
        .trim()
        .trim_start_matches('.')
        .split('.')
        .map(|p| p.parse::<u64>().map_err(|_| Error::Format(dotted.to_string())))
        .collect()
}

/// Renders sub-identifiers as a dotted OID.
pub fn dotted(components: &[u64]) -> String {
    components
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

pub(crate) fn to_oid(components: &[u64]) -> Result<Oid<'static>> {
    Oid::from(components).map_err(|e| Error::Query(format!("{}: {:?}", dotted(components), e)))
}

/// Extracts the attribute from a `MIB::attribute.index` display name.
///
/// `READYNASOS-MIB::diskNumber.3` yields `diskNumber`.
pub fn brief_name(display: &str) -> Result<&str> {
    let malformed = || Error::Format(display.to_string());
    let (_, rest) = display.split_once("::").ok_or_else(malformed)?;
    let (attribute, _) = rest.split_once('.').ok_or_else(malformed)?;
    if attribute.is_empty() {
        return Err(malformed());
    }
    Ok(attribute)
}

/// A named MIB object requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MibField {
    pub module: &'static str,
    pub name: &'static str,
}

impl MibField {
    pub const fn new(module: &'static str, name: &'static str) -> Self {
        Self { module, name }
    }

    /// Numeric OID of the column (or scalar object) this field names.
    pub fn components(&self) -> Result<&'static [u64]> {
        MIB_OBJECTS
            .iter()
            .find(|o| o.module == self.module && o.name == self.name)
            .map(|o| o.oid)
            .ok_or_else(|| Error::Query(format!("unknown MIB object {}", self)))
    }

    /// OID of the `.0` instance, for scalar GETs.
    pub fn instance_oid(&self) -> Result<Oid<'static>> {
        let mut components = self.components()?.to_vec();
        components.push(0);
        to_oid(&components)
    }
}

impl fmt::Display for MibField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

struct MibObject {
    module: &'static str,
    name: &'static str,
    oid: &'static [u64],
}

const fn obj(module: &'static str, name: &'static str, oid: &'static [u64]) -> MibObject {
    MibObject { module, name, oid }
}

const READYNAS: &str = "READYNASOS-MIB";
const IF_MIB: &str = "IF-MIB";

// Objects this poller knows how to name. READYNASOS-MIB lives under
// enterprise 4526 (Netgear), subtree 22.
static MIB_OBJECTS: &[MibObject] = &[
    obj("SNMPv2-MIB", "sysName", &[1, 3, 6, 1, 2, 1, 1, 5]),
    // sysUpTime.0 is rendered under its DISMAN-EVENT-MIB alias
    obj("DISMAN-EVENT-MIB", "sysUpTimeInstance", &[1, 3, 6, 1, 2, 1, 1, 3]),
    // diskTable
    obj(READYNAS, "diskNumber", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 1]),
    obj(READYNAS, "diskID", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 2]),
    obj(READYNAS, "diskSlotName", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 3]),
    obj(READYNAS, "diskSerial", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 4]),
    obj(READYNAS, "diskModel", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 5]),
    obj(READYNAS, "ataError", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 8]),
    obj(READYNAS, "diskState", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 9]),
    obj(READYNAS, "diskTemperature", &[1, 3, 6, 1, 4, 1, 4526, 22, 3, 1, 10]),
    // fanTable
    obj(READYNAS, "fanNumber", &[1, 3, 6, 1, 4, 1, 4526, 22, 4, 1, 1]),
    obj(READYNAS, "fanRPM", &[1, 3, 6, 1, 4, 1, 4526, 22, 4, 1, 2]),
    obj(READYNAS, "fanStatus", &[1, 3, 6, 1, 4, 1, 4526, 22, 4, 1, 3]),
    // temperatureTable
    obj(READYNAS, "temperatureNumber", &[1, 3, 6, 1, 4, 1, 4526, 22, 5, 1, 1]),
    obj(READYNAS, "temperatureValue", &[1, 3, 6, 1, 4, 1, 4526, 22, 5, 1, 2]),
    // volumeTable
    obj(READYNAS, "volumeNumber", &[1, 3, 6, 1, 4, 1, 4526, 22, 7, 1, 1]),
    obj(READYNAS, "volumeName", &[1, 3, 6, 1, 4, 1, 4526, 22, 7, 1, 2]),
    obj(READYNAS, "volumeRAIDLevel", &[1, 3, 6, 1, 4, 1, 4526, 22, 7, 1, 3]),
    obj(READYNAS, "volumeStatus", &[1, 3, 6, 1, 4, 1, 4526, 22, 7, 1, 4]),
    obj(READYNAS, "volumeSize", &[1, 3, 6, 1, 4, 1, 4526, 22, 7, 1, 5]),
    obj(READYNAS, "volumeFreeSpace", &[1, 3, 6, 1, 4, 1, 4526, 22, 7, 1, 6]),
    // ifTable
    obj(IF_MIB, "ifIndex", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1]),
    obj(IF_MIB, "ifType", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 3]),
    obj(IF_MIB, "ifAdminStatus", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 7]),
    obj(IF_MIB, "ifOperStatus", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8]),
    obj(IF_MIB, "ifInDiscards", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 13]),
    obj(IF_MIB, "ifInErrors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 14]),
    obj(IF_MIB, "ifOutDiscards", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 19]),
    obj(IF_MIB, "ifOutErrors", &[1, 3, 6, 1, 2, 1, 2, 2, 1, 20]),
    // ifXTable
    obj(IF_MIB, "ifName", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1]),
    obj(IF_MIB, "ifHCInOctets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 6]),
    obj(IF_MIB, "ifHCInUcastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 7]),
    obj(IF_MIB, "ifHCInMulticastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 8]),
    obj(IF_MIB, "ifHCInBroadcastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 9]),
    obj(IF_MIB, "ifHCOutOctets", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 10]),
    obj(IF_MIB, "ifHCOutUcastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 11]),
    obj(IF_MIB, "ifHCOutMulticastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 12]),
    obj(IF_MIB, "ifHCOutBroadcastPkts", &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 13]),
];

/// Renders a numeric OID as `MIB::name.index` using the longest known prefix.
///
/// OIDs outside the registry are returned unchanged.
pub fn display_name(dotted: &str) -> String {
    let parts: Vec<&str> = dotted
        .trim()
        .trim_start_matches('.')
        .split('.')
        .filter(|p| !p.is_empty())
        .collect();

    let best = MIB_OBJECTS
        .iter()
        .filter(|o| {
            o.oid.len() <= parts.len()
                && o.oid
                    .iter()
                    .zip(&parts)
                    .all(|(n, p)| p.parse::<u64>().ok() == Some(*n))
        })
        .max_by_key(|o| o.oid.len());

    match best {
        Some(o) if parts.len() > o.oid.len() => {
            format!("{}::{}.{}", o.module, o.name, parts[o.oid.len()..].join("."))
        }
        Some(o) => format!("{}::{}", o.module, o.name),
        None => parts.join("."),
    }
}
