use serde::Deserialize;
use tracing::warn;

use super::{unexpected, Metric, Record, TableNormalizer, READYNAS_MIB};
use crate::error::Result;
use crate::snmp::{brief_name, MibField, RawRow, Scalar};

const FIELDS: &[MibField] = &[
    MibField::new(READYNAS_MIB, "volumeNumber"),
    MibField::new(READYNAS_MIB, "volumeName"),
    MibField::new(READYNAS_MIB, "volumeRAIDLevel"),
    MibField::new(READYNAS_MIB, "volumeStatus"),
    MibField::new(READYNAS_MIB, "volumeSize"),
    MibField::new(READYNAS_MIB, "volumeFreeSpace"),
];

/// Volume states reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStatus {
    Redundant,
    Degraded,
    Unprotected,
    Dead,
    Inactive,
    Unknown,
}

/// Numbering applied to [`VolumeStatus`] codes.
///
/// Two incompatible numberings exist in deployed dashboards. `ZeroBased`
/// follows READYNASOS-MIB (REDUNDANT = 0 … UNKNOWN = 5); `OneBased` shifts
/// every code up by one (REDUNDANT = 1 … UNKNOWN = 6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStatusScheme {
    #[default]
    ZeroBased,
    OneBased,
}

impl VolumeStatus {
    /// Exact, case-sensitive match on the reported string.
    pub fn from_reported(value: &str) -> Option<Self> {
        match value {
            "REDUNDANT" => Some(VolumeStatus::Redundant),
            "DEGRADED" => Some(VolumeStatus::Degraded),
            "UNPROTECTED" => Some(VolumeStatus::Unprotected),
            "DEAD" => Some(VolumeStatus::Dead),
            "INACTIVE" => Some(VolumeStatus::Inactive),
            "UNKNOWN" => Some(VolumeStatus::Unknown),
            _ => None,
        }
    }

    pub fn code(&self, scheme: VolumeStatusScheme) -> i64 {
        let base = match self {
            VolumeStatus::Redundant => 0,
            VolumeStatus::Degraded => 1,
            VolumeStatus::Unprotected => 2,
            VolumeStatus::Dead => 3,
            VolumeStatus::Inactive => 4,
            VolumeStatus::Unknown => 5,
        };
        match scheme {
            VolumeStatusScheme::ZeroBased => base,
            VolumeStatusScheme::OneBased => base + 1,
        }
    }
}

/// READYNASOS-MIB `volumeTable`, plus the derived used space.
pub struct VolumeTable {
    scheme: VolumeStatusScheme,
}

impl VolumeTable {
    pub fn new(scheme: VolumeStatusScheme) -> Self {
        Self { scheme }
    }
}

impl TableNormalizer for VolumeTable {
    fn metric(&self) -> Metric {
        Metric::Volumes
    }

    fn fields(&self) -> &'static [MibField] {
        FIELDS
    }

    fn shape(&self, row: &RawRow, record: &mut Record) -> Result<()> {
        let mut total: Option<&Scalar> = None;
        let mut free: Option<&Scalar> = None;

        for (name, value) in row.iter() {
            match brief_name(name)? {
                "volumeNumber" => record.tag("volume_number", value.clone()),
                "volumeName" => record.field("volume_name", value.clone()),
                "volumeRAIDLevel" => record.field("volume_raid_level", value.clone()),
                "volumeStatus" => {
                    match value.as_str().and_then(VolumeStatus::from_reported) {
                        Some(status) => {
                            record.field("volume_status", Scalar::Integer(status.code(self.scheme)))
                        }
                        None => warn!("Unrecognised volume status {:?} in {}", value, name),
                    }
                }
                "volumeSize" => {
                    record.field("volume_total_size_mb", value.clone());
                    total = Some(value);
                }
                "volumeFreeSpace" => {
                    record.field("volume_free_space_mb", value.clone());
                    free = Some(value);
                }
                other => return Err(unexpected(self.metric(), other)),
            }
        }

        // Only once both halves of the row have been seen.
        if let (Some(total), Some(free)) = (total, free) {
            match total.checked_sub(free) {
                Some(used) => record.field("volume_used_space_mb", used),
                None => warn!("Cannot derive used space from size {} and free {}", total, free),
            }
        }

        Ok(())
    }
}
