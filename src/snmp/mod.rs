//! SNMP access: value casting, OID naming, credentials and query execution.

pub mod cast;
pub mod credential;
pub mod oid;
pub mod query;
pub mod v2c;

pub use cast::{cast, Scalar};
pub use credential::{Credential, Secret, UsmUser};
pub use oid::{brief_name, display_name, dotted, oid_components, MibField};
pub use query::{QueryExecutor, RawRow, SnmpQuery, Target, DEFAULT_PORT};
pub use v2c::SnmpClientV2c;
