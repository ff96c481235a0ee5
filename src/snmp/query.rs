use async_trait::async_trait;
use tokio::time::Duration;
use tracing::debug;

use super::cast::{cast, Scalar};
use super::credential::Credential;
use super::oid::{display_name, MibField};
use super::v2c::{Binding, SnmpClientV2c};
use crate::error::Result;

pub const DEFAULT_PORT: u16 = 161;

/// One table row (or one GET response), keyed by display name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    entries: Vec<(String, Scalar)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a binding, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Scalar) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_bindings(bindings: Vec<Binding>) -> Self {
        let mut row = RawRow::new();
        for (oid, text) in bindings {
            row.insert(display_name(&oid), cast(&text));
        }
        row
    }
}

impl FromIterator<(String, Scalar)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

/// SNMP agent address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Issues SNMP queries on behalf of the table normalizers.
#[async_trait]
pub trait QueryExecutor: Send {
    /// Walks the given columns in order; one row per protocol step.
    async fn walk(&mut self, fields: &[MibField]) -> Result<Vec<RawRow>>;

    /// Fetches the `.0` instance of each field; a single row.
    async fn get(&mut self, fields: &[MibField]) -> Result<Vec<RawRow>>;
}

/// Query executor backed by a live SNMPv2c session.
pub struct SnmpQuery {
    client: SnmpClientV2c,
}

impl SnmpQuery {
    pub async fn connect(
        target: Target,
        credential: &Credential,
        request_timeout: Duration,
    ) -> Result<Self> {
        let address = target.address();
        let client = SnmpClientV2c::new(&address, credential.community(), request_timeout).await?;
        debug!("SNMP session opened to {}", address);
        Ok(Self { client })
    }
}

#[async_trait]
impl QueryExecutor for SnmpQuery {
    async fn walk(&mut self, fields: &[MibField]) -> Result<Vec<RawRow>> {
        let columns = fields
            .iter()
            .map(|f| f.components().map(<[u64]>::to_vec))
            .collect::<Result<Vec<_>>>()?;

        let steps = self.client.walk_columns(columns).await?;
        Ok(steps.into_iter().map(RawRow::from_bindings).collect())
    }

    async fn get(&mut self, fields: &[MibField]) -> Result<Vec<RawRow>> {
        let oids = fields
            .iter()
            .map(|f| f.instance_oid())
            .collect::<Result<Vec<_>>>()?;

        let bindings = self.client.get(&oids).await?;
        Ok(vec![RawRow::from_bindings(bindings)])
    }
}
