use snmp2::{AsyncSession, Oid, Value};
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::oid::{dotted, oid_components, to_oid};
use crate::error::{Error, Result};

/// One response binding: dotted OID and the value rendered as text.
pub type Binding = (String, String);

/// Thin wrapper over an SNMPv2c session.
pub struct SnmpClientV2c {
    pub(crate) session: AsyncSession,
    timeout: Duration,
}

impl SnmpClientV2c {
    pub async fn new(target: &str, community: &[u8], request_timeout: Duration) -> Result<Self> {
        let session = AsyncSession::new_v2c(target, community, 2)
            .await
            .map_err(|e| Error::Query(format!("failed to open SNMP session to {}: {}", target, e)))?;

        Ok(Self {
            session,
            timeout: request_timeout,
        })
    }

    /// Fetches each OID with a plain GET, in order.
    pub async fn get(&mut self, oids: &[Oid<'static>]) -> Result<Vec<Binding>> {
        let mut row = Vec::with_capacity(oids.len());

        for oid in oids {
            let resp = timeout(self.timeout, self.session.get(oid))
                .await
                .map_err(|_| Error::Query(format!("GET {} timed out", oid)))?
                .map_err(|e| Error::Query(format!("GET {} failed: {:?}", oid, e)))?;

            check_error_status(&format!("GET {}", oid), resp.error_status, resp.error_index)?;

            let (name, value) = resp
                .varbinds
                .into_iter()
                .next()
                .ok_or_else(|| Error::Query(format!("empty response to GET {}", oid)))?;

            let text = render_value(&value)
                .ok_or_else(|| Error::Query(format!("no such object {}", name)))?;
            row.push((name.to_string(), text));
        }

        Ok(row)
    }

    /// Walks several table columns in step, one GETNEXT per column per step.
    ///
    /// Each step is sent as a GETBULK with `non_repeaters = 0` and
    /// `max_repetitions = 1`, which asks for exactly one successor per OID.
    pub async fn walk_columns(&mut self, columns: Vec<Vec<u64>>) -> Result<Vec<Vec<Binding>>> {
        let column_count = columns.len();
        let mut walk = ColumnWalk::new(columns);
        let mut steps = Vec::new();

        while !walk.is_done() {
            let names = walk
                .pending()
                .into_iter()
                .map(to_oid)
                .collect::<Result<Vec<_>>>()?;
            let refs: Vec<&Oid<'_>> = names.iter().collect();

            let resp = timeout(self.timeout, self.session.getbulk(&refs, 0, 1))
                .await
                .map_err(|_| Error::Query("GETNEXT step timed out".to_string()))?
                .map_err(|e| Error::Query(format!("GETNEXT step failed: {:?}", e)))?;

            check_error_status("GETNEXT step", resp.error_status, resp.error_index)?;

            let answers = resp
                .varbinds
                .map(|(oid, value)| Ok((oid_components(&oid.to_string())?, render_value(&value))))
                .collect::<Result<Vec<_>>>()?;

            let step = walk.advance(answers)?;
            if !step.is_empty() {
                steps.push(step);
            }
        }

        debug!("walk of {} columns returned {} rows", column_count, steps.len());
        Ok(steps)
    }
}

fn check_error_status(request: &str, status: u32, index: u32) -> Result<()> {
    if status != 0 {
        return Err(Error::Query(format!(
            "{} returned error status {} (index {})",
            request, status, index
        )));
    }
    Ok(())
}

/// Answer to one GETNEXT: the returned OID and its rendered value, `None`
/// for an exception value.
pub(crate) type Answer = (Vec<u64>, Option<String>);

/// Cursor bookkeeping for a multi-column walk.
///
/// A column is retired once the agent answers outside its subtree, with an
/// exception value, or not at all. An answer inside the subtree that does not
/// sort after the requested OID fails the walk.
#[derive(Debug)]
pub(crate) struct ColumnWalk {
    columns: Vec<Vec<u64>>,
    cursors: Vec<Option<Vec<u64>>>,
}

impl ColumnWalk {
    pub(crate) fn new(columns: Vec<Vec<u64>>) -> Self {
        let cursors = columns.iter().cloned().map(Some).collect();
        Self { columns, cursors }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.cursors.iter().all(Option::is_none)
    }

    /// OIDs to request next, one per live column in column order.
    pub(crate) fn pending(&self) -> Vec<&[u64]> {
        self.cursors.iter().flatten().map(Vec::as_slice).collect()
    }

    /// Consumes the answers to the last [`pending`](Self::pending) request.
    pub(crate) fn advance(&mut self, answers: Vec<Answer>) -> Result<Vec<Binding>> {
        let mut answers = answers.into_iter();
        let mut step = Vec::new();

        for pos in 0..self.cursors.len() {
            let Some(requested) = self.cursors[pos].take() else {
                continue;
            };
            let Some((oid, value)) = answers.next() else {
                continue;
            };
            let Some(text) = value.filter(|_| oid.starts_with(&self.columns[pos])) else {
                continue;
            };

            if oid <= requested {
                return Err(Error::Query(format!(
                    "agent returned non-increasing OID {} after {}",
                    dotted(&oid),
                    dotted(&requested)
                )));
            }

            step.push((dotted(&oid), text));
            self.cursors[pos] = Some(oid);
        }

        Ok(step)
    }
}

/// Renders a bound value the way a MIB-aware client would print it.
///
/// Returns `None` for the end-of-view and no-such exception values.
pub fn render_value(value: &Value<'_>) -> Option<String> {
    let text = match value {
        Value::EndOfMibView | Value::NoSuchObject | Value::NoSuchInstance => return None,
        Value::Integer(i) => i.to_string(),
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::IpAddress([a, b, c, d]) => format!("{}.{}.{}.{}", a, b, c, d),
        Value::ObjectIdentifier(oid) => oid.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Null => String::new(),
        other => format!("{:?}", other),
    };
    Some(text)
}
