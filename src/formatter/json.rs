use async_trait::async_trait;
use std::io::Write;
use tracing::debug;

use super::Emitter;
use crate::collector::{Metric, Record};
use crate::error::Result;

/// Writes each batch as one JSON array, for the Telegraf `exec` input.
pub struct JsonEmitter<W> {
    out: W,
    pretty: bool,
}

impl JsonEmitter<std::io::Stdout> {
    pub fn stdout(pretty: bool) -> Self {
        Self::new(std::io::stdout(), pretty)
    }
}

impl<W: Write + Send> JsonEmitter<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self { out, pretty }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Serializes the records; every tag and field sits flat in one object.
    pub fn to_json_string(records: &[Record], pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(records)?
        } else {
            serde_json::to_string(records)?
        };
        Ok(json)
    }
}

#[async_trait]
impl<W: Write + Send> Emitter for JsonEmitter<W> {
    async fn emit(&mut self, metric: Metric, records: &[Record]) -> Result<bool> {
        let json = Self::to_json_string(records, self.pretty)?;
        debug!("Emitting {} {} records as JSON", records.len(), metric.table());

        writeln!(self.out, "{}", json)?;
        self.out.flush()?;
        Ok(true)
    }
}
