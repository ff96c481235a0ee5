//! Output sinks for normalized records.

use async_trait::async_trait;

use crate::collector::{Metric, Record};
use crate::error::Result;

pub mod influx;
pub mod json;

pub use influx::{InfluxEmitter, Point};
pub use json::JsonEmitter;

/// Receives the full batch of records for one table.
#[async_trait]
pub trait Emitter: Send {
    /// Emits the batch; `Ok(false)` when the sink rejected it.
    async fn emit(&mut self, metric: Metric, records: &[Record]) -> Result<bool>;
}
