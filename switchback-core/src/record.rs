//! Types and traits for recording training metrics.
//!
//! [`Record`] is a string-keyed container of metric values produced by
//! environments, agents and the trainer. A [`Recorder`] receives records
//! during training: `store` buffers them, `flush` aggregates everything
//! buffered since the last flush into one summary record.
//!
//! Two sinks are provided: [`BufferedRecorder`] keeps the aggregated
//! summaries in memory for later inspection, [`NullRecorder`] discards
//! everything.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;
