use super::Record;

/// Receives records produced during training.
pub trait Recorder {
    /// Writes a record to the output destination immediately.
    fn write(&mut self, record: Record);

    /// Buffers a record for aggregation.
    fn store(&mut self, record: Record);

    /// Aggregates the buffered records into a summary and writes it.
    ///
    /// `step` tags the summary, e.g. with a training iteration index.
    fn flush(&mut self, step: i64);
}
