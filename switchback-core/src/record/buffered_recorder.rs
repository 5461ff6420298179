use super::{Record, RecordStorage, Recorder, RecordValue};

/// A recorder that keeps everything in memory.
///
/// Stored records are aggregated on [`Recorder::flush`] into one summary
/// record per flush, tagged with the flush step under the key `"step"`.
/// The summaries can be inspected after the run with [`Self::iter`].
#[derive(Default)]
pub struct BufferedRecorder {
    storage: RecordStorage,
    flushed: Vec<Record>,
}

impl BufferedRecorder {
    /// Constructs the recorder.
    pub fn new() -> Self {
        Self {
            storage: RecordStorage::new(),
            flushed: Vec::default(),
        }
    }

    /// Returns an iterator over the written records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.flushed.iter()
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.flushed.len()
    }

    /// Returns true if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.flushed.is_empty()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.flushed.push(record);
    }

    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let mut summary = self.storage.aggregate();
        if summary.is_empty() {
            return;
        }
        summary.insert("step", RecordValue::Scalar(step as f32));
        self.flushed.push(summary);
    }
}
