//! Record storage and aggregation.

use super::{Record, RecordValue};
use std::collections::HashSet;

/// Stores records and aggregates them into a single summary record.
///
/// Scalar values are summarized statistically; other value types keep their
/// most recent occurrence.
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(*vs.iter().min_by(|x, y| x.total_cmp(y)).unwrap())
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(*vs.iter().max_by(|x, y| x.total_cmp(y)).unwrap())
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    fn keys(&self) -> HashSet<String> {
        let mut keys = HashSet::new();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    /// The most recent value for `key`, regardless of type.
    fn last(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f32> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect();

        if vs.len() == 1 {
            Record::from_slice(&[(key.to_string(), RecordValue::Scalar(vs[0]))])
        } else {
            Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ])
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.keys() {
            let aggregated = match self.last(&key) {
                Some(RecordValue::Scalar(..)) => self.scalar(&key),
                Some(value) => Record::from_slice(&[(key.clone(), value.clone())]),
                None => continue,
            };
            record.merge_inplace(aggregated);
        }

        self.data = vec![];
        record
    }
}

impl Default for RecordStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_scalars_with_stats() {
        let mut storage = RecordStorage::new();
        for v in [1.0f32, 2.0, 3.0, 4.0] {
            storage.store(Record::from_scalar("episode_return", v));
        }

        let summary = storage.aggregate();
        assert_eq!(summary.get_scalar("episode_return_min").unwrap(), 1.0);
        assert_eq!(summary.get_scalar("episode_return_max").unwrap(), 4.0);
        assert_eq!(summary.get_scalar("episode_return_mean").unwrap(), 2.5);

        // A second aggregate sees an empty storage.
        assert!(storage.aggregate().is_empty());
    }

    #[test]
    fn single_scalar_keeps_its_key() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_scalar("loss", 0.25));

        let summary = storage.aggregate();
        assert_eq!(summary.get_scalar("loss").unwrap(), 0.25);
    }
}
