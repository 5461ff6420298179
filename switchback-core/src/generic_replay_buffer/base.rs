//! A generic ring-buffer replay memory with uniform sampling.

use super::{BatchBase, GenericReplayBufferConfig, GenericTransitionBatch};
use crate::{error::SwitchbackError, ExperienceBufferBase, ReplayBufferBase, TransitionBatch};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

/// A fixed-capacity replay buffer over arbitrary observation and action
/// columns.
///
/// Transitions are stored columnar in preallocated ring storage: an insertion
/// cursor wraps at the capacity, so once the buffer is full every push
/// overwrites the oldest entry (FIFO eviction). Because the columns are
/// allocated once at build time, eviction releases nothing and steady-state
/// operation allocates only for sampled batches, which drop at the end of the
/// training step that uses them.
///
/// [`Self::batch`] samples uniformly at random *without replacement*, so a
/// batch never contains the same transition twice.
///
/// # Type Parameters
///
/// * `O` - The observation column type
/// * `A` - The action column type
pub struct GenericReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Maximum number of stored transitions.
    capacity: usize,

    /// Current insertion cursor. When the buffer is full, this is the slot
    /// of the oldest entry.
    i: usize,

    /// Current number of stored transitions.
    size: usize,

    /// Storage for observations.
    obs: O,

    /// Storage for actions.
    act: A,

    /// Storage for next observations.
    next_obs: O,

    /// Storage for rewards.
    reward: Vec<f32>,

    /// Storage for termination flags.
    is_terminated: Vec<i8>,

    /// Storage for truncation flags.
    is_truncated: Vec<i8>,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl<O, A> GenericReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    #[inline]
    fn push_reward(&mut self, i: usize, b: &[f32]) {
        let mut j = i;
        for r in b.iter() {
            self.reward[j] = *r;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    #[inline]
    fn push_is_terminated(&mut self, i: usize, b: &[i8]) {
        let mut j = i;
        for d in b.iter() {
            self.is_terminated[j] = *d;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    #[inline]
    fn push_is_truncated(&mut self, i: usize, b: &[i8]) {
        let mut j = i;
        for d in b.iter() {
            self.is_truncated[j] = *d;
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    fn sample_reward(&self, ixs: &Vec<usize>) -> Vec<f32> {
        ixs.iter().map(|ix| self.reward[*ix]).collect()
    }

    fn sample_is_terminated(&self, ixs: &Vec<usize>) -> Vec<i8> {
        ixs.iter().map(|ix| self.is_terminated[*ix]).collect()
    }

    fn sample_is_truncated(&self, ixs: &Vec<usize>) -> Vec<i8> {
        ixs.iter().map(|ix| self.is_truncated[*ix]).collect()
    }

    /// Returns the number of termination flags set in the buffer.
    pub fn num_terminated_flags(&self) -> usize {
        self.is_terminated.iter().map(|flag| *flag as usize).sum()
    }

    /// Returns the sum of all rewards in the buffer.
    pub fn sum_rewards(&self) -> f32 {
        self.reward.iter().sum()
    }
}

impl<O, A> ExperienceBufferBase for GenericReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = GenericTransitionBatch<O, A>;

    fn len(&self) -> usize {
        self.size
    }

    /// Appends the transitions of `tr` at the insertion cursor, overwriting
    /// the oldest entries when the buffer is full.
    fn push(&mut self, tr: Self::Item) -> Result<()> {
        let len = tr.len();
        let (obs, act, next_obs, reward, is_terminated, is_truncated) = tr.unpack();
        self.obs.push(self.i, obs);
        self.act.push(self.i, act);
        self.next_obs.push(self.i, next_obs);
        self.push_reward(self.i, &reward);
        self.push_is_terminated(self.i, &is_terminated);
        self.push_is_truncated(self.i, &is_truncated);

        self.i = (self.i + len) % self.capacity;
        self.size += len;
        if self.size >= self.capacity {
            self.size = self.capacity;
        }

        Ok(())
    }
}

impl<O, A> ReplayBufferBase for GenericReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Config = GenericReplayBufferConfig;
    type Batch = GenericTransitionBatch<O, A>;

    /// Creates a replay buffer with preallocated columns.
    ///
    /// # Errors
    ///
    /// Rejects a zero capacity.
    fn build(config: &Self::Config) -> Result<Self> {
        if config.capacity == 0 {
            return Err(
                SwitchbackError::invalid_config("capacity", "must be positive").into(),
            );
        }
        let capacity = config.capacity;

        Ok(Self {
            capacity,
            i: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![0.; capacity],
            is_terminated: vec![0; capacity],
            is_truncated: vec![0; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Samples transitions uniformly at random without replacement.
    ///
    /// A `size` larger than the current length is clamped to the length, so
    /// the returned batch holds `min(size, len)` distinct transitions.
    ///
    /// # Errors
    ///
    /// Fails with [`SwitchbackError::EmptyReplayBuffer`] when the buffer
    /// holds no transitions.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if self.size == 0 {
            return Err(SwitchbackError::EmptyReplayBuffer.into());
        }
        let amount = size.min(self.size);
        let ixs = rand::seq::index::sample(&mut self.rng, self.size, amount).into_vec();

        Ok(Self::Batch {
            obs: self.obs.sample(&ixs),
            act: self.act.sample(&ixs),
            next_obs: self.next_obs.sample(&ixs),
            reward: self.sample_reward(&ixs),
            is_terminated: self.sample_is_terminated(&ixs),
            is_truncated: self.sample_is_truncated(&ixs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic_replay_buffer::VecBatch;
    use std::collections::HashSet;

    type Buffer = GenericReplayBuffer<VecBatch<f32>, VecBatch<i64>>;

    fn transition(v: f32) -> GenericTransitionBatch<VecBatch<f32>, VecBatch<i64>> {
        GenericTransitionBatch {
            obs: VecBatch::from_vec(vec![v]),
            act: VecBatch::from_vec(vec![0]),
            next_obs: VecBatch::from_vec(vec![v + 1.0]),
            reward: vec![v],
            is_terminated: vec![0],
            is_truncated: vec![0],
        }
    }

    fn build(capacity: usize) -> Buffer {
        let config = GenericReplayBufferConfig::default().capacity(capacity);
        Buffer::build(&config).unwrap()
    }

    #[test]
    fn keeps_the_last_capacity_transitions_in_order() {
        let mut buffer = build(4);
        for v in 0..7 {
            buffer.push(transition(v as f32)).unwrap();
        }
        assert_eq!(buffer.len(), 4);

        // Oldest entry sits at the insertion cursor once the buffer is full.
        let in_order: Vec<f32> = (0..buffer.size)
            .map(|k| buffer.reward[(buffer.i + k) % buffer.capacity])
            .collect();
        assert_eq!(in_order, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn samples_distinct_transitions_from_contents() {
        let mut buffer = build(10);
        for v in 0..10 {
            buffer.push(transition(v as f32)).unwrap();
        }

        let batch = buffer.batch(5).unwrap();
        assert_eq!(batch.len(), 5);

        let rewards: Vec<f32> = batch.reward;
        let distinct: HashSet<i64> = rewards.iter().map(|r| *r as i64).collect();
        assert_eq!(distinct.len(), 5);
        assert!(rewards.iter().all(|r| *r >= 0.0 && *r < 10.0));
    }

    #[test]
    fn clamps_batch_size_to_buffer_length() {
        let mut buffer = build(10);
        for v in 0..3 {
            buffer.push(transition(v as f32)).unwrap();
        }

        let batch = buffer.batch(8).unwrap();
        assert_eq!(batch.len(), 3);

        let distinct: HashSet<i64> = batch.reward.iter().map(|r| *r as i64).collect();
        assert_eq!(distinct, vec![0, 1, 2].into_iter().collect());
    }

    #[test]
    fn fails_on_empty_buffer() {
        let mut buffer = build(8);
        assert!(buffer.batch(4).is_err());
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = GenericReplayBufferConfig::default().capacity(0);
        assert!(Buffer::build(&config).is_err());
    }

    #[test]
    fn obs_columns_follow_the_ring() {
        let mut buffer = build(3);
        for v in 0..5 {
            buffer.push(transition(v as f32)).unwrap();
        }

        let survivors: HashSet<i64> = buffer.obs.as_slice().iter().map(|o| *o as i64).collect();
        assert_eq!(survivors, vec![2, 3, 4].into_iter().collect());
    }
}
