//! Columnar transition batches.

use crate::TransitionBatch;

/// A trait for the columns of a replay buffer.
///
/// A column is a preallocated, fixed-capacity store for one field of a
/// transition (observations or actions). Writing wraps at the capacity, which
/// gives the buffer its ring semantics.
pub trait BatchBase {
    /// Creates a column with the given capacity.
    fn new(capacity: usize) -> Self;

    /// Writes `data` starting at index `ix`, wrapping at the capacity.
    fn push(&mut self, ix: usize, data: Self);

    /// Gathers the rows at the given indices into a new batch.
    fn sample(&self, ixs: &Vec<usize>) -> Self;
}

/// A plain vector column.
///
/// Backs columns whose rows are single values, and serves as the in-memory
/// batch type in tests.
#[derive(Clone, Debug)]
pub struct VecBatch<T>(Vec<T>);

impl<T> VecBatch<T> {
    /// Creates a column from the given rows.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self(data)
    }

    /// The rows of this column.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Consumes the column and returns its rows.
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> BatchBase for VecBatch<T>
where
    T: Clone + Default,
{
    fn new(capacity: usize) -> Self {
        Self(vec![T::default(); capacity])
    }

    fn push(&mut self, ix: usize, data: Self) {
        let capacity = self.0.len();
        let mut j = ix;
        for v in data.0.into_iter() {
            self.0[j] = v;
            j += 1;
            if j == capacity {
                j = 0;
            }
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        Self(ixs.iter().map(|ix| self.0[*ix].clone()).collect())
    }
}

impl<T: Clone + Default> From<T> for VecBatch<T> {
    fn from(v: T) -> Self {
        Self(vec![v])
    }
}

/// A columnar batch of transitions `(o_t, a_t, o_t+1, r_t, flags)`.
///
/// Returned by [`GenericReplayBuffer::batch`] and also used, with a single
/// row, as the item pushed into the buffer by [`GenericStepProcessor`].
///
/// [`GenericReplayBuffer::batch`]: super::GenericReplayBuffer
/// [`GenericStepProcessor`]: super::GenericStepProcessor
pub struct GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations before the step.
    pub obs: O,

    /// Selected actions.
    pub act: A,

    /// Observations after the step.
    pub next_obs: O,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Termination flags, 1 where the episode reached a terminal state.
    pub is_terminated: Vec<i8>,

    /// Truncation flags, 1 where the episode was cut by a step budget.
    pub is_truncated: Vec<i8>,
}

impl<O, A> TransitionBatch for GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<i8>,
    ) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_terminated,
            self.is_truncated,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }

    fn obs(&self) -> &Self::ObsBatch {
        &self.obs
    }

    fn act(&self) -> &Self::ActBatch {
        &self.act
    }
}
