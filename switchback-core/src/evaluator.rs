//! Evaluate [`Policy`].
use crate::{record::Record, Env, Policy};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluate [`Policy`].
pub trait Evaluator<E: Env> {
    /// Runs evaluation episodes and summarizes them in a [`Record`].
    ///
    /// The caller of this method needs to handle the internal state of
    /// `policy`, like the training/evaluation mode; this method only
    /// samples actions from it.
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record>;
}
