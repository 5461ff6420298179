//! Rendering hook for the training loop.
use crate::Env;
use anyhow::Result;

/// Observes the environment during training.
///
/// The trainer calls [`Self::render`] once per environment step, before the
/// action is selected, and returns only when the renderer is done with the
/// frame. A presentation layer implements this to draw the simulator state;
/// it can also request a cooperative stop, which the trainer honors at the
/// next episode boundary.
pub trait Renderer<E: Env> {
    /// Renders the current state of the environment.
    fn render(&mut self, env: &E) -> Result<()>;

    /// True if the training run should stop at the next episode boundary.
    fn stop_requested(&self) -> bool {
        false
    }
}

/// A renderer that does nothing.
pub struct NullRenderer;

impl<E: Env> Renderer<E> for NullRenderer {
    fn render(&mut self, _env: &E) -> Result<()> {
        Ok(())
    }
}
