//! Text effect catalog
//!
//! Every effect turns a piece of art into a finite, lazily produced sequence
//! of escape-coded frames. Effects are seeded so the same input always
//! replays the same animation.

pub mod art;
mod decrypt;
mod expand;
mod matrix;
mod print;
mod rain;
mod registry;
mod slide;
mod wipe;

pub use art::Canvas;
pub use registry::{find, names, EnabledEffects};

/// One tick's worth of escape-coded text
pub type Frame = String;

/// A running effect
pub type FrameIter = Box<dyn Iterator<Item = Frame> + Send>;

/// Everything an effect needs to plan its animation
#[derive(Debug, Clone, Copy)]
pub struct EffectInput<'a> {
    pub text: &'a str,
    pub canvas: Canvas,
    pub seed: u64,
}
