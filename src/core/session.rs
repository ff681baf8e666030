//! Effect sessions
//!
//! A session is one run of one effect over the art, bound to a canvas size.
//! It hands out frames until the effect is exhausted and is never restarted.

use std::iter::Fuse;

use thiserror::Error;

use crate::effects::{self, Canvas, EffectInput, Frame, FrameIter};

/// Session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),
}

/// One running effect
pub struct EffectSession {
    /// Effect name (from the catalog)
    name: &'static str,
    /// Frame source; fused so exhaustion is permanent
    frames: Fuse<FrameIter>,
    /// Canvas the effect was laid out for
    canvas: Canvas,
    /// Frames handed out so far
    pulled: u64,
    completed: bool,
}

impl std::fmt::Debug for EffectSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectSession")
            .field("name", &self.name)
            .field("canvas", &self.canvas)
            .field("pulled", &self.pulled)
            .field("completed", &self.completed)
            .finish()
    }
}

impl EffectSession {
    /// Create a session for `name`. The art is anchored at the canvas center.
    pub fn create(text: &str, name: &str, canvas: Canvas, seed: u64) -> Result<Self, SessionError> {
        let entry = effects::find(name).ok_or_else(|| SessionError::UnknownEffect(name.to_string()))?;
        let frames = (entry.build)(EffectInput { text, canvas, seed }).fuse();

        tracing::debug!(
            "Created session: effect={}, canvas={}x{}, seed={}",
            entry.name,
            canvas.width,
            canvas.height,
            seed
        );

        Ok(Self {
            name: entry.name,
            frames,
            canvas,
            pulled: 0,
            completed: false,
        })
    }

    /// Next frame, or `None` once the effect has finished (and forever after)
    pub fn pull(&mut self) -> Option<Frame> {
        if self.completed {
            return None;
        }
        match self.frames.next() {
            Some(frame) => {
                self.pulled += 1;
                Some(frame)
            }
            None => {
                self.completed = true;
                None
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn frames_pulled(&self) -> u64 {
        self.pulled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas::new(20, 6);

    #[test]
    fn test_unknown_effect() {
        let err = EffectSession::create("x", "Nope", CANVAS, 0).unwrap_err();
        assert_eq!(err, SessionError::UnknownEffect("Nope".to_string()));
    }

    #[test]
    fn test_runs_to_completion_and_stays_completed() {
        let mut session = EffectSession::create("HELLO", "Wipe", CANVAS, 1).unwrap();
        assert_eq!(session.name(), "Wipe");
        assert!(!session.is_completed());

        let mut count = 0u64;
        while session.pull().is_some() {
            count += 1;
            assert!(count < 10_000);
        }

        assert!(session.is_completed());
        assert_eq!(session.frames_pulled(), count);
        assert!(session.pull().is_none());
        assert!(session.pull().is_none());
        assert_eq!(session.frames_pulled(), count);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = EffectSession::create("HI", "Print", CANVAS, 5).unwrap();
        let mut b = EffectSession::create("HI", "Print", CANVAS, 5).unwrap();

        a.pull();
        a.pull();
        assert_eq!(a.frames_pulled(), 2);
        assert_eq!(b.frames_pulled(), 0);
        assert!(b.pull().is_some());
    }
}
