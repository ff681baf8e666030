//! Core animation pipeline.
//!
//! - **term**: Escape sequence interpreter and SGR color resolution
//! - **diff**: Frame-to-frame cell diffing
//! - **session**: One run of one effect
//! - **scheduler**: Per-display effect rotation with background pre-loading
//!
//! # Architecture
//!
//! ```text
//! EffectScheduler
//! ├── EffectSession (active, yields frames)
//! └── PendingSession (built on a worker thread)
//!
//! frame ──> EscapeInterpreter ──> CellMap ──> FrameDiffer ──> FrameDiff
//! ```

pub mod diff;
pub mod scheduler;
pub mod session;
pub mod term;
