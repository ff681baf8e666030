//! Display management - monitors, pacing and input.
//!
//! - **coordinator**: `DisplayCoordinator`, one binding per monitor
//! - **monitor**: Monitor rectangles, even splits and validation
//! - **clock**: Frame pacing
//! - **input**: Exit detection and event sources
//!
//! # Module Hierarchy
//!
//! ```text
//! wm/
//! ├── mod.rs          - Module exports
//! ├── coordinator.rs  - DisplayCoordinator (top-level render loop)
//! ├── monitor.rs      - Monitor layout
//! ├── clock.rs        - FrameClock
//! └── input.rs        - InputEvent, ExitDetector, EventSource
//! ```

pub mod clock;
pub mod coordinator;
pub mod input;
pub mod monitor;

pub use coordinator::{CoordinatorSettings, DisplayCoordinator, RunSummary};
pub use input::{ScriptedEvents, TerminalEvents};
pub use monitor::{Monitor, SplitDirection};
