//! Effect scheduling
//!
//! Each display has one scheduler. It plays the active session and, while
//! that runs, builds the next one on a short-lived worker thread so the
//! switch itself costs nothing but a channel receive.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::session::{EffectSession, SessionError};
use crate::effects::{Canvas, EnabledEffects, Frame};

/// Default wait for a pre-loaded session
pub const DEFAULT_SWITCH_TIMEOUT: Duration = Duration::from_millis(50);

/// Scheduler errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Failed to spawn pre-load worker: {0}")]
    Spawn(#[source] io::Error),

    #[error("Failed to build first session: {0}")]
    Session(#[from] SessionError),
}

/// Which effect plays first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSelection {
    Random,
    /// Index into the enabled list, wrapping
    Index(usize),
}

/// Result of a switch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The pre-loaded session is now active
    Switched(&'static str),
    /// The pre-load did not arrive in time; the old session stays
    NotReady,
    /// The pre-load was lost and a new one has been started
    Restarted,
}

/// Builds a session (text, effect name, canvas, seed)
pub type SessionBuilder = fn(&str, &str, Canvas, u64) -> Result<EffectSession, SessionError>;

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// How long `advance` may block
    pub switch_timeout: Duration,
    /// Seed for effect selection; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            switch_timeout: DEFAULT_SWITCH_TIMEOUT,
            seed: None,
        }
    }
}

/// A session under construction
struct PendingSession {
    name: &'static str,
    rx: Receiver<Result<EffectSession, SessionError>>,
}

pub struct EffectScheduler {
    text: Arc<str>,
    enabled: EnabledEffects,
    canvas: Canvas,
    options: SchedulerOptions,
    builder: SessionBuilder,
    rng: StdRng,
    active: EffectSession,
    pending: Option<PendingSession>,
    switches: u64,
}

impl EffectScheduler {
    pub fn new(
        text: &str,
        enabled: EnabledEffects,
        canvas: Canvas,
        start: StartSelection,
        options: SchedulerOptions,
    ) -> Result<Self, SchedulerError> {
        Self::with_builder(text, enabled, canvas, start, options, EffectSession::create)
    }

    /// Like [`EffectScheduler::new`] with a custom session factory
    pub fn with_builder(
        text: &str,
        enabled: EnabledEffects,
        canvas: Canvas,
        start: StartSelection,
        options: SchedulerOptions,
        builder: SessionBuilder,
    ) -> Result<Self, SchedulerError> {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let index = match start {
            StartSelection::Random => rng.gen_range(0..enabled.len()),
            StartSelection::Index(i) => i,
        };
        let first = enabled.get_wrapped(index);
        let active = builder(text, first, canvas, rng.gen())?;

        tracing::info!(
            "Scheduler started: effect={}, canvas={}x{}, enabled={}",
            first,
            canvas.width,
            canvas.height,
            enabled.len()
        );

        let mut scheduler = Self {
            text: Arc::from(text),
            enabled,
            canvas,
            options,
            builder,
            rng,
            active,
            pending: None,
            switches: 0,
        };
        scheduler.start_preload()?;
        Ok(scheduler)
    }

    /// Next frame of the active session
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.active.pull()
    }

    /// Try to swap in the pre-loaded session, waiting at most the switch timeout
    pub fn advance(&mut self) -> AdvanceOutcome {
        let Some(pending) = self.pending.as_ref() else {
            self.restart_preload();
            return AdvanceOutcome::Restarted;
        };

        let pending_name = pending.name;
        let received = pending.rx.recv_timeout(self.options.switch_timeout);

        match received {
            Ok(Ok(session)) => {
                self.pending = None;
                if !self.active.is_completed() {
                    tracing::debug!("Leaving {} before it finished", self.active.name());
                }
                let previous = self.active.name();
                let played = self.active.frames_pulled();
                self.active = session;
                self.switches += 1;
                tracing::info!(
                    "Switched effect: {} ({} frames) -> {}",
                    previous,
                    played,
                    self.active.name()
                );
                self.restart_preload();
                AdvanceOutcome::Switched(self.active.name())
            }
            Ok(Err(e)) => {
                tracing::warn!("Pre-load failed: {}", e);
                self.restart_preload();
                AdvanceOutcome::Restarted
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "Pre-load of {} not ready after {:?}, holding",
                    pending_name,
                    self.options.switch_timeout
                );
                AdvanceOutcome::NotReady
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::error!("Pre-load worker for {} exited without a session", pending_name);
                self.restart_preload();
                AdvanceOutcome::Restarted
            }
        }
    }

    pub fn current_name(&self) -> &'static str {
        self.active.name()
    }

    /// Effect being built in the background, if any
    pub fn pending_name(&self) -> Option<&'static str> {
        self.pending.as_ref().map(|p| p.name)
    }

    pub fn switches(&self) -> u64 {
        self.switches
    }

    fn restart_preload(&mut self) {
        self.pending = None;
        if let Err(e) = self.start_preload() {
            tracing::error!("{}", e);
        }
    }

    /// Pick the next effect and build it on a fresh worker
    fn start_preload(&mut self) -> Result<(), SchedulerError> {
        let name = self.pick_next();
        let seed: u64 = self.rng.gen();
        let (tx, rx) = mpsc::sync_channel(1);

        let text = Arc::clone(&self.text);
        let canvas = self.canvas;
        let builder = self.builder;
        thread::Builder::new()
            .name(format!("preload-{}", name.to_lowercase()))
            .spawn(move || {
                let result = builder(&text, name, canvas, seed);
                // The scheduler may be gone by now
                let _ = tx.send(result);
            })
            .map_err(SchedulerError::Spawn)?;

        tracing::debug!("Pre-loading {} (seed {})", name, seed);
        self.pending = Some(PendingSession { name, rx });
        Ok(())
    }

    /// Uniform among enabled effects other than the active one
    fn pick_next(&mut self) -> &'static str {
        let current = self.active.name();
        let candidates: Vec<&'static str> = self
            .enabled
            .names()
            .iter()
            .copied()
            .filter(|n| *n != current)
            .collect();
        if candidates.is_empty() {
            return current;
        }
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const CANVAS: Canvas = Canvas::new(24, 6);

    fn options(ms: u64) -> SchedulerOptions {
        SchedulerOptions {
            switch_timeout: Duration::from_millis(ms),
            seed: Some(11),
        }
    }

    fn enabled(names: &[&str]) -> EnabledEffects {
        EnabledEffects::validate(names)
    }

    fn slow_print(text: &str, name: &str, canvas: Canvas, seed: u64) -> Result<EffectSession, SessionError> {
        if name == "Print" {
            thread::sleep(Duration::from_millis(400));
        }
        EffectSession::create(text, name, canvas, seed)
    }

    fn broken_print(text: &str, name: &str, canvas: Canvas, seed: u64) -> Result<EffectSession, SessionError> {
        if name == "Print" {
            panic!("worker blew up");
        }
        EffectSession::create(text, name, canvas, seed)
    }

    /// Call `advance` until it switches, bounded
    fn advance_until_switched(scheduler: &mut EffectScheduler) -> &'static str {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let AdvanceOutcome::Switched(name) = scheduler.advance() {
                return name;
            }
            assert!(Instant::now() < deadline, "never switched");
        }
    }

    #[test]
    fn test_start_index_wraps() {
        let s = EffectScheduler::new("A", enabled(&["Wipe", "Slide"]), CANVAS, StartSelection::Index(3), options(50)).unwrap();
        assert_eq!(s.current_name(), "Slide");
    }

    #[test]
    fn test_preload_differs_from_active() {
        let s = EffectScheduler::new("A", enabled(&["Wipe", "Slide", "Print"]), CANVAS, StartSelection::Index(0), options(50)).unwrap();
        let pending = s.pending_name().unwrap();
        assert_ne!(pending, "Wipe");
    }

    #[test]
    fn test_single_effect_preloads_itself() {
        let mut s = EffectScheduler::new("A", enabled(&["Expand"]), CANVAS, StartSelection::Random, options(50)).unwrap();
        assert_eq!(s.pending_name(), Some("Expand"));
        assert_eq!(advance_until_switched(&mut s), "Expand");
        assert_eq!(s.switches(), 1);
    }

    #[test]
    fn test_switch_after_exhaustion() {
        let mut s = EffectScheduler::new("HEY", enabled(&["Wipe", "Slide"]), CANVAS, StartSelection::Index(0), options(50)).unwrap();
        while s.next_frame().is_some() {}
        assert!(s.next_frame().is_none());

        assert_eq!(advance_until_switched(&mut s), "Slide");
        assert_eq!(s.current_name(), "Slide");
        assert!(s.next_frame().is_some());
        assert_eq!(s.pending_name(), Some("Wipe"));
    }

    #[test]
    fn test_advance_is_bounded_when_not_ready() {
        let mut s = EffectScheduler::with_builder(
            "A",
            enabled(&["Wipe", "Print"]),
            CANVAS,
            StartSelection::Index(0),
            options(20),
            slow_print,
        )
        .unwrap();

        let started = Instant::now();
        assert_eq!(s.advance(), AdvanceOutcome::NotReady);
        assert!(started.elapsed() < Duration::from_millis(300));
        assert_eq!(s.current_name(), "Wipe");
        assert_eq!(s.pending_name(), Some("Print"));

        assert_eq!(advance_until_switched(&mut s), "Print");
    }

    #[test]
    fn test_advance_never_stalls_past_timeout() {
        let mut s = EffectScheduler::new("HELLO", enabled(&["Matrix", "Rain", "Decrypt"]), CANVAS, StartSelection::Random, options(50)).unwrap();
        for _ in 0..5 {
            let started = Instant::now();
            s.advance();
            assert!(started.elapsed() < Duration::from_millis(500));
        }
    }

    #[test]
    fn test_dead_worker_restarts_preload() {
        let mut s = EffectScheduler::with_builder(
            "A",
            enabled(&["Wipe", "Print"]),
            CANVAS,
            StartSelection::Index(0),
            options(500),
            broken_print,
        )
        .unwrap();

        assert_eq!(s.advance(), AdvanceOutcome::Restarted);
        assert_eq!(s.current_name(), "Wipe");
        assert_eq!(s.pending_name(), Some("Print"));
    }

    #[test]
    fn test_distinct_start_indices_differ() {
        let names = enabled(&["Matrix", "Rain", "Decrypt"]);
        let a = EffectScheduler::new("A", names.clone(), CANVAS, StartSelection::Index(4), options(50)).unwrap();
        let b = EffectScheduler::new("A", names, CANVAS, StartSelection::Index(5), options(50)).unwrap();
        assert_ne!(a.current_name(), b.current_name());
    }
}
