//! Display coordinator
//!
//! Owns the surface, the glyph cache and one binding per monitor. Every tick
//! pulls a frame for each monitor, diffs it against what that monitor shows,
//! draws only the difference and presents once.

use std::io;

use super::clock::FrameClock;
use super::input::{EventSource, ExitDetector, InputEvent, DEFAULT_MOVE_THRESHOLD};
use super::monitor::{self, Monitor};
use crate::core::diff::FrameDiffer;
use crate::core::scheduler::{
    AdvanceOutcome, EffectScheduler, SchedulerError, SchedulerOptions, StartSelection,
};
use crate::core::term::{EscapeInterpreter, Position, Rgb};
use crate::effects::{Canvas, EnabledEffects};
use crate::ui::{
    DisplaySurface, GlyphCache, GlyphCacheStats, GlyphMetrics, GlyphRasterizer, DEFAULT_CACHE_CAPACITY,
};

/// Everything the coordinator needs besides the surface
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub text: String,
    pub enabled: EnabledEffects,
    pub background: Rgb,
    pub scheduler: SchedulerOptions,
    pub glyph_cache_capacity: usize,
    pub target_fps: u32,
    pub mouse_move_threshold: u32,
    /// First monitor's start index; random when `None`
    pub start_base: Option<usize>,
}

impl CoordinatorSettings {
    pub fn new(text: impl Into<String>, enabled: EnabledEffects) -> Self {
        Self {
            text: text.into(),
            enabled,
            background: Rgb::BLACK,
            scheduler: SchedulerOptions::default(),
            glyph_cache_capacity: DEFAULT_CACHE_CAPACITY,
            target_fps: 120,
            mouse_move_threshold: DEFAULT_MOVE_THRESHOLD,
            start_base: None,
        }
    }
}

/// Work done by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Monitors that got a new frame
    pub frames: usize,
    /// Monitors whose last frame stayed up (switch not ready)
    pub held: usize,
    pub clears: usize,
    pub draws: usize,
    pub switches: usize,
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Input,
    TickLimit,
}

/// Rotation state of one monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStatus {
    pub current: &'static str,
    pub pending: Option<&'static str>,
    pub switches: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
    /// Monitor-ticks spent holding a frame while a switch was pending
    pub held: u64,
    pub draws: u64,
    pub clears: u64,
    pub switches: u64,
    pub exit: ExitReason,
}

/// One monitor and the state that drives it
struct MonitorBinding {
    monitor: Monitor,
    canvas: Canvas,
    scheduler: EffectScheduler,
    interpreter: EscapeInterpreter,
    differ: FrameDiffer,
}

impl MonitorBinding {
    /// Surface position of a cell's top-left corner
    fn origin(&self, pos: Position, metrics: GlyphMetrics) -> (u32, u32) {
        (
            self.monitor.x + pos.col as u32 * metrics.width as u32,
            self.monitor.y + pos.row as u32 * metrics.height as u32,
        )
    }
}

pub struct DisplayCoordinator<S, R>
where
    S: DisplaySurface,
    R: GlyphRasterizer<Glyph = S::Glyph>,
{
    surface: S,
    glyphs: GlyphCache<R>,
    bindings: Vec<MonitorBinding>,
    background: Rgb,
    exit: ExitDetector,
    target_fps: u32,
}

impl<S, R> DisplayCoordinator<S, R>
where
    S: DisplaySurface,
    R: GlyphRasterizer<Glyph = S::Glyph>,
{
    pub fn new(
        mut surface: S,
        rasterizer: R,
        monitors: Vec<Monitor>,
        settings: CoordinatorSettings,
    ) -> Result<Self, SchedulerError> {
        let surface_size = surface.size();
        let monitors = monitor::resolve(monitors, surface_size);
        let metrics = rasterizer.metrics();
        // Monitor 0 picks at random unless pinned; the rest follow it in order
        let mut base = settings.start_base;

        let mut bindings = Vec::with_capacity(monitors.len());
        for (i, monitor) in monitors.into_iter().enumerate() {
            let canvas = monitor.canvas(metrics);
            let options = SchedulerOptions {
                seed: settings.scheduler.seed.map(|s| s.wrapping_add(i as u64)),
                ..settings.scheduler.clone()
            };
            let start = match base {
                Some(base) => StartSelection::Index(base + i),
                None => StartSelection::Random,
            };
            let scheduler = EffectScheduler::new(
                &settings.text,
                settings.enabled.clone(),
                canvas,
                start,
                options,
            )?;
            if base.is_none() {
                base = Some(settings.enabled.position(scheduler.current_name()).unwrap_or(0));
            }
            tracing::info!(
                "Monitor {} at ({}, {}) {}x{}: canvas {}x{}, starting with {}",
                i,
                monitor.x,
                monitor.y,
                monitor.width,
                monitor.height,
                canvas.width,
                canvas.height,
                scheduler.current_name()
            );
            bindings.push(MonitorBinding {
                monitor,
                canvas,
                scheduler,
                interpreter: EscapeInterpreter::new(canvas.width, canvas.height),
                differ: FrameDiffer::new(),
            });
        }

        let (width, height) = surface_size;
        surface.clear_rect(0, 0, width, height, settings.background);

        Ok(Self {
            surface,
            glyphs: GlyphCache::new(rasterizer, settings.glyph_cache_capacity),
            bindings,
            background: settings.background,
            exit: ExitDetector::new(settings.mouse_move_threshold),
            target_fps: settings.target_fps,
        })
    }

    /// Advance every monitor by one frame and present
    pub fn tick(&mut self) -> io::Result<TickStats> {
        let mut stats = TickStats::default();
        let metrics = self.glyphs.metrics();
        let (gw, gh) = (metrics.width as u32, metrics.height as u32);

        for binding in &mut self.bindings {
            let frame = match binding.scheduler.next_frame() {
                Some(frame) => Some(frame),
                None => match binding.scheduler.advance() {
                    AdvanceOutcome::Switched(name) => {
                        tracing::debug!("Monitor at ({}, {}) now playing {}", binding.monitor.x, binding.monitor.y, name);
                        self.glyphs.clear();
                        stats.switches += 1;
                        binding.scheduler.next_frame()
                    }
                    AdvanceOutcome::NotReady | AdvanceOutcome::Restarted => None,
                },
            };

            // Nothing new: leave the last frame on screen
            let Some(frame) = frame else {
                stats.held += 1;
                continue;
            };
            stats.frames += 1;

            let cells = binding.interpreter.parse(&frame);
            let diff = binding.differ.apply(cells);
            if diff.is_empty() {
                continue;
            }

            for &pos in &diff.clears {
                let (x, y) = binding.origin(pos, metrics);
                self.surface.clear_rect(x, y, gw, gh, self.background);
            }
            for op in &diff.draws {
                let (x, y) = binding.origin(op.pos, metrics);
                if op.replaces {
                    self.surface.clear_rect(x, y, gw, gh, self.background);
                }
                let glyph = self.glyphs.get(op.content.ch, op.content.color);
                self.surface.blit(x, y, glyph);
            }
            stats.clears += diff.clears.len() + diff.draws.iter().filter(|d| d.replaces).count();
            stats.draws += diff.draws.len();
        }

        self.surface.present()?;
        Ok(stats)
    }

    /// Feed one input event; true means the run should end
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let exit = self.exit.observe(event);
        if exit {
            tracing::info!("Exit requested by {:?}", event);
        }
        exit
    }

    /// Render until input asks to stop or `max_ticks` have run
    pub fn run<E: EventSource>(&mut self, events: &mut E, max_ticks: Option<u64>) -> io::Result<RunSummary> {
        let mut clock = FrameClock::new(self.target_fps);
        tracing::info!(
            "Rendering {} monitor(s) at {} fps ({:?} per frame)",
            self.bindings.len(),
            self.target_fps,
            clock.frame_duration()
        );
        let mut summary = RunSummary {
            ticks: 0,
            frames: 0,
            held: 0,
            draws: 0,
            clears: 0,
            switches: 0,
            exit: ExitReason::TickLimit,
        };

        loop {
            if max_ticks.map_or(false, |limit| summary.ticks >= limit) {
                summary.exit = ExitReason::TickLimit;
                break;
            }

            let stats = self.tick()?;
            summary.ticks += 1;
            summary.frames += stats.frames as u64;
            summary.held += stats.held as u64;
            summary.draws += stats.draws as u64;
            summary.clears += stats.clears as u64;
            summary.switches += stats.switches as u64;

            while let Some(event) = events.poll(clock.remaining())? {
                if self.handle_input(event) {
                    summary.exit = ExitReason::Input;
                    return Ok(summary);
                }
            }
            clock.wait();
        }

        Ok(summary)
    }

    /// Effect currently playing on each monitor
    pub fn current_effects(&self) -> Vec<&'static str> {
        self.bindings.iter().map(|b| b.scheduler.current_name()).collect()
    }

    pub fn monitor_status(&self) -> Vec<MonitorStatus> {
        self.bindings
            .iter()
            .map(|b| MonitorStatus {
                current: b.scheduler.current_name(),
                pending: b.scheduler.pending_name(),
                switches: b.scheduler.switches(),
            })
            .collect()
    }

    pub fn canvases(&self) -> Vec<Canvas> {
        self.bindings.iter().map(|b| b.canvas).collect()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn glyph_cache_stats(&self) -> GlyphCacheStats {
        self.glyphs.stats()
    }

    /// Give the surface back (for cleanup)
    pub fn into_surface(self) -> S {
        self.surface
    }
}
