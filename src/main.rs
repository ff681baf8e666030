//! ttsaver - A terminal screensaver for ASCII art
//!
//! ttsaver animates a piece of ASCII/Unicode art with a rotating catalog of
//! text effects. Each effect emits escape-coded frames; those are parsed
//! into cell grids, diffed, and only the changed cells are drawn.
//!
//! # Features
//!
//! - **Effect Rotation**: Matrix, Rain, Decrypt, Print, Wipe, Slide, Expand
//! - **Stutter-free Switching**: the next effect is built in the background
//! - **Multiple Monitors**: split the terminal into independent displays
//! - **Screensaver Conventions**: `/s`, `/c`, `/p` switches
//!
//! # Quick Start
//!
//! ```text
//! ttsaver /s              # Run
//! ttsaver /s --monitors 2 # Two side-by-side displays
//! ttsaver /c              # Write a default config and show it
//! ttsaver --headless 600  # Render 600 ticks off-screen
//! ```
//!
//! Any key, mouse click or mouse movement ends the run.

mod config;
mod core;
mod effects;
mod ui;
mod wm;

use std::env;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config as SaverConfig;
use crate::effects::EnabledEffects;
use crate::core::scheduler::SchedulerOptions;
use crate::ui::{DisplaySurface, PixelRasterizer, PixelSurface, TerminalRasterizer, TerminalSurface};
use crate::wm::monitor::even_split;
use crate::wm::{CoordinatorSettings, DisplayCoordinator, Monitor, RunSummary, ScriptedEvents, SplitDirection, TerminalEvents};

/// Pixel surface size for headless runs
const HEADLESS_SIZE: (u32, u32) = (1920, 1080);

/// What the invocation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Run the screensaver
    Run,
    /// Write defaults if needed and show the configuration
    Configure,
    /// Show the configuration (no arguments)
    ShowConfig,
    /// Preview in a host window: not supported, exit at once
    Preview,
    /// Render a number of ticks to an in-memory surface
    Headless(u64),
    ListEffects,
}

/// Command line options
#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    mode: Mode,
    /// Draw over the current screen instead of the alternate screen
    windowed: bool,
    /// Split the surface into this many monitors
    monitors: Option<usize>,
    /// Stack split monitors top to bottom
    stacked: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::ShowConfig,
            windowed: false,
            monitors: None,
            stacked: false,
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("ttsaver {}", VERSION);
}

fn print_help() {
    eprintln!("ttsaver {} - A terminal screensaver for ASCII art", VERSION);
    eprintln!();
    eprintln!("Usage: ttsaver [MODE] [OPTIONS]");
    eprintln!();
    eprintln!("Modes:");
    eprintln!("  (default)             Show the effective configuration");
    eprintln!("  -s, /s                Run the screensaver");
    eprintln!("  -c, /c                Write a default config (if missing) and show it");
    eprintln!("  -p, /p [HANDLE]       Preview (not supported, exits)");
    eprintln!("  --headless <TICKS>    Render TICKS frames off-screen and print stats");
    eprintln!("  --list-effects        List available effects");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --windowed            Do not switch to the alternate screen");
    eprintln!("  --monitors <N>        Split the display into N side-by-side monitors");
    eprintln!("  --stacked             Stack the --monitors split top to bottom");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Exit: any key, mouse click, or mouse movement");
    eprintln!();
    eprintln!("Configuration: ~/.ttsaver/config.toml");
    eprintln!("Log file:      ~/.ttsaver/ttsaver.log (level via RUST_LOG)");
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options, String> {
    let args: Vec<String> = args.into_iter().collect();
    let mut options = Options::default();
    let mut i = 0;

    while i < args.len() {
        // Windows passes switches like "/c:1234"
        let lowered = args[i].to_lowercase();
        let arg = lowered.split(':').next().unwrap_or_default();
        match arg {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "/s" => options.mode = Mode::Run,
            "-c" | "/c" => options.mode = Mode::Configure,
            "-p" | "/p" => {
                options.mode = Mode::Preview;
                // Skip the host window handle
                if args.get(i + 1).map_or(false, |a| a.parse::<u64>().is_ok()) {
                    i += 1;
                }
            }
            "--list-effects" => options.mode = Mode::ListEffects,
            "--headless" => {
                i += 1;
                let ticks = args
                    .get(i)
                    .and_then(|a| a.parse::<u64>().ok())
                    .ok_or_else(|| "--headless needs a tick count".to_string())?;
                options.mode = Mode::Headless(ticks);
            }
            "--windowed" => options.windowed = true,
            "--stacked" => options.stacked = true,
            "--monitors" => {
                i += 1;
                let count = args
                    .get(i)
                    .and_then(|a| a.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| "--monitors needs a positive number".to_string())?;
                options.monitors = Some(count);
            }
            _ => {
                return Err(format!("Unknown argument: {}. Use -h for help.", args[i]));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Log to `~/.ttsaver/ttsaver.log`; the terminal itself is the display
fn init_logging() {
    let log_path = config::data_dir()
        .map(|dir| dir.join("ttsaver.log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("ttsaver.log"));

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let options = match parse_args(env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("ttsaver {} starting: {:?}", VERSION, options);

    match options.mode {
        Mode::Preview => {
            info!("Preview mode is not supported, exiting");
            Ok(())
        }
        Mode::ListEffects => {
            for name in effects::names() {
                println!("{}", name);
            }
            Ok(())
        }
        Mode::Configure => configure(),
        Mode::ShowConfig => show_config(&SaverConfig::load()),
        Mode::Headless(ticks) => run_headless(&options, ticks),
        Mode::Run => run_terminal(&options),
    }
}

/// Write a default config if there is none, then show it
fn configure() -> anyhow::Result<()> {
    let path = config::config_path()?;
    if !path.exists() {
        let written = SaverConfig::default().save()?;
        info!("Wrote default config to {}", written.display());
        println!("Wrote default configuration to {}", written.display());
    }
    show_config(&SaverConfig::load())
}

fn show_config(config: &SaverConfig) -> anyhow::Result<()> {
    match config::config_path() {
        Ok(path) => println!("# {}", path.display()),
        Err(e) => println!("# {}", e),
    }
    println!("{}", toml::to_string_pretty(config)?);

    let enabled = EnabledEffects::validate(&config.enabled_effects);
    println!("# Effects in rotation: {}", enabled.names().join(", "));
    Ok(())
}

fn coordinator_settings(config: &SaverConfig) -> CoordinatorSettings {
    let mut settings = CoordinatorSettings::new(
        config.ascii_art.clone(),
        EnabledEffects::validate(&config.enabled_effects),
    );
    settings.background = config.background_color;
    settings.scheduler = SchedulerOptions {
        switch_timeout: config.switch_timeout(),
        ..SchedulerOptions::default()
    };
    settings.glyph_cache_capacity = config.glyph_cache_capacity;
    settings.target_fps = config.target_fps;
    settings.mouse_move_threshold = config.mouse_move_threshold;
    settings
}

/// Monitors from the command line, then the config, then the whole surface
fn layout_monitors(options: &Options, config: &SaverConfig, surface: (u32, u32)) -> Vec<Monitor> {
    match options.monitors {
        Some(count) => {
            let direction = if options.stacked {
                SplitDirection::Vertical
            } else {
                SplitDirection::Horizontal
            };
            even_split(surface, count, direction)
        }
        None if !config.monitors.is_empty() => config.monitors.clone(),
        None => vec![Monitor::spanning(surface.0, surface.1)],
    }
}

fn log_summary(summary: &RunSummary) {
    info!(
        "Run finished ({:?}): ticks={}, frames={}, held={}, draws={}, clears={}, switches={}",
        summary.exit,
        summary.ticks,
        summary.frames,
        summary.held,
        summary.draws,
        summary.clears,
        summary.switches
    );
}

/// Run on the host terminal until the user comes back
fn run_terminal(options: &Options) -> anyhow::Result<()> {
    let config = SaverConfig::load();

    let mut surface = TerminalSurface::new(config.background_color)?;
    let monitors = layout_monitors(options, &config, surface.size());
    surface.init(!options.windowed)?;

    // The coordinator owns the surface; dropping it on any error restores the terminal
    let result = DisplayCoordinator::new(surface, TerminalRasterizer, monitors, coordinator_settings(&config))
        .map_err(anyhow::Error::from)
        .and_then(|mut coordinator| {
            info!("Playing: {:?}", coordinator.current_effects());
            let summary = coordinator.run(&mut TerminalEvents, None)?;
            coordinator.into_surface().cleanup()?;
            Ok(summary)
        });

    match result {
        Ok(summary) => {
            log_summary(&summary);
            Ok(())
        }
        Err(e) => {
            error!("Screensaver failed: {:#}", e);
            Err(e)
        }
    }
}

/// Render off-screen and report what it cost
fn run_headless(options: &Options, ticks: u64) -> anyhow::Result<()> {
    let config = SaverConfig::load();
    let surface = PixelSurface::new(HEADLESS_SIZE.0, HEADLESS_SIZE.1, config.background_color);
    let monitors = layout_monitors(options, &config, surface.size());

    let mut coordinator = DisplayCoordinator::new(
        surface,
        PixelRasterizer::new(config.font_size),
        monitors,
        coordinator_settings(&config),
    )?;
    info!("Playing: {:?}", coordinator.current_effects());
    let started = std::time::Instant::now();
    let summary = coordinator.run(&mut ScriptedEvents::default(), Some(ticks))?;
    let elapsed = started.elapsed();
    log_summary(&summary);

    for (i, (canvas, status)) in coordinator
        .canvases()
        .iter()
        .zip(coordinator.monitor_status())
        .enumerate()
    {
        println!(
            "monitor {}: {}x{} cells, playing {}, next {}, {} switch(es)",
            i,
            canvas.width,
            canvas.height,
            status.current,
            status.pending.unwrap_or("-"),
            status.switches
        );
    }
    println!("ticks:     {}", summary.ticks);
    println!("frames:    {}", summary.frames);
    println!("held:      {}", summary.held);
    println!("draws:     {}", summary.draws);
    println!("clears:    {}", summary.clears);
    println!("switches:  {}", summary.switches);
    println!("presents:  {}", coordinator.surface().presents());
    let glyphs = coordinator.glyph_cache_stats();
    println!("glyphs:    {} cached, {} hits, {} misses", glyphs.entries, glyphs.hits, glyphs.misses);
    println!("elapsed:   {:.2?}", elapsed);
    Ok(())
}
