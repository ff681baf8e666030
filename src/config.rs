//! Configuration for ttsaver.
//!
//! Settings live in `~/.ttsaver/config.toml`. A missing file means defaults;
//! a file that cannot be read or parsed is logged and replaced by defaults.
//!
//! # Configuration File
//!
//! ```toml
//! enabled_effects = ["Matrix", "Rain", "Decrypt"]
//! font_size = 18
//! target_fps = 120
//! switch_timeout_ms = 50
//! glyph_cache_capacity = 4096
//! mouse_move_threshold = 10
//! ascii_art = """
//! HELLO
//! """
//!
//! [background_color]
//! r = 0
//! g = 0
//! b = 0
//!
//! # Optional: split the terminal into monitors
//! [[monitors]]
//! x = 0
//! y = 0
//! width = 80
//! height = 24
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::term::Rgb;
use crate::effects;
use crate::ui::DEFAULT_CACHE_CAPACITY;
use crate::wm::input::DEFAULT_MOVE_THRESHOLD;
use crate::wm::Monitor;

/// Art shown when none is configured
pub const DEFAULT_ASCII_ART: &str = "\
██╗     ██╗███╗   ███╗███████╗██╗  ██╗ █████╗ ██╗    ██╗██╗  ██╗
██║     ██║████╗ ████║██╔════╝██║  ██║██╔══██╗██║    ██║██║ ██╔╝
██║     ██║██╔████╔██║█████╗  ███████║███████║██║ █╗ ██║█████╔╝
██║     ██║██║╚██╔╝██║██╔══╝  ██╔══██║██╔══██║██║███╗██║██╔═██╗
███████╗██║██║ ╚═╝ ██║███████╗██║  ██║██║  ██║╚███╔███╔╝██║  ██╗
╚══════╝╚═╝╚═╝     ╚═╝╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝ ╚══╝╚══╝ ╚═╝  ╚═╝";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {0}: {1}")]
    Io(PathBuf, #[source] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Art to animate
    pub ascii_art: String,
    /// Effect names to rotate through
    pub enabled_effects: Vec<String>,
    /// Point size for pixel surfaces
    pub font_size: u16,
    pub target_fps: u32,
    /// Longest wait for a pre-loaded effect, per switch
    pub switch_timeout_ms: u64,
    pub glyph_cache_capacity: usize,
    /// Mouse travel (per axis) that ends the run
    pub mouse_move_threshold: u32,
    pub background_color: Rgb,
    /// Monitor rectangles; empty means one monitor per surface
    pub monitors: Vec<Monitor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ascii_art: DEFAULT_ASCII_ART.to_string(),
            enabled_effects: effects::names().map(String::from).collect(),
            font_size: 18,
            target_fps: 120,
            switch_timeout_ms: 50,
            glyph_cache_capacity: DEFAULT_CACHE_CAPACITY,
            mouse_move_threshold: DEFAULT_MOVE_THRESHOLD,
            background_color: Rgb::BLACK,
            monitors: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Self {
        let path = match config_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{}, using default config", e);
                return Self::default();
            }
        };
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Could not load config ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and sanitize a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config.sanitized())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::Io(dir.to_path_buf(), e))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// Clamp numbers to their minimums and restore empty art
    pub fn sanitized(mut self) -> Self {
        self.font_size = self.font_size.max(1);
        self.target_fps = self.target_fps.max(1);
        self.switch_timeout_ms = self.switch_timeout_ms.max(1);
        self.glyph_cache_capacity = self.glyph_cache_capacity.max(1);
        if self.ascii_art.trim().is_empty() {
            self.ascii_art = DEFAULT_ASCII_ART.to_string();
        }
        self
    }

    pub fn switch_timeout(&self) -> Duration {
        Duration::from_millis(self.switch_timeout_ms)
    }
}

/// `~/.ttsaver`
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    home_dir().map(|h| h.join(".ttsaver")).ok_or(ConfigError::NoHomeDir)
}

/// Get config file path
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("config.toml"))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ttsaver-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.font_size, 18);
        assert_eq!(config.target_fps, 120);
        assert_eq!(config.background_color, Rgb::BLACK);
        assert_eq!(config.enabled_effects.len(), effects::names().count());
        assert!(config.ascii_art.starts_with("██╗"));
        assert!(config.monitors.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("target_fps = 30\nenabled_effects = [\"Rain\"]\n").unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.enabled_effects, vec!["Rain".to_string()]);
        assert_eq!(config.font_size, 18);
    }

    #[test]
    fn test_monitors_and_color() {
        let config = Config::parse(
            "[background_color]\nr = 1\ng = 2\nb = 3\n\n[[monitors]]\nx = 0\ny = 0\nwidth = 40\nheight = 20\n",
        )
        .unwrap();
        assert_eq!(config.background_color, Rgb::new(1, 2, 3));
        assert_eq!(config.monitors, vec![Monitor::new(0, 0, 40, 20)]);
    }

    #[test]
    fn test_sanitized_clamps() {
        let config = Config::parse("font_size = 0\ntarget_fps = 0\nglyph_cache_capacity = 0\nascii_art = \"  \"\n").unwrap();
        assert_eq!(config.font_size, 1);
        assert_eq!(config.target_fps, 1);
        assert_eq!(config.glyph_cache_capacity, 1);
        assert_eq!(config.ascii_art, DEFAULT_ASCII_ART);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(Config::parse("target_fps = \"fast\""), Err(ConfigError::Parse(_))));
        assert!(matches!(
            Config::load_from(&scratch_file("missing.toml")),
            Err(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_file("config.toml");
        let mut config = Config::default();
        config.enabled_effects = vec!["Wipe".to_string(), "Slide".to_string()];
        config.monitors = vec![Monitor::new(0, 0, 10, 10)];

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
