//! Monitor layout
//!
//! Monitors are rectangles of the display surface. They come from the config,
//! from an even split, or, when neither yields something usable, a single
//! monitor covering the whole surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::Canvas;
use crate::ui::GlyphMetrics;

/// Display layout errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    #[error("Monitor {0} has no area")]
    EmptyMonitor(usize),

    #[error("Monitor {0} extends past the {1}x{2} surface")]
    OutOfBounds(usize, u32, u32),

    #[error("No monitors")]
    NoMonitors,
}

/// A rectangle of the surface, in surface units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Monitor {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The whole surface
    pub const fn spanning(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Character grid that fits in this monitor
    pub fn canvas(&self, metrics: GlyphMetrics) -> Canvas {
        let cols = self.width / metrics.width.max(1) as u32;
        let rows = self.height / metrics.height.max(1) as u32;
        Canvas::new(cols.min(u16::MAX as u32) as u16, rows.min(u16::MAX as u32) as u16)
    }
}

/// Direction of split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Side by side
    Horizontal,
    /// Stacked
    Vertical,
}

/// Split the surface into `count` equal monitors; leftover units go to the
/// first ones
pub fn even_split(surface: (u32, u32), count: usize, direction: SplitDirection) -> Vec<Monitor> {
    let (width, height) = surface;
    let count = count as u32;
    if count == 0 {
        return Vec::new();
    }

    let total = match direction {
        SplitDirection::Horizontal => width,
        SplitDirection::Vertical => height,
    };
    let base = total / count;
    let extra = total % count;

    let mut offset = 0;
    (0..count)
        .map(|i| {
            let len = base + u32::from(i < extra);
            let monitor = match direction {
                SplitDirection::Horizontal => Monitor::new(offset, 0, len, height),
                SplitDirection::Vertical => Monitor::new(0, offset, width, len),
            };
            offset += len;
            monitor
        })
        .collect()
}

/// Every monitor must have area and lie inside the surface
pub fn validate(monitors: &[Monitor], surface: (u32, u32)) -> Result<(), DisplayError> {
    if monitors.is_empty() {
        return Err(DisplayError::NoMonitors);
    }
    let (width, height) = surface;
    for (i, m) in monitors.iter().enumerate() {
        if m.width == 0 || m.height == 0 {
            return Err(DisplayError::EmptyMonitor(i));
        }
        let right = m.x.checked_add(m.width);
        let bottom = m.y.checked_add(m.height);
        if !matches!((right, bottom), (Some(r), Some(b)) if r <= width && b <= height) {
            return Err(DisplayError::OutOfBounds(i, width, height));
        }
    }
    Ok(())
}

/// Validated monitors, or one monitor spanning the surface
pub fn resolve(monitors: Vec<Monitor>, surface: (u32, u32)) -> Vec<Monitor> {
    match validate(&monitors, surface) {
        Ok(()) => {
            tracing::info!("Using {} monitor(s): {:?}", monitors.len(), monitors);
            monitors
        }
        Err(e) => {
            tracing::warn!("Monitor layout rejected ({}), using the whole surface", e);
            vec![Monitor::spanning(surface.0, surface.1)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split_covers_surface() {
        let monitors = even_split((10, 4), 3, SplitDirection::Horizontal);
        assert_eq!(
            monitors,
            vec![Monitor::new(0, 0, 4, 4), Monitor::new(4, 0, 3, 4), Monitor::new(7, 0, 3, 4)]
        );

        let stacked = even_split((10, 4), 2, SplitDirection::Vertical);
        assert_eq!(stacked, vec![Monitor::new(0, 0, 10, 2), Monitor::new(0, 2, 10, 2)]);
        assert!(even_split((10, 4), 0, SplitDirection::Vertical).is_empty());
    }

    #[test]
    fn test_validate() {
        let surface = (80, 24);
        assert_eq!(validate(&[], surface), Err(DisplayError::NoMonitors));
        assert_eq!(validate(&[Monitor::new(0, 0, 0, 5)], surface), Err(DisplayError::EmptyMonitor(0)));
        assert_eq!(
            validate(&[Monitor::new(0, 0, 40, 24), Monitor::new(40, 0, 41, 24)], surface),
            Err(DisplayError::OutOfBounds(1, 80, 24))
        );
        assert_eq!(
            validate(&[Monitor::new(u32::MAX, 0, 2, 2)], surface),
            Err(DisplayError::OutOfBounds(0, 80, 24))
        );
        assert!(validate(&[Monitor::spanning(80, 24)], surface).is_ok());
    }

    #[test]
    fn test_resolve_falls_back_to_spanning() {
        assert_eq!(resolve(Vec::new(), (80, 24)), vec![Monitor::spanning(80, 24)]);
        // More monitors than columns leaves some empty
        let too_many = even_split((2, 24), 3, SplitDirection::Horizontal);
        assert_eq!(resolve(too_many, (2, 24)), vec![Monitor::spanning(2, 24)]);
    }

    #[test]
    fn test_canvas_from_metrics() {
        let m = Monitor::new(0, 0, 100, 50);
        assert_eq!(m.canvas(GlyphMetrics { width: 1, height: 1 }), Canvas::new(100, 50));
        assert_eq!(m.canvas(GlyphMetrics { width: 11, height: 22 }), Canvas::new(9, 2));
    }
}
