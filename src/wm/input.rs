//! Input handling
//!
//! The saver only cares whether the user is back: any key, any click, or a
//! mouse that really moved.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, MouseEventKind};

/// Default motion (per axis) tolerated before exiting
pub const DEFAULT_MOVE_THRESHOLD: u32 = 10;

/// Input reduced to what matters for exiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key,
    MouseDown,
    MouseMove { x: u32, y: u32 },
    Other,
}

impl From<Event> for InputEvent {
    fn from(ev: Event) -> Self {
        match ev {
            Event::Key(_) => InputEvent::Key,
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(_) => InputEvent::MouseDown,
                MouseEventKind::Moved | MouseEventKind::Drag(_) => InputEvent::MouseMove {
                    x: mouse.column as u32,
                    y: mouse.row as u32,
                },
                _ => InputEvent::Other,
            },
            _ => InputEvent::Other,
        }
    }
}

/// Decides when input means "stop"
#[derive(Debug, Clone)]
pub struct ExitDetector {
    threshold: u32,
    /// First motion position seen
    origin: Option<(u32, u32)>,
}

impl ExitDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            origin: None,
        }
    }

    /// Returns true when the event should end the run
    pub fn observe(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Key | InputEvent::MouseDown => true,
            InputEvent::MouseMove { x, y } => match self.origin {
                None => {
                    self.origin = Some((x, y));
                    false
                }
                Some((ox, oy)) => x.abs_diff(ox) > self.threshold || y.abs_diff(oy) > self.threshold,
            },
            InputEvent::Other => false,
        }
    }
}

/// Where the run loop gets its input from
pub trait EventSource {
    /// Wait up to `timeout` for one event
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}

/// Terminal input via crossterm
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?.into()))
        } else {
            Ok(None)
        }
    }
}

/// A fixed list of events, then silence (headless runs and tests)
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<InputEvent>,
}

impl ScriptedEvents {
    pub fn new<I: IntoIterator<Item = InputEvent>>(events: I) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self, _timeout: Duration) -> io::Result<Option<InputEvent>> {
        Ok(self.events.pop_front())
    }
}
