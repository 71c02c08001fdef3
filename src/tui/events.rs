//! Terminal event handling for the panel
//!
//! Wraps crossterm polling into the small event vocabulary the panel
//! cares about. Polling runs with a tick timeout so streamed response
//! deltas queued on the bridge get drained even when the keyboard is
//! idle.

use std::time::Duration;

use crossterm::event::{self, KeyCode, KeyEvent, KeyModifiers};

/// Events the panel reacts to
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed
    Key(KeyEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Paste event (bracketed paste)
    Paste(String),
    /// Nothing happened within the tick window
    Tick,
}

/// Polls the terminal for events
#[derive(Debug)]
pub struct EventHandler {
    tick_rate: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    /// Create a handler with the default 50ms tick (streaming needs a
    /// fast redraw cadence)
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(50),
        }
    }

    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Poll for the next event, yielding `Tick` when the window elapses
    pub fn poll(&self) -> anyhow::Result<Event> {
        if event::poll(self.tick_rate)? {
            Ok(match event::read()? {
                event::Event::Key(key) => Event::Key(key),
                event::Event::Resize(cols, rows) => Event::Resize(cols, rows),
                event::Event::Paste(text) => Event::Paste(text),
                _ => Event::Tick,
            })
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Event {
    /// Ctrl-C or Ctrl-Q
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }) | Event::Key(KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }

    pub fn is_escape(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Esc,
                ..
            })
        )
    }

    pub fn is_enter(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Enter,
                ..
            })
        )
    }
}
