//! Presentation surfaces.
//!
//! A surface is the opaque drawing target a screen owns: a bag of named
//! fields (title, list body, status message, style strings) that can be drawn
//! and polled for input. Surfaces are shared behind a mutex so the status line
//! guard can reach the current one from the background notifier thread.

use crate::keymap::key_event_name;
use crate::screens::ScreenKind;
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::collections::HashMap;
use std::io::{self, Stdout};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Title line
pub const FIELD_HEAD: &str = "head";
/// Newline separated body lines
pub const FIELD_BODY: &str = "body";
/// Selected body line; empty for free-scrolling text
pub const FIELD_POS: &str = "pos";
/// First visible body line for free-scrolling text
pub const FIELD_OFFSET: &str = "offset";
/// Key hint line
pub const FIELD_HINT: &str = "hint";
/// Status line
pub const FIELD_MSG: &str = "msg";

/// How long `poll_event` may wait for input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Give up after the duration and report no event
    After(Duration),
    /// Block until an event arrives
    Forever,
}

/// A screen's drawing target and input source
pub trait Surface: Send {
    /// Set a named field
    fn set(&mut self, name: &str, value: &str);

    /// Read a named field; unset fields read as empty
    fn get(&self, name: &str) -> String;

    /// Draw the current field values immediately, without waiting for input
    fn draw(&mut self) -> Result<()>;

    /// Draw, then wait for one input event. `Ok(None)` means the wait timed
    /// out or produced nothing a key resolver could use.
    fn poll_event(&mut self, timeout: Timeout) -> Result<Option<String>>;
}

/// Surface shared between a screen, the stack and the status line guard
pub type SharedSurface = Arc<Mutex<dyn Surface>>;

/// Wrap a surface for sharing
pub fn share<S: Surface + 'static>(surface: S) -> SharedSurface {
    Arc::new(Mutex::new(surface))
}

/// Lock a shared surface, recovering from a poisoned lock
pub fn lock(surface: &SharedSurface) -> MutexGuard<'_, dyn Surface + 'static> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Factory for surfaces plus control over the whole display
pub trait Display {
    /// Create the surface for a new screen
    fn new_surface(&self, kind: ScreenKind) -> SharedSurface;

    /// Give up the display (e.g. before running an external program or on
    /// redraw). The next draw reinitialises it from scratch.
    fn reset(&self) -> Result<()>;
}

type Term = Terminal<CrosstermBackend<Stdout>>;

#[derive(Default)]
struct TerminalState {
    terminal: Option<Term>,
}

impl TerminalState {
    fn ensure(&mut self) -> Result<&mut Term> {
        if self.terminal.is_none() {
            enable_raw_mode().context("Failed to enable raw mode")?;
            execute!(io::stdout(), EnterAlternateScreen)
                .context("Failed to enter alternate screen")?;
            let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
                .context("Failed to create terminal")?;
            self.terminal = Some(terminal);
        }
        self.terminal
            .as_mut()
            .context("Terminal is not initialised")
    }

    fn reset(&mut self) -> Result<()> {
        if let Some(mut terminal) = self.terminal.take() {
            disable_raw_mode().context("Failed to disable raw mode")?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen)
                .context("Failed to leave alternate screen")?;
            terminal.show_cursor().context("Failed to show cursor")?;
        }
        Ok(())
    }
}

fn lock_state(state: &Mutex<TerminalState>) -> MutexGuard<'_, TerminalState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Display backed by the real terminal (ratatui + crossterm)
#[derive(Default)]
pub struct TerminalDisplay {
    state: Arc<Mutex<TerminalState>>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for TerminalDisplay {
    fn new_surface(&self, _kind: ScreenKind) -> SharedSurface {
        share(TerminalSurface {
            fields: HashMap::new(),
            state: Arc::clone(&self.state),
        })
    }

    fn reset(&self) -> Result<()> {
        lock_state(&self.state).reset()
    }
}

/// Surface drawing into the shared terminal
pub struct TerminalSurface {
    fields: HashMap<String, String>,
    state: Arc<Mutex<TerminalState>>,
}

impl Surface for TerminalSurface {
    fn set(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    fn get(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn draw(&mut self) -> Result<()> {
        let fields = &self.fields;
        let mut state = lock_state(&self.state);
        let terminal = state.ensure()?;
        terminal
            .draw(|frame| ui::render_surface(frame, fields))
            .context("Failed to draw surface")?;
        Ok(())
    }

    fn poll_event(&mut self, timeout: Timeout) -> Result<Option<String>> {
        self.draw()?;

        if let Timeout::After(duration) = timeout {
            if !event::poll(duration).context("Failed to poll terminal events")? {
                return Ok(None);
            }
        }

        match event::read().context("Failed to read terminal event")? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key_event_name(key))),
            _ => Ok(None),
        }
    }
}
