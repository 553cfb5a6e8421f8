//! Event dispatch loop.
//!
//! The main loop and every modal sub-loop run through the same primitive,
//! [`Navigator::dispatch_until`], which keeps dispatching while the stack is
//! deeper than a given depth.

use crate::error::NavError;
use crate::keymap::{MacroCmd, Operation};
use crate::navigator::Navigator;
use crate::screens::{Screen, ScreenKind};
use crate::stack::{ScreenHandle, StackEntry};
use crate::surface::{self, SharedSurface, Timeout};
use anyhow::Result;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Input poll timeout of the main loop
pub const MAIN_POLL: Duration = Duration::from_millis(250);

/// Input poll timeout of modal loops
pub const MODAL_POLL: Duration = Duration::from_millis(1000);

/// Per-loop macro state
#[derive(Debug, Default)]
struct DispatchState {
    queue: VecDeque<MacroCmd>,
    /// Screen the queued macro was started on
    owner: Option<ScreenHandle>,
    prefix_pending: bool,
}

impl Navigator {
    /// Push the root screen and dispatch until the stack is empty.
    ///
    /// The display is reset on the way out, whether or not the loop failed.
    pub fn run(&mut self, root: Box<dyn Screen>) -> Result<()> {
        self.push_screen(root)?;
        let result = self.dispatch_until(0, MAIN_POLL);
        let reset = self.display().reset();
        result.and(reset)
    }

    /// Push `screen` and dispatch until the stack is back at its current
    /// depth. Returns the screen's `result_field`, or an empty string when no
    /// field is requested.
    pub fn run_modal(&mut self, screen: Box<dyn Screen>, result_field: Option<&str>) -> Result<String> {
        let depth = self.depth();
        let surface = screen.surface();
        let kind = screen.kind();
        self.push_screen(screen)?;
        debug!("Running {} modally above depth {}", kind, depth);

        self.dispatch_until(depth, MODAL_POLL)?;

        Ok(result_field
            .map(|field| surface::lock(&surface).get(field))
            .unwrap_or_default())
    }

    /// Dispatch while the stack holds more than `depth` entries
    pub(crate) fn dispatch_until(&mut self, depth: usize, poll: Duration) -> Result<()> {
        let mut state = DispatchState::default();
        while self.depth() > depth {
            self.step(&mut state, poll)?;
        }
        Ok(())
    }

    fn step(&mut self, state: &mut DispatchState, poll: Duration) -> Result<()> {
        let (handle, kind, surface) = match self.stack().current() {
            None => return Ok(()),
            Some(StackEntry::Handoff) => {
                error!("Hand-off entry left on the stack, removing it");
                self.pop();
                return Ok(());
            }
            Some(StackEntry::Screen(slot)) => (slot.handle(), slot.kind(), slot.surface()),
        };

        let mut screen = self.stack_mut().checkout(handle).map_err(|e| {
            if let NavError::ScreenBusy(kind) = e {
                error!("Current {} screen is busy in an outer dispatch", kind);
            }
            e
        })?;
        let result = self.step_screen(screen.as_mut(), handle, kind, &surface, state, poll);
        self.stack_mut().checkin(handle, screen);
        result
    }

    fn step_screen(
        &mut self,
        screen: &mut dyn Screen,
        handle: ScreenHandle,
        kind: ScreenKind,
        surface: &SharedSurface,
        state: &mut DispatchState,
        poll: Duration,
    ) -> Result<()> {
        if let Err(e) = screen.prepare(self) {
            self.report_failure(&e);
        }

        if !state.queue.is_empty() && state.owner != Some(handle) {
            debug!(
                "Current screen changed, dropping {} queued macro command(s)",
                state.queue.len()
            );
            state.queue.clear();
        }

        if let Some(cmd) = state.queue.pop_front() {
            surface::lock(surface).draw()?;
            debug!("Replaying {:?} {:?} on {}", cmd.operation, cmd.args, kind);
            let result = screen.process_operation(cmd.operation, true, &cmd.args, self);
            self.report(result);
            return Ok(());
        }

        let event = surface::lock(surface).poll_event(Timeout::After(poll))?;
        let Some(event) = event else {
            if kind == ScreenKind::Article {
                screen.update_percent();
            }
            return Ok(());
        };

        if std::mem::take(&mut state.prefix_pending) {
            debug!("Running macro '{}'", event);
            state.queue = self.keys().macro_commands(&event).into();
            state.owner = Some(handle);
            self.set_status("");
            return Ok(());
        }

        let Some(op) = self.keys().operation(&event, kind.as_str()) else {
            debug!("Event '{}' is not bound in {}", event, kind);
            return Ok(());
        };
        debug!("Event '{}' resolved to {:?} in {}", event, op, kind);

        match op {
            Operation::Redraw => self.display().reset()?,
            Operation::MacroPrefix => {
                state.prefix_pending = true;
                self.set_status("macro-");
            }
            op => {
                let result = screen.process_operation(op, false, &[], self);
                self.report(result);
            }
        }
        Ok(())
    }

    fn report(&self, result: Result<()>) {
        if let Err(e) = result {
            self.report_failure(&e);
        }
    }

    fn report_failure(&self, e: &anyhow::Error) {
        warn!("Operation failed: {:#}", e);
        self.show_error(&format!("Error: {:#}", e));
    }
}
