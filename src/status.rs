//! Status line guard.
//!
//! The only path by which code outside the dispatch loop (the background
//! notifier) may touch a surface. The navigator points the guard at the
//! current screen's surface after every stack change; the guard serialises
//! access through its own lock and the surface's mutex.

use crate::surface::{self, SharedSurface, FIELD_MSG};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

#[derive(Clone, Default)]
pub struct StatusLine {
    target: Arc<Mutex<Option<SharedSurface>>>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    fn target(&self) -> MutexGuard<'_, Option<SharedSurface>> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point the guard at a surface; `None` while no screen is current
    pub fn retarget(&self, surface: Option<SharedSurface>) {
        *self.target() = surface;
    }

    /// Write `msg` to the current screen's status line and draw it now.
    /// A no-op while no screen is current.
    pub fn set_status(&self, msg: &str) {
        let target = self.target();
        let Some(surface) = target.as_ref() else {
            return;
        };
        let mut surface = surface::lock(surface);
        surface.set(FIELD_MSG, msg);
        if let Err(e) = surface.draw() {
            warn!("Failed to draw status line: {}", e);
        }
    }

    /// Same as [`StatusLine::set_status`]; kept separate so call sites
    /// read as what they report.
    pub fn show_error(&self, msg: &str) {
        self.set_status(msg);
    }

    /// Current status text, empty without a target
    pub fn current(&self) -> String {
        self.target()
            .as_ref()
            .map(|surface| surface::lock(surface).get(FIELD_MSG))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::share;
    use crate::test_support::ScriptedSurface;
    use std::thread;

    #[test]
    fn test_set_status_writes_and_draws() {
        let surface = share(ScriptedSurface::detached());
        let status = StatusLine::new();
        status.retarget(Some(SharedSurface::clone(&surface)));
        status.set_status("Reloading...");
        assert_eq!(surface::lock(&surface).get(FIELD_MSG), "Reloading...");
        assert_eq!(status.current(), "Reloading...");
    }

    #[test]
    fn test_no_target_is_noop() {
        let status = StatusLine::new();
        status.set_status("nobody listens");
        assert_eq!(status.current(), "");
    }

    #[test]
    fn test_retarget_moves_messages() {
        let first = share(ScriptedSurface::detached());
        let second = share(ScriptedSurface::detached());
        let status = StatusLine::new();
        status.retarget(Some(SharedSurface::clone(&first)));
        status.set_status("one");
        status.retarget(Some(SharedSurface::clone(&second)));
        status.show_error("two");
        assert_eq!(surface::lock(&first).get(FIELD_MSG), "one");
        assert_eq!(surface::lock(&second).get(FIELD_MSG), "two");
    }

    #[test]
    fn test_usable_from_another_thread() {
        let surface = share(ScriptedSurface::detached());
        let status = StatusLine::new();
        status.retarget(Some(SharedSurface::clone(&surface)));
        let background = status.clone();
        thread::spawn(move || background.set_status("from worker"))
            .join()
            .unwrap();
        assert_eq!(status.current(), "from worker");
    }
}
