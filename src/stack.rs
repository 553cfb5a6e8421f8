//! The screen stack.
//!
//! An ordered arena of screens plus handoff placeholders. Entries refer to
//! their parent screen through a [`ScreenHandle`], never through a pointer,
//! so removing an entry can never leave a dangling link: children of a
//! removed screen are reparented to the root, and a parent that is no longer
//! on the stack is reported as a miss instead.
//!
//! While a screen is processing an operation it is checked out of its slot
//! (see [`ScreenStack::checkout`]); the slot keeps its surface, kind, title
//! and parent link, so the stack stays fully navigable in the meantime.

use crate::error::NavError;
use crate::screens::{Screen, ScreenKind};
use crate::surface::{self, SharedSurface, FIELD_MSG};
use std::fmt;
use tracing::{debug, warn};

/// Stable identity of a screen on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenHandle(u64);

impl fmt::Display for ScreenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A screen entry
pub struct Slot {
    handle: ScreenHandle,
    kind: ScreenKind,
    parent: Option<ScreenHandle>,
    surface: SharedSurface,
    title: String,
    screen: Option<Box<dyn Screen>>,
    pending_refresh: bool,
}

impl Slot {
    pub fn handle(&self) -> ScreenHandle {
        self.handle
    }

    pub fn kind(&self) -> ScreenKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ScreenHandle> {
        self.parent
    }

    pub fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    /// Title as of the last time the screen was pushed or checked in
    pub fn title(&self) -> &str {
        &self.title
    }

    /// True while the screen is checked out for dispatch
    pub fn is_busy(&self) -> bool {
        self.screen.is_none()
    }

    pub fn screen_mut(&mut self) -> Option<&mut (dyn Screen + 'static)> {
        self.screen.as_deref_mut()
    }

    /// Mark the screen for a full redraw, clear its status line and let it
    /// recompute its layout. Deferred until check-in if the screen is busy.
    fn refresh(&mut self) {
        surface::lock(&self.surface).set(FIELD_MSG, "");
        match self.screen.as_mut() {
            Some(screen) => {
                screen.set_redraw(true);
                screen.recalculate_layout();
            }
            None => self.pending_refresh = true,
        }
    }
}

/// One position on the stack
pub enum StackEntry {
    Screen(Slot),
    /// Placeholder marking that the display is handed to something outside
    /// the screen system (an external program or a confirmation prompt)
    Handoff,
}

impl StackEntry {
    pub fn as_slot(&self) -> Option<&Slot> {
        match self {
            StackEntry::Screen(slot) => Some(slot),
            StackEntry::Handoff => None,
        }
    }

    fn as_slot_mut(&mut self) -> Option<&mut Slot> {
        match self {
            StackEntry::Screen(slot) => Some(slot),
            StackEntry::Handoff => None,
        }
    }

    pub fn is_handoff(&self) -> bool {
        matches!(self, StackEntry::Handoff)
    }
}

#[derive(Default)]
pub struct ScreenStack {
    entries: Vec<StackEntry>,
    current: usize,
    next_handle: u64,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &StackEntry> {
        self.entries.iter()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&StackEntry> {
        self.entries.get(self.current)
    }

    pub fn current_slot(&self) -> Option<&Slot> {
        self.current().and_then(StackEntry::as_slot)
    }

    pub fn current_slot_mut(&mut self) -> Option<&mut Slot> {
        self.entries
            .get_mut(self.current)
            .and_then(StackEntry::as_slot_mut)
    }

    pub fn current_handle(&self) -> Option<ScreenHandle> {
        self.current_slot().map(Slot::handle)
    }

    pub fn current_kind(&self) -> Option<ScreenKind> {
        self.current_slot().map(Slot::kind)
    }

    pub fn slot(&self, handle: ScreenHandle) -> Option<&Slot> {
        self.entries
            .iter()
            .filter_map(StackEntry::as_slot)
            .find(|slot| slot.handle == handle)
    }

    fn slot_mut(&mut self, handle: ScreenHandle) -> Option<&mut Slot> {
        self.entries
            .iter_mut()
            .filter_map(StackEntry::as_slot_mut)
            .find(|slot| slot.handle == handle)
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.entries.iter_mut().filter_map(StackEntry::as_slot_mut)
    }

    /// Position of the screen with this handle, if it is still on the stack
    pub fn position(&self, handle: ScreenHandle) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.as_slot().is_some_and(|slot| slot.handle == handle))
    }

    /// Parent link of a screen. `None` when the screen has no parent or is
    /// gone.
    pub fn parent_of(&self, handle: ScreenHandle) -> Option<ScreenHandle> {
        self.slot(handle).and_then(Slot::parent)
    }

    /// Append a screen and make it current
    pub fn push(&mut self, screen: Box<dyn Screen>, parent: Option<ScreenHandle>) -> ScreenHandle {
        let handle = ScreenHandle(self.next_handle);
        self.next_handle += 1;
        let slot = Slot {
            handle,
            kind: screen.kind(),
            parent,
            surface: screen.surface(),
            title: screen.title(),
            screen: Some(screen),
            pending_refresh: false,
        };
        debug!("Pushing {} screen {} (parent {:?})", slot.kind, handle, parent);
        self.entries.push(StackEntry::Screen(slot));
        self.current = self.entries.len() - 1;
        handle
    }

    /// Append a handoff placeholder and make it current
    pub fn push_handoff(&mut self) {
        self.entries.push(StackEntry::Handoff);
        self.current = self.entries.len() - 1;
    }

    /// Remove the entry at `index` and navigate away from it.
    ///
    /// Removing a handoff makes the last entry current and leaves it as it
    /// is. Removing a screen reparents its children to the root and makes its
    /// parent current, refreshed; if the parent is gone the previous index is
    /// kept, clamped to the stack.
    pub fn remove_at(&mut self, index: usize) -> Option<StackEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);

        match &removed {
            StackEntry::Handoff => {
                self.current = self.entries.len().saturating_sub(1);
            }
            StackEntry::Screen(gone) => {
                self.reparent_children(gone.handle);
                match gone.parent.and_then(|parent| self.position(parent)) {
                    Some(position) => self.current = position,
                    None => {
                        if gone.parent.is_some() {
                            warn!(
                                "Parent of removed screen {} is no longer on the stack",
                                gone.handle
                            );
                        }
                        self.current = self.current.min(self.entries.len().saturating_sub(1));
                    }
                }
                self.refresh_current();
            }
        }
        Some(removed)
    }

    /// Remove the entry at `index` without navigating: the current entry
    /// stays current (its index shifts if needed). Removing the current entry
    /// itself falls back to the entry below it.
    pub fn discard_at(&mut self, index: usize) -> Option<StackEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        if let StackEntry::Screen(gone) = &removed {
            self.reparent_children(gone.handle);
        }

        if index < self.current || self.current >= self.entries.len() {
            self.current = self.current.saturating_sub(1);
        }
        Some(removed)
    }

    /// Make the entry at `index` current and refresh it
    pub fn set_current(&mut self, index: usize) -> Result<(), NavError> {
        if index >= self.entries.len() {
            return Err(NavError::InvalidPosition(index));
        }
        self.current = index;
        self.refresh_current();
        Ok(())
    }

    /// Discard the current entry and make the entry at `index` current.
    /// `index` refers to the stack before the discard.
    pub fn replace_current(&mut self, index: usize) -> Result<(), NavError> {
        if index >= self.entries.len() || index == self.current {
            return Err(NavError::InvalidPosition(index));
        }
        let current = self.current;
        self.discard_at(current);
        let target = if index > current { index - 1 } else { index };
        self.set_current(target)
    }

    /// Take the screen out of its slot for dispatch
    pub fn checkout(&mut self, handle: ScreenHandle) -> Result<Box<dyn Screen>, NavError> {
        let slot = self.slot_mut(handle).ok_or(NavError::NoCurrentScreen)?;
        let kind = slot.kind;
        slot.screen.take().ok_or(NavError::ScreenBusy(kind))
    }

    /// Put a checked-out screen back. Returns false, dropping the screen, if
    /// its slot was removed in the meantime.
    pub fn checkin(&mut self, handle: ScreenHandle, mut screen: Box<dyn Screen>) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            debug!("Screen {} left the stack during dispatch", handle);
            return false;
        };
        if std::mem::take(&mut slot.pending_refresh) {
            screen.set_redraw(true);
            screen.recalculate_layout();
        }
        slot.title = screen.title();
        slot.screen = Some(screen);
        true
    }

    fn reparent_children(&mut self, gone: ScreenHandle) {
        let root = self.entries.first().and_then(StackEntry::as_slot).map(Slot::handle);
        for slot in self.slots_mut() {
            if slot.parent == Some(gone) {
                slot.parent = root.filter(|root| *root != slot.handle);
            }
        }
    }

    fn refresh_current(&mut self) {
        if let Some(slot) = self.current_slot_mut() {
            slot.refresh();
        }
    }
}
