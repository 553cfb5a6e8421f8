//! Tag and filter pickers.
//!
//! Both run modally; the choice is left in the `selected_value` field of the
//! surface, where the navigator picks it up once the picker is closed.

use super::{hint_line, Screen, ScreenKind};
use crate::config::NamedFilter;
use crate::keymap::Operation;
use crate::list_navigation::{show_list, ListStateExt};
use crate::navigator::Navigator;
use crate::surface::{self, SharedSurface, FIELD_HINT};
use anyhow::Result;
use ratatui::widgets::ListState;
use tracing::debug;

/// Surface field holding the picked value; empty when nothing was picked
pub const FIELD_SELECTED_VALUE: &str = "selected_value";

pub struct SelectScreen {
    surface: SharedSurface,
    kind: ScreenKind,
    /// `(label, value)` pairs
    choices: Vec<(String, String)>,
    state: ListState,
}

impl SelectScreen {
    pub fn tags(surface: SharedSurface, tags: Vec<String>) -> Self {
        let choices = tags.into_iter().map(|t| (t.clone(), t)).collect();
        Self::new(surface, ScreenKind::SelectTag, choices)
    }

    pub fn filters(surface: SharedSurface, filters: Vec<NamedFilter>) -> Self {
        let choices = filters
            .into_iter()
            .map(|f| (format!("{} ({})", f.name, f.expr), f.expr))
            .collect();
        Self::new(surface, ScreenKind::SelectFilter, choices)
    }

    fn new(surface: SharedSurface, kind: ScreenKind, choices: Vec<(String, String)>) -> Self {
        let mut state = ListState::default();
        state.selected_or_first(choices.len());
        Self {
            surface,
            kind,
            choices,
            state,
        }
    }

    fn finish(&self, value: &str, nav: &mut Navigator) {
        surface::lock(&self.surface).set(FIELD_SELECTED_VALUE, value);
        nav.pop();
    }
}

impl Screen for SelectScreen {
    fn kind(&self) -> ScreenKind {
        self.kind
    }

    fn title(&self) -> String {
        match self.kind {
            ScreenKind::SelectFilter => "Select Filter".to_string(),
            _ => "Select Tag".to_string(),
        }
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn init(&mut self) -> Result<()> {
        surface::lock(&self.surface).set(FIELD_SELECTED_VALUE, "");
        Ok(())
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        let rows: Vec<String> = self
            .choices
            .iter()
            .enumerate()
            .map(|(i, (label, _))| format!("{:4} {}", i + 1, label))
            .collect();
        let hint = hint_line(
            nav,
            self.kind,
            &[(Operation::Quit, "Cancel"), (Operation::Open, "Select")],
        );
        let mut surface = surface::lock(&self.surface);
        show_list(&mut *surface, &self.title(), &rows, &self.state);
        surface.set(FIELD_HINT, &hint);
        Ok(())
    }

    fn process_operation(
        &mut self,
        op: Operation,
        _automatic: bool,
        _args: &[String],
        nav: &mut Navigator,
    ) -> Result<()> {
        if self.state.apply_movement(op, self.choices.len()) {
            return Ok(());
        }
        match op {
            Operation::Open => {
                let value = self
                    .state
                    .selected()
                    .and_then(|i| self.choices.get(i))
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default();
                self.finish(&value, nav);
            }
            Operation::Quit => self.finish("", nav),
            other => debug!("{} ignores {:?}", self.kind, other),
        }
        Ok(())
    }

    fn set_redraw(&mut self, _redraw: bool) {}
}
