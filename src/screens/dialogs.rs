//! List of open screens.

use super::{hint_line, Screen, ScreenKind};
use crate::keymap::Operation;
use crate::list_navigation::{show_list, ListStateExt};
use crate::navigator::Navigator;
use crate::surface::{self, SharedSurface, FIELD_HINT};
use anyhow::Result;
use ratatui::widgets::ListState;
use tracing::debug;

pub struct DialogsScreen {
    surface: SharedSurface,
    /// Stack positions as of the last `prepare`
    positions: Vec<usize>,
    state: ListState,
}

impl DialogsScreen {
    pub fn new(surface: SharedSurface) -> Self {
        Self {
            surface,
            positions: Vec::new(),
            state: ListState::default(),
        }
    }

    fn selected_position(&self) -> Option<usize> {
        self.state.selected().and_then(|i| self.positions.get(i).copied())
    }
}

impl Screen for DialogsScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Dialogs
    }

    fn title(&self) -> String {
        "Dialogs".to_string()
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        let titles = nav.screen_titles();
        self.positions = titles.iter().map(|(pos, _)| *pos).collect();
        self.state.clamp_to(self.positions.len());
        self.state.selected_or_first(self.positions.len());

        let rows: Vec<String> = titles
            .iter()
            .map(|(pos, title)| format!("{:4} {}", pos + 1, title))
            .collect();
        let hint = hint_line(
            nav,
            self.kind(),
            &[
                (Operation::Quit, "Close"),
                (Operation::Open, "Goto Dialog"),
                (Operation::CloseDialog, "Close Dialog"),
            ],
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
        if self.state.apply_movement(op, self.positions.len()) {
            return Ok(());
        }
        match op {
            Operation::Open => {
                if let Some(pos) = self.selected_position() {
                    nav.goto_screen(pos)?;
                }
            }
            Operation::CloseDialog => match self.selected_position() {
                Some(0) => nav.show_error("Error: you can't remove the feed list!"),
                Some(pos) => nav.close_screen(pos)?,
                None => {}
            },
            Operation::Quit => nav.pop(),
            other => debug!("Dialog list ignores {:?}", other),
        }
        Ok(())
    }

    // Rebuilt from the stack on every prepare
    fn set_redraw(&mut self, _redraw: bool) {}
}
