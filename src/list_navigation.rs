//! List navigation utilities for list screens.
//!
//! Extension methods on ratatui's `ListState` for the movement operations,
//! plus a helper that publishes a list to a surface.

use crate::keymap::Operation;
use crate::surface::{Surface, FIELD_BODY, FIELD_HEAD, FIELD_OFFSET, FIELD_POS};
use ratatui::widgets::ListState;

/// Default page size for page up/down navigation.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Extension trait for `ListState` that provides common navigation methods.
pub trait ListStateExt {
    /// Move selection up by a specified number of items.
    /// If at the top, stays at the first item.
    fn move_up_by(&mut self, count: usize, total_items: usize);

    /// Move selection down by a specified number of items.
    /// If at the bottom, stays at the last item.
    fn move_down_by(&mut self, count: usize, total_items: usize);

    /// Move to the first item in the list.
    fn select_first_item(&mut self, total_items: usize);

    /// Move to the last item in the list.
    fn select_last_item(&mut self, total_items: usize);

    /// Keep the selection inside a list that may have shrunk
    fn clamp_to(&mut self, total_items: usize);

    /// Get the currently selected index, initializing to 0 if none selected.
    fn selected_or_first(&mut self, total_items: usize) -> Option<usize>;

    /// Apply a movement operation. Returns false for anything that is not a
    /// movement.
    fn apply_movement(&mut self, op: Operation, total_items: usize) -> bool;
}

impl ListStateExt for ListState {
    fn move_up_by(&mut self, count: usize, total_items: usize) {
        if total_items == 0 {
            return;
        }
        let current = self.selected().unwrap_or(0);
        self.select(Some(current.saturating_sub(count)));
    }

    fn move_down_by(&mut self, count: usize, total_items: usize) {
        if total_items == 0 {
            return;
        }
        let current = self.selected().unwrap_or(0);
        self.select(Some((current + count).min(total_items - 1)));
    }

    fn select_first_item(&mut self, total_items: usize) {
        if total_items > 0 {
            self.select(Some(0));
        }
    }

    fn select_last_item(&mut self, total_items: usize) {
        if total_items > 0 {
            self.select(Some(total_items - 1));
        }
    }

    fn clamp_to(&mut self, total_items: usize) {
        if total_items == 0 {
            self.select(None);
        } else {
            let current = self.selected().unwrap_or(0);
            self.select(Some(current.min(total_items - 1)));
        }
    }

    fn selected_or_first(&mut self, total_items: usize) -> Option<usize> {
        if total_items == 0 {
            return None;
        }
        if self.selected().is_none() {
            self.select(Some(0));
        }
        self.selected()
    }

    fn apply_movement(&mut self, op: Operation, total_items: usize) -> bool {
        match op {
            Operation::Up => self.move_up_by(1, total_items),
            Operation::Down => self.move_down_by(1, total_items),
            Operation::PageUp => self.move_up_by(DEFAULT_PAGE_SIZE, total_items),
            Operation::PageDown => self.move_down_by(DEFAULT_PAGE_SIZE, total_items),
            Operation::Home => self.select_first_item(total_items),
            Operation::End => self.select_last_item(total_items),
            _ => return false,
        }
        true
    }
}

/// Publish a title, list rows and the selection to a surface
pub fn show_list(surface: &mut dyn Surface, head: &str, rows: &[String], state: &ListState) {
    surface.set(FIELD_HEAD, head);
    surface.set(FIELD_BODY, &rows.join("\n"));
    surface.set(FIELD_POS, &state.selected().unwrap_or(0).to_string());
    surface.set(FIELD_OFFSET, "");
}

/// Publish a title and free-scrolling text to a surface
pub fn show_text(surface: &mut dyn Surface, head: &str, lines: &[String], offset: usize) {
    surface.set(FIELD_HEAD, head);
    surface.set(FIELD_BODY, &lines.join("\n"));
    surface.set(FIELD_POS, "");
    surface.set(FIELD_OFFSET, &offset.to_string());
}

/// Scroll offset after a movement operation over `total_lines` lines of
/// text, or `None` for anything that is not a movement
pub fn scroll_offset(op: Operation, offset: usize, total_lines: usize) -> Option<usize> {
    let last = total_lines.saturating_sub(1);
    let next = match op {
        Operation::Up => offset.saturating_sub(1),
        Operation::Down => offset + 1,
        Operation::PageUp => offset.saturating_sub(DEFAULT_PAGE_SIZE),
        Operation::PageDown => offset + DEFAULT_PAGE_SIZE,
        Operation::Home => 0,
        Operation::End => last,
        _ => return None,
    };
    Some(next.min(last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedSurface;

    #[test]
    fn test_move_up_by() {
        let mut state = ListState::default();
        state.select(Some(5));
        state.move_up_by(3, 10);
        assert_eq!(state.selected(), Some(2));

        // Test saturating at 0
        state.move_up_by(10, 10);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn test_move_down_by() {
        let mut state = ListState::default();
        state.select(Some(5));
        state.move_down_by(3, 10);
        assert_eq!(state.selected(), Some(8));

        // Test saturating at end
        state.move_down_by(10, 10);
        assert_eq!(state.selected(), Some(9));
    }

    #[test]
    fn test_empty_list() {
        let mut state = ListState::default();

        state.move_up_by(1, 0);
        assert_eq!(state.selected(), None);

        state.move_down_by(1, 0);
        assert_eq!(state.selected(), None);

        state.select_first_item(0);
        assert_eq!(state.selected(), None);
        assert_eq!(state.selected_or_first(0), None);
    }

    #[test]
    fn test_clamp_to() {
        let mut state = ListState::default();
        state.select(Some(7));
        state.clamp_to(3);
        assert_eq!(state.selected(), Some(2));
        state.clamp_to(0);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_apply_movement() {
        let mut state = ListState::default();
        assert!(state.apply_movement(Operation::End, 25));
        assert_eq!(state.selected(), Some(24));
        assert!(state.apply_movement(Operation::PageUp, 25));
        assert_eq!(state.selected(), Some(14));
        assert!(state.apply_movement(Operation::Home, 25));
        assert_eq!(state.selected(), Some(0));
        assert!(!state.apply_movement(Operation::Open, 25));
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(Operation::Down, 0, 5), Some(1));
        assert_eq!(scroll_offset(Operation::Down, 4, 5), Some(4));
        assert_eq!(scroll_offset(Operation::PageDown, 0, 5), Some(4));
        assert_eq!(scroll_offset(Operation::Up, 0, 5), Some(0));
        assert_eq!(scroll_offset(Operation::End, 0, 0), Some(0));
        assert_eq!(scroll_offset(Operation::Quit, 3, 5), None);
    }

    #[test]
    fn test_show_list() {
        let mut surface = ScriptedSurface::detached();
        let mut state = ListState::default();
        state.select(Some(1));
        show_list(&mut surface, "Feeds", &["a".to_string(), "b".to_string()], &state);
        assert_eq!(surface.get(FIELD_HEAD), "Feeds");
        assert_eq!(surface.get(FIELD_BODY), "a\nb");
        assert_eq!(surface.get(FIELD_POS), "1");
    }
}
