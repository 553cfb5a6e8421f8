//! Key binding help for the screen it was opened from.

use super::{hint_line, Screen, ScreenKind};
use crate::keymap::{KeyBinding, Operation};
use crate::list_navigation::{scroll_offset, show_text};
use crate::navigator::Navigator;
use crate::surface::{self, SharedSurface, FIELD_HINT};
use anyhow::Result;
use tracing::debug;

pub struct HelpScreen {
    surface: SharedSurface,
    context: ScreenKind,
    lines: Vec<String>,
    offset: usize,
}

impl HelpScreen {
    pub fn new(surface: SharedSurface, context: ScreenKind, bindings: Vec<KeyBinding>) -> Self {
        Self {
            surface,
            context,
            lines: help_lines(&bindings),
            offset: 0,
        }
    }

    /// Screen whose bindings are listed
    pub fn context(&self) -> ScreenKind {
        self.context
    }
}

/// One line per binding, grouped by operation category in first-seen order
fn help_lines(bindings: &[KeyBinding]) -> Vec<String> {
    let mut categories: Vec<&str> = Vec::new();
    for binding in bindings {
        let category = binding.operation.category();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    let mut lines = Vec::new();
    for category in categories {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{}:", category));
        for binding in bindings.iter().filter(|b| b.operation.category() == category) {
            lines.push(format!(
                "  {:<12} {}",
                binding.display(),
                binding.operation.description()
            ));
        }
    }
    lines
}

impl Screen for HelpScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Help
    }

    fn title(&self) -> String {
        "Help".to_string()
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        let head = format!("Help - {}", self.context);
        let hint = hint_line(nav, self.kind(), &[(Operation::Quit, "Quit")]);
        let mut surface = surface::lock(&self.surface);
        show_text(&mut *surface, &head, &self.lines, self.offset);
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
        if let Some(offset) = scroll_offset(op, self.offset, self.lines.len()) {
            self.offset = offset;
            return Ok(());
        }
        match op {
            Operation::Quit => nav.pop(),
            other => debug!("Help ignores {:?}", other),
        }
        Ok(())
    }

    fn set_redraw(&mut self, _redraw: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lines_grouped() {
        let bindings = vec![
            KeyBinding::new("q", Operation::Quit),
            KeyBinding::new("j", Operation::Down),
            KeyBinding::new("?", Operation::Help),
        ];
        let lines = help_lines(&bindings);
        assert_eq!(lines[0], "Global:");
        assert!(lines[1].contains("Quit / go back"));
        assert!(lines[2].contains("Show help"));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Navigation:");
    }
}
