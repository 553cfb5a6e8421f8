//! URL list of an article.

use super::{hint_line, Screen, ScreenKind};
use crate::keymap::Operation;
use crate::list_navigation::{show_list, ListStateExt};
use crate::navigator::Navigator;
use crate::surface::{self, SharedSurface, FIELD_HINT};
use anyhow::Result;
use ratatui::widgets::ListState;
use tracing::debug;

/// A link with an optional label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub title: String,
}

impl Link {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
        }
    }
}

pub struct UrlViewScreen {
    surface: SharedSurface,
    links: Vec<Link>,
    state: ListState,
}

impl UrlViewScreen {
    pub fn new(surface: SharedSurface, links: Vec<Link>) -> Self {
        let mut state = ListState::default();
        state.selected_or_first(links.len());
        Self {
            surface,
            links,
            state,
        }
    }
}

impl Screen for UrlViewScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::UrlView
    }

    fn title(&self) -> String {
        "URLs".to_string()
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        let rows: Vec<String> = self
            .links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                if link.title.is_empty() {
                    format!("{:2} {}", i + 1, link.url)
                } else {
                    format!("{:2} {} ({})", i + 1, link.url, link.title)
                }
            })
            .collect();
        let hint = hint_line(
            nav,
            self.kind(),
            &[(Operation::Quit, "Quit"), (Operation::Open, "Open in Browser")],
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
        if self.state.apply_movement(op, self.links.len()) {
            return Ok(());
        }
        match op {
            Operation::Open | Operation::OpenInBrowser => {
                let url = self
                    .state
                    .selected()
                    .and_then(|i| self.links.get(i))
                    .map(|link| link.url.clone());
                match url {
                    Some(url) => nav.open_in_external_process(&url)?,
                    None => nav.show_error("No link selected!"),
                }
            }
            Operation::Help => {
                nav.open_help()?;
            }
            Operation::Quit => nav.pop(),
            other => debug!("URL list ignores {:?}", other),
        }
        Ok(())
    }

    // The list never changes after creation
    fn set_redraw(&mut self, _redraw: bool) {}
}
