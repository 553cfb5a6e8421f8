//! Feed list, the root screen.

use super::item_list::search_phrase;
use super::{hint_line, Screen, ScreenKind};
use crate::feed::search_feeds;
use crate::keymap::Operation;
use crate::list_navigation::{show_list, ListStateExt};
use crate::navigator::Navigator;
use crate::surface::{self, SharedSurface, FIELD_HINT};
use anyhow::Result;
use ratatui::widgets::ListState;
use tracing::debug;

const QUIT_PROMPT: &str = "Do you really want to quit (y:Yes n:No)? ";

pub struct FeedListScreen {
    surface: SharedSurface,
    state: ListState,
    /// Positions in the navigator's feed collection, in display order
    visible: Vec<usize>,
    rows: Vec<String>,
    filter: Option<String>,
    tag: Option<String>,
    redraw: bool,
}

impl FeedListScreen {
    pub fn new(surface: SharedSurface) -> Self {
        Self {
            surface,
            state: ListState::default(),
            visible: Vec::new(),
            rows: Vec::new(),
            filter: None,
            tag: None,
            redraw: true,
        }
    }

    /// Position of the selected feed in the feed collection
    fn selected_feed(&self) -> Option<usize> {
        self.state.selected().and_then(|i| self.visible.get(i).copied())
    }

    fn rebuild(&mut self, nav: &Navigator) {
        let mut visible = match nav.visible_feeds(self.filter.as_deref()) {
            Some(visible) => visible,
            None => {
                self.filter = None;
                (0..nav.feeds().len()).collect()
            }
        };
        if let Some(tag) = &self.tag {
            visible.retain(|&i| nav.feeds()[i].borrow().has_tag(tag));
        }

        self.rows = visible
            .iter()
            .map(|&i| {
                let feed = nav.feeds()[i].borrow();
                let unread = feed.unread_count();
                format!(
                    "{:4} {} ({}/{}) {}",
                    i + 1,
                    if unread > 0 { "N" } else { " " },
                    unread,
                    feed.total_count(),
                    feed.display_title()
                )
            })
            .collect();
        self.visible = visible;
        self.state.clamp_to(self.visible.len());
        self.state.selected_or_first(self.visible.len());
    }

    fn head(&self, nav: &Navigator) -> String {
        let unread = nav
            .feeds()
            .iter()
            .filter(|f| f.borrow().unread_count() > 0)
            .count();
        let mut head = format!("Your feeds ({} unread, {} total)", unread, nav.feeds().len());
        if let Some(tag) = &self.tag {
            head.push_str(&format!(" - tag `{}'", tag));
        }
        if let Some(filter) = &self.filter {
            head.push_str(&format!(" - filter `{}'", filter));
        }
        head
    }

    fn select_next_unread(&mut self, nav: &Navigator) {
        let start = self.state.selected().map_or(0, |i| i + 1);
        let found = (start..self.visible.len())
            .find(|&i| nav.feeds()[self.visible[i]].borrow().unread_count() > 0);
        match found {
            Some(i) => self.state.select(Some(i)),
            None => nav.show_error("No feeds with unread items."),
        }
    }

    fn set_filter(&mut self, args: &[String], nav: &mut Navigator) -> Result<()> {
        let expr = if args.is_empty() {
            let filters = nav.config().filters.clone();
            if filters.is_empty() {
                nav.show_error("No filters defined.");
                return Ok(());
            }
            nav.open_filter_picker(filters)?
        } else {
            args.join(" ")
        };
        if expr.is_empty() {
            return Ok(());
        }
        if nav.visible_feeds(Some(&expr)).is_some() {
            self.filter = Some(expr);
            self.redraw = true;
        }
        Ok(())
    }

    fn select_tag(&mut self, nav: &mut Navigator) -> Result<()> {
        let tags = nav.all_tags();
        if tags.is_empty() {
            nav.show_error("No tags defined.");
            return Ok(());
        }
        let tag = nav.open_tag_picker(tags)?;
        if !tag.is_empty() {
            self.tag = Some(tag);
            self.state.select(Some(0));
            self.redraw = true;
        }
        Ok(())
    }

    fn quit(&mut self, nav: &mut Navigator) -> Result<()> {
        if nav.config().get_bool("confirm-exit") && nav.confirm(QUIT_PROMPT, "yn")? != 'y' {
            return Ok(());
        }
        nav.pop_all();
        Ok(())
    }
}

impl Screen for FeedListScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::FeedList
    }

    fn title(&self) -> String {
        "Feed List".to_string()
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        if std::mem::take(&mut self.redraw) {
            self.rebuild(nav);
        }
        let head = self.head(nav);
        let hint = hint_line(
            nav,
            self.kind(),
            &[
                (Operation::Quit, "Quit"),
                (Operation::Open, "Open"),
                (Operation::NextUnread, "Next Unread"),
                (Operation::SetFilter, "Filter"),
                (Operation::SelectTag, "Tag"),
                (Operation::Help, "Help"),
            ],
        );
        let mut surface = surface::lock(&self.surface);
        show_list(&mut *surface, &head, &self.rows, &self.state);
        surface.set(FIELD_HINT, &hint);
        Ok(())
    }

    fn process_operation(
        &mut self,
        op: Operation,
        _automatic: bool,
        args: &[String],
        nav: &mut Navigator,
    ) -> Result<()> {
        if self.state.apply_movement(op, self.visible.len()) {
            return Ok(());
        }

        match op {
            Operation::Open => match self.selected_feed() {
                Some(pos) => {
                    nav.open_item_list_at(pos)?;
                }
                None => nav.show_error("No feed selected!"),
            },
            Operation::NextUnread => self.select_next_unread(nav),
            Operation::MarkFeedRead => {
                if let Some(pos) = self.selected_feed() {
                    nav.feeds()[pos].borrow().mark_all_read();
                    self.redraw = true;
                }
            }
            Operation::SetFilter => self.set_filter(args, nav)?,
            Operation::ClearFilter => {
                self.filter = None;
                self.redraw = true;
            }
            Operation::SelectTag => self.select_tag(nav)?,
            Operation::ClearTag => {
                self.tag = None;
                self.redraw = true;
            }
            Operation::Search => {
                let phrase = search_phrase(args, nav)?;
                if !phrase.is_empty() {
                    let result = search_feeds(nav.feeds(), &phrase).into_ref();
                    nav.open_search_result(&result, &phrase)?;
                }
            }
            Operation::ViewDialogs => {
                nav.open_dialog_list()?;
            }
            Operation::Help => {
                nav.open_help()?;
            }
            Operation::Quit => self.quit(nav)?,
            other => debug!("Feed list ignores {:?}", other),
        }
        Ok(())
    }

    fn set_redraw(&mut self, redraw: bool) {
        self.redraw = redraw;
    }
}
