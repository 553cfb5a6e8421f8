//! Article list of one feed, also used for search results.

use super::item_view::save_article;
use super::{hint_line, Screen, ScreenKind};
use crate::feed::{search_feeds, FeedRef, ItemRef};
use crate::keymap::Operation;
use crate::list_navigation::{show_list, ListStateExt};
use crate::navigator::{Direction, Navigator};
use crate::surface::{self, SharedSurface, FIELD_HINT};
use anyhow::Result;
use ratatui::widgets::ListState;
use std::rc::Rc;
use tracing::debug;

/// Article an article list moved its cursor to for its viewer
#[derive(Debug)]
pub struct UnreadArticle {
    pub feed: FeedRef,
    pub item: ItemRef,
}

/// Phrase from macro arguments, or typed at a prompt when there are none
pub(crate) fn search_phrase(args: &[String], nav: &mut Navigator) -> Result<String> {
    if args.is_empty() {
        nav.prompt("Search for: ")
    } else {
        Ok(args.join(" "))
    }
}

pub struct ItemListScreen {
    surface: SharedSurface,
    feed: FeedRef,
    /// Position of the feed in the feed list; `None` for search results
    feed_pos: Option<usize>,
    search_phrase: Option<String>,
    state: ListState,
    rows: Vec<String>,
    redraw: bool,
}

impl ItemListScreen {
    pub fn new(surface: SharedSurface, feed: FeedRef, feed_pos: Option<usize>) -> Self {
        Self {
            surface,
            feed,
            feed_pos,
            search_phrase: None,
            state: ListState::default(),
            rows: Vec::new(),
            redraw: true,
        }
    }

    pub fn search_result(surface: SharedSurface, feed: FeedRef, phrase: &str) -> Self {
        Self {
            search_phrase: Some(phrase.to_string()),
            ..Self::new(surface, feed, None)
        }
    }

    pub fn is_search_result(&self) -> bool {
        self.search_phrase.is_some()
    }

    pub fn feed(&self) -> &FeedRef {
        &self.feed
    }

    fn selected_item(&self) -> Option<ItemRef> {
        self.state
            .selected()
            .and_then(|i| self.feed.borrow().items.get(i).cloned())
    }

    fn rebuild(&mut self) {
        self.rows = self
            .feed
            .borrow()
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item = item.borrow();
                format!(
                    "{:4} {} {}",
                    i + 1,
                    if item.unread { "N" } else { " " },
                    item.title
                )
            })
            .collect();
        self.state.clamp_to(self.rows.len());
        self.state.selected_or_first(self.rows.len());
    }

    fn open_selected(&mut self, nav: &mut Navigator) -> Result<()> {
        let Some(item) = self.selected_item() else {
            nav.show_error("No item selected!");
            return Ok(());
        };
        item.borrow_mut().unread = false;
        self.redraw = true;
        let guid = item.borrow().guid.clone();
        nav.open_item_view(&self.feed, &guid)?;
        Ok(())
    }

    fn unread_in_feed(&self, direction: Direction) -> Option<usize> {
        let feed = self.feed.borrow();
        let is_unread = |i: &usize| feed.items[*i].borrow().unread;
        match (direction, self.state.selected()) {
            (Direction::Forward, Some(sel)) => (sel + 1..feed.items.len()).find(is_unread),
            (Direction::Forward, None) => (0..feed.items.len()).find(is_unread),
            (Direction::Backward, Some(sel)) => (0..sel).rev().find(is_unread),
            (Direction::Backward, None) => None,
        }
    }

    /// Show another feed of the feed list in this screen
    fn switch_feed(&mut self, pos: usize, nav: &Navigator) {
        if let Some(feed) = nav.feeds().get(pos) {
            self.feed = Rc::clone(feed);
            self.feed_pos = Some(pos);
            self.state = ListState::default();
            self.redraw = true;
            debug!("Article list switched to feed {}", pos);
        }
    }

    /// Move the cursor to the next (or previous) unread article, going on to
    /// a neighbouring feed when `goto-next-feed` is set
    fn select_unread(&mut self, direction: Direction, nav: &Navigator) -> Option<ItemRef> {
        if let Some(i) = self.unread_in_feed(direction) {
            self.state.select(Some(i));
            return self.selected_item();
        }
        if !nav.config().get_bool("goto-next-feed") {
            nav.show_error("No unread items.");
            return None;
        }

        let pos = self
            .feed_pos
            .and_then(|pos| nav.unread_feed_from(pos, direction))?;
        self.switch_feed(pos, nav);
        self.rebuild();
        let landed = {
            let feed = self.feed.borrow();
            let mut unread = feed
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.borrow().unread)
                .map(|(i, _)| i);
            let landed = match direction {
                Direction::Forward => unread.next(),
                Direction::Backward => unread.last(),
            };
            landed
        };
        self.state.select(landed);
        landed.and_then(|_| self.selected_item())
    }

    fn goto_unread(&mut self, direction: Direction, nav: &mut Navigator) -> Result<()> {
        if self.select_unread(direction, nav).is_some() {
            self.open_selected(nav)?;
        }
        Ok(())
    }

    fn goto_feed(&mut self, direction: Direction, nav: &mut Navigator) {
        let Some(pos) = self.feed_pos else {
            nav.show_error("Search results have no neighbouring feed.");
            return;
        };
        let target = match direction {
            Direction::Forward if pos + 1 < nav.feeds().len() => Some(pos + 1),
            Direction::Backward if pos > 0 => Some(pos - 1),
            _ => None,
        };
        match target {
            Some(target) => self.switch_feed(target, nav),
            None if direction == Direction::Forward => nav.show_error("Already on last feed."),
            None => nav.show_error("Already on first feed."),
        }
    }

    fn save_selected(&self, nav: &mut Navigator) -> Result<()> {
        match self.selected_item() {
            Some(item) => save_article(&item, nav),
            None => {
                nav.show_error("Error: no item selected!");
                Ok(())
            }
        }
    }
}

impl Screen for ItemListScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::ItemList
    }

    fn title(&self) -> String {
        match &self.search_phrase {
            Some(phrase) => format!("Search Result - '{}'", phrase),
            None => format!("Article List - {}", self.feed.borrow().display_title()),
        }
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        if std::mem::take(&mut self.redraw) {
            self.rebuild();
        }
        let head = {
            let feed = self.feed.borrow();
            format!(
                "{} ({} unread, {} total)",
                self.title(),
                feed.unread_count(),
                feed.total_count()
            )
        };
        let hint = hint_line(
            nav,
            self.kind(),
            &[
                (Operation::Quit, "Quit"),
                (Operation::Open, "Open"),
                (Operation::Save, "Save"),
                (Operation::NextUnread, "Next Unread"),
                (Operation::ToggleRead, "Toggle Read"),
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
        if self.state.apply_movement(op, self.rows.len()) {
            return Ok(());
        }

        match op {
            Operation::Open => self.open_selected(nav)?,
            Operation::OpenInBrowser => {
                if let Some(item) = self.selected_item() {
                    let link = item.borrow().link.clone();
                    if link.is_empty() {
                        nav.show_error("Error: article has no link");
                    } else {
                        item.borrow_mut().unread = false;
                        self.redraw = true;
                        nav.open_in_external_process(&link)?;
                    }
                }
            }
            Operation::ToggleRead => {
                if let Some(item) = self.selected_item() {
                    let mut item = item.borrow_mut();
                    item.unread = !item.unread;
                    self.redraw = true;
                }
            }
            Operation::MarkFeedRead => {
                self.feed.borrow().mark_all_read();
                self.redraw = true;
            }
            Operation::NextUnread => self.goto_unread(Direction::Forward, nav)?,
            Operation::PrevUnread => self.goto_unread(Direction::Backward, nav)?,
            Operation::NextFeed => self.goto_feed(Direction::Forward, nav),
            Operation::PrevFeed => self.goto_feed(Direction::Backward, nav),
            Operation::Save => self.save_selected(nav)?,
            Operation::Search => {
                let phrase = search_phrase(args, nav)?;
                if !phrase.is_empty() {
                    let result = search_feeds(&[Rc::clone(&self.feed)], &phrase).into_ref();
                    nav.open_search_result(&result, &phrase)?;
                }
            }
            Operation::ViewDialogs => {
                nav.open_dialog_list()?;
            }
            Operation::Help => {
                nav.open_help()?;
            }
            Operation::Quit => nav.pop(),
            other => debug!("Article list ignores {:?}", other),
        }
        Ok(())
    }

    fn set_redraw(&mut self, redraw: bool) {
        self.redraw = redraw;
    }

    fn recalculate_layout(&mut self) {
        self.state.clamp_to(self.feed.borrow().total_count());
    }

    fn step_unread(&mut self, direction: Direction, nav: &Navigator) -> Option<UnreadArticle> {
        let item = self.select_unread(direction, nav)?;
        self.redraw = true;
        Some(UnreadArticle {
            feed: Rc::clone(&self.feed),
            item,
        })
    }
}
