//! Navigation controller.
//!
//! Every way of getting from one screen to another goes through here: the
//! navigator creates screens, applies bindings and colors, links each new
//! screen to the one that was current before it and keeps the status line
//! pointed at whatever is current afterwards.

use crate::config::{Config, NamedFilter};
use crate::error::NavError;
use crate::external::{browser_command_line, Launcher};
use crate::feed::{refresh_query_feed, FeedRef};
use crate::filter::Filter;
use crate::keymap::{KeyResolver, Operation};
use crate::screens::{
    DialogsScreen, FileBrowserMode, FileBrowserScreen, HelpScreen, ItemListScreen, ItemViewScreen,
    Link, Screen, ScreenKind, SelectScreen, UnreadArticle, UrlViewScreen, FIELD_FILENAME,
    FIELD_SELECTED_VALUE,
};
use crate::stack::{ScreenHandle, ScreenStack, StackEntry};
use crate::status::StatusLine;
use crate::styles::apply_colors;
use crate::surface::{self, Display, SharedSurface, Surface, Timeout, FIELD_MSG};
use anyhow::{Context, Result};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Direction for unread navigation across feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

pub struct Navigator {
    stack: ScreenStack,
    display: Box<dyn Display>,
    keys: Box<dyn KeyResolver>,
    launcher: Box<dyn Launcher>,
    config: Config,
    status: StatusLine,
    feeds: Vec<FeedRef>,
}

impl Navigator {
    pub fn new(
        config: Config,
        display: Box<dyn Display>,
        keys: Box<dyn KeyResolver>,
        launcher: Box<dyn Launcher>,
    ) -> Self {
        Self {
            stack: ScreenStack::new(),
            display,
            keys,
            launcher,
            config,
            status: StatusLine::new(),
            feeds: Vec::new(),
        }
    }

    pub fn with_feeds(mut self, feeds: Vec<FeedRef>) -> Self {
        self.feeds = feeds;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn feeds(&self) -> &[FeedRef] {
        &self.feeds
    }

    pub fn keys(&self) -> &dyn KeyResolver {
        self.keys.as_ref()
    }

    pub(crate) fn display(&self) -> &dyn Display {
        self.display.as_ref()
    }

    pub fn stack(&self) -> &ScreenStack {
        &self.stack
    }

    pub(crate) fn stack_mut(&mut self) -> &mut ScreenStack {
        &mut self.stack
    }

    /// A handle to the status line guard, for use from other threads
    pub fn status_line(&self) -> StatusLine {
        self.status.clone()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_kind(&self) -> Option<ScreenKind> {
        self.stack.current_kind()
    }

    pub fn current_handle(&self) -> Option<ScreenHandle> {
        self.stack.current_handle()
    }

    pub fn parent_of(&self, handle: ScreenHandle) -> Option<ScreenHandle> {
        self.stack.parent_of(handle)
    }

    pub fn set_status(&self, msg: &str) {
        self.status.set_status(msg);
    }

    pub fn show_error(&self, msg: &str) {
        self.status.show_error(msg);
    }

    /// Point the status line at the current screen, or nowhere during a
    /// hand-off
    pub(crate) fn sync_status(&self) {
        self.status
            .retarget(self.stack.current_slot().map(|slot| slot.surface()));
    }

    /// A fresh surface for a screen of this kind
    pub fn new_surface(&self, kind: ScreenKind) -> SharedSurface {
        self.display.new_surface(kind)
    }

    /// Write the movement key hints a screen shows in its hint line
    pub fn set_bindings(&self, kind: ScreenKind, surface: &mut dyn Surface) {
        let context = kind.as_str();
        let key = |op| self.keys.key_for(op, context);

        surface.set("bind_up", &format!("** {}", key(Operation::Up)));
        surface.set("bind_down", &format!("** {}", key(Operation::Down)));

        let (page_up, page_down) = match kind {
            ScreenKind::Article | ScreenKind::Help => (
                format!("** b {}", key(Operation::PageUp)),
                format!("** SPACE {}", key(Operation::PageDown)),
            ),
            _ => (
                format!("** {}", key(Operation::PageUp)),
                format!("** {}", key(Operation::PageDown)),
            ),
        };
        surface.set("bind_page_up", &page_up);
        surface.set("bind_page_down", &page_down);
    }

    /// Push a screen: bindings and colors first, then `init`, then it becomes
    /// current with the previously current screen as its parent.
    pub fn push_screen(&mut self, mut screen: Box<dyn Screen>) -> Result<ScreenHandle> {
        let kind = screen.kind();
        {
            let surface = screen.surface();
            let mut surface = surface::lock(&surface);
            self.set_bindings(kind, &mut *surface);
            apply_colors(&self.config.colors, kind, &mut *surface);
        }
        screen
            .init()
            .with_context(|| format!("Failed to initialise {} screen", kind))?;

        let parent = self.stack.current_handle();
        let handle = self.stack.push(screen, parent);
        self.sync_status();
        debug!("Stack depth {} after opening {}", self.stack.len(), kind);
        Ok(handle)
    }

    /// Remove the current entry and go back to its parent
    pub fn pop(&mut self) {
        if self.stack.is_empty() {
            return;
        }
        let index = self.stack.current_index();
        let removed = self.stack.remove_at(index);
        self.sync_status();
        if let Some(StackEntry::Screen(slot)) = removed {
            debug!(
                "Closed {} screen {}, stack depth {}",
                slot.kind(),
                slot.handle(),
                self.stack.len()
            );
        }
    }

    /// Remove every entry, ending the main loop
    pub fn pop_all(&mut self) {
        while !self.stack.is_empty() {
            let last = self.stack.len() - 1;
            self.stack.discard_at(last);
        }
        self.sync_status();
        debug!("Stack emptied");
    }

    fn feed_position(&self, feed: &FeedRef) -> Option<usize> {
        self.feeds.iter().position(|f| Rc::ptr_eq(f, feed))
    }

    /// Open the article list of a feed. Query feeds are recomputed first.
    /// Returns `None`, with a status message, when there is nothing to show.
    pub fn open_item_list(&mut self, feed: &FeedRef) -> Result<Option<ScreenHandle>> {
        let position = self.feed_position(feed);
        self.open_item_list_with(feed, position)
    }

    /// Open the article list of the feed at a position in the feed list
    pub fn open_item_list_at(&mut self, position: usize) -> Result<Option<ScreenHandle>> {
        let feed = self
            .feeds
            .get(position)
            .cloned()
            .ok_or(NavError::InvalidPosition(position))?;
        self.open_item_list_with(&feed, Some(position))
    }

    fn open_item_list_with(
        &mut self,
        feed: &FeedRef,
        position: Option<usize>,
    ) -> Result<Option<ScreenHandle>> {
        if feed.borrow().is_query() {
            self.set_status("Updating query feed...");
            if let Err(e) = refresh_query_feed(feed, &self.feeds) {
                warn!("Query feed evaluation failed: {}", e);
                self.show_error(&format!("Error: applying the filter failed: {}", e));
                return Ok(None);
            }
            self.set_status("");
        }

        if feed.borrow().total_count() == 0 {
            self.show_error("Error: feed contains no items!");
            return Ok(None);
        }

        let surface = self.new_surface(ScreenKind::ItemList);
        let screen = ItemListScreen::new(surface, Rc::clone(feed), position);
        self.push_screen(Box::new(screen)).map(Some)
    }

    /// Open an article list showing search results for `phrase`
    pub fn open_search_result(
        &mut self,
        feed: &FeedRef,
        phrase: &str,
    ) -> Result<Option<ScreenHandle>> {
        if feed.borrow().total_count() == 0 {
            self.show_error("Error: feed contains no items!");
            return Ok(None);
        }
        let surface = self.new_surface(ScreenKind::ItemList);
        let screen = ItemListScreen::search_result(surface, Rc::clone(feed), phrase);
        self.push_screen(Box::new(screen)).map(Some)
    }

    /// Open the article viewer. Only valid while an article list is current;
    /// the list becomes the viewer's parent.
    pub fn open_item_view(&mut self, feed: &FeedRef, guid: &str) -> Result<ScreenHandle> {
        match self.stack.current_kind() {
            Some(ScreenKind::ItemList) => {}
            Some(kind) => return Err(NavError::NotItemList(kind).into()),
            None => return Err(NavError::NoCurrentScreen.into()),
        }
        let item = feed
            .borrow()
            .item(guid)
            .ok_or_else(|| NavError::UnknownItem(guid.to_string()))?;
        let surface = self.new_surface(ScreenKind::Article);
        let screen = ItemViewScreen::new(surface, Rc::clone(feed), item);
        self.push_screen(Box::new(screen))
    }

    /// Show the key bindings of the current screen
    pub fn open_help(&mut self) -> Result<ScreenHandle> {
        let context = self.stack.current_kind().unwrap_or(ScreenKind::FeedList);
        let bindings = self.keys.bindings_for(context.as_str());
        let surface = self.new_surface(ScreenKind::Help);
        let screen = HelpScreen::new(surface, context, bindings);
        self.push_screen(Box::new(screen))
    }

    /// List links; nothing is opened for an empty list
    pub fn open_url_list(&mut self, links: Vec<Link>) -> Result<Option<ScreenHandle>> {
        if links.is_empty() {
            self.show_error("URL list empty.");
            return Ok(None);
        }
        let surface = self.new_surface(ScreenKind::UrlView);
        self.push_screen(Box::new(UrlViewScreen::new(surface, links)))
            .map(Some)
    }

    /// List open screens. A no-op when the dialog list is already current.
    pub fn open_dialog_list(&mut self) -> Result<Option<ScreenHandle>> {
        if self.stack.current_kind() == Some(ScreenKind::Dialogs) {
            return Ok(None);
        }
        let surface = self.new_surface(ScreenKind::Dialogs);
        self.push_screen(Box::new(DialogsScreen::new(surface)))
            .map(Some)
    }

    /// Run a file browser modally and return the chosen path, empty if the
    /// user backed out
    pub fn open_file_browser(
        &mut self,
        mode: FileBrowserMode,
        default_name: &str,
        dir: &Path,
    ) -> Result<String> {
        let surface = self.new_surface(ScreenKind::FileBrowser);
        let screen = FileBrowserScreen::new(surface, mode, default_name, dir.to_path_buf());
        self.run_modal(Box::new(screen), Some(FIELD_FILENAME))
    }

    /// Run a tag picker modally and return the chosen tag, empty if none
    pub fn open_tag_picker(&mut self, tags: Vec<String>) -> Result<String> {
        let surface = self.new_surface(ScreenKind::SelectTag);
        self.run_modal(
            Box::new(SelectScreen::tags(surface, tags)),
            Some(FIELD_SELECTED_VALUE),
        )
    }

    /// Run a filter picker modally and return the chosen expression, empty
    /// if none
    pub fn open_filter_picker(&mut self, filters: Vec<NamedFilter>) -> Result<String> {
        let surface = self.new_surface(ScreenKind::SelectFilter);
        self.run_modal(
            Box::new(SelectScreen::filters(surface, filters)),
            Some(FIELD_SELECTED_VALUE),
        )
    }

    /// Ask a single-key question on the current screen's status line.
    ///
    /// Blocks until one of `accepted` is pressed; other keys are ignored.
    pub fn confirm(&mut self, prompt: &str, accepted: &str) -> Result<char> {
        let surface = self
            .stack
            .current_slot()
            .map(|slot| slot.surface())
            .ok_or(NavError::NoCurrentScreen)?;

        let previous = self.begin_handoff();
        let answer = self.read_answer(&surface, prompt, accepted);
        {
            let mut surface = surface::lock(&surface);
            surface.set(FIELD_MSG, "");
            if let Err(e) = surface.draw() {
                warn!("Failed to clear prompt: {}", e);
            }
        }
        self.end_handoff(previous);
        answer
    }

    fn read_answer(&self, surface: &SharedSurface, prompt: &str, accepted: &str) -> Result<char> {
        let mut surface = surface::lock(surface);
        surface.set(FIELD_MSG, prompt);
        loop {
            let Some(event) = surface.poll_event(Timeout::Forever)? else {
                continue;
            };
            match self.keys.key_char(&event) {
                Some(c) if accepted.contains(c) => return Ok(c),
                _ => debug!("Ignoring '{}' while waiting for one of '{}'", event, accepted),
            }
        }
    }

    /// Ask for a line of text on the current screen's status line.
    ///
    /// ENTER submits the text typed so far, ESC cancels with an empty answer.
    pub fn prompt(&mut self, prompt: &str) -> Result<String> {
        let surface = self
            .stack
            .current_slot()
            .map(|slot| slot.surface())
            .ok_or(NavError::NoCurrentScreen)?;

        let previous = self.begin_handoff();
        let answer = self.read_line(&surface, prompt);
        {
            let mut surface = surface::lock(&surface);
            surface.set(FIELD_MSG, "");
            if let Err(e) = surface.draw() {
                warn!("Failed to clear prompt: {}", e);
            }
        }
        self.end_handoff(previous);
        answer
    }

    fn read_line(&self, surface: &SharedSurface, prompt: &str) -> Result<String> {
        let mut surface = surface::lock(surface);
        let mut text = String::new();
        loop {
            surface.set(FIELD_MSG, &format!("{}{}", prompt, text));
            let Some(event) = surface.poll_event(Timeout::Forever)? else {
                continue;
            };
            match event.as_str() {
                "ENTER" => return Ok(text),
                "ESC" => return Ok(String::new()),
                "BACKSPACE" => {
                    text.pop();
                }
                _ => match self.keys.key_char(&event) {
                    Some(c) => text.push(c),
                    None => debug!("Ignoring '{}' in text prompt", event),
                },
            }
        }
    }

    /// Hand the terminal to the configured browser to open `url`
    pub fn open_in_external_process(&mut self, url: &str) -> Result<()> {
        let command_line = browser_command_line(&self.config.get_string("browser"), url);
        info!("Opening {} externally", url);
        debug!("External command line: {}", command_line);

        let previous = self.begin_handoff();
        let result = self
            .display
            .reset()
            .and_then(|()| self.launcher.launch(&command_line));
        self.end_handoff(previous);
        result
    }

    /// Push a hand-off entry; returns the index that was current
    fn begin_handoff(&mut self) -> usize {
        let previous = self.stack.current_index();
        self.stack.push_handoff();
        self.sync_status();
        previous
    }

    /// Remove the hand-off entry pushed by [`Navigator::begin_handoff`] and
    /// return to the screen that was current before it
    fn end_handoff(&mut self, previous: usize) {
        let index = self.stack.current_index();
        match self.stack.current() {
            Some(StackEntry::Handoff) => {
                self.stack.remove_at(index);
            }
            _ => warn!("Expected a hand-off entry at position {}", index),
        }
        if previous < self.stack.len() {
            if let Err(e) = self.stack.set_current(previous) {
                warn!("Cannot return to position {}: {}", previous, e);
            }
        }
        self.sync_status();
    }

    /// `(position, title)` of every open screen except the dialog list
    pub fn screen_titles(&self) -> Vec<(usize, String)> {
        self.stack
            .entries()
            .enumerate()
            .filter_map(|(pos, entry)| entry.as_slot().map(|slot| (pos, slot)))
            .filter(|(_, slot)| slot.kind() != ScreenKind::Dialogs)
            .map(|(pos, slot)| (pos, slot.title().to_string()))
            .collect()
    }

    /// Close the current screen and switch to the one at `position`
    pub fn goto_screen(&mut self, position: usize) -> Result<()> {
        self.stack.replace_current(position)?;
        self.sync_status();
        debug!(
            "Switched to position {}, stack depth {}",
            self.stack.current_index(),
            self.stack.len()
        );
        Ok(())
    }

    /// Close a screen other than the root and the current one
    pub fn close_screen(&mut self, position: usize) -> Result<()> {
        if position == 0 {
            return Err(NavError::RootScreen.into());
        }
        if position >= self.stack.len() || position == self.stack.current_index() {
            return Err(NavError::InvalidPosition(position).into());
        }
        self.stack.discard_at(position);
        self.sync_status();
        debug!("Closed position {}, stack depth {}", position, self.stack.len());
        Ok(())
    }

    /// Have the article list below the viewer `viewer` move its cursor to the
    /// next (or previous) unread article and return where it landed.
    pub fn step_parent_unread(
        &mut self,
        viewer: ScreenHandle,
        direction: Direction,
    ) -> Result<Option<UnreadArticle>> {
        let list = self
            .stack
            .parent_of(viewer)
            .filter(|parent| {
                self.stack
                    .slot(*parent)
                    .is_some_and(|slot| slot.kind() == ScreenKind::ItemList)
            })
            .ok_or(NavError::NoArticleList)?;

        let mut screen = self.stack.checkout(list)?;
        let found = screen.step_unread(direction, self);
        self.stack.checkin(list, screen);
        Ok(found)
    }

    /// Nearest feed with unread articles after (or before) `position`
    pub fn unread_feed_from(&self, position: usize, direction: Direction) -> Option<usize> {
        let has_unread = |i: &usize| self.feeds[*i].borrow().unread_count() > 0;
        match direction {
            Direction::Forward => (position + 1..self.feeds.len()).find(has_unread),
            Direction::Backward => (0..position.min(self.feeds.len())).rev().find(has_unread),
        }
    }

    /// Positions of the feeds matching `filter_expr` (all feeds without a
    /// filter). Evaluation errors are shown on the status line and yield
    /// `None`.
    pub fn visible_feeds(&self, filter_expr: Option<&str>) -> Option<Vec<usize>> {
        let Some(expr) = filter_expr else {
            return Some((0..self.feeds.len()).collect());
        };

        let evaluate = || -> Result<Vec<usize>, crate::error::MatcherError> {
            let filter = Filter::parse(expr)?;
            let mut visible = Vec::new();
            for (i, feed) in self.feeds.iter().enumerate() {
                if filter.matches(&*feed.borrow())? {
                    visible.push(i);
                }
            }
            Ok(visible)
        };

        match evaluate() {
            Ok(visible) => Some(visible),
            Err(e) => {
                warn!("Filter '{}' failed: {}", expr, e);
                self.show_error(&format!("Error: applying the filter failed: {}", e));
                None
            }
        }
    }

    /// Every tag used by any feed, sorted
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .feeds
            .iter()
            .flat_map(|feed| feed.borrow().tags.clone())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}
