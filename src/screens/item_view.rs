//! Article viewer.

use super::url_view::Link;
use super::{hint_line, FileBrowserMode, Screen, ScreenKind};
use crate::feed::{filename_suggestion, FeedRef, Item, ItemRef};
use crate::error::NavError;
use crate::keymap::Operation;
use crate::list_navigation::{scroll_offset, show_text, DEFAULT_PAGE_SIZE};
use crate::navigator::{Direction, Navigator};
use crate::paths::expand_path;
use crate::surface::{self, SharedSurface, FIELD_HEAD, FIELD_HINT};
use anyhow::{Context, Result};
use regex::Regex;
use std::rc::Rc;
use std::sync::OnceLock;
use tracing::debug;

fn url_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"https?://[^\s<>"')\]]+"#).ok())
        .as_ref()
}

/// Links of an article: its own link first, then every URL in its content
pub fn extract_links(item: &Item) -> Vec<Link> {
    let mut links = Vec::new();
    if !item.link.is_empty() {
        links.push(Link::new(&item.link, "link"));
    }
    let Some(pattern) = url_pattern() else {
        return links;
    };
    for found in pattern.find_iter(&item.content) {
        let url = found.as_str().trim_end_matches(['.', ',', ';']);
        if !links.iter().any(|l| l.url == url) {
            links.push(Link::new(url, ""));
        }
    }
    links
}

/// Plain text rendition of an article, as shown and saved
pub fn article_text(item: &Item) -> Vec<String> {
    let mut lines = vec![format!("Title: {}", item.title)];
    if !item.author.is_empty() {
        lines.push(format!("Author: {}", item.author));
    }
    if !item.link.is_empty() {
        lines.push(format!("Link: {}", item.link));
    }
    lines.push(String::new());
    lines.extend(item.content.lines().map(str::to_string));
    lines
}

/// Ask for a file name with the file browser and write the article there
pub(crate) fn save_article(item: &ItemRef, nav: &mut Navigator) -> Result<()> {
    let (name, text) = {
        let item = item.borrow();
        (filename_suggestion(&item.title), article_text(&item).join("\n"))
    };
    let dir = expand_path(&nav.config().get_string("save-path"));
    let path = nav.open_file_browser(FileBrowserMode::Save, &name, &dir)?;
    if path.is_empty() {
        return Ok(());
    }
    std::fs::write(&path, text + "\n")
        .with_context(|| format!("Failed to save article to {}", path))?;
    nav.set_status(&format!("Saved article to {}", path));
    Ok(())
}

pub struct ItemViewScreen {
    surface: SharedSurface,
    feed: FeedRef,
    item: ItemRef,
    lines: Vec<String>,
    offset: usize,
    percent: usize,
    redraw: bool,
}

impl ItemViewScreen {
    pub fn new(surface: SharedSurface, feed: FeedRef, item: ItemRef) -> Self {
        Self {
            surface,
            feed,
            item,
            lines: Vec::new(),
            offset: 0,
            percent: 0,
            redraw: true,
        }
    }

    pub fn feed(&self) -> &FeedRef {
        &self.feed
    }

    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    /// Share of the article scrolled past, counting the visible page
    pub fn percent(&self) -> usize {
        self.percent
    }

    fn head(&self) -> String {
        format!("{} ({}%)", self.title(), self.percent)
    }

    fn show_item(&mut self, item: ItemRef) {
        item.borrow_mut().unread = false;
        self.item = item;
        self.offset = 0;
        self.redraw = true;
    }

    /// Follow the parent article list to its next (or previous) unread article
    fn goto_unread(&mut self, direction: Direction, nav: &mut Navigator) -> Result<()> {
        let viewer = nav.current_handle().ok_or(NavError::NoCurrentScreen)?;
        if let Some(found) = nav.step_parent_unread(viewer, direction)? {
            if !Rc::ptr_eq(&found.feed, &self.feed) {
                debug!("Article view moved to feed '{}'", found.feed.borrow().display_title());
            }
            self.feed = found.feed;
            self.show_item(found.item);
        }
        Ok(())
    }
}

impl Screen for ItemViewScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Article
    }

    fn title(&self) -> String {
        format!("Article - {}", self.item.borrow().title)
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn init(&mut self) -> Result<()> {
        self.item.borrow_mut().unread = false;
        Ok(())
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        if std::mem::take(&mut self.redraw) {
            self.lines = article_text(&self.item.borrow());
            self.offset = self.offset.min(self.lines.len().saturating_sub(1));
            self.update_percent();
        }
        let hint = hint_line(
            nav,
            self.kind(),
            &[
                (Operation::Quit, "Quit"),
                (Operation::OpenInBrowser, "Open in Browser"),
                (Operation::ShowUrls, "URLs"),
                (Operation::Save, "Save"),
                (Operation::NextUnread, "Next Unread"),
                (Operation::Help, "Help"),
            ],
        );
        let mut surface = surface::lock(&self.surface);
        show_text(&mut *surface, &self.head(), &self.lines, self.offset);
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
            self.update_percent();
            return Ok(());
        }

        match op {
            Operation::OpenInBrowser => {
                let link = self.item.borrow().link.clone();
                if link.is_empty() {
                    nav.show_error("Error: article has no link");
                } else {
                    nav.open_in_external_process(&link)?;
                }
            }
            Operation::ShowUrls => {
                let links = extract_links(&self.item.borrow());
                nav.open_url_list(links)?;
            }
            Operation::ToggleRead => {
                let mut item = self.item.borrow_mut();
                item.unread = !item.unread;
            }
            Operation::NextUnread => self.goto_unread(Direction::Forward, nav)?,
            Operation::PrevUnread => self.goto_unread(Direction::Backward, nav)?,
            Operation::Save => save_article(&self.item, nav)?,
            Operation::ViewDialogs => {
                nav.open_dialog_list()?;
            }
            Operation::Help => {
                nav.open_help()?;
            }
            Operation::Quit => nav.pop(),
            other => debug!("Article view ignores {:?}", other),
        }
        Ok(())
    }

    fn set_redraw(&mut self, redraw: bool) {
        self.redraw = redraw;
    }

    fn update_percent(&mut self) {
        let total = self.lines.len();
        self.percent = if total == 0 {
            100
        } else {
            ((self.offset + DEFAULT_PAGE_SIZE).min(total) * 100) / total
        };
        surface::lock(&self.surface).set(FIELD_HEAD, &self.head());
    }
}
