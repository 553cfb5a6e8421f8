//! Screen trait and associated types.
//!
//! A screen owns its state and its presentation surface. It never touches the
//! navigation stack directly: when an operation needs another screen (open an
//! article, show help, go back) it calls the [`Navigator`] handed to
//! [`Screen::process_operation`].

use super::UnreadArticle;
use crate::keymap::Operation;
use crate::navigator::{Direction, Navigator};
use crate::surface::SharedSurface;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity tag of a screen, used for key binding lookup and routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenKind {
    /// Root screen listing all feeds
    FeedList,
    /// Articles of one feed, or a search result
    ItemList,
    /// Article viewer
    Article,
    Help,
    /// Links of an article
    UrlView,
    SelectTag,
    SelectFilter,
    FileBrowser,
    /// List of open screens
    Dialogs,
}

impl ScreenKind {
    /// Tag used as key binding context
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenKind::FeedList => "feedlist",
            ScreenKind::ItemList => "articlelist",
            ScreenKind::Article => "article",
            ScreenKind::Help => "help",
            ScreenKind::UrlView => "urlview",
            ScreenKind::SelectTag => "selecttag",
            ScreenKind::SelectFilter => "selectfilter",
            ScreenKind::FileBrowser => "filebrowser",
            ScreenKind::Dialogs => "dialogs",
        }
    }

    pub fn all() -> [ScreenKind; 9] {
        [
            ScreenKind::FeedList,
            ScreenKind::ItemList,
            ScreenKind::Article,
            ScreenKind::Help,
            ScreenKind::UrlView,
            ScreenKind::SelectTag,
            ScreenKind::SelectFilter,
            ScreenKind::FileBrowser,
            ScreenKind::Dialogs,
        ]
    }

    /// Look a kind up by its tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().into_iter().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for screen controllers.
///
/// # Example
///
/// ```rust,ignore
/// struct MyScreen {
///     surface: SharedSurface,
/// }
///
/// impl Screen for MyScreen {
///     fn kind(&self) -> ScreenKind {
///         ScreenKind::Help
///     }
///
///     fn process_operation(
///         &mut self,
///         op: Operation,
///         _automatic: bool,
///         _args: &[String],
///         nav: &mut Navigator,
///     ) -> Result<()> {
///         if op == Operation::Quit {
///             nav.pop();
///         }
///         Ok(())
///     }
///     // ...
/// }
/// ```
pub trait Screen {
    /// Identity tag; fixed for the lifetime of the screen
    fn kind(&self) -> ScreenKind;

    /// Human-readable label used by the dialog list
    fn title(&self) -> String;

    /// The surface this screen draws into
    fn surface(&self) -> SharedSurface;

    /// Called once, right before the screen is pushed.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called before every input poll so the screen can refresh cached
    /// state and write it to its surface.
    fn prepare(&mut self, nav: &Navigator) -> Result<()>;

    /// Handle one operation. `automatic` is true when it comes from macro
    /// replay; `args` are the macro command's arguments.
    fn process_operation(
        &mut self,
        op: Operation,
        automatic: bool,
        args: &[String],
        nav: &mut Navigator,
    ) -> Result<()>;

    /// Request (or cancel) a full re-render on the next `prepare`.
    fn set_redraw(&mut self, redraw: bool);

    /// Recompute cached layout, e.g. after becoming current again.
    fn recalculate_layout(&mut self) {}

    /// Periodic callback on input timeouts; article viewers update their
    /// read progress here.
    fn update_percent(&mut self) {}

    /// Move to the next (or previous) unread article on behalf of an article
    /// viewer opened from this screen. Only article lists have a cursor to
    /// move.
    fn step_unread(&mut self, _direction: Direction, _nav: &Navigator) -> Option<UnreadArticle> {
        None
    }
}
