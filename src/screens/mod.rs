//! Screen controllers.
//!
//! Each screen owns its state and its surface and implements [`Screen`].
//! Screens never touch the stack: anything that opens or closes a screen is
//! a call on the [`Navigator`](crate::navigator::Navigator) passed to
//! `process_operation`.

pub mod dialogs;
pub mod feed_list;
pub mod file_browser;
pub mod help;
pub mod item_list;
pub mod item_view;
pub mod screen_trait;
pub mod select;
pub mod url_view;

pub use dialogs::DialogsScreen;
pub use feed_list::FeedListScreen;
pub use file_browser::{FileBrowserMode, FileBrowserScreen, FIELD_FILENAME};
pub use help::HelpScreen;
pub use item_list::{ItemListScreen, UnreadArticle};
pub use item_view::{article_text, extract_links, ItemViewScreen};
pub use screen_trait::{Screen, ScreenKind};
pub use select::{SelectScreen, FIELD_SELECTED_VALUE};
pub use url_view::{Link, UrlViewScreen};

use crate::keymap::Operation;
use crate::navigator::Navigator;

/// Key hint line such as `q:Quit ENTER:Open ?:Help`
pub(crate) fn hint_line(nav: &Navigator, kind: ScreenKind, entries: &[(Operation, &str)]) -> String {
    entries
        .iter()
        .map(|(op, label)| format!("{}:{}", nav.keys().key_for(*op, kind.as_str()), label))
        .collect::<Vec<_>>()
        .join(" ")
}
