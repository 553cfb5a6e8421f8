//! Logical operations a key can resolve to.
//!
//! Operations are independent of the physical key that triggered them; the
//! keymap decides which key produces which operation in which screen.

use serde::{Deserialize, Serialize};

/// All operations the key resolver can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    // ============ Global ============
    /// Leave the current screen
    Quit,
    /// Show the key bindings of the current screen
    Help,
    /// Reinitialise the whole display
    Redraw,
    /// The next key names a macro to replay
    MacroPrefix,
    /// List all open screens
    ViewDialogs,

    // ============ Movement ============
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,

    // ============ Feeds and articles ============
    /// Open the selected entry
    Open,
    /// Jump to the next unread article
    NextUnread,
    /// Jump to the previous unread article
    PrevUnread,
    /// Switch the article list to the next feed
    NextFeed,
    /// Switch the article list to the previous feed
    PrevFeed,
    /// Open the article link with the configured browser
    OpenInBrowser,
    /// List the links of the article
    ShowUrls,
    /// Toggle the read flag of the selected article
    ToggleRead,
    /// Mark every article of the selected feed as read
    MarkFeedRead,
    /// Save the article to a file
    Save,
    /// Search articles; the phrase comes from the macro arguments
    Search,

    // ============ Filtering ============
    SetFilter,
    ClearFilter,
    SelectTag,
    ClearTag,

    // ============ Dialogs ============
    /// Close the selected screen in the dialog list
    CloseDialog,
}

impl Operation {
    /// Human-readable description shown in the help screen
    pub fn description(&self) -> &'static str {
        match self {
            Operation::Quit => "Quit / go back",
            Operation::Help => "Show help",
            Operation::Redraw => "Redraw screen",
            Operation::MacroPrefix => "Start a macro",
            Operation::ViewDialogs => "View list of open dialogs",
            Operation::Up => "Move up",
            Operation::Down => "Move down",
            Operation::PageUp => "Page up",
            Operation::PageDown => "Page down",
            Operation::Home => "Go to top",
            Operation::End => "Go to end",
            Operation::Open => "Open",
            Operation::NextUnread => "Go to next unread article",
            Operation::PrevUnread => "Go to previous unread article",
            Operation::NextFeed => "Go to next feed",
            Operation::PrevFeed => "Go to previous feed",
            Operation::OpenInBrowser => "Open article in browser",
            Operation::ShowUrls => "Show URLs in current article",
            Operation::ToggleRead => "Toggle read status",
            Operation::MarkFeedRead => "Mark feed read",
            Operation::Save => "Save article",
            Operation::Search => "Search articles",
            Operation::SetFilter => "Set a filter",
            Operation::ClearFilter => "Clear filter",
            Operation::SelectTag => "Select tag",
            Operation::ClearTag => "Clear tag",
            Operation::CloseDialog => "Close currently selected dialog",
        }
    }

    /// Name used in the config file, e.g. `open-in-browser`
    pub fn config_name(&self) -> String {
        let mut name = String::new();
        for (i, c) in format!("{:?}", self).chars().enumerate() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    name.push('-');
                }
                name.push(c.to_ascii_lowercase());
            } else {
                name.push(c);
            }
        }
        name
    }

    /// Operation category for grouping in help display
    pub fn category(&self) -> &'static str {
        match self {
            Operation::Quit
            | Operation::Help
            | Operation::Redraw
            | Operation::MacroPrefix
            | Operation::ViewDialogs => "Global",

            Operation::Up
            | Operation::Down
            | Operation::PageUp
            | Operation::PageDown
            | Operation::Home
            | Operation::End => "Navigation",

            Operation::Open
            | Operation::NextUnread
            | Operation::PrevUnread
            | Operation::NextFeed
            | Operation::PrevFeed
            | Operation::OpenInBrowser
            | Operation::ShowUrls
            | Operation::ToggleRead
            | Operation::MarkFeedRead
            | Operation::Save
            | Operation::Search => "Articles",

            Operation::SetFilter
            | Operation::ClearFilter
            | Operation::SelectTag
            | Operation::ClearTag => "Filtering",

            Operation::CloseDialog => "Dialogs",
        }
    }
}

/// One step of a macro: an operation plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroCmd {
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl MacroCmd {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            args: Vec::new(),
        }
    }

    pub fn with_args(operation: Operation, args: Vec<String>) -> Self {
        Self { operation, args }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_description() {
        assert_eq!(Operation::Up.description(), "Move up");
        assert_eq!(Operation::Quit.description(), "Quit / go back");
    }

    #[test]
    fn test_operation_category() {
        assert_eq!(Operation::Up.category(), "Navigation");
        assert_eq!(Operation::Redraw.category(), "Global");
        assert_eq!(Operation::SelectTag.category(), "Filtering");
    }

    #[test]
    fn test_operation_serde_names() {
        let cmd: MacroCmd = toml::from_str("operation = \"open-in-browser\"").unwrap();
        assert_eq!(cmd.operation, Operation::OpenInBrowser);
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_config_name_matches_serde() {
        for op in [
            Operation::Quit,
            Operation::MacroPrefix,
            Operation::OpenInBrowser,
            Operation::PageDown,
            Operation::CloseDialog,
        ] {
            let cmd: MacroCmd =
                toml::from_str(&format!("operation = \"{}\"", op.config_name())).unwrap();
            assert_eq!(cmd.operation, op);
        }
    }
}
