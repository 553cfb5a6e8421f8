//! Error types for the navigation core.
//!
//! Navigation failures are never fatal: callers turn them into a status line
//! message and keep running. Application plumbing (config, terminal setup)
//! uses `anyhow` instead.

use crate::screens::ScreenKind;
use thiserror::Error;

/// Precondition violations raised by the navigation controller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    /// An operation needed a live current screen but the stack was empty
    /// or the current entry is an external hand-off.
    #[error("no screen is currently active")]
    NoCurrentScreen,

    /// `open_item_view` was requested while something other than an item list
    /// was current.
    #[error("current screen is `{0}`, expected an article list")]
    NotItemList(ScreenKind),

    /// A re-entrant dispatch reached a screen that is already handling an
    /// operation further up the call chain.
    #[error("screen `{0}` is already handling an operation")]
    ScreenBusy(ScreenKind),

    /// An article id that is not part of the feed it was looked up in.
    #[error("no article with id `{0}`")]
    UnknownItem(String),

    /// A stack position outside the current stack.
    #[error("no screen at position {0}")]
    InvalidPosition(usize),

    /// An article viewer whose parent is not an article list asked it for
    /// the next unread article.
    #[error("no article list to take the next article from")]
    NoArticleList,

    /// The root screen cannot be closed from the dialog list.
    #[error("the root screen cannot be closed")]
    RootScreen,
}

/// Failure to parse or evaluate a filter expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatcherError {
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("attribute `{0}` is not available")]
    AttributeUnavailable(String),

    #[error("invalid regular expression `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("`{0}` is not a number")]
    NotANumber(String),
}
