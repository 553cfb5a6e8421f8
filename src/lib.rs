//! newsnav - a terminal feed reader
//!
//! This library holds the screen stack, the navigation controller and the
//! event dispatch loop, plus the screens, key resolver and presentation
//! surfaces they drive.

// Core modules
pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod external;
pub mod feed;
pub mod filter;
pub mod keymap;
pub mod list_navigation;
pub mod navigator;
pub mod notifier;
pub mod paths;
pub mod screens;
pub mod stack;
pub mod status;
pub mod styles;
pub mod surface;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod ui;

// Re-exports for convenience
pub use config::Config;
pub use error::{MatcherError, NavError};
pub use navigator::Navigator;
pub use stack::{ScreenHandle, ScreenStack, StackEntry};
pub use status::StatusLine;

pub use keymap::{KeyBinding, KeyResolver, Keymap, KeymapPreset, MacroCmd, Operation};
