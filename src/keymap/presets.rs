//! Preset keymaps: Standard, Vim
//!
//! Each preset provides a complete set of key bindings for all operations.

use super::{KeyBinding, Operation};
use serde::{Deserialize, Serialize};

/// Available keymap presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeymapPreset {
    /// Classic feed reader keys (arrows, Enter, single letters)
    #[default]
    Standard,
    /// Standard keys plus vim-style movement (g/G, ctrl+d/ctrl+u)
    Vim,
}

impl KeymapPreset {
    /// Get all key bindings for this preset
    pub fn bindings(&self) -> Vec<KeyBinding> {
        match self {
            KeymapPreset::Standard => standard_bindings(),
            KeymapPreset::Vim => vim_bindings(),
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            KeymapPreset::Standard => "Standard",
            KeymapPreset::Vim => "Vim",
        }
    }
}

/// Standard bindings
fn standard_bindings() -> Vec<KeyBinding> {
    vec![
        // Global
        KeyBinding::new("q", Operation::Quit),
        KeyBinding::new("?", Operation::Help),
        KeyBinding::new("^L", Operation::Redraw),
        KeyBinding::new(",", Operation::MacroPrefix),
        KeyBinding::new("v", Operation::ViewDialogs),
        // Movement
        KeyBinding::new("up", Operation::Up),
        KeyBinding::new("k", Operation::Up),
        KeyBinding::new("down", Operation::Down),
        KeyBinding::new("j", Operation::Down),
        KeyBinding::new("pageup", Operation::PageUp),
        KeyBinding::new("pagedown", Operation::PageDown),
        KeyBinding::in_context("b", Operation::PageUp, "article"),
        KeyBinding::in_context("b", Operation::PageUp, "help"),
        KeyBinding::in_context("space", Operation::PageDown, "article"),
        KeyBinding::in_context("space", Operation::PageDown, "help"),
        KeyBinding::new("home", Operation::Home),
        KeyBinding::new("end", Operation::End),
        // Feeds and articles
        KeyBinding::new("enter", Operation::Open),
        KeyBinding::new("n", Operation::NextUnread),
        KeyBinding::new("p", Operation::PrevUnread),
        KeyBinding::new("J", Operation::NextFeed),
        KeyBinding::new("K", Operation::PrevFeed),
        KeyBinding::new("o", Operation::OpenInBrowser),
        KeyBinding::new("u", Operation::ShowUrls),
        KeyBinding::new("N", Operation::ToggleRead),
        KeyBinding::new("A", Operation::MarkFeedRead),
        KeyBinding::new("s", Operation::Save),
        KeyBinding::new("/", Operation::Search),
        // Filtering
        KeyBinding::new("F", Operation::SetFilter),
        KeyBinding::new("^F", Operation::ClearFilter),
        KeyBinding::new("t", Operation::SelectTag),
        KeyBinding::new("^T", Operation::ClearTag),
        // Dialogs
        KeyBinding::in_context("x", Operation::CloseDialog, "dialogs"),
    ]
}

/// Vim bindings: the standard set plus vim-style jumps
fn vim_bindings() -> Vec<KeyBinding> {
    let mut bindings = standard_bindings();
    bindings.extend([
        KeyBinding::new("g", Operation::Home),
        KeyBinding::new("G", Operation::End),
        KeyBinding::new("^U", Operation::PageUp),
        KeyBinding::new("^D", Operation::PageDown),
        KeyBinding::new("l", Operation::Open),
        KeyBinding::new("h", Operation::Quit),
    ]);
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_presets_parse() {
        for preset in [KeymapPreset::Standard, KeymapPreset::Vim] {
            for binding in preset.bindings() {
                assert!(
                    binding.event_name().is_some(),
                    "{} preset has unparsable key {:?}",
                    preset.name(),
                    binding.key
                );
            }
        }
    }

    #[test]
    fn test_no_duplicate_keys_per_context() {
        let mut seen = HashSet::new();
        for binding in standard_bindings() {
            let key = (binding.event_name(), binding.context.clone());
            assert!(seen.insert(key), "duplicate binding for {}", binding.key);
        }
    }
}
