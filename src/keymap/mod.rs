//! Keymap configuration module
//!
//! Resolves raw input events to logical operations per screen context, and
//! stores the macro table. Preset keymaps (standard, vim) can be overridden
//! per key from the config file.

mod binding;
mod operation;
mod presets;

pub use binding::{
    event_name, format_key_display, key_event_name, parse_key_string, KeyBinding, ALL_CONTEXTS,
};
pub use operation::{MacroCmd, Operation};
pub use presets::KeymapPreset;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps raw input events to operations and macros.
///
/// The dispatch loop consumes this as a black box; `Keymap` is the
/// config-backed implementation.
pub trait KeyResolver {
    /// Operation bound to `event` in the screen identified by `context`
    fn operation(&self, event: &str, context: &str) -> Option<Operation>;

    /// Commands of the macro named by `event`; empty if there is no such macro
    fn macro_commands(&self, name: &str) -> Vec<MacroCmd>;

    /// Single character typed by `event`, used by yes/no prompts
    fn key_char(&self, event: &str) -> Option<char>;

    /// Event name of the first key bound to `op` in `context`
    fn key_for(&self, op: Operation, context: &str) -> String;

    /// Every binding active in `context`, overrides first
    fn bindings_for(&self, context: &str) -> Vec<KeyBinding>;
}

/// Keymap configuration with preset, overrides and macros
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keymap {
    /// Base preset keymap
    #[serde(default)]
    pub preset: KeymapPreset,

    /// User-defined overrides (checked before preset)
    #[serde(default)]
    pub overrides: Vec<KeyBinding>,

    /// Named macros, replayed after the macro prefix key
    #[serde(default)]
    pub macros: BTreeMap<String, Vec<MacroCmd>>,
}

impl Keymap {
    /// Get all bindings (overrides + preset) active in `context`.
    /// An override for an operation shadows every preset binding for it.
    pub fn all_bindings(&self, context: &str) -> Vec<KeyBinding> {
        let mut bindings: Vec<KeyBinding> = self
            .overrides
            .iter()
            .filter(|b| b.applies_to(context))
            .cloned()
            .collect();

        for preset_binding in self.preset.bindings() {
            if !preset_binding.applies_to(context) {
                continue;
            }
            let is_overridden = self
                .overrides
                .iter()
                .any(|o| o.applies_to(context) && o.operation == preset_binding.operation);
            if !is_overridden {
                bindings.push(preset_binding);
            }
        }

        bindings
    }

    /// Register a macro, replacing any macro with the same name
    pub fn add_macro(&mut self, name: &str, commands: Vec<MacroCmd>) {
        self.macros.insert(name.to_string(), commands);
    }
}

impl KeyResolver for Keymap {
    fn operation(&self, event: &str, context: &str) -> Option<Operation> {
        self.all_bindings(context)
            .into_iter()
            .find(|binding| binding.matches(event))
            .map(|binding| binding.operation)
    }

    fn macro_commands(&self, name: &str) -> Vec<MacroCmd> {
        self.macros.get(name).cloned().unwrap_or_default()
    }

    fn key_char(&self, event: &str) -> Option<char> {
        match event {
            "SPACE" => Some(' '),
            "ENTER" => Some('\n'),
            _ => {
                let mut chars = event.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
        }
    }

    fn key_for(&self, op: Operation, context: &str) -> String {
        self.all_bindings(context)
            .into_iter()
            .filter(|binding| binding.operation == op)
            .find_map(|binding| binding.event_name())
            .unwrap_or_else(|| "<none>".to_string())
    }

    fn bindings_for(&self, context: &str) -> Vec<KeyBinding> {
        self.all_bindings(context)
    }
}
