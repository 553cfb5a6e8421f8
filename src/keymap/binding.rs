//! KeyBinding struct for mapping keys to operations
//!
//! Provides parsing of key strings like "ctrl+l", "shift+j", "enter" and the
//! canonical event names (`^L`, `J`, `ENTER`) that surfaces report.

use super::Operation;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Context name matching every screen
pub const ALL_CONTEXTS: &str = "all";

/// A single key binding mapping a key combination to an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key string (e.g., "j", "down", "ctrl+l", "^L", "ENTER")
    pub key: String,

    /// The operation this key triggers
    pub operation: Operation,

    /// Screen identity this binding is limited to; `None` or "all" for every screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Parsed key representation for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Create a binding valid in every screen
    pub fn new(key: &str, operation: Operation) -> Self {
        Self {
            key: key.to_string(),
            operation,
            context: None,
        }
    }

    /// Create a binding limited to one screen identity
    pub fn in_context(key: &str, operation: Operation, context: &str) -> Self {
        Self {
            key: key.to_string(),
            operation,
            context: Some(context.to_string()),
        }
    }

    /// Whether this binding is active in the given screen context
    pub fn applies_to(&self, context: &str) -> bool {
        match self.context.as_deref() {
            None | Some(ALL_CONTEXTS) => true,
            Some(c) => c == context,
        }
    }

    /// Canonical event name of this binding, `None` if the key string is invalid
    pub fn event_name(&self) -> Option<String> {
        parse_key_string(&self.key)
            .ok()
            .map(|parsed| event_name(parsed.code, parsed.modifiers))
    }

    /// Check if this binding matches the given event name
    pub fn matches(&self, event: &str) -> bool {
        self.event_name().is_some_and(|name| name == event)
    }

    /// Get the display string for this binding (e.g., "Ctrl+L")
    pub fn display(&self) -> String {
        format_key_display(&self.key)
    }
}

/// Parse a key string like "ctrl+shift+n" or "^N" into KeyCode and KeyModifiers
pub fn parse_key_string(key: &str) -> Result<ParsedKey, String> {
    let key = key.trim();

    // "^X" is the classic spelling of ctrl+x
    if let Some(rest) = key.strip_prefix('^') {
        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(ParsedKey {
                code: KeyCode::Char(c.to_ascii_lowercase()),
                modifiers: KeyModifiers::CONTROL,
            });
        }
    }

    // A lone "+" is the plus key, not a separator
    if key == "+" {
        return Ok(ParsedKey {
            code: KeyCode::Char('+'),
            modifiers: KeyModifiers::NONE,
        });
    }

    let parts: Vec<&str> = key.split('+').collect();

    let mut modifiers = KeyModifiers::NONE;
    let mut key_part = "";

    for (i, part) in parts.iter().enumerate() {
        let part = part.trim();
        if i == parts.len() - 1 {
            // Last part is the actual key
            key_part = part;
        } else {
            // Everything else is a modifier
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" | "option" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return Err(format!("Unknown modifier: {}", part)),
            }
        }
    }

    let code = parse_key_code(key_part)?;
    Ok(ParsedKey { code, modifiers })
}

/// Parse a single key name into KeyCode
fn parse_key_code(key: &str) -> Result<KeyCode, String> {
    // Single character, case preserved ("J" differs from "j")
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = key.to_lowercase();
    match lower.as_str() {
        // Navigation keys
        "up" | "arrow_up" => Ok(KeyCode::Up),
        "down" | "arrow_down" => Ok(KeyCode::Down),
        "left" | "arrow_left" => Ok(KeyCode::Left),
        "right" | "arrow_right" => Ok(KeyCode::Right),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "page_up" | "pgup" | "ppage" => Ok(KeyCode::PageUp),
        "pagedown" | "page_down" | "pgdn" | "npage" => Ok(KeyCode::PageDown),

        // Action keys
        "enter" | "return" => Ok(KeyCode::Enter),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "insert" | "ins" => Ok(KeyCode::Insert),

        // Function keys
        _ if lower.starts_with('f') => lower[1..]
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=12).contains(n))
            .map(KeyCode::F)
            .ok_or_else(|| format!("Unknown key: {}", key)),

        _ => Err(format!("Unknown key: {}", key)),
    }
}

/// Canonical event name for a key, as reported by surfaces and matched by the keymap
pub fn event_name(code: KeyCode, modifiers: KeyModifiers) -> String {
    match code {
        KeyCode::Char(' ') => "SPACE".to_string(),
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => {
            format!("^{}", c.to_ascii_uppercase())
        }
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::SHIFT) => {
            c.to_uppercase().to_string()
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "ENTER".to_string(),
        KeyCode::Esc => "ESC".to_string(),
        KeyCode::Up => "UP".to_string(),
        KeyCode::Down => "DOWN".to_string(),
        KeyCode::Left => "LEFT".to_string(),
        KeyCode::Right => "RIGHT".to_string(),
        KeyCode::Home => "HOME".to_string(),
        KeyCode::End => "END".to_string(),
        KeyCode::PageUp => "PAGEUP".to_string(),
        KeyCode::PageDown => "PAGEDOWN".to_string(),
        KeyCode::Tab => "TAB".to_string(),
        KeyCode::BackTab => "BACKTAB".to_string(),
        KeyCode::Backspace => "BACKSPACE".to_string(),
        KeyCode::Delete => "DEL".to_string(),
        KeyCode::Insert => "INS".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        other => format!("{:?}", other).to_uppercase(),
    }
}

/// Canonical event name for a crossterm key event
pub fn key_event_name(key: KeyEvent) -> String {
    event_name(key.code, key.modifiers)
}

/// Format a key string for display (e.g., "ctrl+n" -> "Ctrl+N")
pub fn format_key_display(key: &str) -> String {
    if let Some(rest) = key.strip_prefix('^') {
        if rest.chars().count() == 1 {
            return format!("Ctrl+{}", rest.to_uppercase());
        }
    }
    if key == "+" {
        return key.to_string();
    }

    let parts: Vec<&str> = key.split('+').collect();
    let formatted: Vec<String> = parts
        .iter()
        .map(|part| {
            let part = part.trim();
            if part.chars().count() == 1 {
                return part.to_string();
            }
            let part = part.to_lowercase();
            match part.as_str() {
                "ctrl" | "control" => "Ctrl".to_string(),
                "alt" | "option" => "Alt".to_string(),
                "shift" => "Shift".to_string(),
                "up" | "arrow_up" => "↑".to_string(),
                "down" | "arrow_down" => "↓".to_string(),
                "left" | "arrow_left" => "←".to_string(),
                "right" | "arrow_right" => "→".to_string(),
                "enter" | "return" => "Enter".to_string(),
                "esc" | "escape" => "Esc".to_string(),
                "space" => "Space".to_string(),
                "tab" => "Tab".to_string(),
                "backtab" => "Shift+Tab".to_string(),
                "backspace" | "bs" => "Backspace".to_string(),
                "delete" | "del" => "Del".to_string(),
                "pageup" | "page_up" | "pgup" | "ppage" => "PgUp".to_string(),
                "pagedown" | "page_down" | "pgdn" | "npage" => "PgDn".to_string(),
                "home" => "Home".to_string(),
                "end" => "End".to_string(),
                _ if part.starts_with('f') && part.len() <= 3 => part.to_uppercase(),
                _ => part,
            }
        })
        .collect();

    formatted.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let parsed = parse_key_string("j").unwrap();
        assert_eq!(parsed.code, KeyCode::Char('j'));
        assert_eq!(parsed.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_keeps_case_of_single_chars() {
        assert_eq!(parse_key_string("J").unwrap().code, KeyCode::Char('J'));
    }

    #[test]
    fn test_parse_caret_notation() {
        let parsed = parse_key_string("^L").unwrap();
        assert_eq!(parsed.code, KeyCode::Char('l'));
        assert_eq!(parsed.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_parse_ctrl_key() {
        let parsed = parse_key_string("ctrl+n").unwrap();
        assert_eq!(parsed.code, KeyCode::Char('n'));
        assert_eq!(parsed.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(parse_key_string("enter").unwrap().code, KeyCode::Enter);
        assert_eq!(parse_key_string("ENTER").unwrap().code, KeyCode::Enter);
        assert_eq!(parse_key_string("space").unwrap().code, KeyCode::Char(' '));
        assert_eq!(parse_key_string("f12").unwrap().code, KeyCode::F(12));
        assert!(parse_key_string("f13").is_err());
        assert!(parse_key_string("hyper+x").is_err());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_name(KeyCode::Char('l'), KeyModifiers::CONTROL), "^L");
        assert_eq!(event_name(KeyCode::Char('J'), KeyModifiers::SHIFT), "J");
        assert_eq!(event_name(KeyCode::Char(','), KeyModifiers::NONE), ",");
        assert_eq!(event_name(KeyCode::Enter, KeyModifiers::NONE), "ENTER");
        assert_eq!(event_name(KeyCode::Char(' '), KeyModifiers::NONE), "SPACE");
    }

    #[test]
    fn test_binding_matches_canonical_event() {
        assert!(KeyBinding::new("ctrl+l", Operation::Redraw).matches("^L"));
        assert!(KeyBinding::new("^L", Operation::Redraw).matches("^L"));
        assert!(KeyBinding::new("enter", Operation::Open).matches("ENTER"));
        assert!(!KeyBinding::new("j", Operation::Down).matches("J"));
    }

    #[test]
    fn test_binding_context() {
        let global = KeyBinding::new("q", Operation::Quit);
        let local = KeyBinding::in_context("x", Operation::CloseDialog, "dialogs");
        assert!(global.applies_to("article"));
        assert!(local.applies_to("dialogs"));
        assert!(!local.applies_to("feedlist"));
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key_display("ctrl+n"), "Ctrl+n");
        assert_eq!(format_key_display("^L"), "Ctrl+L");
        assert_eq!(format_key_display("up"), "↑");
        assert_eq!(format_key_display("enter"), "Enter");
    }
}
