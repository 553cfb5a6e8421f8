//! Color scheme and style system
//!
//! A [`ColorScheme`] is an immutable snapshot of the configured colors. The
//! navigation controller hands it to [`apply_colors`] every time it creates a
//! screen; the surface receives one style string per field
//! (`fg=<c>[,bg=<c>][,attr=<a>]*`) and the terminal renderer turns those strings
//! back into ratatui styles with [`parse_style`].

use crate::screens::ScreenKind;
use crate::surface::Surface;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

/// Sentinel meaning "use the terminal default"
pub const DEFAULT_COLOR: &str = "default";

/// Field holding the article text style
pub const ARTICLE_FIELD: &str = "article";

/// Field receiving the derived end-of-emphasis style
pub const STYLE_END_FIELD: &str = "styleend";

/// List selection indicator shown next to the selected item
pub const LIST_HIGHLIGHT_SYMBOL: &str = "» ";

/// Colors and attributes of one style field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    #[serde(default = "default_color")]
    pub fg: String,
    #[serde(default = "default_color")]
    pub bg: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl ColorSpec {
    pub fn new(fg: &str, bg: &str, attributes: &[&str]) -> Self {
        Self {
            fg: fg.to_string(),
            bg: bg.to_string(),
            attributes: attributes.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Style string for this spec: `fg=<c>[,bg=<c>][,attr=<a>]*`, omitting
    /// colors set to `default`
    pub fn style_string(&self) -> String {
        let mut parts = Vec::new();
        if self.fg != DEFAULT_COLOR {
            parts.push(format!("fg={}", self.fg));
        }
        if self.bg != DEFAULT_COLOR {
            parts.push(format!("bg={}", self.bg));
        }
        for attr in &self.attributes {
            parts.push(format!("attr={}", attr));
        }
        parts.join(",")
    }

    /// End-of-emphasis marker derived from the article style:
    /// `[bg=<c>,]attr=bold`
    pub fn style_end_string(&self) -> String {
        if self.bg != DEFAULT_COLOR {
            format!("bg={},attr=bold", self.bg)
        } else {
            "attr=bold".to_string()
        }
    }
}

/// Field name → colors. Iteration order is the field name order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorScheme(BTreeMap<String, ColorSpec>);

impl Default for ColorScheme {
    fn default() -> Self {
        Self::from_entries([
            ("background", ColorSpec::new(DEFAULT_COLOR, DEFAULT_COLOR, &[])),
            ("listnormal", ColorSpec::new(DEFAULT_COLOR, DEFAULT_COLOR, &[])),
            ("listfocus", ColorSpec::new("yellow", "blue", &["bold"])),
            ("info", ColorSpec::new("yellow", "blue", &["bold"])),
            (ARTICLE_FIELD, ColorSpec::new(DEFAULT_COLOR, DEFAULT_COLOR, &[])),
        ])
    }
}

impl ColorScheme {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ColorSpec)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Scheme for terminals where colors should be disabled (`NO_COLOR`)
    pub fn no_color() -> Self {
        Self::from_entries([
            ("listfocus", ColorSpec::new(DEFAULT_COLOR, DEFAULT_COLOR, &["reverse"])),
            ("info", ColorSpec::new(DEFAULT_COLOR, DEFAULT_COLOR, &["bold"])),
        ])
    }

    pub fn get(&self, field: &str) -> Option<&ColorSpec> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, spec: ColorSpec) {
        self.0.insert(field.to_string(), spec);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColorSpec)> {
        self.0.iter()
    }
}

/// Apply a color scheme to a screen's surface.
///
/// Every field gets its style string. For `article` and `help` screens the
/// article field additionally produces the `styleend` marker used to close
/// inline emphasis in rendered article text.
pub fn apply_colors(scheme: &ColorScheme, kind: ScreenKind, surface: &mut dyn Surface) {
    for (field, spec) in scheme.iter() {
        let style = spec.style_string();
        debug!("apply_colors: {} {} {}", kind, field, style);
        surface.set(field, &style);

        if field == ARTICLE_FIELD && matches!(kind, ScreenKind::Article | ScreenKind::Help) {
            surface.set(STYLE_END_FIELD, &spec.style_end_string());
        }
    }
}

/// Parse a style string produced by [`ColorSpec::style_string`]
pub fn parse_style(spec: &str) -> Style {
    let mut style = Style::default();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            "fg" => {
                if let Some(color) = parse_color(value) {
                    style = style.fg(color);
                }
            }
            "bg" => {
                if let Some(color) = parse_color(value) {
                    style = style.bg(color);
                }
            }
            "attr" => {
                if let Some(modifier) = parse_attribute(value) {
                    style = style.add_modifier(modifier);
                }
            }
            _ => {}
        }
    }
    style
}

/// Parse a color name: `default`, `colorN`, named colors, `#rrggbb`
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if value == DEFAULT_COLOR {
        return Some(Color::Reset);
    }
    if let Some(index) = value.strip_prefix("color") {
        return index.parse::<u8>().ok().map(Color::Indexed);
    }
    Color::from_str(value).ok()
}

fn parse_attribute(value: &str) -> Option<Modifier> {
    match value.trim() {
        "bold" => Some(Modifier::BOLD),
        "dim" => Some(Modifier::DIM),
        "underline" => Some(Modifier::UNDERLINED),
        "standout" | "reverse" => Some(Modifier::REVERSED),
        "blink" => Some(Modifier::SLOW_BLINK),
        "invis" => Some(Modifier::HIDDEN),
        _ => None,
    }
}
