//! Shared fixtures for the navigation integration tests.

#![allow(dead_code)]

use newsnav::config::{Config, FeedConfig};
use newsnav::feed::Item;
use newsnav::test_support::{self, RecordingLauncher, ScriptedDisplay};
use newsnav::Navigator;

pub fn item(guid: &str, title: &str) -> Item {
    Item {
        link: format!("https://example.com/{}", guid),
        content: format!("Body of {}", title),
        ..Item::new(guid, title)
    }
}

pub fn feed(url: &str, title: &str, items: Vec<Item>) -> FeedConfig {
    FeedConfig {
        url: url.to_string(),
        title: title.to_string(),
        tags: Vec::new(),
        items,
    }
}

/// Two feeds with articles plus one empty feed
pub fn config_with_feeds() -> Config {
    let mut config = Config::default();
    config.browser = "browser %u".to_string();
    config.feeds = vec![
        feed(
            "https://example.com/rust.xml",
            "Rust",
            vec![item("r1", "Release notes"), item("r2", "Async update")],
        ),
        feed(
            "https://example.com/linux.xml",
            "Linux",
            vec![item("l1", "Kernel release")],
        ),
        feed("https://example.com/empty.xml", "Empty", Vec::new()),
    ];
    config
}

/// A navigator over scripted collaborators
pub struct Harness {
    pub display: ScriptedDisplay,
    pub launcher: RecordingLauncher,
    pub nav: Navigator,
}

impl Harness {
    /// Harness over [`config_with_feeds`] replaying `keys`
    pub fn new(keys: &[&str]) -> Self {
        Self::with_config(keys, config_with_feeds())
    }

    pub fn with_config(keys: &[&str], config: Config) -> Self {
        let display = ScriptedDisplay::with_keys(keys);
        let launcher = RecordingLauncher::new();
        let nav = test_support::navigator(&display, &launcher, config);
        Self {
            display,
            launcher,
            nav,
        }
    }
}
