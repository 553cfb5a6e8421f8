use crate::feed::{Feed, FeedRef, Item};
use crate::keymap::Keymap;
use crate::styles::ColorScheme;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Command template for opening links; `%u` is replaced by the quoted URL
    #[serde(default)]
    pub browser: String,
    /// Whether next/previous unread may move on to another feed (default: true)
    #[serde(default = "default_true")]
    pub goto_next_feed: bool,
    /// Ask before quitting from the feed list (default: false)
    #[serde(default)]
    pub confirm_exit: bool,
    /// Seconds between background reload notices; 0 disables them
    #[serde(default)]
    pub reload_interval: u64,
    /// Directory the file browser starts in when saving articles
    #[serde(default = "default_save_path")]
    pub save_path: String,
    /// Key bindings and macros
    #[serde(default)]
    pub keymap: Keymap,
    /// Color scheme, one entry per style field
    #[serde(default)]
    pub colors: ColorScheme,
    /// Named filters offered by the filter picker
    #[serde(default)]
    pub filters: Vec<NamedFilter>,
    /// Feeds shown in the feed list
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

/// A filter expression with a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFilter {
    pub name: String,
    pub expr: String,
}

/// A feed entry. Query feeds use a `query:<title>:<expr>` URL and no items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl FeedConfig {
    pub fn to_feed(&self) -> FeedRef {
        let mut feed = Feed::with_items(&self.url, &self.title, self.items.clone());
        feed.tags = self.tags.clone();
        feed.into_ref()
    }
}

fn default_true() -> bool {
    true
}

fn default_save_path() -> String {
    "~".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: String::new(),
            goto_next_feed: true,
            confirm_exit: false,
            reload_interval: 0,
            save_path: default_save_path(),
            keymap: Keymap::default(),
            colors: ColorScheme::default(),
            filters: Vec::new(),
            feeds: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file with secure permissions
    pub fn save(&self, config_path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        // 600: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(config_path)
                .with_context(|| format!("Failed to get file metadata: {:?}", config_path))?
                .permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(config_path, perms)
                .with_context(|| format!("Failed to set file permissions: {:?}", config_path))?;
        }

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).with_context(|| "Failed to serialize config")
    }

    /// Boolean setting by its hyphenated name. Unknown keys read as false.
    pub fn get_bool(&self, key: &str) -> bool {
        match key {
            "goto-next-feed" => self.goto_next_feed,
            "confirm-exit" => self.confirm_exit,
            _ => {
                warn!("Unknown boolean setting: {}", key);
                false
            }
        }
    }

    /// String setting by its hyphenated name. Unknown keys read as empty.
    pub fn get_string(&self, key: &str) -> String {
        match key {
            "browser" => self.browser.clone(),
            "save-path" => self.save_path.clone(),
            "reload-interval" => self.reload_interval.to_string(),
            _ => {
                warn!("Unknown setting: {}", key);
                String::new()
            }
        }
    }

    /// Fresh shared feed handles for every configured feed
    pub fn build_feeds(&self) -> Vec<FeedRef> {
        self.feeds.iter().map(FeedConfig::to_feed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.goto_next_feed);
        assert!(!config.confirm_exit);
        assert_eq!(config.save_path, "~");
        assert!(config.browser.is_empty());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.browser = "firefox %u".to_string();
        config.feeds.push(FeedConfig {
            url: "https://example.com/rss".to_string(),
            title: "Example".to_string(),
            tags: vec!["news".to_string()],
            items: vec![Item::new("1", "Hello")],
        });
        config.save(&config_path).unwrap();

        let loaded = Config::load_or_create(&config_path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let config = Config::load_or_create(&config_path).unwrap();
        assert!(config_path.exists());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "confirm_exit = true\n").unwrap();
        let config = Config::load_or_create(&config_path).unwrap();
        assert!(config.confirm_exit);
        assert!(config.goto_next_feed);
    }

    #[test]
    fn test_full_file() {
        let content = indoc! {r#"
            browser = "w3m %u"
            reload_interval = 300

            [keymap]
            preset = "vim"

            [[keymap.overrides]]
            key = "Q"
            operation = "quit"
            context = "article"

            [keymap.macros]
            s = [{ operation = "search", args = ["rust"] }]

            [[filters]]
            name = "Unread"
            expr = "unread_count > 0"

            [[feeds]]
            url = "https://example.com/rss"
            title = "Example"
            tags = ["news"]

            [[feeds.items]]
            guid = "1"
            title = "Hello"
        "#};
        let config: Config = toml::from_str(content).unwrap();

        assert_eq!(config.reload_interval, 300);
        assert_eq!(config.keymap.preset, crate::keymap::KeymapPreset::Vim);
        assert_eq!(config.keymap.overrides[0].context.as_deref(), Some("article"));
        assert_eq!(
            config.keymap.macros["s"],
            vec![crate::keymap::MacroCmd::with_args(
                crate::keymap::Operation::Search,
                vec!["rust".to_string()]
            )]
        );
        assert_eq!(config.filters[0].name, "Unread");
        let feeds = config.build_feeds();
        assert_eq!(feeds[0].borrow().items.len(), 1);
        assert!(feeds[0].borrow().items[0].borrow().unread);
        assert!(feeds[0].borrow().has_tag("news"));
    }

    #[test]
    fn test_hyphenated_accessors() {
        let mut config = Config::default();
        config.goto_next_feed = false;
        config.browser = "w3m %u".to_string();
        assert!(!config.get_bool("goto-next-feed"));
        assert!(!config.get_bool("confirm-exit"));
        assert!(!config.get_bool("no-such-flag"));
        assert_eq!(config.get_string("browser"), "w3m %u");
        assert_eq!(config.get_string("save-path"), "~");
    }

    #[test]
    fn test_build_feeds() {
        let mut config = Config::default();
        config.feeds.push(FeedConfig {
            url: "query:Unread:unread = \"yes\"".to_string(),
            title: String::new(),
            tags: vec![],
            items: vec![],
        });
        let feeds = config.build_feeds();
        assert_eq!(feeds.len(), 1);
        assert!(feeds[0].borrow().is_query());
        assert_eq!(feeds[0].borrow().display_title(), "Unread");
    }
}
