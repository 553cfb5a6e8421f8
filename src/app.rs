use crate::config::Config;
use crate::external::ShellLauncher;
use crate::navigator::Navigator;
use crate::notifier::ReloadNotifier;
use crate::screens::{FeedListScreen, ScreenKind};
use crate::styles::ColorScheme;
use crate::surface::TerminalDisplay;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::info;

/// Main application state
pub struct App {
    navigator: Navigator,
    runtime: Runtime,
}

impl App {
    pub fn new(config_path: &Path) -> Result<Self> {
        let mut config = Config::load_or_create(config_path)?;
        if std::env::var_os("NO_COLOR").is_some() {
            config.colors = ColorScheme::no_color();
        }
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;

        let keys = Box::new(config.keymap.clone());
        let feeds = config.build_feeds();
        info!(
            "Loaded {} feed(s) from {:?}",
            feeds.len(),
            config_path
        );
        let navigator = Navigator::new(
            config,
            Box::new(TerminalDisplay::new()),
            keys,
            Box::new(ShellLauncher),
        )
        .with_feeds(feeds);

        Ok(Self { navigator, runtime })
    }

    pub fn run(&mut self) -> Result<()> {
        let interval = self.navigator.config().reload_interval;
        let notifier = (interval > 0).then(|| {
            ReloadNotifier::start(
                self.runtime.handle(),
                self.navigator.status_line(),
                Duration::from_secs(interval),
            )
        });

        let surface = self.navigator.new_surface(ScreenKind::FeedList);
        let result = self.navigator.run(Box::new(FeedListScreen::new(surface)));

        drop(notifier);
        info!("Navigation finished");
        result
    }
}
