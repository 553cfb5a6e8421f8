use crate::config::Config;
use crate::keymap::{KeyBinding, KeyResolver, Keymap};
use crate::paths::get_config_path;
use crate::screens::ScreenKind;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// A terminal feed reader
#[derive(Parser, Debug)]
#[command(name = "newsnav", version, about = "A terminal feed reader", long_about = None, disable_help_subcommand = true)]
pub struct Cli {
    /// Use this configuration file instead of ~/.config/newsnav/config.toml
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter (e.g. debug, newsnav=trace); overrides RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the key bindings of a screen, or of every screen
    Keys {
        /// Screen identity such as feedlist, articlelist or article
        context: Option<String>,
    },
    /// Print the default configuration
    DefaultConfig,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(get_config_path)
    }

    /// Execute the CLI command; without one the caller starts the TUI
    pub fn execute(&self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        match &self.command {
            Some(Commands::Keys { context }) => {
                let config = Config::load_or_create(&self.config_path())
                    .context("Failed to load configuration")?;
                write_keys(&mut out, &config.keymap, context.as_deref())
            }
            Some(Commands::DefaultConfig) => {
                let toml = Config::default().to_toml()?;
                out.write_all(toml.as_bytes())?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Print the bindings of one screen, or of all screens when `context` is
/// `None`
pub fn write_keys(out: &mut impl Write, keymap: &Keymap, context: Option<&str>) -> Result<()> {
    let kinds: Vec<ScreenKind> = match context {
        Some(tag) => match ScreenKind::from_tag(tag) {
            Some(kind) => vec![kind],
            None => bail!("Unknown screen '{}'", tag),
        },
        None => ScreenKind::all().to_vec(),
    };

    for (i, kind) in kinds.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}:", kind)?;
        for binding in keymap.bindings_for(kind.as_str()) {
            write_binding(out, &binding)?;
        }
    }
    Ok(())
}

fn write_binding(out: &mut impl Write, binding: &KeyBinding) -> Result<()> {
    writeln!(
        out,
        "  {:<12} {:<14} {}",
        binding.display(),
        binding.operation.config_name(),
        binding.operation.description()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_keys_subcommand() {
        let cli = Cli::parse_from(["newsnav", "--config", "/tmp/c.toml", "keys", "article"]);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/c.toml"));
        match cli.command {
            Some(Commands::Keys { context }) => assert_eq!(context.as_deref(), Some("article")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_write_keys_for_one_screen() {
        let mut out = Vec::new();
        write_keys(&mut out, &Keymap::default(), Some("dialogs")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("dialogs:\n"));
        assert!(text.contains("close-dialog"));
        assert!(text.contains("open-in-browser"));
    }

    #[test]
    fn test_write_keys_context_limited() {
        let mut out = Vec::new();
        write_keys(&mut out, &Keymap::default(), Some("feedlist")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("close-dialog"));
    }

    #[test]
    fn test_write_keys_unknown_screen() {
        let mut out = Vec::new();
        assert!(write_keys(&mut out, &Keymap::default(), Some("nosuch")).is_err());
    }
}
