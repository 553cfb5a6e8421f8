//! Launching external programs.
//!
//! Only command-line derivation lives here; the navigator takes care of the
//! stack and display side effects around a launch.

use anyhow::{Context, Result};
use std::process::Command;
use tracing::{debug, warn};

/// Program used when no browser template is configured
pub const DEFAULT_BROWSER: &str = "lynx";

/// Marker replaced by the quoted URL in a browser template
pub const URL_MARKER: &str = "%u";

/// Runs a command line synchronously, with the terminal handed over
pub trait Launcher {
    fn launch(&self, command_line: &str) -> Result<()>;
}

/// Runs command lines through `sh -c`
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn launch(&self, command_line: &str) -> Result<()> {
        debug!("Running external command: {}", command_line);
        let status = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .status()
            .with_context(|| format!("Failed to run '{}'", command_line))?;
        if !status.success() {
            warn!("External command '{}' exited with {}", command_line, status);
        }
        Ok(())
    }
}

/// Single-quote a URL for the shell, escaping embedded quotes as `%27`
pub fn quote_url(url: &str) -> String {
    format!("'{}'", url.replace('\'', "%27"))
}

/// Build the command line that opens `url` with the configured `template`.
///
/// Every `%u` in the template is replaced by the quoted URL. A template
/// without the marker is treated as a program name and gets the quoted URL
/// appended; an empty template falls back to [`DEFAULT_BROWSER`].
pub fn browser_command_line(template: &str, url: &str) -> String {
    let quoted = quote_url(url);
    if template.contains(URL_MARKER) {
        template.replace(URL_MARKER, &quoted)
    } else {
        let program = if template.trim().is_empty() {
            DEFAULT_BROWSER
        } else {
            template
        };
        format!("{} {}", program, quoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_with_marker() {
        assert_eq!(browser_command_line("browser %u", "it's"), "browser 'it%27s'");
        assert_eq!(
            browser_command_line("firefox --new-tab %u &", "https://a.b/c"),
            "firefox --new-tab 'https://a.b/c' &"
        );
    }

    #[test]
    fn test_default_program() {
        assert_eq!(browser_command_line("", "a b"), "lynx 'a b'");
    }

    #[test]
    fn test_template_without_marker() {
        assert_eq!(browser_command_line("w3m", "x"), "w3m 'x'");
    }

    #[test]
    fn test_shell_launcher_runs_command() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let marker = temp_dir.path().join("launched");
        ShellLauncher
            .launch(&format!("touch '{}'", marker.display()))
            .unwrap();
        assert!(marker.exists());
    }
}
