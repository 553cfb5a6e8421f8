//! File browser for choosing where to save (or what to open).

use super::{hint_line, Screen, ScreenKind};
use crate::keymap::Operation;
use crate::list_navigation::{show_list, ListStateExt};
use crate::navigator::Navigator;
use crate::paths::format_path_for_display;
use crate::surface::{self, SharedSurface, FIELD_HINT};
use anyhow::{Context, Result};
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Surface field holding the chosen path; empty when the browser was left
/// without a choice
pub const FIELD_FILENAME: &str = "filenametext";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileBrowserMode {
    Open,
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    /// Save under the suggested name in the current directory
    SaveAs,
    Parent,
    Dir(PathBuf),
    File(PathBuf),
}

pub struct FileBrowserScreen {
    surface: SharedSurface,
    mode: FileBrowserMode,
    default_name: String,
    dir: PathBuf,
    entries: Vec<Entry>,
    state: ListState,
}

impl FileBrowserScreen {
    pub fn new(surface: SharedSurface, mode: FileBrowserMode, default_name: &str, dir: PathBuf) -> Self {
        Self {
            surface,
            mode,
            default_name: default_name.to_string(),
            dir,
            entries: Vec::new(),
            state: ListState::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the current directory: `..` first, then directories, then files,
    /// each group sorted by name
    fn load(&mut self) -> Result<()> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let listing = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory: {:?}", self.dir))?;
        for entry in listing.flatten() {
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            } else {
                files.push(path);
            }
        }
        dirs.sort();
        files.sort();

        self.entries.clear();
        if self.mode == FileBrowserMode::Save {
            self.entries.push(Entry::SaveAs);
        }
        if self.dir.parent().is_some() {
            self.entries.push(Entry::Parent);
        }
        self.entries.extend(dirs.into_iter().map(Entry::Dir));
        self.entries.extend(files.into_iter().map(Entry::File));
        self.state = ListState::default();
        self.state.selected_or_first(self.entries.len());
        Ok(())
    }

    fn enter(&mut self, dir: PathBuf, nav: &Navigator) {
        let previous = std::mem::replace(&mut self.dir, dir);
        if let Err(e) = self.load() {
            warn!("{:#}", e);
            nav.show_error(&format!("Error: {}", e));
            self.dir = previous;
            if let Err(e) = self.load() {
                warn!("{:#}", e);
            }
        }
    }

    fn label(&self, entry: &Entry) -> String {
        let name = |path: &Path| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        };
        match entry {
            Entry::SaveAs => format!("[save as] {}", self.default_name),
            Entry::Parent => "../".to_string(),
            Entry::Dir(path) => format!("{}/", name(path)),
            Entry::File(path) => name(path),
        }
    }

    fn finish(&self, path: &Path, nav: &mut Navigator) {
        surface::lock(&self.surface).set(FIELD_FILENAME, &path.to_string_lossy());
        nav.pop();
    }
}

impl Screen for FileBrowserScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::FileBrowser
    }

    fn title(&self) -> String {
        let verb = match self.mode {
            FileBrowserMode::Open => "Open File",
            FileBrowserMode::Save => "Save File",
        };
        format!("{} - {}", verb, format_path_for_display(&self.dir))
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn init(&mut self) -> Result<()> {
        surface::lock(&self.surface).set(FIELD_FILENAME, "");
        self.load()
    }

    fn prepare(&mut self, nav: &Navigator) -> Result<()> {
        let rows: Vec<String> = self.entries.iter().map(|e| self.label(e)).collect();
        let hint = hint_line(
            nav,
            self.kind(),
            &[(Operation::Quit, "Cancel"), (Operation::Open, "Select")],
        );
        let mut surface = surface::lock(&self.surface);
        show_list(&mut *surface, &self.title(), &rows, &self.state);
        surface.set(FIELD_HINT, &hint);
        Ok(())
    }

    fn process_operation(
        &mut self,
        op: Operation,
        _automatic: bool,
        _args: &[String],
        nav: &mut Navigator,
    ) -> Result<()> {
        if self.state.apply_movement(op, self.entries.len()) {
            return Ok(());
        }
        match op {
            Operation::Open => {
                let Some(entry) = self.state.selected().and_then(|i| self.entries.get(i)).cloned()
                else {
                    return Ok(());
                };
                match entry {
                    Entry::SaveAs => {
                        let path = self.dir.join(&self.default_name);
                        self.finish(&path, nav);
                    }
                    Entry::Parent => {
                        if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
                            self.enter(parent, nav);
                        }
                    }
                    Entry::Dir(path) => self.enter(path, nav),
                    Entry::File(path) => self.finish(&path, nav),
                }
            }
            Operation::Quit => {
                surface::lock(&self.surface).set(FIELD_FILENAME, "");
                nav.pop();
            }
            other => debug!("File browser ignores {:?}", other),
        }
        Ok(())
    }

    fn set_redraw(&mut self, _redraw: bool) {}
}
