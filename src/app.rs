use std::time::Instant;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::diff::session::Session;
use crate::diff::tree::FlatItem;
use crate::error::Result;
use crate::extract::{self, InputFormat, InputSource};
use crate::theme::{resolve_theme, ThemeColors};

/// Application mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    /// Typing a filter query.
    Filter,
    Help,
}

/// Main application state.
pub struct App {
    pub session: Session,
    /// Rows currently shown in the tree panel.
    pub flat_items: Vec<FlatItem>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<(String, Instant)>,
    pub source: InputSource,
    pub format: Option<InputFormat>,
    /// Paths flagged commented from the command line, re-applied on reload.
    pub commented_paths: Vec<String>,
    pub watcher_active: bool,
    pub theme: ThemeColors,
    pub use_icons: bool,
    pub panel_width: u16,
}

impl App {
    /// Wrap an already populated session.
    pub fn new(
        session: Session,
        source: InputSource,
        format: Option<InputFormat>,
        config: &AppConfig,
    ) -> Self {
        let mut app = Self {
            session,
            flat_items: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            mode: AppMode::Normal,
            should_quit: false,
            status_message: None,
            source,
            format,
            commented_paths: Vec::new(),
            watcher_active: config.watcher_enabled(),
            theme: resolve_theme(config.theme_scheme()),
            use_icons: config.use_icons(),
            panel_width: config.panel_width(),
        };
        app.refresh_items();
        app.select_active();
        app
    }

    pub fn with_commented(mut self, paths: Vec<String>) -> Self {
        self.commented_paths = paths;
        self
    }

    /// Recompute the visible rows, keeping the selection in range.
    pub fn refresh_items(&mut self) {
        self.flat_items = self.session.visible_items();
        if self.selected_index >= self.flat_items.len() {
            self.selected_index = self.flat_items.len().saturating_sub(1);
        }
    }

    pub fn selected_item(&self) -> Option<&FlatItem> {
        self.flat_items.get(self.selected_index)
    }

    /// Move the selection onto the active file's row, if it is visible.
    pub fn select_active(&mut self) {
        let Some(path) = self.session.active_record().map(|r| r.path.clone()) else {
            return;
        };
        if let Some(idx) = self
            .flat_items
            .iter()
            .position(|item| item.file_path() == Some(path.as_str()))
        {
            self.selected_index = idx;
        }
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let len = self.flat_items.len();
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        self.selected_index = self.flat_items.len().saturating_sub(1);
    }

    /// Keep the selected row inside a window of `visible_height` rows.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }

    /// Expand a collapsed folder, or make the selected file active.
    pub fn expand_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let folder = item.folder_id().map(|id| (id, item.is_expanded));
        let file = item.file_path().map(str::to_string);

        match (folder, file) {
            (Some((id, false)), _) => {
                self.session.set_folder_expanded(id, true);
                self.refresh_items();
            }
            (None, Some(path)) => self.show_path(&path),
            _ => {}
        }
    }

    /// Toggle the selected folder, or make the selected file active.
    pub fn activate_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let folder = item.folder_id();
        let file = item.file_path().map(str::to_string);

        if let Some(id) = folder {
            self.session.toggle_folder(id);
            self.refresh_items();
        } else if let Some(path) = file {
            self.show_path(&path);
        }
    }

    /// Collapse the selected folder, or jump to the enclosing folder's row.
    pub fn collapse_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let depth = item.depth;
        if let (Some(id), true) = (item.folder_id(), item.is_expanded) {
            self.session.set_folder_expanded(id, false);
            self.refresh_items();
            return;
        }
        if depth == 0 {
            return;
        }
        if let Some(parent) = self.flat_items[..self.selected_index]
            .iter()
            .rposition(|row| row.depth + 1 == depth && row.is_folder())
        {
            self.selected_index = parent;
        }
    }

    fn show_path(&mut self, path: &str) {
        if let Some(hash) = self.session.show_path(path) {
            self.set_status_message(format!("Showing {} ({})", path, hash));
        }
    }

    // ── View settings ───────────────────────────────────────────────────────

    /// Advance to the next sort order.
    pub fn cycle_sort(&mut self) {
        let next = self.session.settings().sort_mode.next();
        self.session.set_sort_mode(next);
        self.refresh_items();
        self.set_status_message(format!("Sort: {}", next.label()));
    }

    /// Switch between the folder tree and the flat path list.
    pub fn toggle_display_mode(&mut self) {
        let next = self.session.display_mode().toggle();
        self.session.set_display_mode(next);
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.refresh_items();
        self.select_active();
        self.set_status_message(format!("View: {}", next.label()));
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Help => AppMode::Normal,
            _ => AppMode::Help,
        };
    }

    // ── Filter input ────────────────────────────────────────────────────────

    pub fn start_filter(&mut self) {
        self.mode = AppMode::Filter;
    }

    /// Append a character to the query; rows update as you type.
    pub fn filter_input_char(&mut self, c: char) {
        let mut query = self.session.filter().to_string();
        query.push(c);
        self.apply_filter(query);
    }

    pub fn filter_delete_char(&mut self) {
        let mut query = self.session.filter().to_string();
        if query.pop().is_some() {
            self.apply_filter(query);
        }
    }

    /// Keep the query and return to navigation.
    pub fn confirm_filter(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Drop the query and return to navigation.
    pub fn cancel_filter(&mut self) {
        self.mode = AppMode::Normal;
        self.apply_filter(String::new());
    }

    fn apply_filter(&mut self, query: String) {
        self.session.set_filter(query);
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.refresh_items();
    }

    // ── Reload ──────────────────────────────────────────────────────────────

    /// Re-read and re-extract the change list, replacing the session's
    /// records. The active file is kept (by path) when it still exists.
    ///
    /// On failure the current change set is left untouched.
    pub fn reload(&mut self) -> Result<()> {
        let input = self.source.read()?;
        let extraction = extract::extract(&input, self.format)?;

        let previous = self.session.active_record().map(|r| r.path.clone());
        self.session.clear();
        let count = self.session.ingest(extraction)?;
        for path in &self.commented_paths {
            self.session.mark_commented_path(path);
        }
        match previous {
            Some(path) => self.session.show_path(&path),
            None => self.session.show_file(""),
        };

        self.refresh_items();
        self.select_active();
        info!(files = count, source = %self.source.label(), "reloaded change list");
        self.set_status_message(format!("Reloaded {} file(s)", count));
        Ok(())
    }

    /// Reload, reporting failures in the status bar.
    pub fn handle_input_changed(&mut self) {
        if let Some(path) = self.source.path() {
            if !path.exists() {
                return;
            }
        }
        if let Err(e) = self.reload() {
            warn!(error = %e, "reload failed");
            self.set_status_message(format!("⚠ Reload failed: {}", e));
        }
    }
}
