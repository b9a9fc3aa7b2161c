//! The session: single owner of the file registry and its tree projection.
//!
//! Updates land in the registry one at a time; the tree is rebuilt from the
//! registry snapshot on [`Session::finalize`]. Everything here runs on the
//! caller's thread and completes before returning.

use tracing::{debug, info};

use super::active::{resolve_active, ActiveFileTracker};
use super::registry::{FileRecord, FileRegistry, FileUpdate, Totals, UpsertOutcome};
use super::sort::{sort_files, SortMode};
use super::tree::{
    collapse_single_child_folders, find_by_id, find_by_id_mut, flatten, flatten_filtered,
    FileRef, FlatItem, FolderId, FolderNode, ItemKind, TreeBuilder,
};
use crate::error::Result;
use crate::extract::Extraction;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// How the change set is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Flat list of full paths.
    Plain,
    #[default]
    Tree,
}

impl DisplayMode {
    pub fn toggle(&self) -> Self {
        match self {
            DisplayMode::Plain => DisplayMode::Tree,
            DisplayMode::Tree => DisplayMode::Plain,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Plain => "plain",
            DisplayMode::Tree => "tree",
        }
    }
}

/// User settings the core reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub sort_mode: SortMode,
    /// Hide the tree when the change set has a single file.
    pub hide_when_single_change: bool,
    /// Merge single-child folder chains after each build.
    pub collapse_folders: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::default(),
            hide_when_single_change: true,
            collapse_folders: true,
        }
    }
}

pub struct Session {
    registry: FileRegistry,
    builder: TreeBuilder,
    root: FolderNode,
    settings: Settings,
    active: ActiveFileTracker,
    display_mode: DisplayMode,
    filter: String,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let mut builder = TreeBuilder::new();
        let root = builder.empty_root();
        Self {
            registry: FileRegistry::new(),
            builder,
            root,
            settings,
            active: ActiveFileTracker::new(),
            display_mode: DisplayMode::default(),
            filter: String::new(),
        }
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn root(&self) -> &FolderNode {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Upsert one record. The tree is not touched until [`Session::finalize`].
    pub fn update_file(&mut self, update: FileUpdate) -> UpsertOutcome {
        self.registry.upsert(update)
    }

    /// Flag an existing record as commented. Unknown paths are left alone.
    pub fn mark_commented_path(&mut self, path: &str) -> bool {
        if self.registry.by_path(path).is_none() {
            return false;
        }
        self.registry.upsert(FileUpdate::new(path).commented(true));
        true
    }

    /// Apply a whole extraction, then rebuild. `commented[i]` rides along
    /// with `events[i]`, so repeated paths keep their flags on the right
    /// record. Returns the number of distinct files in the registry.
    pub fn ingest(&mut self, extraction: Extraction) -> Result<usize> {
        let mut flags = extraction.commented.into_iter();
        for mut event in extraction.events {
            let flag = flags.next();
            if event.is_commented.is_none() {
                event.is_commented = flag;
            }
            if self.update_file(event.into()) == UpsertOutcome::Ignored {
                debug!("skipped event without a path");
            }
        }
        self.finalize()?;
        Ok(self.registry.len())
    }

    /// Rebuild the tree from the current registry snapshot.
    ///
    /// An empty registry yields an empty root.
    pub fn finalize(&mut self) -> Result<()> {
        self.root = if self.registry.is_empty() {
            self.builder.empty_root()
        } else {
            let mut root = self.builder.build(self.registry.all())?;
            if self.settings.collapse_folders {
                collapse_single_child_folders(&mut root);
            }
            root
        };
        info!(
            files = self.registry.len(),
            prefix = %self.root.name,
            "rebuilt change tree"
        );
        Ok(())
    }

    /// Forget the whole change set.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.active.deactivate();
        self.root = self.builder.empty_root();
        debug!("cleared session");
    }

    /// Set a folder's expanded flag. Returns `false` if the id is unknown.
    pub fn set_folder_expanded(&mut self, id: FolderId, is_expanded: bool) -> bool {
        match find_by_id_mut(&mut self.root, id) {
            Some(folder) => {
                folder.is_expanded = is_expanded;
                true
            }
            None => false,
        }
    }

    /// Flip a folder's expanded flag. Returns the new state.
    pub fn toggle_folder(&mut self, id: FolderId) -> Option<bool> {
        let folder = find_by_id_mut(&mut self.root, id)?;
        folder.is_expanded = !folder.is_expanded;
        Some(folder.is_expanded)
    }

    pub fn folder(&self, id: FolderId) -> Option<&FolderNode> {
        find_by_id(&self.root, id)
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.settings.sort_mode = mode;
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    /// Change folder collapsing; rebuilds when the flag changes.
    pub fn set_collapse_folders(&mut self, collapse: bool) -> Result<()> {
        if self.settings.collapse_folders != collapse {
            self.settings.collapse_folders = collapse;
            self.finalize()?;
        }
        Ok(())
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.filter = query.into();
    }

    /// Activate the file for `requested`, falling back to the first file.
    ///
    /// The previous file is deactivated first. Returns the new active hash,
    /// or `None` when there are no files.
    pub fn show_file(&mut self, requested: &str) -> Option<String> {
        let previous = self.active.deactivate();
        let next = resolve_active(self.registry.all(), requested)?.to_string();
        debug!(previous = ?previous, next = %next, "switching active file");
        self.active.activate(next.clone());
        Some(next)
    }

    /// Activate by path instead of hash.
    pub fn show_path(&mut self, path: &str) -> Option<String> {
        let hash = self
            .registry
            .by_path(path)
            .map(|r| r.hash.clone())
            .unwrap_or_default();
        self.show_file(&hash)
    }

    pub fn active_hash(&self) -> Option<&str> {
        self.active.active()
    }

    pub fn active_record(&self) -> Option<&FileRecord> {
        self.active.active().and_then(|hash| self.registry.by_hash(hash))
    }

    pub fn totals(&self) -> Totals {
        self.registry.totals()
    }

    /// False when the tree should be hidden for a single-file change set.
    pub fn tree_visible(&self) -> bool {
        !(self.settings.hide_when_single_change && self.registry.len() == 1)
    }

    /// Rows for the renderer, sorted on read and filtered by the current
    /// query.
    pub fn visible_items(&self) -> Vec<FlatItem> {
        let mode = self.settings.sort_mode;
        match self.display_mode {
            DisplayMode::Tree if self.filter.is_empty() => flatten(&self.root, mode),
            DisplayMode::Tree => flatten_filtered(&self.root, mode, &self.filter),
            DisplayMode::Plain => self.plain_items(mode),
        }
    }

    fn plain_items(&self, mode: SortMode) -> Vec<FlatItem> {
        let files: Vec<FileRef> = self.registry.all().iter().map(FileRef::from_record).collect();
        let matcher = SkimMatcherV2::default().ignore_case();
        let shown: Vec<&FileRef> = sort_files(&files, mode)
            .into_iter()
            .filter(|f| self.filter.is_empty() || matcher.fuzzy_match(&f.path, &self.filter).is_some())
            .collect();

        let total = shown.len();
        shown
            .into_iter()
            .enumerate()
            .map(|(i, file)| FlatItem {
                kind: ItemKind::File {
                    path: file.path.clone(),
                },
                name: file.path.clone(),
                depth: 0,
                is_expanded: false,
                is_last_sibling: i + 1 == total,
            })
            .collect()
    }
}
