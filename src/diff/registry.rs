//! Flat, path-keyed registry of changed files.
//!
//! Every extractor event goes through [`FileRegistry::upsert`]. Records are
//! kept in insertion order; the tree projection is rebuilt from them.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use super::path::{expand_path, normalize_path};

/// What happened to a file in the change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    #[default]
    #[serde(alias = "modified", alias = "edit")]
    Updated,
    Renamed,
    #[serde(alias = "removed")]
    Deleted,
}

impl ChangeType {
    /// One-letter marker used in compact listings.
    pub fn marker(&self) -> &'static str {
        match self {
            ChangeType::Added => "A",
            ChangeType::Updated => "M",
            ChangeType::Renamed => "R",
            ChangeType::Deleted => "D",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Updated => "updated",
            ChangeType::Renamed => "renamed",
            ChangeType::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A changed file as known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileRecord {
    /// Unique key, relative to the repository root.
    pub path: String,
    pub dir: String,
    pub base: String,
    pub ext: String,
    /// External anchor correlating the record with its rendered diff block.
    pub hash: String,
    pub change_type: ChangeType,
    pub is_commented: bool,
    pub additions: u64,
    pub deletions: u64,
}

impl FileRecord {
    /// A defaulted record for `path` with `dir`/`base`/`ext` derived from it.
    pub fn new(path: &str) -> Self {
        let parts = expand_path(path);
        Self {
            path: path.to_string(),
            dir: parts.dir,
            base: parts.base,
            ext: parts.ext,
            ..Default::default()
        }
    }

    /// Final path segment, e.g. `main.rs` for `src/main.rs`.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Overwrite only the fields present in `update`.
    fn merge(&mut self, update: &FileUpdate) {
        if let Some(hash) = &update.hash {
            self.hash = hash.clone();
        }
        if let Some(change_type) = update.change_type {
            self.change_type = change_type;
        }
        if let Some(is_commented) = update.is_commented {
            self.is_commented = is_commented;
        }
        if let Some(additions) = update.additions {
            self.additions = additions;
        }
        if let Some(deletions) = update.deletions {
            self.deletions = deletions;
        }
    }
}

/// A partial record: `path` is the key, every other field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileUpdate {
    pub path: String,
    pub hash: Option<String>,
    pub change_type: Option<ChangeType>,
    pub is_commented: Option<bool>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
}

impl FileUpdate {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn change_type(mut self, change_type: ChangeType) -> Self {
        self.change_type = Some(change_type);
        self
    }

    pub fn commented(mut self, is_commented: bool) -> Self {
        self.is_commented = Some(is_commented);
        self
    }

    pub fn stats(mut self, additions: u64, deletions: u64) -> Self {
        self.additions = Some(additions);
        self.deletions = Some(deletions);
        self
    }
}

/// What an upsert did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Merged,
    /// The update carried no usable path.
    Ignored,
}

/// Aggregate numbers over the whole change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub files: usize,
    pub additions: u64,
    pub deletions: u64,
}

/// Insertion-ordered file records with a path index.
#[derive(Debug, Default)]
pub struct FileRegistry {
    records: Vec<FileRecord>,
    index: HashMap<String, usize>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record or merge `update` into the existing one.
    ///
    /// Applying the same update twice leaves the registry as applying it once.
    pub fn upsert(&mut self, update: FileUpdate) -> UpsertOutcome {
        let path = normalize_path(&update.path);
        if path.is_empty() {
            warn!(raw = %update.path, "ignoring file update without a path");
            return UpsertOutcome::Ignored;
        }

        if let Some(&idx) = self.index.get(&path) {
            self.records[idx].merge(&update);
            debug!(%path, "merged file update");
            return UpsertOutcome::Merged;
        }

        let mut record = FileRecord::new(&path);
        record.merge(&update);
        self.index.insert(path.clone(), self.records.len());
        self.records.push(record);
        debug!(%path, "registered file");
        UpsertOutcome::Inserted
    }

    /// All records in insertion order.
    pub fn all(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn by_path(&self, path: &str) -> Option<&FileRecord> {
        self.index
            .get(&normalize_path(path))
            .map(|&idx| &self.records[idx])
    }

    /// Look a record up by its anchor. A leading `#` on either side is ignored.
    pub fn by_hash(&self, hash: &str) -> Option<&FileRecord> {
        let wanted = hash.trim_start_matches('#');
        self.records
            .iter()
            .find(|r| r.hash.trim_start_matches('#') == wanted)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn totals(&self) -> Totals {
        Totals {
            files: self.records.len(),
            additions: self.records.iter().map(|r| r.additions).sum(),
            deletions: self.records.iter().map(|r| r.deletions).sum(),
        }
    }

    /// Drop every record (navigation to a different change set).
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}
