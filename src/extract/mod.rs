//! Change-list extractors.
//!
//! Each input dialect (JSON records, unified diff, `--numstat`,
//! `--name-status`) has its own [`MetadataExtractor`]. Which one runs is
//! decided at runtime by probing the input; the session only ever sees the
//! resulting [`FileChangeEvent`]s.

mod json;
mod name_status;
mod numstat;
mod unified;

pub use json::JsonExtractor;
pub use name_status::NameStatusExtractor;
pub use numstat::NumstatExtractor;
pub use unified::UnifiedDiffExtractor;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{debug, info, warn};

use crate::diff::registry::{ChangeType, FileUpdate};
use crate::error::{AppError, Result};

/// One changed file as reported by an extractor.
///
/// Fields the input did not provide stay `None`, so a later partial event
/// for the same path never resets what an earlier one said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub path: String,
    pub hash: Option<String>,
    pub change_type: Option<ChangeType>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub is_commented: Option<bool>,
}

impl FileChangeEvent {
    pub fn new(path: impl Into<String>, hash: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            path: path.into(),
            hash: Some(hash.into()),
            change_type: Some(change_type),
            additions: None,
            deletions: None,
            is_commented: None,
        }
    }

    pub fn stats(mut self, additions: u64, deletions: u64) -> Self {
        self.additions = Some(additions);
        self.deletions = Some(deletions);
        self
    }
}

impl From<FileChangeEvent> for FileUpdate {
    fn from(event: FileChangeEvent) -> Self {
        FileUpdate {
            path: event.path,
            hash: event.hash,
            change_type: event.change_type,
            is_commented: event.is_commented,
            additions: event.additions,
            deletions: event.deletions,
        }
    }
}

/// Everything an extractor pulled out of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub events: Vec<FileChangeEvent>,
    /// Commented flags reported apart from the files, by event index:
    /// `commented[i]` belongs to `events[i]`.
    pub commented: Vec<bool>,
}

/// A parser for one change-list dialect.
pub trait MetadataExtractor {
    fn name(&self) -> &'static str;

    /// Cheap check whether `input` looks like this dialect.
    fn probe(&self, input: &str) -> bool;

    fn extract(&self, input: &str) -> Result<Extraction>;
}

/// Input dialects, in probing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Json,
    Diff,
    Numstat,
    NameStatus,
}

impl InputFormat {
    pub const ALL: [InputFormat; 4] = [
        InputFormat::Json,
        InputFormat::Diff,
        InputFormat::Numstat,
        InputFormat::NameStatus,
    ];

    pub fn extractor(&self) -> Box<dyn MetadataExtractor> {
        match self {
            InputFormat::Json => Box::new(JsonExtractor),
            InputFormat::Diff => Box::new(UnifiedDiffExtractor),
            InputFormat::Numstat => Box::new(NumstatExtractor),
            InputFormat::NameStatus => Box::new(NameStatusExtractor),
        }
    }
}

/// Run the extractor for `format`, or probe every dialect in order.
///
/// When probing, an extractor that errors or yields no files hands over to
/// the next candidate. Blank input is an empty change set, not an error.
pub fn extract(input: &str, format: Option<InputFormat>) -> Result<Extraction> {
    if input.trim().is_empty() {
        return Ok(Extraction::default());
    }

    if let Some(format) = format {
        let extractor = format.extractor();
        let extraction = extractor.extract(input)?;
        info!(
            extractor = extractor.name(),
            files = extraction.events.len(),
            "extracted change list"
        );
        return Ok(extraction);
    }

    for format in InputFormat::ALL {
        let extractor = format.extractor();
        if !extractor.probe(input) {
            continue;
        }
        match extractor.extract(input) {
            Ok(extraction) if !extraction.events.is_empty() => {
                info!(
                    extractor = extractor.name(),
                    files = extraction.events.len(),
                    "extracted change list"
                );
                return Ok(extraction);
            }
            Ok(_) => debug!(extractor = extractor.name(), "extractor produced no files"),
            Err(e) => warn!(extractor = extractor.name(), error = %e, "extractor failed"),
        }
    }

    Err(AppError::Extract(
        "input is not a recognised change list".into(),
    ))
}

/// Where the change list is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` means standard input.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(arg.to_path_buf())
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::Stdin => None,
            InputSource::File(path) => Some(path),
        }
    }

    /// Short name for titles and status messages.
    pub fn label(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }

    pub fn read(&self) -> Result<String> {
        match self {
            InputSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }
            InputSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                AppError::InvalidPath(format!("{}: {}", path.display(), e))
            }),
        }
    }
}

/// Synthetic anchor for dialects that carry none.
pub(crate) fn synthetic_hash(index: usize) -> String {
    format!("diff-{}", index)
}

/// A displayed name of the form `old → new` refers to the new file.
pub(crate) fn renamed_target(name: &str) -> &str {
    match name.split_once('→') {
        Some((_, target)) => target.trim(),
        None => name.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_empty_change_set() {
        let extraction = extract("  \n", None).unwrap();
        assert!(extraction.events.is_empty());
    }

    #[test]
    fn probing_picks_json() {
        let extraction = extract(r#"[{"path":"a.rs"}]"#, None).unwrap();
        assert_eq!(extraction.events[0].path, "a.rs");
    }

    #[test]
    fn probing_picks_unified_diff() {
        let input = "diff --git a/src/x.rs b/src/x.rs\n--- a/src/x.rs\n+++ b/src/x.rs\n@@ -1 +1 @@\n-old\n+new\n";
        let extraction = extract(input, None).unwrap();
        assert_eq!(extraction.events.len(), 1);
        assert_eq!(extraction.events[0].additions, Some(1));
    }

    #[test]
    fn probing_picks_numstat() {
        let extraction = extract("3\t1\tsrc/lib.rs\n", None).unwrap();
        assert_eq!(extraction.events[0].path, "src/lib.rs");
        assert_eq!(extraction.events[0].deletions, Some(1));
    }

    #[test]
    fn probing_picks_name_status() {
        let extraction = extract("A\tsrc/new.rs\nD\told.rs\n", None).unwrap();
        assert_eq!(extraction.events[0].change_type, Some(ChangeType::Added));
        assert_eq!(extraction.events[1].change_type, Some(ChangeType::Deleted));
    }

    #[test]
    fn unrecognised_input_is_an_error() {
        let result = extract("hello there\nthis is prose\n", None);
        assert!(matches!(result, Err(AppError::Extract(_))));
    }

    #[test]
    fn forced_format_skips_probing() {
        let result = extract("3\t1\tsrc/lib.rs\n", Some(InputFormat::Json));
        assert!(result.is_err());
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(InputSource::from_arg(Path::new("-")), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg(Path::new("changes.diff")).path(),
            Some(Path::new("changes.diff"))
        );
    }

    #[test]
    fn reads_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        std::fs::write(&path, "M\ta.rs\n").unwrap();
        let source = InputSource::File(path);
        assert_eq!(source.read().unwrap(), "M\ta.rs\n");
    }

    #[test]
    fn missing_file_is_invalid_path() {
        let source = InputSource::File(PathBuf::from("/nonexistent/changes.diff"));
        assert!(matches!(source.read(), Err(AppError::InvalidPath(_))));
    }

    #[test]
    fn renamed_target_takes_new_name() {
        assert_eq!(renamed_target("old.rs → new.rs"), "new.rs");
        assert_eq!(renamed_target(" plain.rs "), "plain.rs");
    }

    #[test]
    fn event_converts_to_full_update() {
        let update: FileUpdate = FileChangeEvent::new("a.rs", "diff-0", ChangeType::Renamed)
            .stats(1, 2)
            .into();
        assert_eq!(update.hash.as_deref(), Some("diff-0"));
        assert_eq!(update.change_type, Some(ChangeType::Renamed));
        assert_eq!(update.additions, Some(1));
        assert_eq!(update.is_commented, None);
    }

    #[test]
    fn partial_event_converts_to_partial_update() {
        let event = FileChangeEvent {
            path: "a.rs".into(),
            hash: None,
            change_type: None,
            additions: None,
            deletions: None,
            is_commented: Some(true),
        };
        let update: FileUpdate = event.into();
        assert_eq!(update, FileUpdate::new("a.rs").commented(true));
    }
}
