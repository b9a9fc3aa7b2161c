use std::collections::HashSet;

use serde::Deserialize;

use super::{renamed_target, synthetic_hash, Extraction, FileChangeEvent, MetadataExtractor};
use crate::diff::path::normalize_path;
use crate::diff::registry::ChangeType;
use crate::error::{AppError, Result};

/// A JSON array of file objects, or one object per line.
///
/// Entries may repeat a path to add fields to an earlier entry. Fields an
/// entry leaves out are left out of its event too.
///
/// ```json
/// [{"path": "src/lib.rs", "hash": "#diff-0", "changeType": "added", "additions": 3}]
/// ```
pub struct JsonExtractor;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonFile {
    path: String,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    change_type: Option<ChangeType>,
    #[serde(default, alias = "isCommented")]
    commented: Option<bool>,
    #[serde(default)]
    additions: Option<u64>,
    #[serde(default)]
    deletions: Option<u64>,
}

impl MetadataExtractor for JsonExtractor {
    fn name(&self) -> &'static str {
        "json"
    }

    fn probe(&self, input: &str) -> bool {
        let trimmed = input.trim_start();
        trimmed.starts_with('[') || trimmed.starts_with('{')
    }

    fn extract(&self, input: &str) -> Result<Extraction> {
        let trimmed = input.trim();
        let files: Vec<JsonFile> = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed)?
        } else {
            trimmed
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str::<JsonFile>)
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        if files.iter().any(|f| f.path.trim().is_empty()) {
            return Err(AppError::Extract("JSON file entry with an empty path".into()));
        }

        let mut extraction = Extraction::default();
        let mut seen = HashSet::new();
        for (index, file) in files.into_iter().enumerate() {
            let path = if file.change_type == Some(ChangeType::Renamed) {
                renamed_target(&file.path).to_string()
            } else {
                file.path
            };
            // Only a path's first entry gets a positional anchor.
            let first = seen.insert(normalize_path(&path));
            let hash = file
                .hash
                .or_else(|| first.then(|| synthetic_hash(index)));
            extraction.events.push(FileChangeEvent {
                path,
                hash,
                change_type: file.change_type,
                additions: file.additions,
                deletions: file.deletions,
                is_commented: file.commented,
            });
        }
        Ok(extraction)
    }
}
