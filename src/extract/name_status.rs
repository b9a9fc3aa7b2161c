use super::{synthetic_hash, Extraction, FileChangeEvent, MetadataExtractor};
use crate::diff::registry::ChangeType;
use crate::error::{AppError, Result};

/// `git diff --name-status` output: a status letter, then one path (two
/// for renames and copies), tab separated.
pub struct NameStatusExtractor;

fn status_change_type(status: &str) -> Option<ChangeType> {
    let mut chars = status.chars();
    let letter = chars.next()?;
    // Renames and copies carry a similarity score, e.g. R087.
    if !chars.all(|c| c.is_ascii_digit()) {
        return None;
    }
    match letter {
        'A' | 'C' => Some(ChangeType::Added),
        'M' | 'T' | 'U' | 'X' => Some(ChangeType::Updated),
        'D' => Some(ChangeType::Deleted),
        'R' => Some(ChangeType::Renamed),
        _ => None,
    }
}

fn split_line(line: &str) -> Option<(ChangeType, &str)> {
    let mut fields = line.split('\t');
    let change_type = status_change_type(fields.next()?.trim())?;
    // The last path is the one that exists after the change.
    let path = fields.last()?.trim();
    if path.is_empty() {
        return None;
    }
    Some((change_type, path))
}

impl MetadataExtractor for NameStatusExtractor {
    fn name(&self) -> &'static str {
        "name-status"
    }

    fn probe(&self, input: &str) -> bool {
        input
            .lines()
            .find(|line| !line.trim().is_empty())
            .is_some_and(|line| split_line(line).is_some())
    }

    fn extract(&self, input: &str) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        for (number, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (change_type, path) = split_line(line).ok_or_else(|| {
                AppError::Extract(format!("line {}: not a name-status record", number + 1))
            })?;
            let hash = synthetic_hash(extraction.events.len());
            extraction
                .events
                .push(FileChangeEvent::new(path, hash, change_type));
        }
        Ok(extraction)
    }
}
