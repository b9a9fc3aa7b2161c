use super::{synthetic_hash, Extraction, FileChangeEvent, MetadataExtractor};
use crate::diff::path::normalize_path;
use crate::diff::registry::ChangeType;
use crate::error::{AppError, Result};

/// `git diff --numstat` output: `ADDED<TAB>DELETED<TAB>PATH`.
///
/// Binary files report `-` for both counts and are recorded as zero.
pub struct NumstatExtractor;

fn parse_count(field: &str) -> Option<u64> {
    if field == "-" {
        Some(0)
    } else {
        field.parse().ok()
    }
}

fn split_line(line: &str) -> Option<(u64, u64, &str)> {
    let mut fields = line.splitn(3, '\t');
    let additions = parse_count(fields.next()?)?;
    let deletions = parse_count(fields.next()?)?;
    let path = fields.next()?.trim();
    if path.is_empty() {
        return None;
    }
    Some((additions, deletions, path))
}

/// Resolve git's rename notation to the new path.
///
/// Handles both `old => new` and `prefix/{old => new}/suffix`.
fn rename_target(path: &str) -> Option<String> {
    if let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) {
        if open < close {
            let inner = &path[open + 1..close];
            let (_, new) = inner.split_once(" => ")?;
            let joined = format!("{}{}{}", &path[..open], new.trim(), &path[close + 1..]);
            return Some(normalize_path(&joined));
        }
    }
    let (_, new) = path.split_once(" => ")?;
    Some(new.trim().to_string())
}

impl MetadataExtractor for NumstatExtractor {
    fn name(&self) -> &'static str {
        "numstat"
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
            let (additions, deletions, raw_path) = split_line(line).ok_or_else(|| {
                AppError::Extract(format!("line {}: not a numstat record", number + 1))
            })?;

            let (path, change_type) = match rename_target(raw_path) {
                Some(new) => (new, ChangeType::Renamed),
                None => (raw_path.to_string(), ChangeType::Updated),
            };
            let hash = synthetic_hash(extraction.events.len());
            extraction
                .events
                .push(FileChangeEvent::new(path, hash, change_type).stats(additions, deletions));
        }
        Ok(extraction)
    }
}
