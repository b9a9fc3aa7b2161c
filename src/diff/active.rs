//! Tracking of the single active (highlighted) file.

use super::registry::FileRecord;

/// Pick the hash to activate for `requested`.
///
/// A request matching a record's hash (leading `#` ignored) is honoured;
/// anything else falls back to the first record. `None` only for an empty
/// record set.
pub fn resolve_active<'a>(records: &'a [FileRecord], requested: &str) -> Option<&'a str> {
    let wanted = requested.trim_start_matches('#');
    records
        .iter()
        .find(|r| !wanted.is_empty() && r.hash.trim_start_matches('#') == wanted)
        .or_else(|| records.first())
        .map(|r| r.hash.as_str())
}

/// Holds the active hash. Switching is two-phase: the previous hash is
/// deactivated before the next one is activated.
#[derive(Debug, Default)]
pub struct ActiveFileTracker {
    active: Option<String>,
}

impl ActiveFileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Clear the active hash, returning what was active.
    pub fn deactivate(&mut self) -> Option<String> {
        self.active.take()
    }

    pub fn activate(&mut self, hash: impl Into<String>) {
        self.active = Some(hash.into());
    }

    pub fn is_active(&self, hash: &str) -> bool {
        self.active
            .as_deref()
            .is_some_and(|active| active.trim_start_matches('#') == hash.trim_start_matches('#'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, hash: &str) -> FileRecord {
        FileRecord {
            hash: hash.to_string(),
            ..FileRecord::new(path)
        }
    }

    #[test]
    fn resolve_honours_known_hash() {
        let records = vec![record("a.rs", "#diff-0"), record("b.rs", "#diff-1")];
        assert_eq!(resolve_active(&records, "#diff-1"), Some("#diff-1"));
    }

    #[test]
    fn resolve_ignores_hash_sign_mismatch() {
        let records = vec![record("a.rs", "diff-0"), record("b.rs", "diff-1")];
        assert_eq!(resolve_active(&records, "#diff-1"), Some("diff-1"));
    }

    #[test]
    fn resolve_falls_back_to_first_record() {
        let records = vec![record("a.rs", "#diff-0"), record("b.rs", "#diff-1")];
        assert_eq!(resolve_active(&records, "#missing"), Some("#diff-0"));
        assert_eq!(resolve_active(&records, ""), Some("#diff-0"));
    }

    #[test]
    fn resolve_on_empty_records_is_none() {
        assert_eq!(resolve_active(&[], "#diff-0"), None);
    }

    #[test]
    fn resolve_does_not_match_empty_hashes() {
        let records = vec![record("a.rs", "diff-0"), record("b.rs", "")];
        assert_eq!(resolve_active(&records, "#"), Some("diff-0"));
    }

    #[test]
    fn tracker_switches_in_two_phases() {
        let mut tracker = ActiveFileTracker::new();
        assert_eq!(tracker.active(), None);

        tracker.activate("diff-0");
        assert!(tracker.is_active("#diff-0"));

        let previous = tracker.deactivate();
        assert_eq!(previous.as_deref(), Some("diff-0"));
        assert_eq!(tracker.active(), None);

        tracker.activate("diff-1");
        assert_eq!(tracker.active(), Some("diff-1"));
        assert!(!tracker.is_active("diff-0"));
    }
}
