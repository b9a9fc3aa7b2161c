use std::iter::Peekable;
use std::str::Lines;

use super::{synthetic_hash, Extraction, FileChangeEvent, MetadataExtractor};
use crate::diff::registry::ChangeType;
use crate::error::Result;

const DEV_NULL: &str = "/dev/null";

/// `git diff` / `diff -u` output. Line counts come from the hunk bodies.
pub struct UnifiedDiffExtractor;

/// The file section currently being read.
#[derive(Debug, Default)]
struct Section {
    old_path: Option<String>,
    new_path: Option<String>,
    change_type: ChangeType,
    additions: u64,
    deletions: u64,
    in_hunk: bool,
}

impl Section {
    /// Parse the `a/old b/new` tail of a `diff --git` line.
    fn from_git_header(rest: &str) -> Self {
        let (old, new) = match rest.rfind(" b/") {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, rest),
        };
        Self {
            old_path: Some(strip_side(old, "a/")),
            new_path: Some(strip_side(new, "b/")),
            ..Self::default()
        }
    }

    fn into_event(self, index: usize) -> Option<FileChangeEvent> {
        let path = match self.change_type {
            ChangeType::Deleted => self.old_path.or(self.new_path),
            _ => self.new_path.or(self.old_path),
        }?;
        if path.is_empty() {
            return None;
        }
        Some(
            FileChangeEvent::new(path, synthetic_hash(index), self.change_type)
                .stats(self.additions, self.deletions),
        )
    }
}

/// Drop the `a/`/`b/` side prefix, quotes and any trailing timestamp.
fn strip_side(raw: &str, side: &str) -> String {
    let raw = raw.split('\t').next().unwrap_or(raw).trim();
    let raw = raw.trim_matches('"');
    raw.strip_prefix(side).unwrap_or(raw).to_string()
}

struct Parser<'a> {
    lines: Peekable<Lines<'a>>,
    current: Option<Section>,
    events: Vec<FileChangeEvent>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().peekable(),
            current: None,
            events: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if let Some(section) = self.current.take() {
            if let Some(event) = section.into_event(self.events.len()) {
                self.events.push(event);
            }
        }
    }

    fn starts_plain_header(&mut self, line: &str) -> bool {
        line.starts_with("--- ")
            && self
                .lines
                .peek()
                .is_some_and(|next| next.starts_with("+++ "))
    }

    fn run(mut self) -> Vec<FileChangeEvent> {
        while let Some(line) = self.lines.next() {
            if let Some(rest) = line.strip_prefix("diff --git ") {
                self.flush();
                self.current = Some(Section::from_git_header(rest));
                continue;
            }

            let in_hunk = self.current.as_ref().is_some_and(|s| s.in_hunk);
            if in_hunk && !self.starts_plain_header(line) {
                if let Some(section) = self.current.as_mut() {
                    if line.starts_with('+') {
                        section.additions += 1;
                    } else if line.starts_with('-') {
                        section.deletions += 1;
                    }
                }
                continue;
            }

            if let Some(old) = line.strip_prefix("--- ") {
                // A `---` outside a git section starts a plain unified diff.
                if self.current.as_ref().map_or(true, |s| s.in_hunk) {
                    self.flush();
                    self.current = Some(Section::default());
                }
                if let Some(section) = self.current.as_mut() {
                    let old = strip_side(old, "a/");
                    if old == DEV_NULL {
                        section.change_type = ChangeType::Added;
                    } else if section.old_path.is_none() {
                        section.old_path = Some(old);
                    }
                }
                continue;
            }

            let Some(section) = self.current.as_mut() else {
                continue;
            };

            if let Some(new) = line.strip_prefix("+++ ") {
                let new = strip_side(new, "b/");
                if new == DEV_NULL {
                    section.change_type = ChangeType::Deleted;
                } else if section.change_type != ChangeType::Renamed {
                    section.new_path = Some(new);
                }
            } else if line.starts_with("new file mode") {
                section.change_type = ChangeType::Added;
            } else if line.starts_with("deleted file mode") {
                section.change_type = ChangeType::Deleted;
            } else if let Some(from) = line.strip_prefix("rename from ") {
                section.old_path = Some(from.trim().to_string());
                section.change_type = ChangeType::Renamed;
            } else if let Some(to) = line.strip_prefix("rename to ") {
                section.new_path = Some(to.trim().to_string());
                section.change_type = ChangeType::Renamed;
            } else if line.starts_with("@@") {
                section.in_hunk = true;
            }
        }
        self.flush();
        self.events
    }
}

impl MetadataExtractor for UnifiedDiffExtractor {
    fn name(&self) -> &'static str {
        "unified-diff"
    }

    fn probe(&self, input: &str) -> bool {
        let mut lines = input.lines().peekable();
        while let Some(line) = lines.next() {
            if line.starts_with("diff --git ") {
                return true;
            }
            if line.starts_with("--- ") && lines.peek().is_some_and(|n| n.starts_with("+++ ")) {
                return true;
            }
        }
        false
    }

    fn extract(&self, input: &str) -> Result<Extraction> {
        Ok(Extraction {
            events: Parser::new(input).run(),
            ..Extraction::default()
        })
    }
}
