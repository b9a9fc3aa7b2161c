//! Ordering of folder and file children, computed on every read.
//!
//! The tree itself keeps children in insertion order; these functions hand
//! back sorted views and never reorder the stored nodes.

use std::cmp::Ordering;
use std::str::FromStr;

use super::tree::{FileRef, FolderNode};
use crate::error::AppError;

/// Sort criteria for files (folders only ever sort by name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    NameAsc,
    NameDesc,
    #[default]
    ExtAsc,
    ExtDesc,
}

/// Accepts `name_asc`, `name_desc`, `ext_asc`, `ext_desc` and the legacy
/// numeric settings `0`..`3`.
impl FromStr for SortMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name_asc" | "name" | "0" => Ok(SortMode::NameAsc),
            "name_desc" | "1" => Ok(SortMode::NameDesc),
            "ext_asc" | "ext" | "2" => Ok(SortMode::ExtAsc),
            "ext_desc" | "3" => Ok(SortMode::ExtDesc),
            other => Err(AppError::InvalidInput(format!("unknown sort mode: {}", other))),
        }
    }
}

impl SortMode {
    /// Config key for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::NameAsc => "name_asc",
            SortMode::NameDesc => "name_desc",
            SortMode::ExtAsc => "ext_asc",
            SortMode::ExtDesc => "ext_desc",
        }
    }

    /// Get the display label for the current sort.
    pub fn label(&self) -> &'static str {
        match self {
            SortMode::NameAsc => "Name A~>Z",
            SortMode::NameDesc => "Name Z~>A",
            SortMode::ExtAsc => "Extension A~>Z",
            SortMode::ExtDesc => "Extension Z~>A",
        }
    }

    /// Cycle to the next sort option.
    pub fn next(&self) -> Self {
        match self {
            SortMode::NameAsc => SortMode::NameDesc,
            SortMode::NameDesc => SortMode::ExtAsc,
            SortMode::ExtAsc => SortMode::ExtDesc,
            SortMode::ExtDesc => SortMode::NameAsc,
        }
    }

    fn is_descending(&self) -> bool {
        matches!(self, SortMode::NameDesc | SortMode::ExtDesc)
    }
}

/// Case-insensitive comparison with a byte-wise tie-break, so distinct
/// strings never compare equal.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Folders in display order. Extension modes behave like their name
/// counterparts: folders carry no extension.
pub fn sort_folders(folders: &[FolderNode], mode: SortMode) -> Vec<&FolderNode> {
    let mut sorted: Vec<&FolderNode> = folders.iter().collect();
    sorted.sort_by(|a, b| {
        let primary = compare_text(&a.name, &b.name);
        let primary = if mode.is_descending() {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
    sorted
}

/// Files in display order.
///
/// The primary key follows `mode`; descending modes reverse only the
/// primary key. The secondary key (the other of name/extension) and the
/// final path tie-break always run ascending.
pub fn sort_files(files: &[FileRef], mode: SortMode) -> Vec<&FileRef> {
    let mut sorted: Vec<&FileRef> = files.iter().collect();
    sorted.sort_by(|a, b| compare_files(a, b, mode));
    sorted
}

fn compare_files(a: &FileRef, b: &FileRef, mode: SortMode) -> Ordering {
    let by_name = || compare_text(&a.base, &b.base);
    let by_ext = || compare_text(&a.ext, &b.ext);

    let (primary, secondary) = match mode {
        SortMode::NameAsc | SortMode::NameDesc => (by_name(), by_ext()),
        SortMode::ExtAsc | SortMode::ExtDesc => (by_ext(), by_name()),
    };
    let primary = if mode.is_descending() {
        primary.reverse()
    } else {
        primary
    };

    primary
        .then(secondary)
        .then_with(|| a.path.cmp(&b.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::tree::FolderId;

    fn file(base: &str, ext: &str) -> FileRef {
        let path = if ext.is_empty() {
            base.to_string()
        } else {
            format!("{}.{}", base, ext)
        };
        FileRef {
            path,
            base: base.to_string(),
            ext: ext.to_string(),
        }
    }

    fn keys(files: &[&FileRef]) -> Vec<String> {
        files.iter().map(|f| f.path.clone()).collect()
    }

    #[test]
    fn parses_modes_and_legacy_numbers() {
        assert_eq!("name_asc".parse::<SortMode>().unwrap(), SortMode::NameAsc);
        assert_eq!("NAME_DESC".parse::<SortMode>().unwrap(), SortMode::NameDesc);
        assert_eq!("3".parse::<SortMode>().unwrap(), SortMode::ExtDesc);
        assert!(matches!(
            "bogus".parse::<SortMode>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn next_cycles_through_all_modes() {
        let mut mode = SortMode::NameAsc;
        let mut seen = vec![mode];
        for _ in 0..3 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(mode.next(), SortMode::NameAsc);
        assert_eq!(
            seen,
            vec![
                SortMode::NameAsc,
                SortMode::NameDesc,
                SortMode::ExtAsc,
                SortMode::ExtDesc
            ]
        );
    }

    #[test]
    fn ext_asc_orders_by_extension_then_name() {
        let files = vec![file("b", "ts"), file("a", "ts"), file("a", "js")];
        let sorted = sort_files(&files, SortMode::ExtAsc);
        assert_eq!(keys(&sorted), vec!["a.js", "a.ts", "b.ts"]);
    }

    #[test]
    fn name_asc_orders_by_name_then_extension() {
        let files = vec![file("b", "ts"), file("a", "ts"), file("a", "js")];
        let sorted = sort_files(&files, SortMode::NameAsc);
        assert_eq!(keys(&sorted), vec!["a.js", "a.ts", "b.ts"]);
    }

    #[test]
    fn name_desc_keeps_secondary_ascending() {
        let files = vec![file("b", "ts"), file("a", "ts"), file("a", "js")];
        let asc = sort_files(&files, SortMode::NameAsc);
        let desc = sort_files(&files, SortMode::NameDesc);

        // Only the primary key flips, so equal names stay js-before-ts and
        // the descending order is not the mirror image of the ascending one.
        assert_eq!(keys(&desc), vec!["b.ts", "a.js", "a.ts"]);
        let mut mirrored = keys(&asc);
        mirrored.reverse();
        assert_ne!(keys(&desc), mirrored);
    }

    #[test]
    fn name_desc_is_mirror_when_primary_keys_are_distinct() {
        let files = vec![file("c", "rs"), file("a", "ts"), file("b", "js")];
        let mut asc = keys(&sort_files(&files, SortMode::NameAsc));
        asc.reverse();
        assert_eq!(keys(&sort_files(&files, SortMode::NameDesc)), asc);
    }

    #[test]
    fn ext_desc_keeps_secondary_ascending() {
        let files = vec![file("b", "ts"), file("a", "ts"), file("a", "js")];
        let sorted = sort_files(&files, SortMode::ExtDesc);
        assert_eq!(keys(&sorted), vec!["a.ts", "b.ts", "a.js"]);
    }

    #[test]
    fn sorting_is_case_insensitive() {
        let files = vec![file("Zeta", "rs"), file("alpha", "rs"), file("Beta", "rs")];
        let sorted = sort_files(&files, SortMode::NameAsc);
        assert_eq!(keys(&sorted), vec!["alpha.rs", "Beta.rs", "Zeta.rs"]);
    }

    #[test]
    fn sorting_is_deterministic() {
        let files = vec![
            file("b", "ts"),
            file("B", "ts"),
            file("a", ""),
            file("a", "js"),
            file("c", "ts"),
        ];
        for mode in [
            SortMode::NameAsc,
            SortMode::NameDesc,
            SortMode::ExtAsc,
            SortMode::ExtDesc,
        ] {
            let first = keys(&sort_files(&files, mode));
            let mut shuffled = files.clone();
            shuffled.reverse();
            let second = keys(&sort_files(&shuffled, mode));
            assert_eq!(first, second, "mode {:?}", mode);
        }
    }

    #[test]
    fn sort_does_not_touch_stored_order() {
        let files = vec![file("b", "ts"), file("a", "ts")];
        let _ = sort_files(&files, SortMode::NameAsc);
        assert_eq!(files[0].base, "b");
    }

    #[test]
    fn folders_ignore_extension_modes() {
        let folders = vec![
            FolderNode::new(FolderId(1), "src"),
            FolderNode::new(FolderId(2), "docs"),
            FolderNode::new(FolderId(3), "Tests"),
        ];
        let names = |mode| -> Vec<String> {
            sort_folders(&folders, mode)
                .iter()
                .map(|f| f.name.clone())
                .collect()
        };
        assert_eq!(names(SortMode::NameAsc), vec!["docs", "src", "Tests"]);
        assert_eq!(names(SortMode::ExtAsc), names(SortMode::NameAsc));
        assert_eq!(names(SortMode::NameDesc), vec!["Tests", "src", "docs"]);
        assert_eq!(names(SortMode::ExtDesc), names(SortMode::NameDesc));
    }
}
