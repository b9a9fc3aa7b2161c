//! Path helpers: normalization, segmentation and common-prefix extraction.
//!
//! All paths handled here are repository-relative and `/`-separated.
//! Prefixes are always segment-aligned: a prefix never ends in the middle
//! of a path segment.

use crate::error::{AppError, Result};

/// The pieces of a file path: containing directory, base name and extension.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParts {
    pub dir: String,
    pub base: String,
    pub ext: String,
}

/// Normalize a raw path from an extractor.
///
/// Backslashes become `/`, surrounding whitespace, empty segments and `.`
/// segments are dropped, so `./src//app\main.rs` becomes `src/app/main.rs`.
pub fn normalize_path(raw: &str) -> String {
    raw.trim()
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a path into its `/`-separated segments, skipping empty ones.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Split a path into directory, base name and extension.
///
/// The extension is whatever follows the last `.` of the final segment.
/// A final segment without a `.` (or whose only `.` is the leading one, as
/// in `.gitignore`) has an empty extension and keeps its whole name as base.
pub fn expand_path(path: &str) -> PathParts {
    let (dir, file) = match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    };

    let (base, ext) = match file.rfind('.') {
        Some(idx) if idx > 0 => (&file[..idx], &file[idx + 1..]),
        _ => (file, ""),
    };

    PathParts {
        dir: dir.to_string(),
        base: base.to_string(),
        ext: ext.to_string(),
    }
}

/// Longest directory path shared by every path in `paths`.
///
/// Only directory segments take part: the final segment of each path is the
/// file itself and never ends up in the prefix. A single path therefore
/// yields its containing directory, and an empty set yields `""`.
///
/// The shrinking prefix is carried across the whole set, so the result is
/// the same for any ordering of `paths`.
pub fn common_prefix<S: AsRef<str>>(paths: &[S]) -> String {
    let mut iter = paths.iter();
    let first = match iter.next() {
        Some(first) => first,
        None => return String::new(),
    };

    let mut prefix: Vec<&str> = directory_segments(first.as_ref());

    for path in iter {
        if prefix.is_empty() {
            break;
        }
        let segments = directory_segments(path.as_ref());
        let shared = prefix
            .iter()
            .zip(segments.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(shared);
    }

    prefix.join("/")
}

fn directory_segments(path: &str) -> Vec<&str> {
    let mut segments = split_segments(path);
    segments.pop();
    segments
}

/// Remove `prefix/` from the start of every path.
///
/// An empty prefix returns a plain copy. Every path must live under the
/// prefix; a path that does not is rejected instead of being silently
/// mangled.
pub fn strip_prefix<S: AsRef<str>>(paths: &[S], prefix: &str) -> Result<Vec<String>> {
    if prefix.is_empty() {
        return Ok(paths.iter().map(|p| p.as_ref().to_string()).collect());
    }

    let with_slash = format!("{}/", prefix);
    paths
        .iter()
        .map(|path| {
            path.as_ref()
                .strip_prefix(&with_slash)
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "path '{}' does not start with prefix '{}'",
                        path.as_ref(),
                        prefix
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(normalize_path("./src//app\\main.rs "), "src/app/main.rs");
        assert_eq!(normalize_path("/abs/path.txt"), "abs/path.txt");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn expand_path_splits_on_last_dot() {
        let parts = expand_path("src/app/main.test.ts");
        assert_eq!(parts.dir, "src/app");
        assert_eq!(parts.base, "main.test");
        assert_eq!(parts.ext, "ts");
    }

    #[test]
    fn expand_path_without_extension() {
        let parts = expand_path("Makefile");
        assert_eq!(parts.dir, "");
        assert_eq!(parts.base, "Makefile");
        assert_eq!(parts.ext, "");
    }

    #[test]
    fn expand_path_dotfile_has_no_extension() {
        let parts = expand_path("config/.gitignore");
        assert_eq!(parts.dir, "config");
        assert_eq!(parts.base, ".gitignore");
        assert_eq!(parts.ext, "");
    }

    #[test]
    fn common_prefix_empty_set() {
        let paths: Vec<String> = Vec::new();
        assert_eq!(common_prefix(&paths), "");
    }

    #[test]
    fn common_prefix_single_path_is_its_directory() {
        assert_eq!(common_prefix(&["a/b/c/x.ts"]), "a/b/c");
        assert_eq!(common_prefix(&["x.ts"]), "");
    }

    #[test]
    fn common_prefix_shared_directory() {
        assert_eq!(common_prefix(&["a/b/x.ts", "a/b/y.ts"]), "a/b");
    }

    #[test]
    fn common_prefix_disjoint_roots() {
        assert_eq!(common_prefix(&["a/x.ts", "b/y.ts"]), "");
    }

    #[test]
    fn common_prefix_never_splits_segments() {
        assert_eq!(common_prefix(&["src/app/x.ts", "src/application/y.ts"]), "src");
    }

    #[test]
    fn common_prefix_uses_running_prefix_not_first_path() {
        // The first path is deepest; a later path with a shorter match must
        // still shrink the prefix for every path after it.
        let paths = ["a/b/c/d/x.ts", "a/b/y.ts", "a/b/c/z.ts"];
        assert_eq!(common_prefix(&paths), "a/b");

        let reordered = ["a/b/c/z.ts", "a/b/c/d/x.ts", "a/b/y.ts"];
        assert_eq!(common_prefix(&reordered), "a/b");
    }

    #[test]
    fn common_prefix_excludes_file_segment() {
        // A file path that equals another path's directory is still a file.
        assert_eq!(common_prefix(&["a/x.ts", "a/x.ts/inner.ts"]), "a");
    }

    #[test]
    fn strip_prefix_removes_prefix_and_slash() {
        let stripped = strip_prefix(&["a/b/x.ts", "a/b/y.ts"], "a/b").unwrap();
        assert_eq!(stripped, vec!["x.ts", "y.ts"]);
    }

    #[test]
    fn strip_prefix_empty_prefix_copies() {
        let stripped = strip_prefix(&["a/x.ts", "b/y.ts"], "").unwrap();
        assert_eq!(stripped, vec!["a/x.ts", "b/y.ts"]);
    }

    #[test]
    fn strip_prefix_rejects_foreign_path() {
        let result = strip_prefix(&["a/b/x.ts", "c/y.ts"], "a/b");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-c]{1,2}", 1..5).prop_map(|segments| segments.join("/"))
    }

    proptest! {
        #[test]
        fn prefix_is_shared_by_every_path(paths in prop::collection::vec(path_strategy(), 1..8)) {
            let prefix = common_prefix(&paths);
            let under = format!("{}/", prefix);
            for path in &paths {
                if !prefix.is_empty() {
                    prop_assert!(path.starts_with(&under), "{} is not under {}", path, prefix);
                }
            }
        }

        #[test]
        fn prefix_is_order_invariant(paths in prop::collection::vec(path_strategy(), 1..8)) {
            let forward = common_prefix(&paths);
            let mut reversed = paths.clone();
            reversed.reverse();
            prop_assert_eq!(&forward, &common_prefix(&reversed));

            let mut sorted = paths.clone();
            sorted.sort();
            prop_assert_eq!(&forward, &common_prefix(&sorted));
        }

        #[test]
        fn strip_then_rejoin_round_trips(paths in prop::collection::vec(path_strategy(), 1..8)) {
            let prefix = common_prefix(&paths);
            let stripped = strip_prefix(&paths, &prefix).unwrap();
            let rejoined: Vec<String> = stripped
                .iter()
                .map(|p| if prefix.is_empty() { p.clone() } else { format!("{}/{}", prefix, p) })
                .collect();
            prop_assert_eq!(rejoined, paths);
        }
    }
}
