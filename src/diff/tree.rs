//! Folder tree projected from the flat file registry.
//!
//! The tree is rebuilt from the registry on every finalize. Within one
//! build folder ids are stable, so UI state such as `is_expanded` can be
//! changed in place through [`find_by_id_mut`] without a rebuild.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::path::{common_prefix, split_segments, strip_prefix};
use super::registry::FileRecord;
use super::sort::{sort_files, sort_folders, SortMode};
use crate::error::{AppError, Result};

/// Synthetic folder identity. Never reused by the builder that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FolderId(pub u64);

/// A file leaf inside a folder: a reference to a registry record by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub path: String,
    pub base: String,
    pub ext: String,
}

impl FileRef {
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            base: record.base.clone(),
            ext: record.ext.clone(),
        }
    }

    /// Final path segment, as shown in the tree.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A folder in the tree. After collapsing, `name` may span several path
/// segments (`src/app`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub id: FolderId,
    pub name: String,
    pub subfolders: Vec<FolderNode>,
    pub files: Vec<FileRef>,
    pub is_expanded: bool,
}

impl FolderNode {
    pub fn new(id: FolderId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            subfolders: Vec::new(),
            files: Vec::new(),
            is_expanded: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subfolders.is_empty() && self.files.is_empty()
    }

    /// This folder and every folder below it, depth-first.
    pub fn descendants(&self) -> Vec<&FolderNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(folder) = stack.pop() {
            out.push(folder);
            stack.extend(folder.subfolders.iter().rev());
        }
        out
    }

    /// Number of files anywhere below this folder.
    pub fn file_count(&self) -> usize {
        self.descendants().iter().map(|f| f.files.len()).sum()
    }
}

/// Builds folder trees from registry records and hands out folder ids.
///
/// One builder lives as long as the session, so ids from an earlier build
/// are never handed out again by a later one.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    next_id: u64,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn folder(&mut self, name: &str) -> FolderNode {
        let id = FolderId(self.next_id);
        self.next_id += 1;
        FolderNode::new(id, name)
    }

    /// An empty root, used when there is nothing to show.
    pub fn empty_root(&mut self) -> FolderNode {
        self.folder("")
    }

    /// Build the nested tree for `records`.
    ///
    /// The common directory prefix is stripped from every path and becomes
    /// the root's name. Folders are created on demand while inserting each
    /// file, so no folder ends up empty. Fails on an empty record set.
    pub fn build(&mut self, records: &[FileRecord]) -> Result<FolderNode> {
        if records.is_empty() {
            return Err(AppError::InvalidInput(
                "cannot build a tree without files".into(),
            ));
        }

        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        let prefix = common_prefix(&paths);
        let relative = strip_prefix(&paths, &prefix)?;

        let mut root = self.folder("");

        for (record, rel_path) in records.iter().zip(&relative) {
            let segments = split_segments(rel_path);
            let Some((_, folder_names)) = segments.split_last() else {
                continue;
            };

            let mut current = &mut root;
            for name in folder_names {
                let idx = match current.subfolders.iter().position(|f| f.name == *name) {
                    Some(idx) => idx,
                    None => {
                        let folder = self.folder(name);
                        current.subfolders.push(folder);
                        current.subfolders.len() - 1
                    }
                };
                current = &mut current.subfolders[idx];
            }
            current.files.push(FileRef::from_record(record));
        }

        root.name = prefix;
        Ok(root)
    }
}

/// Merge chains of folders holding exactly one subfolder and no files into
/// single nodes with compound names (`a` > `b` > `c` becomes `a/b/c`).
///
/// The root is treated like any other folder. Each folder is collapsed to a
/// fixpoint before its children are visited, using an explicit stack.
pub fn collapse_single_child_folders(root: &mut FolderNode) -> &mut FolderNode {
    let mut stack: Vec<&mut FolderNode> = vec![&mut *root];

    while let Some(folder) = stack.pop() {
        while folder.subfolders.len() == 1 && folder.files.is_empty() {
            let Some(child) = folder.subfolders.pop() else {
                break;
            };
            folder.name = if folder.name.is_empty() {
                child.name
            } else {
                format!("{}/{}", folder.name, child.name)
            };
            folder.subfolders = child.subfolders;
            folder.files = child.files;
        }
        stack.extend(folder.subfolders.iter_mut());
    }

    root
}

/// Find a folder by id, depth-first.
pub fn find_by_id(root: &FolderNode, id: FolderId) -> Option<&FolderNode> {
    let mut stack = vec![root];
    while let Some(folder) = stack.pop() {
        if folder.id == id {
            return Some(folder);
        }
        stack.extend(folder.subfolders.iter());
    }
    None
}

/// Find a mutable reference to a folder by id.
pub fn find_by_id_mut(node: &mut FolderNode, id: FolderId) -> Option<&mut FolderNode> {
    if node.id == id {
        return Some(node);
    }
    for child in node.subfolders.iter_mut() {
        if let Some(found) = find_by_id_mut(child, id) {
            return Some(found);
        }
    }
    None
}

/// What a flattened row points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Folder(FolderId),
    File { path: String },
}

/// A flattened representation of a tree row for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatItem {
    pub kind: ItemKind,
    pub name: String,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_last_sibling: bool,
}

impl FlatItem {
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder(_))
    }

    pub fn file_path(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::File { path } => Some(path),
            ItemKind::Folder(_) => None,
        }
    }

    pub fn folder_id(&self) -> Option<FolderId> {
        match self.kind {
            ItemKind::Folder(id) => Some(id),
            ItemKind::File { .. } => None,
        }
    }
}

/// Flatten the children of `root` into display rows, sorted by `mode`.
///
/// Subfolders come before files at every level. Children of collapsed
/// folders are skipped. The root itself is not a row; its name is the
/// common prefix and is shown as the panel title.
pub fn flatten(root: &FolderNode, mode: SortMode) -> Vec<FlatItem> {
    let mut items = Vec::new();
    flatten_children(root, 0, mode, &mut items);
    items
}

fn flatten_children(folder: &FolderNode, depth: usize, mode: SortMode, items: &mut Vec<FlatItem>) {
    let subfolders = sort_folders(&folder.subfolders, mode);
    let files = sort_files(&folder.files, mode);
    let total = subfolders.len() + files.len();

    for (i, sub) in subfolders.iter().enumerate() {
        items.push(folder_item(sub, depth, sub.is_expanded, i + 1 == total));
        if sub.is_expanded {
            flatten_children(sub, depth + 1, mode, items);
        }
    }

    for (j, file) in files.iter().enumerate() {
        items.push(file_item(file, depth, subfolders.len() + j + 1 == total));
    }
}

/// Flatten only files whose path fuzzy-matches `query`, plus the folders
/// leading to them. Matching folders are shown expanded regardless of
/// their stored state.
pub fn flatten_filtered(root: &FolderNode, mode: SortMode, query: &str) -> Vec<FlatItem> {
    let matcher = SkimMatcherV2::default().ignore_case();
    let mut items = Vec::new();
    flatten_children_filtered(root, 0, mode, &matcher, query, &mut items);
    items
}

/// Returns true if this subtree contains any matches.
fn flatten_children_filtered(
    folder: &FolderNode,
    depth: usize,
    mode: SortMode,
    matcher: &SkimMatcherV2,
    query: &str,
    items: &mut Vec<FlatItem>,
) -> bool {
    let mut groups: Vec<(FlatItem, Vec<FlatItem>)> = Vec::new();

    for sub in sort_folders(&folder.subfolders, mode) {
        let mut child_items = Vec::new();
        if flatten_children_filtered(sub, depth + 1, mode, matcher, query, &mut child_items) {
            groups.push((folder_item(sub, depth, true, false), child_items));
        }
    }

    for file in sort_files(&folder.files, mode) {
        if matcher.fuzzy_match(&file.path, query).is_some() {
            groups.push((file_item(file, depth, false), Vec::new()));
        }
    }

    if let Some((last, _)) = groups.last_mut() {
        last.is_last_sibling = true;
    }

    let matched = !groups.is_empty();
    for (item, children) in groups {
        items.push(item);
        items.extend(children);
    }
    matched
}

fn folder_item(folder: &FolderNode, depth: usize, is_expanded: bool, is_last: bool) -> FlatItem {
    FlatItem {
        kind: ItemKind::Folder(folder.id),
        name: folder.name.clone(),
        depth,
        is_expanded,
        is_last_sibling: is_last,
    }
}

fn file_item(file: &FileRef, depth: usize, is_last: bool) -> FlatItem {
    FlatItem {
        kind: ItemKind::File {
            path: file.path.clone(),
        },
        name: file.file_name().to_string(),
        depth,
        is_expanded: false,
        is_last_sibling: is_last,
    }
}
