//! Read-only access to the content tree.
//!
//! Every scanner goes through the [`DirSource`] trait instead of calling
//! `std::fs` directly. Production runs use [`FsSource`]; unit tests build a
//! [`MemoryTree`] so discovery and merging can be exercised without touching
//! the disk.
//!
//! Missing directories are not errors: listing a path that does not exist
//! yields no entries, which the scanners treat as an empty collection. A
//! child that cannot be resolved (a dangling symlink, a link loop) is skipped
//! with a warning; only a failure to read the listed directory itself is an
//! error.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Whether a listed entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    File,
    Dir,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Directory listing abstraction used by all scanners.
///
/// Implementations must be `Sync`: entity directories are discovered in
/// parallel.
pub trait DirSource: Sync {
    /// Immediate children of `dir`, sorted by name. A missing `dir` yields
    /// an empty list.
    fn entries(&self, dir: &Path) -> io::Result<Vec<Entry>>;

    /// True if `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Contents of the file at `path`, or `None` if it does not exist.
    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>>;
}

/// [`DirSource`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DirSource for FsSource {
    fn entries(&self, dir: &Path) -> io::Result<Vec<Entry>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 && e.path().is_some() => {
                    warn!(error = %e, "skipping unresolvable directory entry");
                    continue;
                }
                Err(e) => return Err(io::Error::from(e)),
            };
            let kind = if entry.file_type().is_dir() {
                EntryKind::Dir
            } else if entry.file_type().is_file() {
                EntryKind::File
            } else {
                continue;
            };
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().to_string(),
                kind,
            });
        }
        Ok(entries)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// In-memory content tree.
///
/// Directories are implied by the files beneath them; empty directories can be
/// added explicitly with [`MemoryTree::dir`].
///
/// ```
/// use gallery_manifest::source::{DirSource, MemoryTree};
/// use std::path::Path;
///
/// let tree = MemoryTree::new()
///     .file("images/Toya/lake/a.jpg", "")
///     .file("images/Toya/lake/info.json", r#"{"order": 1}"#);
///
/// let names: Vec<_> = tree
///     .entries(Path::new("images/Toya/lake"))
///     .unwrap()
///     .into_iter()
///     .map(|e| e.name)
///     .collect();
/// assert_eq!(names, ["a.jpg", "info.json"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given contents.
    pub fn file(mut self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), contents.to_string());
        self
    }

    /// Add several empty files under one directory.
    pub fn files(mut self, dir: impl AsRef<Path>, names: &[&str]) -> Self {
        for name in names {
            self.files.insert(dir.as_ref().join(name), String::new());
        }
        self
    }

    /// Add an (initially empty) directory.
    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        self.dirs.insert(path.as_ref().to_path_buf());
        self
    }

    fn children(&self, dir: &Path) -> BTreeMap<String, EntryKind> {
        let mut children = BTreeMap::new();
        let all_paths = self
            .files
            .keys()
            .map(|p| (p, EntryKind::File))
            .chain(self.dirs.iter().map(|p| (p, EntryKind::Dir)));

        for (path, leaf_kind) in all_paths {
            let Ok(rest) = path.strip_prefix(dir) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            let kind = if components.next().is_some() {
                EntryKind::Dir
            } else {
                leaf_kind
            };
            let name = first.as_os_str().to_string_lossy().to_string();
            children
                .entry(name)
                .and_modify(|k| {
                    if kind == EntryKind::Dir {
                        *k = EntryKind::Dir;
                    }
                })
                .or_insert(kind);
        }
        children
    }
}

impl DirSource for MemoryTree {
    fn entries(&self, dir: &Path) -> io::Result<Vec<Entry>> {
        Ok(self
            .children(dir)
            .into_iter()
            .map(|(name, kind)| Entry { name, kind })
            .collect())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }
}
