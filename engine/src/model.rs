//! Core data model for traversal and transfer operations.
//!
//! This module defines the value types shared by every engine:
//! - Entry: a filesystem path whose kind is re-derived on each query
//! - EntrySet: insertion-ordered, path-deduplicated result set
//! - TraversalMode, TransferMode, ReplaceOptions: enums controlling behavior

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// The kind of filesystem object currently behind a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// A regular file
    File,
    /// A directory
    Directory,
    /// The path exists but is neither a regular file nor a directory
    /// (e.g., a broken symlink or a special file)
    Other,
    /// Nothing exists at the path
    Missing,
}

/// A filesystem entry identified by its path.
///
/// Equality and hashing compare paths only: two entries are equal when they
/// name the same path, regardless of what is on disk. The kind is queried
/// from the filesystem on every call and never cached, so an entry observes
/// concurrent external changes (e.g., a sibling operation deleting the file
/// mid-walk).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry {
    path: PathBuf,
}

impl Entry {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Entry { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Query the current kind of this entry from the filesystem.
    pub fn kind(&self) -> EntryKind {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => EntryKind::File,
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            Ok(_) => EntryKind::Other,
            // A broken symlink has no target metadata but still occupies the path.
            Err(_) => match fs::symlink_metadata(&self.path) {
                Ok(_) => EntryKind::Other,
                Err(_) => EntryKind::Missing,
            },
        }
    }

    pub fn exists(&self) -> bool {
        self.kind() != EntryKind::Missing
    }

    pub fn is_file(&self) -> bool {
        self.kind() == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind() == EntryKind::Directory
    }

    /// The final path component, lossily converted.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Size in bytes; 0 for directories and unreadable entries.
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path)
            .map(|meta| if meta.is_file() { meta.len() } else { 0 })
            .unwrap_or(0)
    }

    /// Last modification time, if the entry is readable.
    pub fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|meta| meta.modified()).ok()
    }

    pub fn parent(&self) -> Option<Entry> {
        self.path.parent().map(Entry::new)
    }

    /// The entry for `name` directly under this one.
    pub fn child(&self, name: &str) -> Entry {
        Entry::new(self.path.join(name))
    }

    /// List the immediate children of this directory.
    ///
    /// Children that fail to resolve while reading the directory are logged
    /// and skipped; the remaining children are still returned. Listing order
    /// is whatever the platform yields.
    pub fn children(&self) -> io::Result<Vec<Entry>> {
        let reader = fs::read_dir(&self.path)?;
        let mut children = Vec::new();
        for item in reader {
            match item {
                Ok(item) => children.push(Entry::new(item.path())),
                Err(err) => {
                    log::warn!("skipping unreadable child of {}: {}", self, err);
                }
            }
        }
        Ok(children)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<PathBuf> for Entry {
    fn from(path: PathBuf) -> Self {
        Entry::new(path)
    }
}

impl From<&Path> for Entry {
    fn from(path: &Path) -> Self {
        Entry::new(path.to_path_buf())
    }
}

/// Which kinds of entries a traversal collects.
///
/// The mode filters what is *added to the result set*, never which
/// directories are descended into: directories are always entered (subject
/// to depth and notifier veto) regardless of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalMode {
    /// Collect regular files only
    Files,
    /// Collect directories only
    Folders,
    /// Collect both
    All,
}

impl TraversalMode {
    /// Whether an entry of `kind` is a collection candidate under this mode.
    pub fn includes(self, kind: EntryKind) -> bool {
        match self {
            TraversalMode::Files => kind == EntryKind::File,
            TraversalMode::Folders => kind == EntryKind::Directory,
            TraversalMode::All => kind == EntryKind::File || kind == EntryKind::Directory,
        }
    }
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalMode::Files => write!(f, "files"),
            TraversalMode::Folders => write!(f, "folders"),
            TraversalMode::All => write!(f, "all"),
        }
    }
}

/// The operation mode for a batch transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferMode {
    /// Copy files; source remains unchanged
    Copy,
    /// Move files; source deleted after successful copy
    Move,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Copy => write!(f, "copy"),
            TransferMode::Move => write!(f, "move"),
        }
    }
}

/// Per-conflict decision for a destination file that already exists.
///
/// Both flags false means the conflicting file is skipped untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceOptions {
    /// Overwrite the existing destination
    pub enable_replace: bool,
    /// Append to the existing destination instead of overwriting
    pub enable_append: bool,
}

impl ReplaceOptions {
    pub fn replace() -> Self {
        ReplaceOptions { enable_replace: true, enable_append: false }
    }

    pub fn append() -> Self {
        ReplaceOptions { enable_replace: false, enable_append: true }
    }

    pub fn skip() -> Self {
        ReplaceOptions { enable_replace: false, enable_append: false }
    }

    /// Whether the conflicting file may be written at all.
    pub fn allows_transfer(self) -> bool {
        self.enable_replace || self.enable_append
    }
}

/// An insertion-ordered set of entries, deduplicated by path.
///
/// Every top-level operation builds a fresh set on its own call stack; sets
/// are never shared or persisted across calls. Insertion order is kept so a
/// stable sort applied afterwards preserves the relative order of entries
/// that compare equal.
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    entries: Vec<Entry>,
    paths: HashSet<PathBuf>,
}

impl EntrySet {
    pub fn new() -> Self {
        EntrySet::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.paths.contains(entry.path())
    }

    /// Add an entry; returns false if an entry with the same path was
    /// already present.
    pub fn insert(&mut self, entry: Entry) -> bool {
        if !self.paths.insert(entry.path().to_path_buf()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Entry> {
        self.entries
    }

    /// Stable in-place sort; entries that compare equal keep their relative
    /// insertion order.
    pub fn sort_with(&mut self, comparator: &crate::sort::EntryComparator) {
        self.entries.sort_by(|a, b| comparator.compare(a, b));
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for EntrySet {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
