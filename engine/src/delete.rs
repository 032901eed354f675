//! Recursive delete engine.
//!
//! Deletes a tree depth-first: files are deleted as they are visited,
//! directories only become delete candidates after their entire subtree
//! has been processed, and only when `delete_empty_dirs` is set and the
//! directory is empty at that point. Every deletion is subject to per-entry
//! confirmation, and the continuation callback can abort the whole
//! operation between steps.

use std::fs;

use crate::model::{Entry, EntryKind, EntrySet};
use crate::notify::{DeleteNotifier, PERMISSIVE};
use crate::sort::EntryComparator;
use crate::walk::WalkControl;

/// Delete the tree under `source`.
///
/// # Arguments
/// * `source` - File or directory; nonexistence is reported and yields an
///   empty result
/// * `delete_empty_dirs` - Also remove directories once their subtree is
///   gone; when false only files are deleted
/// * `comparator` - Orders each directory listing before recursing
/// * `depth` - Same semantics as `walk`: levels at or beyond the bound are
///   never touched
///
/// Returns the set of entries actually deleted.
pub fn delete_all(
    source: &Entry,
    delete_empty_dirs: bool,
    comparator: Option<&EntryComparator>,
    depth: Option<u32>,
    notifier: Option<&dyn DeleteNotifier>,
) -> EntrySet {
    let notifier = notifier.unwrap_or(&PERMISSIVE);
    let mut deleted = EntrySet::new();
    delete_entry(source, delete_empty_dirs, comparator, depth, 0, notifier, &mut deleted);
    if let Some(comparator) = comparator {
        deleted.sort_with(comparator);
    }
    deleted
}

/// Delete several roots, unioning the per-root results. An interruption in
/// one root aborts the remaining roots as well.
pub fn delete_all_roots(
    roots: &[Entry],
    delete_empty_dirs: bool,
    comparator: Option<&EntryComparator>,
    depth: Option<u32>,
    notifier: Option<&dyn DeleteNotifier>,
) -> EntrySet {
    let notifier = notifier.unwrap_or(&PERMISSIVE);
    let mut deleted = EntrySet::new();
    for root in roots {
        if delete_entry(root, delete_empty_dirs, comparator, depth, 0, notifier, &mut deleted)
            == WalkControl::Abort
        {
            break;
        }
    }
    if let Some(comparator) = comparator {
        deleted.sort_with(comparator);
    }
    deleted
}

fn delete_entry(
    entry: &Entry,
    delete_empty_dirs: bool,
    comparator: Option<&EntryComparator>,
    depth: Option<u32>,
    level: u32,
    notifier: &dyn DeleteNotifier,
    deleted: &mut EntrySet,
) -> WalkControl {
    if let Some(limit) = depth {
        if level >= limit {
            return WalkControl::Continue;
        }
    }

    let kind = entry.kind();
    match kind {
        EntryKind::Missing => {
            log::warn!("delete: {} does not exist", entry);
            return WalkControl::Continue;
        }
        EntryKind::Other => {
            log::warn!("delete: {} is neither a file nor a directory", entry);
            return WalkControl::Continue;
        }
        EntryKind::File | EntryKind::Directory => {}
    }

    if !notifier.should_proceed(entry, deleted, level) {
        log::info!("delete interrupted at {}", entry);
        return WalkControl::Abort;
    }

    match kind {
        EntryKind::File => {
            if notifier.confirm_delete_file(entry) {
                match fs::remove_file(entry.path()) {
                    Ok(()) => {
                        deleted.insert(entry.clone());
                    }
                    Err(err) => {
                        log::warn!("failed to delete file {}: {}", entry, err);
                        notifier.on_delete_file_failed(entry);
                    }
                }
            }
        }
        EntryKind::Directory => {
            match entry.children() {
                Ok(mut children) => {
                    if let Some(comparator) = comparator {
                        children.sort_by(|a, b| comparator.compare(a, b));
                    }
                    for child in &children {
                        let next_level = if child.is_dir() { level + 1 } else { level };
                        if delete_entry(
                            child,
                            delete_empty_dirs,
                            comparator,
                            depth,
                            next_level,
                            notifier,
                            deleted,
                        ) == WalkControl::Abort
                        {
                            return WalkControl::Abort;
                        }
                    }
                }
                Err(err) => {
                    log::warn!("delete: failed to list {}: {}", entry, err);
                }
            }

            // Only after the whole subtree was processed does the directory
            // itself become a candidate.
            if delete_empty_dirs && is_empty_dir(entry) && notifier.confirm_delete_folder(entry) {
                match fs::remove_dir(entry.path()) {
                    Ok(()) => {
                        deleted.insert(entry.clone());
                    }
                    Err(err) => {
                        log::warn!("failed to delete folder {}: {}", entry, err);
                        notifier.on_delete_folder_failed(entry);
                    }
                }
            }
        }
        _ => {}
    }

    WalkControl::Continue
}

fn is_empty_dir(entry: &Entry) -> bool {
    fs::read_dir(entry.path())
        .map(|mut children| children.next().is_none())
        .unwrap_or(false)
}
