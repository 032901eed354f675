//! Tree Walker: depth-bounded recursive enumeration.
//!
//! `walk` produces the set of entries under a root that match a traversal
//! mode, honoring the notifier's filter and continuation decisions. All
//! state lives on the call stack of the recursion; the accumulator is owned
//! by the top-level call and passed down by mutable reference. No error
//! ever escapes `walk`: filesystem failures are caught where they occur,
//! reported through the notifier, and the affected entry contributes
//! nothing.
//!
//! Depth counts directory-nesting levels from the root (root is level 0).
//! File children are processed at their parent directory's level; only
//! entering a subdirectory increments the level. With a depth bound of `d`,
//! any entry at level >= d is pruned before the filesystem is touched.

use crate::error::EngineError;
use crate::model::{Entry, EntryKind, EntrySet, TraversalMode};
use crate::notify::{WalkNotifier, PERMISSIVE};
use crate::sort::EntryComparator;

/// Continuation signal threaded through the recursion. `Abort` unwinds the
/// entire walk without visiting further siblings or descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkControl {
    Continue,
    Abort,
}

/// Enumerate the tree under `root`.
///
/// # Arguments
/// * `root` - Traversal root; need not exist (reported, empty result)
/// * `mode` - Which entry kinds are collected
/// * `depth` - Maximum nesting level visited; `None` means unlimited
/// * `comparator` - Orders directory listings during descent and the final
///   set; `None` leaves order platform-defined
/// * `notifier` - Filter/continuation/report callbacks; `None` is permissive
///
/// The comparator is applied to the result exactly once, here at the
/// outermost call.
pub fn walk(
    root: &Entry,
    mode: TraversalMode,
    depth: Option<u32>,
    comparator: Option<&EntryComparator>,
    notifier: Option<&dyn WalkNotifier>,
) -> EntrySet {
    let notifier = notifier.unwrap_or(&PERMISSIVE);
    let mut collected = EntrySet::new();
    walk_into(root, mode, depth, comparator, notifier, &mut collected);
    if let Some(comparator) = comparator {
        collected.sort_with(comparator);
    }
    collected
}

/// Recursion entry point shared with the search and batch engines, which
/// thread their own accumulator (and apply their own final sort).
pub(crate) fn walk_into(
    root: &Entry,
    mode: TraversalMode,
    depth: Option<u32>,
    comparator: Option<&EntryComparator>,
    notifier: &dyn WalkNotifier,
    collected: &mut EntrySet,
) -> WalkControl {
    walk_entry(root, mode, depth, 0, comparator, notifier, collected)
}

fn walk_entry(
    entry: &Entry,
    mode: TraversalMode,
    depth: Option<u32>,
    level: u32,
    comparator: Option<&EntryComparator>,
    notifier: &dyn WalkNotifier,
    collected: &mut EntrySet,
) -> WalkControl {
    // Depth guard runs before any filesystem access: this level and below
    // are pruned entirely.
    if let Some(limit) = depth {
        if level >= limit {
            return WalkControl::Continue;
        }
    }

    let kind = entry.kind();
    match kind {
        EntryKind::Missing => {
            notifier.on_error(&EngineError::NotFound { path: entry.path().to_path_buf() });
            return WalkControl::Continue;
        }
        EntryKind::Other => {
            notifier.on_error(&EngineError::NotValid { path: entry.path().to_path_buf() });
            return WalkControl::Continue;
        }
        EntryKind::File | EntryKind::Directory => {}
    }

    let mut was_added = false;
    if mode.includes(kind) {
        let confirmed = match kind {
            EntryKind::File => notifier.on_get_file(entry),
            _ => notifier.on_get_folder(entry),
        };
        if confirmed {
            was_added = collected.insert(entry.clone());
        } else {
            notifier.on_error(&EngineError::NotConfirmed { path: entry.path().to_path_buf() });
        }
    }

    if !notifier.should_proceed(entry, collected, level, was_added) {
        notifier.on_error(&EngineError::Interrupted { path: entry.path().to_path_buf() });
        return WalkControl::Abort;
    }

    if kind == EntryKind::Directory {
        let mut children = match entry.children() {
            Ok(children) => children,
            Err(err) => {
                notifier.on_error(&EngineError::EnumerationFailed {
                    path: entry.path().to_path_buf(),
                    source: err,
                });
                return WalkControl::Continue;
            }
        };
        if let Some(comparator) = comparator {
            children.sort_by(|a, b| comparator.compare(a, b));
        }
        for child in &children {
            // File children stay at the parent directory's level; only
            // entering a subdirectory goes one level deeper.
            let next_level = if child.is_dir() { level + 1 } else { level };
            if walk_entry(child, mode, depth, next_level, comparator, notifier, collected)
                == WalkControl::Abort
            {
                return WalkControl::Abort;
            }
        }
    }

    WalkControl::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortDirection, SortKey};
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Builds the fixture tree `root/{a.txt, sub/b.txt}`.
    fn fixture_tree(temp: &tempfile::TempDir) -> Entry {
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("a.txt"), b"aaa").expect("Failed to write a.txt");
        fs::create_dir(root.join("sub")).expect("Failed to create sub");
        fs::write(root.join("sub").join("b.txt"), b"bbb").expect("Failed to write b.txt");
        Entry::new(root)
    }

    fn names(set: &EntrySet) -> HashSet<String> {
        set.iter().map(|e| e.name()).collect()
    }

    // Test helper: records every callback and error category.
    struct RecordingNotifier {
        calls: Mutex<Vec<String>>,
        reject_files: bool,
        stop_after: Option<usize>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            RecordingNotifier {
                calls: Mutex::new(Vec::new()),
                reject_files: false,
                stop_after: None,
            }
        }

        fn get_calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl WalkNotifier for RecordingNotifier {
        fn on_get_file(&self, file: &Entry) -> bool {
            self.calls.lock().unwrap().push(format!("file:{}", file.name()));
            !self.reject_files
        }

        fn on_get_folder(&self, folder: &Entry) -> bool {
            self.calls.lock().unwrap().push(format!("folder:{}", folder.name()));
            true
        }

        fn should_proceed(
            &self,
            _current: &Entry,
            collected: &EntrySet,
            _level: u32,
            _was_added: bool,
        ) -> bool {
            match self.stop_after {
                Some(limit) => collected.len() < limit,
                None => true,
            }
        }

        fn on_error(&self, error: &EngineError) {
            let tag = match error {
                EngineError::NotFound { .. } => "not-found",
                EngineError::NotValid { .. } => "not-valid",
                EngineError::NotConfirmed { .. } => "not-confirmed",
                EngineError::Interrupted { .. } => "interrupted",
                _ => "other",
            };
            self.calls.lock().unwrap().push(format!("error:{}", tag));
        }
    }

    #[test]
    fn test_walk_files_unlimited_depth() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        let result = walk(&root, TraversalMode::Files, None, None, None);

        assert_eq!(names(&result), HashSet::from(["a.txt".to_string(), "b.txt".to_string()]));
        let paths: HashSet<PathBuf> =
            result.iter().map(|e| e.path().to_path_buf()).collect();
        assert!(paths.contains(&root.path().join("a.txt")));
        assert!(paths.contains(&root.path().join("sub").join("b.txt")));
    }

    #[test]
    fn test_walk_depth_one_prunes_subdirectory() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        // a.txt sits at level 0 (its parent directory's level); sub/ is one
        // level deeper and is pruned before being read.
        let result = walk(&root, TraversalMode::Files, Some(1), None, None);

        assert_eq!(names(&result), HashSet::from(["a.txt".to_string()]));
    }

    #[test]
    fn test_walk_depth_zero_returns_empty() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        let result = walk(&root, TraversalMode::All, Some(0), None, None);
        assert!(result.is_empty());
    }

    #[test]
    fn test_walk_all_mode_is_complete() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        let result = walk(&root, TraversalMode::All, None, None, None);

        assert_eq!(
            names(&result),
            HashSet::from([
                "root".to_string(),
                "a.txt".to_string(),
                "sub".to_string(),
                "b.txt".to_string(),
            ])
        );
    }

    #[test]
    fn test_walk_folders_mode_excludes_files_but_descends() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        let result = walk(&root, TraversalMode::Folders, None, None, None);

        assert_eq!(names(&result), HashSet::from(["root".to_string(), "sub".to_string()]));
    }

    #[test]
    fn test_walk_files_mode_still_descends_into_folders() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        let result = walk(&root, TraversalMode::Files, None, None, None);

        // b.txt lives inside sub/, which is never collected in Files mode
        // but is still entered.
        assert!(names(&result).contains("b.txt"));
        assert!(!names(&result).contains("sub"));
    }

    #[test]
    fn test_walk_missing_root_reports_and_returns_empty() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Entry::new(temp.path().join("nonexistent"));

        let notifier = RecordingNotifier::new();
        let result = walk(&root, TraversalMode::All, None, None, Some(&notifier));

        assert!(result.is_empty());
        assert_eq!(notifier.get_calls(), vec!["error:not-found"]);
    }

    #[test]
    fn test_walk_filter_veto_reports_not_confirmed() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        let mut notifier = RecordingNotifier::new();
        notifier.reject_files = true;
        let result = walk(&root, TraversalMode::Files, None, None, Some(&notifier));

        // Every file candidate was offered, declined, and reported; the
        // walk itself kept going.
        assert!(result.is_empty());
        let calls = notifier.get_calls();
        assert_eq!(calls.iter().filter(|c| *c == "error:not-confirmed").count(), 2);
        assert!(calls.contains(&"file:a.txt".to_string()));
        assert!(calls.contains(&"file:b.txt".to_string()));
    }

    #[test]
    fn test_walk_interruption_halts_remaining_work() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        for i in 0..5 {
            fs::write(root.join(format!("f{}.txt", i)), b"x").expect("Failed to write file");
        }

        let mut notifier = RecordingNotifier::new();
        notifier.stop_after = Some(1);
        let result =
            walk(&Entry::new(&root), TraversalMode::Files, None, None, Some(&notifier));

        assert_eq!(result.len(), 1);
        let calls = notifier.get_calls();
        assert_eq!(calls.iter().filter(|c| *c == "error:interrupted").count(), 1);
        // No file candidate was offered after the interruption fired.
        let file_offers = calls.iter().filter(|c| c.starts_with("file:")).count();
        assert_eq!(file_offers, 1);
    }

    #[test]
    fn test_walk_comparator_orders_final_set() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("c.txt"), b"x").expect("Failed to write");
        fs::write(root.join("a.txt"), b"x").expect("Failed to write");
        fs::write(root.join("b.txt"), b"x").expect("Failed to write");

        let comparator = EntryComparator::new(SortKey::Name, SortDirection::Ascending);
        let result = walk(
            &Entry::new(&root),
            TraversalMode::Files,
            None,
            Some(&comparator),
            None,
        );

        let ordered: Vec<_> = result.iter().map(|e| e.name()).collect();
        assert_eq!(ordered, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_walk_file_root_is_collected() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp.path().join("single.txt");
        fs::write(&file, b"data").expect("Failed to write file");

        let result = walk(&Entry::new(&file), TraversalMode::Files, None, None, None);
        assert_eq!(names(&result), HashSet::from(["single.txt".to_string()]));
    }
}
