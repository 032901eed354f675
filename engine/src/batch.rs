//! Batch transfer engine.
//!
//! Implements the public copy and move operations over a whole tree:
//! enumerate the source with the tree walker, compute each file's
//! destination preserving the relative structure, ask the batch notifier to
//! confirm/redirect/resolve conflicts, run the single-file transfer, and
//! aggregate what was actually written. Per-file failures are isolated:
//! partial success is the normal outcome of a batch, reflected by the
//! returned set being a subset of what was attempted.

use crate::error::EngineError;
use crate::model::{Entry, EntrySet, TransferMode, TraversalMode};
use crate::notify::{BatchTransferNotifier, SkipReason, TransferNotifier, WalkNotifier, PERMISSIVE};
use crate::sort::EntryComparator;
use crate::transfer::{copy_file_checked, ensure_dir_exists, move_file_checked};
use crate::walk::walk_into;

/// Copy or move every file under `source` into `dest_dir`.
///
/// # Arguments
/// * `mode` - Copy leaves sources in place; Move deletes each source after
///   its destination write succeeded
/// * `source` - A file or a directory tree
/// * `dest_dir` - Created (with missing parents) if absent; creation
///   failure or `dest_dir == source` aborts before anything is attempted
/// * `comparator` - Deterministic processing order and final result order
/// * `depth` - Bounds the enumeration, same semantics as `walk`
/// * `single_notifier` - Progress/cancellation for each file's byte copy
/// * `notifier` - Batch policy: collection, confirmation, conflict
///   resolution, outcome reports
///
/// Returns the set of destination files actually written.
#[allow(clippy::too_many_arguments)]
pub fn transfer_all(
    mode: TransferMode,
    source: &Entry,
    dest_dir: &Entry,
    comparator: Option<&EntryComparator>,
    preserve_timestamp: bool,
    buffered: bool,
    depth: Option<u32>,
    single_notifier: Option<&dyn TransferNotifier>,
    notifier: Option<&dyn BatchTransferNotifier>,
) -> EntrySet {
    let notifier = notifier.unwrap_or(&PERMISSIVE);
    let single = single_notifier.unwrap_or(&PERMISSIVE);
    let mut transferred = EntrySet::new();

    if let Err(err) = ensure_dir_exists(dest_dir) {
        notifier.on_failed(source, dest_dir, &err);
        return transferred;
    }
    if dest_dir == source {
        let err = EngineError::SameSourceAndDestination { path: source.path().to_path_buf() };
        notifier.on_failed(source, dest_dir, &err);
        return transferred;
    }

    // Enumeration is observable and cancellable by the same policy object
    // that will approve each transfer.
    let collector = CollectAdapter { batch: notifier };
    let mut files = EntrySet::new();
    walk_into(source, TraversalMode::Files, depth, comparator, &collector, &mut files);

    // The total is fixed at loop start; files that appear afterwards are
    // not picked up.
    let total = files.len() as u64;
    for (index, file) in files.iter().enumerate() {
        let processed = index as u64;

        // Enumeration and transfer are not atomic with respect to external
        // changes, so the kind is checked again at the point of use.
        if !file.is_file() {
            notifier.on_skipped(file, SkipReason::SourceMissing);
            continue;
        }

        let target_dir = relative_target_dir(source, file, dest_dir);

        if !notifier.should_proceed(file, &target_dir, &transferred, processed, total) {
            log::info!("batch {} interrupted before {}", mode, file);
            break;
        }

        if !notifier.confirm_transfer(file, &target_dir) {
            notifier.on_skipped(file, SkipReason::NotConfirmed);
            continue;
        }

        let target = match notifier.target_for(file, &target_dir) {
            Some(target) if target == *file => {
                log::warn!("ignoring explicit target equal to source for {}", file);
                target_dir.child(&file.name())
            }
            Some(target) => target,
            None => target_dir.child(&file.name()),
        };

        let mut rewrite = true;
        if target.exists() {
            let options = notifier.confirm_replace(file, &target);
            if !options.allows_transfer() {
                notifier.on_skipped(file, SkipReason::ReplaceDisabled);
                continue;
            }
            rewrite = !options.enable_append;
        }

        let target_name = target.name();
        let target_parent = target.parent().unwrap_or_else(|| target_dir.clone());
        let result = match mode {
            TransferMode::Copy => copy_file_checked(
                file,
                Some(target_name.as_str()),
                &target_parent,
                rewrite,
                preserve_timestamp,
                buffered,
                single,
            ),
            TransferMode::Move => move_file_checked(
                file,
                Some(target_name.as_str()),
                &target_parent,
                rewrite,
                preserve_timestamp,
                buffered,
                single,
            ),
        };

        match result {
            Ok(written) => {
                notifier.on_succeeded(file, &written, mode);
                transferred.insert(written);
            }
            Err(err) => notifier.on_failed(file, &target_dir, &err),
        }
    }

    if let Some(comparator) = comparator {
        transferred.sort_with(comparator);
    }
    transferred
}

/// Destination directory for `file`, re-parenting its path under
/// `dest_dir` by stripping the source root's path prefix. Files directly
/// at the root (and file sources) go straight into `dest_dir`.
fn relative_target_dir(source: &Entry, file: &Entry, dest_dir: &Entry) -> Entry {
    let relative = file
        .path()
        .parent()
        .and_then(|parent| parent.strip_prefix(source.path()).ok());
    match relative {
        Some(relative) if !relative.as_os_str().is_empty() => {
            Entry::new(dest_dir.path().join(relative))
        }
        _ => dest_dir.clone(),
    }
}

/// Routes the walker's continuation hook onto the batch notifier while the
/// source tree is being collected.
struct CollectAdapter<'a> {
    batch: &'a dyn BatchTransferNotifier,
}

impl WalkNotifier for CollectAdapter<'_> {
    fn should_proceed(
        &self,
        current: &Entry,
        collected: &EntrySet,
        level: u32,
        _was_added: bool,
    ) -> bool {
        self.batch.on_collecting(current, collected, level)
    }

    fn on_error(&self, error: &EngineError) {
        log::warn!("collecting: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReplaceOptions;
    use std::fs;
    use std::sync::Mutex;

    fn fixture_tree(temp: &tempfile::TempDir) -> Entry {
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("a.txt"), b"alpha").expect("Failed to write a.txt");
        fs::create_dir(root.join("sub")).expect("Failed to create sub");
        fs::write(root.join("sub").join("b.txt"), b"beta").expect("Failed to write b.txt");
        Entry::new(root)
    }

    // Test helper: records outcome callbacks and applies a fixed policy.
    struct TestBatchNotifier {
        calls: Mutex<Vec<String>>,
        replace: ReplaceOptions,
        stop_after: Option<u64>,
    }

    impl TestBatchNotifier {
        fn new() -> Self {
            TestBatchNotifier {
                calls: Mutex::new(Vec::new()),
                replace: ReplaceOptions::replace(),
                stop_after: None,
            }
        }

        fn get_calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl BatchTransferNotifier for TestBatchNotifier {
        fn should_proceed(
            &self,
            _file: &Entry,
            _dest_dir: &Entry,
            _transferred: &EntrySet,
            processed: u64,
            _total: u64,
        ) -> bool {
            match self.stop_after {
                Some(limit) => processed < limit,
                None => true,
            }
        }

        fn confirm_replace(&self, _file: &Entry, _existing: &Entry) -> ReplaceOptions {
            self.replace
        }

        fn on_skipped(&self, file: &Entry, reason: SkipReason) {
            self.calls.lock().unwrap().push(format!("skipped:{}:{}", file.name(), reason));
        }

        fn on_succeeded(&self, file: &Entry, _result: &Entry, _mode: TransferMode) {
            self.calls.lock().unwrap().push(format!("succeeded:{}", file.name()));
        }

        fn on_failed(&self, file: &Entry, _dest_dir: &Entry, _error: &EngineError) {
            self.calls.lock().unwrap().push(format!("failed:{}", file.name()));
        }
    }

    #[test]
    fn test_copy_reproduces_relative_structure() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);
        let dest = temp.path().join("dest");

        let result = transfer_all(
            TransferMode::Copy,
            &root,
            &Entry::new(&dest),
            None,
            false,
            true,
            None,
            None,
            None,
        );

        assert_eq!(result.len(), 2);
        assert_eq!(fs::read(dest.join("a.txt")).expect("a.txt"), b"alpha");
        assert_eq!(fs::read(dest.join("sub").join("b.txt")).expect("b.txt"), b"beta");
        // Sources untouched by a copy.
        assert!(root.path().join("a.txt").exists());
        assert!(root.path().join("sub").join("b.txt").exists());
    }

    #[test]
    fn test_move_removes_sources_after_successful_writes() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);
        let dest = temp.path().join("dest");

        let notifier = TestBatchNotifier::new();
        let result = transfer_all(
            TransferMode::Move,
            &root,
            &Entry::new(&dest),
            None,
            false,
            false,
            None,
            None,
            Some(&notifier),
        );

        assert_eq!(result.len(), 2);
        assert!(!root.path().join("a.txt").exists());
        assert!(!root.path().join("sub").join("b.txt").exists());
        assert_eq!(fs::read(dest.join("a.txt")).expect("a.txt"), b"alpha");
        assert_eq!(fs::read(dest.join("sub").join("b.txt")).expect("b.txt"), b"beta");

        let calls = notifier.get_calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("succeeded:")).count(), 2);
    }

    #[test]
    fn test_replace_disabled_skips_and_preserves_destination() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("a.txt"), b"new content").expect("Failed to write source");
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).expect("Failed to create dest");
        fs::write(dest.join("a.txt"), b"old content").expect("Failed to write dest");

        let mut notifier = TestBatchNotifier::new();
        notifier.replace = ReplaceOptions::skip();
        let result = transfer_all(
            TransferMode::Copy,
            &Entry::new(&root),
            &Entry::new(&dest),
            None,
            false,
            false,
            None,
            None,
            Some(&notifier),
        );

        assert!(result.is_empty());
        assert_eq!(fs::read(dest.join("a.txt")).expect("a.txt"), b"old content");

        // Skipped by policy: neither succeeded nor failed.
        let calls = notifier.get_calls();
        assert_eq!(calls, vec!["skipped:a.txt:replace disabled"]);
    }

    #[test]
    fn test_replace_append_appends_to_destination() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("a.txt"), b"-tail").expect("Failed to write source");
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).expect("Failed to create dest");
        fs::write(dest.join("a.txt"), b"head").expect("Failed to write dest");

        let mut notifier = TestBatchNotifier::new();
        notifier.replace = ReplaceOptions::append();
        transfer_all(
            TransferMode::Copy,
            &Entry::new(&root),
            &Entry::new(&dest),
            None,
            false,
            false,
            None,
            None,
            Some(&notifier),
        );

        assert_eq!(fs::read(dest.join("a.txt")).expect("a.txt"), b"head-tail");
    }

    #[test]
    fn test_interruption_stops_remaining_files() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        for i in 0..4 {
            fs::write(root.join(format!("f{}.txt", i)), b"x").expect("Failed to write file");
        }
        let dest = temp.path().join("dest");

        let mut notifier = TestBatchNotifier::new();
        notifier.stop_after = Some(2);
        let result = transfer_all(
            TransferMode::Copy,
            &Entry::new(&root),
            &Entry::new(&dest),
            None,
            false,
            false,
            None,
            None,
            Some(&notifier),
        );

        assert_eq!(result.len(), 2);
        let calls = notifier.get_calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("succeeded:")).count(), 2);
    }

    #[test]
    fn test_failed_transfer_keeps_source_and_reports() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("Failed to create root");
        fs::write(root.join("a.txt"), b"payload").expect("Failed to write source");
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).expect("Failed to create dest");
        // A directory squatting on the destination path makes the write
        // fail.
        fs::create_dir(dest.join("a.txt")).expect("Failed to create blocking dir");

        let notifier = TestBatchNotifier::new();
        let result = transfer_all(
            TransferMode::Move,
            &Entry::new(&root),
            &Entry::new(&dest),
            None,
            false,
            false,
            None,
            None,
            Some(&notifier),
        );

        assert!(result.is_empty());
        assert!(root.join("a.txt").exists(), "Failed move must keep the source");
        assert_eq!(notifier.get_calls(), vec!["failed:a.txt"]);
    }

    #[test]
    fn test_destination_equal_to_source_is_fatal() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = fixture_tree(&temp);

        let notifier = TestBatchNotifier::new();
        let result = transfer_all(
            TransferMode::Copy,
            &root,
            &root,
            None,
            false,
            false,
            None,
            None,
            Some(&notifier),
        );

        assert!(result.is_empty());
        assert_eq!(notifier.get_calls(), vec!["failed:root"]);
    }

    #[test]
    fn test_single_file_source_lands_in_dest_dir() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp.path().join("single.txt");
        fs::write(&src, b"solo").expect("Failed to write source");
        let dest = temp.path().join("dest");

        let result = transfer_all(
            TransferMode::Copy,
            &Entry::new(&src),
            &Entry::new(&dest),
            None,
            false,
            false,
            None,
            None,
            None,
        );

        assert_eq!(result.len(), 1);
        assert_eq!(fs::read(dest.join("single.txt")).expect("single.txt"), b"solo");
    }
}
