//! Notifier contracts.
//!
//! Each engine consults a caller-supplied policy object at well-defined
//! points: filter callbacks decide inclusion, confirmation callbacks decide
//! individual actions, continuation callbacks provide cooperative
//! cancellation, and report callbacks observe outcomes. There is one trait
//! per concern:
//! - WalkNotifier: enumeration
//! - TransferNotifier: single-file byte copy
//! - BatchTransferNotifier: multi-file copy or move
//! - DeleteNotifier: recursive delete
//!
//! Every method has a permissive default body, so implementors override
//! only what they care about. When a caller passes no notifier at all, the
//! engine substitutes a shared permissive instance once at the top of the
//! call; the engines themselves contain no optionality checks.
//!
//! All callbacks run synchronously on the calling thread; returning `false`
//! from a continuation callback is the only way to stop an operation early.

use std::time::Duration;

use crate::error::EngineError;
use crate::model::{Entry, EntrySet, ReplaceOptions, TransferMode};

/// Callbacks consulted while enumerating a tree.
pub trait WalkNotifier {
    /// Whether a candidate file should be added to the result set.
    fn on_get_file(&self, _file: &Entry) -> bool {
        true
    }

    /// Whether a candidate directory should be added to the result set.
    fn on_get_folder(&self, _folder: &Entry) -> bool {
        true
    }

    /// Called after each entry is processed. Returning false aborts the
    /// entire remaining walk, not just the current subtree.
    ///
    /// `was_added` tells whether the current entry was just added to
    /// `collected`.
    fn should_proceed(
        &self,
        _current: &Entry,
        _collected: &EntrySet,
        _level: u32,
        _was_added: bool,
    ) -> bool {
        true
    }

    /// Generic sink for everything the walk reports: invalid roots,
    /// enumeration failures, declined candidates, interruption.
    fn on_error(&self, error: &EngineError) {
        log::warn!("walk: {}", error);
    }
}

/// Callbacks consulted during a single buffered file copy.
pub trait TransferNotifier {
    /// Minimum interval between progress callbacks.
    fn notify_interval(&self) -> Duration {
        Duration::from_millis(200)
    }

    /// Progress report, checked once per chunk no more often than
    /// `notify_interval`. Returning false cancels the copy.
    fn should_proceed(
        &self,
        _source: &Entry,
        _dest: &Entry,
        _bytes_done: u64,
        _bytes_total: u64,
    ) -> bool {
        true
    }
}

/// Why a batch transfer left a file untouched without attempting I/O.
///
/// Kept separate from `EngineError` so a caller can tell "skipped by
/// policy" apart from "failed due to I/O".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file vanished or stopped being a regular file between
    /// enumeration and transfer
    SourceMissing,
    /// `confirm_transfer` declined the file
    NotConfirmed,
    /// The destination exists and the replace decision disabled both
    /// overwrite and append
    ReplaceDisabled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SourceMissing => write!(f, "source missing"),
            SkipReason::NotConfirmed => write!(f, "not confirmed"),
            SkipReason::ReplaceDisabled => write!(f, "replace disabled"),
        }
    }
}

/// Callbacks consulted by the batch transfer engine.
pub trait BatchTransferNotifier {
    /// Observe each entry discovered while collecting the source tree.
    /// Returning false aborts collection (and with it the whole batch).
    fn on_collecting(&self, _current: &Entry, _collected: &EntrySet, _level: u32) -> bool {
        true
    }

    /// Called before each file is transferred. Returning false aborts the
    /// entire remaining batch.
    fn should_proceed(
        &self,
        _file: &Entry,
        _dest_dir: &Entry,
        _transferred: &EntrySet,
        _processed: u64,
        _total: u64,
    ) -> bool {
        true
    }

    /// Whether this particular file should be transferred at all.
    fn confirm_transfer(&self, _file: &Entry, _dest_dir: &Entry) -> bool {
        true
    }

    /// Optional explicit destination for `file`. Returning `None` keeps the
    /// default of `dest_dir` joined with the source base name.
    fn target_for(&self, _file: &Entry, _dest_dir: &Entry) -> Option<Entry> {
        None
    }

    /// Conflict decision for a destination that already exists.
    fn confirm_replace(&self, _file: &Entry, _existing: &Entry) -> ReplaceOptions {
        ReplaceOptions::replace()
    }

    /// The file was left untouched for a policy reason.
    fn on_skipped(&self, file: &Entry, reason: SkipReason) {
        log::debug!("skipped {} ({})", file, reason);
    }

    /// The file was transferred; `result` is the written destination.
    fn on_succeeded(&self, _file: &Entry, _result: &Entry, _mode: TransferMode) {}

    /// The transfer was attempted and failed.
    fn on_failed(&self, file: &Entry, _dest_dir: &Entry, error: &EngineError) {
        log::warn!("transfer of {} failed: {}", file, error);
    }
}

/// Callbacks consulted by the delete engine.
pub trait DeleteNotifier {
    /// Called before each entry is processed. Returning false aborts the
    /// entire remaining delete.
    fn should_proceed(&self, _current: &Entry, _deleted: &EntrySet, _level: u32) -> bool {
        true
    }

    fn confirm_delete_file(&self, _file: &Entry) -> bool {
        true
    }

    fn confirm_delete_folder(&self, _folder: &Entry) -> bool {
        true
    }

    fn on_delete_file_failed(&self, file: &Entry) {
        log::warn!("failed to delete file {}", file);
    }

    fn on_delete_folder_failed(&self, folder: &Entry) {
        log::warn!("failed to delete folder {}", folder);
    }
}

/// Accepts everything, reports nothing beyond the default logging.
pub struct PermissiveNotifier;

impl WalkNotifier for PermissiveNotifier {}
impl TransferNotifier for PermissiveNotifier {}
impl BatchTransferNotifier for PermissiveNotifier {}
impl DeleteNotifier for PermissiveNotifier {}

pub(crate) static PERMISSIVE: PermissiveNotifier = PermissiveNotifier;
