//! # Fileops Engine - Tree Traversal and Batch Transfer Library
//!
//! A headless engine for enumerating, copying, moving, deleting, and
//! searching filesystem trees. Designed as the foundation for multiple
//! frontends (CLI, automation).
//!
//! ## Overview
//!
//! The engine provides:
//! - Depth-bounded recursive tree walking with a selectable traversal mode
//! - Pluggable inclusion/continuation policy via notifier traits
//! - Deterministic ordering via injected comparators
//! - A multi-file copy/move pipeline with per-file conflict resolution,
//!   partial-failure tracking, and cooperative cancellation
//! - Bottom-up recursive delete with per-entry confirmation
//!
//! All operations are synchronous and single-threaded; state lives on the
//! call stack of one invocation and is never shared across calls. Errors
//! never cross the public entry points: callers observe failures through
//! the notifier callbacks they supply and through the completeness of the
//! returned result set.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{transfer_all, walk, Entry, TransferMode, TraversalMode};
//!
//! // Enumerate all files under a tree.
//! let root = Entry::new("/data/photos");
//! let files = walk(&root, TraversalMode::Files, None, None, None);
//! println!("found {} files", files.len());
//!
//! // Copy the tree somewhere else, preserving relative structure.
//! let copied = transfer_all(
//!     TransferMode::Copy,
//!     &root,
//!     &Entry::new("/backup/photos"),
//!     None,
//!     true,
//!     true,
//!     None,
//!     None,
//!     None,
//! );
//! println!("copied {} files", copied.len());
//! ```
//!
//! ## Modules
//!
//! - **model**: Core value types (Entry, EntrySet, modes, ReplaceOptions)
//! - **sort**: Comparator for deterministic ordering
//! - **error**: Error types and categories
//! - **notify**: Notifier traits consulted by the engines
//! - **walk**: Tree Walker
//! - **search**: Search-by-name on top of the walker
//! - **transfer**: Single-file copy/move
//! - **batch**: Batch transfer engine
//! - **delete**: Recursive delete engine

pub mod batch;
pub mod delete;
pub mod error;
pub mod model;
pub mod notify;
pub mod search;
pub mod sort;
pub mod transfer;
pub mod walk;

// Re-export main types and functions
pub use batch::transfer_all;
pub use delete::{delete_all, delete_all_roots};
pub use error::EngineError;
pub use model::{Entry, EntryKind, EntrySet, ReplaceOptions, TransferMode, TraversalMode};
pub use notify::{
    BatchTransferNotifier, DeleteNotifier, PermissiveNotifier, SkipReason, TransferNotifier,
    WalkNotifier,
};
pub use search::{search_by_name, MatchFlags, NameMatcher};
pub use sort::{EntryComparator, SortDirection, SortKey};
pub use transfer::{copy_file, move_file};
pub use walk::walk;
