//! Search-by-name: a Tree Walker specialization.
//!
//! The inclusion filter delegates to an external string-match predicate
//! behind the `NameMatcher` port. Match flags are opaque bits the engine
//! passes through verbatim; their interpretation belongs entirely to the
//! matcher implementation.

use std::ops::BitOr;

use crate::model::{Entry, EntrySet, TraversalMode};
use crate::notify::{WalkNotifier, PERMISSIVE};
use crate::sort::EntryComparator;
use crate::walk::{walk_into, WalkControl};

/// Opaque match-style bits handed to a `NameMatcher` unchanged.
///
/// The constants below are the conventional vocabulary; an implementation
/// is free to honor any subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchFlags(pub u32);

impl MatchFlags {
    pub const NONE: MatchFlags = MatchFlags(0);
    /// Compare case-sensitively
    pub const CASE_SENSITIVE: MatchFlags = MatchFlags(1);
    /// Whole-name equality
    pub const EQUALS: MatchFlags = MatchFlags(1 << 1);
    /// Substring match
    pub const CONTAINS: MatchFlags = MatchFlags(1 << 2);
    /// Prefix match
    pub const STARTS_WITH: MatchFlags = MatchFlags(1 << 3);
    /// Suffix match
    pub const ENDS_WITH: MatchFlags = MatchFlags(1 << 4);
    /// Word-tokenized automatic matching
    pub const AUTO: MatchFlags = MatchFlags(1 << 5);

    pub fn contains(self, flag: MatchFlags) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl BitOr for MatchFlags {
    type Output = MatchFlags;

    fn bitor(self, rhs: MatchFlags) -> MatchFlags {
        MatchFlags(self.0 | rhs.0)
    }
}

/// External string-match collaborator.
pub trait NameMatcher {
    fn matches(&self, name: &str, pattern: &str, flags: MatchFlags) -> bool;
}

/// Walk `roots` collecting entries whose name matches `pattern`.
///
/// Each root is walked independently and the results unioned; the
/// comparator is applied once to the union. When `stop_at_first` is set the
/// continuation callback aborts the walk as soon as one match has been
/// added; this is an early exit through the ordinary interruption path, not
/// a different algorithm.
#[allow(clippy::too_many_arguments)]
pub fn search_by_name(
    pattern: &str,
    roots: &[Entry],
    matcher: &dyn NameMatcher,
    flags: MatchFlags,
    stop_at_first: bool,
    mode: TraversalMode,
    comparator: Option<&EntryComparator>,
    depth: Option<u32>,
    notifier: Option<&dyn WalkNotifier>,
) -> EntrySet {
    let inner = notifier.unwrap_or(&PERMISSIVE);
    let filter = NameFilter { pattern, matcher, flags, stop_at_first, inner };

    let mut found = EntrySet::new();
    for root in roots {
        if walk_into(root, mode, depth, comparator, &filter, &mut found) == WalkControl::Abort {
            break;
        }
    }
    if let Some(comparator) = comparator {
        found.sort_with(comparator);
    }
    found
}

/// Walk notifier that narrows the caller's filter to name matches.
struct NameFilter<'a> {
    pattern: &'a str,
    matcher: &'a dyn NameMatcher,
    flags: MatchFlags,
    stop_at_first: bool,
    inner: &'a dyn WalkNotifier,
}

impl NameFilter<'_> {
    fn name_matches(&self, entry: &Entry) -> bool {
        self.matcher.matches(&entry.name(), self.pattern, self.flags)
    }
}

impl WalkNotifier for NameFilter<'_> {
    fn on_get_file(&self, file: &Entry) -> bool {
        self.name_matches(file) && self.inner.on_get_file(file)
    }

    fn on_get_folder(&self, folder: &Entry) -> bool {
        self.name_matches(folder) && self.inner.on_get_folder(folder)
    }

    fn should_proceed(
        &self,
        current: &Entry,
        collected: &EntrySet,
        level: u32,
        was_added: bool,
    ) -> bool {
        if self.stop_at_first && !collected.is_empty() {
            return false;
        }
        self.inner.should_proceed(current, collected, level, was_added)
    }

    fn on_error(&self, error: &crate::error::EngineError) {
        self.inner.on_error(error);
    }
}
