//! Entry ordering.
//!
//! An `EntryComparator` orders entries by a named sort key and direction.
//! Engines apply it in two places: to directory listings while descending
//! (making traversal order deterministic) and once to the final result set
//! at the outermost call.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Entry;

/// The property a comparator orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Final path component
    Name,
    /// Size in bytes
    Size,
    /// Last modification time
    LastModified,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Size => write!(f, "size"),
            SortKey::LastModified => write!(f, "last-modified"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Orders entries by `key` in `direction`.
///
/// Size and modification time are queried from the filesystem at comparison
/// time, consistent with entries never caching their state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryComparator {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl EntryComparator {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        EntryComparator { key, direction }
    }

    pub fn ascending(key: SortKey) -> Self {
        EntryComparator::new(key, SortDirection::Ascending)
    }

    pub fn descending(key: SortKey) -> Self {
        EntryComparator::new(key, SortDirection::Descending)
    }

    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let ordering = match self.key {
            SortKey::Name => a.name().cmp(&b.name()),
            SortKey::Size => a.size().cmp(&b.size()),
            SortKey::LastModified => a.modified().cmp(&b.modified()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}
