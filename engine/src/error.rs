//! Error types for the traversal and transfer engines.
//!
//! `EngineError` covers every condition an engine reports: precondition
//! failures fatal to the current call, per-entry I/O failures the operation
//! survives, policy rejections (a notifier declined something), and
//! user-requested interruption. The variants keep those categories
//! distinguishable; none of them ever crosses a public entry point as an
//! `Err`. Callers observe them through notifier callbacks and through the
//! completeness of the returned result set.

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum EngineError {
    /// Nothing exists at the path
    NotFound { path: PathBuf },

    /// The path exists but is neither a regular file nor a directory
    NotValid { path: PathBuf },

    /// A transfer source turned out not to be a regular file
    NotAFile { path: PathBuf },

    /// A notifier filter or confirmation callback declined the entry
    NotConfirmed { path: PathBuf },

    /// A notifier continuation callback requested that the operation stop
    Interrupted { path: PathBuf },

    /// Destination resolves to the source itself
    SameSourceAndDestination { path: PathBuf },

    /// Replace and append were both disabled for an existing destination
    ReplaceDisabled { path: PathBuf },

    /// Failed to create a directory
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to read from a source file
    ReadError { path: PathBuf, source: io::Error },

    /// Failed to write to a destination file
    WriteError { path: PathBuf, source: io::Error },

    /// Failed to list a directory
    EnumerationFailed { path: PathBuf, source: io::Error },

    /// Failed to delete an entry
    DeleteFailed { path: PathBuf, source: io::Error },

    /// A move copied the file but could not delete the source; the copied
    /// destination is retained
    SourceDeleteFailed { path: PathBuf, source: io::Error },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Entry not found: {}", path.display())
            }
            Self::NotValid { path } => {
                write!(f, "Not a regular file or directory: {}", path.display())
            }
            Self::NotAFile { path } => {
                write!(f, "Not a regular file: {}", path.display())
            }
            Self::NotConfirmed { path } => {
                write!(f, "Not confirmed: {}", path.display())
            }
            Self::Interrupted { path } => {
                write!(f, "Interrupted at: {}", path.display())
            }
            Self::SameSourceAndDestination { path } => {
                write!(f, "Destination is the same as source: {}", path.display())
            }
            Self::ReplaceDisabled { path } => {
                write!(f, "Replace disabled for existing file: {}", path.display())
            }
            Self::DirectoryCreationFailed { path, .. } => {
                write!(f, "Failed to create directory: {}", path.display())
            }
            Self::ReadError { path, .. } => {
                write!(f, "Failed to read file: {}", path.display())
            }
            Self::WriteError { path, .. } => {
                write!(f, "Failed to write file: {}", path.display())
            }
            Self::EnumerationFailed { path, .. } => {
                write!(f, "Failed to list directory: {}", path.display())
            }
            Self::DeleteFailed { path, .. } => {
                write!(f, "Failed to delete: {}", path.display())
            }
            Self::SourceDeleteFailed { path, .. } => {
                write!(f, "Copied but failed to delete source: {}", path.display())
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DirectoryCreationFailed { source, .. }
            | Self::ReadError { source, .. }
            | Self::WriteError { source, .. }
            | Self::EnumerationFailed { source, .. }
            | Self::DeleteFailed { source, .. }
            | Self::SourceDeleteFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl EngineError {
    /// True for rejections originating from a notifier decision rather than
    /// from the filesystem.
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            Self::NotConfirmed { .. } | Self::Interrupted { .. } | Self::ReplaceDisabled { .. }
        )
    }
}
