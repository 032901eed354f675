//! Single-file transfer.
//!
//! Copies or moves one file's bytes. Two strategies, selected by the
//! `buffered` flag:
//! - Buffered streaming: fixed-size chunks with timed progress callbacks;
//!   the progress callback is the only in-copy cancellation point.
//! - Whole-buffer: read the entire source into memory and write it out in
//!   one call. No chunking, no cancellation point; meant for small files
//!   when progress reporting is not needed.
//!
//! The public functions never return an error: failures are logged and
//! yield `None`, keeping batch operations resilient. The crate-internal
//! `_checked` variants return the underlying `EngineError` so the batch
//! engine can distinguish failure causes.

use std::fs;
use std::io::{self, Read, Write};
use std::time::Instant;

use crate::error::EngineError;
use crate::model::{Entry, EntryKind};
use crate::notify::{TransferNotifier, PERMISSIVE};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Copy one file into `dest_dir`.
///
/// # Arguments
/// * `source` - Must be an existing regular file
/// * `dest_name` - Destination base name; `None` or blank reuses the
///   source's base name
/// * `dest_dir` - Created (with missing parents) if absent
/// * `rewrite` - Truncate an existing destination; `false` appends instead
/// * `preserve_timestamp` - Best-effort copy of the source's mtime
/// * `buffered` - Select the streaming strategy
///
/// Returns the written destination entry, or `None` on any failure
/// (reported to the log and, for cancellation, through the notifier's own
/// return value).
pub fn copy_file(
    source: &Entry,
    dest_name: Option<&str>,
    dest_dir: &Entry,
    rewrite: bool,
    preserve_timestamp: bool,
    buffered: bool,
    notifier: Option<&dyn TransferNotifier>,
) -> Option<Entry> {
    let notifier = notifier.unwrap_or(&PERMISSIVE);
    match copy_file_checked(
        source,
        dest_name,
        dest_dir,
        rewrite,
        preserve_timestamp,
        buffered,
        notifier,
    ) {
        Ok(dest) => Some(dest),
        Err(err) => {
            log::warn!("copy of {} failed: {}", source, err);
            None
        }
    }
}

/// Move one file into `dest_dir`: copy, then delete the source.
///
/// The source is deleted if and only if the copy succeeded. If the copy
/// succeeds but the source cannot be deleted, the copied destination is
/// retained and the failure reported; there is no rollback.
pub fn move_file(
    source: &Entry,
    dest_name: Option<&str>,
    dest_dir: &Entry,
    rewrite: bool,
    preserve_timestamp: bool,
    buffered: bool,
    notifier: Option<&dyn TransferNotifier>,
) -> Option<Entry> {
    let notifier = notifier.unwrap_or(&PERMISSIVE);
    match move_file_checked(
        source,
        dest_name,
        dest_dir,
        rewrite,
        preserve_timestamp,
        buffered,
        notifier,
    ) {
        Ok(dest) => Some(dest),
        Err(err) => {
            log::warn!("move of {} failed: {}", source, err);
            None
        }
    }
}

pub(crate) fn copy_file_checked(
    source: &Entry,
    dest_name: Option<&str>,
    dest_dir: &Entry,
    rewrite: bool,
    preserve_timestamp: bool,
    buffered: bool,
    notifier: &dyn TransferNotifier,
) -> Result<Entry, EngineError> {
    match source.kind() {
        EntryKind::File => {}
        EntryKind::Missing => {
            return Err(EngineError::NotFound { path: source.path().to_path_buf() })
        }
        _ => return Err(EngineError::NotAFile { path: source.path().to_path_buf() }),
    }

    let fallback_name;
    let name = match dest_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            fallback_name = source.name();
            fallback_name.as_str()
        }
    };

    ensure_dir_exists(dest_dir)?;

    let dest = dest_dir.child(name);
    if dest == *source {
        return Err(EngineError::SameSourceAndDestination { path: dest.path().to_path_buf() });
    }

    // Captured before the copy so the destination gets the source's mtime
    // as it was at the time of read.
    let source_mtime = source.modified();

    if buffered {
        copy_buffered(source, &dest, rewrite, notifier)?;
    } else {
        copy_whole(source, &dest, rewrite)?;
    }

    if preserve_timestamp {
        if let Some(mtime) = source_mtime {
            let mtime = filetime::FileTime::from_system_time(mtime);
            if let Err(err) = filetime::set_file_mtime(dest.path(), mtime) {
                log::warn!("could not preserve mtime on {}: {}", dest, err);
            }
        }
    }

    Ok(dest)
}

pub(crate) fn move_file_checked(
    source: &Entry,
    dest_name: Option<&str>,
    dest_dir: &Entry,
    rewrite: bool,
    preserve_timestamp: bool,
    buffered: bool,
    notifier: &dyn TransferNotifier,
) -> Result<Entry, EngineError> {
    let dest = copy_file_checked(
        source,
        dest_name,
        dest_dir,
        rewrite,
        preserve_timestamp,
        buffered,
        notifier,
    )?;
    fs::remove_file(source.path()).map_err(|err| EngineError::SourceDeleteFailed {
        path: source.path().to_path_buf(),
        source: err,
    })?;
    Ok(dest)
}

/// Ensure `dir` exists as a directory, creating it and missing parents.
pub(crate) fn ensure_dir_exists(dir: &Entry) -> Result<(), EngineError> {
    match dir.kind() {
        EntryKind::Directory => Ok(()),
        EntryKind::Missing => {
            fs::create_dir_all(dir.path()).map_err(|err| EngineError::DirectoryCreationFailed {
                path: dir.path().to_path_buf(),
                source: err,
            })
        }
        _ => Err(EngineError::DirectoryCreationFailed {
            path: dir.path().to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "path exists but is not a directory",
            ),
        }),
    }
}

fn open_dest(dest: &Entry, rewrite: bool) -> Result<fs::File, EngineError> {
    let mut options = fs::OpenOptions::new();
    if rewrite {
        options.write(true).create(true).truncate(true);
    } else {
        options.append(true).create(true);
    }
    options.open(dest.path()).map_err(|err| EngineError::WriteError {
        path: dest.path().to_path_buf(),
        source: err,
    })
}

fn copy_buffered(
    source: &Entry,
    dest: &Entry,
    rewrite: bool,
    notifier: &dyn TransferNotifier,
) -> Result<(), EngineError> {
    let mut reader = fs::File::open(source.path()).map_err(|err| EngineError::ReadError {
        path: source.path().to_path_buf(),
        source: err,
    })?;
    let total = reader
        .metadata()
        .map_err(|err| EngineError::ReadError {
            path: source.path().to_path_buf(),
            source: err,
        })?
        .len();
    let mut writer = open_dest(dest, rewrite)?;

    let interval = notifier.notify_interval();
    let mut last_notified = Instant::now();
    let mut done: u64 = 0;
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let read = reader.read(&mut buffer).map_err(|err| EngineError::ReadError {
            path: source.path().to_path_buf(),
            source: err,
        })?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read]).map_err(|err| EngineError::WriteError {
            path: dest.path().to_path_buf(),
            source: err,
        })?;
        done += read as u64;

        if last_notified.elapsed() >= interval {
            last_notified = Instant::now();
            if !notifier.should_proceed(source, dest, done, total) {
                return Err(EngineError::Interrupted { path: source.path().to_path_buf() });
            }
        }
    }
    writer.flush().map_err(|err| EngineError::WriteError {
        path: dest.path().to_path_buf(),
        source: err,
    })?;
    Ok(())
}

fn copy_whole(source: &Entry, dest: &Entry, rewrite: bool) -> Result<(), EngineError> {
    let bytes = fs::read(source.path()).map_err(|err| EngineError::ReadError {
        path: source.path().to_path_buf(),
        source: err,
    })?;
    if rewrite {
        fs::write(dest.path(), &bytes).map_err(|err| EngineError::WriteError {
            path: dest.path().to_path_buf(),
            source: err,
        })
    } else {
        let mut writer = open_dest(dest, false)?;
        writer.write_all(&bytes).map_err(|err| EngineError::WriteError {
            path: dest.path().to_path_buf(),
            source: err,
        })
    }
}
