//! fileops - Command-line interface for the traversal and transfer engine.
//!
//! This is a simple CLI for manual use of the engine. It provides argument
//! parsing, caller-side notifier implementations for progress reporting,
//! and the concrete name matcher used by the search command.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use engine::{
    delete_all_roots, search_by_name, transfer_all, walk, BatchTransferNotifier, DeleteNotifier,
    Entry, EntryComparator, EntrySet, MatchFlags, NameMatcher, ReplaceOptions, SkipReason,
    SortDirection, SortKey, TransferMode, TransferNotifier, TraversalMode,
};

/// fileops - walk, search, copy, move, and delete directory trees
#[derive(Parser, Debug)]
#[command(name = "fileops")]
#[command(version = "0.1.0")]
#[command(about = "Walk, search, copy, move, and delete directory trees")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose per-entry output
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate the entries under a root
    List {
        /// Traversal root
        root: PathBuf,

        /// Which entry kinds to collect
        #[arg(long, value_enum, default_value = "files")]
        mode: ModeArg,

        /// Maximum nesting level below the root
        #[arg(long, value_name = "LEVELS")]
        depth: Option<u32>,

        /// Sort the result by this key
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Print the result as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Find entries whose name matches a pattern
    Search {
        /// Name pattern
        pattern: String,

        /// Roots to search under
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Match style applied to entry names
        #[arg(long, value_enum, default_value = "contains")]
        style: StyleArg,

        /// Compare case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Stop at the first match
        #[arg(long)]
        first: bool,

        /// Which entry kinds to match
        #[arg(long, value_enum, default_value = "files")]
        mode: ModeArg,

        /// Maximum nesting level below each root
        #[arg(long, value_name = "LEVELS")]
        depth: Option<u32>,

        /// Sort the result by this key
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Print the result as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Copy a file or tree into a destination directory
    Copy {
        /// Source file or directory
        src: PathBuf,

        /// Destination directory (created if absent)
        dst: PathBuf,

        /// What to do when a destination file already exists
        #[arg(long, value_enum, default_value = "skip")]
        overwrite: OverwriteArg,

        /// Copy each source's modification time to its destination
        #[arg(long)]
        preserve_timestamps: bool,

        /// Use whole-buffer copies instead of chunked streaming
        #[arg(long)]
        unbuffered: bool,

        /// Maximum nesting level below the source
        #[arg(long, value_name = "LEVELS")]
        depth: Option<u32>,
    },

    /// Move a file or tree into a destination directory
    Move {
        /// Source file or directory
        src: PathBuf,

        /// Destination directory (created if absent)
        dst: PathBuf,

        /// What to do when a destination file already exists
        #[arg(long, value_enum, default_value = "skip")]
        overwrite: OverwriteArg,

        /// Copy each source's modification time to its destination
        #[arg(long)]
        preserve_timestamps: bool,

        /// Use whole-buffer copies instead of chunked streaming
        #[arg(long)]
        unbuffered: bool,

        /// Maximum nesting level below the source
        #[arg(long, value_name = "LEVELS")]
        depth: Option<u32>,
    },

    /// Delete files (and optionally emptied directories) under the roots
    Delete {
        /// Roots to delete under
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Leave directories in place, delete files only
        #[arg(long)]
        keep_dirs: bool,

        /// Maximum nesting level below each root
        #[arg(long, value_name = "LEVELS")]
        depth: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Files,
    Folders,
    All,
}

impl From<ModeArg> for TraversalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Files => TraversalMode::Files,
            ModeArg::Folders => TraversalMode::Folders,
            ModeArg::All => TraversalMode::All,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Size,
    Modified,
}

impl From<SortArg> for SortKey {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Name => SortKey::Name,
            SortArg::Size => SortKey::Size,
            SortArg::Modified => SortKey::LastModified,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Equals,
    Contains,
    Starts,
    Ends,
    Auto,
}

impl StyleArg {
    fn flag(self) -> MatchFlags {
        match self {
            StyleArg::Equals => MatchFlags::EQUALS,
            StyleArg::Contains => MatchFlags::CONTAINS,
            StyleArg::Starts => MatchFlags::STARTS_WITH,
            StyleArg::Ends => MatchFlags::ENDS_WITH,
            StyleArg::Auto => MatchFlags::AUTO,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OverwriteArg {
    Skip,
    Replace,
    Append,
}

impl From<OverwriteArg> for ReplaceOptions {
    fn from(overwrite: OverwriteArg) -> Self {
        match overwrite {
            OverwriteArg::Skip => ReplaceOptions::skip(),
            OverwriteArg::Replace => ReplaceOptions::replace(),
            OverwriteArg::Append => ReplaceOptions::append(),
        }
    }
}

/// Name matcher backing the search command.
///
/// Interprets the engine's match flags: exactly one style bit is honored,
/// defaulting to substring matching; `AUTO` matches whole words of the
/// name first and falls back to substring.
struct CliNameMatcher;

impl NameMatcher for CliNameMatcher {
    fn matches(&self, name: &str, pattern: &str, flags: MatchFlags) -> bool {
        let (name, pattern) = if flags.contains(MatchFlags::CASE_SENSITIVE) {
            (name.to_string(), pattern.to_string())
        } else {
            (name.to_lowercase(), pattern.to_lowercase())
        };

        if flags.contains(MatchFlags::EQUALS) {
            name == pattern
        } else if flags.contains(MatchFlags::STARTS_WITH) {
            name.starts_with(&pattern)
        } else if flags.contains(MatchFlags::ENDS_WITH) {
            name.ends_with(&pattern)
        } else if flags.contains(MatchFlags::AUTO) {
            name.split(|c: char| !c.is_alphanumeric()).any(|word| word == pattern)
                || name.contains(&pattern)
        } else {
            name.contains(&pattern)
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

fn format_duration(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct BatchCounters {
    succeeded: u64,
    skipped: u64,
    failed: u64,
}

/// Batch notifier printing per-file outcomes and keeping summary counters.
struct CliBatchNotifier {
    verbose: bool,
    overwrite: OverwriteArg,
    counters: Mutex<BatchCounters>,
}

impl CliBatchNotifier {
    fn new(verbose: bool, overwrite: OverwriteArg) -> Self {
        CliBatchNotifier {
            verbose,
            overwrite,
            counters: Mutex::new(BatchCounters::default()),
        }
    }

    fn counters(&self) -> BatchCounters {
        *self.counters.lock().unwrap()
    }
}

impl BatchTransferNotifier for CliBatchNotifier {
    fn should_proceed(
        &self,
        file: &Entry,
        _dest_dir: &Entry,
        _transferred: &EntrySet,
        processed: u64,
        total: u64,
    ) -> bool {
        if self.verbose {
            eprintln!("[{}/{}] {}", processed + 1, total, file.name());
        }
        true
    }

    fn confirm_replace(&self, _file: &Entry, _existing: &Entry) -> ReplaceOptions {
        self.overwrite.into()
    }

    fn on_skipped(&self, file: &Entry, reason: SkipReason) {
        self.counters.lock().unwrap().skipped += 1;
        if self.verbose {
            eprintln!("Skipped ({}): {}", reason, file);
        }
    }

    fn on_succeeded(&self, file: &Entry, result: &Entry, _mode: TransferMode) {
        self.counters.lock().unwrap().succeeded += 1;
        if self.verbose {
            eprintln!("Done: {} -> {}", file, result);
        }
    }

    fn on_failed(&self, file: &Entry, _dest_dir: &Entry, error: &engine::EngineError) {
        self.counters.lock().unwrap().failed += 1;
        eprintln!("Failed: {} ({})", file, error);
    }
}

/// Per-file progress line for long buffered copies.
struct CliTransferNotifier {
    last_update: Mutex<Instant>,
}

impl CliTransferNotifier {
    fn new() -> Self {
        CliTransferNotifier { last_update: Mutex::new(Instant::now()) }
    }
}

impl TransferNotifier for CliTransferNotifier {
    fn should_proceed(
        &self,
        source: &Entry,
        _dest: &Entry,
        bytes_done: u64,
        bytes_total: u64,
    ) -> bool {
        // Throttle progress updates to avoid spam (max once per 200ms)
        let mut last = self.last_update.lock().unwrap();
        if last.elapsed().as_millis() < 200 {
            return true;
        }
        *last = Instant::now();

        eprint!(
            "\r{}: {}/{}",
            source.name(),
            format_bytes(bytes_done),
            format_bytes(bytes_total)
        );
        let _ = std::io::Write::flush(&mut std::io::stderr());
        true
    }
}

/// Delete notifier counting failures and echoing deletions.
struct CliDeleteNotifier {
    verbose: bool,
    failed: Mutex<u64>,
}

impl CliDeleteNotifier {
    fn new(verbose: bool) -> Self {
        CliDeleteNotifier { verbose, failed: Mutex::new(0) }
    }
}

impl DeleteNotifier for CliDeleteNotifier {
    fn confirm_delete_file(&self, file: &Entry) -> bool {
        if self.verbose {
            eprintln!("Deleting file: {}", file);
        }
        true
    }

    fn confirm_delete_folder(&self, folder: &Entry) -> bool {
        if self.verbose {
            eprintln!("Deleting folder: {}", folder);
        }
        true
    }

    fn on_delete_file_failed(&self, file: &Entry) {
        *self.failed.lock().unwrap() += 1;
        eprintln!("Failed to delete: {}", file);
    }

    fn on_delete_folder_failed(&self, folder: &Entry) {
        *self.failed.lock().unwrap() += 1;
        eprintln!("Failed to delete: {}", folder);
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::debug!("parsed arguments: {:?}", args);

    let exit_code = match run_cli(&args) {
        Ok(()) => 0,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

fn comparator_for(sort: Option<SortArg>, desc: bool) -> Option<EntryComparator> {
    sort.map(|key| {
        let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
        EntryComparator::new(key.into(), direction)
    })
}

fn print_entries(entries: &EntrySet, json: bool) -> Result<(), String> {
    if json {
        let rendered = serde_json::to_string_pretty(entries.as_slice())
            .map_err(|e| format!("Failed to render JSON: {}", e))?;
        println!("{}", rendered);
    } else {
        for entry in entries {
            println!("{}", entry);
        }
    }
    Ok(())
}

/// Main CLI logic - separated for testability
fn run_cli(args: &Args) -> Result<(), String> {
    match &args.command {
        Command::List { root, mode, depth, sort, desc, json } => {
            if !root.exists() {
                return Err(format!("Root does not exist: {}", root.display()));
            }
            let comparator = comparator_for(*sort, *desc);
            let result = walk(
                &Entry::new(root.clone()),
                (*mode).into(),
                *depth,
                comparator.as_ref(),
                None,
            );
            print_entries(&result, *json)
        }

        Command::Search {
            pattern,
            roots,
            style,
            case_sensitive,
            first,
            mode,
            depth,
            sort,
            desc,
            json,
        } => {
            let mut flags = style.flag();
            if *case_sensitive {
                flags = flags | MatchFlags::CASE_SENSITIVE;
            }
            let roots: Vec<Entry> = roots.iter().map(|p| Entry::new(p.clone())).collect();
            let comparator = comparator_for(*sort, *desc);
            let result = search_by_name(
                pattern,
                &roots,
                &CliNameMatcher,
                flags,
                *first,
                (*mode).into(),
                comparator.as_ref(),
                *depth,
                None,
            );
            print_entries(&result, *json)
        }

        Command::Copy { src, dst, overwrite, preserve_timestamps, unbuffered, depth } => {
            run_transfer(
                TransferMode::Copy,
                src,
                dst,
                *overwrite,
                *preserve_timestamps,
                !*unbuffered,
                *depth,
                args.verbose,
            )
        }

        Command::Move { src, dst, overwrite, preserve_timestamps, unbuffered, depth } => {
            run_transfer(
                TransferMode::Move,
                src,
                dst,
                *overwrite,
                *preserve_timestamps,
                !*unbuffered,
                *depth,
                args.verbose,
            )
        }

        Command::Delete { roots, keep_dirs, depth } => {
            let roots: Vec<Entry> = roots.iter().map(|p| Entry::new(p.clone())).collect();
            let notifier = CliDeleteNotifier::new(args.verbose);
            let start = Instant::now();
            let deleted = delete_all_roots(&roots, !*keep_dirs, None, *depth, Some(&notifier));

            eprintln!(
                "Deleted {} entries in {}",
                deleted.len(),
                format_duration(start.elapsed())
            );
            let failed = *notifier.failed.lock().unwrap();
            if failed > 0 {
                Err(format!("{} entries could not be deleted", failed))
            } else {
                Ok(())
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_transfer(
    mode: TransferMode,
    src: &std::path::Path,
    dst: &std::path::Path,
    overwrite: OverwriteArg,
    preserve_timestamps: bool,
    buffered: bool,
    depth: Option<u32>,
    verbose: bool,
) -> Result<(), String> {
    if !src.exists() {
        return Err(format!("Source does not exist: {}", src.display()));
    }

    let batch = CliBatchNotifier::new(verbose, overwrite);
    let single = CliTransferNotifier::new();
    let start = Instant::now();

    let result = transfer_all(
        mode,
        &Entry::new(src.to_path_buf()),
        &Entry::new(dst.to_path_buf()),
        None,
        preserve_timestamps,
        buffered,
        depth,
        Some(&single),
        Some(&batch),
    );

    let counters = batch.counters();
    let total_bytes: u64 = result.iter().map(|e| e.size()).sum();
    eprintln!();
    eprintln!(
        "Summary: {} done, {} skipped, {} failed",
        counters.succeeded, counters.skipped, counters.failed
    );
    eprintln!("Bytes written: {}", format_bytes(total_bytes));
    eprintln!("Elapsed: {}", format_duration(start.elapsed()));

    if counters.failed > 0 {
        Err("One or more files failed to transfer".to_string())
    } else {
        Ok(())
    }
}
