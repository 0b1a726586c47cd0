//! dirsift - find duplicate, stale, large and empty files in a directory tree.
//!
//! Usage:
//!   dirsift scan [PATH]             Scan and show a summary with the tree
//!   dirsift files [PATH]            List files, optionally by category
//!   dirsift duplicates [PATH]       Show duplicate groups
//!   dirsift show [PATH] --id N      Look up one node by id
//!   dirsift export [PATH]           Export the scan to JSON
//!   dirsift --help                  Show help

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dirsift_analyze::{
    DuplicateReport, FileCategory, ScanSummary, age_of, files_in, format_age, format_size,
};
use dirsift_core::{
    FileFlags, FileNode, FileTree, NodeId, NodeKind, ScanConfig, ScanError, ScanResult,
};
use dirsift_scan::{ScanProgress, TreeScanner};

#[derive(Parser)]
#[command(
    name = "dirsift",
    version,
    about = "Find duplicate, stale, large and empty files",
    long_about = "dirsift walks a directory tree, hashes every file with BLAKE3 and \
                  flags duplicates, files not modified for years, large files and \
                  empty files."
)]
struct Cli {
    /// Number of files hashed per batch
    #[arg(long, global = true, default_value_t = dirsift_core::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Files untouched for longer than this many years are old
    #[arg(long, global = true, default_value_t = dirsift_core::DEFAULT_STALE_AFTER_YEARS)]
    stale_years: u32,

    /// Files bigger than this are large (e.g., "100MB", "1GB")
    #[arg(long, global = true, default_value = "100MB")]
    large_threshold: String,

    /// Hash the files of a batch in parallel
    #[arg(long, global = true)]
    parallel: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan and show summary
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum depth to display
        #[arg(short, long, default_value = "3")]
        depth: u32,
    },

    /// List scanned files
    Files {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only list files of this category (all, duplicate, old, large, empty)
        #[arg(short, long, default_value = "all")]
        category: FileCategory,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find duplicate files
    Duplicates {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a single node by id
    Show {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Node id as printed by `scan`
        #[arg(long)]
        id: u64,
    },

    /// Export scan results to JSON
    Export {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Scan settings shared by every subcommand.
struct ScanOptions {
    batch_size: usize,
    stale_years: u32,
    large_threshold: u64,
    parallel: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = ScanOptions {
        batch_size: cli.batch_size,
        stale_years: cli.stale_years,
        large_threshold: parse_size(&cli.large_threshold)
            .wrap_err_with(|| format!("Invalid size: {}", cli.large_threshold))?,
        parallel: cli.parallel,
    };

    match cli.command {
        Command::Scan { path, depth } => run_scan(&path, &options, depth),
        Command::Files {
            path,
            category,
            format,
        } => run_files(&path, &options, category, format),
        Command::Duplicates { path, format } => run_duplicates(&path, &options, format),
        Command::Show { path, id } => run_show(&path, &options, NodeId::new(id)),
        Command::Export { path, output } => run_export(&path, &options, output),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Scan `path` with the global options.
fn scan(path: &Path, options: &ScanOptions) -> Result<ScanResult> {
    let config = ScanConfig::builder()
        .root(path)
        .batch_size(options.batch_size)
        .stale_after_years(options.stale_years)
        .large_file_threshold(options.large_threshold)
        .parallel_hashing(options.parallel)
        .build()
        .map_err(ScanError::from)?;
    debug!(?config, "scan configuration");

    eprintln!("Scanning {}...", path.display());

    let scanner = TreeScanner::new();
    let progress = std::io::stderr()
        .is_terminal()
        .then(|| spawn_progress_printer(&scanner));

    let result = scanner.scan(&config);

    // Dropping the scanner closes the channel and ends the printer.
    drop(scanner);
    if let Some(handle) = progress {
        let _ = handle.join();
        eprintln!();
    }

    result.wrap_err_with(|| format!("Scan of {} failed", path.display()))
}

/// Redraw a single stderr status line for every progress update.
fn spawn_progress_printer(scanner: &TreeScanner) -> thread::JoinHandle<()> {
    let mut rx = scanner.subscribe();
    thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(progress) => eprint!("\r{}", progress_line(&progress)),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn progress_line(progress: &ScanProgress) -> String {
    format!(
        "  {} items ({} files, {} dirs), {}, {:.0} files/s, {} warnings",
        progress.total_items(),
        progress.files_scanned,
        progress.dirs_scanned,
        format_size(progress.bytes_scanned),
        progress.files_per_second(),
        progress.errors_count
    )
}

/// Run a scan and display the summary and tree.
fn run_scan(path: &Path, options: &ScanOptions, max_depth: u32) -> Result<()> {
    let result = scan(path, options)?;
    let summary = ScanSummary::from_records(&result.all_files);

    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} - {}",
        result.root_path.display(),
        format_size(result.total_size())
    );
    println!(
        " {} files, {} directories",
        result.file_count, result.dir_count
    );
    println!(" Scanned in {:.2}s", result.elapsed.as_secs_f64());
    println!("{}", "─".repeat(60));
    println!();

    let total = summary.total_files().max(1);
    for stats in &summary.categories {
        println!(
            "   {:<20} {:>8} {:>12}  {}",
            stats.category.title(),
            stats.file_count,
            format_size(stats.total_size),
            make_bar(stats.file_count as f64 / total as f64, 20)
        );
    }
    println!();

    print_node(&result.tree, result.root(), 0, max_depth);

    if result.has_warnings() {
        println!();
        println!("{} warning(s) during scan", result.warnings.len());
    }

    Ok(())
}

/// List files, filtered by category.
fn run_files(
    path: &Path,
    options: &ScanOptions,
    category: FileCategory,
    format: OutputFormat,
) -> Result<()> {
    let result = scan(path, options)?;
    let files = files_in(&result.all_files, category);

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(100));
            println!(" {} ({})", category.title(), files.len());
            println!("{}", "─".repeat(100));

            if files.is_empty() {
                println!(" No files found.");
            } else {
                println!(
                    " {:<30} {:<44} {:>10}  {}",
                    "Name", "Path", "Size", "Last Modified"
                );
                for file in files {
                    println!(
                        " {:<30} {:<44} {:>10}  {}",
                        truncate(&file.name, 30),
                        truncate(&file.path.display().to_string(), 44),
                        format_size(file.size),
                        format_time(file.timestamps.modified)
                    );
                }
            }
            println!();
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&files)?);
        }
    }

    Ok(())
}

/// Show duplicate groups.
fn run_duplicates(path: &Path, options: &ScanOptions, format: OutputFormat) -> Result<()> {
    let result = scan(path, options)?;
    let report = DuplicateReport::from_records(&result.all_files);

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate File Report");
            println!("{}", "─".repeat(70));
            println!();

            if report.groups.is_empty() {
                println!(" No duplicate files found.");
            } else {
                println!(
                    " Found {} duplicate groups ({} files)",
                    report.group_count,
                    report.total_duplicate_files()
                );
                println!(
                    " Total wasted space: {}",
                    format_size(report.total_wasted_space)
                );
                println!();

                for (i, group) in report.groups.iter().enumerate() {
                    println!(
                        " Group {} ({} files, {} each, {} wasted)",
                        i + 1,
                        group.count(),
                        format_size(group.size),
                        format_size(group.wasted_bytes)
                    );
                    for (id, path) in group.ids.iter().zip(&group.paths) {
                        println!("   #{:<6} {}", id, path.display());
                    }
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Look up one node by id.
fn run_show(path: &Path, options: &ScanOptions, id: NodeId) -> Result<()> {
    let result = scan(path, options)?;

    let Some(node) = result.find_by_id(id) else {
        println!("Node #{id} not found");
        return Ok(());
    };

    println!();
    println!(" Id:        #{}", node.id);
    println!(" Name:      {}", node.name);
    println!(" Path:      {}", node.path.display());
    match &node.kind {
        NodeKind::Directory { children } => {
            println!(" Kind:      directory");
            println!(" Children:  {}", children.len());
        }
        NodeKind::File(record) => {
            println!(" Kind:      file");
            println!(" Size:      {}", format_size(record.size));
            println!(
                " Modified:  {} ({} ago)",
                format_time(record.timestamps.modified),
                format_age(age_of(record, result.scanned_at))
            );
            if let Some(created) = record.timestamps.created {
                println!(" Created:   {}", format_time(created));
            }
            if !record.extension.is_empty() {
                println!(" Extension: {}", record.extension);
            }
            match &record.digest {
                Some(hash) => println!(" BLAKE3:    {hash}"),
                None => println!(" BLAKE3:    (unreadable)"),
            }
            println!(" Flags:     {}", flag_list(&record.flags));
        }
    }
    println!();

    Ok(())
}

/// Export scan results to JSON.
fn run_export(path: &Path, options: &ScanOptions, output: Option<PathBuf>) -> Result<()> {
    let result = scan(path, options)?;

    let json = serde_json::to_string_pretty(&result)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .wrap_err_with(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{json}");
        }
    }

    Ok(())
}

/// Print a node and its children.
fn print_node(tree: &FileTree, node: &FileNode, depth: u32, max_depth: u32) {
    let indent = "  ".repeat(depth as usize);
    let dir_marker = if node.is_dir() { "/" } else { "" };
    let name = if depth == 0 {
        node.path.display().to_string()
    } else {
        node.name.to_string()
    };

    let detail = match node.record() {
        Some(record) => format!("{:>10} {}", format_size(record.size), flag_markers(&record.flags)),
        None => format!("{:>10}", format!("{} items", node.child_count())),
    };

    println!(
        "{}{}{:<40} {:>7} {}",
        indent,
        if node.is_dir() { "▼ " } else { "  " },
        truncate(&format!("{name}{dir_marker}"), 40),
        format!("#{}", node.id),
        detail
    );

    if node.is_dir() && depth < max_depth {
        for child in tree.children(node.id) {
            print_node(tree, child, depth + 1, max_depth);
        }
    } else if node.child_count() > 0 {
        let indent = "  ".repeat((depth + 1) as usize);
        println!("{}  ... {} more", indent, node.child_count());
    }
}

/// One-letter markers: D(uplicate), O(ld), L(arge), E(mpty).
fn flag_markers(flags: &FileFlags) -> String {
    [
        (flags.is_duplicate, 'D'),
        (flags.is_old, 'O'),
        (flags.is_large, 'L'),
        (flags.is_empty, 'E'),
    ]
    .iter()
    .map(|&(set, c)| if set { c } else { '·' })
    .collect()
}

fn flag_list(flags: &FileFlags) -> String {
    let names: Vec<&str> = [
        (flags.is_duplicate, "duplicate"),
        (flags.is_old, "old"),
        (flags.is_large, "large"),
        (flags.is_empty, "empty"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|&(_, name)| name)
    .collect();

    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate a string to max characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits = s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
    let unit = &s[digits.len()..];

    let multiplier: u64 = match unit {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        other => return Err(eyre!("unknown size unit {other:?}")),
    };
    let num: f64 = digits.parse()?;

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("100MB").unwrap(), 100 * 1024 * 1024);
        assert_eq!(parse_size("1k").unwrap(), 1024);
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size("1.5G").unwrap(), 3 * 512 * 1024 * 1024);
        assert!(parse_size("10XB").is_err());
        assert!(parse_size("MB").is_err());
    }

    #[test]
    fn test_scan_uses_global_options() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.bin"), vec![0u8; 10]).unwrap();
        std::fs::write(temp.path().join("b.bin"), vec![0u8; 10]).unwrap();
        let options = ScanOptions {
            batch_size: 1,
            stale_years: 5,
            large_threshold: 9,
            parallel: true,
        };

        let result = scan(temp.path(), &options).unwrap();

        assert_eq!(result.file_count, 2);
        assert!(result.all_files.iter().all(|f| f.flags.is_large && f.flags.is_duplicate));

        let bad = ScanOptions { batch_size: 0, ..options };
        assert!(scan(temp.path(), &bad).is_err());
    }

    #[test]
    fn test_progress_line() {
        let progress = ScanProgress {
            files_scanned: 30,
            dirs_scanned: 2,
            bytes_scanned: 2048,
            current_path: PathBuf::from("/data"),
            errors_count: 1,
            elapsed: std::time::Duration::from_secs(3),
        };
        assert_eq!(
            progress_line(&progress),
            "  32 items (30 files, 2 dirs), 2 KiB, 10 files/s, 1 warnings"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_flag_markers() {
        let flags = FileFlags {
            is_duplicate: true,
            is_empty: true,
            ..Default::default()
        };
        assert_eq!(flag_markers(&flags), "D··E");
        assert_eq!(flag_list(&flags), "duplicate, empty");
        assert_eq!(flag_list(&FileFlags::default()), "none");
    }

    #[test]
    fn test_cli_parses_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dirsift", "files", "/tmp", "--category", "large", "--batch-size", "3", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.batch_size, 3);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Files {
                category: FileCategory::Large,
                ..
            }
        ));
    }
}
