//! # CLI Module
//!
//! Command-line interface for file-zen.
//!
//! ## Usage
//! ```bash
//! # Find files with identical content
//! file-zen scan ~/Documents --recursive --checksum
//!
//! # Write a (commented-out) removal script keeping the oldest copies
//! file-zen scan ~/Documents -r --checksum --delete-script dupes.sh
//!
//! # Copy photos into YYYY/MM folders
//! file-zen organize ~/Camera ~/Pictures -r --by-year --by-month --kind image
//!
//! # JSON output
//! file-zen scan ~/Documents --checksum --output json
//! ```

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use file_zen::core::catalog::Catalog;
use file_zen::core::fingerprint::FileKind;
use file_zen::core::grouping::KeepPolicy;
use file_zen::core::organize::{
    destination_example, destination_format, OrganizeConfig, SizeLimit, TransferMode,
};
use file_zen::core::pipeline::{OrganizeReport, ScanConfig, ScanReport, Task, TaskReport};
use file_zen::core::scanner::{count_files, WalkOptions};
use file_zen::error::{ConfigError, FileZenError, Result};
use file_zen::events::{Event, EventChannel, EventReceiver, Outcome};
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// file-zen - find duplicates, organize by date
#[derive(Parser, Debug)]
#[command(name = "file-zen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Copy or move files into a date-structured destination
    Organize(OrganizeArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Directory to scan
    root: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Match on content checksum
    #[arg(long)]
    checksum: bool,

    /// Match on file name
    #[arg(long)]
    name: bool,

    /// Match on file size
    #[arg(long)]
    size: bool,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Write a shell script removing redundant copies to this path
    #[arg(long, value_name = "PATH")]
    delete_script: Option<PathBuf>,

    /// Which copy the script keeps
    #[arg(long, default_value = "oldest")]
    keep: Keep,

    /// Make the script's rm lines live instead of commented out
    #[arg(long)]
    delete: bool,

    /// Load settings from a JSON file (flags add to it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Print a line for every file
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct OrganizeArgs {
    /// Directory to take files from
    source: Option<PathBuf>,

    /// Directory to place files under
    destination: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Move instead of copy
    #[arg(long = "move")]
    move_files: bool,

    /// Create a YYYY directory level
    #[arg(long)]
    by_year: bool,

    /// Create an MM directory level
    #[arg(long)]
    by_month: bool,

    /// Create a DD directory level
    #[arg(long)]
    by_day: bool,

    /// Replace existing files with the same name
    #[arg(long)]
    overwrite_same_name: bool,

    /// Replace existing files with the same size
    #[arg(long)]
    overwrite_same_size: bool,

    /// Only overwrite when the content is identical
    #[arg(long)]
    only_identical: bool,

    /// Skip files dated before this day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    not_before: Option<NaiveDate>,

    /// Skip files dated after this day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    not_after: Option<NaiveDate>,

    /// Skip files smaller than this (e.g. 500KB, 10MB)
    #[arg(long, value_name = "SIZE")]
    min_size: Option<SizeLimit>,

    /// Skip files larger than this
    #[arg(long, value_name = "SIZE")]
    max_size: Option<SizeLimit>,

    /// Only these extensions (e.g. "png, jpg tiff")
    #[arg(long, value_name = "LIST")]
    ext: Option<String>,

    /// Skip files without an extension
    #[arg(long)]
    skip_no_extension: bool,

    /// Only files of this kind
    #[arg(long)]
    kind: Option<Kind>,

    /// Include hidden files and directories
    #[arg(long)]
    include_hidden: bool,

    /// Load settings from a JSON file (flags add to it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Print a line for every file
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Keep {
    /// Keep the least recently modified copy
    Oldest,
    /// Keep the most recently modified copy
    Newest,
}

impl From<Keep> for KeepPolicy {
    fn from(keep: Keep) -> Self {
        match keep {
            Keep::Oldest => KeepPolicy::Oldest,
            Keep::Newest => KeepPolicy::Newest,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    All,
    Text,
    Image,
    Video,
}

impl From<Kind> for FileKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::All => FileKind::All,
            Kind::Text => FileKind::Text,
            Kind::Image => FileKind::Image,
            Kind::Video => FileKind::Video,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Organize(args) => run_organize(args),
    }
}

/// Expand a leading `~` to the home directory
fn expand_tilde(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path,
    }
}

/// Show paths under the home directory as `~/...`
fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf))
        .map(|rest| format!("~/{}", rest.display()))
        .unwrap_or_else(|| path.display().to_string())
}

fn load_config<T: DeserializeOwned>(path: &Path) -> std::result::Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn scan_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(&expand_tilde(path.clone()))?,
        None => ScanConfig {
            recurse: false,
            use_checksum: false,
            ..Default::default()
        },
    };

    if let Some(root) = &args.root {
        config.root = Some(expand_tilde(root.clone()));
    }
    config.recurse |= args.recursive;
    config.include_hidden |= args.include_hidden;
    config.use_checksum |= args.checksum;
    config.use_file_name |= args.name;
    config.use_file_size |= args.size;
    config.create_delete_script |= args.delete_script.is_some();
    config.delete_files |= args.delete;
    if args.config.is_none() {
        config.keep = args.keep.into();
    }

    Ok(config)
}

fn organize_config(args: &OrganizeArgs) -> Result<OrganizeConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(&expand_tilde(path.clone()))?,
        None => OrganizeConfig {
            recurse: false,
            ..Default::default()
        },
    };

    if let Some(source) = &args.source {
        config.source = Some(expand_tilde(source.clone()));
    }
    if let Some(destination) = &args.destination {
        config.destination = Some(expand_tilde(destination.clone()));
    }
    config.recurse |= args.recursive;
    config.include_hidden |= args.include_hidden;
    if args.move_files {
        config.mode = TransferMode::Move;
    }

    config.grouping.year |= args.by_year;
    config.grouping.month |= args.by_month;
    config.grouping.day |= args.by_day;

    let overwrite = &mut config.overwrite;
    overwrite.same_name |= args.overwrite_same_name;
    overwrite.same_size |= args.overwrite_same_size;
    overwrite.same_name_requires_identical |= args.only_identical;
    overwrite.same_size_requires_identical |= args.only_identical;

    let filters = &mut config.filters;
    if let Some(date) = args.not_before {
        filters.not_before_active = true;
        filters.not_before = date;
    }
    if let Some(date) = args.not_after {
        filters.not_after_active = true;
        filters.not_after = date;
    }
    if let Some(limit) = args.min_size {
        filters.min_size_active = true;
        filters.min_size = limit;
    }
    if let Some(limit) = args.max_size {
        filters.max_size_active = true;
        filters.max_size = limit;
    }
    if let Some(list) = &args.ext {
        filters.use_file_extension = true;
        filters.file_extensions = list.clone();
    }
    if let Some(kind) = args.kind {
        filters.use_system_file_type = true;
        filters.file_kind = kind.into();
    }
    filters.skip_files_without_extension |= args.skip_no_extension;

    Ok(config)
}

/// Files the walk will visit, when the root can be read up front
fn pre_count(root: Option<&Path>, options: WalkOptions) -> Option<u64> {
    let total = count_files(root?, options).ok()?;
    u64::try_from(total).ok()
}

/// Render events until the task drops its sender.
///
/// With a known total the files are shown on a bar, otherwise on a spinner.
fn spawn_event_thread(
    receiver: EventReceiver,
    output: OutputFormat,
    verbose: bool,
    total: Option<u64>,
) -> JoinHandle<()> {
    let progress = match (output, total) {
        (OutputFormat::Json, _) => None,
        (OutputFormat::Pretty, Some(total)) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed}] [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        }
        (OutputFormat::Pretty, None) => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed}] {pos} files {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        }
    };

    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = &progress else {
                continue;
            };
            match event {
                Event::Status(line) => {
                    pb.inc(1);
                    pb.set_message(display_path(&line.path));
                    if line.outcome == Outcome::Failed {
                        pb.println(format!("{}", style(&line.message).red()));
                    } else if verbose {
                        pb.println(format!("{}", style(&line.message).dim()));
                    }
                }
                Event::DuplicateFound { key, count } if verbose => {
                    pb.println(format!(
                        "{} {} ({} copies)",
                        style("≡").yellow(),
                        key,
                        count
                    ));
                }
                Event::Message(message) => pb.set_message(message),
                Event::Completed(_) | Event::Cancelled(_) | Event::Failed { .. } => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    })
}

/// Start a task, render its events and wait for the report
fn run_task(
    mut task: Task,
    output: OutputFormat,
    verbose: bool,
    total: Option<u64>,
) -> Result<TaskReport> {
    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_event_thread(receiver, output, verbose, total);

    task.start(sender);
    let report = task.wait();

    event_thread.join().ok();
    report
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let term = Term::stderr();
    let config = scan_config(&args)?;
    let task = Task::scan(config.clone())?;

    let mut total = None;
    if matches!(args.output, OutputFormat::Pretty) {
        print_header(&term);
        total = pre_count(config.root.as_deref(), config.walk_options());
        if config.criteria().is_empty() {
            term.write_line(&format!(
                "{}",
                style("No match criteria selected (use --checksum, --name or --size)").yellow()
            ))
            .ok();
        }
    }

    let TaskReport::Scan(report) = run_task(task, args.output, args.verbose, total)? else {
        return Ok(());
    };

    if let (Some(path), Some(script)) = (&args.delete_script, &report.delete_script) {
        let path = expand_tilde(path.clone());
        fs::write(&path, script).map_err(|source| FileZenError::Write {
            path: path.clone(),
            source,
        })?;
    }

    match args.output {
        OutputFormat::Pretty => print_scan_pretty(&term, &report, &config, &args),
        OutputFormat::Json => print_scan_json(&report, &config)?,
    }

    Ok(())
}

fn run_organize(args: OrganizeArgs) -> Result<()> {
    let term = Term::stderr();
    let config = organize_config(&args)?;
    let task = Task::organize(config.clone())?;

    let mut total = None;
    if matches!(args.output, OutputFormat::Pretty) {
        print_header(&term);
        term.write_line(&format!(
            "  Layout:  {}",
            style(destination_format(&config.grouping)).cyan()
        ))
        .ok();
        let example = destination_example(
            config.destination.as_deref(),
            &config.grouping,
            Local::now().date_naive(),
        );
        term.write_line(&format!("  Example: {}", style(example).dim())).ok();
        term.write_line("").ok();
        total = pre_count(config.source.as_deref(), config.walk_options());
    }

    let TaskReport::Organize(report) = run_task(task, args.output, args.verbose, total)? else {
        return Ok(());
    };

    match args.output {
        OutputFormat::Pretty => print_organize_pretty(&term, &report),
        OutputFormat::Json => print_organize_json(&report)?,
    }

    Ok(())
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("file-zen").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_scan_pretty(term: &Term, report: &ScanReport, config: &ScanConfig, args: &ScanArgs) {
    let summary = &report.summary;
    let headline = if report.cancelled {
        style("✗ Scan Cancelled").yellow().bold()
    } else {
        style("✓ Scan Complete").green().bold()
    };

    term.write_line("").ok();
    term.write_line(&headline.to_string()).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(summary.files_processed).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate sets found",
        style(report.sets.len()).cyan()
    ))
    .ok();

    let reclaimable: u64 = report
        .sets
        .iter()
        .map(|set| set.redundant_bytes(&report.catalog, config.keep))
        .sum();
    term.write_line(&format!(
        "  {} held by redundant copies",
        style(format_bytes(reclaimable)).yellow()
    ))
    .ok();

    if summary.errors > 0 {
        term.write_line(&format!("  {} errors", style(summary.errors).red()))
            .ok();
    }
    term.write_line("").ok();

    if report.sets.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("🎉").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Sets:").bold().underlined()))
            .ok();
        term.write_line("").ok();
        print_sets(term, report, config);
    }

    match (&args.delete_script, config.delete_files) {
        (Some(path), false) => {
            term.write_line(&format!(
                "{} {}",
                style("Dry-run script written to").dim(),
                display_path(path)
            ))
            .ok();
        }
        (Some(path), true) => {
            term.write_line(&format!(
                "{} {}",
                style("Removal script written to").yellow(),
                display_path(path)
            ))
            .ok();
        }
        (None, _) => {}
    }

    term.write_line(&format!(
        "{}",
        style("No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn print_sets(term: &Term, report: &ScanReport, config: &ScanConfig) {
    let catalog: &Catalog = &report.catalog;

    for (i, set) in report.sets.iter().enumerate() {
        term.write_line(&format!(
            "  {} {} ({} files)",
            style(format!("Set {}:", i + 1)).bold(),
            style(&set.key).yellow(),
            set.len()
        ))
        .ok();

        let keeper = set.keeper(catalog, config.keep);
        for record in set.ids.iter().filter_map(|id| catalog.get(id)) {
            let marker = if Some(record.id) == keeper {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!("    {} {}", marker, display_path(&record.path)))
                .ok();
        }
        term.write_line("").ok();
    }
}

fn print_scan_json(report: &ScanReport, config: &ScanConfig) -> Result<()> {
    let output = serde_json::json!({
        "summary": report.summary,
        "cancelled": report.cancelled,
        "sets": report.sets.iter().map(|set| {
            let keeper = set.keeper(&report.catalog, config.keep);
            serde_json::json!({
                "key": set.key,
                "keep": keeper.and_then(|id| report.catalog.get(&id)).map(|r| &r.path),
                "files": set.ids.iter()
                    .filter_map(|id| report.catalog.get(id))
                    .collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>(),
        "delete_script": report.delete_script,
    });

    print_json(&output)
}

fn print_organize_pretty(term: &Term, report: &OrganizeReport) {
    let summary = &report.summary;
    let headline = if report.cancelled {
        style("✗ Organize Cancelled").yellow().bold()
    } else {
        style("✓ Organize Complete").green().bold()
    };

    term.write_line("").ok();
    term.write_line(&headline.to_string()).ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} files processed in {:.1}s",
        style(summary.files_processed).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} written, {} renamed, {} skipped",
        style(summary.files_written).green(),
        style(report.with_outcome(Outcome::Renamed).count()).yellow(),
        style(summary.files_skipped).dim()
    ))
    .ok();

    if summary.errors > 0 {
        term.write_line(&format!("  {} errors:", style(summary.errors).red()))
            .ok();
        for line in report.with_outcome(Outcome::Failed) {
            term.write_line(&format!("    {}", line.message)).ok();
        }
    }
}

fn print_organize_json(report: &OrganizeReport) -> Result<()> {
    let output = serde_json::json!({
        "summary": report.summary,
        "cancelled": report.cancelled,
        "files": report.statuses,
    });

    print_json(&output)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| FileZenError::Write {
        path: PathBuf::from("<stdout>"),
        source: e.into(),
    })?;
    println!("{}", text);
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_organize_flags_into_config() {
        let cli = Cli::try_parse_from([
            "file-zen",
            "organize",
            "/src",
            "/dst",
            "-r",
            "--move",
            "--by-year",
            "--min-size",
            "10KB",
            "--ext",
            "png, jpg",
            "--kind",
            "image",
            "--not-before",
            "2022-01-01",
        ])
        .unwrap();

        let Commands::Organize(args) = cli.command else {
            panic!("Wrong command");
        };
        let config = organize_config(&args).unwrap();

        assert_eq!(config.source, Some(PathBuf::from("/src")));
        assert!(config.recurse);
        assert_eq!(config.mode, TransferMode::Move);
        assert!(config.grouping.year && !config.grouping.month);
        assert!(config.filters.min_size_active);
        assert_eq!(config.filters.min_size.bytes(), 10 * 1024);
        assert_eq!(config.filters.file_kind, FileKind::Image);
        assert_eq!(
            config.filters.not_before,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
    }

    #[test]
    fn parses_scan_flags_into_config() {
        let cli = Cli::try_parse_from([
            "file-zen",
            "scan",
            "/photos",
            "--checksum",
            "--delete-script",
            "out.sh",
            "--keep",
            "newest",
        ])
        .unwrap();

        let Commands::Scan(args) = cli.command else {
            panic!("Wrong command");
        };
        let config = scan_config(&args).unwrap();

        assert!(config.use_checksum && !config.use_file_name);
        assert!(config.create_delete_script && !config.delete_files);
        assert_eq!(config.keep, KeepPolicy::Newest);
        assert!(!config.recurse);
    }

    #[test]
    fn rejects_bad_size() {
        assert!(Cli::try_parse_from(["file-zen", "organize", "/a", "/b", "--min-size", "lots"])
            .is_err());
    }

    #[test]
    fn formats_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
