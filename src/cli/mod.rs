//! # CLI Module
//!
//! Command-line interface for snapshot reconciliation.
//!
//! ## Usage
//! ```bash
//! # Which files on the laptop are missing from the backup?
//! snapcmp compare files ~/Documents /mnt/backup/Documents --singles-only
//!
//! # Directories that exist in both, compared by size only
//! snapcmp compare dirs left.json right.json --ignore-modified
//!
//! # Snapshot a directory for later comparison
//! snapcmp scan /mnt/backup --save backup.json
//!
//! # Totals and a regex search over a snapshot
//! snapcmp info backup.json --find '\.(iso|img)$'
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use snapshot_reconcile::core::comparator::DEFAULT_TOLERANCE_SECS;
use snapshot_reconcile::core::partner::MatchMode;
use snapshot_reconcile::core::persist::save_snapshot;
use snapshot_reconcile::core::pipeline::{load_tree, Pipeline, Report, ReportFilter};
use snapshot_reconcile::core::scanner::{path_string, ScanConfig, ScanPaths, TreeScanner, WalkDirScanner};
use snapshot_reconcile::core::search::{search, SearchReport};
use snapshot_reconcile::core::tree::{format_bytes, TreeStats};
use snapshot_reconcile::core::verify::{RemapRule, Verification};
use snapshot_reconcile::error::{ReconcileError, Result};
use snapshot_reconcile::events::{
    null_sender, Event, EventChannel, MatchEvent, PipelineEvent, ScanEvent, VerifyEvent,
};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// snapcmp - Reconcile two filesystem snapshots
#[derive(Parser, Debug)]
#[command(name = "snapcmp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find partners of left-hand entries in the right-hand tree
    Compare(CompareArgs),

    /// Scan a directory and save it as a snapshot
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Only scan these paths (exact match)
        #[arg(long)]
        only: Vec<PathBuf>,

        /// Skip these paths (exact match)
        #[arg(long)]
        skip: Vec<PathBuf>,

        /// Snapshot file to write
        #[arg(long, default_value = "scan.json")]
        save: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show totals of a directory or snapshot, optionally searching it
    Info {
        /// Directory or snapshot file
        path: PathBuf,

        /// Find paths matching this regex
        #[arg(long)]
        find: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(clap::Args, Debug)]
struct CompareArgs {
    /// What to match
    mode: Mode,

    /// Directory or snapshot whose entries look for partners
    left: PathBuf,

    /// Directory or snapshot to search for partners
    right: PathBuf,

    /// Compare sizes only, ignoring modification times
    #[arg(long)]
    ignore_modified: bool,

    /// Accepted modification-time difference in seconds
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_SECS)]
    tolerance: f64,

    /// Only list partners
    #[arg(long, conflicts_with = "singles_only")]
    partners_only: bool,

    /// Only list entries without partner
    #[arg(long)]
    singles_only: bool,

    /// Only scan these paths (exact match); directory scans only
    #[arg(long)]
    only: Vec<PathBuf>,

    /// Skip these paths (exact match); directory scans only
    #[arg(long)]
    skip: Vec<PathBuf>,

    /// Save the left scan as a snapshot
    #[arg(long)]
    save_left: Option<PathBuf>,

    /// Save the right scan as a snapshot
    #[arg(long)]
    save_right: Option<PathBuf>,

    /// Keep only paths matching this regex (repeatable)
    #[arg(long)]
    include: Vec<String>,

    /// Drop paths matching this regex (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Virtual root for the left tree
    #[arg(long)]
    rewrite_left: Option<String>,

    /// Virtual root for the right tree
    #[arg(long)]
    rewrite_right: Option<String>,

    /// Remap left paths for verification, OLD=NEW or NEW for the root
    #[arg(long)]
    remap_left: Vec<String>,

    /// Remap right paths for verification, OLD=NEW or NEW for the root
    #[arg(long)]
    remap_right: Vec<String>,

    /// Hash matched files to confirm their contents
    #[arg(long)]
    verify: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Match non-empty directories by structure
    Dirs,
    /// Match individual files
    Files,
}

impl From<Mode> for MatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Dirs => MatchMode::Directories,
            Mode::Files => MatchMode::Files,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare(args) => {
            snapshot_reconcile::init_tracing(args.verbose);
            run_compare(args)
        }
        Commands::Scan {
            path,
            only,
            skip,
            save,
            verbose,
        } => {
            snapshot_reconcile::init_tracing(verbose);
            run_scan(&path, &only, &skip, &save)
        }
        Commands::Info {
            path,
            find,
            verbose,
        } => {
            snapshot_reconcile::init_tracing(verbose);
            run_info(&path, find.as_deref())
        }
    }
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(args.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("snapcmp").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
    }

    let filter = if args.partners_only {
        ReportFilter::PartnersOnly
    } else if args.singles_only {
        ReportFilter::SinglesOnly
    } else {
        ReportFilter::All
    };

    let mut builder = Pipeline::builder()
        .left(&args.left)
        .right(&args.right)
        .mode(args.mode.into())
        .ignore_time(args.ignore_modified)
        .tolerance_secs(args.tolerance)
        .include(args.include)
        .exclude(args.exclude)
        .scan_paths(scan_paths(&args.only, &args.skip)?)
        .remap_left(args.remap_left.iter().map(|r| RemapRule::parse(r)).collect())
        .remap_right(args.remap_right.iter().map(|r| RemapRule::parse(r)).collect())
        .verify(args.verify);
    if let Some(path) = args.save_left {
        builder = builder.save_left(path);
    }
    if let Some(path) = args.save_right {
        builder = builder.save_right(path);
    }
    if let Some(root) = args.rewrite_left {
        builder = builder.rewrite_left(root);
    }
    if let Some(root) = args.rewrite_right {
        builder = builder.rewrite_right(root);
    }
    let pipeline = builder.build()?;

    let (sender, receiver) = EventChannel::new();
    let progress = pretty.then(spinner);
    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Started { root }) => {
                    pb.set_message(format!("Scanning {}", root.display()));
                }
                Event::Scan(ScanEvent::Progress { entries_scanned }) => {
                    pb.set_message(format!("Scanning... {} entries", entries_scanned));
                }
                Event::Match(MatchEvent::Progress(p)) => {
                    pb.set_message(format!("Matching {}/{}", p.completed, p.total));
                }
                Event::Verify(VerifyEvent::Progress { completed, total }) => {
                    pb.set_message(format!("Verifying {}/{}", completed, total));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    let report = result?;

    match args.output {
        OutputFormat::Pretty => print_pretty_report(&report, filter),
        OutputFormat::Json => print_json_report(&report, filter)?,
        OutputFormat::Minimal => print_minimal_report(&report, filter),
    }

    Ok(())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn scan_paths(only: &[PathBuf], skip: &[PathBuf]) -> Result<ScanPaths> {
    let absolute = |paths: &[PathBuf]| -> Vec<String> {
        paths
            .iter()
            .map(|p| path_string(&std::path::absolute(p).unwrap_or_else(|_| p.clone())))
            .collect()
    };
    Ok(ScanPaths::new(absolute(only), absolute(skip))?)
}

fn print_pretty_report(report: &Report, filter: ReportFilter) {
    let out = Term::stdout();

    print_side(&out, "left", &report.left.root, report.left.before_filter, report.left.after_filter);
    print_side(&out, "right", &report.right.root, report.right.before_filter, report.right.after_filter);
    for warning in &report.warnings {
        out.write_line(&format!("{} {}", style("warning:").yellow(), warning))
            .ok();
    }
    out.write_line("").ok();

    if filter.shows_partners() {
        out.write_line(&format!("{} partners found.", style(report.partners.len()).cyan()))
            .ok();
        for partner in &report.partners {
            let verdict = match partner.verification {
                Some(Verification::Confirmed) => format!(" {}", style("[confirmed]").green()),
                Some(Verification::Refuted) => format!(" {}", style("[contents differ]").red().bold()),
                Some(Verification::Unknown) => format!(" {}", style("[unreadable]").yellow()),
                None => String::new(),
            };
            out.write_line(&format!(
                "{} has partner {}{}",
                style(&partner.subject).green(),
                style(&partner.partner).blue(),
                verdict
            ))
            .ok();
        }
        if report.partners.iter().any(|p| p.verification.is_some()) {
            let (confirmed, refuted, unknown) = report.verification_counts();
            out.write_line(&format!(
                "  {} confirmed, {} differ, {} unreadable",
                style(confirmed).green(),
                style(refuted).red(),
                style(unknown).yellow()
            ))
            .ok();
        }
    }

    if filter.shows_singles() {
        out.write_line(&format!(
            "{} singles (without partner).",
            style(report.singles.len()).cyan()
        ))
        .ok();
        for single in &report.singles {
            out.write_line(&format!(
                "{} has no partner",
                style(single.display_path()).red()
            ))
            .ok();
        }
    }

    out.write_line("").ok();
    out.write_line(&format!(
        "{}",
        style(format!("Done in {:.1}s", report.duration_ms as f64 / 1000.0)).dim()
    ))
    .ok();
}

fn print_side(out: &Term, name: &str, root: &str, before: TreeStats, after: TreeStats) {
    out.write_line(&format!("{} root: {}", name, style(root).bold())).ok();
    if before == after {
        out.write_line(&format!("  {} found.", before)).ok();
    } else {
        out.write_line(&format!("  {} found, {} after filtering.", before, after))
            .ok();
    }
}

fn print_json_report(report: &Report, filter: ReportFilter) -> Result<()> {
    let json = serde_json::to_string_pretty(&report.filtered(filter))
        .map_err(|e| ReconcileError::Config(format!("cannot render report: {e}")))?;
    println!("{}", json);
    Ok(())
}

fn print_minimal_report(report: &Report, filter: ReportFilter) {
    for line in report.minimal_lines(filter) {
        println!("{}", line);
    }
}

fn run_scan(path: &Path, only: &[PathBuf], skip: &[PathBuf], save: &Path) -> Result<()> {
    let term = Term::stderr();
    let paths = scan_paths(only, skip)?;
    let scanner = WalkDirScanner::new(ScanConfig::default());

    term.write_line(&format!("scanning {}...", path.display())).ok();
    let outcome = scanner.scan(path, &paths)?;
    for warning in &outcome.warnings {
        term.write_line(&format!("{} {}", style("warning:").yellow(), warning))
            .ok();
    }

    save_snapshot(&outcome.tree, save)?;
    term.write_line(&format!(
        "{} {} entries saved to {}",
        style("✓").green().bold(),
        outcome.entries_scanned,
        save.display()
    ))
    .ok();
    Ok(())
}

fn run_info(path: &Path, find: Option<&str>) -> Result<()> {
    let pattern = find
        .map(|p| {
            Regex::new(p).map_err(|source| snapshot_reconcile::error::FilterError::InvalidPattern {
                pattern: p.to_string(),
                source,
            })
        })
        .transpose()?;

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let loaded = load_tree(&absolute, &ScanConfig::default(), &ScanPaths::all(), &null_sender())?;
    let mut tree = loaded.tree;
    tree.reduce_sizes();

    let out = Term::stdout();
    let index = tree.index()?;
    let root = tree.common_root()?;
    out.write_line(&format!("{} found.", TreeStats::from_index(&index)))
        .ok();
    out.write_line(&format!("root: {}", root)).ok();

    if let Some(pattern) = pattern {
        let report = search(&index, &pattern);
        print_search(&out, &report, root.len() + 1);
    }
    Ok(())
}

fn print_search(out: &Term, report: &SearchReport, root_len: usize) {
    out.write_line("results:").ok();
    for hit in &report.hits {
        let mut text = String::new();
        for segment in hit.segments(root_len) {
            let styled = if segment.highlighted {
                style(segment.text).green()
            } else if hit.is_dir {
                style(segment.text).yellow()
            } else {
                style(segment.text).blue()
            };
            text.push_str(&styled.to_string());
        }
        if hit.is_dir {
            text.push('/');
        }
        out.write_line(&format!("{} ({})", text, format_bytes(hit.size)))
            .ok();
    }

    out.write_line(&format!(
        "{} results found ({} files, {} directories).",
        style(report.hits.len()).red(),
        report.files,
        report.directories
    ))
    .ok();
    out.write_line(&format!(
        "total size: {}",
        style(format_bytes(report.total_size)).red()
    ))
    .ok();
    if report.total_size != report.files_size {
        out.write_line(&format!(
            "files only: {}",
            style(format_bytes(report.files_size)).red()
        ))
        .ok();
    }
}
