use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use media_organizer_core::{OrganizeOptions, OrganizeResult, TimestampPolicy};

#[derive(Parser)]
#[command(name = "media-organizer", version, about = "Organize media files by date")]
struct Cli {
    /// Path to scan for media files
    path: PathBuf,

    /// Show what would be done without actually moving files
    #[arg(long)]
    dry_run: bool,

    /// Timestamp used to date files
    #[arg(long, value_enum, default_value_t = Timestamp::Auto)]
    timestamp: Timestamp,

    /// Print debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print warnings and the final summary
    #[arg(short, long)]
    quiet: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Timestamp {
    /// Creation time where the filesystem has one, else modification time
    Auto,
    Created,
    Modified,
}

impl From<Timestamp> for TimestampPolicy {
    fn from(t: Timestamp) -> Self {
        match t {
            Timestamp::Auto => TimestampPolicy::Auto,
            Timestamp::Created => TimestampPolicy::Created,
            Timestamp::Modified => TimestampPolicy::Modified,
        }
    }
}

fn init_logger(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet || cli.json {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    // Keep stdout clean for the JSON summary.
    let target = if cli.json {
        env_logger::Target::Stderr
    } else {
        env_logger::Target::Stdout
    };
    // Built from flags only; RUST_LOG is not consulted.
    env_logger::Builder::new()
        .filter_level(level)
        .target(target)
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            lvl => writeln!(buf, "{}: {}", lvl, record.args()),
        })
        .init();
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {pos} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn print_summary(result: &OrganizeResult) {
    println!();
    if result.dry_run {
        println!(
            "Dry run complete! {} file(s) would be moved. Use without --dry-run to actually move files.",
            result.files_planned
        );
    } else {
        println!(
            "Organization complete! {} moved, {} already in place, {} failed.",
            result.files_moved, result.files_in_place, result.files_failed
        );
    }
    if !result.warnings.is_empty() {
        println!("{} problem(s):", result.warnings.len());
        for w in &result.warnings {
            println!("  {w}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(&cli);

    if !cli.json {
        println!("Media File Organizer");
        println!("====================");
        if cli.dry_run {
            println!("DRY RUN MODE - No files will be moved");
        }
    }

    let mut options = OrganizeOptions::new(cli.path.clone());
    options.dry_run = cli.dry_run;
    options.timestamp = cli.timestamp.into();

    // Spinner only covers the scan; the per-file log takes over afterwards.
    let pb = if cli.quiet || cli.json {
        ProgressBar::hidden()
    } else {
        spinner()
    };
    let scan_pb = pb.clone();
    let on_progress = move |stage: &str, current: u64, total: u64, message: &str| {
        if stage == "scan" {
            scan_pb.set_position(current);
            scan_pb.set_message(message.to_string());
            if total > 0 && current >= total {
                scan_pb.finish_and_clear();
            }
        }
    };
    let result = media_organizer_core::organize(&options, &on_progress);
    pb.finish_and_clear();
    let result = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}
