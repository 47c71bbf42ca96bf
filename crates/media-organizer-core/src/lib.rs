pub mod classify;
pub mod consolidate;
pub mod date;
pub mod error;
pub mod executor;
pub mod group;
pub mod media;
pub mod planner;
pub mod scan;

use std::cell::Cell;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use classify::{Category, Classifier, FormatSets};
pub use consolidate::{consolidate, Consolidation, Merge};
pub use date::{DateSource, FsDateSource, TimestampPolicy, TimestampStrategy};
pub use error::OrganizeError;
pub use executor::{Executor, Outcome};
pub use group::{group_by_date, DateBuckets};
pub use media::MediaFile;
pub use planner::{PlacementDecision, Planner};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeOptions {
    /// Directory to scan; date folders are created directly inside it.
    pub root: PathBuf,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub timestamp: TimestampPolicy,
}

impl OrganizeOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            timestamp: TimestampPolicy::default(),
        }
    }
}

/// Per-folder tally, printed as the summary line of each date group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSummary {
    pub date: NaiveDate,
    /// Dates whose files were merged into this one
    #[serde(default)]
    pub merged_from: Vec<NaiveDate>,
    pub images: u64,
    pub raw: u64,
    pub videos: u64,
    pub failed: u64,
}

impl BucketSummary {
    pub fn new(date: NaiveDate, merged_from: Vec<NaiveDate>) -> Self {
        Self {
            date,
            merged_from,
            images: 0,
            raw: 0,
            videos: 0,
            failed: 0,
        }
    }

    fn count(&mut self, category: Category) {
        match category {
            Category::Raw => self.raw += 1,
            Category::Video => self.videos += 1,
            Category::Image => self.images += 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeResult {
    pub dry_run: bool,
    pub total_media: u64,
    /// Distinct dates before consolidation
    pub date_groups: u64,
    pub consolidated_groups: u64,
    pub buckets: Vec<BucketSummary>,
    pub files_moved: u64,
    /// Files a live run would have moved (dry-run only)
    pub files_planned: u64,
    pub files_in_place: u64,
    pub files_failed: u64,
    /// Per-file problems that did not stop the run
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Type alias for progress callback: (stage, current, total, message).
/// `total` is 0 while the total is not known yet.
pub type ProgressCallback = dyn Fn(&str, u64, u64, &str);

/// Throttled progress reporter; emits at most every 200ms or on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback,
    last_emit: Cell<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    const INTERVAL: Duration = Duration::from_millis(200);

    pub fn new(inner: &'a ProgressCallback) -> Self {
        let start = Instant::now();
        Self {
            inner,
            last_emit: Cell::new(start.checked_sub(Duration::from_secs(1)).unwrap_or(start)),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current >= total;
        if !is_done && !self.due() {
            return;
        }
        (self.inner)(stage, current, total, message);
    }

    /// Progress of a stage whose total is not known in advance.
    pub fn tick(&self, stage: &str, current: u64, message: &str) {
        if self.due() {
            (self.inner)(stage, current, 0, message);
        }
    }

    fn due(&self) -> bool {
        if self.last_emit.get().elapsed() < Self::INTERVAL {
            return false;
        }
        self.last_emit.set(Instant::now());
        true
    }
}

/// Run the whole pipeline: scan, group, consolidate, plan and move.
///
/// Only an invalid root is fatal. Per-file failures end up in
/// [`OrganizeResult::warnings`] and the run carries on.
pub fn organize(
    options: &OrganizeOptions,
    progress_callback: &ProgressCallback,
) -> anyhow::Result<OrganizeResult> {
    let strategy = TimestampStrategy::resolve(options.timestamp, &options.root);
    organize_with(
        options,
        &Classifier::default(),
        &FsDateSource::new(strategy),
        progress_callback,
    )
}

/// [`organize`] with an explicit classifier and date source.
pub fn organize_with(
    options: &OrganizeOptions,
    classifier: &Classifier,
    dates: &dyn DateSource,
    progress_callback: &ProgressCallback,
) -> anyhow::Result<OrganizeResult> {
    let root = &options.root;
    if !root.exists() {
        return Err(OrganizeError::RootNotFound(root.clone()).into());
    }
    if !root.is_dir() {
        return Err(OrganizeError::RootNotDirectory(root.clone()).into());
    }

    let tp = ThrottledProgress::new(progress_callback);
    let mut result = OrganizeResult {
        dry_run: options.dry_run,
        ..OrganizeResult::default()
    };

    // Stage 1: Scan and date
    log::info!("Scanning for media files in: {}", root.display());
    let scan = scan::scan_media(root, classifier, dates, &tp);
    result.warnings.extend(scan.failures.iter().map(ToString::to_string));
    result.total_media = scan.media.len() as u64;
    tp.report("scan", result.total_media, result.total_media, "Scan complete");

    // Stage 2: Group
    let buckets = group_by_date(scan.media);
    result.date_groups = buckets.len() as u64;
    log::info!(
        "Found {} media files across {} dates",
        result.total_media,
        result.date_groups
    );
    if buckets.is_empty() {
        log::info!("No media files found.");
        return Ok(result);
    }

    // Stage 3: Consolidate
    let consolidation = consolidate(buckets);
    result.consolidated_groups = consolidation.buckets.len() as u64;
    log::info!("After consolidation: {} date groups", result.consolidated_groups);

    // Stage 4: Plan and execute, bucket by bucket
    let mut planner = Planner::new(root);
    let executor = Executor::new(root, options.dry_run);
    let total = result.total_media;
    let mut done = 0u64;

    for (date, files) in consolidation.buckets {
        let date_str = date.format(crate::planner::DATE_FOLDER_FORMAT).to_string();
        log::info!("Processing {} ({} files):", date_str, files.len());
        if options.dry_run {
            log::info!("  [DRY RUN] Would create folder: {date_str}");
        }

        let merged_from = consolidation
            .merges
            .iter()
            .filter(|m| m.into == date)
            .map(|m| m.absorbed)
            .collect();
        let mut summary = BucketSummary::new(date, merged_from);

        // One file at a time, so each placement sees the moves made before it.
        for file in files {
            let decision = planner.place(date, file);
            summary.count(decision.file.category);
            match executor.execute(&decision) {
                Outcome::Moved => result.files_moved += 1,
                Outcome::WouldMove => result.files_planned += 1,
                Outcome::InPlace => result.files_in_place += 1,
                Outcome::Failed(reason) => {
                    summary.failed += 1;
                    result.files_failed += 1;
                    result
                        .warnings
                        .push(format!("{}: {}", decision.file.path.display(), reason));
                }
            }
            done += 1;
            tp.report("move", done, total, "Organizing files");
        }

        log::info!(
            "  Summary: {} images, {} raw files, {} videos",
            summary.images,
            summary.raw,
            summary.videos
        );
        result.buckets.push(summary);
    }

    Ok(result)
}
