use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::DateSource;
use crate::error::OrganizeError;

/// Which timestamp the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Creation time if the filesystem reports one, else modification time.
    #[default]
    Auto,
    Created,
    Modified,
}

/// The concrete strategy, resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStrategy {
    /// Creation time, falling back to modification time per file.
    CreatedThenModified,
    ModifiedOnly,
}

impl TimestampStrategy {
    /// Resolve a policy against what the filesystem under `probe` supports.
    pub fn resolve(policy: TimestampPolicy, probe: &Path) -> Self {
        match policy {
            TimestampPolicy::Created => TimestampStrategy::CreatedThenModified,
            TimestampPolicy::Modified => TimestampStrategy::ModifiedOnly,
            TimestampPolicy::Auto => {
                let supported = fs::metadata(probe)
                    .and_then(|meta| meta.created())
                    .is_ok();
                log::debug!(
                    "Creation timestamps {} under {}",
                    if supported { "available" } else { "unavailable" },
                    probe.display()
                );
                if supported {
                    TimestampStrategy::CreatedThenModified
                } else {
                    TimestampStrategy::ModifiedOnly
                }
            }
        }
    }

    fn pick(self, meta: &Metadata) -> io::Result<SystemTime> {
        match self {
            TimestampStrategy::CreatedThenModified => meta.created().or_else(|_| meta.modified()),
            TimestampStrategy::ModifiedOnly => meta.modified(),
        }
    }
}

/// Reads dates from filesystem timestamps, in local time.
#[derive(Debug, Clone, Copy)]
pub struct FsDateSource {
    strategy: TimestampStrategy,
}

impl FsDateSource {
    pub fn new(strategy: TimestampStrategy) -> Self {
        Self { strategy }
    }
}

/// Local calendar date of a timestamp, `None` when chrono cannot represent it.
pub fn local_date(time: SystemTime) -> Option<NaiveDate> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(d) => (i64::try_from(d.as_secs()).ok()?, d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            let secs = i64::try_from(d.as_secs()).ok()?;
            match d.subsec_nanos() {
                0 => (-secs, 0),
                n => (-secs.checked_add(1)?, 1_000_000_000 - n),
            }
        }
    };
    let utc = DateTime::from_timestamp(secs, nanos)?;
    Some(utc.with_timezone(&Local).date_naive())
}

impl DateSource for FsDateSource {
    fn file_date(&self, path: &Path) -> Result<NaiveDate, OrganizeError> {
        let time = fs::metadata(path)
            .and_then(|meta| self.strategy.pick(&meta))
            .map_err(|e| OrganizeError::metadata(path, e))?;
        local_date(time).ok_or_else(|| {
            OrganizeError::metadata(path, io::Error::other("timestamp out of range"))
        })
    }
}
