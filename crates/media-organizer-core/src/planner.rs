use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::media::MediaFile;

/// Folder name used for a date bucket.
pub const DATE_FOLDER_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementDecision {
    pub file: MediaFile,
    pub destination: PathBuf,
    /// The file already sits at its destination and must not be touched.
    pub in_place: bool,
}

/// Assigns collision-free destinations for every file of a run.
///
/// Destinations claimed by earlier calls are remembered, so two files of the
/// same run never get the same path even before anything is moved.
pub struct Planner {
    root: PathBuf,
    claimed: HashSet<PathBuf>,
    // Last suffix handed out per base destination, to avoid re-probing.
    name_counters: HashMap<PathBuf, u32>,
}

impl Planner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            claimed: HashSet::new(),
            name_counters: HashMap::new(),
        }
    }

    pub fn date_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format(DATE_FOLDER_FORMAT).to_string())
    }

    pub fn target_dir(&self, date: NaiveDate, file: &MediaFile) -> PathBuf {
        let date_dir = self.date_dir(date);
        match file.category.folder_name() {
            Some(sub) => date_dir.join(sub),
            None => date_dir,
        }
    }

    /// Plan every file of one consolidated bucket.
    pub fn plan(&mut self, date: NaiveDate, files: Vec<MediaFile>) -> Vec<PlacementDecision> {
        files.into_iter().map(|f| self.place(date, f)).collect()
    }

    pub fn place(&mut self, date: NaiveDate, file: MediaFile) -> PlacementDecision {
        let dir = self.target_dir(date, &file);
        let Some(name) = file.path.file_name() else {
            // Walked entries always carry a file name.
            let destination = dir.join("file");
            return self.claim(file, destination, false);
        };
        let base = dir.join(name);

        if base == file.path && !self.claimed.contains(&base) {
            return self.claim(file, base, true);
        }

        let counter = self.name_counters.entry(base.clone()).or_insert(0);
        let destination = if *counter == 0 && !self.claimed.contains(&base) && !occupied(&base) {
            base
        } else {
            let stem = Path::new(name).file_stem().unwrap_or(name).to_os_string();
            let ext = Path::new(name).extension().map(|e| e.to_os_string());
            loop {
                *counter += 1;
                let candidate = dir.join(suffixed(&stem, ext.as_deref(), *counter));
                if !self.claimed.contains(&candidate) && !occupied(&candidate) {
                    break candidate;
                }
            }
        };

        self.claim(file, destination, false)
    }

    fn claim(&mut self, file: MediaFile, destination: PathBuf, in_place: bool) -> PlacementDecision {
        self.claimed.insert(destination.clone());
        PlacementDecision {
            file,
            destination,
            in_place,
        }
    }
}

fn suffixed(stem: &std::ffi::OsStr, ext: Option<&std::ffi::OsStr>, n: u32) -> OsString {
    let mut name = stem.to_os_string();
    name.push(format!("_{n}"));
    if let Some(ext) = ext {
        name.push(".");
        name.push(ext);
    }
    name
}

// symlink_metadata so that a dangling link still counts as taken.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
