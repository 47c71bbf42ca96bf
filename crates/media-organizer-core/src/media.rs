use std::path::PathBuf;

use chrono::NaiveDate;

use crate::classify::Category;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaFile {
    /// Current location on disk
    pub path: PathBuf,
    pub category: Category,
    /// Calendar date derived from the file's timestamps
    pub date: NaiveDate,
}

impl MediaFile {
    pub fn new(path: PathBuf, category: Category, date: NaiveDate) -> Self {
        Self {
            path,
            category,
            date,
        }
    }

    /// Just the filename, lossily converted for display and suffixing.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
