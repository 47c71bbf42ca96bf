use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::media::MediaFile;

/// Files keyed by calendar date, iterated in ascending date order.
pub type DateBuckets = BTreeMap<NaiveDate, Vec<MediaFile>>;

/// Partition files into one bucket per distinct date.
pub fn group_by_date(files: impl IntoIterator<Item = MediaFile>) -> DateBuckets {
    let mut buckets = DateBuckets::new();
    for file in files {
        buckets.entry(file.date).or_default().push(file);
    }
    buckets
}
