use std::collections::HashSet;

use chrono::{Days, NaiveDate};

use crate::group::DateBuckets;

/// One merge step: the files of `absorbed` went into the bucket for `into`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    pub absorbed: NaiveDate,
    pub into: NaiveDate,
}

#[derive(Debug, Default)]
pub struct Consolidation {
    pub buckets: DateBuckets,
    pub merges: Vec<Merge>,
}

/// Merge each date's bucket with the bucket of the following calendar day.
///
/// The walk is strictly pairwise over the sorted dates: a date absorbed into
/// its predecessor is skipped, so a run D, D+1, D+2 yields a bucket for D
/// (holding D and D+1) and a separate bucket for D+2. Merging only looks one
/// day ahead and never chains.
pub fn consolidate(mut buckets: DateBuckets) -> Consolidation {
    let dates: Vec<NaiveDate> = buckets.keys().copied().collect();
    let mut skip: HashSet<NaiveDate> = HashSet::new();
    let mut result = Consolidation::default();

    for (i, &current) in dates.iter().enumerate() {
        if skip.contains(&current) {
            continue;
        }
        let mut files = buckets.remove(&current).unwrap_or_default();

        if let Some(&next) = dates.get(i + 1) {
            if current.checked_add_days(Days::new(1)) == Some(next) {
                files.extend(buckets.remove(&next).unwrap_or_default());
                skip.insert(next);
                log::info!("Merging {next} into {current}");
                result.merges.push(Merge {
                    absorbed: next,
                    into: current,
                });
            }
        }

        result.buckets.insert(current, files);
    }

    result
}
