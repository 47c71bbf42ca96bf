pub mod timestamp;

use std::path::Path;

use chrono::NaiveDate;

use crate::error::OrganizeError;

pub use timestamp::{FsDateSource, TimestampPolicy, TimestampStrategy};

/// Anything that can tell which calendar day a file belongs to.
pub trait DateSource {
    fn file_date(&self, path: &Path) -> Result<NaiveDate, OrganizeError>;
}
