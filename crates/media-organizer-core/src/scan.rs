use std::path::Path;

use walkdir::WalkDir;

use crate::classify::Classifier;
use crate::date::DateSource;
use crate::error::OrganizeError;
use crate::media::MediaFile;
use crate::ThrottledProgress;

/// Result of scanning a directory tree
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Media files with a readable date
    pub media: Vec<MediaFile>,
    /// Unreadable directories and media files whose date could not be read
    pub failures: Vec<OrganizeError>,
}

/// Recursively collect media files under `root` and date them.
///
/// Directory links are not followed, but a link to a regular file counts as
/// that file; dangling links are ignored. Non-media files are ignored. An
/// unreadable directory or a file whose date cannot be read is recorded in
/// [`ScanResult::failures`] and the scan carries on.
pub fn scan_media(
    root: &Path,
    classifier: &Classifier,
    dates: &dyn DateSource,
    progress: &ThrottledProgress,
) -> ScanResult {
    let mut result = ScanResult::default();
    let mut seen = 0u64;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let err = OrganizeError::unreadable(root, e);
                log::warn!("Skipping {err}");
                result.failures.push(err);
                continue;
            }
        };
        if !entry.path().is_file() {
            continue;
        }
        let Some(category) = classifier.classify_path(entry.path()) else {
            continue;
        };

        match dates.file_date(entry.path()) {
            Ok(date) => result.media.push(MediaFile::new(entry.into_path(), category, date)),
            Err(e) => {
                log::warn!("Error getting date: {e}");
                result.failures.push(e);
            }
        }
        seen += 1;
        progress.tick("scan", seen, "Scanning for media files");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    struct FixedDates(HashMap<PathBuf, NaiveDate>);

    impl DateSource for FixedDates {
        fn file_date(&self, path: &Path) -> Result<NaiveDate, OrganizeError> {
            self.0.get(path).copied().ok_or_else(|| {
                OrganizeError::metadata(path, std::io::Error::other("no date"))
            })
        }
    }

    #[test]
    fn test_scan_skips_unknown_and_failed() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("trip/day1");
        fs::create_dir_all(&nested).unwrap();
        let jpg = nested.join("a.JPG");
        let raw = dir.path().join("b.nef");
        let txt = dir.path().join("notes.txt");
        let undated = dir.path().join("c.mp4");
        for p in [&jpg, &raw, &txt, &undated] {
            fs::write(p, b"x").unwrap();
        }

        let d = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let dates = FixedDates(HashMap::from([
            (jpg.clone(), d),
            (raw.clone(), d),
            (txt.clone(), d),
        ]));
        let cb = |_: &str, _: u64, _: u64, _: &str| {};
        let progress = ThrottledProgress::new(&cb);

        let result = scan_media(dir.path(), &Classifier::default(), &dates, &progress);

        let mut found: Vec<_> = result.media.iter().map(|m| m.path.clone()).collect();
        found.sort();
        let mut expected = vec![jpg, raw];
        expected.sort();
        assert_eq!(found, expected);
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(
            &result.failures[0],
            OrganizeError::Metadata { path, .. } if *path == undated
        ));
    }

    fn no_progress(_: &str, _: u64, _: u64, _: &str) {}

    #[test]
    fn test_missing_root_recorded_as_unreadable() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("gone");
        let progress = ThrottledProgress::new(&no_progress);
        let dates = FixedDates(HashMap::new());

        let result = scan_media(&gone, &Classifier::default(), &dates, &progress);

        assert!(result.media.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(
            &result.failures[0],
            OrganizeError::Unreadable { path, .. } if *path == gone
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("a.jpg"), b"x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with privileges that ignore permissions.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let progress = ThrottledProgress::new(&no_progress);
        let dates = FixedDates(HashMap::new());
        let result = scan_media(dir.path(), &Classifier::default(), &dates, &progress);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(result.media.is_empty());
        assert!(result
            .failures
            .iter()
            .any(|f| matches!(f, OrganizeError::Unreadable { path, .. } if *path == locked)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_collected_dangling_is_not() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("real.jpg");
        fs::write(&target, b"x").unwrap();
        let link = dir.path().join("link.jpg");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing.jpg"), dir.path().join("dangling.jpg"))
            .unwrap();

        let d = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let dates = FixedDates(HashMap::from([(target.clone(), d), (link.clone(), d)]));
        let progress = ThrottledProgress::new(&no_progress);

        let result = scan_media(dir.path(), &Classifier::default(), &dates, &progress);

        let mut found: Vec<_> = result.media.iter().map(|m| m.path.clone()).collect();
        found.sort();
        assert_eq!(found, vec![link, target]);
        assert!(result.failures.is_empty());
    }
}
