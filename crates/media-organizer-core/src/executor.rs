use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::OrganizeError;
use crate::planner::PlacementDecision;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Moved,
    WouldMove,
    InPlace,
    Failed(String),
}

/// Carries out placement decisions, or only describes them in dry-run mode.
pub struct Executor {
    root: PathBuf,
    dry_run: bool,
}

impl Executor {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// Execute one decision. Failures are reported, never propagated.
    pub fn execute(&self, decision: &PlacementDecision) -> Outcome {
        let name = decision.file.filename();
        if decision.in_place {
            log::debug!("  Already in place: {}", self.relative(&decision.destination));
            return Outcome::InPlace;
        }

        if self.dry_run {
            log::info!(
                "  [DRY RUN] Would move to {}: {} -> {}",
                decision.file.category.label(),
                name,
                self.relative(&decision.destination)
            );
            return Outcome::WouldMove;
        }

        match move_file(&decision.file.path, &decision.destination) {
            Ok(()) => {
                log::info!("  Moved: {} -> {}", name, self.relative(&decision.destination));
                Outcome::Moved
            }
            Err(e) => {
                log::warn!("  Error moving {name}: {e}");
                Outcome::Failed(e.to_string())
            }
        }
    }

    fn relative(&self, path: &Path) -> String {
        pathdiff::diff_paths(path, &self.root)
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}

/// Move a file, creating the destination's parent directories.
///
/// Tries a rename first; if that fails (for example across devices) the file
/// is copied with its modification time and the source removed. An existing
/// entry at `to` is never replaced, whatever its case on disk.
pub fn move_file(from: &Path, to: &Path) -> Result<(), OrganizeError> {
    let wrap = |source: io::Error| OrganizeError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    if fs::symlink_metadata(to).is_ok() {
        return Err(wrap(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        )));
    }

    if let Err(rename_err) = fs::rename(from, to) {
        log::debug!("rename {} failed ({rename_err}), copying", from.display());
        copy_then_remove(from, to).map_err(wrap)?;
    }
    Ok(())
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::metadata(from)?;
    let mut reader = fs::File::open(from)?;
    let mut writer = fs::OpenOptions::new().write(true).create_new(true).open(to)?;
    if let Err(e) = io::copy(&mut reader, &mut writer) {
        drop(writer);
        fs::remove_file(to).ok();
        return Err(e);
    }
    drop(writer);
    fs::set_permissions(to, meta.permissions()).ok();
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    filetime::set_file_mtime(to, mtime).ok();
    if let Err(e) = fs::remove_file(from) {
        // Leave a single copy behind rather than two.
        fs::remove_file(to).ok();
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::media::MediaFile;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn decision(from: PathBuf, to: PathBuf, category: Category) -> PlacementDecision {
        PlacementDecision {
            file: MediaFile::new(from, category, NaiveDate::from_ymd_opt(2022, 2, 2).unwrap()),
            destination: to,
            in_place: false,
        }
    }

    #[test]
    fn test_live_move_creates_dirs() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.cr3");
        fs::write(&src, b"raw-bytes").unwrap();
        let dst = dir.path().join("2022-02-02/RAW/a.cr3");

        let exec = Executor::new(dir.path(), false);
        let outcome = exec.execute(&decision(src.clone(), dst.clone(), Category::Raw));

        assert_eq!(outcome, Outcome::Moved);
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"raw-bytes");
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.mp4");
        fs::write(&src, b"video").unwrap();
        let dst = dir.path().join("2022-02-02/VIDEO/a.mp4");

        let exec = Executor::new(dir.path(), true);
        let outcome = exec.execute(&decision(src.clone(), dst.clone(), Category::Video));

        assert_eq!(outcome, Outcome::WouldMove);
        assert!(src.exists());
        assert!(!dir.path().join("2022-02-02").exists());
    }

    #[test]
    fn test_vanished_source_fails_without_panic() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("gone.jpg");
        let dst = dir.path().join("2022-02-02/gone.jpg");

        let exec = Executor::new(dir.path(), false);
        let outcome = exec.execute(&decision(src, dst.clone(), Category::Image));

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!dst.exists());
    }

    #[test]
    fn test_in_place_is_left_alone() {
        let dir = tempdir().unwrap();
        let placed = dir.path().join("2022-02-02/a.jpg");
        fs::create_dir_all(placed.parent().unwrap()).unwrap();
        fs::write(&placed, b"img").unwrap();

        let mut d = decision(placed.clone(), placed.clone(), Category::Image);
        d.in_place = true;
        assert_eq!(Executor::new(dir.path(), false).execute(&d), Outcome::InPlace);
        assert_eq!(fs::read(&placed).unwrap(), b"img");
    }

    #[test]
    fn test_existing_destination_is_not_replaced() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("IMG.JPG");
        fs::write(&src, b"second").unwrap();
        let dst = dir.path().join("2022-02-02/img.jpg");
        fs::create_dir_all(dst.parent().unwrap()).unwrap();
        fs::write(&dst, b"first").unwrap();

        let err = move_file(&src, &dst).unwrap_err();

        assert!(matches!(
            err,
            OrganizeError::Move { ref source, .. } if source.kind() == io::ErrorKind::AlreadyExists
        ));
        assert_eq!(fs::read(&src).unwrap(), b"second");
        assert_eq!(fs::read(&dst).unwrap(), b"first");
    }

    #[test]
    fn test_copy_refuses_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.png");
        let dst = dir.path().join("b.png");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        assert!(copy_then_remove(&src, &dst).is_err());
        assert_eq!(fs::read(&src).unwrap(), b"new");
        assert_eq!(fs::read(&dst).unwrap(), b"old");
    }

    #[test]
    fn test_copy_then_remove_keeps_mtime() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.png");
        fs::write(&src, b"png").unwrap();
        let stamp = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, stamp).unwrap();
        let dst = dir.path().join("b.png");

        copy_then_remove(&src, &dst).unwrap();

        assert!(!src.exists());
        let meta = fs::metadata(&dst).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&meta), stamp);
    }
}
