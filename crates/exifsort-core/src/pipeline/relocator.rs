//! Moves classified images into the dated destination tree.

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::config::{ConflictPolicy, RelocateConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::types::{Image, Stage, StageReport};

/// Where an image ended up after [`Relocator::relocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Renamed from its source path to this target
    Moved(PathBuf),
    /// Already sitting at its target (a re-run, or a destination inside the source)
    InPlace(PathBuf),
}

impl Placement {
    /// Final path of the image.
    pub fn path(&self) -> &Path {
        match self {
            Placement::Moved(path) | Placement::InPlace(path) => path,
        }
    }
}

/// Renames images to `<destination>/<year>/<timestamp><ext>`.
pub struct Relocator {
    destination: PathBuf,
    config: RelocateConfig,
}

impl Relocator {
    /// Create a relocator writing under `destination`.
    pub fn new(destination: impl Into<PathBuf>, config: RelocateConfig) -> Self {
        Self {
            destination: destination.into(),
            config,
        }
    }

    /// Move one image into place.
    ///
    /// Missing parent directories are created; existing ones are fine. An
    /// image that already is its own target is left alone and is not a
    /// conflict. When some other file holds the target,
    /// [`ConflictPolicy::Overwrite`] lets `std::fs::rename` replace it and
    /// [`ConflictPolicy::Fail`] returns [`PipelineError::DestinationExists`].
    /// Moves across filesystems are not attempted; rename reports them as an
    /// error.
    pub fn relocate(&self, image: &Image) -> PipelineResult<Placement> {
        let target = image.destination_in(&self.destination);

        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir).map_err(|source| PipelineError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        if target.exists() {
            if same_file(&image.source_path, &target) {
                tracing::debug!("{:?} is already in place", target);
                return Ok(Placement::InPlace(target));
            }
            if self.config.on_conflict == ConflictPolicy::Fail {
                return Err(PipelineError::DestinationExists {
                    from: image.source_path.clone(),
                    to: target,
                });
            }
        }

        std::fs::rename(&image.source_path, &target).map_err(|source| PipelineError::Move {
            from: image.source_path.clone(),
            to: target.clone(),
            source,
        })?;

        tracing::debug!("Moved {:?} -> {:?}", image.source_path, target);
        Ok(Placement::Moved(target))
    }

    /// Move every image from `input` until the channel closes.
    ///
    /// Only real moves are counted; images already in place are not.
    pub fn run(self, mut input: mpsc::Receiver<Image>) -> PipelineResult<StageReport> {
        let mut moved = 0;
        while let Some(image) = input.blocking_recv() {
            if let Placement::Moved(_) = self.relocate(&image)? {
                moved += 1;
            }
        }
        Ok(StageReport::new(Stage::Relocator, moved))
    }

    /// Root of the destination tree.
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

// Paths may be spelled differently ("sorted/../sorted", symlinked roots), so
// fall back to comparing canonical forms.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn taken() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 9, 1)
            .unwrap()
            .and_hms_opt(7, 5, 3)
            .unwrap()
    }

    fn source_file(dir: &Path, name: &str, body: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_relocate_creates_dirs_and_moves() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let from = source_file(src.path(), "IMG_1.jpg", b"pixels");

        let relocator = Relocator::new(dst.path().join("sorted"), RelocateConfig::default());
        let to = relocator
            .relocate(&Image::new(&from, ".jpg", taken()))
            .unwrap();

        let to = match to {
            Placement::Moved(path) => path,
            other => panic!("expected a move, got {:?}", other),
        };
        assert_eq!(to, dst.path().join("sorted/2022/2022.09.01_07.05.03.jpg"));
        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"pixels");
    }

    #[test]
    fn test_existing_year_directory_is_fine() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dst.path().join("2022")).unwrap();
        let from = source_file(src.path(), "a.jpg", b"a");

        let relocator = Relocator::new(dst.path(), RelocateConfig::default());
        assert!(relocator.relocate(&Image::new(&from, ".jpg", taken())).is_ok());
    }

    #[test]
    fn test_overwrite_policy_replaces_existing_file() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let first = source_file(src.path(), "first.jpeg", b"first");
        let second = source_file(src.path(), "second.jpeg", b"second");

        let relocator = Relocator::new(dst.path(), RelocateConfig::default());
        let a = relocator
            .relocate(&Image::new(&first, ".jpeg", taken()))
            .unwrap();
        let b = relocator
            .relocate(&Image::new(&second, ".jpeg", taken()))
            .unwrap();

        assert_eq!(a.path(), b.path());
        assert_eq!(std::fs::read(b.path()).unwrap(), b"second");
        assert!(!first.exists());
        assert!(!second.exists());
        let entries = std::fs::read_dir(dst.path().join("2022")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_fail_policy_leaves_both_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let first = source_file(src.path(), "first.jpeg", b"first");
        let second = source_file(src.path(), "second.jpeg", b"second");

        let config = RelocateConfig {
            on_conflict: ConflictPolicy::Fail,
            ..Default::default()
        };
        let relocator = Relocator::new(dst.path(), config);
        let placed = relocator
            .relocate(&Image::new(&first, ".jpeg", taken()))
            .unwrap();
        let err = relocator
            .relocate(&Image::new(&second, ".jpeg", taken()))
            .unwrap_err();

        assert!(matches!(err, PipelineError::DestinationExists { .. }));
        assert_eq!(std::fs::read(placed.path()).unwrap(), b"first");
        assert!(second.exists());
    }

    #[test]
    fn test_image_at_its_target_is_left_alone_under_fail_policy() {
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dst.path().join("2022")).unwrap();
        let sorted = source_file(dst.path(), "2022/2022.09.01_07.05.03.jpg", b"kept");

        let config = RelocateConfig {
            on_conflict: ConflictPolicy::Fail,
            ..Default::default()
        };
        let placement = Relocator::new(dst.path(), config)
            .relocate(&Image::new(&sorted, ".jpg", taken()))
            .unwrap();

        assert_eq!(placement, Placement::InPlace(sorted.clone()));
        assert_eq!(std::fs::read(&sorted).unwrap(), b"kept");
    }

    #[test]
    fn test_in_place_matches_differently_spelled_destination() {
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dst.path().join("sorted/2022")).unwrap();
        let sorted = source_file(
            dst.path(),
            "sorted/2022/2022.09.01_07.05.03.jpg",
            b"kept",
        );

        let config = RelocateConfig {
            on_conflict: ConflictPolicy::Fail,
            ..Default::default()
        };
        let relocator = Relocator::new(dst.path().join("sorted/2022/.."), config);
        let placement = relocator
            .relocate(&Image::new(&sorted, ".jpg", taken()))
            .unwrap();

        assert!(matches!(placement, Placement::InPlace(_)));
        assert!(sorted.exists());
    }

    #[test]
    fn test_run_does_not_count_images_in_place() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dst.path().join("2022")).unwrap();
        let sorted = source_file(dst.path(), "2022/2022.09.01_07.05.03.jpg", b"kept");
        let later = taken() + chrono::Duration::seconds(1);

        let (tx, rx) = mpsc::channel(4);
        tx.try_send(Image::new(&sorted, ".jpg", taken())).unwrap();
        tx.try_send(Image::new(source_file(src.path(), "b.jpg", b"b"), ".jpg", later))
            .unwrap();
        drop(tx);

        let report = Relocator::new(dst.path(), RelocateConfig::default())
            .run(rx)
            .unwrap();
        assert_eq!(report, StageReport::new(Stage::Relocator, 1));
        assert!(sorted.exists());
    }

    #[test]
    fn test_missing_source_is_move_error() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let relocator = Relocator::new(dst.path(), RelocateConfig::default());

        let err = relocator
            .relocate(&Image::new(src.path().join("gone.jpg"), ".jpg", taken()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Move { .. }));
    }

    #[test]
    fn test_blocked_directory_is_create_dir_error() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        // A plain file where the year directory should go.
        std::fs::write(dst.path().join("2022"), b"not a dir").unwrap();
        let from = source_file(src.path(), "a.jpg", b"a");

        let relocator = Relocator::new(dst.path(), RelocateConfig::default());
        let err = relocator
            .relocate(&Image::new(&from, ".jpg", taken()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::CreateDir { .. }));
        assert!(from.exists());
    }

    #[test]
    fn test_run_counts_moves() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(4);
        let later = taken() + chrono::Duration::seconds(1);
        tx.try_send(Image::new(source_file(src.path(), "a.jpg", b"a"), ".jpg", taken()))
            .unwrap();
        tx.try_send(Image::new(source_file(src.path(), "b.jpg", b"b"), ".jpg", later))
            .unwrap();
        drop(tx);

        let report = Relocator::new(dst.path(), RelocateConfig::default())
            .run(rx)
            .unwrap();
        assert_eq!(report, StageReport::new(Stage::Relocator, 2));
    }
}
