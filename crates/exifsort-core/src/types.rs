//! Core data types passed between and reported by the pipeline stages.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the three pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Walks the source tree
    Scanner,
    /// Reads capture timestamps and filters to images
    Classifier,
    /// Moves images into the destination tree
    Relocator,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Scanner => write!(f, "scanner"),
            Stage::Classifier => write!(f, "classifier"),
            Stage::Relocator => write!(f, "relocator"),
        }
    }
}

/// A file confirmed to be a recognizable, timestamped image.
///
/// Built once by the classifier and consumed once by the relocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Where the file currently lives
    pub source_path: PathBuf,

    /// Extension with its leading dot, e.g. ".jpg"
    pub extension: String,

    /// Capture time read from embedded metadata
    pub created_at: NaiveDateTime,

    /// `<year>/<year>.<month>.<day>_<hour>.<minute>.<second><extension>`
    pub destination_relative_path: PathBuf,
}

impl Image {
    /// Build an image record, deriving its destination path.
    pub fn new(
        source_path: impl Into<PathBuf>,
        extension: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        let extension = extension.into();
        let destination_relative_path = destination_path(&created_at, &extension);
        Self {
            source_path: source_path.into(),
            extension,
            created_at,
            destination_relative_path,
        }
    }

    /// Destination of this image under `root`.
    pub fn destination_in(&self, root: &Path) -> PathBuf {
        root.join(&self.destination_relative_path)
    }
}

/// Derive the relative destination path for a capture time and extension.
///
/// Numeric fields are padded to at least two digits, never truncated.
pub fn destination_path(created_at: &NaiveDateTime, extension: &str) -> PathBuf {
    let year = created_at.year();
    let dir = format!("{:02}", year);
    let file = format!(
        "{:02}.{:02}.{:02}_{:02}.{:02}.{:02}{}",
        year,
        created_at.month(),
        created_at.day(),
        created_at.hour(),
        created_at.minute(),
        created_at.second(),
        extension
    );
    PathBuf::from(dir).join(file)
}

/// Count reported by a stage that drained its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Which stage finished
    pub stage: Stage,
    /// Files emitted, images recognized, or images moved
    pub count: u64,
}

impl StageReport {
    pub fn new(stage: Stage, count: u64) -> Self {
        Self { stage, count }
    }

    /// Human-readable summary line for this stage.
    pub fn summary(&self) -> String {
        match self.stage {
            Stage::Scanner => format!("Files scanned: {}", self.count),
            Stage::Classifier => format!("Images recognized: {}", self.count),
            Stage::Relocator => format!("Images moved: {}", self.count),
        }
    }
}

/// Totals for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Non-directory entries found under the source
    pub files_scanned: u64,
    /// Files with a capture timestamp and an allowed extension
    pub images_recognized: u64,
    /// Files moved into the destination tree
    pub images_moved: u64,
}

impl RunReport {
    /// Fold a finished stage's count into the totals.
    pub fn record(&mut self, report: StageReport) {
        match report.stage {
            Stage::Scanner => self.files_scanned = report.count,
            Stage::Classifier => self.images_recognized = report.count,
            Stage::Relocator => self.images_moved = report.count,
        }
    }
}
