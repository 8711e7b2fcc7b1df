//! Turns scanned paths into dated [`Image`] records.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::ClassifyConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{Image, Stage, StageReport};

use super::channel::PipelineStage;
use super::metadata::{CaptureTime, MetadataDecoder};

/// Keeps only files that carry a capture timestamp and an allowed extension.
pub struct Classifier<D> {
    decoder: Arc<D>,
    config: ClassifyConfig,
    preserve_extension_case: bool,
}

impl<D: MetadataDecoder> Classifier<D> {
    /// Create a classifier using `decoder` for metadata.
    pub fn new(decoder: Arc<D>, config: ClassifyConfig) -> Self {
        Self {
            decoder,
            config,
            preserve_extension_case: false,
        }
    }

    /// Keep the extension's case as read instead of lower-casing it.
    pub fn preserve_extension_case(mut self, preserve: bool) -> Self {
        self.preserve_extension_case = preserve;
        self
    }

    /// Classify one file.
    ///
    /// Returns `Ok(None)` for files that are simply not dated images:
    /// undecodable metadata, no timestamp, or a disallowed extension.
    /// Failing to open the file is fatal.
    pub fn classify(&self, path: &Path) -> PipelineResult<Option<Image>> {
        let file = File::open(path).map_err(|source| PipelineError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let created_at = match self
            .decoder
            .decode(&mut reader)
            .and_then(|tags| tags.capture_date_time())
        {
            Ok(created_at) => created_at,
            Err(e) => {
                tracing::trace!("Skipping {:?}: {}", path, e);
                return Ok(None);
            }
        };
        drop(reader);

        let extension = match extension_of(path) {
            Some(ext) if self.config.allows(&ext) => ext,
            _ => {
                tracing::trace!("Skipping {:?}: extension not allowed", path);
                return Ok(None);
            }
        };
        let extension = if self.preserve_extension_case {
            extension
        } else {
            extension.to_lowercase()
        };

        Ok(Some(Image::new(path, extension, created_at)))
    }

    /// Classify every path from `input`, sending images to `output`.
    pub fn run(
        self,
        input: mpsc::Receiver<PathBuf>,
        output: mpsc::Sender<Image>,
    ) -> PipelineResult<StageReport> {
        let recognized = PipelineStage::new(Stage::Classifier, input, output)
            .run_blocking(|path| self.classify(&path))?;
        Ok(StageReport::new(Stage::Classifier, recognized))
    }
}

/// Extension of the file name including its leading dot, as written.
///
/// Everything from the last `.` of the final component, so ".jpg" (a file
/// named only by its extension) yields ".jpg" and "photo" yields `None`.
pub fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    name.rfind('.').map(|idx| name[idx..].to_string())
}
