//! Recursive walk of the source tree.

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Stage, StageReport};

use super::channel::send_blocking;

/// Walks a directory tree and emits every non-directory entry.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    /// Create a scanner rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Lazily walk the tree, yielding file paths in traversal order.
    ///
    /// Symlinks are not followed; a symlink is yielded like a file. The first
    /// walk error ends the sequence.
    pub fn files(&self) -> impl Iterator<Item = PipelineResult<PathBuf>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => None,
                Ok(entry) => Some(Ok(entry.into_path())),
                Err(source) => Some(Err(PipelineError::Walk {
                    root: self.root.clone(),
                    source,
                })),
            })
    }

    /// Send every file path downstream, then close the channel.
    ///
    /// Any walk error is fatal for the run.
    pub fn run(self, output: mpsc::Sender<PathBuf>) -> PipelineResult<StageReport> {
        let mut scanned = 0;
        for path in self.files() {
            let path = path?;
            tracing::trace!("Scanned {:?}", path);
            send_blocking(&output, path, Stage::Scanner)?;
            scanned += 1;
        }
        Ok(StageReport::new(Stage::Scanner, scanned))
    }

    /// Root directory being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
