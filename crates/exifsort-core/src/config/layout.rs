//! Source and destination directories for a single run.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Where to read unsorted files from and where to build the sorted tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Directory walked for candidate files
    pub source: PathBuf,
    /// Root of the `<year>/...` tree, created on demand
    pub destination: PathBuf,
}

impl Layout {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Check both directories before any stage starts.
    ///
    /// Checks:
    /// - Neither path is empty
    /// - Source exists and is a directory
    /// - Destination is either absent or can be stat'ed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.as_os_str().is_empty() {
            return Err(ConfigError::MissingSource);
        }
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::MissingDestination);
        }

        let meta = std::fs::metadata(&self.source).map_err(|e| inaccessible(&self.source, e))?;
        if !meta.is_dir() {
            return Err(ConfigError::SourceNotDirectory(self.source.clone()));
        }

        match std::fs::metadata(&self.destination) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(inaccessible(&self.destination, e)),
        }
    }
}

fn inaccessible(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::Inaccessible {
        path: path.to_path_buf(),
        source,
    }
}
