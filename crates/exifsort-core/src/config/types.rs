//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Pipeline settings for the handoff channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Items buffered between two stages. 1 is the tightest handoff the
    /// channel supports: a second send waits for the consumer.
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 1 }
    }
}

/// Classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Allowed extensions, without the leading dot, matched case-insensitively
    pub extensions: Vec<String>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "jpeg".to_string()],
        }
    }
}

impl ClassifyConfig {
    /// Check an extension (with or without its leading dot) against the allow-list.
    pub fn allows(&self, extension: &str) -> bool {
        let wanted = extension.trim_start_matches('.');
        !wanted.is_empty()
            && self
                .extensions
                .iter()
                .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(wanted))
    }
}

/// What the relocator does when the destination file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Rename over the existing file (last mover wins)
    #[default]
    Overwrite,
    /// Treat an existing destination file as a fatal error
    Fail,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictPolicy::Overwrite => write!(f, "overwrite"),
            ConflictPolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Relocator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocateConfig {
    /// Behavior when the destination file already exists
    pub on_conflict: ConflictPolicy,

    /// Keep the extension's case as read ("photo.JPG" -> ".JPG") instead of
    /// lower-casing it
    pub preserve_extension_case: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
