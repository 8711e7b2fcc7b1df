//! exifsort core - sort photos into a dated directory tree.
//!
//! Files are moved according to the capture time stored in their embedded
//! metadata, not their filesystem timestamps.
//!
//! # Architecture
//!
//! Three stages run concurrently, connected by bounded channels:
//!
//! ```text
//! Scan source tree → Read capture time → Move to <year>/<year>.<mm>.<dd>_<hh>.<mm>.<ss><ext>
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use exifsort_core::{Config, Layout, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> exifsort_core::Result<()> {
//!     let config = Config::load()?;
//!     let layout = Layout::new("./unsorted", "./photos");
//!
//!     let report = Pipeline::new(config, layout).run().await?;
//!     println!("Moved {} image(s)", report.images_moved);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, ConflictPolicy, Layout};
pub use error::{ConfigError, MetadataError, PipelineError, PipelineResult, Result, SortError};
pub use pipeline::{ExifDecoder, MetadataDecoder, Pipeline, SUMMARY_TARGET};
pub use types::{Image, RunReport, Stage, StageReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
