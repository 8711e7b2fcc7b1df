//! Sorting pipeline components.
//!
//! This module contains the stages of the sorting pipeline:
//! - **scanner**: Walk the source tree and emit file paths
//! - **metadata**: Decode embedded metadata and read the capture time
//! - **classifier**: Keep dated files with an allowed extension
//! - **relocator**: Move images into the dated destination tree
//! - **processor**: Runs the stages concurrently and waits for them
//! - **channel**: Bounded handoff channels for backpressure

pub mod channel;
pub mod classifier;
pub mod metadata;
pub mod processor;
pub mod relocator;
pub mod scanner;

// Re-exports for convenient access
pub use classifier::Classifier;
pub use metadata::{CaptureTime, ExifDecoder, MetadataDecoder};
pub use processor::{Pipeline, SUMMARY_TARGET};
pub use relocator::{Placement, Relocator};
pub use scanner::Scanner;
