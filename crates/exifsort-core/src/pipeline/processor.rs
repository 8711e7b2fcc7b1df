//! Pipeline orchestration - wires the three stages together and waits for them.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::{Config, Layout};
use crate::error::{PipelineError, PipelineResult, Result};
use crate::types::{RunReport, StageReport};

use super::channel::handoff;
use super::classifier::Classifier;
use super::metadata::{ExifDecoder, MetadataDecoder};
use super::relocator::Relocator;
use super::scanner::Scanner;

/// Log target of the per-stage summary lines. The CLI always enables it at
/// `info`, whatever the configured level.
pub const SUMMARY_TARGET: &str = "exifsort::summary";

/// Sorts one source tree into one destination tree.
///
/// ```text
/// Scanner --paths--> Classifier --images--> Relocator
/// ```
///
/// Each stage runs on its own blocking thread. Closing a channel is the only
/// end-of-input signal a stage gets.
pub struct Pipeline<D = ExifDecoder> {
    config: Config,
    layout: Layout,
    decoder: Arc<D>,
}

impl Pipeline<ExifDecoder> {
    /// Create a pipeline that reads capture times from EXIF.
    pub fn new(config: Config, layout: Layout) -> Self {
        Self::with_decoder(config, layout, ExifDecoder)
    }
}

impl<D: MetadataDecoder> Pipeline<D> {
    /// Create a pipeline with a custom metadata decoder.
    pub fn with_decoder(config: Config, layout: Layout, decoder: D) -> Self {
        Self {
            config,
            layout,
            decoder: Arc::new(decoder),
        }
    }

    /// Validate the layout, run all stages to completion, and return the totals.
    ///
    /// Nothing starts if the layout is invalid. On a fatal stage error the
    /// root cause is returned, not the `Disconnected` errors it triggers
    /// upstream, and summaries of stages that did not finish are not logged.
    /// Files moved before the failure stay moved.
    pub async fn run(&self) -> Result<RunReport> {
        self.layout.validate()?;

        tracing::debug!(
            "Sorting {:?} into {:?} (on conflict: {})",
            self.layout.source,
            self.layout.destination,
            self.config.relocate.on_conflict
        );

        let (path_tx, path_rx) = handoff(&self.config.pipeline);
        let (image_tx, image_rx) = handoff(&self.config.pipeline);

        let scanner = Scanner::new(&self.layout.source);
        let classifier = Classifier::new(self.decoder.clone(), self.config.classify.clone())
            .preserve_extension_case(self.config.relocate.preserve_extension_case);
        let relocator = Relocator::new(&self.layout.destination, self.config.relocate.clone());

        let stages: [JoinHandle<PipelineResult<StageReport>>; 3] = [
            tokio::task::spawn_blocking(move || scanner.run(path_tx)),
            tokio::task::spawn_blocking(move || classifier.run(path_rx, image_tx)),
            tokio::task::spawn_blocking(move || relocator.run(image_rx)),
        ];

        Ok(Self::join(stages).await?)
    }

    /// Completion barrier: wait for every stage, in pipeline order.
    ///
    /// A stage can only drain after the one before it has closed its output,
    /// so awaiting in order sees completions in the order they happen. A
    /// `Disconnected` error is only a symptom of a later stage failing, so
    /// the driver keeps waiting for that stage's own error.
    ///
    /// A scanner or classifier failure is returned as soon as its handle
    /// resolves. A relocator failure is only seen once the scanner and the
    /// classifier have ended, which they do on their next send into a closed
    /// channel; each of them handles at most one more item before that.
    async fn join(stages: [JoinHandle<PipelineResult<StageReport>>; 3]) -> PipelineResult<RunReport> {
        let mut report = RunReport::default();
        let mut disconnected = None;

        for handle in stages {
            match handle.await? {
                Ok(stage) if disconnected.is_none() => {
                    tracing::info!(target: SUMMARY_TARGET, "{}", stage.summary());
                    report.record(stage);
                }
                Ok(_) => {}
                Err(e @ PipelineError::Disconnected { .. }) => {
                    tracing::debug!("{}", e);
                    disconnected.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        match disconnected {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Source and destination of this pipeline.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Configuration this pipeline was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
