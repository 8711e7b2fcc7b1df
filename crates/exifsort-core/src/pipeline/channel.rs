//! Bounded handoff channels between pipeline stages.
//!
//! Stages run on blocking threads, so they use `blocking_send` /
//! `blocking_recv`. Dropping a stage's sender is what tells the next stage
//! its input is finished.

use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Stage;

/// Create a handoff channel pair with the configured buffer size.
///
/// When the buffer is full, the sender blocks until the receiver catches up,
/// so no stage can run ahead of the one after it.
pub fn handoff<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size.max(1))
}

/// Send one item downstream, blocking while the buffer is full.
///
/// Fails with [`PipelineError::Disconnected`] if the receiver is gone.
pub fn send_blocking<T>(tx: &mpsc::Sender<T>, item: T, stage: Stage) -> PipelineResult<()> {
    tx.blocking_send(item)
        .map_err(|_| PipelineError::Disconnected { stage })
}

/// A stage that maps each input item to at most one output item.
pub struct PipelineStage<I, O> {
    stage: Stage,
    input: mpsc::Receiver<I>,
    output: mpsc::Sender<O>,
}

impl<I, O> PipelineStage<I, O> {
    /// Create a new pipeline stage.
    pub fn new(stage: Stage, input: mpsc::Receiver<I>, output: mpsc::Sender<O>) -> Self {
        Self {
            stage,
            input,
            output,
        }
    }

    /// Drain the input, forwarding every `Some` result downstream.
    ///
    /// `Ok(None)` drops the item, `Err` stops the stage. Returns the number of
    /// items forwarded once the input is closed and empty. The output sender
    /// is dropped on return, closing the downstream channel.
    pub fn run_blocking<F>(mut self, mut f: F) -> PipelineResult<u64>
    where
        F: FnMut(I) -> PipelineResult<Option<O>>,
    {
        let mut forwarded = 0;
        while let Some(item) = self.input.blocking_recv() {
            if let Some(out) = f(item)? {
                send_blocking(&self.output, out, self.stage)?;
                forwarded += 1;
            }
        }
        Ok(forwarded)
    }
}
