use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::pipeline::{Pipeline, PipelineError, RunReport};

/// Starts pipeline runs in the background, at most one at a time.
pub struct PipelineRunner {
    pipeline: Arc<Pipeline>,
    active: Arc<AtomicBool>,
}

// Clears the active flag when the run ends, including on panic
struct ActiveRun(Arc<AtomicBool>);

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PipelineRunner {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Spawn one run and return immediately. Rejected while another run is active.
    pub fn trigger(&self) -> Result<JoinHandle<RunReport>, PipelineError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Pipeline trigger rejected, a run is already in progress");
            return Err(PipelineError::AlreadyRunning);
        }

        let guard = ActiveRun(self.active.clone());
        let pipeline = self.pipeline.clone();
        info!("Pipeline run triggered, starting background task");

        Ok(tokio::spawn(async move {
            let _guard = guard;
            pipeline.run().await
        }))
    }
}
