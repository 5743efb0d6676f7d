use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

pub mod normalize;
pub mod observer;
pub mod reconcile;
mod runner;

pub use normalize::normalize;
#[cfg(test)]
pub use observer::recording;
pub use observer::{EventBus, StatusObserver, StatusReporter};
pub use reconcile::{reconcile, ReconcileSummary};
pub use runner::PipelineRunner;

use crate::config::Config;
use crate::models::Severity;
use crate::scrapers::{Browser, ExtractError, SteamListingExtractor};
use crate::storage::{StorageBackend, StorageError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("a pipeline run is already in progress")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Preparing,
    Extracting,
    Normalizing,
    Reconciling,
    Done,
    Failed,
}

/// Outcome of one run, returned to whoever awaits the background task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub phase: Phase,
    /// Phase that was active when the run failed.
    pub failed_in: Option<Phase>,
    pub extracted: usize,
    pub normalized: usize,
    pub inserted: usize,
    pub updated: usize,
    pub error: Option<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.phase == Phase::Done
    }

    fn enter(&mut self, phase: Phase) {
        info!(from = ?self.phase, to = ?phase, "Pipeline phase");
        self.phase = phase;
    }
}

/// Extract → normalize → reconcile, with failures contained at this boundary.
pub struct Pipeline {
    extractor: SteamListingExtractor,
    storage: Arc<dyn StorageBackend>,
    reporter: StatusReporter,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        browser: Arc<dyn Browser>,
        storage: Arc<dyn StorageBackend>,
        observer: Arc<dyn StatusObserver>,
    ) -> Self {
        let reporter = StatusReporter::new(observer, config.status_yield());
        Self {
            extractor: SteamListingExtractor::new(config, browser),
            storage,
            reporter,
        }
    }

    /// Runs every phase and emits exactly one terminal event. Never returns an error.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::default();

        match self.execute(&mut report).await {
            Ok(()) => {
                report.enter(Phase::Done);
                self.reporter
                    .finish(">>> PIPELINE FINISHED SUCCESSFULLY <<<", Severity::Info)
                    .await;
            }
            Err(e) => {
                error!(phase = ?report.phase, "PIPELINE ERROR: {}", e);
                report.failed_in = Some(report.phase);
                report.error = Some(e.to_string());
                report.enter(Phase::Failed);

                self.reporter.error(format!("PIPELINE ERROR: {}", e)).await;
                self.reporter
                    .finish(">>> PIPELINE FINISHED WITH ERROR <<<", Severity::Error)
                    .await;
            }
        }

        report
    }

    async fn execute(&self, report: &mut RunReport) -> Result<(), PipelineError> {
        self.reporter.info(">>> STARTING FULL PIPELINE <<<").await;

        report.enter(Phase::Preparing);
        let storage = self.storage.connect().await?;
        storage.ensure_schema().await?;
        self.reporter.info("Database verified.").await;

        report.enter(Phase::Extracting);
        let raw = self.extractor.extract(&self.reporter).await?;
        report.extracted = raw.len();

        if raw.is_empty() {
            self.reporter.info("No data was collected from the store.").await;
            return Ok(());
        }

        report.enter(Phase::Normalizing);
        let games = normalize(raw);
        report.normalized = games.len();
        self.reporter.info("Data normalized and cleaned.").await;

        report.enter(Phase::Reconciling);
        let summary = reconcile(storage.as_ref(), &games).await?;
        report.inserted = summary.inserted;
        report.updated = summary.updated;
        self.reporter
            .info(format!(
                "Data saved: {} new, {} updated.",
                summary.inserted, summary.updated
            ))
            .await;

        Ok(())
    }
}
