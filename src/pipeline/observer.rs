use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::models::{PipelineEvent, Severity};

const EVENT_BUS_CAPACITY: usize = 256;

/// Receives status events. Delivery is best-effort: `emit` must never block the run.
pub trait StatusObserver: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Fans pipeline events out to every subscribed client.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusObserver for EventBus {
    fn emit(&self, event: PipelineEvent) {
        // No subscribers is not an error
        if self.sender.send(event).is_err() {
            debug!("Status event dropped, no subscribers");
        }
    }
}

/// Emits events to the observer and yields briefly after each one.
#[derive(Clone)]
pub struct StatusReporter {
    observer: Arc<dyn StatusObserver>,
    yield_for: Duration,
}

impl StatusReporter {
    pub fn new(observer: Arc<dyn StatusObserver>, yield_for: Duration) -> Self {
        Self { observer, yield_for }
    }

    pub async fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.send(PipelineEvent::info(message)).await;
    }

    /// Error status; the caller is responsible for logging the failure itself.
    pub async fn error(&self, message: impl Into<String>) {
        self.send(PipelineEvent::error(message)).await;
    }

    pub async fn finish(&self, message: impl Into<String>, severity: Severity) {
        self.send(PipelineEvent::Finished {
            message: message.into(),
            severity,
        })
        .await;
    }

    async fn send(&self, event: PipelineEvent) {
        self.observer.emit(event);
        tokio::time::sleep(self.yield_for).await;
    }
}
