use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// Progress notification sent to observers while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Repeatable progress message.
    Status { message: String, severity: Severity },
    /// Emitted exactly once per run.
    Finished { message: String, severity: Severity },
}

impl PipelineEvent {
    pub fn info(message: impl Into<String>) -> Self {
        PipelineEvent::Status {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        PipelineEvent::Status {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Finished { .. })
    }

    pub fn severity(&self) -> Severity {
        match self {
            PipelineEvent::Status { severity, .. } | PipelineEvent::Finished { severity, .. } => *severity,
        }
    }
}
