//! Workflow status: the value an observer sees at every transition.
//!
//! The engine publishes a `Running` status immediately before each stage starts,
//! so an observer always sees the step being attempted, then exactly one terminal
//! status (`Complete`, `Failed` or `Rejected`).

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::analysis::stage::StageId;

pub const COMPLETE_MESSAGE: &str = "Analysis completed! Redirecting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Running,
    /// Refused before any stage ran (bad upload or missing configuration).
    Rejected,
    Failed,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStatus {
    pub state: WorkflowState,
    pub stage: Option<StageId>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl WorkflowStatus {
    pub fn running(stage: StageId) -> Self {
        Self {
            state: WorkflowState::Running,
            stage: Some(stage),
            message: stage.in_progress_message().to_string(),
            detail: None,
        }
    }

    pub fn failed(stage: StageId, detail: impl Into<String>) -> Self {
        Self {
            state: WorkflowState::Failed,
            stage: Some(stage),
            message: stage.failure_message().to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            state: WorkflowState::Rejected,
            stage: None,
            message: message.into(),
            detail: None,
        }
    }

    pub fn complete() -> Self {
        Self {
            state: WorkflowState::Complete,
            stage: None,
            message: COMPLETE_MESSAGE.to_string(),
            detail: None,
        }
    }

    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        self.state != WorkflowState::Running
    }
}

/// Receives every status transition of one workflow invocation.
pub trait StatusObserver: Send + Sync {
    fn publish(&self, status: &WorkflowStatus);
}

/// Observer that records every transition in order.
#[derive(Debug, Default)]
pub struct StatusHistory {
    entries: Mutex<Vec<WorkflowStatus>>,
}

impl StatusHistory {
    pub fn snapshot(&self) -> Vec<WorkflowStatus> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatusObserver for StatusHistory {
    fn publish(&self, status: &WorkflowStatus) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(status.clone());
    }
}

/// Forwards transitions to a channel; a dropped receiver is not an error.
impl StatusObserver for mpsc::UnboundedSender<WorkflowStatus> {
    fn publish(&self, status: &WorkflowStatus) {
        let _ = self.send(status.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_status_names_the_stage() {
        let status = WorkflowStatus::running(StageId::ConvertToImage);
        assert_eq!(status.message, "Converting resume to image...");
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_failed_status_carries_detail() {
        let status = WorkflowStatus::failed(StageId::Analyze, "upstream 500");
        assert_eq!(status.message, "Failed to generate feedback.");
        assert_eq!(status.detail.as_deref(), Some("upstream 500"));
        assert!(status.is_terminal());
    }

    #[test]
    fn test_history_keeps_order() {
        let history = StatusHistory::default();
        history.publish(&WorkflowStatus::running(StageId::StoreResume));
        history.publish(&WorkflowStatus::complete());
        let entries = history.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].state, WorkflowState::Complete);
    }

    #[tokio::test]
    async fn test_channel_observer_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.publish(&WorkflowStatus::running(StageId::StoreImage));
        drop(tx);
        assert_eq!(rx.recv().await.unwrap().stage, Some(StageId::StoreImage));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let value = serde_json::to_value(WorkflowStatus::running(StageId::SaveRecord)).unwrap();
        assert_eq!(value["state"], "running");
        assert_eq!(value["stage"], "save_record");
        assert!(value.get("detail").is_none());
    }
}
