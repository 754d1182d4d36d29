use crate::analysis::engine::WorkflowEngine;
use crate::builder::sessions::SessionStore;
use crate::llm_client::LlmClient;
use crate::storage::ResumeRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: WorkflowEngine,
    /// Read side of the Document Records the engine writes.
    pub records: ResumeRepository,
    /// Used directly by the builder; analysis reaches the model through the engine.
    pub llm: LlmClient,
    pub sessions: SessionStore,
}
