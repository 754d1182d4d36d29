// Resume analysis: upload → preview → record → AI feedback.
// The workflow engine drives the stages; all LLM calls go through llm_client.

pub mod engine;
pub mod feedback;
pub mod handlers;
pub mod prompts;
pub mod stage;
pub mod stats;
pub mod status;
pub mod upload;
