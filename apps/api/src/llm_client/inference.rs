//! The inference boundary used by the analysis workflow.
//!
//! Responses may carry their payload as a single string or as a sequence of
//! content parts; `MessageContent::normalize` collapses both into one text payload
//! before anything tries to parse it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError, LlmResponse};
use crate::models::resume::ArtifactRef;
use crate::storage::BlobStore;

/// Upper bound on extracted resume text forwarded to the model.
const MAX_DOCUMENT_CHARS: usize = 40_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text(String),
    Block {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
}

impl ContentPart {
    fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            ContentPart::Block { kind, text } => match kind.as_deref() {
                None | Some("text") => text.as_deref(),
                Some(_) => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The canonical text payload: the whole string, or the first textual part.
    /// Blank payloads count as no content.
    pub fn normalize(&self) -> Option<&str> {
        let text = match self {
            MessageContent::Text(text) => Some(text.as_str()),
            MessageContent::Parts(parts) => parts.iter().find_map(ContentPart::as_text),
        }?;
        let text = text.trim();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub content: MessageContent,
}

impl From<LlmResponse> for InferenceResponse {
    fn from(response: LlmResponse) -> Self {
        let parts = response
            .content
            .into_iter()
            .map(|block| ContentPart::Block {
                kind: Some(block.block_type),
                text: block.text,
            })
            .collect();
        Self {
            content: MessageContent::Parts(parts),
        }
    }
}

#[async_trait]
pub trait InferenceService: Send + Sync {
    /// False when credentials are missing; the workflow refuses to start.
    fn is_configured(&self) -> bool;

    async fn infer(
        &self,
        artifact: &ArtifactRef,
        prompt: &str,
    ) -> Result<InferenceResponse, LlmError>;
}

/// Inference over a stored resume: fetches the PDF from the blob store, extracts
/// its text and sends it to Claude together with the analysis prompt.
#[derive(Clone)]
pub struct ResumeInference {
    llm: LlmClient,
    blobs: Arc<dyn BlobStore>,
}

impl ResumeInference {
    pub fn new(llm: LlmClient, blobs: Arc<dyn BlobStore>) -> Self {
        Self { llm, blobs }
    }
}

#[async_trait]
impl InferenceService for ResumeInference {
    fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    async fn infer(
        &self,
        artifact: &ArtifactRef,
        prompt: &str,
    ) -> Result<InferenceResponse, LlmError> {
        let pdf = self
            .blobs
            .fetch(artifact)
            .await
            .map_err(|e| LlmError::Document(e.to_string()))?;

        // PDF text extraction is CPU-bound; keep it off the async executor.
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
            .await
            .map_err(|e| LlmError::Document(format!("extraction task failed: {e}")))?
            .map_err(|e| LlmError::Document(e.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::Document(
                "no extractable text (scanned PDF?)".to_string(),
            ));
        }
        debug!("Extracted {} chars of resume text from {artifact}", text.len());

        let message = compose_message(prompt, text);
        let response = self.llm.call(&message, JSON_ONLY_SYSTEM).await?;
        Ok(response.into())
    }
}

fn compose_message(prompt: &str, resume_text: &str) -> String {
    let resume_text: String = resume_text.chars().take(MAX_DOCUMENT_CHARS).collect();
    format!("{prompt}\n\nRESUME TEXT:\n<<<\n{resume_text}\n>>>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_string() {
        let content: MessageContent = serde_json::from_str(r#""{\"a\": 1}""#).unwrap();
        assert_eq!(content.normalize(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_normalize_first_text_block() {
        let content: MessageContent = serde_json::from_str(
            r#"[{"type": "thinking"}, {"type": "text", "text": "first"}, {"type": "text", "text": "second"}]"#,
        )
        .unwrap();
        assert_eq!(content.normalize(), Some("first"));
    }

    #[test]
    fn test_normalize_bare_string_parts() {
        let content: MessageContent = serde_json::from_str(r#"["payload"]"#).unwrap();
        assert_eq!(content.normalize(), Some("payload"));
    }

    #[test]
    fn test_normalize_empty_content() {
        assert_eq!(MessageContent::Parts(vec![]).normalize(), None);
        assert_eq!(MessageContent::Text("  \n".to_string()).normalize(), None);
    }

    #[test]
    fn test_llm_response_converts_to_parts() {
        let response: LlmResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "{}"}],
            "usage": {"input_tokens": 10, "output_tokens": 2}
        }))
        .unwrap();
        let inference: InferenceResponse = response.into();
        assert_eq!(inference.content.normalize(), Some("{}"));
    }

    #[test]
    fn test_compose_message_truncates_long_documents() {
        let long = "x".repeat(MAX_DOCUMENT_CHARS + 500);
        let message = compose_message("Analyze.", &long);
        assert!(message.starts_with("Analyze."));
        assert_eq!(message.matches('x').count(), MAX_DOCUMENT_CHARS);
    }
}
