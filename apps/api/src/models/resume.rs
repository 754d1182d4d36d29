use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::feedback::Feedback;

/// Namespace prefix for Document Records in the key-value store.
pub const RECORD_KEY_PREFIX: &str = "resume:";

/// Builds the key-value store key for a Document Record.
pub fn record_key(id: Uuid) -> String {
    format!("{RECORD_KEY_PREFIX}{id}")
}

/// Opaque handle returned by the blob store for stored binary content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied metadata about the role the resume targets.
/// Set once when an analysis starts and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeContext {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("{0} is already set on this record")]
    AlreadySet(&'static str),
}

/// The persisted unit of work for one submitted resume.
///
/// Fields are append-only: once an artifact reference or the feedback is set it is
/// never cleared or overwritten. `feedback` is present only for a completed analysis;
/// a record without it is either in progress or was abandoned by a halted workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    id: Uuid,
    /// User that submitted the resume. Records are only ever shown to their owner.
    #[serde(default)]
    owner: String,
    #[serde(default)]
    resume_path: Option<ArtifactRef>,
    #[serde(default)]
    image_path: Option<ArtifactRef>,
    #[serde(flatten)]
    context: ResumeContext,
    #[serde(default)]
    feedback: Option<Feedback>,
    created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Creates a fresh record with a generated id and no feedback.
    pub fn new(owner: impl Into<String>, context: ResumeContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            resume_path: None,
            image_path: None,
            context,
            feedback: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key(&self) -> String {
        record_key(self.id)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Legacy records without an owner belong to nobody.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        !self.owner.is_empty() && self.owner == user_id
    }

    pub fn source_artifact(&self) -> Option<&ArtifactRef> {
        self.resume_path.as_ref()
    }

    #[cfg(test)]
    pub fn derived_artifact(&self) -> Option<&ArtifactRef> {
        self.image_path.as_ref()
    }

    pub fn context(&self) -> &ResumeContext {
        &self.context
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_complete(&self) -> bool {
        self.feedback.is_some()
    }

    pub fn set_source_artifact(&mut self, artifact: ArtifactRef) -> Result<(), RecordError> {
        set_once(&mut self.resume_path, artifact, "resume_path")
    }

    pub fn set_derived_artifact(&mut self, artifact: ArtifactRef) -> Result<(), RecordError> {
        set_once(&mut self.image_path, artifact, "image_path")
    }

    pub fn set_feedback(&mut self, feedback: Feedback) -> Result<(), RecordError> {
        set_once(&mut self.feedback, feedback, "feedback")
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), RecordError> {
    if slot.is_some() {
        return Err(RecordError::AlreadySet(field));
    }
    *slot = Some(value);
    Ok(())
}
