//! Workflow Engine: runs a submitted resume through the analysis stages.
//!
//! Flow: validate upload → store resume → render preview → store preview →
//!       save record → analyze → parse feedback → save feedback.
//!
//! Stages run strictly in sequence, each under the configured timeout. The first
//! failure halts the run and yields a terminal status naming the failed stage.
//! Whatever was persisted before the failure stays as it is.
//! `run` never returns an error; every failure is part of the `WorkflowOutcome`.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::feedback::Feedback;
use crate::analysis::stage::{self, Fragment, StageFailure, StageId};
use crate::analysis::status::{StatusObserver, WorkflowStatus};
use crate::analysis::upload::{validate_upload, InputError};
use crate::convert::ImageConverter;
use crate::llm_client::inference::InferenceService;
use crate::models::resume::{DocumentRecord, ResumeContext};
use crate::storage::{BlobStore, FileBlob, ResumeRepository};

pub const MISSING_CONFIGURATION_MESSAGE: &str =
    "The AI service is not configured. Please contact support.";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid upload: {0}")]
    Input(#[from] InputError),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{stage} stage failed: {reason}")]
    Stage { stage: StageId, reason: StageFailure },

    #[error("feedback could not be parsed: {0}")]
    Parse(StageFailure),
}

impl WorkflowError {
    fn at_stage(stage: StageId, reason: StageFailure) -> Self {
        match (stage, reason) {
            (StageId::ParseFeedback, reason @ StageFailure::Malformed(_)) => {
                WorkflowError::Parse(reason)
            }
            (stage, reason) => WorkflowError::Stage { stage, reason },
        }
    }
}

/// External services the stages call.
#[derive(Clone)]
pub struct Collaborators {
    pub blobs: Arc<dyn BlobStore>,
    pub records: ResumeRepository,
    pub converter: Arc<dyn ImageConverter>,
    pub inference: Arc<dyn InferenceService>,
}

/// Raw input for one analysis.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Signed-in user the resulting record belongs to.
    pub owner: String,
    pub files: Vec<FileBlob>,
    pub context: ResumeContext,
}

#[derive(Debug)]
pub enum WorkflowOutcome {
    Completed {
        record: DocumentRecord,
        status: WorkflowStatus,
    },
    Halted {
        /// `None` when the submission was rejected before a record existed.
        record_id: Option<Uuid>,
        /// Whether a partial record was written to the key-value store.
        persisted: bool,
        status: WorkflowStatus,
        error: WorkflowError,
    },
}

impl WorkflowOutcome {
    pub fn status(&self) -> &WorkflowStatus {
        match self {
            WorkflowOutcome::Completed { status, .. } | WorkflowOutcome::Halted { status, .. } => {
                status
            }
        }
    }

    pub fn record_id(&self) -> Option<Uuid> {
        match self {
            WorkflowOutcome::Completed { record, .. } => Some(record.id()),
            WorkflowOutcome::Halted { record_id, .. } => *record_id,
        }
    }
}

/// State accumulated by one run. Owned exclusively by that run.
struct Run {
    upload: FileBlob,
    record: DocumentRecord,
    image: Option<FileBlob>,
    response_text: Option<String>,
    feedback: Option<Feedback>,
    persisted: bool,
}

impl Run {
    fn new(upload: FileBlob, record: DocumentRecord) -> Self {
        Self {
            upload,
            record,
            image: None,
            response_text: None,
            feedback: None,
            persisted: false,
        }
    }

    fn apply(&mut self, fragment: Fragment) -> Result<(), StageFailure> {
        match fragment {
            Fragment::ResumeStored(artifact) => self.record.set_source_artifact(artifact)?,
            Fragment::ImageRendered(image) => self.image = Some(image),
            Fragment::ImageStored(artifact) => self.record.set_derived_artifact(artifact)?,
            Fragment::RecordSaved => self.persisted = true,
            Fragment::FeedbackReceived(text) => self.response_text = Some(text),
            Fragment::FeedbackParsed(feedback) => self.feedback = Some(feedback),
            Fragment::FeedbackSaved(record) => self.record = record,
        }
        Ok(())
    }
}

/// Stateless between invocations: every `run` starts from a fresh record.
#[derive(Clone)]
pub struct WorkflowEngine {
    collaborators: Collaborators,
    stage_timeout: Duration,
}

impl WorkflowEngine {
    pub fn new(collaborators: Collaborators, stage_timeout: Duration) -> Self {
        Self {
            collaborators,
            stage_timeout,
        }
    }

    pub async fn run(&self, submission: Submission, observer: &dyn StatusObserver) -> WorkflowOutcome {
        let upload = match validate_upload(submission.files) {
            Ok(upload) => upload,
            Err(e) => {
                let status = WorkflowStatus::rejected(e.to_string());
                return reject(status, WorkflowError::Input(e), observer);
            }
        };

        if !self.collaborators.inference.is_configured() {
            let status = WorkflowStatus::rejected(MISSING_CONFIGURATION_MESSAGE);
            let error = WorkflowError::Configuration("inference credentials are missing".into());
            return reject(status, error, observer);
        }

        let mut run = Run::new(upload, DocumentRecord::new(submission.owner, submission.context));
        let record_id = run.record.id();
        info!(%record_id, size = run.upload.len(), "Starting resume analysis");

        for stage in StageId::SEQUENCE {
            observer.publish(&WorkflowStatus::running(stage));
            info!(%record_id, %stage, "Stage started");

            let produced = tokio::time::timeout(self.stage_timeout, self.execute(stage, &run))
                .await
                .unwrap_or(Err(StageFailure::TimedOut(self.stage_timeout)));
            let result = produced.and_then(|fragment| run.apply(fragment));

            if let Err(reason) = result {
                warn!(%record_id, %stage, "Stage failed: {reason}");
                let status = WorkflowStatus::failed(stage, reason.to_string());
                observer.publish(&status);
                return WorkflowOutcome::Halted {
                    record_id: Some(record_id),
                    persisted: run.persisted,
                    status,
                    error: WorkflowError::at_stage(stage, reason),
                };
            }
        }

        let status = WorkflowStatus::complete();
        observer.publish(&status);
        info!(%record_id, "Resume analysis complete");

        WorkflowOutcome::Completed {
            record: run.record,
            status,
        }
    }

    async fn execute(&self, stage: StageId, run: &Run) -> Result<Fragment, StageFailure> {
        let c = &self.collaborators;
        match stage {
            StageId::StoreResume => stage::store_resume(c.blobs.as_ref(), &run.upload).await,
            StageId::ConvertToImage => {
                stage::convert_to_image(c.converter.as_ref(), &run.upload).await
            }
            StageId::StoreImage => stage::store_image(c.blobs.as_ref(), run.image.as_ref()).await,
            StageId::SaveRecord => stage::save_record(&c.records, &run.record).await,
            StageId::Analyze => stage::analyze(c.inference.as_ref(), &run.record).await,
            StageId::ParseFeedback => stage::parse(run.response_text.as_deref()),
            StageId::SaveFeedback => {
                stage::save_feedback(&c.records, &run.record, run.feedback.as_ref()).await
            }
        }
    }
}

fn reject(
    status: WorkflowStatus,
    error: WorkflowError,
    observer: &dyn StatusObserver,
) -> WorkflowOutcome {
    warn!("Analysis rejected before any stage ran: {error}");
    observer.publish(&status);
    WorkflowOutcome::Halted {
        record_id: None,
        persisted: false,
        status,
        error,
    }
}
