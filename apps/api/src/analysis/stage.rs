//! The stages of the analysis pipeline.
//!
//! Each stage makes at most one external call and returns a `Fragment` describing
//! what it produced; only the engine applies fragments to the Document Record.
//! A stage never touches fields outside its own output.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::analysis::feedback::{parse_feedback, Feedback};
use crate::analysis::prompts::build_analysis_prompt;
use crate::convert::ImageConverter;
use crate::llm_client::inference::InferenceService;
use crate::models::resume::{ArtifactRef, DocumentRecord, RecordError};
use crate::storage::{BlobStore, FileBlob, ResumeRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    StoreResume,
    ConvertToImage,
    StoreImage,
    SaveRecord,
    Analyze,
    ParseFeedback,
    SaveFeedback,
}

impl StageId {
    /// Canonical order of the analysis pipeline.
    pub const SEQUENCE: [StageId; 7] = [
        StageId::StoreResume,
        StageId::ConvertToImage,
        StageId::StoreImage,
        StageId::SaveRecord,
        StageId::Analyze,
        StageId::ParseFeedback,
        StageId::SaveFeedback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::StoreResume => "store_resume",
            StageId::ConvertToImage => "convert_to_image",
            StageId::StoreImage => "store_image",
            StageId::SaveRecord => "save_record",
            StageId::Analyze => "analyze",
            StageId::ParseFeedback => "parse_feedback",
            StageId::SaveFeedback => "save_feedback",
        }
    }

    pub fn in_progress_message(&self) -> &'static str {
        match self {
            StageId::StoreResume => "Uploading resume...",
            StageId::ConvertToImage => "Converting resume to image...",
            StageId::StoreImage => "Uploading image...",
            StageId::SaveRecord => "Saving resume...",
            StageId::Analyze => "Analyzing resume...",
            StageId::ParseFeedback => "Reading feedback...",
            StageId::SaveFeedback => "Saving feedback...",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            StageId::StoreResume => "Error uploading file.",
            StageId::ConvertToImage => "Failed to convert the resume to image.",
            StageId::StoreImage => "Failed to upload the image.",
            StageId::SaveRecord => "Failed to save the resume.",
            StageId::Analyze => "Failed to generate feedback.",
            StageId::ParseFeedback => "Failed to read the feedback: the AI response was malformed.",
            StageId::SaveFeedback => "Failed to save the feedback.",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StageFailure {
    /// The external call errored.
    #[error("{0}")]
    Unavailable(String),

    /// The external call succeeded but returned nothing usable.
    #[error("no usable result was returned")]
    Empty,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("missing {0} from an earlier stage")]
    MissingInput(&'static str),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// What a successful stage produced.
#[derive(Debug)]
pub enum Fragment {
    ResumeStored(ArtifactRef),
    ImageRendered(FileBlob),
    ImageStored(ArtifactRef),
    RecordSaved,
    FeedbackReceived(String),
    FeedbackParsed(Feedback),
    FeedbackSaved(DocumentRecord),
}

pub(crate) async fn store_resume(
    blobs: &dyn BlobStore,
    upload: &FileBlob,
) -> Result<Fragment, StageFailure> {
    store_blob(blobs, upload).await.map(Fragment::ResumeStored)
}

pub(crate) async fn convert_to_image(
    converter: &dyn ImageConverter,
    upload: &FileBlob,
) -> Result<Fragment, StageFailure> {
    let image = converter
        .convert(upload)
        .await
        .map_err(|e| StageFailure::Unavailable(e.to_string()))?;
    if image.is_empty() {
        return Err(StageFailure::Empty);
    }
    Ok(Fragment::ImageRendered(image))
}

pub(crate) async fn store_image(
    blobs: &dyn BlobStore,
    image: Option<&FileBlob>,
) -> Result<Fragment, StageFailure> {
    let image = image.ok_or(StageFailure::MissingInput("rendered image"))?;
    store_blob(blobs, image).await.map(Fragment::ImageStored)
}

pub(crate) async fn save_record(
    repo: &ResumeRepository,
    record: &DocumentRecord,
) -> Result<Fragment, StageFailure> {
    repo.save(record)
        .await
        .map_err(|e| StageFailure::Unavailable(e.to_string()))?;
    Ok(Fragment::RecordSaved)
}

pub(crate) async fn analyze(
    inference: &dyn InferenceService,
    record: &DocumentRecord,
) -> Result<Fragment, StageFailure> {
    let artifact = record
        .source_artifact()
        .ok_or(StageFailure::MissingInput("resume reference"))?;
    let prompt = build_analysis_prompt(record.context());

    let response = inference
        .infer(artifact, &prompt)
        .await
        .map_err(|e| StageFailure::Unavailable(e.to_string()))?;

    let text = response.content.normalize().ok_or(StageFailure::Empty)?;
    Ok(Fragment::FeedbackReceived(text.to_string()))
}

pub(crate) fn parse(response_text: Option<&str>) -> Result<Fragment, StageFailure> {
    let text = response_text.ok_or(StageFailure::MissingInput("inference response"))?;
    parse_feedback(text)
        .map(Fragment::FeedbackParsed)
        .map_err(|e| StageFailure::Malformed(e.to_string()))
}

pub(crate) async fn save_feedback(
    repo: &ResumeRepository,
    record: &DocumentRecord,
    feedback: Option<&Feedback>,
) -> Result<Fragment, StageFailure> {
    let feedback = feedback.ok_or(StageFailure::MissingInput("parsed feedback"))?;
    let mut completed = record.clone();
    completed.set_feedback(feedback.clone())?;
    repo.save(&completed)
        .await
        .map_err(|e| StageFailure::Unavailable(e.to_string()))?;
    Ok(Fragment::FeedbackSaved(completed))
}

async fn store_blob(blobs: &dyn BlobStore, blob: &FileBlob) -> Result<ArtifactRef, StageFailure> {
    let artifact = blobs
        .store(blob)
        .await
        .map_err(|e| StageFailure::Unavailable(e.to_string()))?;
    if artifact.as_str().trim().is_empty() {
        return Err(StageFailure::Empty);
    }
    Ok(artifact)
}
