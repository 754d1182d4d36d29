//! Content Collector: the multi-step resume builder wizard.
//!
//! A session owns one [`record::CollectorRecord`] and a step cursor. Actions
//! are applied one at a time by [`actions::apply`]; the record is discarded
//! once a resume is generated or the wizard is exited.

pub mod actions;
pub mod handlers;
pub mod prompts;
pub mod record;
pub mod sessions;
pub mod wizard;

use thiserror::Error;
use uuid::Uuid;

use crate::builder::record::Section;
use crate::builder::wizard::WizardStep;

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Builder session {0} not found")]
    UnknownSession(Uuid),

    #[error("{} index {index} is out of range (len {len})", .section.as_str())]
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },

    #[error("Step '{}' is incomplete: {reason}", .step.title())]
    StepIncomplete { step: WizardStep, reason: String },

    #[error("Resume can only be generated from the review step (currently at '{}')", .0.title())]
    NotAtReview(WizardStep),
}
