//! Step cursor for the builder wizard.
//!
//! Steps run 1..=8 in a fixed order. `next` is gated by the current step's own
//! rule; the jump to review is not, so generation must treat every collected
//! field as optional.

use serde::{Deserialize, Serialize};

use crate::builder::record::CollectorRecord;
use crate::builder::BuilderError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    PersonalInfo,
    Summary,
    Experience,
    Education,
    Skills,
    Languages,
    ProjectsCertificates,
    Generate,
}

impl WizardStep {
    pub const ALL: [WizardStep; 8] = [
        WizardStep::PersonalInfo,
        WizardStep::Summary,
        WizardStep::Experience,
        WizardStep::Education,
        WizardStep::Skills,
        WizardStep::Languages,
        WizardStep::ProjectsCertificates,
        WizardStep::Generate,
    ];

    pub const FIRST: WizardStep = WizardStep::PersonalInfo;
    pub const REVIEW: WizardStep = WizardStep::Generate;

    /// 1-based position.
    pub fn position(self) -> usize {
        self as usize + 1
    }

    pub fn from_position(position: usize) -> Option<WizardStep> {
        position
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::PersonalInfo => "Personal Information",
            WizardStep::Summary => "Professional Summary",
            WizardStep::Experience => "Work Experience",
            WizardStep::Education => "Education",
            WizardStep::Skills => "Skills",
            WizardStep::Languages => "Languages",
            WizardStep::ProjectsCertificates => "Projects & Certificates",
            WizardStep::Generate => "Review & Generate",
        }
    }

    pub fn is_review(self) -> bool {
        self == Self::REVIEW
    }

    /// Rule that must hold before leaving this step with `next`. Sections
    /// that may legitimately stay empty always pass.
    pub fn check(self, record: &CollectorRecord) -> Result<(), BuilderError> {
        let incomplete = |reason: String| BuilderError::StepIncomplete { step: self, reason };
        match self {
            WizardStep::PersonalInfo => {
                let info = &record.personal_info;
                if info.first_name.trim().is_empty() || info.last_name.trim().is_empty() {
                    return Err(incomplete("first and last name are required".into()));
                }
                if !info.email.trim().is_empty() && !info.email.contains('@') {
                    return Err(incomplete(format!("'{}' is not an email address", info.email)));
                }
            }
            WizardStep::Experience => {
                if let Some(i) = record
                    .experiences
                    .iter()
                    .position(|e| e.company.trim().is_empty() || e.position.trim().is_empty())
                {
                    return Err(incomplete(format!(
                        "experience {} needs a company and a position",
                        i + 1
                    )));
                }
            }
            WizardStep::Education => {
                if let Some(i) = record
                    .education
                    .iter()
                    .position(|e| e.institution.trim().is_empty())
                {
                    return Err(incomplete(format!("education {} needs an institution", i + 1)));
                }
            }
            WizardStep::ProjectsCertificates => {
                if let Some(i) = record.projects.iter().position(|p| p.name.trim().is_empty()) {
                    return Err(incomplete(format!("project {} needs a name", i + 1)));
                }
                if let Some(i) = record
                    .certificates
                    .iter()
                    .position(|c| c.name.trim().is_empty())
                {
                    return Err(incomplete(format!("certificate {} needs a name", i + 1)));
                }
            }
            WizardStep::Summary
            | WizardStep::Skills
            | WizardStep::Languages
            | WizardStep::Generate => {}
        }
        Ok(())
    }
}

/// Where `previous` leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    To(WizardStep),
    Exit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wizard {
    step: WizardStep,
    record: CollectorRecord,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn record(&self) -> &CollectorRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut CollectorRecord {
        &mut self.record
    }

    pub fn into_record(self) -> CollectorRecord {
        self.record
    }

    /// Advances one step once the current step's rule holds. A no-op at review.
    pub fn next(&mut self) -> Result<WizardStep, BuilderError> {
        if self.step.is_review() {
            return Ok(self.step);
        }
        self.step.check(&self.record)?;
        if let Some(next) = WizardStep::from_position(self.step.position() + 1) {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn previous(&mut self) -> Back {
        match self.step.position().checked_sub(1).and_then(WizardStep::from_position) {
            Some(prev) => {
                self.step = prev;
                Back::To(prev)
            }
            None => Back::Exit,
        }
    }

    pub fn jump_to_review(&mut self) -> WizardStep {
        self.step = WizardStep::REVIEW;
        self.step
    }
}
