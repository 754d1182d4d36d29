//! Wizard actions and the reducer that applies them.

use serde::{Deserialize, Serialize};

use crate::builder::record::{
    remove_entry, CertificateEntry, CertificateField, EducationEntry, EducationField,
    ExperienceEntry, ExperienceField, PersonalField, ProjectEntry, ProjectField, Section,
};
use crate::builder::wizard::{Back, Wizard, WizardStep};
use crate::builder::BuilderError;

/// One user interaction with the wizard. Each variant touches the step cursor
/// or a single leaf of the record, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    Next,
    Previous,
    JumpToReview,

    SetPersonal {
        update: PersonalField,
    },
    SetSummary {
        value: String,
    },

    AddExperience {
        #[serde(default)]
        entry: ExperienceEntry,
    },
    UpdateExperience {
        index: usize,
        update: ExperienceField,
    },
    RemoveExperience {
        index: usize,
    },

    AddEducation {
        #[serde(default)]
        entry: EducationEntry,
    },
    UpdateEducation {
        index: usize,
        update: EducationField,
    },
    RemoveEducation {
        index: usize,
    },

    AddSkill {
        value: String,
    },
    RemoveSkill {
        index: usize,
    },
    AddLanguage {
        value: String,
    },
    RemoveLanguage {
        index: usize,
    },

    AddProject {
        #[serde(default)]
        entry: ProjectEntry,
    },
    UpdateProject {
        index: usize,
        update: ProjectField,
    },
    AddProjectTechnology {
        index: usize,
        value: String,
    },
    RemoveProjectTechnology {
        index: usize,
        technology: usize,
    },
    RemoveProject {
        index: usize,
    },

    AddCertificate {
        #[serde(default)]
        entry: CertificateEntry,
    },
    UpdateCertificate {
        index: usize,
        update: CertificateField,
    },
    RemoveCertificate {
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The session lives on at this step.
    Updated(WizardStep),
    /// `previous` from the first step; the caller drops the session.
    Exited,
}

/// Applies one action. On error the wizard is left unchanged.
pub fn apply(wizard: &mut Wizard, action: WizardAction) -> Result<Outcome, BuilderError> {
    let record = wizard.record_mut();
    match action {
        WizardAction::Next => return wizard.next().map(Outcome::Updated),
        WizardAction::Previous => {
            return Ok(match wizard.previous() {
                Back::To(step) => Outcome::Updated(step),
                Back::Exit => Outcome::Exited,
            })
        }
        WizardAction::JumpToReview => return Ok(Outcome::Updated(wizard.jump_to_review())),

        WizardAction::SetPersonal { update } => record.personal_info.apply(update),
        WizardAction::SetSummary { value } => record.professional_summary = value,

        WizardAction::AddExperience { entry } => record.experiences.push(entry),
        WizardAction::UpdateExperience { index, update } => {
            record.experience_mut(index)?.apply(update)
        }
        WizardAction::RemoveExperience { index } => {
            remove_entry(&mut record.experiences, Section::Experience, index)?;
        }

        WizardAction::AddEducation { entry } => record.education.push(entry),
        WizardAction::UpdateEducation { index, update } => {
            record.education_mut(index)?.apply(update)
        }
        WizardAction::RemoveEducation { index } => {
            remove_entry(&mut record.education, Section::Education, index)?;
        }

        WizardAction::AddSkill { value } => {
            record.skills.insert(&value);
        }
        WizardAction::RemoveSkill { index } => {
            record.skills.remove(Section::Skills, index)?;
        }
        WizardAction::AddLanguage { value } => {
            record.languages.insert(&value);
        }
        WizardAction::RemoveLanguage { index } => {
            record.languages.remove(Section::Languages, index)?;
        }

        WizardAction::AddProject { entry } => record.projects.push(entry),
        WizardAction::UpdateProject { index, update } => record.project_mut(index)?.apply(update),
        WizardAction::AddProjectTechnology { index, value } => {
            record.project_mut(index)?.technologies.insert(&value);
        }
        WizardAction::RemoveProjectTechnology { index, technology } => {
            record
                .project_mut(index)?
                .technologies
                .remove(Section::Technologies, technology)?;
        }
        WizardAction::RemoveProject { index } => {
            remove_entry(&mut record.projects, Section::Projects, index)?;
        }

        WizardAction::AddCertificate { entry } => record.certificates.push(entry),
        WizardAction::UpdateCertificate { index, update } => {
            record.certificate_mut(index)?.apply(update)
        }
        WizardAction::RemoveCertificate { index } => {
            remove_entry(&mut record.certificates, Section::Certificates, index)?;
        }
    }
    Ok(Outcome::Updated(wizard.step()))
}
