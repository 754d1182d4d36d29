//! The Collector Record: everything the builder wizard has gathered so far.
//!
//! Every mutation touches exactly one leaf value or one list element. List
//! sections keep their order and close gaps on removal; skills, languages and
//! project technologies are ordered sets (duplicate or blank values are ignored).

use serde::{Deserialize, Serialize};

use crate::builder::BuilderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Experience,
    Education,
    Skills,
    Languages,
    Projects,
    Certificates,
    Technologies,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Languages => "languages",
            Section::Projects => "projects",
            Section::Certificates => "certificates",
            Section::Technologies => "technologies",
        }
    }
}

/// Ordered list with set semantics. Values are trimmed; matching is exact and
/// case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueList(Vec<String>);

impl UniqueList {
    /// Appends the trimmed value. Returns false (and changes nothing) when the
    /// value is blank or already present.
    pub fn insert(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.0.iter().any(|v| v == value) {
            return false;
        }
        self.0.push(value.to_string());
        true
    }

    pub fn remove(&mut self, section: Section, index: usize) -> Result<String, BuilderError> {
        remove_entry(&mut self.0, section, index)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for UniqueList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = UniqueList::default();
        for value in iter {
            list.insert(value.as_ref());
        }
        list
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        join_non_empty(&[&self.first_name, &self.last_name], " ")
    }

    /// `address, city, state zip` with missing parts dropped.
    pub fn full_address(&self) -> String {
        let region = join_non_empty(&[&self.state, &self.zip_code], " ");
        join_non_empty(&[&self.address, &self.city, &region], ", ")
    }
}

/// One personal-info field and its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PersonalField {
    FirstName(String),
    LastName(String),
    Email(String),
    Phone(String),
    Address(String),
    City(String),
    State(String),
    ZipCode(String),
}

impl PersonalInfo {
    pub fn apply(&mut self, field: PersonalField) {
        match field {
            PersonalField::FirstName(v) => self.first_name = v,
            PersonalField::LastName(v) => self.last_name = v,
            PersonalField::Email(v) => self.email = v,
            PersonalField::Phone(v) => self.phone = v,
            PersonalField::Address(v) => self.address = v,
            PersonalField::City(v) => self.city = v,
            PersonalField::State(v) => self.state = v,
            PersonalField::ZipCode(v) => self.zip_code = v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ExperienceField {
    Company(String),
    Position(String),
    StartDate(String),
    EndDate(String),
    Current(bool),
    Description(String),
}

impl ExperienceEntry {
    pub fn apply(&mut self, field: ExperienceField) {
        match field {
            ExperienceField::Company(v) => self.company = v,
            ExperienceField::Position(v) => self.position = v,
            ExperienceField::StartDate(v) => self.start_date = v,
            ExperienceField::EndDate(v) => self.end_date = v,
            ExperienceField::Current(v) => self.current = v,
            ExperienceField::Description(v) => self.description = v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum EducationField {
    Institution(String),
    Degree(String),
    Field(String),
    StartDate(String),
    EndDate(String),
    Gpa(Option<String>),
}

impl EducationEntry {
    pub fn apply(&mut self, field: EducationField) {
        match field {
            EducationField::Institution(v) => self.institution = v,
            EducationField::Degree(v) => self.degree = v,
            EducationField::Field(v) => self.field = v,
            EducationField::StartDate(v) => self.start_date = v,
            EducationField::EndDate(v) => self.end_date = v,
            EducationField::Gpa(v) => self.gpa = v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: UniqueList,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ProjectField {
    Name(String),
    Description(String),
    Link(Option<String>),
}

impl ProjectEntry {
    pub fn apply(&mut self, field: ProjectField) {
        match field {
            ProjectField::Name(v) => self.name = v,
            ProjectField::Description(v) => self.description = v,
            ProjectField::Link(v) => self.link = v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEntry {
    pub name: String,
    pub issuer: String,
    pub date: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum CertificateField {
    Name(String),
    Issuer(String),
    Date(String),
    Link(Option<String>),
}

impl CertificateEntry {
    pub fn apply(&mut self, field: CertificateField) {
        match field {
            CertificateField::Name(v) => self.name = v,
            CertificateField::Issuer(v) => self.issuer = v,
            CertificateField::Date(v) => self.date = v,
            CertificateField::Link(v) => self.link = v,
        }
    }
}

/// Working memory of one builder session. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorRecord {
    pub personal_info: PersonalInfo,
    pub professional_summary: String,
    pub experiences: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: UniqueList,
    pub languages: UniqueList,
    pub projects: Vec<ProjectEntry>,
    pub certificates: Vec<CertificateEntry>,
}

impl CollectorRecord {
    pub fn experience_mut(&mut self, index: usize) -> Result<&mut ExperienceEntry, BuilderError> {
        entry_mut(&mut self.experiences, Section::Experience, index)
    }

    pub fn education_mut(&mut self, index: usize) -> Result<&mut EducationEntry, BuilderError> {
        entry_mut(&mut self.education, Section::Education, index)
    }

    pub fn project_mut(&mut self, index: usize) -> Result<&mut ProjectEntry, BuilderError> {
        entry_mut(&mut self.projects, Section::Projects, index)
    }

    pub fn certificate_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut CertificateEntry, BuilderError> {
        entry_mut(&mut self.certificates, Section::Certificates, index)
    }
}

pub(crate) fn entry_mut<T>(
    list: &mut [T],
    section: Section,
    index: usize,
) -> Result<&mut T, BuilderError> {
    let len = list.len();
    list.get_mut(index).ok_or(BuilderError::IndexOutOfRange {
        section,
        index,
        len,
    })
}

/// Removes by position; later entries shift down by one.
pub(crate) fn remove_entry<T>(
    list: &mut Vec<T>,
    section: Section,
    index: usize,
) -> Result<T, BuilderError> {
    if index >= list.len() {
        return Err(BuilderError::IndexOutOfRange {
            section,
            index,
            len: list.len(),
        });
    }
    Ok(list.remove(index))
}

fn join_non_empty(parts: &[&String], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_list_ignores_duplicates_and_blanks() {
        let mut skills = UniqueList::default();
        assert!(skills.insert("Rust"));
        assert!(!skills.insert("  Rust "));
        assert!(!skills.insert("   "));
        assert!(!skills.insert(""));
        assert!(skills.insert("rust"));
        assert_eq!(skills.as_slice(), ["Rust", "rust"]);
    }

    #[test]
    fn test_unique_list_remove_shifts() {
        let mut langs: UniqueList = ["English", "German", "Polish"].into_iter().collect();
        assert_eq!(langs.remove(Section::Languages, 0).unwrap(), "English");
        assert_eq!(langs.as_slice(), ["German", "Polish"]);
        assert!(matches!(
            langs.remove(Section::Languages, 2),
            Err(BuilderError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
    }

    #[test]
    fn test_remove_entry_shrinks_by_one() {
        let mut list = vec!["a", "b", "c", "d"];
        remove_entry(&mut list, Section::Experience, 1).unwrap();
        assert_eq!(list, ["a", "c", "d"]);
    }

    #[test]
    fn test_entry_mut_out_of_range() {
        let mut record = CollectorRecord::default();
        assert!(matches!(
            record.experience_mut(0),
            Err(BuilderError::IndexOutOfRange {
                section: Section::Experience,
                len: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_personal_info_formatting() {
        let info = PersonalInfo {
            first_name: "Jane".into(),
            last_name: " Doe ".into(),
            address: "1 Main St".into(),
            state: "CA".into(),
            zip_code: "94016".into(),
            ..Default::default()
        };
        assert_eq!(info.full_name(), "Jane Doe");
        assert_eq!(info.full_address(), "1 Main St, CA 94016");
    }

    #[test]
    fn test_field_updates_touch_one_leaf() {
        let mut entry = ExperienceEntry {
            company: "Acme".into(),
            position: "Engineer".into(),
            ..Default::default()
        };
        entry.apply(ExperienceField::Current(true));
        assert!(entry.current);
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.position, "Engineer");
    }

    #[test]
    fn test_field_update_wire_format() {
        let field: ExperienceField =
            serde_json::from_value(serde_json::json!({"field": "start_date", "value": "2021-03"}))
                .unwrap();
        assert_eq!(field, ExperienceField::StartDate("2021-03".into()));
    }
}
