// Resume generation prompt templates.
// Every collected field is optional here: the wizard can jump straight to review.

use crate::builder::record::{
    CertificateEntry, CollectorRecord, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry,
};
use crate::llm_client::prompts::FIDELITY_INSTRUCTION;
use crate::llm_client::strip_code_fences;

pub const GENERATION_SYSTEM: &str = "You are a professional resume writer and front-end \
    developer. You respond with a single complete HTML document and nothing else.";

const GENERATION_INTRO: &str =
    "Generate a professional resume in HTML format based on the following information:";

const STYLE_RULES: &str = "\
Create a professional, ATS-friendly resume in clean HTML with the CSS embedded in a \
<style> element. Make it modern and visually appealing while keeping it readable and \
printable to PDF. Return only the HTML document, without markdown code fences.";

const PRESENT: &str = "Present";

/// Renders the full generation request for a collected record.
/// Sections with nothing in them are omitted entirely.
pub fn build_generation_prompt(record: &CollectorRecord) -> String {
    let mut sections = vec![GENERATION_INTRO.to_string()];

    let mut push = |title: &str, body: Option<String>| {
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            sections.push(format!("{title}:\n{body}"));
        }
    };

    push("PERSONAL INFORMATION", personal_block(&record.personal_info));
    push(
        "PROFESSIONAL SUMMARY",
        non_empty(&record.professional_summary).map(str::to_string),
    );
    push("SKILLS", Some(record.skills.as_slice().join(", ")));
    push("LANGUAGES", Some(record.languages.as_slice().join(", ")));
    push("WORK EXPERIENCE", list_block(&record.experiences, experience_line));
    push("EDUCATION", list_block(&record.education, education_line));
    push("PROJECTS", list_block(&record.projects, project_line));
    push("CERTIFICATES", list_block(&record.certificates, certificate_line));

    sections.push(STYLE_RULES.to_string());
    sections.push(FIDELITY_INSTRUCTION.to_string());
    sections.join("\n\n")
}

/// `<First>_<Last>_Resume.html`, falling back to `Resume.html` when no name was given.
pub fn download_file_name(info: &PersonalInfo) -> String {
    let parts: Vec<String> = [&info.first_name, &info.last_name]
        .into_iter()
        .filter_map(|p| non_empty(p))
        .map(|p| {
            p.chars()
                .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
                .collect::<String>()
        })
        .chain(std::iter::once("Resume".to_string()))
        .collect();
    format!("{}.html", parts.join("_"))
}

/// Model output with any ```html fence removed.
pub fn extract_html(text: &str) -> &str {
    strip_code_fences(text, "html").trim()
}

fn personal_block(info: &PersonalInfo) -> Option<String> {
    let full_name = info.full_name();
    let full_address = info.full_address();
    let lines: Vec<String> = [
        ("Name", full_name.as_str()),
        ("Email", info.email.as_str()),
        ("Phone", info.phone.as_str()),
        ("Address", full_address.as_str()),
    ]
    .into_iter()
    .filter_map(|(label, value)| non_empty(value).map(|v| format!("- {label}: {v}")))
    .collect();
    Some(lines.join("\n"))
}

fn list_block<T>(entries: &[T], line: fn(&T) -> Option<String>) -> Option<String> {
    let lines: Vec<String> = entries.iter().filter_map(line).collect();
    Some(lines.join("\n"))
}

fn experience_line(exp: &ExperienceEntry) -> Option<String> {
    let end = if exp.current { PRESENT } else { exp.end_date.as_str() };
    let head = match (non_empty(&exp.position), non_empty(&exp.company)) {
        (Some(position), Some(company)) => format!("{position} at {company}"),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => String::new(),
    };
    entry_line(head, date_range(&exp.start_date, end), &[("", exp.description.as_str())])
}

fn education_line(edu: &EducationEntry) -> Option<String> {
    let mut head = match (non_empty(&edu.degree), non_empty(&edu.field)) {
        (Some(degree), Some(field)) => format!("{degree} in {field}"),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => String::new(),
    };
    if let Some(institution) = non_empty(&edu.institution) {
        head = if head.is_empty() {
            institution.to_string()
        } else {
            format!("{head} from {institution}")
        };
    }
    let gpa = edu.gpa.as_deref().unwrap_or_default();
    entry_line(
        head,
        date_range(&edu.start_date, &edu.end_date),
        &[("GPA: ", gpa)],
    )
}

fn project_line(project: &ProjectEntry) -> Option<String> {
    let head = match (non_empty(&project.name), non_empty(&project.description)) {
        (Some(name), Some(description)) => format!("{name}: {description}"),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => String::new(),
    };
    let technologies = project.technologies.as_slice().join(", ");
    entry_line(
        head,
        None,
        &[
            ("Technologies: ", technologies.as_str()),
            ("Link: ", project.link.as_deref().unwrap_or_default()),
        ],
    )
}

fn certificate_line(cert: &CertificateEntry) -> Option<String> {
    let head = match (non_empty(&cert.name), non_empty(&cert.issuer)) {
        (Some(name), Some(issuer)) => format!("{name} from {issuer}"),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => String::new(),
    };
    let date = non_empty(&cert.date).map(str::to_string);
    entry_line(
        head,
        date,
        &[("Link: ", cert.link.as_deref().unwrap_or_default())],
    )
}

/// `- head (dates)` followed by indented detail lines. `None` when the entry
/// carries nothing at all.
fn entry_line(head: String, dates: Option<String>, details: &[(&str, &str)]) -> Option<String> {
    let mut first = head;
    if let Some(dates) = dates {
        first = if first.is_empty() {
            dates
        } else {
            format!("{first} ({dates})")
        };
    }

    let details: Vec<String> = details
        .iter()
        .filter_map(|(label, value)| non_empty(value).map(|v| format!("  {label}{v}")))
        .collect();

    if first.is_empty() && details.is_empty() {
        return None;
    }
    let mut lines = vec![format!("- {first}").trim_end().to_string()];
    lines.extend(details);
    Some(lines.join("\n"))
}

fn date_range(start: &str, end: &str) -> Option<String> {
    match (non_empty(start), non_empty(end)) {
        (Some(start), Some(end)) => Some(format!("{start} - {end}")),
        (Some(start), None) => Some(start.to_string()),
        (None, Some(end)) => Some(end.to_string()),
        (None, None) => None,
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::record::UniqueList;

    fn jane() -> CollectorRecord {
        CollectorRecord {
            personal_info: PersonalInfo {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jane@example.com".into(),
                city: "Berlin".into(),
                ..Default::default()
            },
            professional_summary: "Backend engineer.".into(),
            experiences: vec![ExperienceEntry {
                company: "Acme".into(),
                position: "Engineer".into(),
                start_date: "2021-03".into(),
                end_date: "2022-01".into(),
                current: true,
                description: "Built the billing service.".into(),
            }],
            skills: ["Rust", "Go", "SQL"].into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let record = jane();
        assert_eq!(build_generation_prompt(&record), build_generation_prompt(&record));
    }

    #[test]
    fn test_prompt_includes_every_collected_field() {
        let prompt = build_generation_prompt(&jane());
        assert!(prompt.contains("- Name: Jane Doe"));
        assert!(prompt.contains("- Email: jane@example.com"));
        assert!(prompt.contains("- Address: Berlin"));
        assert!(prompt.contains("PROFESSIONAL SUMMARY:\nBackend engineer."));
        assert!(prompt.contains("SKILLS:\nRust, Go, SQL"));
        assert!(prompt.contains("- Engineer at Acme (2021-03 - Present)"));
        assert!(prompt.contains("  Built the billing service."));
        assert!(prompt.contains(FIDELITY_INSTRUCTION));
    }

    #[test]
    fn test_current_role_hides_end_date() {
        let prompt = build_generation_prompt(&jane());
        assert!(!prompt.contains("2022-01"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let prompt = build_generation_prompt(&jane());
        for header in ["LANGUAGES:", "EDUCATION:", "PROJECTS:", "CERTIFICATES:"] {
            assert!(!prompt.contains(header), "unexpected {header}");
        }
    }

    #[test]
    fn test_empty_record_renders_only_instructions() {
        let prompt = build_generation_prompt(&CollectorRecord::default());
        assert!(prompt.starts_with(GENERATION_INTRO));
        assert!(!prompt.contains("PERSONAL INFORMATION:"));
        assert!(!prompt.contains("SKILLS:"));
        assert!(!prompt.contains("WORK EXPERIENCE:"));
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let record = CollectorRecord {
            education: vec![EducationEntry::default()],
            certificates: vec![CertificateEntry {
                name: "CKA".into(),
                issuer: "CNCF".into(),
                date: "2023".into(),
                link: Some("https://example.com/cka".into()),
            }],
            ..Default::default()
        };
        let prompt = build_generation_prompt(&record);
        assert!(!prompt.contains("EDUCATION:"));
        assert!(prompt.contains("CERTIFICATES:\n- CKA from CNCF (2023)\n  Link: https://example.com/cka"));
    }

    #[test]
    fn test_projects_and_education_lines() {
        let record = CollectorRecord {
            education: vec![EducationEntry {
                institution: "TU Berlin".into(),
                degree: "BSc".into(),
                field: "Computer Science".into(),
                start_date: "2015".into(),
                end_date: "2019".into(),
                gpa: Some("1.7".into()),
            }],
            projects: vec![ProjectEntry {
                name: "skillsnap".into(),
                description: "Resume analyzer".into(),
                technologies: UniqueList::from_iter(["axum", "tokio"]),
                link: None,
            }],
            ..Default::default()
        };
        let prompt = build_generation_prompt(&record);
        assert!(prompt.contains("- BSc in Computer Science from TU Berlin (2015 - 2019)\n  GPA: 1.7"));
        assert!(prompt.contains("- skillsnap: Resume analyzer\n  Technologies: axum, tokio"));
        assert!(!prompt.contains("Link:"));
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name(&jane().personal_info), "Jane_Doe_Resume.html");
        assert_eq!(download_file_name(&PersonalInfo::default()), "Resume.html");
        let info = PersonalInfo {
            first_name: "Mary Ann".into(),
            last_name: "O'Neil".into(),
            ..Default::default()
        };
        assert_eq!(download_file_name(&info), "Mary_Ann_O_Neil_Resume.html");
    }

    #[test]
    fn test_extract_html_strips_fences() {
        let raw = "```html\n<html><body>Jane</body></html>\n```";
        assert_eq!(extract_html(raw), "<html><body>Jane</body></html>");
    }
}
