// Analysis prompt templates.
// The schema is sent inside the prompt and mirrors `analysis::feedback::Feedback`.

use crate::models::resume::ResumeContext;

/// Machine-readable description of the response the model must return.
pub const FEEDBACK_SCHEMA: &str = r#"{
  "overall_score": number (0-100),
  "ats": {
    "score": number (0-100),
    "tips": [{"type": "good" | "improve", "tip": "string"}]
  },
  "tone_and_style": {
    "score": number (0-100),
    "tips": [{"type": "good" | "improve", "tip": "short title", "explanation": "string"}]
  },
  "content": { same shape as tone_and_style },
  "structure": { same shape as tone_and_style },
  "skills": { same shape as tone_and_style }
}"#;

const ANALYSIS_INSTRUCTIONS: &str = "\
You are an expert in ATS (Applicant Tracking Systems) and resume analysis. \
Analyze and rate the resume below and explain how to improve it. \
Be thorough and honest: low scores are expected for weak resumes, because the goal \
is to help the candidate improve. Give 3-4 tips per category.";

const OUTPUT_RULES: &str = "\
RULES:
1. Return ONLY the JSON object, no code fences and no commentary.
2. Every score is an integer from 0 to 100.
3. Every category must be present, even if it only has \"good\" tips.";

/// Renders the analysis request for a resume's target-role context.
/// Empty context fields are left out entirely. The request embeds
/// [`FEEDBACK_SCHEMA`] as the structure the response must follow.
pub fn build_analysis_prompt(context: &ResumeContext) -> String {
    let mut sections = vec![ANALYSIS_INSTRUCTIONS.to_string()];

    let target: Vec<String> = [
        ("Company", &context.company_name),
        ("Job title", &context.job_title),
        ("Job description", &context.job_description),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(label, value)| format!("{label}: {}", value.trim()))
    .collect();

    if !target.is_empty() {
        sections.push(format!(
            "TARGET ROLE (tailor the feedback to it):\n{}",
            target.join("\n")
        ));
    }

    sections.push(format!("OUTPUT SCHEMA (return exactly this structure):\n{FEEDBACK_SCHEMA}"));
    sections.push(OUTPUT_RULES.to_string());

    sections.join("\n\n")
}
