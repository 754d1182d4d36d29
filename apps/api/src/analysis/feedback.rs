//! Feedback: the structured result an analysis produces, and its parser.
//!
//! The inference service is instructed to answer with exactly this shape
//! (see `analysis::prompts::FEEDBACK_SCHEMA`). Anything else is a parse failure;
//! out-of-range scores are rejected, never clamped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::strip_json_fences;

pub const MAX_SCORE: u32 = 100;

/// Score above which a resume counts as strong on the dashboard.
pub const STRONG_SCORE_THRESHOLD: u32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    Good,
    Improve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsTip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedTip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReview {
    pub score: u32,
    pub tips: Vec<AtsTip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReview {
    pub score: u32,
    pub tips: Vec<DetailedTip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub overall_score: u32,
    pub ats: AtsReview,
    pub tone_and_style: CategoryReview,
    pub content: CategoryReview,
    pub structure: CategoryReview,
    pub skills: CategoryReview,
}

impl Feedback {
    fn scores(&self) -> [(&'static str, u32); 6] {
        [
            ("overall_score", self.overall_score),
            ("ats", self.ats.score),
            ("tone_and_style", self.tone_and_style.score),
            ("content", self.content.score),
            ("structure", self.structure.score),
            ("skills", self.skills.score),
        ]
    }
}

#[derive(Debug, Error)]
pub enum FeedbackParseError {
    #[error("response is empty")]
    Empty,

    #[error("response is not valid feedback JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} score {score} is outside 0..={}", MAX_SCORE)]
    ScoreOutOfRange { field: &'static str, score: u32 },
}

/// Parses the normalized inference payload into `Feedback`.
pub fn parse_feedback(text: &str) -> Result<Feedback, FeedbackParseError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(FeedbackParseError::Empty);
    }

    let feedback: Feedback = serde_json::from_str(text)?;

    if let Some((field, score)) = feedback
        .scores()
        .into_iter()
        .find(|(_, score)| *score > MAX_SCORE)
    {
        return Err(FeedbackParseError::ScoreOutOfRange { field, score });
    }

    Ok(feedback)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_feedback_json(overall: u32) -> String {
        let category = serde_json::json!({
            "score": 72,
            "tips": [
                {"type": "good", "tip": "Clear headings", "explanation": "Sections are easy to scan."},
                {"type": "improve", "tip": "Quantify impact", "explanation": "Add numbers to bullets."}
            ]
        });
        serde_json::json!({
            "overall_score": overall,
            "ats": {"score": 80, "tips": [{"type": "improve", "tip": "Add role keywords"}]},
            "tone_and_style": category,
            "content": category,
            "structure": category,
            "skills": category
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_feedback() {
        let feedback = parse_feedback(&sample_feedback_json(78)).unwrap();
        assert_eq!(feedback.overall_score, 78);
        assert_eq!(feedback.ats.tips[0].kind, TipKind::Improve);
        assert_eq!(feedback.skills.tips.len(), 2);
    }

    #[test]
    fn test_parse_fenced_feedback() {
        let fenced = format!("```json\n{}\n```", sample_feedback_json(64));
        assert_eq!(parse_feedback(&fenced).unwrap().overall_score, 64);
    }

    #[test]
    fn test_parse_upper_case_fence_tag() {
        let fenced = format!("```JSON\n{}\n```", sample_feedback_json(58));
        assert_eq!(parse_feedback(&fenced).unwrap().overall_score, 58);
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_feedback("Sure! Here is my analysis of the resume.").unwrap_err();
        assert!(matches!(err, FeedbackParseError::Json(_)));
    }

    #[test]
    fn test_parse_rejects_truncated_json() {
        let full = sample_feedback_json(50);
        let truncated = &full[..full.len() / 2];
        assert!(matches!(
            parse_feedback(truncated).unwrap_err(),
            FeedbackParseError::Json(_)
        ));
    }

    #[test]
    fn test_parse_rejects_missing_category() {
        let mut value: serde_json::Value =
            serde_json::from_str(&sample_feedback_json(50)).unwrap();
        value.as_object_mut().unwrap().remove("structure");
        assert!(parse_feedback(&value.to_string()).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_score() {
        let err = parse_feedback(&sample_feedback_json(140)).unwrap_err();
        assert!(matches!(
            err,
            FeedbackParseError::ScoreOutOfRange {
                field: "overall_score",
                score: 140
            }
        ));
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert!(matches!(
            parse_feedback("   \n").unwrap_err(),
            FeedbackParseError::Empty
        ));
    }
}
