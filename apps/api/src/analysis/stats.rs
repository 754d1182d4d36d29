use serde::Serialize;

use crate::analysis::feedback::STRONG_SCORE_THRESHOLD;
use crate::models::resume::DocumentRecord;

/// Aggregate numbers shown on the resume dashboard.
/// `total_resumes` counts every record. Only completed analyses are scored;
/// records without feedback are in progress or were abandoned by a failed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_resumes: usize,
    pub average_score: u32,
    pub strong_resumes: usize,
    pub in_progress: usize,
}

pub fn compute_dashboard_stats(records: &[DocumentRecord]) -> DashboardStats {
    let scores: Vec<u32> = records
        .iter()
        .filter_map(|r| r.feedback().map(|f| f.overall_score))
        .collect();

    let average_score = if scores.is_empty() {
        0
    } else {
        let sum: u32 = scores.iter().sum();
        (sum as f64 / scores.len() as f64).round() as u32
    };

    DashboardStats {
        total_resumes: records.len(),
        average_score,
        strong_resumes: scores
            .iter()
            .filter(|&&s| s > STRONG_SCORE_THRESHOLD)
            .count(),
        in_progress: records.iter().filter(|r| !r.is_complete()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::feedback::parse_feedback;
    use crate::analysis::feedback::tests::sample_feedback_json;
    use crate::models::resume::ResumeContext;

    fn completed(score: u32) -> DocumentRecord {
        let mut record = DocumentRecord::new("user_1", ResumeContext::default());
        record
            .set_feedback(parse_feedback(&sample_feedback_json(score)).unwrap())
            .unwrap();
        record
    }

    #[test]
    fn test_empty_dashboard() {
        assert_eq!(compute_dashboard_stats(&[]), DashboardStats::default());
    }

    #[test]
    fn test_stats_count_every_record_but_score_completed_ones() {
        let records = vec![
            completed(90),
            completed(71),
            completed(70),
            DocumentRecord::new("user_1", ResumeContext::default()),
        ];
        let stats = compute_dashboard_stats(&records);
        assert_eq!(stats.total_resumes, 4);
        assert_eq!(stats.average_score, 77);
        assert_eq!(stats.strong_resumes, 2);
        assert_eq!(stats.in_progress, 1);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let stats = compute_dashboard_stats(&[completed(60), completed(61)]);
        assert_eq!(stats.average_score, 61);
    }

    #[test]
    fn test_unfinished_records_only_count_toward_total() {
        let records = vec![
            DocumentRecord::new("user_1", ResumeContext::default()),
            DocumentRecord::new("user_1", ResumeContext::default()),
        ];
        let stats = compute_dashboard_stats(&records);
        assert_eq!(stats.total_resumes, 2);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.average_score, 0);
        assert_eq!(stats.strong_resumes, 0);
    }
}
