//! Deterministic narratives built from statistics alone

use super::{AnalyticsSummary, TrendDirection};
use std::fmt::Write;

/// Narrative used when no records fall in the window
pub const NO_DATA_NARRATIVE: &str =
    "No feedback data available for analysis in the selected timeframe.";

/// Recommendation banded by positive percentage
pub fn recommendation(positive_percentage: f64) -> &'static str {
    if positive_percentage > 80.0 {
        "Customer satisfaction is excellent. Keep doing what works and use positive \
         reviews as testimonials."
    } else if positive_percentage >= 60.0 {
        "Satisfaction is good with room to grow. Review neutral and critical feedback \
         for recurring themes."
    } else {
        "Satisfaction needs attention. Prioritize the issues raised in critical reviews \
         and follow up with affected customers."
    }
}

/// Markdown report derived only from the summary
pub fn narrative(summary: &AnalyticsSummary) -> String {
    if summary.is_empty() {
        return NO_DATA_NARRATIVE.to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "## Executive Summary\n");
    let _ = writeln!(
        out,
        "{} reviews with an average rating of {:.2}/5. {}% of customers rated 4 stars or higher.\n",
        summary.total, summary.average_rating, summary.positive_percentage
    );

    let _ = writeln!(out, "## Rating Breakdown\n");
    for (rating, count) in summary.rating_histogram.iter().rev() {
        let _ = writeln!(out, "- {} stars: {}", rating, count);
    }
    let _ = writeln!(
        out,
        "- Positive: {} ({}%), neutral: {} ({}%), negative: {} ({}%)\n",
        summary.positive_count,
        summary.positive_percentage,
        summary.neutral_count,
        summary.neutral_percentage(),
        summary.negative_count,
        summary.negative_percentage()
    );

    let _ = writeln!(out, "## Trend\n");
    let trend = &summary.trend;
    let verdict = match trend.direction {
        TrendDirection::Improving => "Ratings are improving",
        TrendDirection::Declining => "Ratings are declining",
        TrendDirection::Stable => "Ratings are stable",
    };
    let _ = writeln!(
        out,
        "{} (recent average {:.2} vs {:.2} before).\n",
        verdict, trend.recent_average, trend.older_average
    );

    let _ = writeln!(out, "## Recommendation\n");
    let _ = write!(out, "{}", recommendation(summary.positive_percentage));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::FeedbackRecord;
    use chrono::Utc;

    #[test]
    fn test_recommendation_bands() {
        assert!(recommendation(95.0).contains("excellent"));
        assert!(recommendation(80.0).contains("room to grow"));
        assert!(recommendation(60.0).contains("room to grow"));
        assert!(recommendation(59.9).contains("needs attention"));
    }

    #[test]
    fn test_narrative_is_deterministic() {
        let records = vec![
            FeedbackRecord::new(1, "Ana", "Great support", 5, Utc::now()),
            FeedbackRecord::new(2, "Bo", "Slow and buggy app", 1, Utc::now()),
        ];
        let summary = AnalyticsSummary::from_records(&records);
        let text = narrative(&summary);
        assert_eq!(text, narrative(&summary));
        assert!(text.contains("## Executive Summary"));
        assert!(text.contains("2 reviews"));
        assert!(text.contains("- 5 stars: 1"));
        assert!(text.contains("needs attention"));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(narrative(&AnalyticsSummary::default()), NO_DATA_NARRATIVE);
    }
}
