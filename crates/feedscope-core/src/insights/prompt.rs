//! Prompt construction for the analysis stages

use super::AnalyticsSummary;
use crate::db::FeedbackRecord;
use crate::llm::truncate_chars;
use crate::search::SearchResult;
use std::fmt::Write;

/// Bounds on how much feedback text goes into a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLimits {
    pub max_records: usize,
    pub max_record_chars: usize,
    pub max_total_chars: usize,
}

impl Default for SampleLimits {
    fn default() -> Self {
        Self {
            max_records: 50,
            max_record_chars: 200,
            max_total_chars: 8000,
        }
    }
}

/// Render the newest records as prompt lines within the limits
pub fn feedback_sample(records: &[FeedbackRecord], limits: SampleLimits) -> String {
    let mut sample = String::new();
    let mut used = 0;

    for record in records.iter().take(limits.max_records) {
        let line = format!(
            "- Rating: {}/5 - {} (by {})\n",
            record.rating,
            truncate_chars(record.text.trim(), limits.max_record_chars),
            record.author
        );
        let len = line.chars().count();
        if used + len > limits.max_total_chars {
            break;
        }
        used += len;
        sample.push_str(&line);
    }

    sample
}

fn statistics_block(summary: &AnalyticsSummary) -> String {
    let mut block = String::new();
    let _ = writeln!(block, "Total feedback: {}", summary.total);
    let _ = writeln!(block, "Average rating: {:.2}/5", summary.average_rating);
    let _ = writeln!(
        block,
        "Positive (4-5 stars): {} ({}%)",
        summary.positive_count, summary.positive_percentage
    );
    let _ = writeln!(block, "Neutral (3 stars): {}", summary.neutral_count);
    let _ = writeln!(block, "Negative (1-2 stars): {}", summary.negative_count);
    let _ = writeln!(
        block,
        "Recent trend: {} (recent {:.2} vs older {:.2})",
        summary.trend.direction, summary.trend.recent_average, summary.trend.older_average
    );
    if !summary.top_words.is_empty() {
        let words: Vec<&str> = summary
            .top_words
            .iter()
            .take(10)
            .map(|(w, _)| w.as_str())
            .collect();
        let _ = writeln!(block, "Frequent terms: {}", words.join(", "));
    }
    block
}

/// First-stage prompt: structured analysis of the sample
pub fn primary_prompt(
    records: &[FeedbackRecord],
    summary: &AnalyticsSummary,
    similar: &[SearchResult],
    query: Option<&str>,
    limits: SampleLimits,
) -> String {
    let mut prompt = String::from(
        "You are an expert customer feedback analyst. Analyze the feedback below and \
         respond in Markdown with these sections:\n\
         ## Executive Summary\n\
         ## Strengths & Positive Feedback\n\
         ## Areas for Improvement\n\
         ## Trends & Patterns\n\
         ## Actionable Recommendations\n\n",
    );

    prompt.push_str("Statistics:\n");
    prompt.push_str(&statistics_block(summary));

    if let Some(query) = query {
        let _ = writeln!(prompt, "\nFocus the analysis on: {}", query);
    }

    if !similar.is_empty() {
        prompt.push_str("\nFeedback most related to the focus:\n");
        let related: Vec<FeedbackRecord> = similar.iter().map(|r| r.record.clone()).collect();
        prompt.push_str(&feedback_sample(&related, limits));
    }

    prompt.push_str("\nFeedback data (newest first):\n");
    prompt.push_str(&feedback_sample(records, limits));
    prompt
}

/// Second-stage prompt seeded with the primary analysis
pub fn enhancement_prompt(primary: &str, summary: &AnalyticsSummary) -> String {
    format!(
        "Below is an analysis of {} customer reviews (average rating {:.2}/5, {}% positive).\n\n\
         {}\n\n\
         Extend it with a short \"## Strategic Priorities\" section: the three most \
         impactful next steps, each with the expected effect on customer satisfaction. \
         Do not repeat the analysis.",
        summary.total, summary.average_rating, summary.positive_percentage, primary
    )
}

/// Conversational answer to an operator question
///
/// `related` holds search hits for the question; when it is empty the
/// newest records are sampled instead.
pub fn chat_prompt(
    question: &str,
    records: &[FeedbackRecord],
    related: &[SearchResult],
    summary: &AnalyticsSummary,
    limits: SampleLimits,
) -> String {
    let mut prompt = String::from(
        "You are a friendly feedback analysis assistant talking to the owner of a \
         customer feedback collection.\n\n",
    );
    let _ = writeln!(prompt, "The owner asked: \"{}\"\n", question.trim());

    prompt.push_str("Context:\n");
    let _ = writeln!(prompt, "- Total feedback: {}", summary.total);
    let _ = writeln!(prompt, "- Average rating: {:.1}/5", summary.average_rating);
    let _ = writeln!(prompt, "- Positive feedback (4-5 stars): {}", summary.positive_count);
    let _ = writeln!(prompt, "- Critical feedback (1-2 stars): {}", summary.negative_count);

    if related.is_empty() {
        prompt.push_str("\nRecent feedback (newest first):\n");
        prompt.push_str(&feedback_sample(records, limits));
    } else {
        prompt.push_str("\nFeedback related to the question:\n");
        let related: Vec<FeedbackRecord> = related.iter().map(|r| r.record.clone()).collect();
        prompt.push_str(&feedback_sample(&related, limits));
    }

    prompt.push_str(
        "\nAnswer the question directly in a natural, conversational tone. Do not mention \
         record ids or database details. Focus on insights the owner can act on and, \
         where it helps, suggest a follow-up question.\n",
    );
    prompt
}
