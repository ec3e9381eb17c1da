//! Terminal output formatter

use feedscope_core::{ChatAnswer, FeedbackRecord, InsightReport, SearchResponse};

const EXCERPT_CHARS: usize = 80;

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn record_line(record: &FeedbackRecord) -> String {
    format!(
        "#{:<5} {} {} {}: {}\n",
        record.id.0,
        stars(record.rating),
        record.created_at.format("%Y-%m-%d"),
        record.author,
        excerpt(&record.text)
    )
}

pub fn format_stored(record: &FeedbackRecord) -> String {
    let embedded = if record.embedding.is_some() {
        "embedded"
    } else {
        "no embedding yet, run `feedscope embed`"
    };
    format!("Stored feedback #{} ({})\n", record.id, embedded)
}

pub fn format_records(records: &[FeedbackRecord]) -> String {
    records.iter().map(record_line).collect()
}

pub fn format_search_response(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return "No matching feedback\n".to_string();
    }

    let mut output = String::new();
    for result in &response.results {
        output.push_str(&format!(
            "{:>3.0}% [{}] {}",
            result.score,
            result.source,
            record_line(&result.record)
        ));
    }
    output
}

pub fn format_report(report: &InsightReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Insights for the last {} days ({} records, generated by {})\n",
        report.timeframe_days, report.summary.total, report.generated_by
    ));
    if let Some(ref provider) = report.provider {
        output.push_str(&format!("Provider: {}\n", provider));
    }
    if let Some(ref query) = report.query {
        output.push_str(&format!("Focus: {}\n", query));
    }
    output.push('\n');
    output.push_str(report.narrative.trim_end());
    output.push('\n');

    if !report.similar_feedback.is_empty() {
        output.push_str("\nRelated feedback:\n");
        for result in &report.similar_feedback {
            output.push_str(&format!("  {:>3.0}% {}", result.score, record_line(&result.record)));
        }
    }

    output
}

pub fn format_answer(answer: &ChatAnswer) -> String {
    let mut output = String::new();
    output.push_str(answer.answer.trim_end());
    output.push('\n');

    if !answer.related_feedback.is_empty() {
        let topic = answer.search_phrase.as_deref().unwrap_or("the question");
        output.push_str(&format!("\nFeedback about {}:\n", topic));
        for result in &answer.related_feedback {
            output.push_str(&format!("  {:>3.0}% {}", result.score, record_line(&result.record)));
        }
    }
    output.push_str(&format!(
        "\n({} records, generated by {})\n",
        answer.summary.total, answer.generated_by
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars() {
        assert_eq!(stars(4), "****.");
        assert_eq!(stars(1), "*....");
    }

    #[test]
    fn test_excerpt_truncates_on_chars() {
        let long = "é".repeat(100);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), EXCERPT_CHARS + 3);
        assert_eq!(excerpt("  two\n words "), "two words");
    }
}
