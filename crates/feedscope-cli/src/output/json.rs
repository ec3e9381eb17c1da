//! JSON output formatter

use feedscope_core::{ChatAnswer, FeedbackRecord, InsightReport, SearchResponse, SearchResult};
use serde_json::{json, Value};

/// Record without its embedding vector
fn record_value(record: &FeedbackRecord) -> Value {
    json!({
        "id": record.id,
        "author": record.author,
        "text": record.text,
        "rating": record.rating,
        "created_at": record.created_at.to_rfc3339(),
        "embedded": record.embedding.is_some(),
    })
}

fn result_value(result: &SearchResult) -> Value {
    json!({
        "score": result.score,
        "source": result.source,
        "feedback": record_value(&result.record),
    })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()) + "\n"
}

pub fn format_record(record: &FeedbackRecord) -> String {
    pretty(&record_value(record))
}

pub fn format_records(records: &[FeedbackRecord]) -> String {
    pretty(&Value::Array(records.iter().map(record_value).collect()))
}

pub fn format_search_response(response: &SearchResponse) -> String {
    pretty(&json!({
        "results": response.results.iter().map(result_value).collect::<Vec<_>>(),
        "semantic_count": response.semantic_count,
        "keyword_count": response.keyword_count,
    }))
}

pub fn format_report(report: &InsightReport) -> String {
    pretty(&json!({
        "narrative": report.narrative,
        "generated_by": report.generated_by,
        "provider": report.provider,
        "enhanced": report.enhanced,
        "timeframe_days": report.timeframe_days,
        "query": report.query,
        "summary": report.summary,
        "similar_feedback": report.similar_feedback.iter().map(result_value).collect::<Vec<_>>(),
        "stages": report.stages,
    }))
}

pub fn format_answer(answer: &ChatAnswer) -> String {
    pretty(&json!({
        "answer": answer.answer,
        "question": answer.question,
        "search_phrase": answer.search_phrase,
        "generated_by": answer.generated_by,
        "provider": answer.provider,
        "summary": answer.summary,
        "related_feedback": answer.related_feedback.iter().map(result_value).collect::<Vec<_>>(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_record_omits_embedding() {
        let record = FeedbackRecord::new(7, "Ana", "Great support", 5, Utc::now())
            .with_embedding(vec![0.1, 0.2]);
        let value: Value = serde_json::from_str(&format_record(&record)).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["embedded"], true);
        assert!(value.get("embedding").is_none());
    }
}
