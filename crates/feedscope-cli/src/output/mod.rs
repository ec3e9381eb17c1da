//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use feedscope_core::{ChatAnswer, FeedbackRecord, InsightReport, SearchResponse};

/// Format a freshly stored record
pub fn format_stored(record: &FeedbackRecord, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_record(record),
        OutputFormat::Cli => terminal::format_stored(record),
    }
}

/// Format a record listing
pub fn format_records(records: &[FeedbackRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_records(records),
        OutputFormat::Cli => terminal::format_records(records),
    }
}

/// Format hybrid search results
pub fn format_search_response(response: &SearchResponse, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_search_response(response),
        OutputFormat::Cli => terminal::format_search_response(response),
    }
}

/// Format an insight report
pub fn format_report(report: &InsightReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_report(report),
        OutputFormat::Cli => terminal::format_report(report),
    }
}

/// Format an answer to a question
pub fn format_answer(answer: &ChatAnswer, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_answer(answer),
        OutputFormat::Cli => terminal::format_answer(answer),
    }
}
