//! Aggregate statistics over a feedback set
//!
//! Everything here is a pure function of the records passed in.

use crate::db::{FeedbackId, FeedbackRecord};
use crate::llm::truncate_chars;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Records counted as "recent" when computing the trend
const TREND_WINDOW: usize = 5;

/// Average shift needed to call a trend improving or declining
const TREND_TOLERANCE: f64 = 0.2;

const TOP_WORDS: usize = 20;
const HIGHLIGHTS: usize = 3;
const HIGHLIGHT_CHARS: usize = 100;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "love", "perfect", "awesome", "fantastic",
    "wonderful", "outstanding", "brilliant", "superb", "pleased", "satisfied", "happy",
    "impressed", "recommend", "quality", "fast", "professional", "helpful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "terrible", "awful", "hate", "worst", "horrible", "disappointing",
    "slow", "expensive", "rude", "unprofessional", "broken", "difficult", "problem",
    "issue", "wrong", "failed", "error", "disappointed", "frustrated", "angry",
];

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w]").unwrap();
    static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "and", "is", "in", "it", "to", "for", "with", "on", "at", "this", "that",
        "was", "were", "are", "am", "be", "been", "being", "have", "very", "from", "they",
        "their", "there", "would", "could",
    ]
    .into_iter()
    .collect();
}

/// Direction of recent ratings relative to older ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Improving => write!(f, "improving"),
            Self::Declining => write!(f, "declining"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// Newest five ratings against everything older
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingTrend {
    pub recent_average: f64,
    pub older_average: f64,
    pub direction: TrendDirection,
}

/// Sentiment keyword hits across all feedback text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSentiment {
    pub positive_mentions: usize,
    pub negative_mentions: usize,
}

/// Short excerpt of a notable record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: FeedbackId,
    pub author: String,
    pub rating: u8,
    pub excerpt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    pub highest: Vec<Highlight>,
    pub lowest: Vec<Highlight>,
}

/// Deterministic summary of a record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total: usize,
    /// Mean rating rounded to two decimals
    pub average_rating: f64,
    /// Counts for ratings 1..=5, always fully populated
    pub rating_histogram: BTreeMap<u8, usize>,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
    /// Share of positive records, rounded to one decimal
    pub positive_percentage: f64,
    pub trend: RatingTrend,
    pub sentiment_keywords: KeywordSentiment,
    pub top_words: Vec<(String, usize)>,
    pub highlights: Highlights,
}

impl Default for AnalyticsSummary {
    fn default() -> Self {
        Self::from_records(&[])
    }
}

impl AnalyticsSummary {
    /// Summarize records, expected newest first
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        let mut rating_histogram: BTreeMap<u8, usize> = (1..=5).map(|r| (r, 0)).collect();
        let (mut positive_count, mut neutral_count, mut negative_count) = (0, 0, 0);

        for record in records {
            *rating_histogram.entry(record.rating).or_insert(0) += 1;
            match record.rating {
                4.. => positive_count += 1,
                3 => neutral_count += 1,
                _ => negative_count += 1,
            }
        }

        let total = records.len();
        let positive_percentage = if total == 0 {
            0.0
        } else {
            round_to(positive_count as f64 / total as f64 * 100.0, 1)
        };

        Self {
            total,
            average_rating: round_to(mean_rating(records), 2),
            rating_histogram,
            positive_count,
            neutral_count,
            negative_count,
            positive_percentage,
            trend: rating_trend(records),
            sentiment_keywords: keyword_sentiment(records),
            top_words: top_words(records, TOP_WORDS),
            highlights: highlights(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn neutral_percentage(&self) -> f64 {
        self.percentage(self.neutral_count)
    }

    pub fn negative_percentage(&self) -> f64 {
        self.percentage(self.negative_count)
    }

    fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        round_to(count as f64 / self.total as f64 * 100.0, 1)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean_rating(records: &[FeedbackRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| f64::from(r.rating)).sum::<f64>() / records.len() as f64
}

fn rating_trend(records: &[FeedbackRecord]) -> RatingTrend {
    let split = records.len().min(TREND_WINDOW);
    let (recent, older) = records.split_at(split);

    let recent_average = round_to(mean_rating(recent), 2);
    let older_average = if older.is_empty() {
        recent_average
    } else {
        round_to(mean_rating(older), 2)
    };

    let direction = if recent_average > older_average + TREND_TOLERANCE {
        TrendDirection::Improving
    } else if recent_average < older_average - TREND_TOLERANCE {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    RatingTrend {
        recent_average,
        older_average,
        direction,
    }
}

fn keyword_sentiment(records: &[FeedbackRecord]) -> KeywordSentiment {
    let mut sentiment = KeywordSentiment::default();
    for record in records {
        let text = record.text.to_lowercase();
        sentiment.positive_mentions += POSITIVE_WORDS
            .iter()
            .map(|w| text.matches(w).count())
            .sum::<usize>();
        sentiment.negative_mentions += NEGATIVE_WORDS
            .iter()
            .map(|w| text.matches(w).count())
            .sum::<usize>();
    }
    sentiment
}

/// Most frequent words longer than three characters, stop words removed
pub fn top_words(records: &[FeedbackRecord], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        for raw in record.text.to_lowercase().split_whitespace() {
            let word = NON_WORD.replace_all(raw, "");
            if word.chars().count() > 3 && !STOP_WORDS.contains(word.as_ref()) {
                *counts.entry(word.into_owned()).or_insert(0) += 1;
            }
        }
    }

    let mut words: Vec<(String, usize)> = counts.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(limit);
    words
}

fn highlights(records: &[FeedbackRecord]) -> Highlights {
    let to_highlight = |record: &FeedbackRecord| Highlight {
        id: record.id,
        author: record.author.clone(),
        rating: record.rating,
        excerpt: truncate_chars(record.text.trim(), HIGHLIGHT_CHARS).to_string(),
    };

    let mut by_rating: Vec<&FeedbackRecord> = records.iter().collect();
    by_rating.sort_by(|a, b| b.rating.cmp(&a.rating).then(b.created_at.cmp(&a.created_at)));
    let highest = by_rating
        .iter()
        .copied()
        .filter(|r| r.rating >= 4)
        .take(HIGHLIGHTS)
        .map(&to_highlight)
        .collect();

    by_rating.sort_by(|a, b| a.rating.cmp(&b.rating).then(b.created_at.cmp(&a.created_at)));
    let lowest = by_rating
        .iter()
        .copied()
        .filter(|r| r.rating <= 2)
        .take(HIGHLIGHTS)
        .map(&to_highlight)
        .collect();

    Highlights { highest, lowest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn scenario() -> Vec<FeedbackRecord> {
        let now = Utc::now();
        vec![
            FeedbackRecord::new(1, "Ana", "Great support", 5, now),
            FeedbackRecord::new(2, "Bo", "Slow and buggy app", 1, now - Duration::hours(1)),
            FeedbackRecord::new(3, "Cy", "Good value, fast delivery", 4, now - Duration::hours(2)),
        ]
    }

    #[test]
    fn test_three_record_scenario() {
        let summary = AnalyticsSummary::from_records(&scenario());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.positive_count, 2);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.neutral_count, 0);
        assert_eq!(summary.positive_percentage, 66.7);
        assert_eq!(summary.average_rating, 3.33);
        assert_eq!(summary.rating_histogram[&1], 1);
        assert_eq!(summary.rating_histogram[&3], 0);
        assert_eq!(summary.rating_histogram[&5], 1);
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let summary = AnalyticsSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.positive_percentage, 0.0);
        assert_eq!(summary.rating_histogram.len(), 5);
        assert!(summary.rating_histogram.values().all(|&c| c == 0));
        assert!(summary.top_words.is_empty());
        assert_eq!(summary.trend.direction, TrendDirection::Stable);
        assert_eq!(summary, AnalyticsSummary::default());
    }

    #[test]
    fn test_keyword_counts_do_not_change_rating_sentiment() {
        let records = vec![FeedbackRecord::new(1, "Ana", "great great great", 1, Utc::now())];
        let summary = AnalyticsSummary::from_records(&records);
        assert_eq!(summary.sentiment_keywords.positive_mentions, 3);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.positive_count, 0);
    }

    #[test]
    fn test_trend() {
        let now = Utc::now();
        let mut records: Vec<FeedbackRecord> = (0..5)
            .map(|i| FeedbackRecord::new(i, "A", "recent", 5, now - Duration::hours(i)))
            .collect();
        records.extend(
            (5..10).map(|i| FeedbackRecord::new(i, "B", "older", 2, now - Duration::days(i))),
        );

        let trend = AnalyticsSummary::from_records(&records).trend;
        assert_eq!(trend.recent_average, 5.0);
        assert_eq!(trend.older_average, 2.0);
        assert_eq!(trend.direction, TrendDirection::Improving);
    }

    #[test]
    fn test_top_words_strip_punctuation_and_stop_words() {
        let now = Utc::now();
        let records = vec![
            FeedbackRecord::new(1, "A", "Delivery was slow. Delivery!", 2, now),
            FeedbackRecord::new(2, "B", "the delivery team", 4, now),
        ];
        let words = top_words(&records, 20);
        assert_eq!(words[0], ("delivery".to_string(), 3));
        assert!(words.iter().all(|(w, _)| w != "the" && w != "was"));
        assert!(words.iter().any(|(w, c)| w == "team" && *c == 1));
    }

    #[test]
    fn test_highlights() {
        let summary = AnalyticsSummary::from_records(&scenario());
        let highest: Vec<i64> = summary.highlights.highest.iter().map(|h| h.id.0).collect();
        let lowest: Vec<i64> = summary.highlights.lowest.iter().map(|h| h.id.0).collect();
        assert_eq!(highest, vec![1, 3]);
        assert_eq!(lowest, vec![2]);
    }
}
