//! Conversational questions over a partition's feedback
//!
//! Questions that point at a topic ("similar to ...", "about ...", "like
//! this") run a hybrid search for that topic first. The answer is written by
//! the provider chain; when every provider fails the caller gets a fixed
//! reply instead of an error.

use super::prompt::{chat_prompt, SampleLimits};
use super::{AnalyticsSummary, GeneratedBy};
use crate::config::Config;
use crate::db::FeedbackRecord;
use crate::error::{FeedscopeError, Result};
use crate::llm::{EmbeddingClient, GenerationRequest, ProviderFailoverChain};
use crate::search::{HybridSearcher, SearchResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Reply used when no provider produced an answer
pub const CHAT_FALLBACK_REPLY: &str = "I've looked through your feedback but couldn't put an \
     answer together right now. Could you try asking in a different way?";

/// Reply for a partition without feedback
pub const CHAT_NO_DATA_REPLY: &str = "There is no feedback here yet. Once customers start \
     leaving reviews I can answer questions about them.";

/// Default number of related records pulled into the prompt
pub const DEFAULT_RELATED_LIMIT: usize = 5;

/// Phrases that mark a question as a topic lookup
const TOPIC_MARKERS: [&str; 3] = ["similar to", "like this", "about"];

/// Markers whose trailing text names the topic
const TOPIC_PREFIXES: [&str; 2] = ["similar to", "about"];

lazy_static! {
    // quote not preceded by a word character, so "what's" is not an opening quote
    static ref QUOTED: Regex = Regex::new(r#"(?:^|[^\w])['"]([^'"]+)['"]"#).unwrap();
}

/// Answer to one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub question: String,
    /// Topic searched for, if the question asked about one
    pub search_phrase: Option<String>,
    pub related_feedback: Vec<SearchResult>,
    pub summary: AnalyticsSummary,
    pub generated_by: GeneratedBy,
    pub provider: Option<String>,
}

/// Topic a question asks about, or `None` for general questions
pub fn search_phrase(question: &str) -> Option<String> {
    let lower = question.to_lowercase();
    if !TOPIC_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return None;
    }

    if let Some(quoted) = QUOTED
        .captures(question)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|q| !q.is_empty())
    {
        return Some(quoted.to_string());
    }

    let tail = TOPIC_PREFIXES.iter().find_map(|prefix| {
        let start = lower.find(prefix)? + prefix.len();
        let rest = lower[start..]
            .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
        (!rest.is_empty()).then(|| rest.to_string())
    });

    Some(tail.unwrap_or_else(|| question.trim().to_string()))
}

/// Answers free-form questions about a record set
#[derive(Clone)]
pub struct FeedbackChat {
    chain: ProviderFailoverChain,
    searcher: HybridSearcher,
    limits: SampleLimits,
    max_output_tokens: u32,
    temperature: f32,
}

impl FeedbackChat {
    /// Answers only need to be non-empty, so the chain's length floor is dropped
    pub fn new(chain: ProviderFailoverChain, embeddings: Option<EmbeddingClient>) -> Self {
        Self {
            chain: chain.with_min_response_chars(0),
            searcher: HybridSearcher::new(embeddings).with_result_limit(DEFAULT_RELATED_LIMIT),
            limits: SampleLimits::default(),
            max_output_tokens: 1024,
            temperature: 0.7,
        }
    }

    pub fn from_config(config: &Config, embeddings: Option<EmbeddingClient>) -> Result<Self> {
        let chain = ProviderFailoverChain::from_config(&config.llm)?;
        let settings = &config.insights;
        Ok(Self {
            chain: chain.with_min_response_chars(0),
            searcher: HybridSearcher::from_config(embeddings, &config.search)
                .with_result_limit(settings.similar_limit),
            limits: SampleLimits {
                max_records: settings.max_prompt_records,
                max_record_chars: settings.max_record_chars,
                max_total_chars: settings.max_sample_chars,
            },
            max_output_tokens: settings.enhancement_max_output_tokens,
            temperature: settings.temperature,
        })
    }

    pub fn with_related_limit(mut self, limit: usize) -> Self {
        self.searcher = self.searcher.with_result_limit(limit);
        self
    }

    /// Answer `question` from `records`
    ///
    /// A blank question is an input error. Provider failures never are.
    pub async fn ask(&self, records: &[FeedbackRecord], question: &str) -> Result<ChatAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(FeedscopeError::InvalidInput(
                "question cannot be blank".to_string(),
            ));
        }

        let phrase = search_phrase(question);

        if records.is_empty() {
            return Ok(ChatAnswer {
                answer: CHAT_NO_DATA_REPLY.to_string(),
                question: question.to_string(),
                search_phrase: phrase,
                related_feedback: Vec::new(),
                summary: AnalyticsSummary::default(),
                generated_by: GeneratedBy::Fallback,
                provider: None,
            });
        }

        let mut window = records.to_vec();
        window.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let summary = AnalyticsSummary::from_records(&window);

        let related_feedback = match phrase {
            Some(ref topic) => {
                tracing::debug!("Looking up feedback about '{}'", topic);
                self.searcher.search_records(topic, &window).await.results
            }
            None => Vec::new(),
        };

        let request = GenerationRequest::new(chat_prompt(
            question,
            &window,
            &related_feedback,
            &summary,
            self.limits,
        ))
        .with_max_output_tokens(self.max_output_tokens)
        .with_temperature(self.temperature);

        let reply = self.chain.call(&request).await;
        let (answer, generated_by) = if reply.succeeded {
            let generated_by = match reply.provider_index {
                Some(0) => GeneratedBy::PrimaryAi,
                _ => GeneratedBy::SecondaryAi,
            };
            (reply.text, generated_by)
        } else {
            tracing::warn!(
                "No provider answered the question ({:?}), using canned reply",
                reply.error_kind
            );
            (CHAT_FALLBACK_REPLY.to_string(), GeneratedBy::Fallback)
        };

        Ok(ChatAnswer {
            answer,
            question: question.to_string(),
            search_phrase: phrase,
            related_feedback,
            summary,
            generated_by,
            provider: reply.provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;
    use crate::search::SearchSource;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct RecordingProvider {
        reply: Option<&'static str>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn new(reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.reply
                .map(str::to_string)
                .ok_or_else(|| FeedscopeError::Llm("unavailable".into()))
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn model_name(&self) -> &str {
            "test"
        }
    }

    fn chat(providers: &[Arc<RecordingProvider>]) -> FeedbackChat {
        let providers = providers
            .iter()
            .map(|p| p.clone() as Arc<dyn LlmProvider>)
            .collect();
        FeedbackChat::new(ProviderFailoverChain::new(providers), None)
    }

    fn records() -> Vec<FeedbackRecord> {
        let now = Utc::now();
        vec![
            FeedbackRecord::new(1, "Ana", "Great support", 5, now - Duration::hours(3)),
            FeedbackRecord::new(
                2,
                "Bo",
                "Late delivery, box was damaged",
                1,
                now - Duration::hours(2),
            ),
            FeedbackRecord::new(3, "Cy", "Good value", 4, now - Duration::hours(1)),
        ]
    }

    #[test]
    fn test_search_phrase_extraction() {
        assert_eq!(search_phrase("How are ratings trending?"), None);
        assert_eq!(
            search_phrase("Anything about delivery?").as_deref(),
            Some("delivery")
        );
        assert_eq!(
            search_phrase("What's similar to 'late delivery'?").as_deref(),
            Some("late delivery")
        );
        assert_eq!(
            search_phrase("Show reviews Similar To Slow Checkout.").as_deref(),
            Some("slow checkout")
        );
        assert_eq!(
            search_phrase("More like this please").as_deref(),
            Some("More like this please")
        );
    }

    #[tokio::test]
    async fn test_topic_question_uses_related_feedback() {
        let provider = RecordingProvider::new(Some("Two customers mentioned delivery problems."));
        let answer = chat(&[provider.clone()])
            .ask(&records(), "Anything about delivery?")
            .await
            .unwrap();

        assert_eq!(answer.generated_by, GeneratedBy::PrimaryAi);
        assert_eq!(answer.answer, "Two customers mentioned delivery problems.");
        assert_eq!(answer.search_phrase.as_deref(), Some("delivery"));
        assert_eq!(answer.related_feedback.len(), 1);
        assert_eq!(answer.related_feedback[0].record.id.0, 2);
        assert_eq!(answer.related_feedback[0].source, SearchSource::Keyword);

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Critical feedback (1-2 stars): 1"));
        assert!(prompts[0].contains("Late delivery"));
    }

    #[tokio::test]
    async fn test_short_answer_is_accepted() {
        let provider = RecordingProvider::new(Some("Yes."));
        let answer = chat(&[provider]).ask(&records(), "Is it going well?").await.unwrap();

        assert_eq!(answer.answer, "Yes.");
        assert!(answer.related_feedback.is_empty());
    }

    #[tokio::test]
    async fn test_second_provider_is_tagged() {
        let down = RecordingProvider::new(None);
        let up = RecordingProvider::new(Some("Support gets the most praise."));
        let answer = chat(&[down, up]).ask(&records(), "What do people like?").await.unwrap();

        assert_eq!(answer.generated_by, GeneratedBy::SecondaryAi);
        assert_eq!(answer.provider.as_deref(), Some("recording"));
    }

    #[tokio::test]
    async fn test_all_providers_fail_gives_canned_reply() {
        let first = RecordingProvider::new(None);
        let second = RecordingProvider::new(None);
        let answer = chat(&[first.clone(), second.clone()])
            .ask(&records(), "Anything about delivery?")
            .await
            .unwrap();

        assert_eq!(answer.answer, CHAT_FALLBACK_REPLY);
        assert_eq!(answer.generated_by, GeneratedBy::Fallback);
        assert_eq!(answer.provider, None);
        assert_eq!(answer.summary.total, 3);
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_partition_makes_no_calls() {
        let provider = RecordingProvider::new(Some("unused"));
        let answer = chat(&[provider.clone()]).ask(&[], "How are we doing?").await.unwrap();

        assert_eq!(answer.answer, CHAT_NO_DATA_REPLY);
        assert_eq!(answer.generated_by, GeneratedBy::Fallback);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_question_is_input_error() {
        let provider = RecordingProvider::new(Some("unused"));
        let err = chat(&[provider.clone()]).ask(&records(), "   ").await.unwrap_err();

        assert!(err.is_input_error());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
