use ingest::{TextStats, split_text_evenly};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::llm::{CompletionError, TextCompletion};
use crate::prompt;
use crate::schema::Category;

/// Returned instead of a summary when the category label is not recognised.
pub const INVALID_CATEGORY: &str = "Invalid category provided.";

pub const MAX_TOKENS: usize = 128_000;
pub const MAX_CHARS: usize = 1_048_576;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryLimits {
    pub max_tokens: usize,
    pub max_chars: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            max_tokens: MAX_TOKENS,
            max_chars: MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkTrigger {
    TokenCount,
    CharLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPlan {
    /// One request with the whole document.
    Single,
    /// Split into `chunks` word groups, summarize each, then combine.
    Chunked { chunks: usize, trigger: ChunkTrigger },
}

/// Decide how a document of the given size is summarized.
///
/// The first check compares the token estimate against `max_chars`, not
/// `max_tokens`, so documents between the two limits still go out in one
/// request. Chunks are always sized by word count, even when the character
/// length triggered the split.
pub fn plan_summary(stats: TextStats, limits: SummaryLimits) -> SummaryPlan {
    if stats.approx_tokens <= limits.max_chars && stats.char_length <= limits.max_chars {
        SummaryPlan::Single
    } else if stats.approx_tokens > limits.max_tokens {
        SummaryPlan::Chunked {
            chunks: stats.approx_tokens.div_ceil(limits.max_tokens.max(1)),
            trigger: ChunkTrigger::TokenCount,
        }
    } else if stats.char_length > limits.max_chars {
        SummaryPlan::Chunked {
            chunks: stats.char_length.div_ceil(limits.max_chars.max(1)),
            trigger: ChunkTrigger::CharLength,
        }
    } else {
        SummaryPlan::Single
    }
}

pub struct SummaryGenerator {
    llm: Arc<dyn TextCompletion>,
    limits: SummaryLimits,
}

impl SummaryGenerator {
    pub fn new(llm: Arc<dyn TextCompletion>) -> Self {
        Self {
            llm,
            limits: SummaryLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SummaryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Summarize using a free-form category label.
    ///
    /// An unrecognised label yields [`INVALID_CATEGORY`] without contacting
    /// the model.
    pub async fn generate(
        &self,
        content: &str,
        category: &str,
        course_name: &str,
    ) -> Result<String, CompletionError> {
        match Category::from_label(category) {
            Some(category) => self.summarize(content, category, course_name).await,
            None => {
                debug!(category, "Invalid category, skipping summary");
                Ok(INVALID_CATEGORY.to_string())
            }
        }
    }

    pub async fn summarize(
        &self,
        content: &str,
        category: Category,
        course_name: &str,
    ) -> Result<String, CompletionError> {
        let stats = TextStats::of(content);
        let plan = plan_summary(stats, self.limits);

        info!(
            %category,
            approx_tokens = stats.approx_tokens,
            char_length = stats.char_length,
            ?plan,
            "Generating summary"
        );

        match plan {
            SummaryPlan::Single => {
                let prompt = prompt::build_summary_prompt(category, course_name, content);
                self.llm.complete(&prompt).await
            }
            SummaryPlan::Chunked { chunks, .. } => {
                let chunks = split_text_evenly(content, chunks);
                let total = chunks.len();

                let mut chunk_summaries = Vec::with_capacity(total);
                for (i, chunk) in chunks.iter().enumerate() {
                    debug!(chunk = i + 1, total, words = chunk.split_whitespace().count(), "Summarizing chunk");
                    let prompt = prompt::build_summary_prompt(category, course_name, chunk);
                    chunk_summaries.push(self.llm.complete(&prompt).await?);
                }

                info!(chunks = total, "Combining chunk summaries");
                let final_prompt = prompt::build_combination_prompt(course_name, &chunk_summaries);
                self.llm.complete(&final_prompt).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingCompletion;

    fn generator(stub: &Arc<RecordingCompletion>, limits: SummaryLimits) -> SummaryGenerator {
        SummaryGenerator::new(stub.clone()).with_limits(limits)
    }

    fn words(count: usize) -> String {
        (0..count).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_plan_small_document() {
        let stats = TextStats { approx_tokens: 10, char_length: 50 };
        assert_eq!(plan_summary(stats, SummaryLimits::default()), SummaryPlan::Single);
    }

    #[test]
    fn test_plan_between_token_and_char_limits_is_single() {
        // Over max_tokens but within max_chars on both counts.
        let stats = TextStats { approx_tokens: 200_000, char_length: 1_000_000 };
        assert_eq!(plan_summary(stats, SummaryLimits::default()), SummaryPlan::Single);
    }

    #[test]
    fn test_plan_token_overflow() {
        let stats = TextStats { approx_tokens: 300_000, char_length: 2_000_000 };
        assert_eq!(
            plan_summary(stats, SummaryLimits::default()),
            SummaryPlan::Chunked { chunks: 3, trigger: ChunkTrigger::TokenCount }
        );
    }

    #[test]
    fn test_plan_char_overflow() {
        let stats = TextStats { approx_tokens: 100_000, char_length: 3_000_000 };
        assert_eq!(
            plan_summary(stats, SummaryLimits::default()),
            SummaryPlan::Chunked { chunks: 3, trigger: ChunkTrigger::CharLength }
        );
    }

    #[tokio::test]
    async fn test_small_document_single_call() {
        let stub = Arc::new(RecordingCompletion::replying("summary"));
        let summary = generator(&stub, SummaryLimits::default())
            .summarize("Short reading about graphs.", Category::ReadingMaterials, "CS101")
            .await
            .unwrap();

        assert_eq!(summary, "summary");
        assert_eq!(stub.call_count(), 1);
        let prompts = stub.prompts();
        assert!(prompts[0].contains("Short reading about graphs."));
        assert!(prompts[0].contains("**Introduction**"));
    }

    #[tokio::test]
    async fn test_token_overflow_chunks_and_combines() {
        let stub = Arc::new(RecordingCompletion::numbered());
        let limits = SummaryLimits { max_tokens: 4, max_chars: 20 };
        let text = words(30);

        let summary = generator(&stub, limits)
            .summarize(&text, Category::Homework, "CS101")
            .await
            .unwrap();

        // ceil(30 / 4) = 8 chunk calls plus one combination call.
        assert_eq!(stub.call_count(), 9);
        assert_eq!(summary, "response 9");

        let prompts = stub.prompts();
        assert!(prompts[0].contains("\"\"\"\nw0 w1 w2 w3\n\"\"\""));
        assert!(prompts[7].contains("\"\"\"\nw28 w29\n\"\"\""));

        let combine = &prompts[8];
        assert!(combine.contains("Combine the following chunk summaries"));
        let expected: Vec<String> = (1..=8).map(|i| format!("response {}", i)).collect();
        assert!(combine.contains(&expected.join("\n")));
    }

    #[tokio::test]
    async fn test_char_overflow_sizes_chunks_by_words() {
        let stub = Arc::new(RecordingCompletion::numbered());
        let limits = SummaryLimits { max_tokens: 100, max_chars: 20 };
        let text = vec!["abcdefghij"; 10].join(" ");
        assert_eq!(text.len(), 109);

        generator(&stub, limits)
            .summarize(&text, Category::ReadingMaterials, "CS101")
            .await
            .unwrap();

        // ceil(109 / 20) = 6 requested, but 10 words in groups of 2 give 5.
        assert_eq!(stub.call_count(), 6);
    }

    #[tokio::test]
    async fn test_unknown_category_makes_no_calls() {
        let stub = Arc::new(RecordingCompletion::replying("unused"));
        let output = generator(&stub, SummaryLimits::default())
            .generate("some text", "Unknown", "CS101")
            .await
            .unwrap();

        assert_eq!(output, INVALID_CATEGORY);
        assert_eq!(output, "Invalid category provided.");
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_homework_output_has_markers() {
        let stub = Arc::new(RecordingCompletion::replying(
            "**Key Points**: loops\n\n**Ideas**: try recursion",
        ));
        let output = generator(&stub, SummaryLimits::default())
            .generate("Write a loop that sums a list.", "Homework", "CS101")
            .await
            .unwrap();

        assert!(output.contains("**Key Points**"));
        assert!(output.contains("**Ideas**"));
        assert!(stub.prompts()[0].contains("**Key Points**"));
    }

    #[tokio::test]
    async fn test_empty_document_still_calls_model() {
        let stub = Arc::new(RecordingCompletion::replying("nothing here"));
        generator(&stub, SummaryLimits::default())
            .summarize("", Category::Homework, "CS101")
            .await
            .unwrap();

        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_chunk_failure_propagates() {
        let stub = Arc::new(RecordingCompletion::failing_first(1, "late"));
        let limits = SummaryLimits { max_tokens: 2, max_chars: 5 };

        let result = generator(&stub, limits)
            .summarize(&words(6), Category::Homework, "CS101")
            .await;

        assert!(result.is_err());
        assert_eq!(stub.call_count(), 1);
    }
}
