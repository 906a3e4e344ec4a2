use serde::{Deserialize, Serialize};

/// Size estimate of a text blob, used to decide whether it fits in a single
/// model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub approx_tokens: usize,
    pub char_length: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            approx_tokens: count_tokens(text),
            char_length: char_length(text),
        }
    }
}

/// Approximate token count: whitespace-delimited words.
///
/// This is a rough proxy for real model tokenization and undercounts for
/// most tokenizers.
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in characters (Unicode scalar values), not bytes.
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}
