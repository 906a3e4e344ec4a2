use tracing::debug;

/// Split text into at most `n_chunks` contiguous runs of words.
///
/// Every chunk holds `ceil(words / n_chunks)` words except possibly the last,
/// so rounding can produce fewer than `n_chunks` chunks. Words are re-joined
/// with single spaces; the original whitespace is not preserved.
pub fn split_text_evenly(text: &str, n_chunks: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let n_chunks = n_chunks.max(1);
    let chunk_size = words.len().div_ceil(n_chunks);

    let chunks: Vec<String> = words
        .chunks(chunk_size)
        .map(|group| group.join(" "))
        .collect();

    debug!(
        words = words.len(),
        requested = n_chunks,
        chunk_size,
        produced = chunks.len(),
        "Split text into chunks"
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(chunks: &[String]) -> Vec<String> {
        chunks
            .join(" ")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_even_split() {
        let chunks = split_text_evenly("a b c d", 2);
        assert_eq!(chunks, vec!["a b", "c d"]);
    }

    #[test]
    fn test_last_chunk_smaller() {
        let chunks = split_text_evenly("a b c d e", 2);
        assert_eq!(chunks, vec!["a b c", "d e"]);
    }

    #[test]
    fn test_rounding_yields_fewer_chunks() {
        // 10 words into 6 chunks: size 2, so only 5 groups.
        let text = "w0 w1 w2 w3 w4 w5 w6 w7 w8 w9";
        let chunks = split_text_evenly(text, 6);
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.split_whitespace().count() == 2));
    }

    #[test]
    fn test_more_chunks_than_words() {
        let chunks = split_text_evenly("x y", 5);
        assert_eq!(chunks, vec!["x", "y"]);
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let chunks = split_text_evenly("alpha\n\n beta\tgamma   delta", 1);
        assert_eq!(chunks, vec!["alpha beta gamma delta"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_text_evenly("", 3).is_empty());
        assert!(split_text_evenly(" \n\t ", 3).is_empty());
    }

    #[test]
    fn test_zero_chunks_treated_as_one() {
        assert_eq!(split_text_evenly("a b", 0), vec!["a b"]);
    }

    #[test]
    fn test_word_sequence_preserved_for_many_counts() {
        let text: String = (0..97).map(|i| format!("word{} ", i)).collect();
        let original: Vec<String> = text.split_whitespace().map(str::to_string).collect();

        for n in 1..=20 {
            let chunks = split_text_evenly(&text, n);
            assert!(chunks.len() <= n, "n={} produced {}", n, chunks.len());
            assert_eq!(words_of(&chunks), original, "n={}", n);
        }
    }
}
