//! Token counter used everywhere chunk sizes are measured (spec §4.2.1:
//! "the choice is an implementation detail but must be consistent across
//! ingestion and budget calculations").
//!
//! Backed by `tiktoken-rs`'s `cl100k_base` encoder, the same vocabulary
//! OpenAI's GPT-3.5/4 family uses, so chunk budgets line up with the token
//! limits of the models the extracted knowledge ultimately feeds.

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

static ENCODER: OnceLock<CoreBPE> = OnceLock::new();

fn encoder() -> &'static CoreBPE {
    ENCODER.get_or_init(|| tiktoken_rs::cl100k_base().expect("cl100k_base vocabulary is bundled"))
}

pub fn count_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }
    encoder().encode_ordinary(text).len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_tokens() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn longer_text_counts_more_tokens() {
        let short = count_tokens("hello world");
        let long = count_tokens("hello world, this is a considerably longer sentence with more words");
        assert!(long > short);
    }

    #[test]
    fn is_monotonic_in_length() {
        let a = count_tokens("one two three");
        let b = count_tokens("one two three four five six");
        assert!(b > a);
    }

    #[test]
    fn matches_known_cl100k_encoding() {
        // "hello world" encodes to exactly 2 cl100k_base tokens.
        assert_eq!(count_tokens("hello world"), 2);
    }
}
