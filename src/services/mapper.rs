//! Greedy phrase-first mapper.
//!
//! Turns transcript text into an ordered sign sequence, matching the
//! longest lexicon phrase at each position before falling back to single
//! words. Deterministic, single pass, no backtracking.

use crate::models::sign::SignEntry;
use crate::services::resolver::SignResolver;

/// Map raw text to a sign sequence in left-to-right scan order.
///
/// Matching operates on the raw whitespace-split lowercase words;
/// punctuation is only stripped when a single word is finalized, never
/// before phrase matching. A word that cleans down to the empty string is
/// still resolved (yielding a placeholder entry) rather than skipped.
pub async fn map_text_to_signs(text: &str, resolver: &SignResolver) -> Vec<SignEntry> {
    let words: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let phrases = resolver.lexicon().phrases_by_descending_word_count();
    let mut sequence = Vec::new();
    let mut i = 0;

    while i < words.len() {
        let mut matched = false;

        // Longest phrase wins; the table is pre-sorted by word count.
        for phrase in phrases {
            let k = phrase.words.len();
            if i + k <= words.len()
                && words[i..i + k]
                    .iter()
                    .map(String::as_str)
                    .eq(phrase.words.iter().copied())
            {
                let resolution = resolver.resolve(phrase.key).await;
                sequence.push(SignEntry {
                    word: phrase.key.to_string(),
                    original_words: words[i..i + k].to_vec(),
                    image_url: resolution.reference,
                    phrase_length: k,
                    source: resolution.source,
                });
                i += k;
                matched = true;
                break;
            }
        }

        if !matched {
            let raw = &words[i];
            let clean: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
            let resolution = resolver.resolve(&clean).await;
            sequence.push(SignEntry {
                word: clean,
                original_words: vec![raw.clone()],
                image_url: resolution.reference,
                phrase_length: 1,
                source: resolution.source,
            });
            i += 1;
        }
    }

    sequence
}
