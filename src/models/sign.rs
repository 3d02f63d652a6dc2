use serde::{Deserialize, Serialize};

/// Which subsystem produced a sign resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignSource {
    /// Live video reference from the external lookup service.
    External,
    /// Placeholder reference from the built-in lexicon.
    Lexicon,
    /// Synthesized textual placeholder; no sign exists for the token.
    TextFallback,
}

/// One element of a sign sequence, in left-to-right scan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignEntry {
    /// Canonical matched phrase, or the cleaned single word (lowercase,
    /// alphanumeric only).
    pub word: String,
    /// The raw whitespace-split words this entry consumed.
    pub original_words: Vec<String>,
    /// Video URL or textual placeholder.
    pub image_url: String,
    /// Number of words consumed (>= 1).
    pub phrase_length: usize,
    pub source: SignSource,
}
