//! Built-in sign lexicon.
//!
//! Static mapping from a canonical lowercase phrase to a placeholder image
//! reference, used when the external lookup has no video for a token. The
//! key set doubles as the phrase table the greedy mapper matches against;
//! multi-word phrases take priority over their constituent words.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Global lexicon (lazily initialized).
static LEXICON: OnceLock<Lexicon> = OnceLock::new();

const ENTRIES: &[(&str, &str)] = &[
    // Multi-word phrases (matched first by the greedy mapper)
    ("thank you very much", "https://via.placeholder.com/200x200/4CAF50/white?text=THANK+YOU+VERY+MUCH"),
    ("have a nice day", "https://via.placeholder.com/200x200/4CAF50/white?text=HAVE+NICE+DAY"),
    ("nice to meet you", "https://via.placeholder.com/200x200/9C27B0/white?text=NICE+TO+MEET+YOU"),
    ("see you later", "https://via.placeholder.com/200x200/FF9800/white?text=SEE+YOU+LATER"),
    ("how are you", "https://via.placeholder.com/200x200/2196F3/white?text=HOW+ARE+YOU"),
    ("good morning", "https://via.placeholder.com/200x200/FF9800/white?text=GOOD+MORNING"),
    ("good afternoon", "https://via.placeholder.com/200x200/FFC107/black?text=GOOD+AFTERNOON"),
    ("good evening", "https://via.placeholder.com/200x200/673AB7/white?text=GOOD+EVENING"),
    ("good night", "https://via.placeholder.com/200x200/424242/white?text=GOOD+NIGHT"),
    ("thank you", "https://via.placeholder.com/200x200/4CAF50/white?text=THANK+YOU"),
    ("excuse me", "https://via.placeholder.com/200x200/FF5722/white?text=EXCUSE+ME"),
    ("i am", "https://via.placeholder.com/200x200/607D8B/white?text=I+AM"),
    ("you are", "https://via.placeholder.com/200x200/795548/white?text=YOU+ARE"),
    ("my name", "https://via.placeholder.com/200x200/009688/white?text=MY+NAME"),
    ("what is", "https://via.placeholder.com/200x200/3F51B5/white?text=WHAT+IS"),
    ("how much", "https://via.placeholder.com/200x200/E91E63/white?text=HOW+MUCH"),
    ("where is", "https://via.placeholder.com/200x200/8BC34A/white?text=WHERE+IS"),
    ("very much", "https://via.placeholder.com/200x200/9E9E9E/white?text=VERY+MUCH"),
    ("very good", "https://via.placeholder.com/200x200/4CAF50/white?text=VERY+GOOD"),
    ("please help", "https://via.placeholder.com/200x200/FF5722/white?text=PLEASE+HELP"),
    ("hello world", "https://via.placeholder.com/200x200/2196F3/white?text=HELLO+WORLD"),
    // Individual words (fallback when no phrase matches)
    ("hello", "https://via.placeholder.com/200x200/4CAF50/white?text=HELLO"),
    ("world", "https://via.placeholder.com/200x200/2196F3/white?text=WORLD"),
    ("thank", "https://via.placeholder.com/200x200/FF9800/white?text=THANK"),
    ("you", "https://via.placeholder.com/200x200/9C27B0/white?text=YOU"),
];

/// A lexicon key pre-split into its word sequence.
pub struct LexiconPhrase {
    pub key: &'static str,
    pub words: Vec<&'static str>,
}

pub struct Lexicon {
    entries: HashMap<&'static str, &'static str>,
    ordered: Vec<LexiconPhrase>,
}

impl Lexicon {
    fn new() -> Self {
        let entries: HashMap<_, _> = ENTRIES.iter().copied().collect();

        let mut ordered: Vec<LexiconPhrase> = ENTRIES
            .iter()
            .map(|(key, _)| LexiconPhrase {
                key,
                words: key.split(' ').collect(),
            })
            .collect();
        // Longest phrases first; stable sort keeps the table order for ties.
        ordered.sort_by(|a, b| b.words.len().cmp(&a.words.len()));

        Self { entries, ordered }
    }

    /// Get or initialize the global lexicon.
    pub fn global() -> &'static Lexicon {
        LEXICON.get_or_init(Lexicon::new)
    }

    pub fn get(&self, phrase: &str) -> Option<&'static str> {
        self.entries.get(phrase).copied()
    }

    /// All keys, phrases with more words first. This ordering is what gives
    /// the greedy mapper its longest-match-first semantics.
    pub fn phrases_by_descending_word_count(&self) -> &[LexiconPhrase] {
        &self.ordered
    }
}
