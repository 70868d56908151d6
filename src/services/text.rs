//! Tokenizing and vectorizing synopses and genre tags.
//!
//! Text vectors are word counts over a [`Dictionary`] built from the texts
//! being compared. Tag vectors are one-hot over an ordered tag universe.
//! Two vectors are only comparable when they come from the same dictionary
//! or the same universe.

use std::collections::{HashMap, HashSet};

/// Whether normalization drops common English words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopWords {
    #[default]
    None,
    English,
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "are", "as", "at", "be", "been", "but",
    "by", "can", "for", "from", "had", "has", "have", "he", "her", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "not", "of", "on", "one", "or", "she", "so", "that", "the",
    "their", "them", "then", "there", "they", "this", "to", "was", "were", "what", "when",
    "which", "who", "will", "with", "you",
];

impl StopWords {
    fn contains(&self, token: &str) -> bool {
        match self {
            StopWords::None => false,
            StopWords::English => ENGLISH_STOP_WORDS.contains(&token),
        }
    }
}

/// Lower-cases `text`, splits on whitespace and strips everything that is not
/// an ASCII letter or digit from each word. Empty words are dropped.
pub fn normalize(text: &str, stop_words: StopWords) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|token| !token.is_empty() && !stop_words.contains(token))
        .collect()
}

/// Ordered set of distinct tokens
///
/// Index order is first-seen order across the texts it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    pub fn build<'a, I>(texts: I, stop_words: StopWords) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut dictionary = Self::default();
        for text in texts {
            for token in normalize(text, stop_words) {
                if !dictionary.index.contains_key(&token) {
                    dictionary.index.insert(token.clone(), dictionary.tokens.len());
                    dictionary.tokens.push(token);
                }
            }
        }
        dictionary
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Word counts of `text` over this dictionary
    ///
    /// Tokens missing from the dictionary are ignored.
    pub fn vectorize(&self, text: &str, stop_words: StopWords) -> Vec<u32> {
        let mut counts = vec![0u32; self.tokens.len()];
        for token in normalize(text, stop_words) {
            if let Some(&position) = self.index.get(&token) {
                counts[position] += 1;
            }
        }
        counts
    }
}

/// One-hot vector of `tags` over `universe`
pub fn tag_vector<S: AsRef<str>>(tags: &[S], universe: &[String]) -> Vec<u8> {
    let present: HashSet<&str> = tags.iter().map(|tag| tag.as_ref()).collect();
    universe
        .iter()
        .map(|tag| u8::from(present.contains(tag.as_str())))
        .collect()
}
