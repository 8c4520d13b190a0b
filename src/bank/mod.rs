pub mod bundled;
pub mod custom;
pub mod document;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Popularity given to custom-list words. Larger than any real `picked`
/// count, so custom words lead every popularity-based ordering.
pub const CUSTOM_PICKED: i64 = i64::MAX;

/// Characters that split a word into length segments. Neither is part of
/// the letter sequence.
pub const SEGMENT_DELIMITERS: [char; 2] = [' ', '-'];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Original text, casing and spacing preserved.
    pub word: String,
    /// Lowercase letters with spaces and hyphens removed.
    pub letters: String,
    /// Length of each space/hyphen delimited segment.
    pub lens: Vec<usize>,
    pub picked: i64,
    pub difficulty: i64,
}

impl WordEntry {
    pub fn new(word: &str, picked: i64, difficulty: i64) -> Self {
        let lowered = word.to_lowercase();
        Self {
            word: word.to_string(),
            letters: strip_delimiters(&lowered),
            lens: segment_lengths(&lowered),
            picked,
            difficulty,
        }
    }

    pub fn custom(word: &str) -> Self {
        Self::new(word, CUSTOM_PICKED, 0)
    }

    pub fn is_custom(&self) -> bool {
        self.picked == CUSTOM_PICKED
    }

    /// Number of space-separated words; the first bucket key.
    pub fn word_count(&self) -> usize {
        word_count(&self.word)
    }

    /// Number of letters; the second bucket key.
    pub fn letter_count(&self) -> usize {
        self.letters.chars().count()
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn strip_delimiters(text: &str) -> String {
    text.chars()
        .filter(|c| !SEGMENT_DELIMITERS.contains(c))
        .collect()
}

pub fn segment_lengths(text: &str) -> Vec<usize> {
    text.split(SEGMENT_DELIMITERS)
        .filter(|part| !part.is_empty())
        .map(|part| part.chars().count())
        .collect()
}

type Buckets = BTreeMap<usize, BTreeMap<usize, Vec<WordEntry>>>;

/// Word index keyed by word count, then letter count.
///
/// A bank is never edited once published; configuration changes build a
/// new one and swap it in whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WordBank {
    buckets: Buckets,
}

impl WordBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the active bank: custom words first, then the official list
    /// minus any word a custom entry already placed in the same bucket.
    pub fn merged(official: Option<&WordBank>, custom: Vec<WordEntry>) -> Self {
        let mut bank = Self::new();
        for entry in custom {
            bank.insert_unique(entry);
        }

        if let Some(official) = official {
            for (&words, by_len) in &official.buckets {
                for (&letters, entries) in by_len {
                    let bucket = bank
                        .buckets
                        .entry(words)
                        .or_default()
                        .entry(letters)
                        .or_default();
                    let taken: HashSet<String> = bucket.iter().map(|e| e.word.clone()).collect();
                    bucket.extend(
                        entries
                            .iter()
                            .filter(|e| !taken.contains(&e.word))
                            .cloned(),
                    );
                }
            }
        }

        log::debug!("merged word bank holds {} entries", bank.len());
        bank
    }

    pub fn bucket(&self, word_count: usize, letter_count: usize) -> Option<&[WordEntry]> {
        self.buckets
            .get(&word_count)?
            .get(&letter_count)
            .map(Vec::as_slice)
    }

    /// Append to an explicit bucket, as laid out by a bank document.
    pub fn push(&mut self, word_count: usize, letter_count: usize, entry: WordEntry) {
        self.buckets
            .entry(word_count)
            .or_default()
            .entry(letter_count)
            .or_default()
            .push(entry);
    }

    /// Insert into the bucket matching the entry's own shape, skipping it if
    /// that bucket already holds the exact same word. Returns whether the
    /// entry was added.
    pub fn insert_unique(&mut self, entry: WordEntry) -> bool {
        let letter_count = entry.letter_count();
        if letter_count == 0 {
            return false;
        }
        let bucket = self
            .buckets
            .entry(entry.word_count())
            .or_default()
            .entry(letter_count)
            .or_default();
        if bucket.iter().any(|e| e.word == entry.word) {
            return false;
        }
        bucket.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|by_len| by_len.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &WordEntry> {
        self.buckets
            .values()
            .flat_map(|by_len| by_len.values())
            .flatten()
    }
}
