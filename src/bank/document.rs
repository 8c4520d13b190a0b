use std::collections::BTreeMap;

use serde::Deserialize;

use crate::bank::{WordBank, WordEntry, word_count};
use crate::error::BankError;

#[derive(Debug, Deserialize)]
struct RawEntry {
    word: String,
    #[serde(default)]
    letters: Option<String>,
    #[serde(default)]
    lens: Option<Vec<usize>>,
    #[serde(default)]
    picked: i64,
    #[serde(default)]
    difficulty: i64,
}

impl RawEntry {
    fn into_entry(self) -> WordEntry {
        let mut entry = WordEntry::new(&self.word, self.picked, self.difficulty);
        if let Some(letters) = self.letters {
            entry.letters = letters.to_lowercase();
        }
        if let Some(lens) = self.lens {
            entry.lens = lens;
        }
        entry
    }
}

/// The two document layouts found in the wild. The nested form is tried
/// first; a legacy document fails it because its values are lists.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Nested(BTreeMap<String, BTreeMap<String, Vec<RawEntry>>>),
    Flat(BTreeMap<String, Vec<RawEntry>>),
}

fn parse_key(key: &str) -> Option<usize> {
    match key.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("skipping word bank bucket with key '{key}'");
            None
        }
    }
}

/// Decode a word bank document: `{ words: { letters: [entry] } }`, or the
/// legacy `{ letters: [entry] }` where the word count comes from each word.
pub fn parse_document(text: &str) -> Result<WordBank, BankError> {
    let raw: RawDocument = serde_json::from_str(text)?;
    let mut bank = WordBank::new();

    match raw {
        RawDocument::Nested(by_words) => {
            for (words_key, by_len) in by_words {
                let Some(words) = parse_key(&words_key) else {
                    continue;
                };
                for (len_key, entries) in by_len {
                    let Some(letters) = parse_key(&len_key) else {
                        continue;
                    };
                    for raw_entry in entries {
                        bank.push(words, letters, raw_entry.into_entry());
                    }
                }
            }
        }
        RawDocument::Flat(by_len) => {
            for (len_key, entries) in by_len {
                let Some(letters) = parse_key(&len_key) else {
                    continue;
                };
                for raw_entry in entries {
                    let entry = raw_entry.into_entry();
                    bank.push(word_count(&entry.word).max(1), letters, entry);
                }
            }
        }
    }

    log::debug!("decoded word bank document with {} entries", bank.len());
    Ok(bank)
}
