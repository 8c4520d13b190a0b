use std::collections::HashSet;

use crate::bank::{WordBank, WordEntry};
use crate::engine::clue::ClueQuery;

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Whether an entry has the clue's segment shape and agrees with every
/// revealed letter. Blank slots never constrain.
pub fn fits_clue(entry: &WordEntry, query: &ClueQuery) -> bool {
    if entry.lens != query.segment_lens || entry.letter_count() != query.len() {
        return false;
    }
    entry
        .letters
        .chars()
        .zip(&query.sequence)
        .all(|(letter, slot)| slot.is_none_or(|revealed| same_letter(letter, revealed)))
}

/// Candidates for a clue: entries from the clue's bucket with a matching
/// shape and revealed letters, minus anything already submitted. The
/// result keeps bank order; ranking is a separate step.
///
/// `excluded` holds lowercase words.
pub fn find_matches(
    query: &ClueQuery,
    bank: &WordBank,
    excluded: &HashSet<String>,
) -> Vec<WordEntry> {
    if query.is_empty() {
        return Vec::new();
    }
    let Some(bucket) = bank.bucket(query.word_count, query.len()) else {
        return Vec::new();
    };

    bucket
        .iter()
        .filter(|entry| !excluded.contains(&entry.word.to_lowercase()))
        .filter(|entry| fits_clue(entry, query))
        .cloned()
        .collect()
}
