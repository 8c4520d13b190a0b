use crate::bank::{SEGMENT_DELIMITERS, segment_lengths};

/// Marker for an unrevealed letter.
pub const BLANK: char = '_';

/// A clue reduced to its shape and the letters revealed so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClueQuery {
    /// Number of space-separated words in the clue.
    pub word_count: usize,
    /// Length of each space/hyphen delimited segment.
    pub segment_lens: Vec<usize>,
    /// One slot per letter: `Some(letter)` when revealed, `None` when blank.
    pub sequence: Vec<Option<char>>,
}

impl ClueQuery {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let sequence = lowered
            .chars()
            .filter(|c| !SEGMENT_DELIMITERS.contains(c))
            .map(|c| if c == BLANK { None } else { Some(c) })
            .collect();

        Self {
            word_count: lowered.split(' ').count(),
            segment_lens: segment_lengths(&lowered),
            sequence,
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// True when the clue has at least one slot and none are revealed. This
    /// is what a fresh round looks like.
    pub fn is_all_blank(&self) -> bool {
        !self.sequence.is_empty() && self.sequence.iter().all(Option::is_none)
    }

    pub fn revealed(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.sequence
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| slot.map(|letter| (pos, letter)))
    }
}
