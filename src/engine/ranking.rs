use std::cmp::Ordering;

use icu_normalizer::DecomposingNormalizerBorrowed;
use icu_normalizer::properties::CanonicalCombiningClassMapBorrowed;
use serde::{Deserialize, Serialize};

use crate::bank::WordEntry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    Alphabetical,
    Popularity,
    Difficulty,
    #[default]
    PopularityThenDifficulty,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Alphabetical,
        SortMode::Popularity,
        SortMode::Difficulty,
        SortMode::PopularityThenDifficulty,
    ];

    /// Map the persisted `sorting_mode` integer. Unknown values are `None`
    /// so callers can keep their current mode.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> i64 {
        match self {
            SortMode::Alphabetical => 0,
            SortMode::Popularity => 1,
            SortMode::Difficulty => 2,
            SortMode::PopularityThenDifficulty => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Alphabetical => "alphabetical",
            SortMode::Popularity => "popularity",
            SortMode::Difficulty => "difficulty",
            SortMode::PopularityThenDifficulty => "popularity, then difficulty",
        }
    }
}

/// Sort key for alphabetical order: canonical decomposition, every
/// character with a nonzero combining class dropped, then lowercased.
/// "Éclair" sorts among the e's.
pub fn collation_key(word: &str) -> String {
    let nfd = DecomposingNormalizerBorrowed::new_nfd();
    let ccc = CanonicalCombiningClassMapBorrowed::new();
    nfd.normalize(word)
        .chars()
        .filter(|&c| ccc.get_u8(c) == 0)
        .flat_map(char::to_lowercase)
        .collect()
}

fn by_picked(a: &WordEntry, b: &WordEntry) -> Ordering {
    b.picked.cmp(&a.picked)
}

fn by_difficulty(a: &WordEntry, b: &WordEntry) -> Ordering {
    b.difficulty.cmp(&a.difficulty)
}

/// Order candidates in place. Every mode is a stable sort, so equal keys
/// keep their bank order.
pub fn rank(entries: &mut [WordEntry], mode: SortMode) {
    match mode {
        SortMode::Alphabetical => {
            entries.sort_by_cached_key(|e| (collation_key(&e.word), e.word.clone()));
        }
        SortMode::Popularity => entries.sort_by(by_picked),
        SortMode::Difficulty => entries.sort_by(by_difficulty),
        SortMode::PopularityThenDifficulty => {
            entries.sort_by(|a, b| by_picked(a, b).then_with(|| by_difficulty(a, b)));
        }
    }
}
