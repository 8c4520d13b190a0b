pub mod clue;
pub mod matcher;
pub mod ranking;

pub use clue::ClueQuery;
pub use matcher::find_matches;
pub use ranking::{SortMode, rank};
