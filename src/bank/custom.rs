use crate::bank::WordEntry;

/// Parse the comma-separated custom word list. Entries are trimmed, inner
/// whitespace runs collapse to a single space, and blank entries are dropped.
pub fn parse_custom_list(raw: &str) -> Vec<WordEntry> {
    raw.split(',')
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|word| !word.is_empty())
        .map(|word| WordEntry::custom(&word))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::CUSTOM_PICKED;

    #[test]
    fn test_parse_trims_and_skips_empty() {
        let entries = parse_custom_list(" apple ,, banana split ,  ,");
        let words: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["apple", "banana split"]);
        assert_eq!(entries[1].lens, vec![6, 5]);
        assert_eq!(entries[1].letters, "bananasplit");
    }

    #[test]
    fn test_parse_collapses_inner_whitespace() {
        let entries = parse_custom_list("hot    dog");
        assert_eq!(entries[0].word, "hot dog");
        assert_eq!(entries[0].word_count(), 2);
    }

    #[test]
    fn test_parse_marks_entries_custom() {
        let entries = parse_custom_list("X-Ray");
        assert_eq!(entries[0].picked, CUSTOM_PICKED);
        assert_eq!(entries[0].difficulty, 0);
        assert_eq!(entries[0].letters, "xray");
        assert_eq!(entries[0].lens, vec![1, 3]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_custom_list("").is_empty());
        assert!(parse_custom_list("  ,  ").is_empty());
    }
}
