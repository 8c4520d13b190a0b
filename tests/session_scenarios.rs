use std::collections::HashSet;

use guessr::bank::bundled::bundled_bank;
use guessr::bank::custom::parse_custom_list;
use guessr::bank::{WordBank, WordEntry};
use guessr::config::Config;
use guessr::engine::{ClueQuery, SortMode, find_matches, rank};
use guessr::session::Session;

fn cat_car_bank() -> WordBank {
    let mut bank = WordBank::new();
    bank.insert_unique(WordEntry::new("cat", 5, 1));
    bank.insert_unique(WordEntry::new("car", 2, 1));
    bank
}

fn words(entries: &[WordEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.word.as_str()).collect()
}

/// Every clue shape the bundled bank can answer, with a few letters
/// revealed at different positions.
fn clues_for(bank: &WordBank) -> Vec<String> {
    let mut clues = Vec::new();
    for entry in bank.entries() {
        let mut blank = String::new();
        let mut revealed = String::new();
        let mut pos = 0;
        for ch in entry.word.to_lowercase().chars() {
            if ch == ' ' || ch == '-' {
                blank.push(ch);
                revealed.push(ch);
                continue;
            }
            blank.push('_');
            revealed.push(if pos % 2 == 0 { ch } else { '_' });
            pos += 1;
        }
        clues.push(blank);
        clues.push(revealed);
    }
    clues
}

#[test]
fn test_scenario_a_revealed_letters() {
    let mut session = Session::with_bank(&Config::default(), cat_car_bank());
    session.observe_clue("c_t");
    assert_eq!(words(session.candidates()), vec!["cat"]);
}

#[test]
fn test_scenario_b_blank_clue_ranked() {
    let mut session = Session::with_bank(&Config::default(), cat_car_bank());
    session.observe_clue("___");
    assert_eq!(words(session.candidates()), vec!["cat", "car"]);
}

#[test]
fn test_scenario_c_submission_excluded_without_reset() {
    let mut session = Session::with_bank(&Config::default(), cat_car_bank());
    session.observe_clue("___");
    assert_eq!(session.submit("cat").as_deref(), Some("cat"));
    session.observe_clue("___");
    assert_eq!(words(session.candidates()), vec!["car"]);

    // A direct re-match with the session's exclusions agrees
    let query = ClueQuery::parse("___");
    let rematch = find_matches(&query, session.bank(), session.submitted());
    assert_eq!(words(&rematch), vec!["car"]);
}

#[test]
fn test_scenario_d_segment_shape() {
    let bank = cat_car_bank();
    let query = ClueQuery::parse("_ __");
    assert_eq!(query.segment_lens, vec![1, 2]);
    assert!(find_matches(&query, &bank, &HashSet::new()).is_empty());
}

#[test]
fn test_scenario_e_custom_punctuation() {
    let official = bundled_bank("English").unwrap();
    let max_official = official.entries().map(|e| e.picked).max().unwrap();
    let bank = WordBank::merged(Some(&official), parse_custom_list("Node.js"));

    let mut session = Session::with_bank(&Config::default(), bank);
    session.observe_clue("n___.__");
    let first = &session.candidates()[0];
    assert_eq!(first.word, "Node.js");
    assert_eq!(first.letters, "node.js");
    assert!(first.picked > max_official);
}

#[test]
fn test_round_reset_law() {
    let mut session = Session::with_bank(&Config::default(), cat_car_bank());
    session.observe_clue("___");
    session.pick(0);
    session.observe_clue("c_r");
    assert!(!session.submitted().is_empty());

    assert!(session.observe_clue("___"));
    assert!(session.submitted().is_empty());
    assert_eq!(words(session.candidates()), vec!["cat", "car"]);
}

#[test]
fn test_match_laws_over_bundled_bank() {
    let bank = bundled_bank("English").unwrap();
    let excluded: HashSet<String> = ["cat", "hot dog", "x-ray"]
        .into_iter()
        .map(String::from)
        .collect();

    for clue in clues_for(&bank) {
        let query = ClueQuery::parse(&clue);
        let result = find_matches(&query, &bank, &excluded);

        for entry in &result {
            // Segment shape
            assert_eq!(entry.lens, query.segment_lens, "clue {clue:?} -> {}", entry.word);
            // Positional constraints
            let letters: Vec<char> = entry.letters.chars().collect();
            for (pos, letter) in query.revealed() {
                assert_eq!(letters[pos], letter, "clue {clue:?} -> {}", entry.word);
            }
            // Exclusion
            assert!(!excluded.contains(&entry.word.to_lowercase()));
        }

        // Idempotence
        let again = find_matches(&query, &bank, &excluded);
        let first: HashSet<&str> = result.iter().map(|e| e.word.as_str()).collect();
        let second: HashSet<&str> = again.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(first, second);
    }
}

#[test]
fn test_every_bundled_word_finds_itself() {
    let bank = bundled_bank("English").unwrap();
    for entry in bank.entries() {
        let clue: String = entry
            .word
            .chars()
            .map(|c| if c == ' ' || c == '-' { c } else { '_' })
            .collect();
        let result = find_matches(&ClueQuery::parse(&clue), &bank, &HashSet::new());
        assert!(
            result.iter().any(|e| e.word == entry.word),
            "{} not found by {clue:?}",
            entry.word
        );
    }
}

#[test]
fn test_ranking_laws() {
    let bank = bundled_bank("English").unwrap();
    let all: Vec<WordEntry> = bank.entries().cloned().collect();

    for mode in SortMode::ALL {
        let mut once = all.clone();
        let mut twice = all.clone();
        rank(&mut once, mode);
        rank(&mut twice, mode);
        rank(&mut twice, mode);
        assert_eq!(once, twice, "{mode:?} is not deterministic");
    }

    let mut refined = all.clone();
    rank(&mut refined, SortMode::PopularityThenDifficulty);
    for pair in refined.windows(2) {
        assert!(pair[0].picked >= pair[1].picked);
        if pair[0].picked == pair[1].picked {
            assert!(pair[0].difficulty >= pair[1].difficulty);
        }
    }
}

#[test]
fn test_sort_change_reranks_without_rematch() {
    let mut session = Session::with_bank(&Config::default(), bundled_bank("English").unwrap());
    session.observe_clue("___");
    let before: HashSet<String> = session.candidates().iter().map(|e| e.word.clone()).collect();

    assert!(session.set_sort_mode(SortMode::Alphabetical.index()));
    let after: Vec<&str> = words(session.candidates());
    let mut sorted = after.clone();
    sorted.sort();
    assert_eq!(after, sorted);
    assert_eq!(before, after.iter().map(|w| w.to_string()).collect());
}
