pub mod ports;

use std::collections::HashSet;
use std::sync::Arc;

use crate::bank::custom::parse_custom_list;
use crate::bank::{WordBank, WordEntry};
use crate::config::{Config, Setting};
use crate::engine::{ClueQuery, SortMode, find_matches, rank};
use ports::SuggestionSink;

/// One row of the suggestion list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub word: String,
    /// Position in the ranked candidate list, shown only in index mode.
    pub display_index: Option<usize>,
}

/// Everything a background rebuild needs to produce the next word bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankRequest {
    pub generation: u64,
    pub language: String,
    pub use_official_list: bool,
    pub custom_word_list: String,
}

impl BankRequest {
    /// Merge the custom list with the official bank, if enabled.
    pub fn build(&self, official: Option<&WordBank>) -> WordBank {
        let official = official.filter(|_| self.use_official_list);
        WordBank::merged(official, parse_custom_list(&self.custom_word_list))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    ClueChanged(String),
    InputChanged(String),
    Submit(String),
    Pick(usize),
    SettingChanged(Setting),
}

/// State for one game: the active bank, what the player currently sees,
/// and which words were already tried this round.
pub struct Session {
    bank: Arc<WordBank>,
    bank_generation: u64,
    clue: Option<String>,
    query: ClueQuery,
    candidates: Vec<WordEntry>,
    submitted: HashSet<String>,
    partial: String,
    sort_mode: SortMode,
    show_index: bool,
    use_official_list: bool,
    custom_word_list: String,
    language: String,
    max_suggestions: usize,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        let sort_mode = config.sort_mode().unwrap_or_else(|| {
            log::warn!(
                "ignoring unknown sorting mode {}, using {}",
                config.sorting_mode,
                SortMode::default().as_str()
            );
            SortMode::default()
        });

        Self {
            bank: Arc::new(WordBank::new()),
            bank_generation: 0,
            clue: None,
            query: ClueQuery::default(),
            candidates: Vec::new(),
            submitted: HashSet::new(),
            partial: String::new(),
            sort_mode,
            show_index: config.index_mode,
            use_official_list: config.enable_official_word_list,
            custom_word_list: config.custom_word_list.clone(),
            language: config.language.clone(),
            max_suggestions: config.max_suggestions,
        }
    }

    /// A session with a bank already in place, skipping the rebuild round
    /// trip.
    pub fn with_bank(config: &Config, bank: WordBank) -> Self {
        let mut session = Self::new(config);
        let request = session.begin_rebuild();
        session.publish_bank(request.generation, bank);
        session
    }

    pub fn bank(&self) -> &WordBank {
        &self.bank
    }

    /// Generation of the most recently issued rebuild request.
    pub fn bank_generation(&self) -> u64 {
        self.bank_generation
    }

    pub fn candidates(&self) -> &[WordEntry] {
        &self.candidates
    }

    pub fn submitted(&self) -> &HashSet<String> {
        &self.submitted
    }

    pub fn partial(&self) -> &str {
        &self.partial
    }

    pub fn clue(&self) -> Option<&str> {
        self.clue.as_deref()
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn show_index(&self) -> bool {
        self.show_index
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Record a new clue observation. A clue that turns fully blank starts
    /// a new round, which forgets every submitted word. Returns whether a
    /// round reset happened.
    pub fn observe_clue(&mut self, raw: &str) -> bool {
        if self.clue.as_deref() == Some(raw) {
            return false;
        }
        self.clue = Some(raw.to_string());
        self.query = ClueQuery::parse(raw);

        let reset = self.query.is_all_blank();
        if reset {
            log::debug!("clue is blank, starting a new round");
            self.submitted.clear();
            self.partial.clear();
        }
        self.refresh();
        reset
    }

    /// Update the partially typed guess. Only the displayed list narrows;
    /// the ranked candidates stay as they are.
    pub fn type_partial(&mut self, text: &str) {
        self.partial = text.to_string();
    }

    /// Candidates narrowed by the partial guess, paired with their ranked
    /// index. In index mode a number selects that single candidate.
    pub fn visible(&self) -> Vec<(usize, &WordEntry)> {
        let typed = self.partial.trim();
        if self.show_index
            && let Some(entry) = typed
                .parse::<usize>()
                .ok()
                .and_then(|i| self.candidates.get(i).map(|e| (i, e)))
        {
            return vec![entry];
        }

        let needle = typed.to_lowercase();
        let mut visible: Vec<(usize, &WordEntry)> = self
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, e)| needle.is_empty() || e.word.to_lowercase().contains(&needle))
            .collect();
        if self.max_suggestions > 0 {
            visible.truncate(self.max_suggestions);
        }
        visible
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.visible()
            .into_iter()
            .map(|(index, entry)| Suggestion {
                word: entry.word.clone(),
                display_index: self.show_index.then_some(index),
            })
            .collect()
    }

    /// Submit what the player typed. In index mode an in-range number
    /// stands for that candidate; anything else is sent literally. Returns
    /// the text to send, or `None` for blank input.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        let typed = input.trim();
        if typed.is_empty() {
            return None;
        }
        let indexed = if self.show_index {
            typed
                .parse::<usize>()
                .ok()
                .and_then(|i| self.candidates.get(i))
                .map(|e| e.word.clone())
        } else {
            None
        };
        let text = indexed.unwrap_or_else(|| typed.to_string());
        self.record_submission(&text);
        Some(text)
    }

    /// Submit the candidate at `index` of the ranked list.
    pub fn pick(&mut self, index: usize) -> Option<String> {
        let text = self.candidates.get(index)?.word.clone();
        self.record_submission(&text);
        Some(text)
    }

    fn record_submission(&mut self, text: &str) {
        let lowered = text.to_lowercase();
        self.candidates.retain(|e| e.word.to_lowercase() != lowered);
        self.submitted.insert(lowered);
        self.partial.clear();
    }

    /// Switch ordering by its persisted index. Unknown values are rejected
    /// and the current mode kept. Returns whether the mode was applied.
    pub fn set_sort_mode(&mut self, index: i64) -> bool {
        let Some(mode) = SortMode::from_index(index) else {
            log::warn!("rejecting unknown sorting mode {index}");
            return false;
        };
        self.sort_mode = mode;
        rank(&mut self.candidates, mode);
        true
    }

    pub fn set_index_mode(&mut self, on: bool) {
        self.show_index = on;
    }

    /// Apply a settings change. Changes to the word list composition or
    /// language return the rebuild to run; the rest take effect at once.
    pub fn apply_setting(&mut self, setting: &Setting) -> Option<BankRequest> {
        match setting {
            Setting::IndexMode(on) => {
                self.set_index_mode(*on);
                None
            }
            Setting::SortingMode(index) => {
                self.set_sort_mode(*index);
                None
            }
            Setting::CustomWordList(list) => {
                self.custom_word_list = list.clone();
                Some(self.begin_rebuild())
            }
            Setting::EnableOfficialWordList(on) => {
                self.use_official_list = *on;
                Some(self.begin_rebuild())
            }
            Setting::Language(language) => {
                self.language = language.clone();
                Some(self.begin_rebuild())
            }
        }
    }

    /// Issue a rebuild request. Only the most recently issued request may
    /// publish its bank.
    pub fn begin_rebuild(&mut self) -> BankRequest {
        self.bank_generation += 1;
        log::debug!("requesting word bank generation {}", self.bank_generation);
        BankRequest {
            generation: self.bank_generation,
            language: self.language.clone(),
            use_official_list: self.use_official_list,
            custom_word_list: self.custom_word_list.clone(),
        }
    }

    /// Swap in a freshly built bank and re-match the current clue. Banks
    /// from superseded requests are dropped. Returns whether it was
    /// installed.
    pub fn publish_bank(&mut self, generation: u64, bank: WordBank) -> bool {
        if generation != self.bank_generation {
            log::warn!(
                "discarding word bank generation {generation}, latest is {}",
                self.bank_generation
            );
            return false;
        }
        log::info!("installed word bank with {} entries", bank.len());
        self.bank = Arc::new(bank);
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        self.candidates = find_matches(&self.query, &self.bank, &self.submitted);
        rank(&mut self.candidates, self.sort_mode);
    }

    /// Dispatch one host event and redraw. Returns a rebuild request when
    /// the event calls for a new bank.
    pub fn handle(&mut self, event: Event, sink: &mut impl SuggestionSink) -> Option<BankRequest> {
        let mut rebuild = None;
        match event {
            Event::ClueChanged(clue) => {
                self.observe_clue(&clue);
            }
            Event::InputChanged(text) => self.type_partial(&text),
            Event::Submit(input) => {
                if let Some(text) = self.submit(&input) {
                    sink.send_guess(&text);
                }
            }
            Event::Pick(index) => {
                if let Some(text) = self.pick(index) {
                    sink.send_guess(&text);
                }
            }
            Event::SettingChanged(setting) => rebuild = self.apply_setting(&setting),
        }
        sink.render(&self.suggestions());
        rebuild
    }
}
