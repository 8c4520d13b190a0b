//! Narrow interfaces between the engine and whatever hosts it.
//!
//! The session never reads a page, a terminal, or a settings file
//! directly. A host supplies clue text, persists settings, and shows
//! suggestions through these three traits.

use std::sync::mpsc;

use anyhow::Result;

use crate::config::{Config, Setting};
use crate::session::Suggestion;

/// Where clue text comes from.
pub trait ClueSource {
    /// The clue as it reads right now, if one is showing.
    fn current_clue(&self) -> Option<String>;

    /// A channel that yields the clue text each time it changes.
    fn watch(&mut self) -> mpsc::Receiver<String>;
}

/// Persisted user settings.
pub trait ConfigStore {
    fn get(&self) -> Config;

    /// Apply and persist one change, then notify subscribers.
    fn set(&mut self, setting: Setting) -> Result<()>;

    fn subscribe(&mut self) -> mpsc::Receiver<Setting>;
}

/// Where suggestions are shown and guesses are sent.
pub trait SuggestionSink {
    fn render(&mut self, suggestions: &[Suggestion]);

    /// Send the chosen guess to the game chat.
    fn send_guess(&mut self, text: &str);

    /// Show a status line to the player.
    fn notice(&mut self, _message: &str) {}
}
