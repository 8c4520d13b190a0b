//! Candidate-word suggestions for drawing-and-guessing games.
//!
//! A [`session::Session`] turns a partially revealed clue such as `c_t` or
//! `___ ___` into a ranked list of words from a [`bank::WordBank`], keeps
//! track of guesses already made in the round, and narrows the list as the
//! player types.

pub mod bank;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod session;
pub mod source;
