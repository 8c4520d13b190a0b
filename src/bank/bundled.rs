use rust_embed::Embed;

use crate::bank::WordBank;
use crate::bank::document::parse_document;
use crate::error::BankError;

/// Small offline word banks, one per language, used when neither the cache
/// nor the network can supply the official list.
#[derive(Embed)]
#[folder = "assets/banks/"]
struct BundledBanks;

fn file_name(language: &str) -> String {
    format!("{}.json", language.trim().to_lowercase())
}

pub fn has_bundled_bank(language: &str) -> bool {
    BundledBanks::get(&file_name(language)).is_some()
}

pub fn bundled_bank(language: &str) -> Result<WordBank, BankError> {
    let file = BundledBanks::get(&file_name(language))
        .ok_or_else(|| BankError::Unavailable(language.to_string()))?;
    let text = String::from_utf8_lossy(&file.data);
    parse_document(&text)
}

pub fn bundled_languages() -> Vec<String> {
    let mut languages: Vec<String> = BundledBanks::iter()
        .filter_map(|name| name.strip_suffix(".json").map(str::to_string))
        .collect();
    languages.sort();
    languages
}
