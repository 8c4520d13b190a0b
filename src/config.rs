use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::SortMode;
use crate::error::ConfigError;
use crate::session::ports::ConfigStore;

pub const DEFAULT_WORD_BANK_URL: &str = "https://www.wlay.me/static/json/words.json";

/// The language `word_bank_url` serves unless it carries a placeholder.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Replaced with the lowercase language name inside `word_bank_url`.
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_index_mode", alias = "indexMode")]
    pub index_mode: bool,
    #[serde(default = "default_sorting_mode", alias = "sortingMode")]
    pub sorting_mode: i64,
    #[serde(default, alias = "customWL")]
    pub custom_word_list: String,
    #[serde(default = "default_enable_official_word_list", alias = "enableOfficialWL")]
    pub enable_official_word_list: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_word_bank_url")]
    pub word_bank_url: String,
    #[serde(default = "default_bank_cache_hours")]
    pub bank_cache_hours: u64,
    #[serde(default = "default_bank_cache_dir")]
    pub bank_cache_dir: String,
    #[serde(default)]
    pub max_suggestions: usize,
    #[serde(default)]
    pub word_bank_urls: BTreeMap<String, String>,
}

fn default_index_mode() -> bool {
    true
}
fn default_sorting_mode() -> i64 {
    SortMode::default().index()
}
fn default_enable_official_word_list() -> bool {
    true
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
fn default_word_bank_url() -> String {
    DEFAULT_WORD_BANK_URL.to_string()
}
fn default_bank_cache_hours() -> u64 {
    24
}
fn default_bank_cache_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("guessr")
        .join("banks")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_mode: default_index_mode(),
            sorting_mode: default_sorting_mode(),
            custom_word_list: String::new(),
            enable_official_word_list: default_enable_official_word_list(),
            language: default_language(),
            word_bank_url: default_word_bank_url(),
            bank_cache_hours: default_bank_cache_hours(),
            bank_cache_dir: default_bank_cache_dir(),
            max_suggestions: 0,
            word_bank_urls: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guessr")
            .join("config.toml")
    }

    /// `None` when the stored value is out of range.
    pub fn sort_mode(&self) -> Option<SortMode> {
        SortMode::from_index(self.sorting_mode)
    }

    /// Official list location for a language: a `word_bank_urls` override
    /// (matched case-insensitively), else `word_bank_url` when it has a
    /// `{language}` placeholder or the language is the default one. `None`
    /// means only a bundled bank can serve the language.
    pub fn bank_url_for(&self, language: &str) -> Option<String> {
        if let Some((_, url)) = self
            .word_bank_urls
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(language))
        {
            return Some(url.clone());
        }
        if self.word_bank_url.contains(LANGUAGE_PLACEHOLDER) {
            let name = language.trim().to_lowercase();
            return Some(self.word_bank_url.replace(LANGUAGE_PLACEHOLDER, &name));
        }
        language
            .trim()
            .eq_ignore_ascii_case(DEFAULT_LANGUAGE)
            .then(|| self.word_bank_url.clone())
    }

    pub fn apply(&mut self, setting: &Setting) {
        match setting {
            Setting::IndexMode(on) => self.index_mode = *on,
            Setting::SortingMode(mode) => self.sorting_mode = *mode,
            Setting::CustomWordList(list) => self.custom_word_list = list.clone(),
            Setting::EnableOfficialWordList(on) => self.enable_official_word_list = *on,
            Setting::Language(language) => self.language = language.clone(),
        }
    }
}

/// One change to a user-facing setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Setting {
    IndexMode(bool),
    SortingMode(i64),
    CustomWordList(String),
    EnableOfficialWordList(bool),
    Language(String),
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl Setting {
    pub fn key(&self) -> &'static str {
        match self {
            Setting::IndexMode(_) => "index_mode",
            Setting::SortingMode(_) => "sorting_mode",
            Setting::CustomWordList(_) => "custom_word_list",
            Setting::EnableOfficialWordList(_) => "enable_official_word_list",
            Setting::Language(_) => "language",
        }
    }

    /// Parse a `key`/`value` pair, accepting both the snake_case keys and
    /// the camelCase names used by the browser settings store.
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match key {
            "index_mode" | "indexMode" => Ok(Setting::IndexMode(parse_flag(key, value)?)),
            "sorting_mode" | "sortingMode" => value
                .trim()
                .parse()
                .map(Setting::SortingMode)
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
            "custom_word_list" | "customWL" => Ok(Setting::CustomWordList(value.to_string())),
            "enable_official_word_list" | "enableOfficialWL" => {
                Ok(Setting::EnableOfficialWordList(parse_flag(key, value)?))
            }
            "language" => Ok(Setting::Language(value.trim().to_string())),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Whether this change needs a new word bank, as opposed to just a
    /// re-rank or re-render.
    pub fn requires_rebuild(&self) -> bool {
        matches!(
            self,
            Setting::CustomWordList(_) | Setting::EnableOfficialWordList(_) | Setting::Language(_)
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Setting::SortingMode(mode) = self
            && SortMode::from_index(*mode).is_none()
        {
            return Err(ConfigError::InvalidValue {
                key: self.key().to_string(),
                value: mode.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct Subscribers {
    senders: Vec<mpsc::Sender<Setting>>,
}

impl Subscribers {
    fn subscribe(&mut self) -> mpsc::Receiver<Setting> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    fn notify(&mut self, setting: &Setting) {
        self.senders.retain(|tx| tx.send(setting.clone()).is_ok());
    }
}

/// Settings persisted to a TOML file, rewritten on every change.
pub struct FileConfigStore {
    path: PathBuf,
    config: Config,
    subscribers: Subscribers,
}

impl FileConfigStore {
    pub fn open() -> Result<Self> {
        Self::open_at(Config::config_path())
    }

    pub fn open_at(path: PathBuf) -> Result<Self> {
        let config = Config::load_from(&path)?;
        Ok(Self {
            path,
            config,
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self) -> Config {
        self.config.clone()
    }

    fn set(&mut self, setting: Setting) -> Result<()> {
        setting.validate()?;
        let mut next = self.config.clone();
        next.apply(&setting);
        next.save_to(&self.path)?;
        self.config = next;
        self.subscribers.notify(&setting);
        Ok(())
    }

    fn subscribe(&mut self) -> mpsc::Receiver<Setting> {
        self.subscribers.subscribe()
    }
}

/// Settings held only in memory, for embedding and tests.
#[derive(Default)]
pub struct MemoryConfigStore {
    config: Config,
    subscribers: Subscribers,
}

impl MemoryConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            subscribers: Subscribers::default(),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self) -> Config {
        self.config.clone()
    }

    fn set(&mut self, setting: Setting) -> Result<()> {
        setting.validate()?;
        self.config.apply(&setting);
        self.subscribers.notify(&setting);
        Ok(())
    }

    fn subscribe(&mut self) -> mpsc::Receiver<Setting> {
        self.subscribers.subscribe()
    }
}
