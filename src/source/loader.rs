use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};

use crate::bank::WordBank;
use crate::bank::bundled::bundled_bank;
use crate::bank::document::parse_document;
use crate::config::Config;
use crate::error::BankError;
use crate::session::BankRequest;
use crate::source::cache::{CachedDocument, DiskCache, fetch_url};

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolves the official word list for a language: fresh cache, then the
/// network, then a stale cache entry, then the bundled bank. A language
/// with no configured location uses its bundled bank directly. Locations
/// that are not http(s) URLs are read as local files.
pub struct BankSources {
    config: Config,
    cache: Option<DiskCache>,
    network: bool,
}

impl BankSources {
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
            cache: DiskCache::new(Path::new(&config.bank_cache_dir)),
            network: true,
        }
    }

    pub fn offline(mut self) -> Self {
        self.network = false;
        self
    }

    fn max_age(&self) -> Duration {
        i64::try_from(self.config.bank_cache_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or(Duration::MAX)
    }

    fn cache_key(language: &str, location: &str) -> String {
        format!("{}-{location}", language.trim().to_lowercase())
    }

    fn load_bundled(language: &str) -> Result<WordBank, BankError> {
        bundled_bank(language).inspect_err(|err| log::error!("{err}"))
    }

    pub fn load_official(&self, language: &str) -> Result<WordBank, BankError> {
        let Some(location) = self.config.bank_url_for(language) else {
            log::debug!("no word bank location for {language}, using the bundled bank");
            return Self::load_bundled(language);
        };
        if !is_remote(&location) {
            let text = fs::read_to_string(&location)?;
            return parse_document(&text);
        }

        let key = Self::cache_key(language, &location);
        let cached = self.cache.as_ref().and_then(|cache| cache.get(&key));
        if let Some(document) = &cached
            && document.is_fresh(self.max_age(), Utc::now())
        {
            match parse_document(&document.body) {
                Ok(bank) => {
                    log::debug!("using cached word bank for '{location}'");
                    return Ok(bank);
                }
                Err(err) => log::warn!("cached word bank for '{location}' is corrupt: {err}"),
            }
        }

        if self.network {
            let fetched = fetch_url(&location)
                .and_then(|body| parse_document(&body).map(|bank| (body, bank)));
            match fetched {
                Ok((body, bank)) => {
                    if let Some(cache) = &self.cache
                        && !cache.put(&key, &CachedDocument::new(&location, body))
                    {
                        log::warn!("could not cache word bank from '{location}'");
                    }
                    return Ok(bank);
                }
                Err(err) => log::warn!("{err}"),
            }
        }

        if let Some(document) = &cached
            && let Ok(bank) = parse_document(&document.body)
        {
            log::warn!("using stale cached word bank for '{location}'");
            return Ok(bank);
        }

        log::warn!("falling back to the bundled {language} word bank");
        Self::load_bundled(language)
    }

    /// Build the bank a request describes. When the official list cannot
    /// be loaded the custom words still make up the bank; with no custom
    /// words either, the failure is returned so the previous bank stays.
    pub fn build(&self, request: &BankRequest) -> Result<WordBank, BankError> {
        if !request.use_official_list {
            return Ok(request.build(None));
        }
        match self.load_official(&request.language) {
            Ok(official) => Ok(request.build(Some(&official))),
            Err(err) => {
                let bank = request.build(None);
                if bank.is_empty() {
                    return Err(err);
                }
                log::warn!(
                    "official {} word list unavailable ({err}), using the custom list alone",
                    request.language
                );
                Ok(bank)
            }
        }
    }
}

/// Result of one background rebuild, tagged with its request generation.
#[derive(Debug)]
pub struct BankUpdate {
    pub generation: u64,
    pub result: Result<WordBank, BankError>,
}

/// Runs word bank rebuilds off the event thread.
#[derive(Clone)]
pub struct BankLoader {
    sources: Arc<BankSources>,
}

impl BankLoader {
    pub fn new(sources: BankSources) -> Self {
        Self {
            sources: Arc::new(sources),
        }
    }

    /// Build the requested bank on a worker thread and hand the outcome to
    /// `deliver` there.
    pub fn spawn<F>(&self, request: BankRequest, deliver: F) -> thread::JoinHandle<()>
    where
        F: FnOnce(BankUpdate) + Send + 'static,
    {
        let sources = Arc::clone(&self.sources);
        thread::spawn(move || {
            let result = sources.build(&request);
            deliver(BankUpdate {
                generation: request.generation,
                result,
            });
        })
    }
}
