use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BankError;

/// A fetched word bank document and when it was fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedDocument {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub body: String,
}

impl CachedDocument {
    pub fn new(url: &str, body: String) -> Self {
        Self {
            url: url.to_string(),
            fetched_at: Utc::now(),
            body,
        }
    }

    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) <= max_age
    }
}

pub struct DiskCache {
    base_dir: PathBuf,
}

impl DiskCache {
    pub fn new(base_dir: &Path) -> Option<Self> {
        fs::create_dir_all(base_dir).ok()?;
        Some(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    pub fn get(&self, key: &str) -> Option<CachedDocument> {
        let path = self.base_dir.join(Self::sanitize_key(key));
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(document) => Some(document),
            Err(err) => {
                log::warn!("ignoring unreadable cache entry for '{key}': {err}");
                None
            }
        }
    }

    pub fn put(&self, key: &str, document: &CachedDocument) -> bool {
        let path = self.base_dir.join(Self::sanitize_key(key));
        match serde_json::to_string(document) {
            Ok(json) => fs::write(path, json).is_ok(),
            Err(_) => false,
        }
    }

    fn sanitize_key(key: &str) -> String {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{name}.cache.json")
    }
}

#[cfg(feature = "network")]
pub fn fetch_url(url: &str) -> Result<String, BankError> {
    let transport = |source| BankError::Transport {
        url: url.to_string(),
        source,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(transport)?;
    let response = client.get(url).send().map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(BankError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(transport)
}

#[cfg(not(feature = "network"))]
pub fn fetch_url(_url: &str) -> Result<String, BankError> {
    Err(BankError::NetworkDisabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        let document = CachedDocument::new("https://example.org/words.json", "{}".to_string());
        assert!(cache.put(&document.url, &document));
        assert_eq!(cache.get(&document.url), Some(document));
        assert!(cache.get("https://example.org/other.json").is_none());
    }

    #[test]
    fn test_unreadable_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        fs::write(dir.path().join(DiskCache::sanitize_key("k")), "garbage").unwrap();
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(
            DiskCache::sanitize_key("https://a.b/c?d=1"),
            "https___a.b_c_d_1.cache.json"
        );
    }

    #[test]
    fn test_freshness() {
        let now = Utc::now();
        let mut document = CachedDocument::new("u", String::new());
        document.fetched_at = now - Duration::hours(5);
        assert!(document.is_fresh(Duration::hours(24), now));
        assert!(!document.is_fresh(Duration::hours(4), now));
    }
}
