//! On-disk cache of the last successful provider response.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::models::WeatherResponse;
use crate::errors::BotError;
use crate::utils::fs::write_atomic;

#[derive(Debug, Clone)]
pub struct ResponseCache {
    path: PathBuf,
    ttl: i64,
}

impl ResponseCache {
    #[must_use]
    pub fn new(path: PathBuf, ttl: i64) -> Self {
        Self { path, ttl }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A response fetched at `fetched_at` is fresh while `now < fetched_at + ttl`.
    #[must_use]
    pub fn is_fresh(&self, fetched_at: i64, now: i64) -> bool {
        now < fetched_at.saturating_add(self.ttl)
    }

    /// Read the cached response. A missing or unparseable file is a miss.
    #[must_use]
    pub fn read(&self) -> Option<WeatherResponse> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cannot read cache {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("Ignoring invalid cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// The cached response if it exists, parses and is still fresh at `now`.
    #[must_use]
    pub fn load_fresh(&self, now: i64) -> Option<WeatherResponse> {
        let cached = self.read()?;
        if self.is_fresh(cached.server_time, now) {
            Some(cached)
        } else {
            debug!(
                server_time = cached.server_time,
                now, "Cache expired, refetching"
            );
            None
        }
    }

    /// Replace the cache contents with `response`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if serialization or the atomic write fails.
    pub fn store(&self, response: &WeatherResponse) -> Result<(), BotError> {
        let bytes = serde_json::to_vec(response)
            .map_err(|e| BotError::CacheError(format!("serialize: {e}")))?;
        write_atomic(&self.path, &bytes)
            .map_err(|e| BotError::CacheError(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_boundary() {
        let cache = ResponseCache::new(PathBuf::from("unused.json"), 300);
        assert!(cache.is_fresh(1000, 1000));
        assert!(cache.is_fresh(1000, 1299));
        assert!(!cache.is_fresh(1000, 1300));
        assert!(!cache.is_fresh(1000, 5000));
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let cache = ResponseCache::new(PathBuf::from("unused.json"), 0);
        assert!(!cache.is_fresh(1000, 1000));
    }

    #[test]
    fn test_corrupt_cache_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"{not json").unwrap();

        let cache = ResponseCache::new(path, 300);
        assert!(cache.read().is_none());
        assert!(cache.load_fresh(0).is_none());
    }
}
