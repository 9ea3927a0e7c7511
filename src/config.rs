//! Configuration file parser for the pipeline.
//!
//! The config file is optional: a missing file yields `Config::default()`,
//! which reproduces the production source set (the Kompas index plus four
//! national RSS feeds). Unknown keys are silently ignored by serde, though a
//! warning is logged when the file contains potential typos.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// An HTML-index source: a paginated listing page scanned for article links.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HtmlSource {
    /// Source identifier stored with every candidate.
    pub name: String,
    /// Index page URL template; `{page}` is replaced by the page number.
    pub index_url: String,
    /// Pages 1..=pages are fetched per run.
    pub pages: u32,
    /// Path fragment identifying article permalinks (e.g. "/read/").
    pub article_path_marker: String,
}

/// An RSS/Atom feed source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to the values in `Config::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file path.
    pub db_path: PathBuf,

    /// Per-request deadline in seconds.
    pub request_timeout_secs: u64,

    /// Fixed delay between paginated index fetches, in milliseconds.
    pub page_delay_ms: u64,

    /// HTML-index sources.
    pub html_sources: Vec<HtmlSource>,

    /// RSS/Atom feed sources.
    pub feed_sources: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/news_articles.db"),
            request_timeout_secs: 20,
            page_delay_ms: 1000,
            html_sources: vec![HtmlSource {
                name: "Kompas".to_string(),
                index_url: "https://indeks.kompas.com/?page={page}".to_string(),
                pages: 3,
                article_path_marker: "/read/".to_string(),
            }],
            feed_sources: vec![
                FeedSource {
                    name: "Liputan6".to_string(),
                    url: "https://feed.liputan6.com/rss".to_string(),
                },
                FeedSource {
                    name: "Detik".to_string(),
                    url: "https://news.detik.com/rss".to_string(),
                },
                FeedSource {
                    name: "Tempo".to_string(),
                    url: "http://rss.tempo.co/nasional".to_string(),
                },
                FeedSource {
                    name: "CNN Indonesia".to_string(),
                    url: "https://www.cnnindonesia.com/nasional/rss".to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "db_path",
                "request_timeout_secs",
                "page_delay_ms",
                "html_sources",
                "feed_sources",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            html_sources = config.html_sources.len(),
            feed_sources = config.feed_sources.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
