use std::{env, net::SocketAddr, num::NonZeroUsize, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::clients::HttpFeedConfig;
use crate::domain::{NewsSource, ReportOptions};

#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::LazyLock<std::sync::Mutex<()>> =
    std::sync::LazyLock::new(|| std::sync::Mutex::new(()));

const DEFAULT_NEWS_SOURCES: &str = "Reuters=Reuters,\
New York Times=nytimes,\
Wall Street Journal=WSJ,\
The Associated Press=AP,\
CNN=CNN,\
NBC=NBCNews,\
Fox News=FoxNews,\
BBC=BBCBreaking,\
Al Jazeera (English)=AJEnglish";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    feed_base_url: String,
    feed_connect_timeout: Duration,
    feed_total_timeout: Duration,
    feed_page_size: NonZeroUsize,
    report_sample_size: NonZeroUsize,
    report_remove_stopwords: bool,
    report_language_filter: Option<String>,
    report_cache_ttl: Option<Duration>,
    report_rolling_window: NonZeroUsize,
    report_rolling_min_periods: NonZeroUsize,
    news_sources: Vec<NewsSource>,
    lexicon_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// Reads and validates the worker settings from the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `FEED_BASE_URL` is unset or a value fails
    /// to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let feed_base_url = env_var("FEED_BASE_URL")?;
        let http_bind = parse_socket_addr("OBJECTIVITY_HTTP_BIND", "0.0.0.0:9010")?;

        let feed_connect_timeout = parse_duration_ms("FEED_CONNECT_TIMEOUT_MS", 3000)?;
        let feed_total_timeout = parse_duration_ms("FEED_TOTAL_TIMEOUT_MS", 30000)?;
        let feed_page_size = parse_non_zero_usize("FEED_PAGE_SIZE", 100)?;

        let report_sample_size = parse_non_zero_usize("REPORT_SAMPLE_SIZE", 500)?;
        let report_remove_stopwords = parse_bool("REPORT_REMOVE_STOPWORDS", false)?;
        let report_language_filter = optional_var("REPORT_LANGUAGE_FILTER");

        // 0 keeps entries for the lifetime of the process
        let report_cache_ttl = Some(parse_duration_secs("REPORT_CACHE_TTL_SECS", 900)?)
            .filter(|ttl| !ttl.is_zero());

        let report_rolling_window = parse_non_zero_usize("REPORT_ROLLING_WINDOW", 100)?;
        let report_rolling_min_periods = parse_non_zero_usize("REPORT_ROLLING_MIN_PERIODS", 5)?;
        if report_rolling_min_periods > report_rolling_window {
            return Err(ConfigError::Invalid {
                name: "REPORT_ROLLING_MIN_PERIODS",
                source: anyhow::anyhow!(
                    "must not exceed REPORT_ROLLING_WINDOW ({report_rolling_window})"
                ),
            });
        }

        let news_sources = parse_sources("NEWS_SOURCES", DEFAULT_NEWS_SOURCES)?;
        let lexicon_dir = optional_var("LEXICON_DIR").map(PathBuf::from);

        Ok(Self {
            http_bind,
            feed_base_url,
            feed_connect_timeout,
            feed_total_timeout,
            feed_page_size,
            report_sample_size,
            report_remove_stopwords,
            report_language_filter,
            report_cache_ttl,
            report_rolling_window,
            report_rolling_min_periods,
            news_sources,
            lexicon_dir,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn feed_base_url(&self) -> &str {
        &self.feed_base_url
    }

    #[must_use]
    pub fn feed_connect_timeout(&self) -> Duration {
        self.feed_connect_timeout
    }

    #[must_use]
    pub fn feed_total_timeout(&self) -> Duration {
        self.feed_total_timeout
    }

    #[must_use]
    pub fn feed_page_size(&self) -> NonZeroUsize {
        self.feed_page_size
    }

    /// `None` means entries never expire.
    #[must_use]
    pub fn report_cache_ttl(&self) -> Option<Duration> {
        self.report_cache_ttl
    }

    #[must_use]
    pub fn report_rolling_window(&self) -> NonZeroUsize {
        self.report_rolling_window
    }

    #[must_use]
    pub fn report_rolling_min_periods(&self) -> NonZeroUsize {
        self.report_rolling_min_periods
    }

    #[must_use]
    pub fn news_sources(&self) -> &[NewsSource] {
        &self.news_sources
    }

    /// Handles compare case-insensitively, as on the platform itself.
    #[must_use]
    pub fn source_by_handle(&self, handle: &str) -> Option<&NewsSource> {
        self.news_sources
            .iter()
            .find(|source| source.handle.eq_ignore_ascii_case(handle))
    }

    #[must_use]
    pub fn lexicon_dir(&self) -> Option<&std::path::Path> {
        self.lexicon_dir.as_deref()
    }

    /// Sample size, stop-word toggle and language filter for every report.
    #[must_use]
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            sample_size: self.report_sample_size.get(),
            remove_stopwords: self.report_remove_stopwords,
            language_filter: self.report_language_filter.clone(),
        }
    }

    #[must_use]
    pub fn feed_client_config(&self) -> HttpFeedConfig {
        HttpFeedConfig {
            base_url: self.feed_base_url.clone(),
            connect_timeout: self.feed_connect_timeout,
            total_timeout: self.feed_total_timeout,
            page_size: self.feed_page_size.get(),
        }
    }
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn optional_var(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());

    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    NonZeroUsize::new(parsed).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("must be greater than zero"),
    })
}

fn parse_duration_secs(name: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    let value = parse_u64(name, default_secs)?;
    Ok(Duration::from_secs(value))
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    let value = parse_u64(name, default_ms)?;
    Ok(Duration::from_millis(value))
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid boolean value: {raw}"),
        }),
    }
}

/// Parses a `Name=handle` comma list. Order is kept; handles must be unique.
fn parse_sources(name: &'static str, default: &str) -> Result<Vec<NewsSource>, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let mut sources: Vec<NewsSource> = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((display, handle)) = entry.rsplit_once('=') else {
            return Err(ConfigError::Invalid {
                name,
                source: anyhow::anyhow!("expected 'Name=handle', got '{entry}'"),
            });
        };
        let (display, handle) = (display.trim(), handle.trim().trim_start_matches('@'));
        if display.is_empty() || handle.is_empty() {
            return Err(ConfigError::Invalid {
                name,
                source: anyhow::anyhow!("empty name or handle in '{entry}'"),
            });
        }
        if sources
            .iter()
            .any(|source| source.handle.eq_ignore_ascii_case(handle))
        {
            return Err(ConfigError::Invalid {
                name,
                source: anyhow::anyhow!("duplicate handle '{handle}'"),
            });
        }
        sources.push(NewsSource::new(display, handle));
    }

    if sources.is_empty() {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("at least one source is required"),
        });
    }
    Ok(sources)
}
