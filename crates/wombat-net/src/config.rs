//! Download configuration.
//!
//! Durations are given in seconds when deserialized.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// HTTP cache directory and freshness limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpCacheConfig {
    /// Where cached responses live; `None` disables the cache.
    pub dir: Option<PathBuf>,
    /// How long an entry is served without asking the server.
    #[serde(deserialize_with = "seconds")]
    pub fresh_time: Duration,
    /// How long an entry may be revalidated before it is thrown away.
    #[serde(deserialize_with = "seconds")]
    pub max_time: Duration,
}

impl Default for HttpCacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            fresh_time: Duration::from_secs(60 * 60),
            max_time: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Settings of a [`crate::Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Directory searched for `chrome:` resources before the built-in ones.
    pub chrome_dir: Option<PathBuf>,
    /// HTTP cache settings.
    pub http_cache: HttpCacheConfig,
    /// Cap on HTTP requests in flight at once.
    pub max_connections: Option<usize>,
    /// Limit on establishing a connection.
    #[serde(deserialize_with = "seconds")]
    pub connect_timeout: Duration,
    /// Limit on waiting for response data.
    #[serde(deserialize_with = "seconds")]
    pub read_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            chrome_dir: None,
            http_cache: HttpCacheConfig::default(),
            max_connections: None,
            connect_timeout: Duration::from_millis(1500),
            read_timeout: Duration::from_secs(4),
        }
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
