//! # Configuration
//!
//! [`DashboardConfig`] carries the per-dashboard flags that the composition
//! root resolves once. [`Fixture`] is the JSON document the demo binary runs
//! against: a config plus canned payloads for an in-memory data source.
//!
//! ```json
//! {
//!   "config": { "user_id": "42", "can_edit": true, "show_analytics": true },
//!   "resources": {
//!     "user/42": { "id": "42", "name": "Al", "bio": "hello" },
//!     "posts/42": []
//!   },
//!   "latency_ms": { "posts/42": 150 },
//!   "failures": { "analytics/42": "upstream timeout" }
//! }
//! ```

use crate::clients::MemoryDataSource;
use crate::framework::FetchError;
use crate::model::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CACHE_BUFFER: NonZeroUsize = match NonZeroUsize::new(32) {
    Some(size) => size,
    None => unreachable!(),
};

fn default_cache_buffer() -> NonZeroUsize {
    DEFAULT_CACHE_BUFFER
}

/// Flags and identity for one dashboard instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub user_id: String,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub show_analytics: bool,
    /// Capacity of the cache actor's request channel. A zero capacity is
    /// rejected when the config is parsed.
    #[serde(default = "default_cache_buffer")]
    pub cache_buffer: NonZeroUsize,
}

impl DashboardConfig {
    /// A read-only dashboard without analytics.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            can_edit: false,
            show_analytics: false,
            cache_buffer: DEFAULT_CACHE_BUFFER,
        }
    }

    pub fn with_edit(mut self, can_edit: bool) -> Self {
        self.can_edit = can_edit;
        self
    }

    pub fn with_analytics(mut self, show_analytics: bool) -> Self {
        self.show_analytics = show_analytics;
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),

    /// A resource entry is not of the form `kind/id` with a known kind.
    #[error("Unknown resource entry: {0}")]
    UnknownResource(String),
}

/// A config plus canned backend data.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub config: DashboardConfig,
    /// Payloads keyed `kind/id`.
    #[serde(default)]
    pub resources: BTreeMap<String, serde_json::Value>,
    /// Artificial delay per `kind/id`, in milliseconds.
    #[serde(default)]
    pub latency_ms: BTreeMap<String, u64>,
    /// Transport failures per `kind/id`.
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
}

impl Fixture {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Builds an in-memory data source serving this fixture.
    pub fn data_source(&self) -> Result<MemoryDataSource, ConfigError> {
        let source = MemoryDataSource::new();
        for (entry, payload) in &self.resources {
            let (kind, id) = parse_entry(entry)?;
            source.insert(kind, id, payload.clone());
        }
        for (entry, reason) in &self.failures {
            let (kind, id) = parse_entry(entry)?;
            source.fail(kind, id, FetchError::Transport(reason.clone()));
        }
        for (entry, millis) in &self.latency_ms {
            let (kind, id) = parse_entry(entry)?;
            source.set_latency(kind, id, Duration::from_millis(*millis));
        }
        Ok(source)
    }
}

impl FromStr for Fixture {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

fn parse_entry(entry: &str) -> Result<(ResourceKind, &str), ConfigError> {
    entry
        .split_once('/')
        .and_then(|(kind, id)| Some((ResourceKind::parse(kind)?, id)))
        .filter(|(_, id)| !id.is_empty())
        .ok_or_else(|| ConfigError::UnknownResource(entry.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::DataSource;

    const FIXTURE: &str = r#"{
        "config": { "user_id": "42", "can_edit": true },
        "resources": { "user/42": { "id": "42", "name": "Al" } },
        "failures": { "posts/42": "offline" }
    }"#;

    #[test]
    fn test_config_defaults() {
        let fixture: Fixture = FIXTURE.parse().unwrap();
        assert_eq!(fixture.config.user_id, "42");
        assert!(fixture.config.can_edit);
        assert!(!fixture.config.show_analytics);
        assert_eq!(fixture.config.cache_buffer, DEFAULT_CACHE_BUFFER);
    }

    #[tokio::test]
    async fn test_fixture_data_source() {
        let fixture: Fixture = FIXTURE.parse().unwrap();
        let source = fixture.data_source().unwrap();

        let user = source.fetch(ResourceKind::User, "42").await.unwrap();
        assert_eq!(user["name"], "Al");
        assert_eq!(
            source.fetch(ResourceKind::Posts, "42").await,
            Err(FetchError::Transport("offline".into()))
        );
    }

    #[test]
    fn test_zero_cache_buffer_is_rejected() {
        let result = r#"{ "config": { "user_id": "42", "cache_buffer": 0 } }"#.parse::<Fixture>();
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let fixture: Fixture = r#"{ "config": { "user_id": "42", "cache_buffer": 4 } }"#
            .parse()
            .unwrap();
        assert_eq!(fixture.config.cache_buffer.get(), 4);
    }

    #[test]
    fn test_unknown_resource_entry() {
        let mut fixture: Fixture = FIXTURE.parse().unwrap();
        fixture
            .resources
            .insert("comments/42".into(), serde_json::Value::Null);
        assert!(matches!(
            fixture.data_source(),
            Err(ConfigError::UnknownResource(entry)) if entry == "comments/42"
        ));
    }
}
