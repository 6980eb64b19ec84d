//! Configuration Module
//!
//! Cache policy settings, loadable from environment variables or any serde
//! format.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TupleCacheError};

/// Entry timeout in milliseconds; unset or `0` disables expiration.
pub const TIMEOUT_ENV: &str = "TUPLE_CACHE_TIMEOUT_MS";
/// Maximum entry count; unset means unbounded.
pub const LIMIT_ENV: &str = "TUPLE_CACHE_LIMIT";

/// Cache policy configuration.
///
/// Both policies are off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Lifetime of each entry after its last `set`
    #[serde(rename = "timeout_ms", with = "millis", default)]
    pub timeout: Option<Duration>,
    /// Maximum number of entries before LRU eviction
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Config {
    /// Creates a Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TUPLE_CACHE_TIMEOUT_MS` - Entry timeout in milliseconds (default: none)
    /// - `TUPLE_CACHE_LIMIT` - Maximum entries, at least 1 (default: none)
    ///
    /// Empty values count as unset. Unparsable values and a zero limit are
    /// rejected.
    pub fn from_env() -> Result<Self> {
        let timeout = read_var::<u64>(TIMEOUT_ENV)?
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let limit = match read_var::<usize>(LIMIT_ENV)? {
            Some(0) => {
                return Err(TupleCacheError::InvalidConfig {
                    var: LIMIT_ENV,
                    value: "0".to_string(),
                    reason: "limit must be at least 1".to_string(),
                })
            }
            limit => limit,
        };

        Ok(Self { timeout, limit })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Reads and parses an optional environment variable.
fn read_var<T>(var: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = match env::var(var) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse() {
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(TupleCacheError::InvalidConfig {
            var,
            value: raw.clone(),
            reason: err.to_string(),
        }),
    }
}

/// Serde adapter for `Option<Duration>` as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timeout) => {
                let ms = u64::try_from(timeout.as_millis()).map_err(ser::Error::custom)?;
                serializer.serialize_some(&ms)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = Option::<u64>::deserialize(deserializer)?;
        Ok(ms.filter(|ms| *ms > 0).map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.limit, None);
    }

    #[test]
    fn test_config_builders() {
        let config = Config::default()
            .with_timeout(Duration::from_millis(250))
            .with_limit(8);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.limit, Some(8));
    }

    // Environment variables are process-wide, so every case runs in one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var(TIMEOUT_ENV);
        env::remove_var(LIMIT_ENV);
        assert_eq!(Config::from_env().unwrap(), Config::default());

        env::set_var(TIMEOUT_ENV, "1500");
        env::set_var(LIMIT_ENV, " 64 ");
        let config = Config::from_env().unwrap();
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.limit, Some(64));

        env::set_var(TIMEOUT_ENV, "0");
        env::set_var(LIMIT_ENV, "");
        assert_eq!(Config::from_env().unwrap(), Config::default());

        env::set_var(TIMEOUT_ENV, "soon");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, TupleCacheError::InvalidConfig { var, .. } if var == TIMEOUT_ENV));

        env::remove_var(TIMEOUT_ENV);
        env::set_var(LIMIT_ENV, "0");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, TupleCacheError::InvalidConfig { var, .. } if var == LIMIT_ENV));

        env::remove_var(LIMIT_ENV);
    }

    #[test]
    fn test_config_serde() {
        let config = Config::default()
            .with_timeout(Duration::from_millis(50))
            .with_limit(2);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 50);
        assert_eq!(json["limit"], 2);

        let parsed: Config = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_rejects_unrepresentable_timeout() {
        let config = Config::default().with_timeout(Duration::MAX);
        assert!(serde_json::to_value(&config).is_err());

        let config = Config::default().with_timeout(Duration::from_millis(u64::MAX));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], u64::MAX);
    }

    #[test]
    fn test_config_huge_timeout_builds_cache() {
        let config = Config::default().with_timeout(Duration::MAX).with_limit(2);
        let mut cache = crate::TupleMap::from_config(&config);
        cache.set(&crate::tuple!["k"], 1);

        assert_eq!(cache.timeout(), Some(Duration::MAX));
        assert_eq!(cache.get(&crate::tuple!["k"], 0), 1);
    }

    #[test]
    fn test_config_deserialize_missing_fields() {
        let parsed: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Config::default());

        let parsed: Config = serde_json::from_str(r#"{"timeout_ms":0,"limit":null}"#).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
