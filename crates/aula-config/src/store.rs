use std::fmt;
use std::time::Duration;

use crate::REDACTED;
use crate::error::{ConfigError, parsed_or, required};

/// Connection settings for the hosted backend's REST interface.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`. `/rest/v1` is appended by the client.
    pub url: String,
    pub anon_key: String,
    /// Key sent on every request; bypasses row level security.
    pub service_key: String,
    pub timeouts: StoreTimeouts,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("anon_key", &REDACTED)
            .field("service_key", &REDACTED)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

/// Per-kind deadlines for outbound store calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub read: Duration,
    pub write: Duration,
    pub bulk: Duration,
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(10),
            write: Duration::from_secs(15),
            bulk: Duration::from_secs(60),
        }
    }
}

impl StoreTimeouts {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            read: Duration::from_secs(parsed_or(
                "STORE_READ_TIMEOUT_SECS",
                defaults.read.as_secs(),
            )),
            write: Duration::from_secs(parsed_or(
                "STORE_WRITE_TIMEOUT_SECS",
                defaults.write.as_secs(),
            )),
            bulk: Duration::from_secs(parsed_or(
                "STORE_BULK_TIMEOUT_SECS",
                defaults.bulk.as_secs(),
            )),
        }
    }
}

impl StoreConfig {
    /// Loads `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `SUPABASE_SERVICE_ROLE_KEY`.
    ///
    /// All three are required; the service refuses to start without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = required("SUPABASE_URL")?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "SUPABASE_URL",
                value: url,
            });
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: required("SUPABASE_ANON_KEY")?,
            service_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            timeouts: StoreTimeouts::from_env(),
        })
    }

    /// Base URL of the REST interface.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts() {
        let t = StoreTimeouts::default();
        assert_eq!(t.read, Duration::from_secs(10));
        assert_eq!(t.write, Duration::from_secs(15));
        assert_eq!(t.bulk, Duration::from_secs(60));
    }

    #[test]
    fn rest_url_appends_prefix() {
        let config = StoreConfig {
            url: "https://demo.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            service_key: "service".to_string(),
            timeouts: StoreTimeouts::default(),
        };
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn debug_hides_keys() {
        let config = StoreConfig {
            url: "https://demo.supabase.co".to_string(),
            anon_key: "anon-key-value".to_string(),
            service_key: "service-key-value".to_string(),
            timeouts: StoreTimeouts::default(),
        };
        let printed = format!("{config:?}");
        assert!(printed.contains("https://demo.supabase.co"));
        assert!(!printed.contains("anon-key-value"));
        assert!(!printed.contains("service-key-value"));
    }
}
