use std::env;

use serde::Serialize;

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

const DEFAULT_HOST: &str = "https://global-api.fintechstudios.com";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_TOKEN_EXP_BUFFER_MS: u64 = 2 * 60_000;
const DEFAULT_BATCH_SIZE: usize = 500;

/// Profiled env lookup: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
struct ProfiledEnv<'a, F> {
    profile: &'a str,
    lookup: F,
}

impl<F> ProfiledEnv<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn opt(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            let prefixed = format!("{}_{}", self.profile, key);
            if let Some(v) = (self.lookup)(&prefixed).filter(|s| !s.is_empty()) {
                return Some(v);
            }
        }
        (self.lookup)(key).filter(|s| !s.is_empty())
    }

    fn number<T: std::str::FromStr + PartialOrd + Default>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, CoreError> {
        let Some(raw) = self.opt(key) else {
            return Ok(default);
        };
        match raw.parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => Err(CoreError::InvalidEnv {
                key: key.to_string(),
                must_be: "be a number above 0".to_string(),
                value: raw,
            }),
        }
    }
}

/// Login credentials for the entity directory API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub api_key: String,
}

/// Settings for the entity directory (FTS API) client.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Base URL without a trailing slash.
    pub host: String,
    pub timeout_ms: u64,
    /// Refresh the auth token this long before it actually expires.
    pub token_expiration_buffer_ms: u64,
    /// Maximum number of entities per resolution request.
    pub batch_size: usize,
    #[serde(skip_serializing)]
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl DirectoryConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PIPEDUMP_PROFILE`.
    pub fn from_env() -> Result<Self, CoreError> {
        let profile = env::var("PIPEDUMP_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, |key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup, e.g. a fixed map in tests.
    pub fn from_lookup<F>(profile: &str, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = profile.to_uppercase();
        let env = ProfiledEnv {
            profile: &profile,
            lookup,
        };

        let host = env
            .opt("FTS_API_HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        if host.ends_with('/') {
            return Err(CoreError::InvalidEnv {
                key: "FTS_API_HOST".to_string(),
                must_be: "not end with a trailing slash".to_string(),
                value: host,
            });
        }

        Ok(Self {
            host,
            timeout_ms: env.number("FTS_API_TIMEOUT", DEFAULT_TIMEOUT_MS)?,
            token_expiration_buffer_ms: env
                .number("FTS_API_TOKEN_EXP_BUFFER", DEFAULT_TOKEN_EXP_BUFFER_MS)?,
            batch_size: env.number("FTS_API_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            username: env.opt("FTS_API_USERNAME"),
            password: env.opt("FTS_API_PASSWORD"),
            api_key: env.opt("FTS_API_KEY"),
            profile,
        })
    }

    /// Credentials are only needed when the HTTP directory is actually used.
    pub fn credentials(&self) -> Result<Credentials, CoreError> {
        fn required(key: &str, value: &Option<String>) -> Result<String, CoreError> {
            value.clone().ok_or_else(|| CoreError::MissingEnv {
                key: key.to_string(),
            })
        }
        Ok(Credentials {
            username: required("FTS_API_USERNAME", &self.username)?,
            password: required("FTS_API_PASSWORD", &self.password)?,
            api_key: required("FTS_API_KEY", &self.api_key)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Settings as JSON, without the secrets.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            profile = self.profile_label(),
            host = %self.host,
            timeout_ms = self.timeout_ms,
            batch_size = self.batch_size,
            credentials = self.username.is_some() && self.api_key.is_some(),
            "directory config loaded"
        );
        tracing::debug!(config = %self.redacted_summary(), "directory config");
    }
}
