//! Backend connection settings read from the environment.

use std::fmt;

use crate::error::{IngestError, Result};

pub const URL_VAR: &str = "SUPABASE_URL";
pub const SERVICE_ROLE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Base URL and service-role key for the leaderboard backend.
#[derive(Clone)]
pub struct BackendConfig {
    url: String,
    service_role_key: String,
}

impl BackendConfig {
    /// Reads [`URL_VAR`] and [`SERVICE_ROLE_KEY_VAR`] from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(IngestError::MissingEnv(name))
        };
        Ok(Self {
            url: require(URL_VAR)?,
            service_role_key: require(SERVICE_ROLE_KEY_VAR)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn service_role_key(&self) -> &str {
        &self.service_role_key
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}
