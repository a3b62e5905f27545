use crate::error::{IngestError, Result};
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header is validated once at construction and marked sensitive so it
/// never shows up in debug output. Wrappers stack, which is how a backend that
/// wants the key both as `apikey` and as a bearer token is served.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            IngestError::InvalidHeader {
                name: header_name.to_string(),
                reason: e.to_string(),
            }
        })?;
        Self::with_name(inner, name, key)
    }

    /// Uses `Authorization: Bearer <key>`.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Self::with_name(inner, AUTHORIZATION, &format!("Bearer {key}"))
    }

    fn with_name(inner: C, header_name: HeaderName, key: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(key).map_err(|e| IngestError::InvalidHeader {
            name: header_name.to_string(),
            reason: e.to_string(),
        })?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
