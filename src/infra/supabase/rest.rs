use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Method, Request, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::fetch::HttpClient;

/// Thin JSON wrapper over an [`HttpClient`] rooted at a base URL.
///
/// Any response with status >= 400 becomes [`IngestError::Backend`] carrying
/// the status code and the raw body. No retries.
pub struct RestClient<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> RestClient<C> {
    pub fn new(base_url: &str, http: C) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| IngestError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { base_url, http })
    }

    #[cfg(test)]
    pub(crate) fn http(&self) -> &C {
        &self.http
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| IngestError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    #[tracing::instrument(skip(self, query, prefer, body), fields(status = tracing::field::Empty))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        prefer: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let mut req = Request::new(method, self.url(path, query)?);
        let headers = req.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(prefer) = prefer {
            let value = HeaderValue::from_str(prefer).map_err(|e| IngestError::InvalidHeader {
                name: "Prefer".to_string(),
                reason: e.to_string(),
            })?;
            headers.insert(HeaderName::from_static("prefer"), value);
        }
        if let Some(body) = body {
            *req.body_mut() = Some(body.into());
        }

        let resp = self.http.execute(req).await?;
        let status = resp.status();
        tracing::Span::current().record("status", status.as_u16());

        if status.as_u16() >= 400 {
            let body = failure_body(resp.text().await);
            return Err(IngestError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        debug!(status = status.as_u16(), "Backend request succeeded");
        Ok(resp)
    }

    /// `GET` and decode the JSON response body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self.request(Method::GET, path, query, None, None).await?;
        decode(resp).await
    }

    /// `POST` a JSON body and return the raw response.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        prefer: Option<&str>,
        body: &B,
    ) -> Result<Response> {
        let body = serde_json::to_vec(body)?;
        self.request(Method::POST, path, query, prefer, Some(body))
            .await
    }

    /// `POST` a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        prefer: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let resp = self.post(path, query, prefer, body).await?;
        decode(resp).await
    }
}

/// Body text for a failed request, or the reason it could not be read.
fn failure_body(read: reqwest::Result<String>) -> String {
    read.unwrap_or_else(|e| format!("<response body could not be read: {e}>"))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
