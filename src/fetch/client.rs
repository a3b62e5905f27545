use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam: executes a fully built request.
///
/// Decorators such as [`super::auth::ApiKey`] wrap another `HttpClient`, and
/// tests substitute a recording implementation.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
