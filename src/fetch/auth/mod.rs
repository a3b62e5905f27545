//! Credential-injecting [`HttpClient`](crate::fetch::HttpClient) decorators.

mod api_key;

pub use api_key::ApiKey;
