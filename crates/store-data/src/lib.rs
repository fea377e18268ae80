//! HTTP client utilities for the storefront.
//!
//! Provides a small builder API over `reqwest` with automatic JSON handling,
//! and [`StoreApi`], the storefront's product search endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use store_data::FetchClient;
//!
//! let client = FetchClient::new()
//!     .with_base_url("https://api.example.com")
//!     .with_timeout(std::time::Duration::from_secs(10));
//!
//! let product: serde_json::Value = client
//!     .get("/products/123")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod api;
mod error;
mod request;
mod response;

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

pub use api::{StoreApi, SEARCH_PATH};
pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;

/// HTTP client for outbound requests.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone, Default)]
pub struct FetchClient {
    http: reqwest::Client,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl FetchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a base URL to relative request paths.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a header sent with every request.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Timeout applied to every request unless overridden.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Patch, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url,
        };

        let mut builder = RequestBuilder::new(method, full_url)
            .headers(self.default_headers.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        ClientRequestBuilder {
            http: self.http.clone(),
            builder,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    http: reqwest::Client,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.builder = self.builder.query(pairs);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.builder = self.builder.timeout(timeout);
        self
    }

    /// The request as it would be sent.
    pub fn build(self) -> RequestBuilder {
        self.builder
    }

    /// Send the request and read the whole response.
    ///
    /// Non-2xx statuses are returned as responses; use
    /// [`Response::error_for_status`] to turn them into errors.
    pub async fn send(self) -> Result<Response, FetchError> {
        let RequestBuilder {
            method,
            url,
            headers,
            query,
            body,
            timeout,
        } = self.builder;

        debug!(method = method.as_str(), url = %url, params = query.len(), "sending request");

        let mut request = self.http.request(method.into(), url.as_str());
        if !query.is_empty() {
            request = request.query(&query);
        }
        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let response = Response::read(response).await?;
        debug!(status = response.status, bytes = response.body.len(), url = %url, "received response");
        Ok(response)
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response, StoreApi};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_joins_relative_paths() {
        let client = FetchClient::new().with_base_url("https://api.example.com/v1/");
        assert_eq!(
            client.get("/products").build().url,
            "https://api.example.com/v1/products"
        );
        assert_eq!(
            client.get("https://cdn.example.com/a.png").build().url,
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_default_headers_and_timeout() {
        let client = FetchClient::new()
            .with_default_header("Accept-Language", "ar")
            .with_timeout(Duration::from_secs(5));
        let request = client.get("/x").header("X-Trace", "1").build();

        assert_eq!(request.header_value("accept-language"), Some("ar"));
        assert_eq!(request.header_value("X-Trace"), Some("1"));
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_send_reads_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .with_status(418)
            .with_header("content-type", "text/plain")
            .with_body("teapot")
            .create_async()
            .await;

        let response = FetchClient::new()
            .with_base_url(server.url())
            .get("/ping")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status, 418);
        assert_eq!(response.text().unwrap(), "teapot");
        assert_eq!(response.content_type(), Some("text/plain"));
        assert!(response.error_for_status().is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let result = FetchClient::new()
            .get("http://127.0.0.1:1/unreachable")
            .timeout(Duration::from_secs(2))
            .send()
            .await;
        assert!(matches!(
            result,
            Err(FetchError::RequestError(_)) | Err(FetchError::Timeout)
        ));
    }
}
