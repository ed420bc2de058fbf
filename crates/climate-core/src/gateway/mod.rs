//! Thin JSON-over-HTTP gateway used to fetch climate data.
//!
//! Every call composes `base_url + path`, sends `Content-Type:
//! application/json` unless the caller overrides it, and hands back the raw
//! `reqwest::Response` on success. Non-success statuses and transport
//! failures are logged, then returned to the caller unchanged.

mod error;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;
use tracing::{debug, error};

pub use error::{GatewayError, GatewayErrorKind, GatewayResult};

use crate::config::Config;

/// User-Agent sent with every gateway request.
pub const USER_AGENT: &str = concat!("climate/", env!("CARGO_PKG_VERSION"));

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client bound to a single base URL.
#[derive(Debug, Clone)]
pub struct RequestGateway {
    base_url: String,
    http: reqwest::Client,
}

impl RequestGateway {
    /// Creates a gateway with a default client identifying as `USER_AGENT`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base_url, http)
    }

    /// Creates a gateway around an existing client, keeping its user agent.
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// Builds a gateway from the resolved config (base URL, timeout).
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.effective_api_base_url()?;
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Composes the absolute URL for `path` without issuing a request.
    ///
    /// A missing leading `/` is inserted, so `"x"` and `"/x"` are equivalent.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issues a GET request.
    ///
    /// # Errors
    /// `RequestFailed` on non-success status, `Transport` on network failure.
    pub async fn get(&self, path: &str) -> GatewayResult<Response> {
        self.get_with_headers(path, HeaderMap::new()).await
    }

    /// Issues a GET request with extra headers.
    ///
    /// # Errors
    /// `RequestFailed` on non-success status, `Transport` on network failure.
    pub async fn get_with_headers(&self, path: &str, headers: HeaderMap) -> GatewayResult<Response> {
        self.send(Method::GET, path, None, headers).await
    }

    /// Issues a POST request, serializing `body` as JSON when present.
    ///
    /// # Errors
    /// `Encode` if the body cannot be serialized, otherwise as for `get`.
    pub async fn post<B>(&self, path: &str, body: Option<&B>) -> GatewayResult<Response>
    where
        B: Serialize + ?Sized,
    {
        self.post_with_headers(path, body, HeaderMap::new()).await
    }

    /// Issues a POST request with extra headers.
    ///
    /// # Errors
    /// `Encode` if the body cannot be serialized, otherwise as for `get`.
    pub async fn post_with_headers<B>(
        &self,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> GatewayResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let payload = self.encode(path, body)?;
        self.send(Method::POST, path, payload, headers).await
    }

    /// Issues a PUT request, serializing `body` as JSON when present.
    ///
    /// # Errors
    /// `Encode` if the body cannot be serialized, otherwise as for `get`.
    pub async fn put<B>(&self, path: &str, body: Option<&B>) -> GatewayResult<Response>
    where
        B: Serialize + ?Sized,
    {
        self.put_with_headers(path, body, HeaderMap::new()).await
    }

    /// Issues a PUT request with extra headers.
    ///
    /// # Errors
    /// `Encode` if the body cannot be serialized, otherwise as for `get`.
    pub async fn put_with_headers<B>(
        &self,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> GatewayResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let payload = self.encode(path, body)?;
        self.send(Method::PUT, path, payload, headers).await
    }

    /// Issues a DELETE request (no body).
    ///
    /// # Errors
    /// `RequestFailed` on non-success status, `Transport` on network failure.
    pub async fn delete(&self, path: &str) -> GatewayResult<Response> {
        self.delete_with_headers(path, HeaderMap::new()).await
    }

    /// Issues a DELETE request with extra headers.
    ///
    /// # Errors
    /// `RequestFailed` on non-success status, `Transport` on network failure.
    pub async fn delete_with_headers(&self, path: &str, headers: HeaderMap) -> GatewayResult<Response> {
        self.send(Method::DELETE, path, None, headers).await
    }

    fn encode<B>(&self, path: &str, body: Option<&B>) -> GatewayResult<Option<Vec<u8>>>
    where
        B: Serialize + ?Sized,
    {
        body.map(serde_json::to_vec)
            .transpose()
            .map_err(|source| {
                let url = self.build_url(path);
                error!(%url, error = %source, "API call failed: cannot encode body");
                GatewayError::Encode { url, source }
            })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        extra_headers: HeaderMap,
    ) -> GatewayResult<Response> {
        let url = self.build_url(path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.extend(extra_headers);

        debug!(%method, %url, "API call");
        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                error!(%method, %url, error = %source, "API call failed");
                return Err(GatewayError::Transport { url, source });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = GatewayError::request_failed(status.as_u16(), url, &body);
            error!(%method, status = status.as_u16(), error = %err, "API call failed");
            return Err(err);
        }

        Ok(response)
    }
}
