//! HTTP access to the hosting API and the dependency-ecosystem services.

use super::{Fetched, RequestTracker};
use crate::Result;
use anyhow::Context;
use core::time::Duration;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Log target for the gateway
const LOG_TARGET: &str = "gateway";

const USER_AGENT: &str = concat!("repo-risk/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// A JSON-over-HTTP accessor bound to one service's base URL.
///
/// A 404 is reported as [`Fetched::Absent`] so that "the file doesn't exist" is never
/// confused with a failure. Nothing is retried; callers decide what an error means.
#[derive(Debug, Clone)]
pub struct Gateway {
    name: &'static str,
    base_url: Arc<str>,
    client: Client,
    tracker: RequestTracker,
}

impl Gateway {
    /// Create a gateway for the GitHub REST API, optionally authenticated with a token.
    ///
    /// A missing credential only lowers the rate limit; it is not an error.
    pub fn github(base_url: &str, credential: Option<&str>, timeout: Duration, tracker: RequestTracker) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        if let Some(token) = credential.map(str::trim).filter(|t| !t.is_empty()) {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {token}")).context("the supplied credential is not a valid header value")?;
            value.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, value);
        }

        Self::build("GitHub", base_url, headers, timeout, tracker)
    }

    /// Create an unauthenticated gateway for a public service such as a package registry.
    pub fn public(name: &'static str, base_url: &str, timeout: Duration, tracker: RequestTracker) -> Result<Self> {
        Self::build(name, base_url, HeaderMap::new(), timeout, tracker)
    }

    fn build(name: &'static str, base_url: &str, headers: HeaderMap, timeout: Duration, tracker: RequestTracker) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .with_context(|| format!("creating the HTTP client for {name}"))?;

        Ok(Self {
            name,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            client,
            tracker,
        })
    }

    /// The service name used for logging and request tracking.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// GET a resource as untyped JSON.
    pub async fn fetch(&self, path: &str) -> Fetched<serde_json::Value> {
        self.fetch_as(path).await
    }

    /// GET a resource and decode it into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(&self, path: &str) -> Fetched<T> {
        let url = self.url(path);
        self.send(self.client.get(&url), &url).await
    }

    /// POST a JSON body and decode the response into `T`.
    pub async fn post_as<B, T>(&self, path: &str, body: &B) -> Fetched<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        self.send(self.client.post(&url).json(body), &url).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Fetched<T> {
        self.tracker.add_request(self.name);
        let outcome = execute(request).await;
        self.tracker.complete_request(self.name);

        match &outcome {
            Fetched::Found(_) => log::trace!(target: LOG_TARGET, "{} '{url}': found", self.name),
            Fetched::Absent => log::trace!(target: LOG_TARGET, "{} '{url}': not found", self.name),
            Fetched::Error { .. } => log::debug!(target: LOG_TARGET, "{} '{url}' failed: {outcome}", self.name),
        }

        outcome
    }
}

async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Fetched<T> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return Fetched::error(None, format!("request failed: {e}")),
    };

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Fetched::Absent;
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Fetched::error(Some(status.as_u16()), error_message(status, &body));
    }

    match response.bytes().await {
        Ok(bytes) => decode(&bytes),
        Err(e) => Fetched::error(Some(status.as_u16()), format!("reading response body: {e}")),
    }
}

/// Decode a successful response body; an empty body (e.g. 204) decodes as JSON `null`.
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Fetched<T> {
    let result = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(bytes)
    };

    match result {
        Ok(value) => Fetched::Found(value),
        Err(e) => Fetched::error(None, format!("decoding response: {e}")),
    }
}

/// Prefer the service's own `message` field (GitHub, npm) over the bare status text.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string())
}
