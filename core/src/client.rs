//! Blocking JSON client built on a shared `ureq` agent.
//!
//! # Design
//! `RestClient` owns one agent built from a `ClientConfig` and nothing else.
//! A call runs three steps: `HttpRequest::json` builds the request as data,
//! `execute` performs the round trip, and `HttpResponse::json` interprets
//! the result. Only `execute` does I/O.
//!
//! The agent is reference counted and its connection pool is internally
//! synchronized, so a `RestClient` can be cloned or shared across threads
//! freely. There is no per-call timeout; the config's timeouts apply to
//! every call.

use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use ureq::http::{HeaderName, HeaderValue};
use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

static SHARED: LazyLock<RestClient> = LazyLock::new(RestClient::with_defaults);

/// JSON-over-HTTP client with a fixed configuration.
#[derive(Debug, Clone)]
pub struct RestClient {
    agent: Agent,
    config: ClientConfig,
}

impl RestClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn with_defaults() -> Self {
        Self::build(ClientConfig::default())
    }

    fn build(config: ClientConfig) -> Self {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for this client");
        }
        let agent = Agent::new_with_config(config.to_agent_config());
        Self { agent, config }
    }

    /// The process-wide client used by the free functions, built from
    /// `ClientConfig::default()` on first use.
    pub fn shared() -> &'static RestClient {
        &SHARED
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request and decode the JSON response as `T`.
    pub fn request<T, B>(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = HttpRequest::json(method, url, headers, body)?;
        self.execute(request)?.json()
    }

    pub fn get<T: DeserializeOwned>(&self, url: &str, headers: &[(&str, &str)]) -> Result<T> {
        self.request::<T, ()>(HttpMethod::Get, url, headers, None)
    }

    pub fn post<T, B>(&self, url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Post, url, headers, body)
    }

    pub fn put<T, B>(&self, url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Put, url, headers, body)
    }

    pub fn patch<T, B>(&self, url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Patch, url, headers, body)
    }

    pub fn delete<T, B>(&self, url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Delete, url, headers, body)
    }

    /// Perform the round trip for an already built request and read the
    /// whole response body. Any status code is returned as data.
    pub fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        debug!(%method, %url, body_len = body.as_ref().map_or(0, Vec::len), "sending request");

        let result = match method {
            HttpMethod::Get => self.agent.get(&url).with_headers(&headers)?.call(),
            HttpMethod::Delete => {
                let builder = self.agent.delete(&url).with_headers(&headers)?;
                match body {
                    Some(body) => builder.force_send_body().send(body.as_slice()),
                    None => builder.call(),
                }
            }
            HttpMethod::Post => send(self.agent.post(&url).with_headers(&headers)?, body),
            HttpMethod::Put => send(self.agent.put(&url).with_headers(&headers)?, body),
            HttpMethod::Patch => send(self.agent.patch(&url).with_headers(&headers)?, body),
        };
        let mut response = result?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // Bodies are read in full regardless of size.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        debug!(%method, %url, status = status.as_u16(), body_len = body.len(), "received response");

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<Vec<u8>>,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_slice()),
        None => builder.send_empty(),
    }
}

trait WithHeaders: Sized {
    fn with_headers(self, headers: &[(String, String)]) -> Result<Self>;
}

impl<S> WithHeaders for RequestBuilder<S> {
    fn with_headers(self, headers: &[(String, String)]) -> Result<Self> {
        headers.iter().try_fold(self, |builder, (name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("header {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidRequest(format!("header {name}: {e}")))?;
            Ok(builder.header(name, value))
        })
    }
}

/// Send a request through the shared client.
pub fn request<T, B>(
    method: HttpMethod,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&B>,
) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    RestClient::shared().request(method, url, headers, body)
}

/// GET through the shared client.
pub fn get<T: DeserializeOwned>(url: &str, headers: &[(&str, &str)]) -> Result<T> {
    RestClient::shared().get(url, headers)
}

/// POST through the shared client.
pub fn post<T, B>(url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    RestClient::shared().post(url, headers, body)
}

/// PUT through the shared client.
pub fn put<T, B>(url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    RestClient::shared().put(url, headers, body)
}

/// PATCH through the shared client.
pub fn patch<T, B>(url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    RestClient::shared().patch(url, headers, body)
}

/// DELETE through the shared client.
pub fn delete<T, B>(url: &str, headers: &[(&str, &str)], body: Option<&B>) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    RestClient::shared().delete(url, headers, body)
}
