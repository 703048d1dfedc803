//! Plain-data HTTP request and response types.
//!
//! # Design
//! Building a request and interpreting a response are pure functions over
//! these types. `RestClient` sits between the two and is the only place that
//! touches the network, so header merging, body encoding and status handling
//! can be tested without a server.
//!
//! Header names are compared ASCII case-insensitively, matching HTTP header
//! semantics. A name appears at most once in `HttpRequest::headers`.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    /// RFC 5789.
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a JSON payload is encoded and sent for this method.
    pub fn sends_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(Error::InvalidRequest(format!("unsupported method: {other}"))),
        }
    }
}

/// An outgoing HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Build a JSON request.
    ///
    /// `body` is encoded only when `method` sends one; a GET drops it.
    /// Non-GET requests get `content-type: application/json`, after which
    /// `headers` are applied in order and replace any header of the same
    /// name, the content type included.
    pub fn json<B>(
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        if url.trim().is_empty() {
            return Err(Error::InvalidRequest("url is empty".to_string()));
        }

        let body = match body {
            Some(payload) if method.sends_body() => {
                Some(serde_json::to_vec(payload).map_err(Error::Serialization)?)
            }
            _ => None,
        };

        let mut request = HttpRequest {
            method,
            url: url.to_string(),
            headers: Vec::with_capacity(headers.len() + 1),
            body,
        };

        if method.sends_body() {
            request.set_header(CONTENT_TYPE, APPLICATION_JSON);
        }
        for (name, value) in headers {
            request.set_header(name, value);
        }

        Ok(request)
    }

    /// Insert or replace a header, matching names case-insensitively.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => *entry = (name.to_string(), value.to_string()),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A fully read HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase, e.g. `Not Found`. Empty when unknown.
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Decode the body as `T`.
    ///
    /// A status outside `[200, 300)` yields `Error::Status` carrying the raw
    /// body; the body is never decoded on that path.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_success() {
            return Err(Error::Status {
                status: self.status,
                status_text: self.status_text,
                body: self.body,
            });
        }
        serde_json::from_slice(&self.body).map_err(Error::Decode)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
