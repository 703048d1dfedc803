//! Blocking JSON request helpers over a shared, pre-configured HTTP client.
//!
//! # Overview
//! `get`, `post`, `put`, `patch` and `delete` send one request, encode an
//! optional payload as JSON and decode the JSON response into whatever type
//! the caller asks for. The free functions use a process-wide client built
//! from `ClientConfig::default()`; construct a `RestClient` to use other
//! settings or to point tests at a local server.
//!
//! # Design
//! - `HttpRequest::json` and `HttpResponse::json` are pure, so header
//!   merging, body encoding and status handling are testable without I/O.
//! - `RestClient::execute` is the only function that touches the network.
//! - GET never carries a body; every other method is sent with
//!   `content-type: application/json` unless the caller overrides it.
//! - A status outside `[200, 300)` becomes `Error::Status` with the raw body.
//!
//! ```no_run
//! #[derive(serde::Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let user: User = restful::get("https://api.example.com/users/1", &[])?;
//! # Ok::<(), restful::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;

pub use client::{delete, get, patch, post, put, request, RestClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
