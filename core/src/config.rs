//! Network parameters for a `RestClient`.
//!
//! # Design
//! `ClientConfig` is a plain value: it is built once, validated and handed to
//! `RestClient::new`, which turns it into a transport agent. The client keeps
//! its own copy and never exposes a way to change it afterwards.
//!
//! Certificate verification is on unless `danger_accept_invalid_certs(true)`
//! is called. Turning it off is logged when the client is built.

use std::time::Duration;

use crate::error::{Error, Result};

/// Immutable connection, timeout and TLS settings.
///
/// Only idle connections are capped. The number of open connections per
/// host is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound on a whole round trip, body read included.
    pub timeout: Duration,
    /// Time allowed to resolve and open the TCP connection.
    pub connect_timeout: Duration,
    /// Pooled connections unused for this long are closed.
    pub idle_timeout: Duration,
    /// How long to wait for `100 Continue` before sending a body anyway.
    pub expect_continue_timeout: Duration,
    pub max_idle_connections: usize,
    pub max_idle_connections_per_host: usize,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
            expect_continue_timeout: Duration::from_secs(1),
            max_idle_connections: 100,
            max_idle_connections_per_host: 16,
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_expect_continue_timeout(mut self, timeout: Duration) -> Self {
        self.expect_continue_timeout = timeout;
        self
    }

    pub fn with_max_idle_connections(mut self, max: usize) -> Self {
        self.max_idle_connections = max;
        self
    }

    pub fn with_max_idle_connections_per_host(mut self, max: usize) -> Self {
        self.max_idle_connections_per_host = max;
        self
    }

    /// Accept any server certificate, including self-signed and expired ones.
    ///
    /// This removes protection against man-in-the-middle attacks. Only use it
    /// against hosts you control.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Check that the settings can be turned into a working agent.
    pub fn validate(&self) -> Result<()> {
        let timeouts = [
            ("timeout", self.timeout),
            ("connect_timeout", self.connect_timeout),
            ("idle_timeout", self.idle_timeout),
            ("expect_continue_timeout", self.expect_continue_timeout),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, value)| value.is_zero()) {
            return Err(Error::Config(format!("{name} must be greater than zero")));
        }
        if self.max_idle_connections_per_host > self.max_idle_connections {
            return Err(Error::Config(format!(
                "max_idle_connections_per_host ({}) exceeds max_idle_connections ({})",
                self.max_idle_connections_per_host, self.max_idle_connections
            )));
        }
        Ok(())
    }

    pub(crate) fn to_agent_config(&self) -> ureq::config::Config {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(self.accept_invalid_certs)
            .build();

        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(self.timeout))
            .timeout_connect(Some(self.connect_timeout))
            .timeout_await_100(Some(self.expect_continue_timeout))
            .max_idle_connections(self.max_idle_connections)
            .max_idle_connections_per_host(self.max_idle_connections_per_host)
            .max_idle_age(self.idle_timeout)
            .tls_config(tls)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_verifies_certificates() {
        let config = ClientConfig::default();
        assert!(!config.accept_invalid_certs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn setters_replace_single_fields() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_max_idle_connections_per_host(4)
            .danger_accept_invalid_certs(true);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_idle_connections_per_host, 4);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.connect_timeout, ClientConfig::default().connect_timeout);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientConfig::default()
            .with_connect_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("connect_timeout"));
    }

    #[test]
    fn per_host_idle_limit_cannot_exceed_global() {
        let err = ClientConfig::default()
            .with_max_idle_connections(8)
            .with_max_idle_connections_per_host(16)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn agent_config_reports_status_as_data() {
        let agent_config = ClientConfig::default().to_agent_config();
        assert!(!agent_config.http_status_as_error());
        assert_eq!(agent_config.max_idle_connections(), 100);
        assert_eq!(agent_config.max_idle_connections_per_host(), 16);
    }

    #[test]
    fn agent_config_verifies_certificates_by_default() {
        let agent_config = ClientConfig::default().to_agent_config();
        assert!(!agent_config.tls_config().disable_verification());
    }

    #[test]
    fn accept_invalid_certs_reaches_agent_tls_config() {
        let agent_config = ClientConfig::default()
            .danger_accept_invalid_certs(true)
            .to_agent_config();
        assert!(agent_config.tls_config().disable_verification());
    }
}
