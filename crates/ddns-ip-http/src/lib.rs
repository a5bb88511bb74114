// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS system.
//
// ## Purpose
//
// Hosts behind NAT cannot see their public address on any local interface.
// An echo service (e.g., api64.ipify.org) reports the address a request
// arrived from, which is what the DNS record should hold.
//
// ## Architecture
//
// One GET per detection. The response body is the address as plain text;
// surrounding whitespace is trimmed and nothing else is checked. When a bind
// interface is configured, the request leaves from that interface's address
// of the requested IP version, so the echo service sees the matching family.

use async_trait::async_trait;
use ddns_core::config::IpVersion;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};
use ddns_ip_iface::{InterfaceLookup, SystemInterfaces, bind_address};

use std::sync::Arc;
use std::time::Duration;

/// Default timeout for the echo request
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP echo-service IP source
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// IP version to detect
    version: IpVersion,

    /// Interface the request is bound to, if any
    bind_interface: Option<String>,

    /// Address lookup for the bind interface
    lookup: Arc<dyn InterfaceLookup>,

    /// Request timeout
    timeout: Duration,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api64.ipify.org/")
    /// - `version`: IP version to detect
    pub fn new(url: impl Into<String>, version: IpVersion) -> Self {
        Self {
            url: url.into(),
            version,
            bind_interface: None,
            lookup: Arc::new(SystemInterfaces),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Bind requests to an interface's address
    pub fn with_bind_interface(mut self, interface: Option<String>) -> Self {
        self.bind_interface = interface;
        self
    }

    /// Use a custom interface lookup
    pub fn with_lookup(mut self, lookup: Arc<dyn InterfaceLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        if let Some(addr) = bind_address(
            self.lookup.as_ref(),
            self.bind_interface.as_deref(),
            self.version,
        )? {
            builder = builder.local_address(addr);
        }

        builder
            .build()
            .map_err(|e| Error::network(format!("Failed to build HTTP client: {}", e)))
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        let response = self
            .client()?
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "IP service {} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        tracing::debug!("IP service {} answered {:?}", self.url, body);

        Ok(body.trim().to_string())
    }

    fn version(&self) -> IpVersion {
        self.version
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Loopback;

    impl InterfaceLookup for Loopback {
        fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>> {
            match interface {
                "lo" => Ok(vec!["127.0.0.1".parse().unwrap()]),
                other => Err(Error::network(format!("Network interface not found: {}", other))),
            }
        }
    }

    #[tokio::test]
    async fn body_is_returned_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  203.0.113.7\n"))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri(), IpVersion::V4);
        assert_eq!(source.current().await.unwrap(), "203.0.113.7");
    }

    #[tokio::test]
    async fn body_is_not_validated_as_an_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not-an-ip"))
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri(), IpVersion::V4);
        assert_eq!(source.current().await.unwrap(), "not-an-ip");
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri(), IpVersion::V4);
        let err = source.current().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        let source = HttpIpSource::new("http://127.0.0.1:1/", IpVersion::V4)
            .with_timeout(Duration::from_secs(2));

        let err = source.current().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn request_leaves_from_bound_interface() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("127.0.0.1"))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri(), IpVersion::V4)
            .with_bind_interface(Some("lo".to_string()))
            .with_lookup(Arc::new(Loopback));

        assert_eq!(source.current().await.unwrap(), "127.0.0.1");
    }

    #[tokio::test]
    async fn missing_bind_address_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("::1"))
            .expect(0)
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri(), IpVersion::V6)
            .with_bind_interface(Some("lo".to_string()))
            .with_lookup(Arc::new(Loopback));

        let err = source.current().await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
    }
}
