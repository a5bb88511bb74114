//! Configuration types for the DDNS system
//!
//! All settings travel in one [`DdnsConfig`] value that is built once at
//! startup, validated, and handed to the engine and the components it drives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default Alibaba Cloud DNS API endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://alidns.aliyuncs.com/";

/// Default IP echo service
pub const DEFAULT_IP_SOURCE: &str = "https://api64.ipify.org/";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// DNS provider credentials and endpoint
    pub provider: ProviderConfig,

    /// The record to keep in sync
    pub record: RecordConfig,

    /// Where the current IP address comes from
    pub ip_source: IpSourceConfig,

    /// IP family to detect and publish
    #[serde(default)]
    pub version: IpVersion,

    /// Local interface whose address outbound requests are bound to
    #[serde(default)]
    pub bind_interface: Option<String>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything but the
    /// credentials and the domain
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            provider: ProviderConfig::new(access_key_id, access_key_secret),
            record: RecordConfig::new(domain),
            ip_source: IpSourceConfig::default(),
            version: IpVersion::V4,
            bind_interface: None,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.record.validate()?;
        self.ip_source.validate()?;
        self.engine.validate()?;

        if let Some(name) = &self.bind_interface
            && name.trim().is_empty()
        {
            return Err(crate::Error::config("Bind interface name cannot be empty"));
        }

        if self.record.record_type.version() != self.version {
            return Err(crate::Error::config(format!(
                "Record type {} cannot hold an {} address",
                self.record.record_type, self.version
            )));
        }

        Ok(())
    }
}

/// Alibaba Cloud DNS credentials and endpoint
///
/// The Debug implementation does not expose the access key secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// AccessKey ID
    pub access_key_id: String,

    /// AccessKey secret, used only as signing key material
    pub access_key_secret: String,

    /// API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl ProviderConfig {
    /// Create a provider configuration for the default endpoint
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            endpoint: default_endpoint(),
        }
    }

    /// Point the provider at another endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.access_key_id.is_empty() {
            return Err(crate::Error::config("Access key ID cannot be empty"));
        }
        if self.access_key_secret.is_empty() {
            return Err(crate::Error::config("Access key secret cannot be empty"));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "API endpoint must be an HTTP or HTTPS URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

/// DNS record configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Fully-qualified domain name (e.g., "home.example.com")
    pub domain: String,

    /// Record type (A for IPv4, AAAA for IPv6)
    #[serde(default)]
    pub record_type: RecordType,

    /// Resolution line
    #[serde(default)]
    pub line: Line,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl RecordConfig {
    /// Create a new record configuration
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record_type: RecordType::A,
            line: Line::Default,
            ttl: default_ttl(),
        }
    }

    /// Set the record type
    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Set the resolution line
    pub fn with_line(mut self, line: Line) -> Self {
        self.line = line;
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Validate the record configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::domain::split_domain(&self.domain)?;
        if self.ttl == 0 {
            return Err(crate::Error::config("TTL must be > 0"));
        }
        Ok(())
    }
}

fn default_ttl() -> u32 {
    600
}

/// DNS record type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[default]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name used by the provider API
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Address family this record type holds
    pub fn version(&self) -> IpVersion {
        match self {
            RecordType::A => IpVersion::V4,
            RecordType::Aaaa => IpVersion::V6,
        }
    }

    /// Natural record type for an address family
    pub fn for_version(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            _ => Err(crate::Error::config(format!(
                "Unsupported record type '{s}'. Supported: A, AAAA"
            ))),
        }
    }
}

/// Resolution line: which requester networks a record answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Line {
    #[default]
    Default,
    Telecom,
    Unicom,
    Mobile,
    Oversea,
    Edu,
    Drpeng,
    Btvn,
}

impl Line {
    /// Every supported line, in the provider's documented order
    pub const ALL: [Line; 8] = [
        Line::Default,
        Line::Telecom,
        Line::Unicom,
        Line::Mobile,
        Line::Oversea,
        Line::Edu,
        Line::Drpeng,
        Line::Btvn,
    ];

    /// Wire name used by the provider API
    pub fn as_str(&self) -> &'static str {
        match self {
            Line::Default => "default",
            Line::Telecom => "telecom",
            Line::Unicom => "unicom",
            Line::Mobile => "mobile",
            Line::Oversea => "oversea",
            Line::Edu => "edu",
            Line::Drpeng => "drpeng",
            Line::Btvn => "btvn",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Line {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        Line::ALL
            .into_iter()
            .find(|line| line.as_str() == wanted)
            .ok_or_else(|| {
                crate::Error::config(format!(
                    "Unsupported line '{s}'. Supported: default, telecom, unicom, mobile, oversea, edu, drpeng, btvn"
                ))
            })
    }
}

/// IP version to detect and publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4
    #[default]
    V4,
    /// IPv6
    V6,
}

impl IpVersion {
    /// Pick the version from an "IPv6 requested" flag
    pub fn from_ipv6_flag(ipv6: bool) -> Self {
        if ipv6 { IpVersion::V6 } else { IpVersion::V4 }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

/// IP source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// HTTP echo service returning the caller's address as plain text
    Http {
        /// URL to fetch the IP from
        url: String,
    },

    /// Address of a local network interface
    Interface {
        /// Interface name (e.g., "eth0")
        name: String,
    },
}

impl IpSourceConfig {
    /// Classify a source specifier: HTTP(S) URLs are echo services,
    /// anything else names a local interface
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            IpSourceConfig::Http {
                url: source.to_string(),
            }
        } else {
            IpSourceConfig::Interface {
                name: source.to_string(),
            }
        }
    }

    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpSourceConfig::Http { url } => {
                if url.is_empty() {
                    return Err(crate::Error::config("HTTP IP source URL cannot be empty"));
                }
                Ok(())
            }
            IpSourceConfig::Interface { name } => {
                if name.trim().is_empty() {
                    return Err(crate::Error::config(
                        "IP source interface name cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            url: DEFAULT_IP_SOURCE.to_string(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds to sleep between reconciliation cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Timeout applied to every outbound HTTP request (in seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Update interval must be > 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    100
}
