// # Interface IP Source
//
// This crate reads addresses from local network interfaces. It serves two
// purposes:
//
// - `InterfaceIpSource`: an `IpSource` that publishes an interface's own
//   address (for hosts that hold their public address directly, e.g. PPPoE)
// - `bind_address`: resolves the local address that outbound HTTP requests
//   are bound to on multi-homed hosts
//
// ## Address Selection
//
// The first address of the requested family wins. For IPv6, link-local
// addresses (fe80::/10) are only used when the interface has nothing else,
// since they are neither publishable nor routable as a source address.
//
// ## Platform Support
//
// Enumeration uses `if-addrs`, which wraps getifaddrs(3) on Unix and
// GetAdaptersAddresses on Windows.

use async_trait::async_trait;
use ddns_core::config::IpVersion;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};
use std::net::IpAddr;
use std::sync::Arc;

/// Lists the addresses assigned to a named interface
pub trait InterfaceLookup: Send + Sync {
    /// Get every address on `interface`, in system order
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<IpAddr>)`: The interface's addresses
    /// - `Err(Error::Network)`: Enumeration failed or the interface does not exist
    fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>>;
}

/// Interface lookup backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceLookup for SystemInterfaces {
    fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>> {
        let interfaces = if_addrs::get_if_addrs()
            .map_err(|e| Error::network(format!("Failed to enumerate network interfaces: {}", e)))?;

        let addrs: Vec<IpAddr> = interfaces
            .into_iter()
            .filter(|iface| iface.name == interface)
            .map(|iface| iface.ip())
            .collect();

        if addrs.is_empty() {
            return Err(Error::network(format!(
                "Network interface not found: {}",
                interface
            )));
        }

        Ok(addrs)
    }
}

fn is_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(_) => false,
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

fn matches_version(ip: &IpAddr, version: IpVersion) -> bool {
    match version {
        IpVersion::V4 => ip.is_ipv4(),
        IpVersion::V6 => ip.is_ipv6(),
    }
}

/// Pick the address of the requested family from an interface's list
pub fn select_address(addrs: &[IpAddr], version: IpVersion) -> Option<IpAddr> {
    let mut candidates = addrs.iter().filter(|ip| matches_version(ip, version));
    let first = candidates.next().copied();

    if first.as_ref().is_some_and(is_link_local) {
        return candidates
            .find(|ip| !is_link_local(ip))
            .copied()
            .or(first);
    }

    first
}

/// Resolve the address of `interface` for the requested family
///
/// # Returns
///
/// - `Ok(IpAddr)`: The selected address
/// - `Err(Error::Network)`: The interface lookup failed
/// - `Err(Error::NotFound)`: The interface has no address of that family
pub fn interface_address(
    lookup: &dyn InterfaceLookup,
    interface: &str,
    version: IpVersion,
) -> Result<IpAddr> {
    let addrs = lookup.addresses(interface)?;
    select_address(&addrs, version).ok_or_else(|| {
        Error::not_found(format!("No {} address on interface {}", version, interface))
    })
}

/// Resolve the local address outbound requests should be bound to
///
/// Returns `Ok(None)` when no bind interface is configured.
pub fn bind_address(
    lookup: &dyn InterfaceLookup,
    interface: Option<&str>,
    version: IpVersion,
) -> Result<Option<IpAddr>> {
    match interface {
        Some(name) => {
            let addr = interface_address(lookup, name, version)?;
            tracing::debug!("Binding outbound traffic to {} ({})", addr, name);
            Ok(Some(addr))
        }
        None => Ok(None),
    }
}

/// IP source that reports the address of a local interface
pub struct InterfaceIpSource {
    /// Interface to read (e.g., "ppp0")
    interface: String,

    /// IP version to report
    version: IpVersion,

    /// Address lookup
    lookup: Arc<dyn InterfaceLookup>,
}

impl InterfaceIpSource {
    /// Create a source reading `interface` from the operating system
    pub fn new(interface: impl Into<String>, version: IpVersion) -> Self {
        Self::with_lookup(interface, version, Arc::new(SystemInterfaces))
    }

    /// Create a source with a custom address lookup
    pub fn with_lookup(
        interface: impl Into<String>,
        version: IpVersion,
        lookup: Arc<dyn InterfaceLookup>,
    ) -> Self {
        Self {
            interface: interface.into(),
            version,
            lookup,
        }
    }
}

#[async_trait]
impl IpSource for InterfaceIpSource {
    async fn current(&self) -> Result<String> {
        let addr = interface_address(self.lookup.as_ref(), &self.interface, self.version)?;
        Ok(addr.to_string())
    }

    fn version(&self) -> IpVersion {
        self.version
    }

    fn source_name(&self) -> &'static str {
        "interface"
    }
}
