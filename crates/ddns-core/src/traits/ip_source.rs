// # IP Source Trait
//
// Defines the interface for detecting the host's current IP address.
//
// ## Implementations
//
// - Echo service over HTTP: `ddns-ip-http` crate
// - Local interface address: `ddns-ip-iface` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> ddns_core::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("Current IP: {current_ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::config::IpVersion;

/// Trait for IP source implementations
///
/// A source is asked once per reconciliation cycle. It must not cache
/// results across calls or schedule anything on its own; the engine owns
/// the polling interval.
///
/// The returned string is published as the record value as-is, so sources
/// return the textual address without decoration (no trailing newline).
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current IP address in textual form
    /// - `Err(Error::Network)`: The lookup or request failed
    /// - `Err(Error::NotFound)`: No address of the requested family exists
    async fn current(&self) -> Result<String, crate::Error>;

    /// The IP version this source reports
    fn version(&self) -> IpVersion;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}
