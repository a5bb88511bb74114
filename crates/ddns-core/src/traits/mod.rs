//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Detect the current IP address
//! - [`DnsProvider`]: Describe, add and update DNS records via the provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DomainRecord, RecordQuery, RecordValue};
