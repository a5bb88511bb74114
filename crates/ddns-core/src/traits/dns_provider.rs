// # DNS Provider Trait
//
// Defines the three record operations the reconciliation loop needs:
// describe, add and update.
//
// ## Implementations
//
// - Alibaba Cloud DNS: `ddns-provider-aliyun` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordQuery};
// use ddns_core::config::RecordType;
//
// let query = RecordQuery {
//     domain_name: "example.com".to_string(),
//     host_record: "home".to_string(),
//     record_type: RecordType::A,
// };
// match provider.describe_record(&query).await? {
//     Some(record) => println!("{} -> {}", record.record_id, record.value),
//     None => println!("no record yet"),
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Line, RecordType};

/// A DNS record as reported by the provider
///
/// Field names follow the provider's JSON. This is a read-only snapshot and
/// is never cached across reconciliation cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Record ID
    #[serde(rename = "RecordId")]
    pub record_id: String,

    /// Host record (RR)
    #[serde(rename = "RR")]
    pub host_record: String,

    /// Resolution line
    #[serde(rename = "Line", default)]
    pub line: String,

    /// Record status ("ENABLE" / "DISABLE")
    #[serde(rename = "Status", default)]
    pub status: String,

    /// Whether the record is locked against changes
    #[serde(rename = "Locked", default)]
    pub locked: bool,

    /// Record type
    #[serde(rename = "Type")]
    pub record_type: String,

    /// Top domain the record belongs to
    #[serde(rename = "DomainName", default)]
    pub domain_name: String,

    /// Record value
    #[serde(rename = "Value")]
    pub value: String,

    /// Time-to-live in seconds
    #[serde(rename = "TTL", default)]
    pub ttl: u32,

    /// Load-balancing weight
    #[serde(rename = "Weight", default)]
    pub weight: u32,
}

/// Parameters of a describe lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Top domain (e.g., "example.com")
    pub domain_name: String,
    /// Host record to look for (e.g., "home")
    pub host_record: String,
    /// Record type to look for
    pub record_type: RecordType,
}

/// The desired contents of a record, for add and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordValue {
    /// Host record (e.g., "home")
    pub host_record: String,
    /// Record type
    pub record_type: RecordType,
    /// Record value (the detected IP)
    pub value: String,
    /// Resolution line
    pub line: Line,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// Trait for DNS provider implementations
///
/// Every method performs a single API exchange and reports what the
/// provider said. Implementations do not retry, do not cache records, and
/// do not decide whether a change is needed; the engine owns all of that.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up the existing record
    ///
    /// # Returns
    ///
    /// - `Ok(Some(DomainRecord))`: The first record matching the query
    /// - `Ok(None)`: No such record exists yet
    /// - `Err(Error::Api)`: The provider reported an error (e.g., unknown domain)
    async fn describe_record(
        &self,
        query: &RecordQuery,
    ) -> Result<Option<DomainRecord>, crate::Error>;

    /// Create a new record under `domain_name`
    ///
    /// # Returns
    ///
    /// The new record ID, if the provider reported one.
    async fn add_record(
        &self,
        domain_name: &str,
        record: &RecordValue,
    ) -> Result<Option<String>, crate::Error>;

    /// Replace the contents of an existing record
    async fn update_record(
        &self,
        record_id: &str,
        record: &RecordValue,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
