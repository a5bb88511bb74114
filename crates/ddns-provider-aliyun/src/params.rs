//! Request parameters for the Alidns RPC API
//!
//! Every call carries the common [`BaseParameter`] fields plus a few
//! action-specific ones. Each parameter type flattens itself into a single
//! name → value map through [`QueryParameters`]; the map is what gets signed
//! and what ends up in the request URL.

use std::collections::BTreeMap;

use ddns_core::traits::{RecordQuery, RecordValue};

/// Response format requested from the API
pub const FORMAT: &str = "JSON";

/// Alidns API version
pub const API_VERSION: &str = "2015-01-09";

/// Signature algorithm name
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Signature scheme version
pub const SIGNATURE_VERSION: &str = "1.0";

/// Action names
pub const DESCRIBE_ACTION: &str = "DescribeDomainRecords";
pub const ADD_ACTION: &str = "AddDomainRecord";
pub const UPDATE_ACTION: &str = "UpdateDomainRecord";

/// Query parameters, flattened and sorted by name
///
/// `BTreeMap<&str, _>` orders keys byte-wise, which is the order the
/// server uses when it recomputes the signature.
pub type QueryMap = BTreeMap<&'static str, String>;

/// A parameter set that can be signed and sent
pub trait QueryParameters {
    /// The common fields of this call
    fn base(&self) -> &BaseParameter;

    /// Flatten every field, common and action-specific, into one map
    fn to_query_map(&self) -> QueryMap;
}

/// Fields common to every API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseParameter {
    pub format: String,
    pub version: String,
    pub access_key_id: String,
    /// UTC, second precision: `YYYY-MM-DDTHH:MM:SSZ`
    pub timestamp: String,
    pub action: String,
    pub signature_method: String,
    /// Single-use random value, a UUID v4 without hyphens
    pub signature_nonce: String,
    pub signature_version: String,
}

impl BaseParameter {
    /// Build the common fields for `action`, stamped with the current time
    /// and a fresh nonce
    pub fn new(access_key_id: &str, action: &str) -> Self {
        Self::with_clock(access_key_id, action, current_timestamp(), new_nonce())
    }

    /// Build the common fields with a fixed timestamp and nonce
    pub fn with_clock(
        access_key_id: &str,
        action: &str,
        timestamp: impl Into<String>,
        signature_nonce: impl Into<String>,
    ) -> Self {
        Self {
            format: FORMAT.to_string(),
            version: API_VERSION.to_string(),
            access_key_id: access_key_id.to_string(),
            timestamp: timestamp.into(),
            action: action.to_string(),
            signature_method: SIGNATURE_METHOD.to_string(),
            signature_nonce: signature_nonce.into(),
            signature_version: SIGNATURE_VERSION.to_string(),
        }
    }

    fn extend_into(&self, map: &mut QueryMap) {
        map.insert("Format", self.format.clone());
        map.insert("Version", self.version.clone());
        map.insert("AccessKeyId", self.access_key_id.clone());
        map.insert("Timestamp", self.timestamp.clone());
        map.insert("Action", self.action.clone());
        map.insert("SignatureMethod", self.signature_method.clone());
        map.insert("SignatureNonce", self.signature_nonce.clone());
        map.insert("SignatureVersion", self.signature_version.clone());
    }
}

/// Current UTC time in the API's timestamp format
pub fn current_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Fresh signature nonce
pub fn new_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// DescribeDomainRecords parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeDomainParameter {
    pub base: BaseParameter,
    pub record_type: String,
    pub domain_name: String,
    /// Host record keyword; the server matches it fuzzily
    pub rr_keyword: String,
}

impl DescribeDomainParameter {
    pub fn new(base: BaseParameter, query: &RecordQuery) -> Self {
        Self {
            base,
            record_type: query.record_type.as_str().to_string(),
            domain_name: query.domain_name.clone(),
            rr_keyword: query.host_record.clone(),
        }
    }
}

impl QueryParameters for DescribeDomainParameter {
    fn base(&self) -> &BaseParameter {
        &self.base
    }

    fn to_query_map(&self) -> QueryMap {
        let mut map = QueryMap::new();
        self.base.extend_into(&mut map);
        map.insert("Type", self.record_type.clone());
        map.insert("DomainName", self.domain_name.clone());
        map.insert("RRKeyWord", self.rr_keyword.clone());
        map
    }
}

/// AddDomainRecord parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDomainParameter {
    pub base: BaseParameter,
    pub record_type: String,
    pub domain_name: String,
    pub rr: String,
    pub value: String,
    pub line: String,
    pub ttl: u32,
}

impl AddDomainParameter {
    pub fn new(base: BaseParameter, domain_name: &str, record: &RecordValue) -> Self {
        Self {
            base,
            record_type: record.record_type.as_str().to_string(),
            domain_name: domain_name.to_string(),
            rr: record.host_record.clone(),
            value: record.value.clone(),
            line: record.line.as_str().to_string(),
            ttl: record.ttl,
        }
    }
}

impl QueryParameters for AddDomainParameter {
    fn base(&self) -> &BaseParameter {
        &self.base
    }

    fn to_query_map(&self) -> QueryMap {
        let mut map = QueryMap::new();
        self.base.extend_into(&mut map);
        map.insert("Type", self.record_type.clone());
        map.insert("DomainName", self.domain_name.clone());
        map.insert("RR", self.rr.clone());
        map.insert("Value", self.value.clone());
        map.insert("Line", self.line.clone());
        map.insert("TTL", self.ttl.to_string());
        map
    }
}

/// UpdateDomainRecord parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDomainParameter {
    pub base: BaseParameter,
    pub record_type: String,
    pub rr: String,
    pub record_id: String,
    pub value: String,
    pub line: String,
    pub ttl: u32,
}

impl UpdateDomainParameter {
    pub fn new(base: BaseParameter, record_id: &str, record: &RecordValue) -> Self {
        Self {
            base,
            record_type: record.record_type.as_str().to_string(),
            rr: record.host_record.clone(),
            record_id: record_id.to_string(),
            value: record.value.clone(),
            line: record.line.as_str().to_string(),
            ttl: record.ttl,
        }
    }
}

impl QueryParameters for UpdateDomainParameter {
    fn base(&self) -> &BaseParameter {
        &self.base
    }

    fn to_query_map(&self) -> QueryMap {
        let mut map = QueryMap::new();
        self.base.extend_into(&mut map);
        map.insert("Type", self.record_type.clone());
        map.insert("RR", self.rr.clone());
        map.insert("RecordId", self.record_id.clone());
        map.insert("Value", self.value.clone());
        map.insert("Line", self.line.clone());
        map.insert("TTL", self.ttl.to_string());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::config::{Line, RecordType};

    fn fixed_base(action: &str) -> BaseParameter {
        BaseParameter::with_clock(
            "LTAI-test",
            action,
            "2024-01-02T03:04:05Z",
            "0123456789abcdef0123456789abcdef",
        )
    }

    fn record_value() -> RecordValue {
        RecordValue {
            host_record: "home".to_string(),
            record_type: RecordType::A,
            value: "1.2.3.4".to_string(),
            line: Line::Telecom,
            ttl: 600,
        }
    }

    #[test]
    fn base_fields_carry_fixed_values() {
        let base = BaseParameter::new("LTAI-test", DESCRIBE_ACTION);
        assert_eq!(base.format, "JSON");
        assert_eq!(base.version, "2015-01-09");
        assert_eq!(base.signature_method, "HMAC-SHA1");
        assert_eq!(base.signature_version, "1.0");
        assert_eq!(base.action, "DescribeDomainRecords");
    }

    #[test]
    fn nonce_is_hyphenless_and_fresh() {
        let a = new_nonce();
        let b = new_nonce();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn timestamp_has_second_precision() {
        let ts = current_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%SZ").is_ok());
        assert_eq!(ts.len(), "2024-01-02T03:04:05Z".len());
    }

    #[test]
    fn describe_flattens_base_and_action_fields() {
        let query = RecordQuery {
            domain_name: "example.com".to_string(),
            host_record: "home".to_string(),
            record_type: RecordType::Aaaa,
        };
        let map = DescribeDomainParameter::new(fixed_base(DESCRIBE_ACTION), &query).to_query_map();

        assert_eq!(map.len(), 11);
        assert_eq!(map["Action"], "DescribeDomainRecords");
        assert_eq!(map["AccessKeyId"], "LTAI-test");
        assert_eq!(map["DomainName"], "example.com");
        assert_eq!(map["RRKeyWord"], "home");
        assert_eq!(map["Type"], "AAAA");
    }

    #[test]
    fn add_and_update_carry_line_and_ttl() {
        let add = AddDomainParameter::new(fixed_base(ADD_ACTION), "example.com", &record_value())
            .to_query_map();
        assert_eq!(add["RR"], "home");
        assert_eq!(add["Value"], "1.2.3.4");
        assert_eq!(add["Line"], "telecom");
        assert_eq!(add["TTL"], "600");
        assert!(!add.contains_key("RecordId"));

        let update = UpdateDomainParameter::new(fixed_base(UPDATE_ACTION), "rec-42", &record_value())
            .to_query_map();
        assert_eq!(update["RecordId"], "rec-42");
        assert_eq!(update["Action"], "UpdateDomainRecord");
        assert!(!update.contains_key("DomainName"));
    }

    #[test]
    fn keys_sort_byte_wise() {
        let map = UpdateDomainParameter::new(fixed_base(UPDATE_ACTION), "rec-42", &record_value())
            .to_query_map();
        let keys: Vec<&str> = map.keys().copied().collect();

        let rr = keys.iter().position(|k| *k == "RR").unwrap();
        let record_id = keys.iter().position(|k| *k == "RecordId").unwrap();
        let ttl = keys.iter().position(|k| *k == "TTL").unwrap();
        let timestamp = keys.iter().position(|k| *k == "Timestamp").unwrap();
        let type_ = keys.iter().position(|k| *k == "Type").unwrap();

        // Uppercase sorts before lowercase
        assert!(rr < record_id);
        assert!(ttl < timestamp);
        assert!(timestamp < type_);
    }
}
