// # Alibaba Cloud DNS Provider
//
// This crate provides the Alidns provider implementation for the DDNS system.
//
// ## Protocol
//
// Alidns speaks the Alibaba Cloud RPC style: every operation is a GET to the
// endpoint with all parameters in the query string, signed with the account's
// AccessKey secret (see `sign`). Three actions are used:
//
// - `DescribeDomainRecords`: find the existing record
// - `AddDomainRecord`: create it
// - `UpdateDomainRecord`: change its value
//
// Responses are JSON. Failures carry `Code` and `Message` fields, often with
// a 4xx status, so the body is always parsed before deciding the outcome.
//
// ## Behaviour
//
// - One request per call, no retries (the engine owns scheduling)
// - Requests carry a timeout
// - With a bind interface configured, requests leave from its IPv4 address
// - The AccessKey secret never appears in logs or Debug output
//
// ## API Reference
//
// - DescribeDomainRecords: https://help.aliyun.com/document_detail/29776.html
// - AddDomainRecord: https://help.aliyun.com/document_detail/29772.html
// - UpdateDomainRecord: https://help.aliyun.com/document_detail/29774.html

pub mod params;
pub mod sign;

use async_trait::async_trait;
use ddns_core::config::{IpVersion, ProviderConfig};
use ddns_core::traits::{DnsProvider, DomainRecord, RecordQuery, RecordValue};
use ddns_core::{Error, Result};
use ddns_ip_iface::{InterfaceLookup, SystemInterfaces, bind_address};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use params::{
    ADD_ACTION, AddDomainParameter, BaseParameter, DESCRIBE_ACTION, DescribeDomainParameter,
    QueryParameters, UPDATE_ACTION, UpdateDomainParameter,
};

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the full request URL for a parameter set
///
/// The query string is the sorted, encoded parameter list followed by the
/// `Signature` parameter.
pub fn build_url(
    endpoint: &str,
    params: &impl QueryParameters,
    access_key_secret: &str,
) -> Result<String> {
    let map = params.to_query_map();
    let signature = sign::sign_map(&map, access_key_secret)?;

    Ok(format!(
        "{}/?{}&Signature={}",
        endpoint.trim_end_matches('/'),
        sign::canonical_query(&map),
        sign::percent_encode(&signature)
    ))
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    #[serde(rename = "DomainRecords")]
    domain_records: Option<DomainRecords>,
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DomainRecords {
    #[serde(rename = "Record", default)]
    record: Vec<DomainRecord>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(rename = "RecordId")]
    record_id: Option<String>,
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

/// Alibaba Cloud DNS provider
///
/// # Security
///
/// The Debug implementation does NOT expose the AccessKey secret.
pub struct AliyunProvider {
    /// Credentials and endpoint
    config: ProviderConfig,

    /// Interface whose IPv4 address API calls are bound to
    bind_interface: Option<String>,

    /// Address lookup for the bind interface
    lookup: Arc<dyn InterfaceLookup>,

    /// Per-request timeout
    timeout: Duration,
}

impl std::fmt::Debug for AliyunProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliyunProvider")
            .field("access_key_id", &self.config.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.config.endpoint)
            .field("bind_interface", &self.bind_interface)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AliyunProvider {
    /// Create a new Alidns provider
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the credentials are empty or the endpoint
    /// is not an HTTP(S) URL.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            bind_interface: None,
            lookup: Arc::new(SystemInterfaces),
            timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }

    /// Bind API calls to an interface's IPv4 address
    pub fn with_bind_interface(mut self, interface: Option<String>) -> Self {
        self.bind_interface = interface;
        self
    }

    /// Use a custom interface lookup
    pub fn with_lookup(mut self, lookup: Arc<dyn InterfaceLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn base(&self, action: &str) -> BaseParameter {
        BaseParameter::new(&self.config.access_key_id, action)
    }

    fn client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        if let Some(addr) = bind_address(
            self.lookup.as_ref(),
            self.bind_interface.as_deref(),
            IpVersion::V4,
        )? {
            builder = builder.local_address(addr);
        }

        builder
            .build()
            .map_err(|e| Error::network(format!("Failed to build HTTP client: {}", e)))
    }

    /// Sign and send one API call, returning the raw response body
    async fn call(&self, params: &impl QueryParameters) -> Result<String> {
        let url = build_url(&self.config.endpoint, params, &self.config.access_key_secret)?;
        let action = &params.base().action;

        tracing::debug!("Calling Alidns {}", action);

        let response = self
            .client()?
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read {} response: {}", action, e)))?;

        tracing::debug!("Alidns {} answered HTTP {}", action, status);

        Ok(body)
    }
}

fn api_error(code: Option<String>, message: String) -> Error {
    if let Some(code) = code {
        tracing::debug!("Alidns error code: {}", code);
    }
    Error::api(message)
}

/// Interpret a DescribeDomainRecords response body
///
/// Returns the first record whose host record equals `host_record`.
pub fn parse_describe_response(body: &str, host_record: &str) -> Result<Option<DomainRecord>> {
    let response: DescribeResponse = serde_json::from_str(body)?;

    let records = match (response.domain_records, response.message) {
        (Some(records), _) => records.record,
        (None, Some(message)) => return Err(api_error(response.code, message)),
        (None, None) => {
            return Err(Error::parse(
                "Describe response carries neither DomainRecords nor Message",
            ));
        }
    };

    Ok(records.into_iter().find(|r| r.host_record == host_record))
}

/// Interpret an AddDomainRecord / UpdateDomainRecord response body
///
/// Returns the record ID the provider reported, if any.
pub fn parse_write_response(body: &str) -> Result<Option<String>> {
    let response: WriteResponse = serde_json::from_str(body)?;

    if let Some(message) = response.message {
        return Err(api_error(response.code, message));
    }

    Ok(response.record_id)
}

#[async_trait]
impl DnsProvider for AliyunProvider {
    async fn describe_record(&self, query: &RecordQuery) -> Result<Option<DomainRecord>> {
        let params = DescribeDomainParameter::new(self.base(DESCRIBE_ACTION), query);
        let body = self.call(&params).await?;
        let record = parse_describe_response(&body, &query.host_record)?;

        match &record {
            Some(r) => tracing::debug!(
                "Found record {} for {}.{}: {}",
                r.record_id,
                query.host_record,
                query.domain_name,
                r.value
            ),
            None => tracing::debug!(
                "No {} record for {}.{}",
                query.record_type,
                query.host_record,
                query.domain_name
            ),
        }

        Ok(record)
    }

    async fn add_record(&self, domain_name: &str, record: &RecordValue) -> Result<Option<String>> {
        let params = AddDomainParameter::new(self.base(ADD_ACTION), domain_name, record);
        let body = self.call(&params).await?;
        parse_write_response(&body)
    }

    async fn update_record(&self, record_id: &str, record: &RecordValue) -> Result<()> {
        let params = UpdateDomainParameter::new(self.base(UPDATE_ACTION), record_id, record);
        let body = self.call(&params).await?;
        parse_write_response(&body).map(|_| ())
    }

    fn provider_name(&self) -> &'static str {
        "aliyun"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_describe() -> DescribeDomainParameter {
        let base = BaseParameter::with_clock(
            "LTAI-test",
            DESCRIBE_ACTION,
            "2024-01-02T03:04:05Z",
            "0123456789abcdef0123456789abcdef",
        );
        let query = RecordQuery {
            domain_name: "example.com".to_string(),
            host_record: "home".to_string(),
            record_type: ddns_core::config::RecordType::A,
        };
        DescribeDomainParameter::new(base, &query)
    }

    #[test]
    fn url_carries_sorted_params_and_signature() {
        let url = build_url("https://alidns.aliyuncs.com/", &fixed_describe(), "secret").unwrap();

        assert_eq!(
            url,
            "https://alidns.aliyuncs.com/?AccessKeyId=LTAI-test&Action=DescribeDomainRecords\
             &DomainName=example.com&Format=JSON&RRKeyWord=home&SignatureMethod=HMAC-SHA1\
             &SignatureNonce=0123456789abcdef0123456789abcdef&SignatureVersion=1.0\
             &Timestamp=2024-01-02T03%3A04%3A05Z&Type=A&Version=2015-01-09\
             &Signature=15ze0iknnPN23zKantLC6o985sk%3D"
        );
    }

    #[test]
    fn endpoint_without_trailing_slash_is_accepted() {
        let with = build_url("http://127.0.0.1:8080/", &fixed_describe(), "secret").unwrap();
        let without = build_url("http://127.0.0.1:8080", &fixed_describe(), "secret").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn empty_record_list_is_none() {
        let body = r#"{"TotalCount":0,"DomainRecords":{"Record":[]},"RequestId":"r"}"#;
        assert_eq!(parse_describe_response(body, "home").unwrap(), None);
    }

    #[test]
    fn message_without_records_is_api_error() {
        let body = r#"{"Code":"InvalidDomainName.NoExist","Message":"The specified domain name does not exist."}"#;
        match parse_describe_response(body, "home") {
            Err(Error::Api { message }) => {
                assert_eq!(message, "The specified domain name does not exist.")
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn unexpected_shape_is_parse_error() {
        assert!(matches!(
            parse_describe_response(r#"{"RequestId":"r"}"#, "home"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            parse_describe_response("<html>", "home"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn fuzzy_matches_are_skipped() {
        let body = r#"{"DomainRecords":{"Record":[
            {"RecordId":"1","RR":"home2","Type":"A","Value":"9.9.9.9"},
            {"RecordId":"2","RR":"home","Type":"A","Value":"1.2.3.4"}
        ]}}"#;
        let record = parse_describe_response(body, "home").unwrap().unwrap();
        assert_eq!(record.record_id, "2");
    }

    #[test]
    fn write_message_is_api_error() {
        let body = r#"{"Code":"DomainRecordDuplicate","Message":"The DNS record already exists."}"#;
        assert!(matches!(parse_write_response(body), Err(Error::Api { .. })));
    }

    #[test]
    fn write_returns_record_id() {
        let body = r#"{"RequestId":"r","RecordId":"9876543210"}"#;
        assert_eq!(
            parse_write_response(body).unwrap(),
            Some("9876543210".to_string())
        );
    }

    #[test]
    fn secret_not_exposed_in_debug() {
        let provider =
            AliyunProvider::new(ProviderConfig::new("LTAI-visible", "secret_value_12345")).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("AliyunProvider"));
        assert!(debug_str.contains("LTAI-visible"));
        assert!(!debug_str.contains("secret_value_12345"));
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(AliyunProvider::new(ProviderConfig::new("", "secret")).is_err());
        assert!(AliyunProvider::new(ProviderConfig::new("id", "")).is_err());
    }
}
