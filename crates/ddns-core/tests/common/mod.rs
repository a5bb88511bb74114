//! Test doubles and common utilities for engine contract tests
//!
//! The doubles are cheap handles: cloning one shares its counters and
//! scripted state, so a test can keep a clone while the engine owns another.

#![allow(dead_code)]

use ddns_core::config::{DdnsConfig, IpVersion};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, DomainRecord, IpSource, RecordQuery, RecordValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An IpSource whose answer is set by the test
#[derive(Clone)]
pub struct ScriptedIpSource {
    /// Ok(ip) or Err(message) for the next current() calls
    answer: Arc<Mutex<std::result::Result<String, String>>>,
    /// Call counter for current()
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            answer: Arc::new(Mutex::new(Ok(ip.to_string()))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make current() report a different address from now on
    pub fn set_ip(&self, ip: &str) {
        *self.answer.lock().unwrap() = Ok(ip.to_string());
    }

    /// Make current() fail with a network error from now on
    pub fn fail_with(&self, message: &str) {
        *self.answer.lock().unwrap() = Err(message.to_string());
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.answer.lock().unwrap().clone().map_err(Error::network)
    }

    fn version(&self) -> IpVersion {
        IpVersion::V4
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A DnsProvider that keeps one record in memory and records every call
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    /// The record describe_record() reports
    record: Arc<Mutex<Option<DomainRecord>>>,
    /// Scripted API errors per operation
    describe_error: Arc<Mutex<Option<String>>>,
    add_error: Arc<Mutex<Option<String>>>,
    update_error: Arc<Mutex<Option<String>>>,
    /// How long describe_record() takes to answer
    describe_delay: Arc<Mutex<Option<Duration>>>,
    /// Call log
    describe_calls: Arc<Mutex<Vec<RecordQuery>>>,
    add_calls: Arc<Mutex<Vec<(String, RecordValue)>>>,
    update_calls: Arc<Mutex<Vec<(String, RecordValue)>>>,
}

impl MockDnsProvider {
    /// A provider with no record yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// A provider that already holds `home.example.com` with `value`
    pub fn with_record(value: &str) -> Self {
        let provider = Self::default();
        *provider.record.lock().unwrap() = Some(record("rec-1", "home", value));
        provider
    }

    pub fn fail_describe(&self, message: &str) {
        *self.describe_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_add(&self, message: &str) {
        *self.add_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_update(&self, message: &str) {
        *self.update_error.lock().unwrap() = Some(message.to_string());
    }

    /// Make describe_record() take `delay` of (virtual) time
    pub fn slow_describe(&self, delay: Duration) {
        *self.describe_delay.lock().unwrap() = Some(delay);
    }

    pub fn current_record(&self) -> Option<DomainRecord> {
        self.record.lock().unwrap().clone()
    }

    pub fn describe_calls(&self) -> Vec<RecordQuery> {
        self.describe_calls.lock().unwrap().clone()
    }

    pub fn add_calls(&self) -> Vec<(String, RecordValue)> {
        self.add_calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> Vec<(String, RecordValue)> {
        self.update_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn describe_record(&self, query: &RecordQuery) -> Result<Option<DomainRecord>> {
        self.describe_calls.lock().unwrap().push(query.clone());
        let delay = *self.describe_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.describe_error.lock().unwrap().clone() {
            return Err(Error::api(message));
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn add_record(&self, domain_name: &str, value: &RecordValue) -> Result<Option<String>> {
        self.add_calls
            .lock()
            .unwrap()
            .push((domain_name.to_string(), value.clone()));
        if let Some(message) = self.add_error.lock().unwrap().clone() {
            return Err(Error::api(message));
        }
        *self.record.lock().unwrap() = Some(record("rec-new", &value.host_record, &value.value));
        Ok(Some("rec-new".to_string()))
    }

    async fn update_record(&self, record_id: &str, value: &RecordValue) -> Result<()> {
        self.update_calls
            .lock()
            .unwrap()
            .push((record_id.to_string(), value.clone()));
        if let Some(message) = self.update_error.lock().unwrap().clone() {
            return Err(Error::api(message));
        }
        if let Some(existing) = self.record.lock().unwrap().as_mut() {
            existing.value = value.value.clone();
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build a DomainRecord the way the provider would report it
pub fn record(record_id: &str, host_record: &str, value: &str) -> DomainRecord {
    DomainRecord {
        record_id: record_id.to_string(),
        host_record: host_record.to_string(),
        line: "default".to_string(),
        status: "ENABLE".to_string(),
        locked: false,
        record_type: "A".to_string(),
        domain_name: "example.com".to_string(),
        value: value.to_string(),
        ttl: 600,
        weight: 1,
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(domain: &str) -> DdnsConfig {
    DdnsConfig::new("test-access-key", "test-secret", domain)
}
