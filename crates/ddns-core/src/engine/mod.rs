//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Detecting the current IP via IpSource
//! - Looking up the existing record via DnsProvider
//! - Creating the record, updating it, or leaving it alone
//! - Sleeping for the configured interval and doing it again
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   current()   ┌──────────────┐   describe / add / update   ┌─────────────┐
//! │  IpSource   │ ────────────▶ │  DdnsEngine  │ ──────────────────────────▶ │ DnsProvider │
//! └─────────────┘               └──────────────┘                             └─────────────┘
//!                                       │
//!                                       ▼
//!                                ┌─────────────┐
//!                                │   Events    │
//!                                │  (notify)   │
//!                                └─────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Detect the current IP
//! 2. Describe the record
//! 3. No record → add it
//! 4. Same value → nothing to do
//! 5. Different value → update it
//!
//! A failure at any step ends the cycle. The error is logged and the engine
//! sleeps until the next interval; nothing is retried early and nothing is
//! carried over into the next cycle.

use std::future::Future;
use std::time::Duration;

use crate::config::{DdnsConfig, RecordConfig};
use crate::domain::{DomainParts, split_domain};
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource, RecordQuery, RecordValue};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// What a single reconciliation cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No record existed, one was created
    Created {
        /// ID of the new record, if the provider reported it
        record_id: Option<String>,
        /// The published value
        value: String,
    },
    /// The record held a stale value and was updated
    Updated {
        /// ID of the updated record
        record_id: String,
        /// The value before the update
        previous: String,
        /// The published value
        value: String,
    },
    /// The record already held the detected value
    Unchanged {
        /// The current value
        value: String,
    },
}

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started { domain: String, interval_secs: u64 },

    /// Current IP detected
    IpDetected { ip: String },

    /// Record created
    RecordCreated { domain: String, value: String },

    /// Record updated
    RecordUpdated {
        domain: String,
        previous: String,
        value: String,
    },

    /// Record already up to date
    UpdateSkipped { domain: String, current: String },

    /// A cycle ended with an error
    CycleFailed { error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`] or [`DdnsEngine::run_until()`]
/// 3. The engine reconciles once per interval until shutdown is signalled
///
/// ## Threading
///
/// One cycle runs at a time, start to finish; there are never two API calls
/// in flight. Shutdown is only observed while sleeping between cycles.
pub struct DdnsEngine {
    /// IP source for detecting the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for the record operations
    provider: Box<dyn DnsProvider>,

    /// The managed record
    record: RecordConfig,

    /// `record.domain` split into host record and top domain
    parts: DomainParts,

    /// Sleep between cycles
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// The configuration is validated here, so a misconfigured engine never
    /// starts.
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        if ip_source.version() != config.version {
            return Err(crate::Error::config(format!(
                "IP source reports {} but {} was configured",
                ip_source.version(),
                config.version
            )));
        }

        let parts = split_domain(&config.record.domain)?;
        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ip_source,
            provider,
            record: config.record,
            parts,
            interval: Duration::from_secs(config.engine.interval_secs),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Time slept between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until Ctrl-C
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` resolves
    ///
    /// The first cycle starts immediately. `shutdown` is polled only while
    /// the engine sleeps, so a cycle in progress always finishes.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Managing {} record {} (interval: {:?}, provider: {}, source: {} {})",
            self.record.record_type,
            self.record.domain,
            self.interval,
            self.provider.provider_name(),
            self.ip_source.source_name(),
            self.ip_source.version()
        );
        self.emit_event(EngineEvent::Started {
            domain: self.record.domain.clone(),
            interval_secs: self.interval.as_secs(),
        });

        loop {
            if let Err(e) = self.run_cycle().await {
                error!("Reconciliation of {} failed: {}", self.record.domain, e);
                self.emit_event(EngineEvent::CycleFailed {
                    error: e.to_string(),
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        info!("Engine stopped");
    }

    /// Run until the oneshot fires (or its sender is dropped)
    pub async fn run_with_shutdown(&self, shutdown_rx: oneshot::Receiver<()>) {
        self.run_until(async {
            let _ = shutdown_rx.await;
        })
        .await
    }

    /// Perform one detect → describe → add/update cycle
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let ip = self.ip_source.current().await?;
        info!("Detected IP address: {}", ip);
        self.emit_event(EngineEvent::IpDetected { ip: ip.clone() });

        let query = RecordQuery {
            domain_name: self.parts.top_domain.clone(),
            host_record: self.parts.host_record.clone(),
            record_type: self.record.record_type,
        };
        debug!(
            "Looking up {} record {} in {}",
            query.record_type, query.host_record, query.domain_name
        );
        let existing = self.provider.describe_record(&query).await?;

        let desired = RecordValue {
            host_record: self.parts.host_record.clone(),
            record_type: self.record.record_type,
            value: ip.clone(),
            line: self.record.line,
            ttl: self.record.ttl,
        };

        let Some(record) = existing else {
            let record_id = self
                .provider
                .add_record(&self.parts.top_domain, &desired)
                .await?;
            info!("Added domain {} with value {}", self.record.domain, ip);
            self.emit_event(EngineEvent::RecordCreated {
                domain: self.record.domain.clone(),
                value: ip.clone(),
            });
            return Ok(CycleOutcome::Created {
                record_id,
                value: ip,
            });
        };

        if record.value == ip {
            debug!("Record {} already has value {}", self.record.domain, ip);
            self.emit_event(EngineEvent::UpdateSkipped {
                domain: self.record.domain.clone(),
                current: ip.clone(),
            });
            return Ok(CycleOutcome::Unchanged { value: ip });
        }

        self.provider
            .update_record(&record.record_id, &desired)
            .await?;
        info!(
            "Updated domain {} with value {} (was: {})",
            self.record.domain, ip, record.value
        );
        self.emit_event(EngineEvent::RecordUpdated {
            domain: self.record.domain.clone(),
            previous: record.value.clone(),
            value: ip.clone(),
        });

        Ok(CycleOutcome::Updated {
            record_id: record.record_id,
            previous: record.value,
            value: ip,
        })
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
