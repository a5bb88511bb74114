// # ddns-core
//
// Core library for the Alibaba Cloud DNS dynamic-DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpSource**: Trait for detecting the current IP address
// - **DnsProvider**: Trait for describing, adding and updating DNS records
// - **DdnsEngine**: Fixed-interval reconciliation loop driving the two
// - **DdnsConfig**: Explicit configuration value passed to the engine
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Stateless Cycles**: Every cycle starts from fresh detection and lookup
// 3. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod config;
pub mod domain;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider};
pub use engine::{CycleOutcome, DdnsEngine, EngineEvent};
pub use config::{DdnsConfig, IpSourceConfig, IpVersion, Line, ProviderConfig, RecordType};
pub use error::{Error, Result};
