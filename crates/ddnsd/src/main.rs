// # ddnsd - DDNS Daemon
//
// Keeps one Alibaba Cloud DNS record pointed at this host's current address.
//
// This daemon is a thin integration layer. It:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Builds the IP source and the Alidns provider
// 4. Runs the DDNS engine until SIGTERM/SIGINT
//
// All reconciliation logic lives in ddns-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Required
// - `DDNS_ACCESS_KEY_ID`: AccessKey ID
// - `DDNS_ACCESS_KEY_SECRET`: AccessKey secret
// - `DDNS_DOMAIN`: Fully-qualified domain name to manage (e.g., home.example.com)
//
// ### Record
// - `DDNS_RECORD_TYPE`: A or AAAA (default: A, or AAAA with DDNS_IPV6)
// - `DDNS_LINE`: Resolution line (default: default)
// - `DDNS_TTL`: TTL in seconds (default: 600)
//
// ### IP Detection
// - `DDNS_IP_SOURCE`: Echo-service URL or interface name (default: https://api64.ipify.org/)
// - `DDNS_BIND_INTERFACE`: Interface outbound requests are bound to (optional)
// - `DDNS_IPV6`: Detect and publish an IPv6 address (default: false)
//
// ### Engine
// - `DDNS_INTERVAL_SECS`: Seconds between checks (default: 300)
// - `DDNS_REQUEST_TIMEOUT_SECS`: HTTP request timeout (default: 30)
// - `DDNS_API_ENDPOINT`: Alidns endpoint (default: https://alidns.aliyuncs.com/)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
//
// ## Example
//
// ```bash
// export DDNS_ACCESS_KEY_ID=LTAI...
// export DDNS_ACCESS_KEY_SECRET=...
// export DDNS_DOMAIN=home.example.com
// export DDNS_IP_SOURCE=ppp0
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::config::{
    DEFAULT_API_ENDPOINT, DEFAULT_IP_SOURCE, DdnsConfig, IpSourceConfig, IpVersion, Line,
    RecordType,
};
use ddns_core::traits::IpSource;
use ddns_core::{DdnsEngine, EngineEvent};
use ddns_ip_http::HttpIpSource;
use ddns_ip_iface::InterfaceIpSource;
use ddns_provider_aliyun::AliyunProvider;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    ddns: DdnsConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `var`, which returns a variable's value
    ///
    /// Empty values count as unset.
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            var(key).with_context(|| format!("{key} is required. Set it via: export {key}=..."))
        };

        let access_key_id = required("DDNS_ACCESS_KEY_ID")?;
        let access_key_secret = required("DDNS_ACCESS_KEY_SECRET")?;
        let domain = required("DDNS_DOMAIN")?;

        let ipv6 = match var("DDNS_IPV6") {
            Some(value) => parse_bool("DDNS_IPV6", &value)?,
            None => false,
        };
        let version = IpVersion::from_ipv6_flag(ipv6);

        let mut ddns = DdnsConfig::new(access_key_id, access_key_secret, domain);
        ddns.version = version;
        ddns.record.record_type = match var("DDNS_RECORD_TYPE") {
            Some(value) => parse_value("DDNS_RECORD_TYPE", &value)?,
            None => RecordType::for_version(version),
        };
        if let Some(value) = var("DDNS_LINE") {
            ddns.record.line = parse_value::<Line>("DDNS_LINE", &value)?;
        }
        if let Some(value) = var("DDNS_TTL") {
            ddns.record.ttl = parse_value("DDNS_TTL", &value)?;
        }

        ddns.ip_source =
            IpSourceConfig::parse(&var("DDNS_IP_SOURCE").unwrap_or_else(|| DEFAULT_IP_SOURCE.to_string()));
        ddns.bind_interface = var("DDNS_BIND_INTERFACE");

        if let Some(value) = var("DDNS_INTERVAL_SECS") {
            ddns.engine.interval_secs = parse_value("DDNS_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = var("DDNS_REQUEST_TIMEOUT_SECS") {
            ddns.engine.request_timeout_secs = parse_value("DDNS_REQUEST_TIMEOUT_SECS", &value)?;
        }
        ddns.provider.endpoint =
            var("DDNS_API_ENDPOINT").unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let log_level = match var("DDNS_LOG_LEVEL") {
            Some(value) => parse_log_level(&value)?,
            None => Level::INFO,
        };

        Ok(Self { ddns, log_level })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.ddns
            .validate()
            .context("Invalid configuration")?;

        if let IpSourceConfig::Http { url } = &self.ddns.ip_source
            && url.starts_with("http://")
        {
            eprintln!(
                "WARNING: DDNS_IP_SOURCE uses HTTP (not HTTPS). \
                 The reported address could be tampered with in transit."
            );
        }

        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{value}': {e}"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{key} must be true or false. Got: {value}"),
    }
}

fn parse_log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
             Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config.ddns).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the IP source described by the configuration
fn build_ip_source(config: &DdnsConfig) -> Box<dyn IpSource> {
    match &config.ip_source {
        IpSourceConfig::Http { url } => Box::new(
            HttpIpSource::new(url.clone(), config.version)
                .with_bind_interface(config.bind_interface.clone())
                .with_timeout(Duration::from_secs(config.engine.request_timeout_secs)),
        ),
        IpSourceConfig::Interface { name } => {
            Box::new(InterfaceIpSource::new(name.clone(), config.version))
        }
    }
}

/// Build the Alidns provider described by the configuration
fn build_provider(config: &DdnsConfig) -> Result<AliyunProvider> {
    let provider = AliyunProvider::new(config.provider.clone())
        .context("Failed to create Alidns provider")?
        .with_bind_interface(config.bind_interface.clone())
        .with_timeout(Duration::from_secs(config.engine.request_timeout_secs));
    Ok(provider)
}

/// Run the daemon
async fn run_daemon(config: DdnsConfig) -> Result<()> {
    info!("Domain: {} ({})", config.record.domain, config.record.record_type);
    info!("IP source: {:?}", config.ip_source);
    if let Some(interface) = &config.bind_interface {
        info!("Binding outbound requests to interface {}", interface);
    }

    let ip_source = build_ip_source(&config);
    let provider = build_provider(&config)?;

    let (engine, mut event_rx) = DdnsEngine::new(ip_source, Box::new(provider), config)
        .context("Failed to create DDNS engine")?;

    let events = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            log_event(&event);
        }
    });

    engine.run_until(wait_for_shutdown()).await;

    // Dropping the engine closes the event channel
    drop(engine);
    events
        .await
        .map_err(|e| anyhow::anyhow!("Event logger task failed: {}", e))?;

    info!("Shutting down daemon");
    Ok(())
}

fn log_event(event: &EngineEvent) {
    match event {
        EngineEvent::Started { domain, interval_secs } => {
            debug!("Event: started for {} every {}s", domain, interval_secs)
        }
        EngineEvent::IpDetected { ip } => debug!("Event: detected {}", ip),
        EngineEvent::RecordCreated { domain, value } => {
            debug!("Event: created {} -> {}", domain, value)
        }
        EngineEvent::RecordUpdated { domain, previous, value } => {
            debug!("Event: updated {} -> {} (was {})", domain, value, previous)
        }
        EngineEvent::UpdateSkipped { domain, current } => {
            debug!("Event: {} already at {}", domain, current)
        }
        EngineEvent::CycleFailed { error } => debug!("Event: cycle failed: {}", error),
        EngineEvent::Stopped { reason } => debug!("Event: stopped ({})", reason),
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// If the handlers cannot be installed the error is logged and the daemon
/// runs until killed.
#[cfg(unix)]
async fn wait_for_shutdown() {
    let handlers = signal(SignalKind::terminate()).and_then(|term| {
        signal(SignalKind::interrupt()).map(|int| (term, int))
    });

    let (mut sigterm, mut sigint) = match handlers {
        Ok(handlers) => handlers,
        Err(e) => {
            error!("Failed to set up signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", received);
}

/// Wait for shutdown signals (Ctrl-C only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: Ctrl-C"),
        Err(e) => {
            error!("Failed to wait for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
