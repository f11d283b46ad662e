//! Configuration for the MCP reference server.

use std::time::Duration;

/// Protocol-wide constants (pagination bounds, timeouts, buffer sizes).
pub mod protocol {
    use std::time::Duration;

    /// Default `tools/call` timeout.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default shutdown drain budget.
    pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default progress-notification throttle window.
    pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

    /// Default page size for paginated listings.
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    /// Minimum page size after clamping.
    pub const MIN_PAGE_SIZE: usize = 1;

    /// Maximum page size after clamping.
    pub const MAX_PAGE_SIZE: usize = 200;

    /// Maximum completion candidates returned from `completion/complete`.
    pub const COMPLETION_CAP: usize = 20;

    /// Default SSE ring buffer capacity, per session.
    pub const DEFAULT_SSE_RING_CAPACITY: usize = 1024;

    /// Session idle timeout before the sweeper reclaims it.
    pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

    /// Session sweeper tick interval.
    pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Authorization code lifetime (spec.md caps this at 600s).
    pub const AUTH_CODE_LIFETIME: Duration = Duration::from_secs(600);

    /// OAuth store sweeper tick interval.
    pub const OAUTH_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Latest protocol version this server negotiates when the client's
    /// version is unrecognized.
    pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

    /// Protocol versions this server accepts from a client's `initialize`.
    pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
        &["2025-06-18", "2025-03-26", "2024-11-05"];
}

/// Server configuration, populated from `MCP_*` environment variables.
///
/// CLI parsing is intentionally out of scope: only `Config::from_env` is
/// provided, mirroring how narrowly the teacher's `Config::from_env` reads
/// its own environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// `MCP_PORT`: HTTP listen port.
    pub port: u16,

    /// `MCP_HOST`: HTTP bind address.
    pub host: String,

    /// `MCP_TRANSPORT`: one of `stdio`, `http`, `both`.
    pub transport: TransportKind,

    /// `MCP_REQUEST_TIMEOUT_MS`: per-`tools/call` timeout.
    pub request_timeout: Duration,

    /// `MCP_SHUTDOWN_TIMEOUT_MS`: overall shutdown drain budget.
    pub shutdown_timeout: Duration,

    /// `MCP_PROGRESS_INTERVAL_MS`: progress-notification throttle window.
    pub progress_interval: Duration,

    /// `MCP_PAGE_SIZE`: default page size for `tools/list`.
    pub page_size: usize,

    /// `MCP_LOG_LEVEL`: `tracing` env-filter directive.
    pub log_level: String,

    /// `MCP_RESOURCE_URL`: this server's resource identifier, advertised by
    /// RFC 9728 protected-resource metadata.
    pub resource_url: String,

    /// `MCP_AUTH_SERVERS`: comma-separated list of authorization server
    /// issuer URLs.
    pub auth_servers: Vec<String>,

    /// `MCP_AUTH_TOKEN`: shared-secret bearer token that gates `GET
    /// /authorize`'s auto-approval. `None` disables the OAuth front
    /// channel entirely.
    pub auth_token: Option<String>,
}

/// Which transport(s) the server should bring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stdio,
    Http,
    Both,
}

impl Config {
    /// Create a configuration with every field at its documented default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            transport: TransportKind::Stdio,
            request_timeout: protocol::DEFAULT_REQUEST_TIMEOUT,
            shutdown_timeout: protocol::DEFAULT_SHUTDOWN_TIMEOUT,
            progress_interval: protocol::DEFAULT_PROGRESS_INTERVAL,
            page_size: protocol::DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
            resource_url: "http://localhost:8080".to_string(),
            auth_servers: Vec::new(),
            auth_token: None,
        }
    }

    /// Create a configuration tuned for tests: no throttling, no timeouts
    /// long enough to stall a test run.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(1),
            progress_interval: Duration::from_millis(0),
            ..Self::new()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or enum-valued variable is present but
    /// cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Ok(port) = std::env::var("MCP_PORT") {
            config.port = port.parse()?;
        }
        if let Ok(host) = std::env::var("MCP_HOST") {
            config.host = host;
        }
        if let Ok(transport) = std::env::var("MCP_TRANSPORT") {
            config.transport = match transport.as_str() {
                "stdio" => TransportKind::Stdio,
                "http" => TransportKind::Http,
                "both" => TransportKind::Both,
                other => anyhow::bail!("invalid MCP_TRANSPORT: {other}"),
            };
        }
        if let Ok(ms) = std::env::var("MCP_REQUEST_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(ms.parse()?);
        }
        if let Ok(ms) = std::env::var("MCP_SHUTDOWN_TIMEOUT_MS") {
            config.shutdown_timeout = Duration::from_millis(ms.parse()?);
        }
        if let Ok(ms) = std::env::var("MCP_PROGRESS_INTERVAL_MS") {
            config.progress_interval = Duration::from_millis(ms.parse()?);
        }
        if let Ok(size) = std::env::var("MCP_PAGE_SIZE") {
            config.page_size = size.parse()?;
        }
        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Ok(url) = std::env::var("MCP_RESOURCE_URL") {
            config.resource_url = url;
        }
        if let Ok(servers) = std::env::var("MCP_AUTH_SERVERS") {
            config.auth_servers = servers.split(',').map(str::trim).map(str::to_string).collect();
        }
        if let Ok(token) = std::env::var("MCP_AUTH_TOKEN") {
            config.auth_token = Some(token);
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
