//! Configuration for paramstore
//!
//! Centralized configuration with sensible defaults:
//! - `Config`: the parameter service daemon (`paramstore-server`)
//! - `BackendConfig`: which backend a `ParameterStore` binds to

use crate::backend::DEFAULT_PAGE_SIZE;
use crate::service::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};

/// Default service address
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:7420";

/// Configuration for a parameter service daemon
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Worker threads serving connections
    pub worker_threads: usize,

    /// Connections accepted but not yet picked up by a worker
    pub max_pending_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Query Configuration
    // -------------------------------------------------------------------------
    /// Page size for path queries that do not ask for one
    pub default_page_size: u32,

    /// Largest page a path query may return
    pub max_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_ENDPOINT.to_string(),
            worker_threads: 8,
            max_pending_connections: 128,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
            default_page_size: DEFAULT_MAX_RESULTS,
            max_page_size: MAX_RESULTS_LIMIT,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the accept queue depth
    pub fn max_pending_connections(mut self, count: usize) -> Self {
        self.config.max_pending_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the default page size for path queries
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.config.default_page_size = size;
        self
    }

    /// Set the page size cap for path queries
    pub fn max_page_size(mut self, size: u32) -> Self {
        self.config.max_page_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Backend selection for a `ParameterStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Process-local in-memory backend
    Local,

    /// Remote path-keyed service
    Remote(RemoteConfig),
}

impl BackendConfig {
    /// Remote backend with default timeouts
    pub fn remote(endpoint: impl Into<String>) -> Self {
        BackendConfig::Remote(RemoteConfig::new(endpoint))
    }
}

/// Connection settings for the remote backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Service address (host:port)
    pub endpoint: String,

    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Page size requested while listing
    pub page_size: u32,
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout_ms: 2000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.write_timeout_ms = ms;
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }
}
