//! Application settings and the HTTP server configuration built from them.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use splitledger::outbound::memory::InMemoryExpenseLedgerRepository;
use splitledger::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings loaded from CLI flags, `SPLITLEDGER_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SPLITLEDGER")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Skip the embedded migrations normally applied before serving.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
    /// JSON roster seed applied to the in-memory store.
    pub seed_file: Option<PathBuf>,
}

impl AppSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Pool size, defaulting to ten connections.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Migrations run whenever a database is configured unless explicitly
    /// skipped.
    pub fn run_migrations(&self) -> bool {
        !self.skip_migrations
    }

    /// Return the database URL when one is set and non-blank.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Ledger store backing the HTTP ports.
#[derive(Clone)]
pub enum LedgerBackend {
    Postgres(DbPool),
    InMemory(Arc<InMemoryExpenseLedgerRepository>),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ledger: LedgerBackend,
}

impl ServerConfig {
    /// Construct a server configuration backed by an empty in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ledger: LedgerBackend::InMemory(Arc::new(InMemoryExpenseLedgerRepository::new())),
        }
    }

    /// Attach a database connection pool for the Diesel ledger adapter.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.ledger = LedgerBackend::Postgres(pool);
        self
    }

    /// Use a prepared in-memory store, such as one loaded from a seed file.
    #[must_use]
    pub fn with_in_memory_ledger(mut self, repo: Arc<InMemoryExpenseLedgerRepository>) -> Self {
        self.ledger = LedgerBackend::InMemory(repo);
        self
    }

    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Exercised by server tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
