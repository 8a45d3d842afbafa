//! Startup sequence: configuration, database gate, then bind.
//!
//! [`run_with`] takes the pool constructor and the bind step as closures so
//! the ordering can be exercised without a database or a real socket.

use std::future::Future;
use std::net::SocketAddr;

use hello_core::error::ConfigError;
use hello_db::startup::{wait_for_database, StartupError};
use hello_db::{DatabaseConfig, StartupGateConfig};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Everything read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gate: StartupGateConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_lookup(&lookup)?,
            database: DatabaseConfig::from_lookup(&lookup)?,
            gate: StartupGateConfig::from_lookup(&lookup)?,
        })
    }
}

/// Fatal failure before the server starts accepting requests.
#[derive(Debug, thiserror::Error)]
pub enum StartupFailure {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gate(StartupError),

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// State handed back once the gate has passed and the listener is bound.
#[derive(Debug)]
pub struct Started<H, L> {
    pub settings: Settings,
    /// Whatever `connect` produced next to the probe, usually the pool.
    pub handle: H,
    pub listener: L,
    /// Probes made by the gate, the last one being the success.
    pub attempts: u32,
}

/// Run the startup sequence.
///
/// 1. Load [`Settings`] through `lookup`.
/// 2. Call `connect` to build the database handle and its probe.
/// 3. Probe until the database answers (see [`wait_for_database`]).
/// 4. Call `bind` with the configured address.
///
/// `connect` is never called when configuration fails, and `bind` is never
/// called before the gate passes. Returns `Ok(None)` if `cancel` fires while
/// the gate is still waiting.
pub async fn run_with<C, H, P, Fut, E, B, BFut, L>(
    lookup: impl Fn(&str) -> Option<String>,
    connect: C,
    bind: B,
    cancel: &CancellationToken,
) -> Result<Option<Started<H, L>>, StartupFailure>
where
    C: FnOnce(&DatabaseConfig) -> (H, P),
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
    B: FnOnce(SocketAddr) -> BFut,
    BFut: Future<Output = std::io::Result<L>>,
{
    // --- Configuration ---
    let settings = Settings::from_lookup(lookup)?;
    tracing::info!(
        host = %settings.server.host,
        port = %settings.server.port,
        "Loaded server configuration",
    );
    tracing::info!(
        host = %settings.database.host,
        port = settings.database.port,
        database = %settings.database.database,
        user = %settings.database.username,
        "Loaded database configuration",
    );

    // --- Database gate ---
    let (handle, probe) = connect(&settings.database);
    let attempts = match wait_for_database(probe, &settings.gate, cancel).await {
        Ok(attempts) => attempts,
        Err(StartupError::Cancelled) => {
            tracing::info!("Shutdown requested before the database became available");
            return Ok(None);
        }
        Err(e) => return Err(StartupFailure::Gate(e)),
    };
    tracing::info!(attempts, "Database startup check passed");

    // --- Bind ---
    let addr = settings.server.bind_addr();
    let listener = bind(addr)
        .await
        .map_err(|source| StartupFailure::Bind { addr, source })?;
    tracing::info!(%addr, "Listening");

    Ok(Some(Started {
        settings,
        handle,
        listener,
        attempts,
    }))
}
