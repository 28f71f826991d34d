use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::errors::ModelError;

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open a pooled connection from configuration.
///
/// In-memory SQLite databases live and die with a single connection, so the
/// pool is pinned to one connection. sqlx still retires it after its default
/// idle timeout and max lifetime, which drops the database; in-memory URLs
/// suit short-lived processes such as tests only.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    if cfg.url.trim().is_empty() {
        return Err(ModelError::Config("database url is empty".into()));
    }
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if is_in_memory(&cfg.url) {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    Database::connect(opt).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Process-wide database handle.
///
/// Cloning shares the same pool. `close` shuts the pool down at most once no
/// matter how many clones or signal paths call it.
#[derive(Clone, Debug)]
pub struct DbHandle {
    conn: DatabaseConnection,
    closed: Arc<AtomicBool>,
}

impl DbHandle {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn, closed: Arc::new(AtomicBool::new(false)) }
    }

    pub async fn open(cfg: &DatabaseConfig) -> Result<Self, ModelError> {
        let conn = connect_with_config(cfg).await?;
        info!(sqlite = cfg.is_sqlite(), "database pool opened");
        Ok(Self::new(conn))
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns `Ok(true)` if this call closed the pool, `Ok(false)` if it was
    /// already closed.
    pub async fn close(&self) -> Result<bool, ModelError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!("database close requested twice; ignoring");
            return Ok(false);
        }
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| ModelError::Db(e.to_string()))?;
        info!("database pool closed");
        Ok(true)
    }
}
