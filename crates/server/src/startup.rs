use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use common::env::{ensure_sqlite_parent, ensure_static_dir};
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use models::db::DbHandle;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes;
use crate::state::AppState;

/// Open the database, apply migrations, serve until a shutdown signal, then
/// close the pool.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let db = prepare_database(&config).await?;

    let addr = config.bind_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            if let Err(close_err) = db.close().await {
                error!(error = %close_err, "failed to close database pool");
            }
            return Err(e.into());
        }
    };
    info!(%addr, "listening");

    run_with(&config, db, listener, shutdown_signal()).await
}

/// Open the configured database and bring its schema up to date.
pub async fn prepare_database(config: &AppConfig) -> anyhow::Result<DbHandle> {
    ensure_sqlite_parent(&config.database.url).await?;
    let db = DbHandle::open(&config.database).await?;
    Migrator::up(db.conn(), None).await?;
    info!("migrations applied");
    Ok(db)
}

/// Serve on an already bound listener until `shutdown` resolves, let
/// in-flight requests finish, then close `db`.
pub async fn run_with<F>(config: &AppConfig, db: DbHandle, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let serve_static = match &config.server.static_dir {
        Some(dir) => ensure_static_dir(dir).await,
        None => false,
    };

    let state = AppState::new(db.clone());
    let app = routes::build_router(&state, config, serve_static);

    let served = serve(listener, app, shutdown).await;
    if let Err(e) = &served {
        error!(error = %e, "server terminated with error");
    }

    if let Err(e) = db.close().await {
        error!(error = %e, "failed to close database pool");
    }
    served
}

/// Serve `app` on `listener` with peer addresses attached, stopping
/// gracefully once `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "shutdown requested"),
        _ = terminate => info!(signal = "SIGTERM", "shutdown requested"),
    }
}
