use crate::app::axum_app;
use crate::bootstrap::config::AppConfig;
use crate::db::initialize;
use crate::services::auth::password::PasswordHasher;
use crate::services::auth::session::SessionCodec;
use crate::state::AppState;
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Opens the pool and brings the schema up to date.
pub(crate) async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.db_url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", config.db_url))?;
    initialize::initial(&db)
        .await
        .context("failed to apply migrations")?;
    Ok(db)
}

pub(crate) fn build_state(config: &AppConfig, db: DatabaseConnection) -> Arc<AppState> {
    Arc::new(AppState {
        db,
        sessions: SessionCodec::new(&config.session_secret, config.production),
        passwords: PasswordHasher::new(config.bcrypt_cost),
    })
}

pub(crate) async fn serve(config: AppConfig) -> Result<()> {
    let db = connect(&config).await?;
    let state = build_state(&config, db);

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(addr = %config.addr, production = config.production, "proyecta server listening");

    axum::serve(listener, axum_app(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutting down, closing database pool");
    state.db.clone().close().await.context("failed to close database")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
