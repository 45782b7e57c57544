use anyhow::{Context, Result};
use clap::Parser;
use daybook_core::db::open_db;
use daybook_core::init_logging;
use daybook_server::routes::auth_service;
use daybook_server::{router, AppState, CliArgs, ServerConfig};
use log::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = ServerConfig::load(&args)?;

    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.database_path.display()
        )
    })?;
    let state = AppState::from_config(conn, &config);

    let purged = state.with_conn(|conn| Ok(auth_service(conn, &state)?.purge_expired_sessions()?));
    if let Err(err) = purged {
        warn!(
            "event=session_purge module=server status=error error={:?}",
            err
        );
    }

    let app = router(state).layer(config.cors_layer()?);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=server_start module=server status=ok addr={} version={}",
        config.bind,
        env!("CARGO_PKG_VERSION")
    );
    println!("daybook-server listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            "event=shutdown_signal module=server status=error error={}",
            err
        );
    }
}
