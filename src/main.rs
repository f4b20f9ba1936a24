use std::{env, net::SocketAddr};
use taxi_dashboard::{load_table, resolve_data_path, router, AppState, ChartCache};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_PORT: u16 = 8050;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path();
    let table = match load_table(&data_path).await {
        Ok(table) => table,
        Err(err) => {
            error!("cannot start without trip summary: {err}");
            return Err(err.into());
        }
    };

    let charts = ChartCache::build(&table);
    info!(charts = charts.len(), "chart cache ready");
    let app = router(AppState::new(charts, table.len()));

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
