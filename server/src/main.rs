use anyhow::Context;
use cookbook_server::config::Config;
use cookbook_server::db::{self, DbOptions};
use cookbook_server::service::RecipeService;
use cookbook_server::store::RecipeStore;
use cookbook_server::{api, build_router, telemetry, AppState, DOCS_PATH, OPENAPI_PATH};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    let telemetry = telemetry::init_telemetry();

    let result = run().await;
    if let Err(e) = &result {
        tracing::error!("server exited with error: {:#}", e);
    }

    telemetry.shutdown();
    result
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    let pool = db::create_pool(
        &config.database_url,
        &DbOptions {
            pool_size: config.db_pool_size,
            busy_timeout_ms: config.db_busy_timeout_ms,
        },
    )
    .with_context(|| format!("failed to open database {}", config.database_url))?;

    let state: AppState = Arc::new(RecipeService::new(RecipeStore::new(pool)));
    let app = build_router(state, config.track_db_query_count);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}{}/", local_addr, DOCS_PATH);
    tracing::info!("OpenAPI spec available at http://{}{}", local_addr, OPENAPI_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
