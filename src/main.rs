use std::net::SocketAddr;

use aula::config::AppConfig;
use aula::logging::{init_tracing, shutdown_tracer};
use aula::metrics::{init_metrics, metrics_app};
use aula::router::init_router;
use aula::state::init_app_state;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.server.service_name);

    match init_metrics() {
        Ok(Some(handle)) => {
            let metrics_addr = format!("{}:{}", config.server.host, config.server.metrics_port);
            tokio::spawn(async move {
                match tokio::net::TcpListener::bind(&metrics_addr).await {
                    Ok(listener) => {
                        info!("📊 Metrics available at http://{metrics_addr}/metrics");
                        if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                            error!(error = %e, "Metrics server stopped");
                        }
                    }
                    Err(e) => error!(error = %e, "Cannot bind metrics listener"),
                }
            });
        }
        Ok(None) => info!("Observability disabled, metrics server not started"),
        Err(e) => error!(error = %e, "Failed to install metrics recorder"),
    }

    let bind_address = config.server.bind_address();
    let state = match init_app_state(config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Cannot build store client: {e}");
            std::process::exit(1);
        }
    };
    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Cannot bind {bind_address}: {e}");
            std::process::exit(1);
        }
    };
    info!("🚀 Server running on http://{bind_address}");
    info!("📚 Swagger UI available at http://{bind_address}/swagger-ui");
    info!("📖 Scalar UI available at http://{bind_address}/scalar");

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!(error = %e, "Server error");
    }

    shutdown_tracer().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
