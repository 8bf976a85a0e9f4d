use std::sync::Arc;

use study_progress_backend::config::Config;
use study_progress_backend::create_app;
use study_progress_backend::db::{DatabaseProxy, DbInitError};
use study_progress_backend::logging::init_tracing;
use study_progress_backend::store::MemoryStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log);
    for setting in &config.rejected {
        tracing::warn!(
            key = setting.key,
            value = %setting.value,
            "invalid setting, using default"
        );
    }

    let addr = config.bind_addr();
    let app = match DatabaseProxy::from_env().await {
        Ok(proxy) => {
            tracing::info!("using postgres storage");
            create_app(proxy, config)
        }
        Err(DbInitError::Config(err)) => {
            tracing::warn!(error = %err, "database not configured, using in-memory storage");
            create_app(Arc::new(MemoryStore::new()), config)
        }
        Err(err) => {
            tracing::error!(error = %err, "database initialization failed");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "study-progress-backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        tracing::error!(error = %err, "server error");
    }

    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
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
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
