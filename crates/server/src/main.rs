mod api;
mod config;
mod scan;
mod state;
mod utils;

use axum::Router;
use api::api_router;
use config::{config_path_from_env, load_or_create_config};
use state::AppState;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }

    let bind_addr = config.bind_addr();
    let state = AppState::new(&config_path, config);
    let root = state.library.root.clone();
    if root.is_dir() {
        info!("Music directory: {}", root.display());
    } else {
        warn!(
            "Music directory {} does not exist; listing requests will fail until it is created",
            root.display()
        );
    }

    let mut app = Router::new().nest("/api", api_router(state.clone()));
    if state.config.serve_static {
        let prefix = state.config.static_prefix.clone();
        info!("Serving {} at {}/", root.display(), prefix);
        app = app.nest_service(&prefix, ServeDir::new(&root));
    }
    let app = app
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

// Resolves on ctrl-c, or SIGTERM on unix, so in-flight scans can finish.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
        "ctrl-c"
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Cannot listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let reason = tokio::select! {
        reason = interrupt => reason,
        reason = terminate => reason,
    };
    info!("Received {}, stopping local music server", reason);
}
