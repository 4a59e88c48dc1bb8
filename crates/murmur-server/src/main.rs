mod maintenance;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::http::{Method, header::CONTENT_TYPE};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use murmur_api::{AppStateInner, Config};
use murmur_share::ShareHub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur=debug,tower_http=debug".into()),
        )
        .init();

    // Config; refuses to boot without a real admin credential.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            eprintln!("       Set MURMUR_ADMIN_PASSWORD in your .env and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = murmur_db::Database::open(&PathBuf::from(&config.db_path))?;

    // Outbound channels (each optional)
    let share = ShareHub::from_env();

    let host = config.host.clone();
    let port = config.port;
    let state = AppStateInner::new(db, config, share);

    // Hourly expired-session prune
    tokio::spawn(maintenance::run_session_prune_loop(state.clone(), 3600));

    // CORS: the JSON API is also used by the admin UI from other origins.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(false);

    let app = Router::new()
        .merge(murmur_api::router(state.clone()))
        .merge(murmur_web::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Murmur listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
