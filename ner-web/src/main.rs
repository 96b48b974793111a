//! Binário do servidor: lê a configuração, carrega o motor de inferência uma
//! única vez e sobe o Axum.

use ner_spans::NerPipeline;
use ner_spans_web::{config::ServerConfig, create_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    // O motor pode fazer I/O bloqueante na carga; roda fora do runtime async
    let ner_config = config.ner.clone();
    let pipeline = tokio::task::spawn_blocking(move || NerPipeline::from_config(&ner_config)).await??;
    info!("Pipeline pronto (motor: {})", pipeline.engine_name());

    let app = create_router(AppState::new(pipeline), config.static_dir.clone());

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Servidor NER iniciado em http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Servidor encerrado");
    Ok(())
}
