use clap::Parser;
use photovault::cli::{self, Console, PromptPicker, StdoutNotifier};
use photovault::{
    Config, DirAccess, MediaIndex, ReqwestBackupApi, StorageAccess, Workflow, telemetry,
};
use std::sync::Arc;

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before anything builds a TLS client
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = photovault::config::Args::parse();
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;
    tracing::debug!("{:?}", args);

    // Make sure the photo library is reachable before scanning it
    let access = DirAccess::new(&config.media_dir);
    if !access.granted() && !access.request() {
        tracing::warn!(dir = %config.media_dir.display(), "Photo library is not accessible");
    }

    let index = Arc::new(match MediaIndex::scan(&config.media_dir) {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(error = %e, dir = %config.media_dir.display(), "Could not scan photo library, starting empty");
            MediaIndex::empty(&config.media_dir)
        }
    });
    tracing::info!(photos = index.len(), dir = %config.media_dir.display(), "Photo library indexed");

    let console = Arc::new(Console::new());
    let workflow = Workflow::builder()
        .api(ReqwestBackupApi::shared())
        .resolver(index.clone())
        .access(Arc::new(access))
        .picker(Arc::new(PromptPicker::new(index, console.clone())))
        .notifier(Arc::new(StdoutNotifier))
        .download_dir(config.download_dir.clone())
        .build();

    // Run the command loop with graceful shutdown on SIGTERM/Ctrl+C
    tokio::select! {
        result = cli::run(workflow, console) => result?,
        _ = shutdown_signal() => {}
    }
    Ok(())
}
