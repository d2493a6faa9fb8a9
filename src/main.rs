//! objstore: run one object storage operation against an S3-compatible server.

use std::io::Write;

use objstore::{Config, Outcome, startup::build_context};
use objstore_telemetry::setup_telemetry;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Build version (injected at compile time)
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init()?;
    setup_telemetry(&config.telemetry_config());

    debug!(
        version = VERSION,
        endpoint = %config.s3_endpoint,
        tls = config.s3_use_tls,
        "Starting objstore"
    );

    let ctx = build_context(&config)?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    match config.command.run(&ctx, &cancel).await? {
        Outcome::Text(text) => println!("{text}"),
        Outcome::Bytes(data) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }
        Outcome::Done => {}
    }

    Ok(())
}

/// Cancel in-flight storage calls on Ctrl+C or SIGTERM.
async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            debug!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                debug!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, cancelling"),
        () = terminate => info!("Received SIGTERM, cancelling"),
    }

    cancel.cancel();
}
