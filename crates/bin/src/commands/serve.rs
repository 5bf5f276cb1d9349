//! Serve command - exposes a source over the `/v0/kv` HTTP protocol.

use std::sync::Arc;

use keysync::source::{FileSource, MemorySource, Source, http::router};
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::{ServeArgs, Storage};
use crate::storage::data_dir;

/// Run the keysync server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source: Arc<dyn Source> = match args.storage {
        Storage::File => {
            let dir = data_dir(args.data_dir.as_deref());
            tracing::info!("Serving files from {}", dir.display());
            Arc::new(FileSource::open(&dir).await?)
        }
        Storage::Memory => {
            tracing::warn!("Serving from memory; stored blobs are lost on shutdown");
            Arc::new(MemorySource::new("served"))
        }
    };

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("keysync server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET  /health       - Health check");
    println!("  GET  /v0/kv/{{key}}  - Read a blob");
    println!("  PUT  /v0/kv/{{key}}  - Replace a blob");
    println!("  HEAD /v0/kv/{{key}}  - Check a blob exists");
    println!();
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    axum::serve(listener, router(source))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}
