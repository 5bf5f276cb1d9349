//! Sync command - reconciles a local collection with a remote server.

use std::time::Duration;

use keysync::{
    Collection, FetchOptions, SyncCoordinator,
    source::{HttpSource, Timeout},
};

use crate::cli::SyncArgs;
use crate::output::OutputFormat;
use crate::storage::{open_local, redact_url, unlock};

/// Run the sync command
pub async fn run(args: &SyncArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let session = unlock(&args.local)?;
    let (local, store) = open_local(&args.local).await?;
    let remote = Timeout::new(
        HttpSource::new(&args.remote)?,
        Duration::from_secs(args.timeout),
    );
    tracing::info!("Syncing with {}", redact_url(&args.remote));

    let mut collection = Collection::new(args.local.collection.as_str());
    if store.exists(&collection, FetchOptions::default()).await? {
        store
            .fetch(&mut collection, &session, FetchOptions::default())
            .await?;
    }

    let coordinator = SyncCoordinator::new(store);
    let report = coordinator
        .run(&mut collection, &session, &local, &remote)
        .await?;

    match format {
        OutputFormat::Human => {
            println!("Collection:  {}", collection.name());
            println!("Records:     {}", collection.live().count());
            println!("Removed:     {}", collection.len() - collection.live().count());
            println!(
                "Pulled:      {} added, {} replaced, {} unchanged",
                report.pulled.added, report.pulled.replaced, report.pulled.discarded
            );
            if !report.remote_existed {
                println!("Remote had no copy; published local state");
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "collection": collection.name(),
                "records": collection.live().count(),
                "removed": collection.len() - collection.live().count(),
                "added": report.pulled.added,
                "replaced": report.pulled.replaced,
                "unchanged": report.pulled.discarded,
                "remote_existed": report.remote_existed,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
