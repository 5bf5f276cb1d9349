//! Local storage and unlock helpers shared by the commands.

use std::path::{Path, PathBuf};

use keysync::{Session, Store, StoreConfig, source::FileSource};

use crate::cli::LocalArgs;

/// Directory used when `--data-dir` is not given.
pub fn data_dir(arg: Option<&Path>) -> PathBuf {
    arg.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Redact credentials embedded in a URL for safe logging
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            let mut redacted = parsed.clone();
            if !parsed.username().is_empty() {
                let _ = redacted.set_username("***");
            }
            if parsed.password().is_some() {
                let _ = redacted.set_password(Some("***"));
            }
            redacted.to_string()
        }
        Err(_) => "<unparsable-url>".to_string(),
    }
}

/// Opens the local file source and a store over it.
pub async fn open_local(
    args: &LocalArgs,
) -> Result<(FileSource, Store), Box<dyn std::error::Error>> {
    let dir = data_dir(args.data_dir.as_deref());
    let source = FileSource::open(&dir).await?;
    tracing::info!("Using local data directory {}", dir.display());
    let store = Store::with_config(std::sync::Arc::new(source.clone()), StoreConfig::default());
    Ok((source, store))
}

/// Unlocks a session from `--password` / `KEYSYNC_PASSWORD`.
pub fn unlock(args: &LocalArgs) -> Result<Session, Box<dyn std::error::Error>> {
    match args.password.as_deref() {
        Some(password) if !password.is_empty() => Ok(Session::unlock(password)),
        _ => Err("a password is required: pass --password or set KEYSYNC_PASSWORD".into()),
    }
}
