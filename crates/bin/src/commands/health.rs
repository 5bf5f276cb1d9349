//! Health check command - checks a running keysync server.

use std::time::Duration;

use crate::cli::HealthArgs;
use crate::output::OutputFormat;
use crate::storage::redact_url;

/// Run the health check command
pub async fn run(args: &HealthArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let base = args.url.trim_end_matches('/');
    let url = if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    };
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let failure = match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await?;
            match body.get("status").and_then(|s| s.as_str()) {
                Some("healthy") => {
                    match format {
                        OutputFormat::Human => println!("healthy: {body}"),
                        OutputFormat::Json => println!("{body}"),
                    }
                    return Ok(());
                }
                status => format!("server returned status {}", status.unwrap_or("<missing>")),
            }
        }
        Ok(response) => format!("server returned HTTP status {}", response.status()),
        Err(e) => format!("failed to connect to {}: {e}", redact_url(&url)),
    };

    eprintln!("unhealthy: {failure}");
    std::process::exit(1);
}
