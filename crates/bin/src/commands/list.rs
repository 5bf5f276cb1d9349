//! List command - decrypts a local collection and prints its records.

use keysync::{Collection, FetchOptions, Record};

use crate::cli::ListArgs;
use crate::output::{OutputFormat, Table};
use crate::storage::{open_local, unlock};

const MASK: &str = "********";

/// Run the list command
pub async fn run(args: &ListArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let session = unlock(&args.local)?;
    let (_, store) = open_local(&args.local).await?;

    let mut collection = Collection::new(args.local.collection.as_str());
    if !store.exists(&collection, FetchOptions::default()).await? {
        return Err(format!(
            "collection '{}' has not been saved in this data directory",
            collection.name()
        )
        .into());
    }
    store
        .fetch(&mut collection, &session, FetchOptions::default())
        .await?;

    let records: Vec<&Record> = collection
        .iter()
        .filter(|r| args.all || !r.is_removed())
        .collect();

    match format {
        OutputFormat::Human => {
            let mut table = Table::new(&["ID", "NAME", "UPDATED", "FIELDS", "TAGS"]);
            for record in &records {
                table.push(vec![
                    record.id().map(ToString::to_string).unwrap_or_default(),
                    if record.is_removed() {
                        "(removed)".to_string()
                    } else {
                        record.display_name().to_string()
                    },
                    record.updated.format("%Y-%m-%d %H:%M:%S").to_string(),
                    record
                        .fields
                        .iter()
                        .map(|f| {
                            let value = if f.masked && !args.reveal {
                                MASK
                            } else {
                                f.value.as_str()
                            };
                            format!("{}={value}", f.name)
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                    record.tags.join(","),
                ]);
            }
            if table.is_empty() {
                println!("No records in '{}'", collection.name());
            } else {
                println!("{}", table.render());
            }
        }
        OutputFormat::Json => {
            let value: Vec<serde_json::Value> = records
                .iter()
                .map(|record| -> Result<serde_json::Value, serde_json::Error> {
                    let mut value = serde_json::to_value(record)?;
                    if !args.reveal {
                        mask_values(&mut value);
                    }
                    Ok(value)
                })
                .collect::<Result<_, serde_json::Error>>()?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// Replaces masked field values in a serialized record.
fn mask_values(record: &mut serde_json::Value) {
    let Some(fields) = record.get_mut("fields").and_then(|f| f.as_array_mut()) else {
        return;
    };
    for field in fields {
        if field.get("masked").and_then(|m| m.as_bool()) == Some(true) {
            field["value"] = MASK.into();
        }
    }
}
