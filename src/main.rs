use std::path::Path;

use anyhow::Context;
use clap::Parser;
use futures::{StreamExt, pin_mut};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icer::IceClient;
use icer::client::{EntryQuery, PartScope, SearchQuery};
use icer::config::{Command, Config};
use icer::progress::Bar;
use icer::types::Collection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = config.connection.build_client()?;

    match config.command {
        Command::Folders { collection } => {
            for folder in client.collection_folders(collection).await? {
                println!("{}", serde_json::to_string(&folder)?);
            }
        }
        Command::Entries {
            folder,
            filter,
            limit,
        } => {
            let mut bar = Bar::new();
            let query = EntryQuery {
                filter,
                limit,
                progress: Some(&mut bar),
            };
            let stream = client.folder_entries_stream(folder, query);
            pin_mut!(stream);
            while let Some(entry) = stream.next().await {
                println!("{}", serde_json::to_string(&entry?)?);
            }
        }
        Command::Search {
            query,
            min_score,
            limit,
        } => {
            let options = SearchQuery {
                min_score,
                limit,
                progress: None,
            };
            for result in client.search(&query, options).await? {
                println!("{}", serde_json::to_string(&result)?);
            }
        }
        Command::Sequence { part, format, out } => {
            let data = client.part_sequence_raw(part, format).await?;
            match out {
                Some(path) => tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&data)?;
                }
            }
        }
        Command::Locate { names, collection } => {
            locate(&client, names, collection).await?;
        }
        Command::Export { collection, out } => {
            export(&client, collection, &out).await?;
        }
    }

    Ok(())
}

/// Print one JSON line per sample location found for each part name.
/// Resolution failures are reported inline rather than aborting the
/// remaining names.
async fn locate(client: &IceClient, names: Vec<String>, collection: Collection) -> anyhow::Result<()> {
    let folder_ids: Vec<i64> = client
        .collection_folders(collection)
        .await?
        .into_iter()
        .map(|folder| folder.id)
        .collect();

    for name in names {
        let id = match client
            .part_id_by_name(&name, PartScope::Folders(folder_ids.clone()), false)
            .await
        {
            Ok(id) => id,
            Err(err @ (icer::Error::UnknownName { .. } | icer::Error::AmbiguousName { .. })) => {
                println!(
                    "{}",
                    serde_json::json!({ "part": name, "error": err.to_string() })
                );
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let samples = client.part_samples(id).await?;
        if samples.is_empty() {
            println!(
                "{}",
                serde_json::json!({ "part": name, "location": "registered but no samples" })
            );
            continue;
        }
        for sample in samples {
            let location = sample
                .location
                .map(|location| location.path_string("TUBE"))
                .unwrap_or_default();
            println!(
                "{}",
                serde_json::json!({ "part": name, "location": location })
            );
        }
    }
    Ok(())
}

/// Dump a collection to disk: one directory per folder, holding the
/// entry listing as JSON plus one GenBank file per entry. Parts
/// without a stored sequence are skipped with a warning.
async fn export(client: &IceClient, collection: Collection, out: &Path) -> anyhow::Result<()> {
    use icer::sequence::SequenceFormat;

    for folder in client.collection_folders(collection).await? {
        let folder_dir = out.join(folder.name.replace('/', "_"));
        tokio::fs::create_dir_all(&folder_dir)
            .await
            .with_context(|| format!("creating {}", folder_dir.display()))?;

        let mut bar = Bar::new();
        let query = EntryQuery {
            progress: Some(&mut bar),
            ..EntryQuery::default()
        };
        let entries = client.folder_entries(folder.id, query).await?;

        let listing = folder_dir.join("entries.json");
        tokio::fs::write(&listing, serde_json::to_vec_pretty(&entries)?)
            .await
            .with_context(|| format!("writing {}", listing.display()))?;

        for entry in &entries {
            match client
                .part_sequence_raw(entry.id, SequenceFormat::Genbank)
                .await
            {
                Ok(data) => {
                    let path = folder_dir.join(format!("{}.gb", entry.id));
                    tokio::fs::write(&path, &data)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                }
                Err(err) => {
                    tracing::warn!("no sequence for entry {} ({}): {}", entry.id, entry.name, err);
                }
            }
        }
        tracing::info!(
            "exported {} entries from folder {:?}",
            entries.len(),
            folder.name
        );
    }
    Ok(())
}
