use std::path::Path;

use anyhow::{Context, Result};
use apify_client::ApifyClient;
use tracing::{debug, info};

use crate::config::{ActorInput, StorageTarget};

/// Key of the actor input record in the default key-value store.
pub const INPUT_KEY: &str = "INPUT";

/// Read the actor input. A missing record is an empty input.
pub async fn load_actor_input(client: &ApifyClient, storage: &StorageTarget) -> Result<ActorInput> {
    let input = match storage {
        StorageTarget::Platform {
            key_value_store_id, ..
        } => client
            .get_record::<ActorInput>(key_value_store_id, INPUT_KEY)
            .await
            .context("reading actor input")?,
        StorageTarget::Local { root } => read_local_input(root).await?,
    };

    match input {
        Some(input) => {
            info!(max_videos = ?input.max_videos, "Loaded actor input");
            Ok(input)
        }
        None => {
            debug!("No actor input found, using defaults");
            Ok(ActorInput::default())
        }
    }
}

async fn read_local_input(root: &Path) -> Result<Option<ActorInput>> {
    let path = root
        .join("key_value_stores")
        .join("default")
        .join(format!("{INPUT_KEY}.json"));

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let input = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(input))
}
