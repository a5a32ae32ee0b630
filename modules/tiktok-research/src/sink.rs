// Output destinations for the CSV report and the record dataset.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use apify_client::ApifyClient;
use async_trait::async_trait;
use tracing::info;

use crate::records::OutputRecord;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Store the CSV report under `key`.
    async fn store_csv(&self, key: &str, csv: &str) -> Result<()>;

    /// Append records to the run's dataset.
    async fn push_records(&self, records: &[OutputRecord]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// ApifySink
// ---------------------------------------------------------------------------

/// Writes to the run's default key-value store and dataset on the platform.
pub struct ApifySink {
    client: Arc<ApifyClient>,
    key_value_store_id: String,
    dataset_id: String,
}

impl ApifySink {
    pub fn new(client: Arc<ApifyClient>, key_value_store_id: String, dataset_id: String) -> Self {
        Self {
            client,
            key_value_store_id,
            dataset_id,
        }
    }
}

#[async_trait]
impl OutputSink for ApifySink {
    async fn store_csv(&self, key: &str, csv: &str) -> Result<()> {
        self.client
            .set_record(&self.key_value_store_id, key, csv.to_string(), CSV_CONTENT_TYPE)
            .await?;
        info!(store_id = %self.key_value_store_id, key, bytes = csv.len(), "Stored CSV report");
        Ok(())
    }

    async fn push_records(&self, records: &[OutputRecord]) -> Result<()> {
        self.client
            .push_dataset_items(&self.dataset_id, records)
            .await?;
        info!(dataset_id = %self.dataset_id, count = records.len(), "Pushed records to dataset");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LocalSink
// ---------------------------------------------------------------------------

/// Writes into an Apify-style local storage directory:
/// `key_value_stores/default/{key}` and `datasets/default/{index:09}.json`.
pub struct LocalSink {
    root: PathBuf,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn key_value_store_dir(&self) -> PathBuf {
        self.root.join("key_value_stores").join("default")
    }

    pub fn dataset_dir(&self) -> PathBuf {
        self.root.join("datasets").join("default")
    }
}

#[async_trait]
impl OutputSink for LocalSink {
    async fn store_csv(&self, key: &str, csv: &str) -> Result<()> {
        let dir = self.key_value_store_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;

        let path = dir.join(key);
        tokio::fs::write(&path, csv)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), bytes = csv.len(), "Stored CSV report");
        Ok(())
    }

    async fn push_records(&self, records: &[OutputRecord]) -> Result<()> {
        let dir = self.dataset_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;

        let mut next = last_item_index(&dir).await? + 1;
        for record in records {
            let path = dir.join(format!("{next:09}.json"));
            let body = serde_json::to_vec_pretty(record)?;
            tokio::fs::write(&path, body)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            next += 1;
        }

        info!(path = %dir.display(), count = records.len(), "Pushed records to dataset");
        Ok(())
    }
}

/// Highest `NNNNNNNNN.json` index already in the dataset directory, or 0.
async fn last_item_index(dir: &Path) -> Result<u64> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut last = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_suffix(".json"))
            .and_then(|stem| stem.parse::<u64>().ok());
        if let Some(index) = index {
            last = last.max(index);
        }
    }
    Ok(last)
}
