use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw dataset item. Actor output schemas are not contractual, so items are
/// kept as JSON objects and read field by field.
pub type DatasetItem = serde_json::Map<String, serde_json::Value>;

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "defaultKeyValueStoreId")]
    pub default_key_value_store_id: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    pub fn status(&self) -> RunStatus {
        RunStatus::from_api(&self.status)
    }
}

/// Coarse lifecycle of an actor run as reported by the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// READY, RUNNING, or anything not yet terminal.
    Pending,
    Succeeded,
    /// FAILED, ABORTING, ABORTED, TIMING-OUT, TIMED-OUT.
    Failed,
}

impl RunStatus {
    pub fn from_api(status: &str) -> Self {
        match status {
            "SUCCEEDED" => RunStatus::Succeeded,
            "FAILED" | "ABORTING" | "ABORTED" | "TIMING-OUT" | "TIMED-OUT" => RunStatus::Failed,
            _ => RunStatus::Pending,
        }
    }
}

/// Input for the clockworks/tiktok-scraper actor (keyword search).
#[derive(Debug, Clone, Serialize)]
pub struct TikTokSearchInput {
    #[serde(rename = "searchQueries")]
    pub search_queries: Vec<String>,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
    #[serde(rename = "shouldDownloadSubtitles")]
    pub should_download_subtitles: bool,
}

/// Input for the clockworks/tiktok-comments-scraper actor.
///
/// Missing post URLs are sent as `null` entries rather than dropped.
#[derive(Debug, Clone, Serialize)]
pub struct TikTokCommentsInput {
    #[serde(rename = "postURLs")]
    pub post_urls: Vec<Option<String>>,
    #[serde(rename = "commentsPerPost")]
    pub comments_per_post: u32,
    #[serde(rename = "maxRepliesPerComment")]
    pub max_replies_per_comment: u32,
}
