pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    DatasetItem, RunData, RunStatus, TikTokCommentsInput, TikTokSearchInput,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor for clockworks/tiktok-scraper (search, profiles, hashtags).
pub const TIKTOK_SCRAPER: &str = "clockworks/tiktok-scraper";

/// Actor for clockworks/tiktok-comments-scraper.
pub const TIKTOK_COMMENTS_SCRAPER: &str = "clockworks/tiktok-comments-scraper";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    /// Client against a different API root (e.g. a local mock server).
    pub fn with_base_url(token: String, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Start an actor run. Returns immediately with run metadata.
    ///
    /// `actor_id` is either a raw actor id or `owner/name`.
    pub async fn start_run<I: Serialize + ?Sized>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_path(actor_id));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let resp = check_status(resp).await?;
            let api_resp: ApiResponse<RunData> = resp.json().await?;
            let run = api_resp.data;
            match run.status() {
                RunStatus::Succeeded => return Ok(run),
                RunStatus::Failed => {
                    return Err(ApifyError::RunFailed {
                        run_id: run.id,
                        status: run.status,
                    });
                }
                RunStatus::Pending => {
                    tracing::debug!(run_id, status = %run.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Start an actor run and block until it finishes.
    pub async fn call_actor<I: Serialize + ?Sized>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let run = self.start_run(actor_id, input).await?;
        tracing::info!(actor = actor_id, run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        let elapsed_secs = completed
            .started_at
            .zip(completed.finished_at)
            .map(|(start, end)| (end - start).num_seconds());
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            key_value_store_id = ?completed.default_key_value_store_id,
            elapsed_secs = ?elapsed_secs,
            "Run completed"
        );
        Ok(completed)
    }

    /// Fetch all dataset items, empty and hidden-field items included.
    /// No pagination: the API returns the full set by default.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Append items to a dataset.
    pub async fn push_dataset_items<T: Serialize>(&self, dataset_id: &str, items: &[T]) -> Result<()> {
        let url = format!("{}/datasets/{}/items", self.base_url, dataset_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(items)
            .send()
            .await?;

        check_status(resp).await?;
        tracing::debug!(dataset_id, count = items.len(), "Pushed dataset items");
        Ok(())
    }

    /// Read a JSON record from a key-value store. A missing record is `None`.
    pub async fn get_record<T: DeserializeOwned>(&self, store_id: &str, key: &str) -> Result<Option<T>> {
        let url = format!("{}/key-value-stores/{}/records/{}", self.base_url, store_id, key);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let resp = check_status(resp).await?;
        let bytes = resp.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Write a record to a key-value store with an explicit content type.
    pub async fn set_record(
        &self,
        store_id: &str,
        key: &str,
        body: impl Into<reqwest::Body>,
        content_type: &str,
    ) -> Result<()> {
        let url = format!("{}/key-value-stores/{}/records/{}", self.base_url, store_id, key);
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        check_status(resp).await?;
        tracing::debug!(store_id, key, content_type, "Stored key-value record");
        Ok(())
    }

    /// Search TikTok by keywords end-to-end: run the scraper, wait, fetch results.
    pub async fn search_tiktok_videos(&self, input: &TikTokSearchInput) -> Result<Vec<DatasetItem>> {
        tracing::info!(
            queries = ?input.search_queries,
            limit = input.results_per_page,
            "Starting TikTok keyword search"
        );

        let run = self.call_actor(TIKTOK_SCRAPER, input).await?;
        let videos: Vec<DatasetItem> = self.get_dataset_items(&run.default_dataset_id).await?;
        tracing::info!(count = videos.len(), "Fetched TikTok videos");

        Ok(videos)
    }

    /// Scrape comments for a list of TikTok posts end-to-end.
    pub async fn scrape_tiktok_comments(&self, input: &TikTokCommentsInput) -> Result<Vec<DatasetItem>> {
        tracing::info!(
            posts = input.post_urls.len(),
            per_post = input.comments_per_post,
            "Starting TikTok comment scrape"
        );

        let run = self.call_actor(TIKTOK_COMMENTS_SCRAPER, input).await?;
        let comments: Vec<DatasetItem> = self.get_dataset_items(&run.default_dataset_id).await?;
        tracing::info!(count = comments.len(), "Fetched TikTok comments");

        Ok(comments)
    }
}

/// The REST API addresses `owner/name` actors as `owner~name`.
fn actor_path(actor_id: &str) -> String {
    actor_id.replacen('/', "~", 1)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApifyError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}
