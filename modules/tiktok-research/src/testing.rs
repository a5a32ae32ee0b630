// Test mocks for the research pipeline.
//
// - MockScrapers (ScraperBackend): canned datasets, records every request
// - MemorySink (OutputSink): keeps writes in memory, optional failure
//
// Plus builders for descriptors from JSON literals.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::records::{CommentDescriptor, OutputRecord, VideoDescriptor};
use crate::scraper::{CommentRequest, ScraperBackend, SearchRequest};
use crate::sink::OutputSink;

/// Build a descriptor item from a JSON object literal.
pub fn item(value: Value) -> apify_client::DatasetItem {
    match value {
        Value::Object(map) => map,
        other => panic!("descriptor must be a JSON object, got {other}"),
    }
}

pub fn video(value: Value) -> VideoDescriptor {
    VideoDescriptor(item(value))
}

pub fn comment(value: Value) -> CommentDescriptor {
    CommentDescriptor(item(value))
}

// ---------------------------------------------------------------------------
// MockScrapers
// ---------------------------------------------------------------------------

/// Returns fixed datasets. Builder: `.with_videos()`, `.with_comments()`,
/// `.failing_discovery()`, `.failing_harvest()`.
#[derive(Default)]
pub struct MockScrapers {
    videos: Vec<VideoDescriptor>,
    comments: Vec<CommentDescriptor>,
    discovery_error: Option<String>,
    harvest_error: Option<String>,
    search_requests: Mutex<Vec<SearchRequest>>,
    comment_requests: Mutex<Vec<CommentRequest>>,
}

impl MockScrapers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(mut self, videos: Vec<VideoDescriptor>) -> Self {
        self.videos = videos;
        self
    }

    pub fn with_comments(mut self, comments: Vec<CommentDescriptor>) -> Self {
        self.comments = comments;
        self
    }

    pub fn failing_discovery(mut self, message: &str) -> Self {
        self.discovery_error = Some(message.to_string());
        self
    }

    pub fn failing_harvest(mut self, message: &str) -> Self {
        self.harvest_error = Some(message.to_string());
        self
    }

    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.search_requests.lock().unwrap().clone()
    }

    pub fn comment_requests(&self) -> Vec<CommentRequest> {
        self.comment_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScraperBackend for MockScrapers {
    async fn discover_videos(&self, request: &SearchRequest) -> Result<Vec<VideoDescriptor>> {
        self.search_requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.discovery_error {
            bail!("{message}");
        }
        Ok(self.videos.clone())
    }

    async fn harvest_comments(&self, request: &CommentRequest) -> Result<Vec<CommentDescriptor>> {
        self.comment_requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.harvest_error {
            bail!("{message}");
        }
        Ok(self.comments.clone())
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySink {
    csv: Mutex<Vec<(String, String)>>,
    records: Mutex<Vec<OutputRecord>>,
    csv_error: Option<String>,
    push_error: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `store_csv` call fails with `message`.
    pub fn failing_csv(message: &str) -> Self {
        Self {
            csv_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Every `push_records` call fails with `message`; CSV writes still land.
    pub fn failing_push(message: &str) -> Self {
        Self {
            push_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(key, csv)` pairs in write order.
    pub fn stored_csv(&self) -> Vec<(String, String)> {
        self.csv.lock().unwrap().clone()
    }

    pub fn pushed_records(&self) -> Vec<OutputRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn store_csv(&self, key: &str, csv: &str) -> Result<()> {
        if let Some(message) = &self.csv_error {
            bail!("{message}");
        }
        self.csv
            .lock()
            .unwrap()
            .push((key.to_string(), csv.to_string()));
        Ok(())
    }

    async fn push_records(&self, records: &[OutputRecord]) -> Result<()> {
        if let Some(message) = &self.push_error {
            bail!("{message}");
        }
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}
