// Scraper seam for the two remote stages.
//
// The pipeline only sees `ScraperBackend`; `ApifyScrapers` is the production
// implementation and `testing::MockScrapers` the in-memory one.

use std::sync::Arc;

use anyhow::Result;
use apify_client::{ApifyClient, TikTokCommentsInput, TikTokSearchInput};
use async_trait::async_trait;

use crate::records::{CommentDescriptor, VideoDescriptor};

/// Parameters for the video discovery stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub queries: Vec<String>,
    pub result_limit: u32,
    pub download_subtitles: bool,
}

/// Parameters for the comment harvest stage. URLs are not deduplicated and
/// missing ones are forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRequest {
    pub post_urls: Vec<Option<String>>,
    pub comments_per_post: u32,
    pub max_replies_per_comment: u32,
}

impl From<&SearchRequest> for TikTokSearchInput {
    fn from(request: &SearchRequest) -> Self {
        TikTokSearchInput {
            search_queries: request.queries.clone(),
            results_per_page: request.result_limit,
            should_download_subtitles: request.download_subtitles,
        }
    }
}

impl From<&CommentRequest> for TikTokCommentsInput {
    fn from(request: &CommentRequest) -> Self {
        TikTokCommentsInput {
            post_urls: request.post_urls.clone(),
            comments_per_post: request.comments_per_post,
            max_replies_per_comment: request.max_replies_per_comment,
        }
    }
}

#[async_trait]
pub trait ScraperBackend: Send + Sync {
    /// Run the search scraper to completion and return its full dataset.
    async fn discover_videos(&self, request: &SearchRequest) -> Result<Vec<VideoDescriptor>>;

    /// Run the comments scraper to completion and return its full dataset.
    async fn harvest_comments(&self, request: &CommentRequest) -> Result<Vec<CommentDescriptor>>;
}

/// Both stages backed by clockworks' TikTok actors on Apify.
pub struct ApifyScrapers {
    client: Arc<ApifyClient>,
}

impl ApifyScrapers {
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScraperBackend for ApifyScrapers {
    async fn discover_videos(&self, request: &SearchRequest) -> Result<Vec<VideoDescriptor>> {
        let input = TikTokSearchInput::from(request);
        let items = self.client.search_tiktok_videos(&input).await?;
        Ok(items.into_iter().map(VideoDescriptor::from).collect())
    }

    async fn harvest_comments(&self, request: &CommentRequest) -> Result<Vec<CommentDescriptor>> {
        let input = TikTokCommentsInput::from(request);
        let items = self.client.scrape_tiktok_comments(&input).await?;
        Ok(items.into_iter().map(CommentDescriptor::from).collect())
    }
}
