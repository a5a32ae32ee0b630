// The two-stage research run: discover videos, harvest their comments,
// project, serialize, persist. Strictly sequential.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::csv_export::to_csv;
use crate::records::{extract_video_urls, project_comments};
use crate::scraper::ScraperBackend;
use crate::sink::OutputSink;

/// Counts from a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub videos: usize,
    pub comments: usize,
    pub csv_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// The run stopped at the first error; nothing after it was attempted.
    Failed(String),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

pub struct Research {
    config: Config,
    scrapers: Arc<dyn ScraperBackend>,
    sink: Arc<dyn OutputSink>,
}

impl Research {
    pub fn new(config: Config, scrapers: Arc<dyn ScraperBackend>, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            config,
            scrapers,
            sink,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        info!("Stage 1: finding videos");
        let search = self.config.search_request();
        let videos = self
            .scrapers
            .discover_videos(&search)
            .await
            .context("video discovery failed")?;

        let video_urls = extract_video_urls(&videos);
        let missing = video_urls.iter().filter(|u| u.is_none()).count();
        if missing > 0 {
            warn!(missing, "Some videos have no URL; forwarding them anyway");
        }
        let video_count = video_urls.len();
        info!(videos = video_count, "Found videos, moving to stage 2");

        info!("Stage 2: scraping comments");
        let request = self.config.comment_request(video_urls);
        let comments = self
            .scrapers
            .harvest_comments(&request)
            .await
            .context("comment harvest failed")?;

        let records = project_comments(&comments);
        let csv = to_csv(&records).context("serializing CSV report")?;

        self.sink
            .store_csv(&self.config.output_key, &csv)
            .await
            .context("storing CSV report")?;
        self.sink
            .push_records(&records)
            .await
            .context("pushing records to dataset")?;

        info!(
            comments = records.len(),
            videos = video_count,
            "Done! Gathered comments across videos"
        );

        Ok(RunSummary {
            videos: video_count,
            comments: records.len(),
            csv_key: self.config.output_key.clone(),
        })
    }

    /// Run and log any failure instead of returning it.
    pub async fn run_logged(&self) -> RunOutcome {
        match self.run().await {
            Ok(summary) => RunOutcome::Completed(summary),
            Err(e) => {
                let message = format!("{e:#}");
                error!(error = %message, "Research scrape failed");
                RunOutcome::Failed(message)
            }
        }
    }
}
