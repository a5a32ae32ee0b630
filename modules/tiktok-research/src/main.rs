use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use apify_client::ApifyClient;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tiktok_research::config::PLACEHOLDER_TOKEN;
use tiktok_research::input::load_actor_input;
use tiktok_research::{
    ApifyScrapers, ApifySink, Config, LocalSink, OutputSink, Research, StorageTarget,
};

#[derive(Parser)]
#[command(name = "tiktok-research", about = "Two-stage TikTok video search and comment harvest")]
struct Cli {
    /// Apify API token
    #[arg(long, env = "APIFY_TOKEN", default_value = PLACEHOLDER_TOKEN, hide_env_values = true)]
    token: String,

    /// Override `maxVideos` from the actor input
    #[arg(long)]
    max_videos: Option<u32>,

    /// Local storage directory used when not running on the platform
    #[arg(long, env = "APIFY_LOCAL_STORAGE_DIR", default_value = "./storage")]
    storage_dir: PathBuf,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tiktok_research=info,apify_client=info"));
    if cli.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting two-stage TikTok research");

    let storage = StorageTarget::from_env(cli.storage_dir)?;
    let client = Arc::new(ApifyClient::new(cli.token.clone()));

    let input = load_actor_input(&client, &storage).await?;
    let max_videos = cli
        .max_videos
        .filter(|n| *n > 0)
        .unwrap_or_else(|| input.max_videos_or_default());

    let config = Config::new(cli.token, max_videos, storage);
    config.log_redacted();

    let sink: Arc<dyn OutputSink> = match &config.storage {
        StorageTarget::Platform {
            key_value_store_id,
            dataset_id,
        } => Arc::new(ApifySink::new(
            client.clone(),
            key_value_store_id.clone(),
            dataset_id.clone(),
        )),
        StorageTarget::Local { root } => Arc::new(LocalSink::new(root.clone())),
    };
    let scrapers = Arc::new(ApifyScrapers::new(client));

    // Failures are logged inside; the exit status does not reflect them.
    let outcome = Research::new(config, scrapers, sink).run_logged().await;
    info!(completed = outcome.is_completed(), "Research run finished");

    Ok(())
}
