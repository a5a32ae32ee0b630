pub mod config;
pub mod csv_export;
pub mod error;
pub mod input;
pub mod records;
pub mod research;
pub mod scraper;
pub mod sink;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{ActorInput, Config, StorageTarget};
pub use error::ResearchError;
pub use records::{CommentDescriptor, OutputRecord, VideoDescriptor};
pub use research::{Research, RunOutcome, RunSummary};
pub use scraper::{ApifyScrapers, CommentRequest, ScraperBackend, SearchRequest};
pub use sink::{ApifySink, LocalSink, OutputSink};
