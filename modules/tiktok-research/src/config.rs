use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ResearchError;
use crate::scraper::{CommentRequest, SearchRequest};

/// Fixed discovery queries.
pub const SEARCH_QUERIES: [&str; 3] = [
    "ChatGPT college argument",
    "AI cheating university",
    "roommate AI conflict",
];

pub const DEFAULT_MAX_VIDEOS: u32 = 5;
pub const COMMENTS_PER_VIDEO: u32 = 20;
/// Small reply threads are enough to capture sub-arguments.
pub const MAX_REPLIES_PER_COMMENT: u32 = 2;

/// Key of the CSV record in the default key-value store.
pub const OUTPUT_KEY: &str = "TIKTOK_COMMENTS_RESEARCH.csv";

/// Used when `APIFY_TOKEN` is unset. Not checked locally; the API rejects it.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_APIFY_API_TOKEN_HERE";

/// Actor input as stored under the `INPUT` key. Unknown keys are ignored.
///
/// `maxVideos` is kept raw so an odd value never fails input loading.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActorInput {
    #[serde(rename = "maxVideos", default)]
    pub max_videos: Option<Value>,
}

impl ActorInput {
    /// `maxVideos`, falling back to the default when missing, null, false,
    /// zero or empty. Any other value that is not a positive integer also
    /// falls back, with a warning.
    pub fn max_videos_or_default(&self) -> u32 {
        let value = match &self.max_videos {
            None | Some(Value::Null) | Some(Value::Bool(false)) => return DEFAULT_MAX_VIDEOS,
            Some(Value::String(s)) if s.is_empty() => return DEFAULT_MAX_VIDEOS,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => return DEFAULT_MAX_VIDEOS,
            Some(value) => value,
        };

        match positive_count(value) {
            Some(n) => n,
            None => {
                warn!(
                    value = %value,
                    default = DEFAULT_MAX_VIDEOS,
                    "maxVideos is not a positive integer, using default"
                );
                DEFAULT_MAX_VIDEOS
            }
        }
    }
}

/// A positive whole number that fits in `u32` (`2` and `2.0` both count).
fn positive_count(value: &Value) -> Option<u32> {
    let n = value.as_f64()?;
    if n >= 1.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
        Some(n as u32)
    } else {
        None
    }
}

/// Where actor input is read from and results are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// Running on the Apify platform: the run's default storages.
    Platform {
        key_value_store_id: String,
        dataset_id: String,
    },
    /// Running locally: an Apify-style `storage/` directory.
    Local { root: PathBuf },
}

impl StorageTarget {
    pub fn from_env(local_root: PathBuf) -> Result<Self, ResearchError> {
        Self::from_lookup(|key| std::env::var(key).ok(), local_root)
    }

    /// Resolve the target from an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        local_root: PathBuf,
    ) -> Result<Self, ResearchError> {
        let at_home = lookup("APIFY_IS_AT_HOME")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if !at_home {
            return Ok(StorageTarget::Local { root: local_root });
        }

        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ResearchError::Config(format!("{key} is required on the platform")))
        };

        Ok(StorageTarget::Platform {
            key_value_store_id: required("APIFY_DEFAULT_KEY_VALUE_STORE_ID")?,
            dataset_id: required("APIFY_DEFAULT_DATASET_ID")?,
        })
    }
}

/// Run configuration. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub apify_token: String,
    pub search_queries: Vec<String>,
    pub max_videos: u32,
    pub download_subtitles: bool,
    pub comments_per_video: u32,
    pub max_replies_per_comment: u32,
    pub output_key: String,
    pub storage: StorageTarget,
}

impl Config {
    pub fn new(apify_token: String, max_videos: u32, storage: StorageTarget) -> Self {
        Self {
            apify_token,
            search_queries: SEARCH_QUERIES.iter().map(|q| q.to_string()).collect(),
            max_videos,
            download_subtitles: true,
            comments_per_video: COMMENTS_PER_VIDEO,
            max_replies_per_comment: MAX_REPLIES_PER_COMMENT,
            output_key: OUTPUT_KEY.to_string(),
            storage,
        }
    }

    pub fn search_request(&self) -> SearchRequest {
        SearchRequest {
            queries: self.search_queries.clone(),
            result_limit: self.max_videos,
            download_subtitles: self.download_subtitles,
        }
    }

    pub fn comment_request(&self, post_urls: Vec<Option<String>>) -> CommentRequest {
        CommentRequest {
            post_urls,
            comments_per_post: self.comments_per_video,
            max_replies_per_comment: self.max_replies_per_comment,
        }
    }

    /// Log the configuration with the token withheld.
    pub fn log_redacted(&self) {
        let token_state = if self.apify_token == PLACEHOLDER_TOKEN {
            "placeholder"
        } else if self.apify_token.is_empty() {
            "empty"
        } else {
            "set"
        };

        let storage = match &self.storage {
            StorageTarget::Platform { .. } => "platform".to_string(),
            StorageTarget::Local { root } => root.display().to_string(),
        };

        info!(
            token = token_state,
            queries = self.search_queries.len(),
            max_videos = self.max_videos,
            comments_per_video = self.comments_per_video,
            max_replies_per_comment = self.max_replies_per_comment,
            output_key = self.output_key.as_str(),
            storage = storage.as_str(),
            "Loaded config"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_input_uses_default_max_videos() {
        let input: ActorInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.max_videos_or_default(), 5);
    }

    #[test]
    fn zero_max_videos_falls_back_to_default() {
        let input: ActorInput = serde_json::from_str(r#"{"maxVideos": 0}"#).unwrap();
        assert_eq!(input.max_videos_or_default(), 5);
    }

    #[test]
    fn explicit_max_videos_is_used() {
        let input: ActorInput =
            serde_json::from_str(r#"{"maxVideos": 12, "somethingElse": true}"#).unwrap();
        assert_eq!(input.max_videos_or_default(), 12);
    }

    #[test]
    fn null_max_videos_falls_back_to_default() {
        let input: ActorInput = serde_json::from_str(r#"{"maxVideos": null}"#).unwrap();
        assert_eq!(input.max_videos_or_default(), 5);
    }

    #[test]
    fn whole_float_max_videos_is_accepted() {
        let input: ActorInput = serde_json::from_str(r#"{"maxVideos": 2.0}"#).unwrap();
        assert_eq!(input.max_videos_or_default(), 2);
    }

    #[test]
    fn malformed_max_videos_parses_and_falls_back() {
        for raw in [
            r#"{"maxVideos": -1}"#,
            r#"{"maxVideos": 2.5}"#,
            r#"{"maxVideos": "10"}"#,
            r#"{"maxVideos": [3]}"#,
            r#"{"maxVideos": 1e12}"#,
        ] {
            let input: ActorInput = serde_json::from_str(raw).expect("input should still parse");
            assert_eq!(input.max_videos_or_default(), 5, "input: {raw}");
        }
    }

    #[test]
    fn local_storage_when_not_at_home() {
        let target = StorageTarget::from_lookup(lookup(&[]), PathBuf::from("./storage")).unwrap();
        assert_eq!(
            target,
            StorageTarget::Local {
                root: PathBuf::from("./storage")
            }
        );
    }

    #[test]
    fn platform_storage_reads_default_ids() {
        let target = StorageTarget::from_lookup(
            lookup(&[
                ("APIFY_IS_AT_HOME", "1"),
                ("APIFY_DEFAULT_KEY_VALUE_STORE_ID", "kv-1"),
                ("APIFY_DEFAULT_DATASET_ID", "ds-1"),
            ]),
            PathBuf::from("./storage"),
        )
        .unwrap();

        assert_eq!(
            target,
            StorageTarget::Platform {
                key_value_store_id: "kv-1".into(),
                dataset_id: "ds-1".into(),
            }
        );
    }

    #[test]
    fn platform_storage_requires_dataset_id() {
        let err = StorageTarget::from_lookup(
            lookup(&[
                ("APIFY_IS_AT_HOME", "1"),
                ("APIFY_DEFAULT_KEY_VALUE_STORE_ID", "kv-1"),
            ]),
            PathBuf::from("./storage"),
        )
        .unwrap_err();

        assert!(err.to_string().contains("APIFY_DEFAULT_DATASET_ID"));
    }

    #[test]
    fn requests_carry_fixed_limits() {
        let config = Config::new(
            "token".into(),
            2,
            StorageTarget::Local {
                root: PathBuf::from("s"),
            },
        );

        let search = config.search_request();
        assert_eq!(search.queries.len(), 3);
        assert_eq!(search.result_limit, 2);
        assert!(search.download_subtitles);

        let comments = config.comment_request(vec![Some("u".into()), Some("u".into())]);
        assert_eq!(comments.post_urls.len(), 2, "duplicates are not removed");
        assert_eq!(comments.comments_per_post, 20);
        assert_eq!(comments.max_replies_per_comment, 2);
    }
}
