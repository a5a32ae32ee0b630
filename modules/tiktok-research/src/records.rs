// Loosely typed scraper descriptors and the flattened export record.
//
// Descriptors wrap the raw dataset item and read fields by name on demand;
// nothing is validated up front, so an odd item never fails the run.

use apify_client::DatasetItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Substituted for a comment's video URL when the scraper left it out.
pub const UNKNOWN_VIDEO_URL: &str = "Unknown";

/// A video returned by the search scraper. Only `webVideoUrl` is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoDescriptor(pub DatasetItem);

impl VideoDescriptor {
    pub fn web_video_url(&self) -> Option<&str> {
        self.0.get("webVideoUrl").and_then(Value::as_str)
    }
}

impl From<DatasetItem> for VideoDescriptor {
    fn from(item: DatasetItem) -> Self {
        Self(item)
    }
}

/// A comment returned by the comments scraper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentDescriptor(pub DatasetItem);

impl CommentDescriptor {
    /// Raw field value. `Some(Value::Null)` for an explicit `null`, `None` if absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

impl From<DatasetItem> for CommentDescriptor {
    fn from(item: DatasetItem) -> Self {
        Self(item)
    }
}

/// One exported comment. Field values other than `video_url` are passed
/// through untouched; absent fields are omitted from the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_text: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

impl OutputRecord {
    pub fn from_comment(comment: &CommentDescriptor) -> Self {
        Self {
            video_url: comment
                .field("videoUrl")
                .and_then(truthy_text)
                .unwrap_or_else(|| UNKNOWN_VIDEO_URL.to_string()),
            comment_text: comment.field("text").cloned(),
            likes: comment.field("diggCount").cloned(),
            replies: comment.field("repliesCount").cloned(),
            author: comment.field("authorUsername").cloned(),
            timestamp: comment.field("createTimeISO").cloned(),
        }
    }
}

/// Canonical URL of every video, in order. Missing URLs stay as `None`.
pub fn extract_video_urls(videos: &[VideoDescriptor]) -> Vec<Option<String>> {
    videos
        .iter()
        .map(|v| v.web_video_url().map(str::to_string))
        .collect()
}

pub fn project_comments(comments: &[CommentDescriptor]) -> Vec<OutputRecord> {
    comments.iter().map(OutputRecord::from_comment).collect()
}

/// Text form of a value, or `None` for null, false, 0, NaN and "".
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> DatasetItem {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn comment(value: Value) -> CommentDescriptor {
        CommentDescriptor(item(value))
    }

    #[test]
    fn url_extraction_keeps_length_and_order() {
        let videos = vec![
            VideoDescriptor(item(json!({"webVideoUrl": "https://www.tiktok.com/@a/video/1"}))),
            VideoDescriptor(item(json!({"id": "no-url"}))),
            VideoDescriptor(item(json!({"webVideoUrl": "https://www.tiktok.com/@a/video/1"}))),
        ];

        let urls = extract_video_urls(&videos);

        assert_eq!(
            urls,
            vec![
                Some("https://www.tiktok.com/@a/video/1".to_string()),
                None,
                Some("https://www.tiktok.com/@a/video/1".to_string()),
            ]
        );
    }

    #[test]
    fn url_extraction_of_empty_list_is_empty() {
        assert!(extract_video_urls(&[]).is_empty());
    }

    #[test]
    fn projection_renames_fields() {
        let record = OutputRecord::from_comment(&comment(json!({
            "videoUrl": "https://www.tiktok.com/@a/video/1",
            "text": "this is fine",
            "diggCount": 14,
            "repliesCount": 2,
            "authorUsername": "roomie",
            "createTimeISO": "2025-09-01T12:00:00.000Z",
            "uid": "ignored"
        })));

        assert_eq!(record.video_url, "https://www.tiktok.com/@a/video/1");
        assert_eq!(record.comment_text, Some(json!("this is fine")));
        assert_eq!(record.likes, Some(json!(14)));
        assert_eq!(record.replies, Some(json!(2)));
        assert_eq!(record.author, Some(json!("roomie")));
        assert_eq!(record.timestamp, Some(json!("2025-09-01T12:00:00.000Z")));
    }

    #[test]
    fn missing_video_url_becomes_unknown() {
        let record = OutputRecord::from_comment(&comment(json!({"text": "hi"})));
        assert_eq!(record.video_url, UNKNOWN_VIDEO_URL);
    }

    #[test]
    fn falsy_video_url_becomes_unknown() {
        for value in [json!(null), json!(""), json!(false), json!(0)] {
            let record = OutputRecord::from_comment(&comment(json!({"videoUrl": value})));
            assert_eq!(record.video_url, UNKNOWN_VIDEO_URL, "value: {value}");
        }
    }

    #[test]
    fn other_missing_fields_have_no_default() {
        let record = OutputRecord::from_comment(&comment(json!({"videoUrl": "u"})));

        assert_eq!(record.comment_text, None);
        assert_eq!(record.likes, None);
        assert_eq!(record.replies, None);
        assert_eq!(record.author, None);
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn values_pass_through_without_coercion() {
        let record = OutputRecord::from_comment(&comment(json!({
            "videoUrl": "u",
            "diggCount": "12",
            "text": null
        })));

        assert_eq!(record.likes, Some(json!("12")));
        assert_eq!(record.comment_text, Some(Value::Null));
    }

    #[test]
    fn projection_is_idempotent() {
        let comments = vec![
            comment(json!({"videoUrl": "u1", "text": "a", "diggCount": 1})),
            comment(json!({"text": "b"})),
        ];

        assert_eq!(project_comments(&comments), project_comments(&comments));
    }

    #[test]
    fn json_form_omits_absent_fields() {
        let record = OutputRecord::from_comment(&comment(json!({"text": "hi", "authorUsername": "x"})));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json, json!({"video_url": "Unknown", "comment_text": "hi", "author": "x"}));
    }
}
