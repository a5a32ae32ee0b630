// CSV rendering of the export records.
//
// Five columns in fixed order. The author is kept in the dataset export but
// is not a CSV column.

use serde_json::Value;

use crate::error::ResearchError;
use crate::records::OutputRecord;

pub const CSV_HEADER: [&str; 5] = [
    "SOURCE_VIDEO",
    "COMMENT_CONTENT",
    "LIKES",
    "REPLY_COUNT",
    "DATE",
];

/// Render records as CSV text: one header line, then one line per record.
///
/// Fields containing a comma, quote or line break are quoted; absent and
/// null values become empty cells.
pub fn to_csv(records: &[OutputRecord]) -> Result<String, ResearchError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record(row(record))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ResearchError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ResearchError::Csv(e.to_string()))
}

fn row(record: &OutputRecord) -> [String; 5] {
    [
        record.video_url.clone(),
        cell(record.comment_text.as_ref()),
        cell(record.likes.as_ref()),
        cell(record.replies.as_ref()),
        cell(record.timestamp.as_ref()),
    ]
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(url: &str, text: Option<&str>, likes: Option<i64>) -> OutputRecord {
        OutputRecord {
            video_url: url.to_string(),
            comment_text: text.map(|t| json!(t)),
            likes: likes.map(|l| json!(l)),
            replies: Some(json!(0)),
            author: Some(json!("someone")),
            timestamp: Some(json!("2025-09-01T12:00:00.000Z")),
        }
    }

    #[test]
    fn empty_input_is_header_only() {
        let text = to_csv(&[]).unwrap();
        assert_eq!(text, "SOURCE_VIDEO,COMMENT_CONTENT,LIKES,REPLY_COUNT,DATE\n");
    }

    #[test]
    fn plain_rows_are_unquoted() {
        let text = to_csv(&[record("https://t/1", Some("nice"), Some(3))]).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "https://t/1,nice,3,0,2025-09-01T12:00:00.000Z");
    }

    #[test]
    fn author_is_not_a_column() {
        let text = to_csv(&[record("https://t/1", Some("nice"), Some(3))]).unwrap();
        assert!(!text.contains("someone"));
        assert!(!text.contains("AUTHOR"));
    }

    #[test]
    fn missing_values_are_empty_cells() {
        let mut r = record("Unknown", None, None);
        r.replies = Some(Value::Null);
        let text = to_csv(&[r]).unwrap();

        assert_eq!(text.lines().nth(1), Some("Unknown,,,,2025-09-01T12:00:00.000Z"));
    }

    #[test]
    fn embedded_delimiters_are_escaped() {
        let text = to_csv(&[record("https://t/1", Some("he said \"no\", twice"), Some(1))]).unwrap();
        assert!(text.contains(r#""he said ""no"", twice""#), "got: {text}");
    }

    #[test]
    fn round_trips_through_csv_reader() {
        let records = vec![
            record("https://t/1", Some("line one\nline two"), Some(10)),
            record("https://t/2", Some("a, b, \"c\""), None),
            record("Unknown", None, Some(0)),
        ];
        let text = to_csv(&records).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());
        for (parsed, original) in rows.iter().zip(&records) {
            assert_eq!(parsed.iter().collect::<Vec<_>>(), row(original));
        }
    }
}
